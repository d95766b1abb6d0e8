//! Test utilities and mock doclets for forge-tsd.
//!
//! Builders for the doclet shapes `jsdoc -X` produces, usable from unit
//! tests and from downstream crates.
//!
//! # Example
//!
//! ```
//! use forge_tsd::test::{api, mock_class, mock_method, mock_param};
//!
//! let map = api(mock_class("ol.Map"));
//! let target = mock_param("target", &["Element"]);
//! let method = mock_method("ol.Map", "setTarget", vec![target], vec![]);
//! assert_eq!(method.longname, "ol.Map#setTarget");
//! ```

use crate::doclet::{DocParam, DocTag, DocType, Doclet, DocletKind, Scope};

/// Split a longname into `(memberof, name)`
///
/// `ol.layer.Tile` -> `(Some("ol.layer"), "Tile")`,
/// `module:ol/Map~Map` -> `(Some("module:ol/Map"), "Map")`.
pub fn split_longname(longname: &str) -> (Option<String>, String) {
    match longname.rfind(['#', '~', '.']) {
        Some(idx) => (
            Some(longname[..idx].to_string()),
            longname[idx + 1..].to_string(),
        ),
        None => (None, longname.to_string()),
    }
}

fn type_of(types: &[&str]) -> Option<DocType> {
    if types.is_empty() {
        None
    } else {
        Some(DocType::new(types.iter().copied()))
    }
}

fn returns_of(types: Vec<&str>) -> Vec<DocParam> {
    if types.is_empty() {
        vec![]
    } else {
        vec![DocParam::typed(types)]
    }
}

fn mock_declaration(longname: &str, kind: DocletKind) -> Doclet {
    let (memberof, name) = split_longname(longname);
    let mut doclet = Doclet::new(name, longname, kind);
    doclet.scope = Some(if memberof.is_some() {
        Scope::Static
    } else {
        Scope::Global
    });
    doclet.memberof = memberof;
    doclet
}

/// Create a mock class doclet.
pub fn mock_class(longname: &str) -> Doclet {
    mock_declaration(longname, DocletKind::Class)
}

/// Create a mock typedef doclet with the given type names.
pub fn mock_typedef(longname: &str, types: &[&str]) -> Doclet {
    let mut doclet = mock_declaration(longname, DocletKind::Typedef);
    doclet.ty = type_of(types);
    doclet
}

/// Create a typedef doclet as emitted for `@typedef {function(...)}`.
pub fn mock_callback_typedef(longname: &str, type_name: &str, comment: &str) -> Doclet {
    let mut doclet = mock_typedef(longname, &[type_name]);
    doclet.comment = comment.to_string();
    doclet
}

/// Create an instance method of a class.
pub fn mock_method(class: &str, name: &str, params: Vec<DocParam>, returns: Vec<&str>) -> Doclet {
    let mut doclet = Doclet::new(name, format!("{}#{}", class, name), DocletKind::Function);
    doclet.memberof = Some(class.to_string());
    doclet.scope = Some(Scope::Instance);
    doclet.params = params;
    doclet.returns = returns_of(returns);
    doclet
}

/// Create a static function; an empty `module` makes it global.
pub fn mock_function(
    module: &str,
    name: &str,
    params: Vec<DocParam>,
    returns: Vec<&str>,
) -> Doclet {
    let mut doclet = if module.is_empty() {
        mock_declaration(name, DocletKind::Function)
    } else {
        mock_declaration(&format!("{}.{}", module, name), DocletKind::Function)
    };
    doclet.params = params;
    doclet.returns = returns_of(returns);
    doclet
}

/// Create an instance property of a class or typedef.
pub fn mock_property(owner: &str, name: &str, types: &[&str]) -> Doclet {
    let mut doclet = Doclet::new(name, format!("{}#{}", owner, name), DocletKind::Member);
    doclet.memberof = Some(owner.to_string());
    doclet.scope = Some(Scope::Instance);
    doclet.ty = type_of(types);
    doclet
}

/// Create a parameter; an empty name leaves it unnamed.
pub fn mock_param(name: &str, types: &[&str]) -> DocParam {
    DocParam {
        ty: type_of(types),
        name: (!name.is_empty()).then(|| name.to_string()),
        ..Default::default()
    }
}

/// Create an optional (`[name]`) parameter.
pub fn mock_optional_param(name: &str, types: &[&str]) -> DocParam {
    DocParam {
        optional: Some(true),
        ..mock_param(name, types)
    }
}

/// Mark a doclet with the `@api` tag.
pub fn api(mut doclet: Doclet) -> Doclet {
    doclet.tags.push(DocTag::new("api", ""));
    doclet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_longname() {
        assert_eq!(
            split_longname("ol.layer.Tile"),
            (Some("ol.layer".to_string()), "Tile".to_string())
        );
        assert_eq!(
            split_longname("module:ol/Map~Map"),
            (Some("module:ol/Map".to_string()), "Map".to_string())
        );
        assert_eq!(split_longname("Foo"), (None, "Foo".to_string()));
    }

    #[test]
    fn test_mock_shapes() {
        let method = mock_method("ol.Map", "render", vec![], vec!["void"]);
        assert_eq!(method.longname, "ol.Map#render");
        assert_eq!(method.returns.len(), 1);

        let func = mock_function("", "noop", vec![], vec![]);
        assert_eq!(func.memberof, None);
        assert_eq!(func.scope, Some(Scope::Global));

        let typedef = mock_typedef("Id", &[]);
        assert!(typedef.ty.is_none());
        assert!(api(typedef).has_tag("api"));
    }
}
