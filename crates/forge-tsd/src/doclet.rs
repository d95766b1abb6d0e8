//! Doclet model
//!
//! Passive schema for the records produced by the documentation extractor
//! (the JSON shape printed by `jsdoc -X`). Fields the compiler has no use for
//! (`meta`, `files`, ...) are ignored on deserialization.

use serde::{Deserialize, Serialize};

/// Prefix carried by longnames and memberof paths that name a module
pub const MODULE_PREFIX: &str = "module:";

/// Kind of documented entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocletKind {
    Class,
    Typedef,
    Function,
    #[default]
    Member,
    Value,
    Module,
    Constant,
    /// Any kind the compiler does not emit (`namespace`, `event`, `file`, ...)
    #[serde(other)]
    Other,
}

impl DocletKind {
    /// Kinds that become free functions/properties or class/typedef members
    pub fn is_member_like(&self) -> bool {
        matches!(
            self,
            DocletKind::Function | DocletKind::Member | DocletKind::Value | DocletKind::Constant
        )
    }
}

/// Scope of a doclet relative to its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Static,
    Instance,
    Inner,
    Global,
}

/// Access level declared by `@access`, `@private`, `@protected`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Public,
    Protected,
    Private,
    Package,
}

/// Type annotation: the list of raw type names of a `{A|B}` expression
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocType {
    #[serde(default)]
    pub names: Vec<String>,
}

impl DocType {
    /// Create a type annotation from raw names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the annotation mentions `undefined`
    pub fn admits_undefined(&self) -> bool {
        self.names.iter().any(|n| n == "undefined")
    }

    /// Whether the annotation mentions `null` or `undefined`
    pub fn is_nullable(&self) -> bool {
        self.names.iter().any(|n| n == "null" || n == "undefined")
    }
}

/// Parameter, return value or typedef property entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocParam {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<DocType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaultvalue: Option<serde_json::Value>,
}

impl DocParam {
    /// Create an entry with the given type names
    pub fn typed<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ty: Some(DocType::new(names)),
            ..Default::default()
        }
    }

    /// Raw type names, empty when untyped
    pub fn type_names(&self) -> &[String] {
        self.ty.as_ref().map(|t| t.names.as_slice()).unwrap_or(&[])
    }

    pub fn is_optional(&self) -> bool {
        self.optional.unwrap_or(false)
    }

    pub fn is_variable(&self) -> bool {
        self.variable.unwrap_or(false)
    }
}

/// A raw doc tag (`@template T`, `@api`, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocTag {
    #[serde(default)]
    pub original_title: String,
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl DocTag {
    /// Create a tag with title and text
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            original_title: title.clone(),
            title,
            text: text.into(),
            value: None,
        }
    }
}

/// One documentation record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Doclet {
    /// Absent on `package` and `file` records
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub longname: String,
    #[serde(default)]
    pub kind: DocletKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memberof: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classdesc: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<DocType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<DocParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub returns: Vec<DocParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<DocParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<DocTag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub augments: Vec<String>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub undocumented: bool,
    #[serde(default)]
    pub inherited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

impl Doclet {
    /// Create a doclet with name, longname and kind
    pub fn new(name: impl Into<String>, longname: impl Into<String>, kind: DocletKind) -> Self {
        Self {
            name: name.into(),
            longname: longname.into(),
            kind,
            ..Default::default()
        }
    }

    /// Raw type names, empty when untyped
    pub fn type_names(&self) -> &[String] {
        self.ty.as_ref().map(|t| t.names.as_slice()).unwrap_or(&[])
    }

    /// Whether the declared type is exactly the bare `function` name
    pub fn is_bare_function_type(&self) -> bool {
        matches!(self.type_names(), [only] if only == "function")
    }

    /// Parent module path: `memberof` without its `module:` prefix
    pub fn parent_module(&self) -> Option<String> {
        self.memberof.as_deref().map(strip_module_prefix)
    }

    pub fn is_static(&self) -> bool {
        self.scope == Some(Scope::Static)
    }

    pub fn has_tag(&self, title: &str) -> bool {
        self.tags.iter().any(|t| t.title == title)
    }

    /// Generic placeholders declared by `@template` tags, in order
    ///
    /// `@template T, U` and repeated `@template` tags are both accepted.
    /// Placeholders pass through verbatim.
    pub fn template_params(&self) -> Vec<String> {
        self.tags
            .iter()
            .filter(|t| t.title == "template")
            .flat_map(|t| t.text.split(','))
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(|p| {
                // `@template T Description text` keeps only the identifier
                p.split_whitespace().next().unwrap_or(p).to_string()
            })
            .collect()
    }

    /// Whether the doclet is public by its own declaration
    ///
    /// When `public_annotation` is set, the tag's presence is the only
    /// marker; otherwise everything but `private`/`package` access is public.
    pub fn is_declared_public(&self, public_annotation: Option<&str>) -> bool {
        match public_annotation {
            Some(annotation) => self.has_tag(annotation),
            None => !matches!(self.access, Some(Access::Private) | Some(Access::Package)),
        }
    }
}

/// Strip the `module:` prefix from a longname or memberof path
pub fn strip_module_prefix(path: &str) -> String {
    path.strip_prefix(MODULE_PREFIX).unwrap_or(path).to_string()
}
