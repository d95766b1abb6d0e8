//! Declaration lookup tables
//!
//! Built in two linear passes over the doclets: classes and typedefs are
//! registered first, then members are attached to their owner (or kept as
//! module-level members when no class/typedef owns them). User aliases and
//! interfaces from the config are registered last.

use crate::config::TsdConfig;
use crate::decl::{
    ClassDecl, DeclNode, MemberOwner, MethodDecl, PropertyDecl, TypedefDecl, UserInterfaceDecl,
    UserTypeAliasDecl,
};
use crate::diagnostics::DiagnosticsCollector;
use crate::doclet::{Doclet, DocletKind, Scope};
use crate::visibility::{public_type_of, PublicType};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Every node of one generation run, keyed by qualified name
#[derive(Debug, Default)]
pub struct Registry {
    pub classes: IndexMap<String, DeclNode>,
    pub typedefs: IndexMap<String, DeclNode>,
    pub user_types: IndexMap<String, DeclNode>,
    /// Functions and properties owned by no class or typedef
    pub module_members: Vec<DeclNode>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the tables from doclets and config
    pub fn build(
        doclets: &[Doclet],
        config: &TsdConfig,
        diagnostics: &mut DiagnosticsCollector,
    ) -> Self {
        let mut registry = Self::new();

        for doclet in doclets {
            if !matches!(doclet.kind, DocletKind::Class | DocletKind::Typedef) {
                continue;
            }
            if config.is_ignored(&doclet.longname) {
                tracing::debug!(name = %doclet.longname, "ignored by config");
                continue;
            }
            registry.register_type(doclet, config, diagnostics);
        }

        // jsdoc repeats members as undocumented copies; the documented one wins
        let documented: HashSet<&str> = doclets
            .iter()
            .filter(|d| d.kind.is_member_like() && !d.undocumented)
            .map(|d| d.longname.as_str())
            .collect();
        let mut attached: HashSet<&str> = HashSet::new();
        for doclet in doclets {
            if !doclet.kind.is_member_like() || skip_member(doclet, config) {
                continue;
            }
            if doclet.undocumented && documented.contains(doclet.longname.as_str()) {
                continue;
            }
            if !attached.insert(doclet.longname.as_str()) {
                tracing::debug!(name = %doclet.longname, "duplicate member, keeping the first");
                continue;
            }
            registry.attach_member(doclet, config);
        }

        for (module, name, target) in config.aliases.iter() {
            let node = DeclNode::UserTypeAlias(UserTypeAliasDecl::new(module, name, target));
            registry.insert_user_type(node);
        }
        for (module, name, members) in config.interfaces.iter() {
            let node =
                DeclNode::UserInterface(UserInterfaceDecl::new(module, name, members.clone()));
            registry.insert_user_type(node);
        }

        tracing::debug!(
            classes = registry.classes.len(),
            typedefs = registry.typedefs.len(),
            members = registry.module_members.len(),
            user_types = registry.user_types.len(),
            "registry built"
        );
        registry
    }

    fn register_type(
        &mut self,
        doclet: &Doclet,
        config: &TsdConfig,
        diagnostics: &mut DiagnosticsCollector,
    ) {
        let longname = doclet.longname.clone();
        if self.classes.contains_key(&longname) || self.typedefs.contains_key(&longname) {
            diagnostics.info(format!("duplicate definition of {}, keeping the first", longname));
            return;
        }

        match doclet.kind {
            DocletKind::Class => {
                let node = DeclNode::Class(ClassDecl::new(doclet.clone(), config));
                self.classes.insert(longname, node);
            }
            DocletKind::Typedef => {
                let mut typedef = TypedefDecl::new(doclet.clone(), config);
                for property in &doclet.properties {
                    if let Some(member) = PropertyDecl::from_typedef_property(doclet, property) {
                        typedef.members.push(DeclNode::Property(member));
                    }
                }
                self.typedefs.insert(longname, DeclNode::Typedef(typedef));
            }
            _ => {}
        }
    }

    fn attach_member(&mut self, doclet: &Doclet, config: &TsdConfig) {
        let owner_name = doclet.memberof.as_deref().unwrap_or("");
        let (owner, parent) = if let Some(class) = self.classes.get_mut(owner_name) {
            (MemberOwner::Class, Some(class))
        } else if let Some(typedef) = self.typedefs.get_mut(owner_name) {
            (MemberOwner::Interface, Some(typedef))
        } else {
            (MemberOwner::Module, None)
        };

        let member = if doclet.kind == DocletKind::Function {
            DeclNode::Method(MethodDecl::new(doclet.clone(), owner, config))
        } else {
            DeclNode::Property(PropertyDecl::new(doclet.clone(), owner, config))
        };

        match parent {
            Some(parent) => parent.push_member(member),
            None => self.module_members.push(member),
        }
    }

    /// User types win over generated ones of the same name only via `ignore`
    fn insert_user_type(&mut self, node: DeclNode) {
        let name = node.qualified_name().to_string();
        if self.classes.contains_key(&name) || self.typedefs.contains_key(&name) {
            tracing::warn!(
                name = %name,
                "user type shadows a generated declaration; add it to ignore"
            );
        }
        self.user_types.insert(name, node);
    }

    /// Class or typedef by name, classes first
    pub fn resolve_mut(&mut self, name: &str) -> Option<&mut DeclNode> {
        if let Some(node) = self.classes.get_mut(name) {
            return Some(node);
        }
        self.typedefs.get_mut(name)
    }

    /// Generated nodes: classes, typedefs, then module members
    pub fn declared_nodes(&self) -> impl Iterator<Item = &DeclNode> {
        self.classes
            .values()
            .chain(self.typedefs.values())
            .chain(self.module_members.iter())
    }

    /// Nodes that end up in the output: public generated nodes plus user types
    pub fn emitted_nodes(&self) -> impl Iterator<Item = &DeclNode> {
        self.declared_nodes()
            .filter(|node| node.is_public())
            .chain(self.user_types.values())
    }

    /// Public type set, registry order
    pub fn public_types(&self) -> Vec<PublicType> {
        self.emitted_nodes().filter_map(public_type_of).collect()
    }
}

/// Members never emitted: inherited copies, inner symbols, ignored names
fn skip_member(doclet: &Doclet, config: &TsdConfig) -> bool {
    doclet.inherited
        || doclet.scope == Some(Scope::Inner)
        || config.is_ignored(&doclet.longname)
        || doclet.memberof.as_deref().is_some_and(|m| config.is_ignored(m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::*;
    use pretty_assertions::assert_eq;

    fn build(doclets: Vec<Doclet>, config: &TsdConfig) -> Registry {
        Registry::build(&doclets, config, &mut DiagnosticsCollector::new())
    }

    #[test]
    fn test_members_attach_to_owners() {
        let config = TsdConfig::default();
        let registry = build(
            vec![
                mock_method("ol.Map", "render", vec![], vec![]),
                mock_class("ol.Map"),
                mock_typedef("olx.Options", &["Object"]),
                mock_property("olx.Options", "zoom", &["number"]),
                mock_function("ol.proj", "get", vec![], vec!["ol.proj.Projection"]),
            ],
            &config,
        );

        // Member order in the input does not matter
        let DeclNode::Class(map) = &registry.classes["ol.Map"] else {
            panic!("expected class");
        };
        assert_eq!(map.members.len(), 1);

        let DeclNode::Typedef(options) = &registry.typedefs["olx.Options"] else {
            panic!("expected typedef");
        };
        assert_eq!(options.members.len(), 1);

        assert_eq!(registry.module_members.len(), 1);
        assert_eq!(registry.module_members[0].qualified_name(), "ol.proj.get");
    }

    #[test]
    fn test_skipped_members() {
        let config = TsdConfig::default().with_ignore("ol.Hidden").with_ignore("ol.Map#secret");
        let mut inherited = mock_method("ol.Map", "on", vec![], vec![]);
        inherited.inherited = true;
        let mut inner = mock_property("ol.Map", "cache", &["Object"]);
        inner.scope = Some(Scope::Inner);

        let registry = build(
            vec![
                mock_class("ol.Map"),
                mock_class("ol.Hidden"),
                mock_property("ol.Hidden", "x", &["number"]),
                mock_property("ol.Map", "secret", &["string"]),
                inherited,
                inner,
            ],
            &config,
        );

        assert!(!registry.classes.contains_key("ol.Hidden"));
        assert!(registry.module_members.is_empty());
        let DeclNode::Class(map) = &registry.classes["ol.Map"] else {
            panic!("expected class");
        };
        assert!(map.members.is_empty());
    }

    #[test]
    fn test_typedef_properties_become_members() {
        let mut doclet = mock_typedef("olx.ViewOptions", &["Object"]);
        doclet.properties = vec![
            mock_param("center", &["ol.Coordinate"]),
            mock_param("center.x", &["number"]),
        ];
        let registry = build(vec![doclet], &TsdConfig::default());

        let DeclNode::Typedef(options) = &registry.typedefs["olx.ViewOptions"] else {
            panic!("expected typedef");
        };
        assert_eq!(options.members.len(), 1);
        assert_eq!(options.members[0].qualified_name(), "olx.ViewOptions#center");
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let mut first = mock_class("Foo");
        first.description = Some("first".to_string());
        let mut diagnostics = DiagnosticsCollector::new();
        let registry = Registry::build(
            &[first, mock_class("Foo")],
            &TsdConfig::default(),
            &mut diagnostics,
        );

        let DeclNode::Class(foo) = &registry.classes["Foo"] else {
            panic!("expected class");
        };
        assert_eq!(foo.doclet.description.as_deref(), Some("first"));
        assert_eq!(diagnostics.diagnostics().len(), 1);
    }

    #[test]
    fn test_undocumented_member_copy_is_dropped() {
        let mut copy = mock_property("Foo", "bar", &[]);
        copy.undocumented = true;
        let registry = build(
            vec![
                mock_class("Foo"),
                copy,
                mock_property("Foo", "bar", &["number"]),
                mock_method("Foo", "run", vec![], vec![]),
                mock_method("Foo", "run", vec![], vec!["string"]),
            ],
            &TsdConfig::default(),
        );

        let DeclNode::Class(foo) = &registry.classes["Foo"] else {
            panic!("expected class");
        };
        let names: Vec<&str> = foo.members.iter().map(|m| m.qualified_name()).collect();
        assert_eq!(names, vec!["Foo#bar", "Foo#run"]);
        let DeclNode::Property(bar) = &foo.members[0] else {
            panic!("expected property");
        };
        assert!(!bar.doclet.undocumented);
    }

    #[test]
    fn test_user_types_and_emission_set() {
        let config = TsdConfig::default()
            .with_public_annotation("api")
            .with_alias(Some("ol"), "Pixel", "Array.<number>")
            .with_interface(None, "Options", vec!["zoom: number".to_string()]);
        let registry = build(vec![api(mock_class("ol.Map")), mock_class("ol.Private")], &config);

        assert!(registry.user_types.contains_key("ol.Pixel"));
        assert!(registry.user_types.contains_key("Options"));
        let emitted: Vec<&str> = registry.emitted_nodes().map(|n| n.qualified_name()).collect();
        assert_eq!(emitted, vec!["ol.Map", "ol.Pixel", "Options"]);
    }
}
