//! Module tree assembly and rendering
//!
//! Dotted module paths (`ol.layer`) nest one block per segment; slash paths
//! (`ol/layer/Tile`) are one flat, quoted block. Each level renders its types,
//! then its module members, then its children.

use crate::config::TsdConfig;
use crate::decl::DeclNode;
use crate::diagnostics::DiagnosticsCollector;
use crate::writer::DtsWriter;
use indexmap::IndexMap;

/// One level of the declaration namespace
#[derive(Debug, Default)]
pub struct ModuleTreeNode<'a> {
    /// `Some(true)` for a top-level block, `Some(false)` for a nested one,
    /// `None` for global scope
    pub is_root: Option<bool>,
    pub children: IndexMap<String, ModuleTreeNode<'a>>,
    pub types: Vec<&'a DeclNode>,
    pub members: Vec<&'a DeclNode>,
}

impl<'a> ModuleTreeNode<'a> {
    /// Global scope
    pub fn new() -> Self {
        Self::default()
    }

    fn with_root(is_root: bool) -> Self {
        Self {
            is_root: Some(is_root),
            ..Default::default()
        }
    }

    /// Build a tree holding every node, in iteration order
    pub fn assemble(nodes: impl IntoIterator<Item = &'a DeclNode>) -> Self {
        let mut tree = Self::new();
        for node in nodes {
            tree.insert(node);
        }
        tree
    }

    /// Attach a node under its parent module path
    pub fn insert(&mut self, node: &'a DeclNode) {
        let target = match node.parent_module() {
            None => self,
            Some(path) if path.is_empty() => self,
            Some(path) if path.contains('/') => self
                .children
                .entry(path)
                .or_insert_with(|| Self::with_root(true)),
            Some(path) => {
                let mut level = self;
                for (depth, segment) in path.split('.').filter(|s| !s.is_empty()).enumerate() {
                    level = level
                        .children
                        .entry(segment.to_string())
                        .or_insert_with(|| Self::with_root(depth == 0));
                }
                level
            }
        };

        if node.is_type() {
            target.types.push(node);
        } else {
            target.members.push(node);
        }
    }

    /// Find the node for a module path, if present
    pub fn get(&self, path: &str) -> Option<&ModuleTreeNode<'a>> {
        if path.contains('/') {
            return self.children.get(path);
        }
        path.split('.')
            .try_fold(self, |level, segment| level.children.get(segment))
    }

    /// Render depth-first at the writer's current level
    pub fn render(
        &self,
        out: &mut DtsWriter,
        config: &TsdConfig,
        diagnostics: &mut DiagnosticsCollector,
    ) {
        for node in &self.types {
            node.output(out, config, diagnostics);
        }
        for node in &self.members {
            node.output(out, config, diagnostics);
        }
        for (segment, child) in &self.children {
            // Dotted roots get `declare` as well as quoted ones: an undeclared
            // top-level `module a {}` is rejected in a .d.ts
            let declare = child.is_root == Some(true) && config.declare_top_level();
            let name = if segment.contains('/') {
                format!("\"{}\"", segment)
            } else {
                segment.clone()
            };
            out.writeln(format!(
                "{}module {} {{",
                if declare { "declare " } else { "" },
                name
            ));
            out.indent();
            child.render(out, config, diagnostics);
            out.unindent();
            out.writeln("}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{ClassDecl, MemberOwner, MethodDecl, TypedefDecl, UserTypeAliasDecl};
    use crate::doclet::DocTag;
    use crate::test::*;
    use pretty_assertions::assert_eq;

    fn class(longname: &str) -> DeclNode {
        let mut doclet = mock_class(longname);
        doclet.tags.push(DocTag::new("hideconstructor", ""));
        DeclNode::Class(ClassDecl::new(doclet, &TsdConfig::default()))
    }

    fn render(tree: &ModuleTreeNode, config: &TsdConfig) -> String {
        let mut out = DtsWriter::new();
        tree.render(&mut out, config, &mut DiagnosticsCollector::new());
        out.finish()
    }

    #[test]
    fn test_dotted_path_nests() {
        let nodes = vec![class("a.b.c.Foo")];
        let tree = ModuleTreeNode::assemble(&nodes);

        assert_eq!(tree.children["a"].is_root, Some(true));
        assert_eq!(tree.get("a.b").unwrap().is_root, Some(false));
        assert_eq!(tree.get("a.b.c").unwrap().types.len(), 1);
        assert!(tree.get("a").unwrap().types.is_empty());

        assert_eq!(
            render(&tree, &TsdConfig::default()),
            "declare module a {\n\
             \x20   module b {\n\
             \x20       module c {\n\
             \x20           class Foo {\n\
             \x20           }\n\
             \x20       }\n\
             \x20   }\n\
             }\n"
        );
    }

    #[test]
    fn test_slash_path_is_flat() {
        let mut doclet = mock_class("module:ol/layer/Tile~TileLayer");
        doclet.name = "TileLayer".to_string();
        doclet.memberof = Some("module:ol/layer/Tile".to_string());
        doclet.tags.push(DocTag::new("hideconstructor", ""));
        let nodes = vec![DeclNode::Class(ClassDecl::new(doclet, &TsdConfig::default()))];
        let tree = ModuleTreeNode::assemble(&nodes);

        assert_eq!(tree.children.len(), 1);
        assert!(tree.get("ol/layer/Tile").is_some());
        assert_eq!(
            render(&tree, &TsdConfig::default()),
            "declare module \"ol/layer/Tile\" {\n    class TileLayer {\n    }\n}\n"
        );
    }

    #[test]
    fn test_types_then_members_then_children() {
        let config = TsdConfig::default();
        let nodes = vec![
            DeclNode::Method(MethodDecl::new(
                mock_function("ol", "inherits", vec![], vec![]),
                MemberOwner::Module,
                &config,
            )),
            DeclNode::Typedef(TypedefDecl::new(
                mock_typedef("ol.layer.Options", &["string"]),
                &config,
            )),
            DeclNode::Typedef(TypedefDecl::new(
                mock_typedef("ol.Extent", &["Array.<number>"]),
                &config,
            )),
            DeclNode::UserTypeAlias(UserTypeAliasDecl::new(None, "Pixel", "number[]")),
        ];
        let tree = ModuleTreeNode::assemble(&nodes);

        assert_eq!(
            render(&tree, &config),
            "type Pixel = number[];\n\
             declare module ol {\n\
             \x20   type Extent = number[];\n\
             \x20   function inherits(): any;\n\
             \x20   module layer {\n\
             \x20       type Options = string;\n\
             \x20   }\n\
             }\n"
        );
    }

    #[test]
    fn test_declare_can_be_disabled() {
        let config = TsdConfig {
            do_not_declare_top_level_elements: true,
            ..Default::default()
        };
        let nodes = vec![class("ol.Map"), class("Global")];
        let tree = ModuleTreeNode::assemble(&nodes);
        assert_eq!(
            render(&tree, &config),
            "class Global {\n}\nmodule ol {\n    class Map {\n    }\n}\n"
        );
    }
}
