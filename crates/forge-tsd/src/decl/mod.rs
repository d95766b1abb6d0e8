//! Declaration nodes
//!
//! Every emittable entity is a [`DeclNode`]. Nodes share a two-phase
//! contract: `visit` feeds the type names a node references into a
//! [`VisibilityContext`], and `output` renders the node at the writer's
//! current indentation. Both phases re-derive types from the same doclet
//! data, so repeated visits are harmless and output always agrees with what
//! was visited.

mod class;
mod member;
mod typedef;
mod user;

pub use class::{ClassDecl, ConstructorDecl};
pub use member::{MemberOwner, MethodDecl, PropertyDecl};
pub use typedef::TypedefDecl;
pub use user::{UserInterfaceDecl, UserTypeAliasDecl};

use crate::config::TsdConfig;
use crate::diagnostics::{codes, Diagnostic, DiagnosticsCollector};
use crate::doclet::Doclet;
use crate::visibility::VisibilityContext;
use crate::writer::DtsWriter;

/// Any node the generator can emit
#[derive(Debug, Clone)]
pub enum DeclNode {
    Class(ClassDecl),
    Typedef(TypedefDecl),
    Property(PropertyDecl),
    Method(MethodDecl),
    Constructor(ConstructorDecl),
    UserInterface(UserInterfaceDecl),
    UserTypeAlias(UserTypeAliasDecl),
}

impl DeclNode {
    /// Record every type name this node references
    pub fn visit(&self, ctx: &mut VisibilityContext, config: &TsdConfig) {
        match self {
            DeclNode::Class(node) => node.visit(ctx, config),
            DeclNode::Typedef(node) => node.visit(ctx, config),
            DeclNode::Property(node) => node.visit(ctx, config),
            DeclNode::Method(node) => node.visit(ctx, config),
            DeclNode::Constructor(node) => node.visit(ctx, config),
            DeclNode::UserInterface(node) => node.visit(ctx, config),
            DeclNode::UserTypeAlias(node) => node.visit(ctx, config),
        }
    }

    /// Render the declaration
    pub fn output(
        &self,
        out: &mut DtsWriter,
        config: &TsdConfig,
        diagnostics: &mut DiagnosticsCollector,
    ) {
        match self {
            DeclNode::Class(node) => node.output(out, config, diagnostics),
            DeclNode::Typedef(node) => node.output(out, config, diagnostics),
            DeclNode::Property(node) => node.output(out, config, diagnostics),
            DeclNode::Method(node) => node.output(out, config, diagnostics),
            DeclNode::Constructor(node) => node.output(out, config, diagnostics),
            DeclNode::UserInterface(node) => node.output(out),
            DeclNode::UserTypeAlias(node) => node.output(out),
        }
    }

    /// Fully qualified name: the doclet longname, or `module.Name` for user types
    pub fn qualified_name(&self) -> &str {
        match self {
            DeclNode::Class(node) => &node.doclet.longname,
            DeclNode::Typedef(node) => &node.doclet.longname,
            DeclNode::Property(node) => &node.doclet.longname,
            DeclNode::Method(node) => &node.doclet.longname,
            DeclNode::Constructor(node) => &node.class_longname,
            DeclNode::UserInterface(node) => &node.qualified,
            DeclNode::UserTypeAlias(node) => &node.qualified,
        }
    }

    /// Module path the node is emitted under, `None` for global scope
    pub fn parent_module(&self) -> Option<String> {
        match self {
            DeclNode::Class(node) => node.doclet.parent_module(),
            DeclNode::Typedef(node) => node.doclet.parent_module(),
            DeclNode::Property(node) => node.doclet.parent_module(),
            DeclNode::Method(node) => node.doclet.parent_module(),
            DeclNode::Constructor(_) => None,
            DeclNode::UserInterface(node) => node.parent_module.clone(),
            DeclNode::UserTypeAlias(node) => node.parent_module.clone(),
        }
    }

    pub fn is_public(&self) -> bool {
        match self {
            DeclNode::Class(node) => node.public,
            DeclNode::Typedef(node) => node.public,
            DeclNode::Property(node) => node.public,
            DeclNode::Method(node) => node.public,
            DeclNode::Constructor(_) => true,
            DeclNode::UserInterface(_) | DeclNode::UserTypeAlias(_) => true,
        }
    }

    /// Flip the node public; never reset once set
    pub fn make_public(&mut self) {
        match self {
            DeclNode::Class(node) => node.public = true,
            DeclNode::Typedef(node) => node.public = true,
            DeclNode::Property(node) => node.public = true,
            DeclNode::Method(node) => node.public = true,
            DeclNode::Constructor(_) | DeclNode::UserInterface(_) | DeclNode::UserTypeAlias(_) => {}
        }
    }

    /// Whether the node is a type (as opposed to a module-level member)
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            DeclNode::Class(_)
                | DeclNode::Typedef(_)
                | DeclNode::UserInterface(_)
                | DeclNode::UserTypeAlias(_)
        )
    }

    /// Append a member to a class or typedef; other nodes ignore it
    pub fn push_member(&mut self, member: DeclNode) {
        match self {
            DeclNode::Class(node) => node.members.push(member),
            DeclNode::Typedef(node) => node.members.push(member),
            _ => {}
        }
    }
}

/// Doc comment lines for a node
///
/// `tags` are extra `@param`/`@returns` lines. Without description the
/// comment is either skipped or filled with a TODO line, per config.
pub(crate) fn write_docs(
    out: &mut DtsWriter,
    doclet: &Doclet,
    description: Option<&str>,
    label: &str,
    tags: Vec<String>,
    config: &TsdConfig,
    diagnostics: &mut DiagnosticsCollector,
) {
    if config.output_doclet_defs {
        write_doclet_def(out, doclet);
    }

    let mut lines = Vec::new();
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(text) => lines.extend(text.lines().map(|l| l.trim_end().to_string())),
        None if config.fill_undocumented_doclets => {
            diagnostics.add(
                Diagnostic::hint(format!("undocumented {}", label))
                    .about(doclet.longname.clone())
                    .with_code(codes::MISSING_DOCS),
            );
            lines.push(format!("TODO: This {} is undocumented.", label));
        }
        None => {}
    }

    if !tags.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.extend(tags);
    }
    out.doc_comment(&lines);
}

/// Raw doclet JSON as `//` lines
fn write_doclet_def(out: &mut DtsWriter, doclet: &Doclet) {
    match serde_json::to_string_pretty(doclet) {
        Ok(json) => {
            for line in json.lines() {
                out.writeln(format!("// {}", line));
            }
        }
        Err(err) => tracing::warn!(name = %doclet.longname, %err, "failed to serialize doclet"),
    }
}

/// `declare ` at global scope unless disabled
pub(crate) fn declare_prefix(out: &DtsWriter, config: &TsdConfig) -> &'static str {
    if out.is_top_level() && config.declare_top_level() {
        "declare "
    } else {
        ""
    }
}

/// `<T, U>` or nothing
pub(crate) fn generic_list(generics: &[String]) -> String {
    if generics.is_empty() {
        String::new()
    } else {
        format!("<{}>", generics.join(", "))
    }
}

/// Last segment of a qualified name (`ol.Map` -> `Map`, `module:a/b~C` -> `C`)
pub(crate) fn short_name(doclet: &Doclet) -> &str {
    if !doclet.name.is_empty() {
        return &doclet.name;
    }
    doclet
        .longname
        .rsplit(['.', '~', '#', '/'])
        .next()
        .unwrap_or(&doclet.longname)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generic_list() {
        assert_eq!(generic_list(&[]), "");
        assert_eq!(generic_list(&["K".to_string(), "V".to_string()]), "<K, V>");
    }

    #[test]
    fn test_short_name_fallback() {
        let mut doclet = mock_class("module:ol/layer/Tile~TileLayer");
        doclet.name.clear();
        assert_eq!(short_name(&doclet), "TileLayer");
    }

    #[test]
    fn test_fill_undocumented() {
        let config = TsdConfig {
            fill_undocumented_doclets: true,
            ..Default::default()
        };
        let doclet = mock_class("Foo");
        let mut out = DtsWriter::new();
        let mut diagnostics = DiagnosticsCollector::new();
        write_docs(&mut out, &doclet, None, "class", vec![], &config, &mut diagnostics);

        assert_eq!(out.as_str(), "/**\n * TODO: This class is undocumented.\n */\n");
        assert_eq!(diagnostics.with_code(codes::MISSING_DOCS).count(), 1);
    }

    #[test]
    fn test_undocumented_is_silent_by_default() {
        let doclet = mock_class("Foo");
        let mut out = DtsWriter::new();
        write_docs(
            &mut out,
            &doclet,
            None,
            "class",
            vec![],
            &TsdConfig::default(),
            &mut DiagnosticsCollector::new(),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_doclet_defs_are_comments() {
        let config = TsdConfig {
            output_doclet_defs: true,
            ..Default::default()
        };
        let doclet = mock_class("Foo");
        let mut out = DtsWriter::new();
        write_docs(
            &mut out,
            &doclet,
            Some("A foo."),
            "class",
            vec![],
            &config,
            &mut DiagnosticsCollector::new(),
        );
        let text = out.finish();
        assert!(text.starts_with("// {\n//   \"name\": \"Foo\",\n"));
        assert!(text.ends_with("/**\n * A foo.\n */\n"));
    }

    #[test]
    fn test_make_public_is_monotonic() {
        let config = TsdConfig::default().with_public_annotation("api");
        let mut node = DeclNode::Class(ClassDecl::new(mock_class("Foo"), &config));
        assert!(!node.is_public());
        node.make_public();
        node.make_public();
        assert!(node.is_public());
    }
}
