//! Typedefs: interfaces, callback types and plain aliases

use super::member::{render_params, return_type, signature_tags, visit_signature};
use super::{generic_list, short_name, write_docs, DeclNode};
use crate::callback::CALLBACK_MARKER;
use crate::config::TsdConfig;
use crate::diagnostics::{codes, Diagnostic, DiagnosticsCollector};
use crate::doclet::Doclet;
use crate::types::{translate_names, DiagnosticSink};
use crate::visibility::VisibilityContext;
use crate::writer::DtsWriter;

/// A typedef declaration
///
/// Renders as an interface once members are attached, as a function type
/// when callback-shaped, and as a type alias otherwise.
#[derive(Debug, Clone)]
pub struct TypedefDecl {
    pub doclet: Doclet,
    pub public: bool,
    pub generics: Vec<String>,
    pub members: Vec<DeclNode>,
}

impl TypedefDecl {
    pub fn new(doclet: Doclet, config: &TsdConfig) -> Self {
        let public = doclet.is_declared_public(config.public_annotation.as_deref());
        let generics = doclet.template_params();
        Self {
            doclet,
            public,
            generics,
            members: Vec::new(),
        }
    }

    /// Function-typed with a known signature
    pub fn is_callback(&self) -> bool {
        if self.doclet.comment.contains(CALLBACK_MARKER) {
            return true;
        }
        self.doclet.is_bare_function_type()
            && (!self.doclet.params.is_empty() || !self.doclet.returns.is_empty())
    }

    pub fn visit(&self, ctx: &mut VisibilityContext, config: &TsdConfig) {
        let mut local = VisibilityContext::new();
        if !self.members.is_empty() {
            for member in &self.members {
                member.visit(&mut local, config);
            }
        } else if self.is_callback() {
            visit_signature(&self.doclet.params, &self.doclet.returns, &mut local, config);
        } else {
            translate_names(self.doclet.type_names(), config, &mut local);
        }
        ctx.merge_scoped(local, &self.generics);
    }

    pub fn output(
        &self,
        out: &mut DtsWriter,
        config: &TsdConfig,
        diagnostics: &mut DiagnosticsCollector,
    ) {
        let name = short_name(&self.doclet);
        let generics = generic_list(&self.generics);
        let callback = self.members.is_empty() && self.is_callback();
        let tags = if callback {
            signature_tags(&self.doclet.params, &self.doclet.returns)
        } else {
            vec![]
        };
        write_docs(
            out,
            &self.doclet,
            self.doclet.description.as_deref(),
            "type",
            tags,
            config,
            diagnostics,
        );

        if !self.members.is_empty() {
            out.writeln(format!("interface {}{} {{", name, generics));
            out.indent();
            for member in &self.members {
                member.output(out, config, diagnostics);
            }
            out.unindent();
            out.writeln("}");
            return;
        }

        if callback {
            let subject = &self.doclet.longname;
            let params = render_params(&self.doclet.params, config, diagnostics, subject);
            let returns = return_type(&self.doclet.returns, config, diagnostics, subject);
            out.writeln(format!("type {}{} = ({}) => {};", name, generics, params, returns));
            return;
        }

        let mut sink = DiagnosticSink::new(&self.doclet.longname, diagnostics);
        let ty = translate_names(self.doclet.type_names(), config, &mut sink);
        match ty {
            Some(ty) => out.writeln(format!("type {}{} = {};", name, generics, ty)),
            None => {
                diagnostics.add(
                    Diagnostic::warning("typedef has no type information, emitting any")
                        .about(self.doclet.longname.clone())
                        .with_code(codes::MISSING_TYPE),
                );
                out.writeln(format!("// No type information found for {}", self.doclet.longname));
                out.writeln(format!("type {}{} = any;", name, generics));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback;
    use crate::decl::PropertyDecl;
    use crate::doclet::DocTag;
    use crate::test::*;
    use pretty_assertions::assert_eq;

    fn render(typedef: &TypedefDecl) -> (String, DiagnosticsCollector) {
        let mut out = DtsWriter::new();
        let mut diagnostics = DiagnosticsCollector::new();
        typedef.output(&mut out, &TsdConfig::default(), &mut diagnostics);
        (out.finish(), diagnostics)
    }

    #[test]
    fn test_alias() {
        let config = TsdConfig::default();
        let typedef = TypedefDecl::new(mock_typedef("ol.Extent", &["Array.<number>"]), &config);
        assert_eq!(render(&typedef).0, "type Extent = number[];\n");
    }

    #[test]
    fn test_callback_from_rewritten_doclet() {
        let config = TsdConfig::default();
        let doclet = callback::rewrite(
            mock_callback_typedef(
                "Foo",
                "function(string):number",
                "/** @typedef {function(string): number} */",
            ),
            &mut DiagnosticsCollector::new(),
        );
        let typedef = TypedefDecl::new(doclet, &config);
        assert!(typedef.is_callback());
        assert_eq!(render(&typedef).0, "type Foo = (arg0: string) => number;\n");
    }

    #[test]
    fn test_generic_callback_visit_drops_placeholders() {
        let config = TsdConfig::default();
        let mut doclet = mock_typedef("ol.Filter", &["function"]);
        doclet.tags.push(DocTag::new("template", "T"));
        doclet.params = vec![mock_param("item", &["T"]), mock_param("layer", &["ol.Layer"])];
        doclet.returns = vec![mock_param("", &["boolean"])];
        let typedef = TypedefDecl::new(doclet, &config);

        assert_eq!(
            render(&typedef).0,
            "type Filter<T> = (item: T, layer: ol.Layer) => boolean;\n"
        );
        let mut ctx = VisibilityContext::new();
        typedef.visit(&mut ctx, &config);
        assert_eq!(ctx.snapshot(), vec!["ol.Layer"]);
    }

    #[test]
    fn test_members_make_an_interface() {
        let config = TsdConfig::default();
        let doclet = mock_typedef("olx.ViewOptions", &["Object"]);
        let mut typedef = TypedefDecl::new(doclet.clone(), &config);
        let mut zoom = mock_param("zoom", &["number", "undefined"]);
        zoom.description = Some("Zoom level.".to_string());
        typedef.members.push(DeclNode::Property(
            PropertyDecl::from_typedef_property(&doclet, &zoom).unwrap(),
        ));

        assert_eq!(
            render(&typedef).0,
            "interface ViewOptions {\n    /**\n     * Zoom level.\n     */\n    zoom?: number;\n}\n"
        );
    }

    #[test]
    fn test_untyped_typedef_falls_back_to_any() {
        let config = TsdConfig::default();
        let typedef = TypedefDecl::new(mock_typedef("ol.Mystery", &[]), &config);
        let (text, diagnostics) = render(&typedef);
        assert_eq!(
            text,
            "// No type information found for ol.Mystery\ntype Mystery = any;\n"
        );
        assert_eq!(diagnostics.with_code(codes::MISSING_TYPE).count(), 1);
    }
}
