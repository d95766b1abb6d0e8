//! Classes and their constructors

use super::member::{render_params, signature_tags, visit_signature};
use super::{declare_prefix, generic_list, short_name, write_docs, DeclNode};
use crate::config::TsdConfig;
use crate::diagnostics::{codes, Diagnostic, DiagnosticsCollector};
use crate::doclet::Doclet;
use crate::types::{translate, DiagnosticSink};
use crate::visibility::VisibilityContext;
use crate::writer::DtsWriter;

/// Tag suppressing the generated constructor
const HIDE_CONSTRUCTOR: &str = "hideconstructor";

/// A class declaration
#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub doclet: Doclet,
    pub public: bool,
    pub generics: Vec<String>,
    pub constructor: Option<ConstructorDecl>,
    /// Members in discovery order
    pub members: Vec<DeclNode>,
}

impl ClassDecl {
    pub fn new(doclet: Doclet, config: &TsdConfig) -> Self {
        let public = doclet.is_declared_public(config.public_annotation.as_deref());
        let generics = doclet.template_params();
        let constructor = if doclet.has_tag(HIDE_CONSTRUCTOR) {
            None
        } else {
            Some(ConstructorDecl::new(&doclet, generics.clone()))
        };
        Self {
            doclet,
            public,
            generics,
            constructor,
            members: Vec::new(),
        }
    }

    pub fn visit(&self, ctx: &mut VisibilityContext, config: &TsdConfig) {
        let mut local = VisibilityContext::new();
        for parent in &self.doclet.augments {
            translate(parent, config, &mut local);
        }
        if let Some(ctor) = &self.constructor {
            ctor.visit(&mut local, config);
        }
        for member in self.members.iter().filter(|m| m.is_public()) {
            member.visit(&mut local, config);
        }
        ctx.merge_scoped(local, &self.generics);
    }

    pub fn output(
        &self,
        out: &mut DtsWriter,
        config: &TsdConfig,
        diagnostics: &mut DiagnosticsCollector,
    ) {
        let description = self
            .doclet
            .classdesc
            .as_deref()
            .or(self.doclet.description.as_deref());
        write_docs(out, &self.doclet, description, "class", vec![], config, diagnostics);

        let mut header = format!(
            "{}class {}{}",
            declare_prefix(out, config),
            short_name(&self.doclet),
            generic_list(&self.generics)
        );
        let mut sink = DiagnosticSink::new(&self.doclet.longname, diagnostics);
        let parents: Vec<String> = self
            .doclet
            .augments
            .iter()
            .map(|p| translate(p, config, &mut sink))
            .collect();
        let mut parents = parents.into_iter();
        if let Some(first) = parents.next() {
            header.push_str(&format!(" extends {}", first));
        }
        let rest: Vec<String> = parents.collect();
        if !rest.is_empty() {
            diagnostics.add(
                Diagnostic::info(format!(
                    "class augments {} types, extra ones emitted as implements",
                    rest.len() + 1
                ))
                .about(self.doclet.longname.clone())
                .with_code(codes::EXTRA_AUGMENTS),
            );
            header.push_str(&format!(" implements {}", rest.join(", ")));
        }

        out.writeln(format!("{} {{", header));
        out.indent();
        if let Some(ctor) = &self.constructor {
            ctor.output(out, config, diagnostics);
        }
        for member in self.members.iter().filter(|m| m.is_public()) {
            member.output(out, config, diagnostics);
        }
        out.unindent();
        out.writeln("}");
    }
}

/// `constructor(...)` of a class
///
/// Parameters come from the class doclet; the class generics are in scope
/// but never redeclared.
#[derive(Debug, Clone)]
pub struct ConstructorDecl {
    pub class_longname: String,
    pub doclet: Doclet,
    pub generics: Vec<String>,
}

impl ConstructorDecl {
    pub fn new(class: &Doclet, generics: Vec<String>) -> Self {
        Self {
            class_longname: class.longname.clone(),
            doclet: class.clone(),
            generics,
        }
    }

    pub fn visit(&self, ctx: &mut VisibilityContext, config: &TsdConfig) {
        let mut local = VisibilityContext::new();
        visit_signature(&self.doclet.params, &[], &mut local, config);
        ctx.merge_scoped(local, &self.generics);
    }

    pub fn output(
        &self,
        out: &mut DtsWriter,
        config: &TsdConfig,
        diagnostics: &mut DiagnosticsCollector,
    ) {
        // With a separate @classdesc, the description belongs to the constructor
        let description = match (&self.doclet.classdesc, &self.doclet.description) {
            (Some(_), Some(description)) => description.clone(),
            _ => config.ctor_description(&self.class_longname),
        };
        write_docs(
            out,
            &self.doclet,
            Some(&description),
            "constructor",
            signature_tags(&self.doclet.params, &[]),
            config,
            diagnostics,
        );
        let params = render_params(&self.doclet.params, config, diagnostics, &self.class_longname);
        out.writeln(format!("constructor({});", params));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{MemberOwner, MethodDecl, PropertyDecl};
    use crate::doclet::DocTag;
    use crate::test::*;
    use pretty_assertions::assert_eq;

    fn render(class: &ClassDecl, config: &TsdConfig) -> (String, DiagnosticsCollector) {
        let mut out = DtsWriter::new();
        let mut diagnostics = DiagnosticsCollector::new();
        class.output(&mut out, config, &mut diagnostics);
        (out.finish(), diagnostics)
    }

    #[test]
    fn test_class_with_members() {
        let config = TsdConfig::default();
        let mut doclet = mock_class("ol.Collection");
        doclet.classdesc = Some("An expanded array.".to_string());
        doclet.description = Some("Creates a collection.".to_string());
        doclet.augments.push("ol.Object".to_string());
        doclet.tags.push(DocTag::new("template", "T"));
        doclet.params.push(mock_optional_param("array", &["Array.<T>"]));

        let mut class = ClassDecl::new(doclet, &config);
        class.members.push(DeclNode::Method(MethodDecl::new(
            mock_method("ol.Collection", "item", vec![mock_param("index", &["number"])], vec!["T"]),
            MemberOwner::Class,
            &config,
        )));
        class.members.push(DeclNode::Property(PropertyDecl::new(
            mock_property("ol.Collection", "length", &["number"]),
            MemberOwner::Class,
            &config,
        )));

        let (text, _) = render(&class, &config);
        assert_eq!(
            text,
            "/**\n * An expanded array.\n */\n\
             declare class Collection<T> extends ol.Object {\n\
             \x20   /**\n\
             \x20    * Creates a collection.\n\
             \x20    */\n\
             \x20   constructor(array?: T[]);\n\
             \x20   item(index: number): T;\n\
             \x20   length: number;\n\
             }\n"
        );

        let mut ctx = VisibilityContext::new();
        class.visit(&mut ctx, &config);
        assert_eq!(ctx.snapshot(), vec!["ol.Object"]);
    }

    #[test]
    fn test_default_constructor_description() {
        let config = TsdConfig::default();
        let class = ClassDecl::new(mock_class("Foo"), &config);
        let (text, _) = render(&class, &config);
        assert_eq!(
            text,
            "declare class Foo {\n    /**\n     * Constructor for Foo\n     */\n    constructor();\n}\n"
        );
    }

    #[test]
    fn test_hidden_constructor_and_private_members() {
        let config = TsdConfig::default().with_public_annotation("api");
        let mut doclet = api(mock_class("Foo"));
        doclet.tags.push(DocTag::new(HIDE_CONSTRUCTOR, ""));
        let mut class = ClassDecl::new(doclet, &config);
        class.members.push(DeclNode::Property(PropertyDecl::new(
            mock_property("Foo", "secret", &["Bar"]),
            MemberOwner::Class,
            &config,
        )));

        let (text, _) = render(&class, &config);
        assert_eq!(text, "declare class Foo {\n}\n");

        let mut ctx = VisibilityContext::new();
        class.visit(&mut ctx, &config);
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_extra_augments_become_implements() {
        let config = TsdConfig {
            do_not_declare_top_level_elements: true,
            ..Default::default()
        };
        let mut doclet = mock_class("Foo");
        doclet.augments = vec!["Base".to_string(), "Mixin".to_string(), "Other".to_string()];
        doclet.tags.push(DocTag::new(HIDE_CONSTRUCTOR, ""));
        let class = ClassDecl::new(doclet, &config);

        let (text, diagnostics) = render(&class, &config);
        assert_eq!(text, "class Foo extends Base implements Mixin, Other {\n}\n");
        assert_eq!(diagnostics.with_code(codes::EXTRA_AUGMENTS).count(), 1);
    }
}
