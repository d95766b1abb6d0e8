//! Properties and methods

use super::{declare_prefix, generic_list, short_name, write_docs};
use crate::config::TsdConfig;
use crate::diagnostics::{codes, Diagnostic, DiagnosticsCollector};
use crate::doclet::{DocParam, Doclet, DocletKind};
use crate::types::{translate_names, DiagnosticSink};
use crate::visibility::VisibilityContext;
use crate::writer::DtsWriter;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_$][\w$]*$").unwrap();
}

/// Where a member is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberOwner {
    /// Class body: `static` applies, never `?`
    Class,
    /// Interface body of a typedef: nullable properties get `?`
    Interface,
    /// Module level: `function` / `var` / `const`
    Module,
}

/// A property, field or module-level variable
#[derive(Debug, Clone)]
pub struct PropertyDecl {
    pub doclet: Doclet,
    pub owner: MemberOwner,
    pub public: bool,
}

impl PropertyDecl {
    pub fn new(doclet: Doclet, owner: MemberOwner, config: &TsdConfig) -> Self {
        let public = doclet.is_declared_public(config.public_annotation.as_deref());
        Self {
            doclet,
            owner,
            public,
        }
    }

    /// Interface member built from a typedef `@property` entry
    ///
    /// Properties of a typedef share its visibility.
    pub fn from_typedef_property(typedef: &Doclet, property: &DocParam) -> Option<Self> {
        let name = property.name.as_deref()?;
        // `options.foo` documents a nested field
        if name.contains('.') {
            return None;
        }
        let mut doclet = Doclet::new(
            name,
            format!("{}#{}", typedef.longname, name),
            DocletKind::Member,
        );
        doclet.memberof = Some(typedef.longname.clone());
        doclet.ty = property.ty.clone();
        doclet.description = property.description.clone();
        doclet.optional = property.optional;
        doclet.nullable = property.nullable;
        Some(Self {
            doclet,
            owner: MemberOwner::Interface,
            public: true,
        })
    }

    fn is_nullable(&self) -> bool {
        self.doclet.optional == Some(true)
            || self.doclet.nullable == Some(true)
            || self.doclet.ty.as_ref().is_some_and(|t| t.is_nullable())
    }

    pub fn visit(&self, ctx: &mut VisibilityContext, config: &TsdConfig) {
        translate_names(self.doclet.type_names(), config, ctx);
    }

    pub fn output(
        &self,
        out: &mut DtsWriter,
        config: &TsdConfig,
        diagnostics: &mut DiagnosticsCollector,
    ) {
        if write_replacement(out, &self.doclet, config) {
            return;
        }
        write_docs(
            out,
            &self.doclet,
            self.doclet.description.as_deref(),
            "property",
            vec![],
            config,
            diagnostics,
        );

        let name = property_key(short_name(&self.doclet));
        let mut sink = DiagnosticSink::new(&self.doclet.longname, diagnostics);
        let ty = translate_names(self.doclet.type_names(), config, &mut sink);
        let ty = ty.unwrap_or_else(|| {
            diagnostics.add(
                Diagnostic::warning("property has no type, emitting any")
                    .about(self.doclet.longname.clone())
                    .with_code(codes::MISSING_TYPE),
            );
            "any".to_string()
        });

        let line = match self.owner {
            MemberOwner::Class => {
                let modifier = if self.doclet.is_static() { "static " } else { "" };
                format!("{}{}: {};", modifier, name, ty)
            }
            MemberOwner::Interface => {
                let mark = if self.is_nullable() { "?" } else { "" };
                format!("{}{}: {};", name, mark, ty)
            }
            MemberOwner::Module => {
                let keyword = if self.doclet.kind == DocletKind::Constant {
                    "const"
                } else {
                    "var"
                };
                format!("{}{} {}: {};", declare_prefix(out, config), keyword, name, ty)
            }
        };
        out.writeln(line);
    }
}

/// A method or module-level function
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub doclet: Doclet,
    pub owner: MemberOwner,
    pub public: bool,
}

impl MethodDecl {
    pub fn new(doclet: Doclet, owner: MemberOwner, config: &TsdConfig) -> Self {
        let public = doclet.is_declared_public(config.public_annotation.as_deref());
        Self {
            doclet,
            owner,
            public,
        }
    }

    pub fn visit(&self, ctx: &mut VisibilityContext, config: &TsdConfig) {
        let mut local = VisibilityContext::new();
        visit_signature(&self.doclet.params, &self.doclet.returns, &mut local, config);
        ctx.merge_scoped(local, &self.doclet.template_params());
    }

    pub fn output(
        &self,
        out: &mut DtsWriter,
        config: &TsdConfig,
        diagnostics: &mut DiagnosticsCollector,
    ) {
        if write_replacement(out, &self.doclet, config) {
            return;
        }
        write_docs(
            out,
            &self.doclet,
            self.doclet.description.as_deref(),
            "function",
            signature_tags(&self.doclet.params, &self.doclet.returns),
            config,
            diagnostics,
        );

        let name = short_name(&self.doclet);
        let generics = generic_list(&self.doclet.template_params());
        let params = render_params(&self.doclet.params, config, diagnostics, &self.doclet.longname);
        let returns = return_type(&self.doclet.returns, config, diagnostics, &self.doclet.longname);

        let line = match self.owner {
            MemberOwner::Class => {
                let modifier = if self.doclet.is_static() { "static " } else { "" };
                format!("{}{}{}({}): {};", modifier, name, generics, params, returns)
            }
            MemberOwner::Interface => format!("{}{}({}): {};", name, generics, params, returns),
            MemberOwner::Module => format!(
                "{}function {}{}({}): {};",
                declare_prefix(out, config),
                name,
                generics,
                params,
                returns
            ),
        };
        out.writeln(line);
    }
}

/// Emit a configured replacement instead of the generated member
fn write_replacement(out: &mut DtsWriter, doclet: &Doclet, config: &TsdConfig) -> bool {
    let Some(replacement) = config.member_replacements.get(&doclet.longname) else {
        return false;
    };
    if let Some(description) = &replacement.description {
        let lines: Vec<String> = description.lines().map(str::to_string).collect();
        out.doc_comment(&lines);
    }
    out.write_lines(&replacement.declaration);
    true
}

/// Params that belong in a signature: dotted names document object fields
fn signature_params(params: &[DocParam]) -> impl Iterator<Item = &DocParam> {
    params
        .iter()
        .filter(|p| !p.name.as_deref().is_some_and(|n| n.contains('.')))
}

/// Record parameter and return types
pub(crate) fn visit_signature(
    params: &[DocParam],
    returns: &[DocParam],
    ctx: &mut VisibilityContext,
    config: &TsdConfig,
) {
    for param in signature_params(params) {
        translate_names(param.type_names(), config, &mut *ctx);
    }
    for ret in returns {
        translate_names(ret.type_names(), config, &mut *ctx);
    }
}

/// `a: T, b?: U, ...c: V[]`
///
/// Once a parameter is optional every later one is too; a rest parameter
/// never takes `?`.
pub(crate) fn render_params(
    params: &[DocParam],
    config: &TsdConfig,
    diagnostics: &mut DiagnosticsCollector,
    subject: &str,
) -> String {
    let mut optional_seen = false;
    let rendered: Vec<String> = signature_params(params)
        .enumerate()
        .map(|(idx, param)| {
            let name = match param.name.as_deref() {
                Some(name) if IDENTIFIER.is_match(name) => name.to_string(),
                _ => format!("arg{}", idx),
            };
            let mut sink = DiagnosticSink::new(subject, diagnostics);
            let ty = translate_names(param.type_names(), config, &mut sink);
            let ty = ty.unwrap_or_else(|| {
                diagnostics.add(
                    Diagnostic::warning(format!("parameter `{}` has no type, emitting any", name))
                        .about(subject.to_string())
                        .with_code(codes::MISSING_TYPE),
                );
                "any".to_string()
            });

            if param.is_variable() {
                let element = if ty.contains('|') || ty.contains("=>") {
                    format!("({})", ty)
                } else {
                    ty
                };
                return format!("...{}: {}[]", name, element);
            }

            let admits_undefined = param.ty.as_ref().is_some_and(|t| t.admits_undefined());
            optional_seen |= param.is_optional() || admits_undefined;
            let mark = if optional_seen { "?" } else { "" };
            format!("{}{}: {}", name, mark, ty)
        })
        .collect();
    rendered.join(", ")
}

/// Union of every return entry, or the configured default
pub(crate) fn return_type(
    returns: &[DocParam],
    config: &TsdConfig,
    diagnostics: &mut DiagnosticsCollector,
    subject: &str,
) -> String {
    let names: Vec<String> = returns
        .iter()
        .flat_map(|r| r.type_names().iter().cloned())
        .collect();
    translate_names(&names, config, &mut DiagnosticSink::new(subject, diagnostics))
        .unwrap_or_else(|| config.default_return_type.clone())
}

/// `@param` / `@returns` lines for documented entries
pub(crate) fn signature_tags(params: &[DocParam], returns: &[DocParam]) -> Vec<String> {
    let mut tags = Vec::new();
    for param in signature_params(params) {
        if let (Some(name), Some(description)) = (&param.name, &param.description) {
            tags.push(format!("@param {} {}", name, description.trim()));
        }
    }
    for ret in returns {
        if let Some(description) = &ret.description {
            tags.push(format!("@returns {}", description.trim()));
        }
    }
    tags
}

/// Quote property names that are not plain identifiers
fn property_key(name: &str) -> String {
    if IDENTIFIER.is_match(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name)
    }
}
