//! Callback typedef rewriting
//!
//! `@typedef {function(string, number=): boolean}` reaches the generator as a
//! typedef whose type is just `function`, with no params or returns. This
//! pre-pass re-reads the signature from the raw comment and returns a doclet
//! carrying synthesized `arg0..argN` params and a return entry, plus an
//! `@callback` marker so a second pass leaves it alone.

use crate::diagnostics::{codes, Diagnostic, DiagnosticsCollector};
use crate::doclet::{DocParam, DocType, Doclet, DocletKind};
use crate::types::{is_balanced, split_top_level, strip_optional_marker, FunctionArg};
use lazy_static::lazy_static;
use regex::Regex;

/// Marker placed in the comment of rewritten (or native) callback typedefs
pub const CALLBACK_MARKER: &str = "@callback";

lazy_static! {
    /// Continuation prefix of a multi-line doc comment (`\n *   `)
    static ref LINE_MARKER: Regex = Regex::new(r"\r?\n[ \t]*\*?[ \t]*").unwrap();

    /// `function(ARGS): RET`
    static ref WITH_RETURN: Regex = Regex::new(r"^function\s*\((.*)\)\s*:\s*(.+)$").unwrap();

    /// `function(ARGS)`
    static ref WITHOUT_RETURN: Regex = Regex::new(r"^function\s*\((.*)\)$").unwrap();

    /// `this:T` / `new:T` entries
    static ref CONTEXT_ARG: Regex = Regex::new(r"^\s*[\w$]+\s*:").unwrap();
}

/// Signature recovered from a callback annotation
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackSignature {
    pub params: Vec<DocParam>,
    pub returns: Vec<DocParam>,
}

/// Whether the doclet is a typedef with a single function-shaped type
pub fn is_candidate(doclet: &Doclet) -> bool {
    if doclet.kind != DocletKind::Typedef {
        return false;
    }
    match doclet.type_names() {
        [only] => {
            let only = only.trim();
            only == "function" || only.starts_with("function(")
        }
        _ => false,
    }
}

/// Whether the comment already carries the callback marker
pub fn is_rewritten(doclet: &Doclet) -> bool {
    doclet.comment.contains(CALLBACK_MARKER)
}

/// Rewrite a function-shaped typedef into callback form
///
/// Anything that is not a candidate, or already rewritten, is returned as
/// is. When no signature can be recovered the doclet is also returned
/// unchanged and a `callback-unmatched` diagnostic is recorded.
pub fn rewrite(doclet: Doclet, diagnostics: &mut DiagnosticsCollector) -> Doclet {
    if !is_candidate(&doclet) || is_rewritten(&doclet) {
        return doclet;
    }

    let source = annotation_text(&doclet.comment)
        .or_else(|| doclet.type_names().first().map(|t| t.trim().to_string()))
        .unwrap_or_default();

    // `@typedef {function}` with explicit @param tags has nothing to recover
    if source == "function" {
        tracing::debug!(name = %doclet.longname, "bare function typedef, nothing to rewrite");
        return doclet;
    }

    let Some(signature) = parse_signature(&source) else {
        diagnostics.add(
            Diagnostic::info(format!("unrecognised callback signature `{}`", source))
                .about(doclet.longname.clone())
                .with_code(codes::CALLBACK_UNMATCHED),
        );
        return doclet;
    };

    tracing::debug!(
        name = %doclet.longname,
        params = signature.params.len(),
        "rewrote callback typedef"
    );

    let comment = mark_comment(&doclet.comment);
    Doclet {
        params: signature.params,
        returns: signature.returns,
        comment,
        ..doclet
    }
}

/// Parse `function(ARGS)[: RET]` into positional params and a return entry
pub fn parse_signature(source: &str) -> Option<CallbackSignature> {
    let source = source.trim();
    let (args, ret) = match WITH_RETURN.captures(source) {
        Some(caps) if is_balanced(&caps[1]) => (caps[1].to_string(), Some(caps[2].to_string())),
        _ => {
            let caps = WITHOUT_RETURN.captures(source)?;
            if !is_balanced(&caps[1]) {
                return None;
            }
            (caps[1].to_string(), None)
        }
    };

    let params = split_top_level(&args, ',')
        .into_iter()
        .filter(|entry| !CONTEXT_ARG.is_match(entry))
        .enumerate()
        .map(|(idx, entry)| {
            let arg = FunctionArg::parse(entry);
            DocParam {
                ty: Some(DocType::new(
                    split_top_level(arg.ty, '|')
                        .into_iter()
                        .map(|member| strip_optional_marker(member).0),
                )),
                name: Some(format!("arg{}", idx)),
                optional: arg.optional.then_some(true),
                variable: arg.variable.then_some(true),
                ..Default::default()
            }
        })
        .collect();

    let returns = ret
        .map(|ret| vec![DocParam::typed(split_top_level(ret.trim(), '|'))])
        .unwrap_or_default();

    Some(CallbackSignature { params, returns })
}

/// Text inside the braces following `@typedef`, continuation markers removed
fn annotation_text(comment: &str) -> Option<String> {
    let flat = LINE_MARKER.replace_all(comment, " ");
    let after = &flat[flat.find("@typedef")? + "@typedef".len()..];
    let after = after.trim_start();
    if !after.starts_with('{') {
        return None;
    }

    let mut depth = 0usize;
    for (idx, ch) in after.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(after[1..idx].trim().to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Insert the callback marker before the comment terminator
fn mark_comment(comment: &str) -> String {
    match comment.rfind("*/") {
        Some(end) => format!("{}{} {}", &comment[..end], CALLBACK_MARKER, &comment[end..]),
        None if comment.is_empty() => CALLBACK_MARKER.to_string(),
        None => format!("{} {}", comment, CALLBACK_MARKER),
    }
}
