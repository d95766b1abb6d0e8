//! Type expression translator
//!
//! Converts JSDoc type expressions (`Array.<string>`, `Object.<K,V>`,
//! `function(number): string`, `A|B`, ...) into TypeScript type syntax.
//!
//! Patterns are tried in a fixed order and the first match wins:
//!
//! | # | JSDoc | TypeScript |
//! |---|-------|------------|
//! | 1 | exact `typeReplacements` key | replacement |
//! | 2 | `Array.<T>`, `T[]` | `T[]` |
//! | 3 | `Object.<K,V>` | `{ [key: K]: V; }` |
//! | 4 | `Name.<T1,T2>` | `Name<T1, T2>` |
//! | 5 | `function(T1,T2)` | `(arg0: T1, arg1: T2) => any` |
//! | 6 | `array` (any case) | `any[]` |
//! | 7 | `A\|B` | `A\|B` |
//! | 8 | anything else | unchanged, recorded as a reference |
//!
//! The order matters for inputs matching several patterns: `Array.<K,V>`
//! takes the array form (2) and never reaches the generic form (4).
//!
//! Between 7 and 8 a few JSDoc-only spellings are normalised: parenthesised
//! groups, record types `{a: T}`, and the `?T`, `!T` and `T=` markers.

use crate::config::TsdConfig;
use crate::diagnostics::{codes, Diagnostic, DiagnosticsCollector};
use crate::visibility::VisibilityContext;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Base of a generic application (`Name` in `Name.<T>`)
    static ref GENERIC_BASE: Regex = Regex::new(r"^[\w$.:/~#-]+$").unwrap();

    /// A contextual parameter inside `function(...)`: `this:T`, `new:T`
    static ref CONTEXT_PARAM: Regex = Regex::new(r"^\s*[\w$]+\s*:").unwrap();

    /// One `key: Type` entry of a record type
    static ref RECORD_FIELD: Regex = Regex::new(r"^\s*([\w$]+)\s*(?::\s*(.+))?$").unwrap();
}

/// Names dropped from multi-name type lists
const NULLISH: &[&str] = &["null", "undefined"];

/// Receives what translation runs into
pub trait TypeSink {
    /// A name that reached the fallback
    fn reference(&mut self, _name: &str) {}

    /// An `array` keyword with no element type
    fn untyped_array(&mut self, _raw: &str) {}
}

/// Discards everything
impl TypeSink for () {}

impl TypeSink for VisibilityContext {
    fn reference(&mut self, name: &str) {
        self.add(name);
    }
}

/// Reports translation anomalies of one declaration while it is rendered
pub struct DiagnosticSink<'a> {
    subject: &'a str,
    diagnostics: &'a mut DiagnosticsCollector,
}

impl<'a> DiagnosticSink<'a> {
    pub fn new(subject: &'a str, diagnostics: &'a mut DiagnosticsCollector) -> Self {
        Self {
            subject,
            diagnostics,
        }
    }
}

impl TypeSink for DiagnosticSink<'_> {
    fn untyped_array(&mut self, raw: &str) {
        self.diagnostics.add(
            Diagnostic::warning(format!("untyped `{}` annotation, emitting any[]", raw))
                .about(self.subject.to_string())
                .with_code(codes::UNTYPED_ARRAY),
        );
    }
}

/// Translate one JSDoc type expression into TypeScript syntax
///
/// Names reaching the fallback and untyped arrays are handed to `sink`;
/// translation is otherwise side-effect free.
pub fn translate(raw: &str, config: &TsdConfig, sink: &mut dyn TypeSink) -> String {
    let name = raw.trim();

    // 1. User/default replacement table
    if let Some(replacement) = config.type_replacement(name) {
        return replacement.to_string();
    }

    // 2. Array.<T> / T[]
    if let Some(element) = array_element(name) {
        return format!("{}[]", translate(element, config, sink));
    }

    // 3. Object.<K,V>
    if let Some((base, args)) = split_generic(name) {
        if base == "Object" {
            if let [key, value] = split_top_level(args, ',').as_slice() {
                return format!(
                    "{{ [key: {}]: {}; }}",
                    translate(key, config, sink),
                    translate(value, config, sink)
                );
            }
        }
    }

    // 4. Name.<T1,T2,...>
    if let Some((base, args)) = split_generic(name) {
        let base = translate(base, config, sink);
        let args: Vec<String> = split_top_level(args, ',')
            .into_iter()
            .map(|arg| translate(arg, config, sink))
            .collect();
        return format!("{}<{}>", base, args.join(", "));
    }

    // 5. function(T1,T2,...)[: R]
    if let Some(signature) = FunctionExpr::parse(name) {
        return signature.to_typescript(config, sink);
    }

    // 6. Untyped array keyword
    if name.eq_ignore_ascii_case("array") {
        sink.untyped_array(name);
        return "any[]".to_string();
    }

    // 7. A|B|...
    let members = split_top_level(name, '|');
    if members.len() > 1 {
        let members: Vec<String> = members
            .into_iter()
            .map(|member| translate(member, config, sink))
            .collect();
        return members.join("|");
    }

    if let Some(inner) = strip_wrapping(name, '(', ')') {
        return format!("({})", translate(inner, config, sink));
    }
    if let Some(fields) = strip_wrapping(name, '{', '}') {
        return translate_record(fields, config, sink);
    }
    if let Some(inner) = strip_marker(name) {
        return translate(inner, config, sink);
    }

    // 8. Fallback
    sink.reference(name);
    name.to_string()
}

/// Translate a multi-name type list, dropping `null`/`undefined`
///
/// Returns `None` when nothing but nullish names (or nothing at all) remain.
pub fn translate_names(
    names: &[String],
    config: &TsdConfig,
    sink: &mut dyn TypeSink,
) -> Option<String> {
    let translated: Vec<String> = names
        .iter()
        .filter(|n| !NULLISH.contains(&n.trim()))
        .map(|n| translate(n, config, sink))
        .collect();
    if translated.is_empty() {
        None
    } else {
        Some(translated.join("|"))
    }
}

/// `Array.<T>`, `Array<T>` or `T[]`
fn array_element(name: &str) -> Option<&str> {
    if let Some((base, args)) = split_generic(name) {
        if base == "Array" {
            return Some(args);
        }
    }
    name.strip_suffix("[]").filter(|element| !element.trim().is_empty())
}

/// Split `Name.<args>` / `Name<args>` into base and argument text
///
/// Only matches when the bracket opened after the base closes at the very
/// end of the expression, so `Foo.<A>|Bar.<B>` is left to the union rule.
pub fn split_generic(name: &str) -> Option<(&str, &str)> {
    let open = name.find('<')?;
    let base = name[..open].strip_suffix('.').unwrap_or(&name[..open]);
    if base.is_empty() || !GENERIC_BASE.is_match(base) {
        return None;
    }
    let close = matching_close(name, open)?;
    if close != name.len() - 1 {
        return None;
    }
    Some((base, &name[open + 1..close]))
}

/// Split on `sep` at bracket depth zero; entries are trimmed, empties dropped
pub fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut prev = '\0';

    for (idx, ch) in text.char_indices() {
        match ch {
            '<' | '(' | '[' | '{' => depth += 1,
            // `=>` of an arrow type is not a closing bracket
            '>' if prev == '=' => {}
            '>' | ')' | ']' | '}' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(text[start..idx].trim());
                start = idx + ch.len_utf8();
            }
            _ => {}
        }
        prev = ch;
    }
    parts.push(text[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

/// Byte index of the bracket closing the one at `open`
fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    let mut prev = '\0';
    for (idx, ch) in text[open..].char_indices() {
        match ch {
            '<' | '(' | '[' | '{' => depth += 1,
            '>' if prev == '=' => {}
            '>' | ')' | ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + idx);
                }
            }
            _ => {}
        }
        prev = ch;
    }
    None
}

/// Whether every bracket in `text` is closed
pub fn is_balanced(text: &str) -> bool {
    let mut depth = 0i32;
    let mut prev = '\0';
    for ch in text.chars() {
        match ch {
            '<' | '(' | '[' | '{' => depth += 1,
            '>' if prev == '=' => {}
            '>' | ')' | ']' | '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
        prev = ch;
    }
    depth == 0
}

/// Inner text of `open ... close` when the pair wraps the whole expression
fn strip_wrapping(name: &str, open: char, close: char) -> Option<&str> {
    if !name.starts_with(open) || !name.ends_with(close) {
        return None;
    }
    if matching_close(name, 0)? != name.len() - close.len_utf8() {
        return None;
    }
    Some(&name[open.len_utf8()..name.len() - close.len_utf8()])
}

/// Strip a JSDoc `?T`, `!T` or `T=` marker
fn strip_marker(name: &str) -> Option<&str> {
    if name.len() < 2 {
        return None;
    }
    name.strip_prefix('?')
        .or_else(|| name.strip_prefix('!'))
        .or_else(|| name.strip_suffix('='))
}

/// Strip a `?T` or `T=` optional marker, reporting whether one was there
pub fn strip_optional_marker(name: &str) -> (&str, bool) {
    let name = name.trim();
    if name.len() < 2 {
        return (name, false);
    }
    if let Some(rest) = name.strip_prefix('?') {
        return (rest.trim(), true);
    }
    if let Some(rest) = name.strip_suffix('=') {
        return (rest.trim(), true);
    }
    (name, false)
}

/// `{a: number, b}` -> `{ a: number; b: any; }`
fn translate_record(fields: &str, config: &TsdConfig, sink: &mut dyn TypeSink) -> String {
    let mut rendered = Vec::new();
    for field in split_top_level(fields, ',') {
        let Some(caps) = RECORD_FIELD.captures(field) else {
            rendered.push(format!("{};", field));
            continue;
        };
        let key = &caps[1];
        let ty = match caps.get(2) {
            Some(ty) => translate(ty.as_str(), config, sink),
            None => "any".to_string(),
        };
        rendered.push(format!("{}: {};", key, ty));
    }
    if rendered.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", rendered.join(" "))
    }
}

/// One positional argument of a `function(...)` expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionArg<'a> {
    /// Raw type text with markers stripped
    pub ty: &'a str,
    /// Declared with `?T` or `T=`
    pub optional: bool,
    /// Declared with `...T`
    pub variable: bool,
}

impl<'a> FunctionArg<'a> {
    /// Parse one argument entry, stripping `?`, `=` and `...` markers
    pub fn parse(entry: &'a str) -> Self {
        let mut ty = entry.trim();
        let mut variable = false;

        if let Some(rest) = ty.strip_prefix("...") {
            ty = rest.trim();
            variable = true;
        }
        let (bare, marked) = strip_optional_marker(ty);
        ty = bare;
        // A marker on any union member makes the whole argument optional
        let optional = marked
            || split_top_level(ty, '|')
                .into_iter()
                .any(|member| strip_optional_marker(member).1);

        Self {
            ty,
            optional,
            variable,
        }
    }
}

/// A parsed `function(ARGS)[: RET]` expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionExpr<'a> {
    pub args: Vec<FunctionArg<'a>>,
    pub returns: Option<&'a str>,
}

impl<'a> FunctionExpr<'a> {
    /// Parse a function expression; contextual `this:`/`new:` entries are dropped
    pub fn parse(name: &'a str) -> Option<Self> {
        let rest = name.strip_prefix("function")?.trim_start();
        if !rest.starts_with('(') {
            return None;
        }
        let offset = name.len() - rest.len();
        let close = matching_close(name, offset)?;
        let args_text = &name[offset + 1..close];
        let tail = name[close + 1..].trim();

        let returns = if tail.is_empty() {
            None
        } else {
            let ret = tail.strip_prefix(':')?.trim();
            if ret.is_empty() {
                return None;
            }
            Some(ret)
        };

        let args = split_top_level(args_text, ',')
            .into_iter()
            .filter(|arg| !CONTEXT_PARAM.is_match(arg))
            .map(FunctionArg::parse)
            .collect();

        Some(Self { args, returns })
    }

    /// Render as an arrow function type with synthesized `argN` names
    pub fn to_typescript(&self, config: &TsdConfig, sink: &mut dyn TypeSink) -> String {
        let mut optional_seen = false;
        let params: Vec<String> = self
            .args
            .iter()
            .enumerate()
            .map(|(idx, arg)| {
                let ty = translate(arg.ty, config, sink);
                if arg.variable {
                    return format!("...arg{}: {}[]", idx, ty);
                }
                optional_seen |= arg.optional;
                let mark = if optional_seen { "?" } else { "" };
                format!("arg{}{}: {}", idx, mark, ty)
            })
            .collect();

        let returns = match self.returns {
            Some(ret) => translate(ret, config, sink),
            None => config.default_return_type.clone(),
        };

        format!("({}) => {}", params.join(", "), returns)
    }
}
