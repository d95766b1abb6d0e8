//! Public surface closure
//!
//! Every public declaration records the type names it references into a
//! [`VisibilityContext`]. [`close_public_surface`] then drains the context:
//! each recorded name is resolved against the registry and, if it names a
//! non-public class or typedef, that declaration is hoisted to public and
//! visited in turn. The loop ends when a pass adds nothing new.

use crate::config::TsdConfig;
use crate::decl::DeclNode;
use crate::diagnostics::{codes, Diagnostic, DiagnosticsCollector};
use crate::registry::Registry;
use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    /// A plain or dotted/module-qualified type reference
    static ref TYPE_REFERENCE: Regex =
        Regex::new(r"^(?:module:)?[A-Za-z_$][\w$-]*(?:[./~#][A-Za-z_$][\w$-]*)*$").unwrap();
}

/// Names that never resolve to a documented declaration
const BUILTIN_TYPES: &[&str] = &[
    "any", "unknown", "never", "void", "null", "undefined", "string", "number", "boolean",
    "bigint", "symbol", "object", "this", "true", "false", "String", "Number", "Boolean",
    "Symbol", "BigInt", "Object", "Function", "Array", "Date", "RegExp", "Error", "TypeError",
    "RangeError", "Promise", "PromiseLike", "Map", "Set", "WeakMap", "WeakSet", "Iterable",
    "Iterator", "ArrayLike", "ArrayBuffer", "DataView", "Int8Array", "Uint8Array",
    "Uint8ClampedArray", "Int16Array", "Uint16Array", "Int32Array", "Uint32Array",
    "Float32Array", "Float64Array", "JSON", "Math", "Event", "Element", "HTMLElement",
    "HTMLCanvasElement", "HTMLImageElement", "HTMLVideoElement", "Node", "Document", "Window",
    "CanvasRenderingContext2D", "WebGLRenderingContext", "Image", "XMLHttpRequest",
];

/// Ordered set of type names referenced by visited declarations
#[derive(Debug, Clone, Default)]
pub struct VisibilityContext {
    names: IndexSet<String>,
}

impl VisibilityContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a referenced name; built-ins and non-identifiers are skipped
    ///
    /// Returns whether the name was newly recorded.
    pub fn add(&mut self, name: &str) -> bool {
        let name = name.trim();
        if BUILTIN_TYPES.contains(&name) || !TYPE_REFERENCE.is_match(name) {
            return false;
        }
        self.names.insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.names.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Copy of the current names, in insertion order
    pub fn snapshot(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }

    /// Merge names recorded by a nested declaration, minus its generic
    /// placeholders
    pub fn merge_scoped(&mut self, inner: VisibilityContext, generics: &[String]) {
        for name in inner.names {
            if !generics.iter().any(|g| *g == name) {
                self.names.insert(name);
            }
        }
    }
}

/// Kind of a public type reported in the public-types dump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicTypeKind {
    Class,
    Typedef,
    Interface,
    Alias,
}

/// One entry of the final public type set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicType {
    pub kind: PublicTypeKind,
    pub name: String,
}

/// Outcome of the closure loop
#[derive(Debug, Clone, Default)]
pub struct ClosureReport {
    /// Every public type after closure, registry order
    pub public_types: Vec<PublicType>,
    /// Names hoisted to public, in hoisting order
    pub hoisted: Vec<String>,
    /// Referenced names that resolved to nothing
    pub unresolved: Vec<String>,
    /// Number of drain passes over the context
    pub passes: usize,
}

/// Force `makePublic` entries, then hoist every referenced declaration
/// until the public surface is closed under references
pub fn close_public_surface(
    registry: &mut Registry,
    config: &TsdConfig,
    diagnostics: &mut DiagnosticsCollector,
) -> ClosureReport {
    let mut report = ClosureReport::default();

    for longname in &config.make_public {
        match registry.resolve_mut(longname) {
            Some(node) => {
                if !node.is_public() {
                    node.make_public();
                    report.hoisted.push(longname.clone());
                }
            }
            None => diagnostics.add(
                Diagnostic::warning("makePublic entry does not name a class or typedef")
                    .about(longname.clone())
                    .with_code(codes::UNRESOLVED_TYPE),
            ),
        }
    }

    let mut ctx = VisibilityContext::new();
    for node in registry.user_types.values() {
        node.visit(&mut ctx, config);
    }
    for node in registry.declared_nodes() {
        if node.is_public() {
            node.visit(&mut ctx, config);
        }
    }

    let mut unresolved: IndexSet<String> = IndexSet::new();
    while !ctx.is_empty() {
        report.passes += 1;
        for name in ctx.snapshot() {
            ctx.remove(&name);
            // Classes, then typedefs, then user types
            if let Some(node) = registry.resolve_mut(&name) {
                if !node.is_public() {
                    tracing::debug!(name = %name, "hoisting referenced type to public");
                    node.make_public();
                    node.visit(&mut ctx, config);
                    report.hoisted.push(name);
                }
                continue;
            }
            if registry.user_types.contains_key(&name) {
                continue;
            }
            if unresolved.insert(name.clone()) {
                diagnostics.add(
                    Diagnostic::warning("referenced but undefined type")
                        .about(name)
                        .with_code(codes::UNRESOLVED_TYPE),
                );
            }
        }
    }

    report.unresolved = unresolved.into_iter().collect();
    report.public_types = registry.public_types();
    report
}

/// Public type entry for a node, `None` for members
pub(crate) fn public_type_of(node: &DeclNode) -> Option<PublicType> {
    let kind = match node {
        DeclNode::Class(_) => PublicTypeKind::Class,
        DeclNode::Typedef(_) => PublicTypeKind::Typedef,
        DeclNode::UserInterface(_) => PublicTypeKind::Interface,
        DeclNode::UserTypeAlias(_) => PublicTypeKind::Alias,
        _ => return None,
    };
    Some(PublicType {
        kind,
        name: node.qualified_name().to_string(),
    })
}
