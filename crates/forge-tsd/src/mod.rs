//! forge-tsd: TypeScript declaration compiler for JSDoc-annotated JavaScript
//!
//! This crate turns the doclets printed by `jsdoc -X` into a single ambient
//! declaration file (`.d.ts`):
//! - Rewriting `@typedef {function(...)}` annotations into callback shape
//! - Registering classes, typedefs and their members by longname
//! - Hoisting every type reachable from the public surface to public
//! - Nesting declarations into `declare module` blocks by module path
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   Doclets    │  jsdoc -X
//! └──────┬───────┘
//!        ▼
//! ┌──────────────┐
//! │   callback   │  per-doclet rewrite
//! └──────┬───────┘
//!        ▼
//! ┌──────────────┐
//! │   Registry   │  classes / typedefs / members / user types
//! └──────┬───────┘
//!        ▼
//! ┌──────────────┐
//! │  visibility  │  public surface closure
//! └──────┬───────┘
//!        ▼
//! ┌──────────────┐
//! │ ModuleTree   │  .d.ts text
//! └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use forge_tsd::{Doclet, DtsGenerator, TsdConfig};
//!
//! let config = TsdConfig::from_file("conf.json").expect("Failed to load config");
//! let text = std::fs::read_to_string("doclets.json").expect("Failed to read doclets");
//! let doclets: Vec<Doclet> = serde_json::from_str(&text).expect("Invalid doclets");
//!
//! let mut generator = DtsGenerator::new(config.clone());
//! generator.add_doclets(doclets);
//! let output = generator.generate();
//! output.write(&config).expect("Failed to write declarations");
//! ```

// Input model
pub mod doclet;

// Compiler core
pub mod callback;
pub mod decl;
pub mod module_tree;
pub mod registry;
pub mod types;
pub mod visibility;

// Pipeline and support
pub mod config;
pub mod diagnostics;
pub mod generator;
pub mod test;
pub mod writer;

// Re-exports for convenience
pub use config::{MemberReplacement, TsdConfig, UserDeclarations};
pub use decl::DeclNode;
pub use diagnostics::{Diagnostic, DiagnosticSeverity, DiagnosticsCollector, TsdError, TsdResult};
pub use doclet::{DocParam, DocTag, DocType, Doclet, DocletKind};
pub use generator::{DtsGenerator, GeneratedOutput, GenerationStats};
pub use module_tree::ModuleTreeNode;
pub use registry::Registry;
pub use types::{translate, DiagnosticSink, TypeSink};
pub use visibility::{PublicType, PublicTypeKind, VisibilityContext};
pub use writer::DtsWriter;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
