//! Declaration generator
//!
//! Drives one run: doclets are rewritten as they arrive, then on
//! [`DtsGenerator::generate`] the registry is built, the public surface is
//! closed and the module tree is rendered.

use crate::callback;
use crate::config::TsdConfig;
use crate::diagnostics::{Diagnostic, DiagnosticsCollector, TsdResult};
use crate::doclet::Doclet;
use crate::module_tree::ModuleTreeNode;
use crate::registry::Registry;
use crate::visibility::{close_public_surface, PublicType};
use crate::writer::DtsWriter;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Summary of one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationStats {
    pub classes: usize,
    pub typedefs: usize,
    pub module_members: usize,
    pub user_types: usize,
    pub public_types: usize,
    pub hoisted: usize,
    pub unresolved: usize,
    pub passes: usize,
    pub warnings: usize,
}

/// Result of [`DtsGenerator::generate`]
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    /// Declaration text, without header and footer
    pub declarations: String,
    /// Public type set after closure
    pub public_types: Vec<PublicType>,
    /// Names that were referenced but never defined
    pub unresolved: Vec<String>,
    pub stats: GenerationStats,
    pub diagnostics: Vec<Diagnostic>,
}

impl GeneratedOutput {
    /// Declarations wrapped in header and footer text
    pub fn render_with(&self, header: &str, footer: &str) -> String {
        let mut text =
            String::with_capacity(header.len() + self.declarations.len() + footer.len() + 2);
        if !header.is_empty() {
            text.push_str(header);
            if !header.ends_with('\n') {
                text.push('\n');
            }
        }
        text.push_str(&self.declarations);
        if !footer.is_empty() {
            text.push_str(footer);
            if !footer.ends_with('\n') {
                text.push('\n');
            }
        }
        text
    }

    /// Public type set as pretty JSON
    pub fn public_types_json(&self) -> TsdResult<String> {
        Ok(serde_json::to_string_pretty(&self.public_types)?)
    }

    /// Write `<outDir>/<rootModuleName>.d.ts` with header and footer
    pub fn write(&self, config: &TsdConfig) -> TsdResult<PathBuf> {
        let header = config.load_header()?;
        let footer = config.load_footer()?;
        fs::create_dir_all(&config.out_dir)?;

        let path = config.output_path();
        fs::write(&path, self.render_with(&header, &footer))?;
        tracing::info!(path = %path.display(), "wrote declarations");
        Ok(path)
    }

    /// Write the public type set as JSON
    pub fn write_public_types(&self, path: &Path) -> TsdResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.public_types_json()?)?;
        tracing::info!(
            path = %path.display(),
            count = self.public_types.len(),
            "wrote public types"
        );
        Ok(())
    }
}

/// Doclet to declaration compiler
pub struct DtsGenerator {
    config: TsdConfig,
    doclets: Vec<Doclet>,
    diagnostics: DiagnosticsCollector,
}

impl DtsGenerator {
    pub fn new(config: TsdConfig) -> Self {
        Self {
            config,
            doclets: Vec::new(),
            diagnostics: DiagnosticsCollector::new(),
        }
    }

    pub fn config(&self) -> &TsdConfig {
        &self.config
    }

    /// Accept one doclet, rewriting callback typedefs on the way in
    pub fn add_doclet(&mut self, doclet: Doclet) {
        let doclet = callback::rewrite(doclet, &mut self.diagnostics);
        self.doclets.push(doclet);
    }

    pub fn add_doclets(&mut self, doclets: impl IntoIterator<Item = Doclet>) {
        for doclet in doclets {
            self.add_doclet(doclet);
        }
    }

    /// Doclets buffered so far, after rewriting
    pub fn doclets(&self) -> &[Doclet] {
        &self.doclets
    }

    /// Run the compiler over every buffered doclet
    ///
    /// Never fails: anomalies end up in the returned diagnostics.
    pub fn generate(&mut self) -> GeneratedOutput {
        let config = &self.config;
        let diagnostics = &mut self.diagnostics;

        let mut registry = Registry::build(&self.doclets, config, diagnostics);
        let report = close_public_surface(&mut registry, config, diagnostics);

        let tree = ModuleTreeNode::assemble(registry.emitted_nodes());
        let mut out = DtsWriter::new();
        tree.render(&mut out, config, diagnostics);

        let stats = GenerationStats {
            classes: registry.classes.len(),
            typedefs: registry.typedefs.len(),
            module_members: registry.module_members.len(),
            user_types: registry.user_types.len(),
            public_types: report.public_types.len(),
            hoisted: report.hoisted.len(),
            unresolved: report.unresolved.len(),
            passes: report.passes,
            warnings: diagnostics.warning_count(),
        };

        tracing::info!(
            classes = stats.classes,
            typedefs = stats.typedefs,
            public_types = stats.public_types,
            hoisted = stats.hoisted,
            unresolved = stats.unresolved,
            passes = stats.passes,
            warnings = stats.warnings,
            "generated declarations for {}",
            config.root_module_name
        );

        GeneratedOutput {
            declarations: out.finish(),
            public_types: report.public_types,
            unresolved: report.unresolved,
            stats,
            diagnostics: diagnostics.drain(),
        }
    }
}
