//! Error types and diagnostics
//!
//! The compiler core never aborts: anomalies found while translating types,
//! rewriting callback typedefs or closing the public surface are recorded as
//! [`Diagnostic`]s and generation carries on with a best-effort emission.
//! [`TsdError`] is reserved for the I/O boundary (config, header/footer files,
//! writing output).

use std::path::PathBuf;
use thiserror::Error;

/// Result type for forge-tsd operations
pub type TsdResult<T> = Result<T, TsdError>;

/// Main error type for forge-tsd
#[derive(Debug, Error)]
pub enum TsdError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML config error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

impl TsdError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        TsdError::Config(message.into())
    }
}

/// Diagnostic codes used by the compiler
pub mod codes {
    /// A referenced type name resolved to nothing
    pub const UNRESOLVED_TYPE: &str = "unresolved-type";
    /// A member or typedef carries no type information
    pub const MISSING_TYPE: &str = "missing-type";
    /// An untyped `array` annotation was widened to `any[]`
    pub const UNTYPED_ARRAY: &str = "untyped-array";
    /// A `function` typedef did not match either callback pattern
    pub const CALLBACK_UNMATCHED: &str = "callback-unmatched";
    /// A node has no description
    pub const MISSING_DOCS: &str = "missing-docs";
    /// A class augments more than one type
    pub const EXTRA_AUGMENTS: &str = "extra-augments";
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Warning - generation continues with a degraded emission
    Warning,
    /// Info - informational message
    Info,
    /// Hint - suggestion for improvement
    Hint,
}

impl DiagnosticSeverity {
    /// Get display string
    pub fn display(&self) -> &'static str {
        match self {
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Info => "info",
            DiagnosticSeverity::Hint => "hint",
        }
    }
}

/// A diagnostic message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level
    pub severity: DiagnosticSeverity,
    /// Message
    pub message: String,
    /// Longname of the doclet or type the diagnostic is about
    pub subject: Option<String>,
    /// Diagnostic code (for categorization)
    pub code: Option<&'static str>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            subject: None,
            code: None,
        }
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, message)
    }

    /// Create an info diagnostic
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Info, message)
    }

    /// Create a hint diagnostic
    pub fn hint(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Hint, message)
    }

    /// Set the subject longname
    pub fn about(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the diagnostic code
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    /// `subject: severity[code]: message`
    pub fn format(&self) -> String {
        let mut result = match &self.subject {
            Some(subject) => format!("{}: ", subject),
            None => String::new(),
        };
        result.push_str(self.severity.display());
        if let Some(code) = self.code {
            result.push_str(&format!("[{}]", code));
        }
        result.push_str(": ");
        result.push_str(&self.message);
        result
    }
}

/// Collector for diagnostics during generation
///
/// This is the "logger" handed to every `visit`/`output` call. Each added
/// diagnostic is also forwarded to `tracing` at the matching level.
#[derive(Debug, Default)]
pub struct DiagnosticsCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticsCollector {
    /// Create a new collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic
    pub fn add(&mut self, diagnostic: Diagnostic) {
        let subject = diagnostic.subject.as_deref().unwrap_or("");
        let code = diagnostic.code.unwrap_or("");
        match diagnostic.severity {
            DiagnosticSeverity::Warning => {
                tracing::warn!(subject, code, "{}", diagnostic.message)
            }
            DiagnosticSeverity::Info => tracing::info!(subject, code, "{}", diagnostic.message),
            DiagnosticSeverity::Hint => tracing::debug!(subject, code, "{}", diagnostic.message),
        }
        self.diagnostics.push(diagnostic);
    }

    /// Add an info message
    pub fn info(&mut self, message: impl Into<String>) {
        self.add(Diagnostic::info(message));
    }

    /// Get all diagnostics
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics carrying the given code
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics
            .iter()
            .filter(move |d| d.code == Some(code))
    }

    /// Get warning count
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
            .count()
    }

    /// Take every collected diagnostic, leaving the collector empty
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tsd_error() {
        let err = TsdError::config("rootModuleName must not be empty");
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("rootModuleName"));
    }

    #[test]
    fn test_diagnostic_format() {
        let diag = Diagnostic::warning("referenced but undefined type")
            .about("ol.Missing")
            .with_code(codes::UNRESOLVED_TYPE);

        assert_eq!(diag.severity, DiagnosticSeverity::Warning);
        assert_eq!(
            diag.format(),
            "ol.Missing: warning[unresolved-type]: referenced but undefined type"
        );
    }

    #[test]
    fn test_diagnostics_collector() {
        let mut collector = DiagnosticsCollector::new();
        collector.add(Diagnostic::warning("warning 1"));
        collector.info("info 1");
        collector.add(Diagnostic::hint("undocumented").with_code(codes::MISSING_DOCS));
        collector.add(Diagnostic::warning("untyped").with_code(codes::UNTYPED_ARRAY));

        assert_eq!(collector.warning_count(), 2);
        assert_eq!(collector.with_code(codes::UNTYPED_ARRAY).count(), 1);
        assert_eq!(collector.diagnostics().len(), 4);

        let drained = collector.drain();
        assert_eq!(drained.len(), 4);
        assert!(collector.diagnostics().is_empty());
    }
}
