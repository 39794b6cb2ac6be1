//! Structured warnings and errors collected while building the IR.
//!
//! The collector never fails: every unsupported or approximated construct is
//! recorded and generation continues. Whether a run aborts is decided by the
//! caller via [`DiagnosticCollector::has_errors`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    /// The construct was approximated or dropped; output is still produced.
    Warning,
    /// The run must not write any output.
    Error,
}

impl DiagnosticLevel {
    /// Lowercase name used in printed diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Error => "error",
        }
    }
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity.
    pub level: DiagnosticLevel,
    /// Stable machine-readable code, e.g. `schema.unsupported`.
    pub code: String,
    /// Human-readable description.
    pub message: String,
    /// JSON-pointer-like location in the source document, for debugging only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.level, self.code, self.message)?;
        if let Some(pointer) = &self.pointer {
            write!(f, " ({pointer})")?;
        }
        Ok(())
    }
}

/// Append-only, single-writer diagnostic sink.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning.
    pub fn warn(&mut self, code: &str, message: impl Into<String>, pointer: Option<&str>) {
        self.push(DiagnosticLevel::Warning, code, message.into(), pointer);
    }

    /// Record an error.
    pub fn error(&mut self, code: &str, message: impl Into<String>, pointer: Option<&str>) {
        self.push(DiagnosticLevel::Error, code, message.into(), pointer);
    }

    fn push(&mut self, level: DiagnosticLevel, code: &str, message: String, pointer: Option<&str>) {
        debug!(
            level = level.as_str(),
            code,
            pointer = pointer.unwrap_or(""),
            "{message}"
        );
        self.diagnostics.push(Diagnostic {
            level,
            code: code.to_string(),
            message,
            pointer: pointer.map(str::to_string),
        });
    }

    /// Diagnostics recorded so far, in discovery order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Whether any `error`-level diagnostic was recorded.
    pub fn has_errors(&self) -> bool {
        has_errors(&self.diagnostics)
    }

    /// Consume the collector.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Whether a diagnostic list contains an `error`-level entry.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics
        .iter()
        .any(|diag| diag.level == DiagnosticLevel::Error)
}

/// Escape one JSON-pointer reference token (`~` → `~0`, `/` → `~1`).
pub fn pointer_segment(raw: &str) -> String {
    raw.replace('~', "~0").replace('/', "~1")
}

/// Append an escaped token to a pointer.
pub fn child_pointer(parent: &str, segment: &str) -> String {
    format!("{parent}/{}", pointer_segment(segment))
}
