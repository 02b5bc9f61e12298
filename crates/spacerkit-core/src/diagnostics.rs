//! Structured verification findings
//!
//! Diagnostics are plain values produced by every verification pass. They are
//! never raised as errors: a pass always completes and returns what it found.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a diagnostic, ordered from most to least urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Risk of a crash or a scrapped part; the program must not run as-is
    Critical,
    /// Likely defect that should be reviewed before running
    Warning,
    /// Advisory note
    Recommendation,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "CRITICAL"),
            Self::Warning => write!(f, "WARNING"),
            Self::Recommendation => write!(f, "RECOMMENDATION"),
        }
    }
}

/// A single finding from a verification pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// How urgent the finding is
    pub severity: Severity,
    /// 1-based source line, if the finding is tied to one
    pub line: Option<usize>,
    /// Human-readable description
    pub message: String,
    /// Suggested replacement or action, if one is known
    pub suggested_fix: Option<String>,
}

impl Diagnostic {
    /// Create a diagnostic with no line and no fix
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            line: None,
            message: message.into(),
            suggested_fix: None,
        }
    }

    /// Create a critical diagnostic
    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(Severity::Critical, message)
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Create a recommendation diagnostic
    pub fn recommendation(message: impl Into<String>) -> Self {
        Self::new(Severity::Recommendation, message)
    }

    /// Attach a 1-based source line
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Attach a suggested fix
    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }

    /// Check if this diagnostic is critical
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "[{}] line {}: {}", self.severity, line, self.message)?,
            None => write!(f, "[{}] {}", self.severity, self.message)?,
        }
        if let Some(fix) = &self.suggested_fix {
            write!(f, " (fix: {})", fix)?;
        }
        Ok(())
    }
}

/// Count diagnostics of one severity
pub fn count_severity(diagnostics: &[Diagnostic], severity: Severity) -> usize {
    diagnostics.iter().filter(|d| d.severity == severity).count()
}
