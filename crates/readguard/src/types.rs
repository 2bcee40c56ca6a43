//! Domain types for readguard.
//!
//! These types represent the core domain model:
//! - **Positions**: `TextRange` (rowan byte offsets), `Span` (1-indexed line/column)
//! - **Findings**: `Finding`, `Severity` (what the rule reports)
//! - **Results**: `FileReport`, `CheckReport`, `FileFix`, `FixReport` (workspace runs)
//!
//! ## Design Decisions
//!
//! | Decision | Choice | Rationale |
//! |----------|--------|-----------|
//! | Anchor | Byte range plus span | Rewriter needs offsets; humans need lines |
//! | Message | `&'static str` | The rule reports one fixed message |
//! | Severity | Enum, overridable | Config may promote or demote the rule |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::FileError;

/// Half-open byte ranges and offsets into source text.
pub use rowan::{TextRange, TextSize};

// ============================================================================
// Positions
// ============================================================================

/// Source span for a finding (1-indexed lines and columns).
///
/// Columns count bytes, matching tree-sitter positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    start_line: u32,
    start_column: u32,
    end_line: u32,
    end_column: u32,
}

impl Span {
    /// Create a new span with validation.
    ///
    /// Returns `None` if the end position is before the start position.
    #[must_use]
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Option<Self> {
        // End must be >= start (either on a later line, or same line with >= column)
        if end_line < start_line || (end_line == start_line && end_column < start_column) {
            return None;
        }
        Some(Self {
            start_line,
            start_column,
            end_line,
            end_column,
        })
    }

    /// Line where the span starts (1-indexed).
    #[must_use]
    pub fn start_line(&self) -> u32 {
        self.start_line
    }

    /// Column where the span starts (1-indexed).
    #[must_use]
    pub fn start_column(&self) -> u32 {
        self.start_column
    }

    /// Line where the span ends (1-indexed).
    #[must_use]
    pub fn end_line(&self) -> u32 {
        self.end_line
    }

    /// Column where the span ends (1-indexed, exclusive).
    #[must_use]
    pub fn end_column(&self) -> u32 {
        self.end_column
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_column)
    }
}

// ============================================================================
// Findings
// ============================================================================

/// How loudly a finding is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational hint
    Info,
    /// Default severity for the rule
    #[default]
    Warning,
    /// Treated as a build-breaking problem
    Error,
}

impl Severity {
    /// Lowercase name used in output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A located instance of the rule being violated.
///
/// Immutable once created. `range` anchors the rewriter; `span` is for humans.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Finding {
    /// Diagnostic identifier
    pub rule_id: &'static str,
    /// Reported severity
    pub severity: Severity,
    /// Human-readable description
    pub message: &'static str,
    /// Byte range of the offending call
    pub range: TextRange,
    /// Line/column span of the offending call
    pub span: Span,
}

impl Finding {
    /// Return a copy reported at a different severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}[{}]: {}",
            self.span, self.severity, self.rule_id, self.message
        )
    }
}

// ============================================================================
// Workspace results
// ============================================================================

/// Findings for a single source file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// Path relative to the workspace root
    pub path: PathBuf,
    /// Findings in source order
    pub findings: Vec<Finding>,
}

/// Result of checking a set of files.
#[derive(Debug, Default)]
pub struct CheckReport {
    /// Per-file findings, sorted by path. Files without findings are omitted.
    pub files: Vec<FileReport>,
    /// Number of files that were analyzed
    pub files_checked: usize,
    /// Files that could not be analyzed
    pub errors: Vec<FileError>,
    /// Directories that could not be read, with the reason
    pub directories_skipped: Vec<(PathBuf, String)>,
    /// Wall-clock time of the run
    pub duration: Duration,
}

impl CheckReport {
    /// Total number of findings across all files.
    #[must_use]
    pub fn finding_count(&self) -> usize {
        self.files.iter().map(|f| f.findings.len()).sum()
    }
}

/// Outcome of fixing a single file.
#[derive(Debug, Clone)]
pub struct FileFix {
    /// Path relative to the workspace root
    pub path: PathBuf,
    /// Number of fixes applied
    pub applied: usize,
    /// Number of findings that could not be fixed
    pub skipped: usize,
    /// Rewritten file contents
    pub text: String,
}

/// Result of fixing a set of files.
#[derive(Debug, Default)]
pub struct FixReport {
    /// Files that had at least one finding, sorted by path
    pub files: Vec<FileFix>,
    /// Number of files that were analyzed
    pub files_checked: usize,
    /// Files that could not be analyzed or written
    pub errors: Vec<FileError>,
    /// Whether changes were written to disk
    pub written: bool,
}

impl FixReport {
    /// Total number of fixes applied across all files.
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.files.iter().map(|f| f.applied).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_rejects_inverted_positions() {
        assert!(Span::new(3, 1, 2, 1).is_none());
        assert!(Span::new(3, 5, 3, 4).is_none());
        assert!(Span::new(3, 5, 3, 5).is_some());
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Warning).expect("serialize severity");
        assert_eq!(json, "\"warning\"");

        let parsed: Severity = serde_json::from_str("\"error\"").expect("parse severity");
        assert_eq!(parsed, Severity::Error);
    }
}
