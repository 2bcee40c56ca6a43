//! Error types for readguard operations.
//!
//! Errors are split by how far they propagate:
//!
//! - **`Error`**: Top-level errors that halt an operation (bad workspace root, bad config)
//! - **`FixError`**: A single fix could not be computed; surfaced to the caller, never swallowed
//! - **`FileError`**: File-level errors that are collected but don't halt a workspace run
//!
//! ## Error Philosophy
//!
//! Analysis is best effort:
//! - An unresolvable symbol is a non-match, not an error
//! - A single unreadable file shouldn't prevent checking the rest
//! - A fix that cannot be computed is reported, because a silent no-op would corrupt intent
//!
//! ## Error Categorization
//!
//! `FileErrorKind` uses a 4xx/5xx style categorization:
//! - Input problems (user's fault): unsupported extension, encoding
//! - Internal problems (our fault): I/O errors, parser failures

use std::path::PathBuf;
use thiserror::Error;

use crate::types::TextRange;

/// Result type for readguard operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for readguard operations.
#[derive(Debug, Error)]
pub enum Error {
    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tree-sitter parsing infrastructure failed
    #[error("parser error: {0}")]
    Parser(String),

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),

    /// A requested fix could not be applied
    #[error("fix failed: {0}")]
    Fix(#[from] FixError),

    /// Report output could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a fix could not be computed for a finding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixError {
    /// The finding points past the end of the tree
    #[error("offset {offset} is outside the syntax tree (length {len})")]
    OffsetOutOfRange {
        /// Start offset recorded in the finding
        offset: usize,
        /// Length of the tree's text
        len: usize,
    },

    /// No call expression in the tree matches the finding; the finding is stale
    #[error("no call expression spans {range:?}; the finding does not match this tree")]
    CallNotFound {
        /// Range recorded in the finding
        range: TextRange,
    },

    /// The call's result is not discarded by a bare expression statement
    #[error("call at {range:?} is not a bare expression statement (parent is `{parent}`)")]
    NotAStatement {
        /// Range recorded in the finding
        range: TextRange,
        /// Kind of the call's parent node
        parent: &'static str,
    },
}

/// Error encountered while checking a specific file.
///
/// These errors are collected during a workspace run but don't halt it.
#[derive(Debug, Clone)]
pub struct FileError {
    /// Path to the file that failed
    pub path: PathBuf,
    /// Category of the error
    pub kind: FileErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.path.display(),
            self.message,
            self.kind
        )
    }
}

impl std::error::Error for FileError {}

/// Categorization of file errors.
///
/// Uses a 4xx/5xx style pattern:
/// - Input problems are issues with the source files (user can fix)
/// - Internal problems are issues with readguard itself or the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileErrorKind {
    // === Input Problems (analogous to HTTP 4xx) ===
    /// File type is not supported (unknown extension)
    UnsupportedLanguage,

    /// File content is not valid UTF-8
    EncodingError,

    // === Internal Problems (analogous to HTTP 5xx) ===
    /// Could not read or write the file
    IoError,

    /// Tree-sitter could not produce a tree
    ParseFailed,
}

impl std::fmt::Display for FileErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLanguage => write!(f, "unsupported language"),
            Self::EncodingError => write!(f, "encoding error"),
            Self::IoError => write!(f, "I/O error"),
            Self::ParseFailed => write!(f, "parse failed"),
        }
    }
}

impl FileErrorKind {
    /// Returns `true` if this is an input problem (4xx-style).
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::UnsupportedLanguage | Self::EncodingError)
    }

    /// Returns `true` if this is an internal problem (5xx-style).
    #[must_use]
    pub fn is_internal_error(&self) -> bool {
        matches!(self, Self::IoError | Self::ParseFailed)
    }
}

impl FileError {
    /// Create a new file error.
    #[must_use]
    pub fn new(path: PathBuf, kind: FileErrorKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
        }
    }

    /// Create an unsupported language error.
    #[must_use]
    pub fn unsupported_language(path: PathBuf) -> Self {
        let ext = path
            .extension()
            .map_or_else(|| "none".to_string(), |e| e.to_string_lossy().to_string());
        Self::new(
            path,
            FileErrorKind::UnsupportedLanguage,
            format!("unsupported extension: {ext}"),
        )
    }

    /// Create an encoding error for a file.
    #[must_use]
    pub fn encoding_error(path: PathBuf) -> Self {
        Self::new(path, FileErrorKind::EncodingError, "file is not valid UTF-8")
    }

    /// Create an I/O error for a file.
    #[must_use]
    pub fn io_error(path: PathBuf, error: &std::io::Error) -> Self {
        Self::new(path, FileErrorKind::IoError, error.to_string())
    }

    /// Create a parse failure for a file.
    #[must_use]
    pub fn parse_failed(path: PathBuf, message: impl Into<String>) -> Self {
        Self::new(path, FileErrorKind::ParseFailed, message)
    }
}
