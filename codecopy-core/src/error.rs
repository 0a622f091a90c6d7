//! Error types for the highlight and copy pipeline

use thiserror::Error;

/// Errors raised while rebuilding or writing a copy payload
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CopyError {
    /// The element to copy from is not present
    #[error("copy target '{0}' not found")]
    TargetNotFound(String),
    /// Original and cloned trees no longer line up
    #[error("original and cloned trees diverge at [{path}]: {detail}")]
    StructuralMismatch { path: String, detail: String },
    /// The rebuilt tree could not be serialized
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

/// Errors from a clipboard sink
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClipboardError {
    #[error("failed to access clipboard: {0}")]
    Access(String),
    #[error("failed to write to clipboard: {0}")]
    Write(String),
    #[error("clipboard support is not compiled in")]
    Unavailable,
}

/// Errors from the syntax highlighter collaborator
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HighlightError {
    #[error("language '{0}' is not known")]
    UnknownLanguage(String),
    #[error("highlighting failed: {0}")]
    Highlighter(String),
    #[error("theme '{0}' not found")]
    ThemeNotFound(String),
}

/// Errors from the external code formatter
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("formatter executable '{0}' not found")]
    NotFound(String),
    #[error("formatter could not be started: {0}")]
    Io(#[from] std::io::Error),
    #[error("formatter exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("formatter produced invalid UTF-8: {0}")]
    InvalidOutput(String),
    #[error("no formatter parser for language '{0}'")]
    Unsupported(String),
}
