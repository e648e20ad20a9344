//! Error types for the sanitization engine.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for sanitization operations.
pub type Result<T> = std::result::Result<T, SanitizeError>;

/// Errors that can occur while building the engine or processing files.
///
/// Messages carry paths but never line contents, so they are safe to print
/// even when the input holds secrets.
#[derive(Error, Debug)]
pub enum SanitizeError {
    /// Input file or directory does not exist.
    #[error("input not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Output file exists and overwriting was not permitted.
    #[error("output already exists: {}", path.display())]
    OutputExists { path: PathBuf },

    /// Input and output resolve to the same file and overwriting was not permitted.
    #[error("input and output are the same file: {}", path.display())]
    SamePath { path: PathBuf },

    /// Underlying read/write failure.
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A batch worker panicked before finishing this file.
    #[error("worker panicked while processing {}", path.display())]
    WorkerPanicked { path: PathBuf },

    /// A configured literal could not be compiled into a pattern.
    #[error("pattern error: {0}")]
    Pattern(String),

    /// Configuration failed validation.
    #[error("config error: {0}")]
    Config(String),

    /// Random salt could not be generated.
    #[error("salt error: {0}")]
    Salt(String),
}

/// Coarse classification of [`SanitizeError`] used by callers to pick
/// exit codes and summary wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input missing.
    NotFound,
    /// Output collides with an existing file or with the input.
    Conflict,
    /// Read or write failed.
    Io,
    /// Engine construction failed (bad config, pattern, salt).
    Setup,
}

impl SanitizeError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SanitizeError::Io {
            path: path.into(),
            source,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SanitizeError::NotFound { .. } => ErrorKind::NotFound,
            SanitizeError::OutputExists { .. } | SanitizeError::SamePath { .. } => {
                ErrorKind::Conflict
            }
            SanitizeError::Io { .. } | SanitizeError::WorkerPanicked { .. } => ErrorKind::Io,
            SanitizeError::Pattern(_) | SanitizeError::Config(_) | SanitizeError::Salt(_) => {
                ErrorKind::Setup
            }
        }
    }
}
