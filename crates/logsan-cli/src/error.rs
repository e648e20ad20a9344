//! CLI error type.

use crate::exit_codes::ExitCode;
use logsan_redact::SanitizeError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced by the command-line front end.
#[derive(Error, Debug)]
pub enum CliError {
    /// Config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file was read but did not parse.
    #[error("failed to parse config {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    /// A command-line value was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Engine construction or processing failed.
    #[error(transparent)]
    Sanitize(#[from] SanitizeError),

    /// Writing results to stdout failed.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// Summary serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Exit code for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::ConfigRead { .. }
            | CliError::ConfigParse { .. }
            | CliError::InvalidArgument(_) => ExitCode::ArgsError,
            CliError::Sanitize(e) => e.kind().into(),
            CliError::Output(_) | CliError::Json(_) => ExitCode::IoError,
        }
    }
}
