//! Process exit codes.
//!
//! Below 10 the run completed (possibly with per-file failures); 10-19 the
//! user can fix the invocation or the filesystem; 20 and up is I/O.

use logsan_redact::ErrorKind;

/// Stable exit statuses for scripts wrapping `logsan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Every requested file was sanitized
    Clean = 0,

    /// Directory run finished but some files failed
    PartialFail = 3,

    /// Invalid arguments or configuration
    ArgsError = 10,

    /// Input file or directory missing
    NotFound = 11,

    /// Output exists, or output is the input, and overwrite is off
    Conflict = 12,

    /// Read or write failure
    IoError = 20,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Whether the run failed as a whole.
    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    /// Symbolic name used in JSON error documents.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::PartialFail => "ERR_PARTIAL",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::NotFound => "ERR_NOT_FOUND",
            ExitCode::Conflict => "ERR_CONFLICT",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<ErrorKind> for ExitCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NotFound => ExitCode::NotFound,
            ErrorKind::Conflict => ExitCode::Conflict,
            ErrorKind::Io => ExitCode::IoError,
            ErrorKind::Setup => ExitCode::ArgsError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
