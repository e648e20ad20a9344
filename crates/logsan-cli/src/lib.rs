//! Support library for the `logsan` command-line tool.
//!
//! Holds everything the binary needs besides argument parsing: config file
//! resolution, logging setup, exit codes and result rendering.

pub mod config;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod output;

pub use config::{ConfigOverrides, ConfigSource, ResolvedConfig};
pub use error::{CliError, Result};
pub use exit_codes::ExitCode;
pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
pub use output::OutputFormat;
