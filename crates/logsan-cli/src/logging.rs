//! Logging setup for the CLI.
//!
//! Log output always goes to stderr, human-readable or JSON lines; stdout is
//! reserved for command results. Level resolution: `-v`/`-q` flags, then
//! `LOGSAN_LOG`, then `RUST_LOG`, then `info`.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const ENV_LOG: &str = "LOGSAN_LOG";
const ENV_LOG_FORMAT: &str = "LOGSAN_LOG_FORMAT";

/// Crates whose events pass the level filter.
const LOG_TARGETS: &[&str] = &["logsan", "logsan_cli", "logsan_redact"];

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines on stderr
    #[default]
    #[value(alias = "pretty")]
    Human,
    /// One JSON object per event
    #[value(alias = "json")]
    Jsonl,
}

/// Minimum level passed to the subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    #[value(alias = "warning")]
    Warn,
    Error,
    #[value(alias = "none")]
    Off,
}

impl LogLevel {
    /// Level selected by `-v` count and `-q`; `None` when neither was given.
    pub fn from_flags(verbose: u8, quiet: bool) -> Option<Self> {
        match (quiet, verbose) {
            (true, _) => Some(LogLevel::Error),
            (false, 0) => None,
            (false, 1) => Some(LogLevel::Debug),
            (false, _) => Some(LogLevel::Trace),
        }
    }
}

fn value_name<T: ValueEnum>(value: &T) -> String {
    value
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}

macro_rules! value_enum_text {
    ($ty:ty, $what:literal) => {
        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as ValueEnum>::from_str(s.trim(), true)
                    .map_err(|_| format!(concat!("unknown ", $what, ": {}"), s))
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&value_name(self))
            }
        }
    };
}

value_enum_text!(LogFormat, "log format");
value_enum_text!(LogLevel, "log level");

/// Resolved subscriber settings.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Prefix human output with a timestamp.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::default(),
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Resolve against the process environment.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::from_sources(
            cli_level,
            cli_format,
            std::env::var(ENV_LOG).ok().as_deref(),
            std::env::var("RUST_LOG").ok().as_deref(),
            std::env::var(ENV_LOG_FORMAT).ok().as_deref(),
        )
    }

    /// Resolve from explicit values; CLI overrides win, `LOGSAN_LOG`
    /// shadows `RUST_LOG`, unparseable values are ignored.
    pub fn from_sources(
        cli_level: Option<LogLevel>,
        cli_format: Option<LogFormat>,
        env_level: Option<&str>,
        rust_log: Option<&str>,
        env_format: Option<&str>,
    ) -> Self {
        let env_level = match env_level {
            Some(val) => val.parse::<LogLevel>().ok(),
            // RUST_LOG may be a directive list; take the most verbose level it names.
            None => rust_log.and_then(|val| {
                [LogLevel::Trace, LogLevel::Debug, LogLevel::Warn, LogLevel::Error]
                    .into_iter()
                    .find(|level| val.contains(value_name(level).as_str()))
            }),
        };
        let env_format = env_format.and_then(|val| val.parse::<LogFormat>().ok());

        Self {
            format: cli_format.or(env_format).unwrap_or_default(),
            level: cli_level.or(env_level).unwrap_or_default(),
            timestamps: true,
        }
    }

    pub fn with_level(self, level: LogLevel) -> Self {
        Self { level, ..self }
    }

    pub fn with_timestamps(self, timestamps: bool) -> Self {
        Self { timestamps, ..self }
    }

    /// Filter directives limiting output to this workspace's crates.
    pub fn filter_directives(&self) -> String {
        LOG_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, self.level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Install the global subscriber. Call once, before the first event.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::new(config.filter_directives());

    match config.format {
        LogFormat::Human => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());
            let registry = tracing_subscriber::registry().with(filter);
            if config.timestamps {
                registry.with(layer).init();
            } else {
                registry.with(layer.without_time()).init();
            }
        }
        LogFormat::Jsonl => {
            let layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    }
}
