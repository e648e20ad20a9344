//! PII redaction and pseudonymization for log files.
//!
//! This crate replaces personally identifiable and secret values in free-text
//! and JSON log lines with either a fixed placeholder or a deterministic
//! token, so that repeated occurrences of a value stay correlatable inside a
//! sanitized log without revealing the value.
//!
//! # Key Features
//!
//! - **Ordered rewrite passes**: structural fields (WMI site codes, LDAP
//!   components, connection-string keys) are claimed before generic
//!   detectors run, and identifier-shaped matches are checked against an
//!   allowlist of infrastructure words.
//! - **Stable tokens**: `[CODE-XXXXXX]` derived from a salted SHA-256 digest,
//!   cached for the lifetime of one engine instance.
//! - **JSON-aware**: only string leaves of JSON lines are rewritten.
//! - **Safe file output**: output is written to a temporary file and renamed
//!   into place, so failures never leave partial files behind.
//! - **Parallel batches**: directories are processed on scoped worker threads
//!   with per-file failure isolation and collision-free output names.
//!
//! # Example
//!
//! ```no_run
//! use logsan_redact::{SanitizationConfig, SanitizationEngine};
//!
//! let engine = SanitizationEngine::new(SanitizationConfig::default()).unwrap();
//! let line = engine.sanitize_line("Connection from 192.168.1.100 established.");
//! assert!(line.contains("[IP4-"));
//! ```

pub mod batch;
pub mod category;
pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod file;
pub mod hash;
pub mod json;
pub mod progress;
pub mod rewrite;

pub use batch::{BatchSummary, ProcessingResult};
pub use category::PiiCategory;
pub use config::{SanitizationConfig, DEFAULT_PLACEHOLDER};
pub use detect::Detector;
pub use engine::SanitizationEngine;
pub use error::{ErrorKind, Result, SanitizeError};
pub use file::FileStats;
pub use hash::TokenGenerator;
pub use progress::{NoProgress, ProgressSink};
