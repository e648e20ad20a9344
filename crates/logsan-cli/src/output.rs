//! Result rendering for stdout.

use crate::exit_codes::ExitCode;
use clap::ValueEnum;
use logsan_redact::{BatchSummary, FileStats, PiiCategory, ProgressSink};
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Format of command results printed to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text for terminals
    #[default]
    Human,
    /// Single JSON document
    Json,
}

#[derive(Debug, Serialize)]
struct FileReport<'a> {
    status: &'static str,
    input: &'a Path,
    output: &'a Path,
    #[serde(flatten)]
    stats: FileStats,
}

#[derive(Debug, Serialize)]
struct FailureReport<'a> {
    input: &'a Path,
    code: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct BatchReport<'a> {
    status: &'static str,
    total: usize,
    succeeded: usize,
    failed: usize,
    elapsed_ms: u64,
    failures: Vec<FailureReport<'a>>,
}

#[derive(Debug, Serialize)]
struct CategoryReport {
    name: &'static str,
    code: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorReport<'a> {
    status: &'static str,
    code: &'static str,
    exit_code: i32,
    message: &'a str,
}

pub fn render_file(
    format: OutputFormat,
    input: &Path,
    output: &Path,
    stats: FileStats,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Human => Ok(format!(
            "Sanitized {} -> {} ({} lines)",
            input.display(),
            output.display(),
            stats.lines
        )),
        OutputFormat::Json => serde_json::to_string_pretty(&FileReport {
            status: "ok",
            input,
            output,
            stats,
        }),
    }
}

/// Exit code for a finished directory run.
pub fn batch_exit_code(summary: &BatchSummary) -> ExitCode {
    if summary.failed() > 0 {
        ExitCode::PartialFail
    } else {
        ExitCode::Clean
    }
}

pub fn render_batch(format: OutputFormat, summary: &BatchSummary) -> serde_json::Result<String> {
    match format {
        OutputFormat::Human => {
            let mut lines = vec![format!(
                "Processed {} files: {} succeeded, {} failed ({} ms)",
                summary.total(),
                summary.succeeded(),
                summary.failed(),
                summary.elapsed.as_millis()
            )];
            for failure in summary.failures() {
                if let Some(e) = failure.error() {
                    lines.push(format!("  FAILED {}: {}", failure.input.display(), e));
                }
            }
            Ok(lines.join("\n"))
        }
        OutputFormat::Json => {
            let failures = summary
                .failures()
                .filter_map(|r| {
                    r.error().map(|e| FailureReport {
                        input: &r.input,
                        code: ExitCode::from(e.kind()).code_name(),
                        message: e.to_string(),
                    })
                })
                .collect();
            serde_json::to_string_pretty(&BatchReport {
                status: if summary.failed() > 0 { "partial" } else { "ok" },
                total: summary.total(),
                succeeded: summary.succeeded(),
                failed: summary.failed(),
                elapsed_ms: summary.elapsed.as_millis() as u64,
                failures,
            })
        }
    }
}

pub fn render_categories(format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Human => Ok(PiiCategory::ALL
            .iter()
            .map(|c| format!("{:<26} {}", c.as_str(), c.code()))
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => {
            let report: Vec<CategoryReport> = PiiCategory::ALL
                .iter()
                .map(|c| CategoryReport {
                    name: c.as_str(),
                    code: c.code(),
                })
                .collect();
            serde_json::to_string_pretty(&report)
        }
    }
}

/// Error document for JSON mode; `None` in human mode.
pub fn render_error(
    format: OutputFormat,
    code: ExitCode,
    message: &str,
) -> serde_json::Result<Option<String>> {
    match format {
        OutputFormat::Human => Ok(None),
        OutputFormat::Json => serde_json::to_string_pretty(&ErrorReport {
            status: "error",
            code: code.code_name(),
            exit_code: code.as_i32(),
            message,
        })
        .map(Some),
    }
}

/// Progress sink that logs at each 10% step.
#[derive(Debug)]
pub struct LoggedProgress {
    label: String,
    last_step: AtomicU64,
}

impl LoggedProgress {
    pub fn new(label: impl Into<String>) -> Self {
        LoggedProgress {
            label: label.into(),
            last_step: AtomicU64::new(0),
        }
    }
}

impl ProgressSink for LoggedProgress {
    fn report(&self, percent: f64) {
        let step = (percent / 10.0).floor() as u64;
        if self.last_step.fetch_max(step, Ordering::Relaxed) < step {
            tracing::info!(target: "logsan", label = %self.label, percent = step * 10, "progress");
        }
    }
}
