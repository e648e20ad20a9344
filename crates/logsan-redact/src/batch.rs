//! Directory processing.
//!
//! Top-level files are filtered, assigned collision-free output names up
//! front, then fanned out over scoped worker threads that pull the next file
//! index from a shared counter. A failing file is recorded in its own result
//! and never stops the rest of the batch.

use crate::engine::SanitizationEngine;
use crate::error::{Result, SanitizeError};
use crate::file::FileStats;
use crate::progress::{self, NoProgress, ProgressSink};
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Suffix marking files this tool produced.
pub const SANITIZED_MARKER: &str = "_sanitized";

/// Outcome for one file of a batch.
#[derive(Debug)]
pub struct ProcessingResult {
    pub input: PathBuf,
    pub output: PathBuf,
    pub outcome: Result<FileStats>,
}

impl ProcessingResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Failure detail, if the file failed.
    pub fn error(&self) -> Option<&SanitizeError> {
        self.outcome.as_ref().err()
    }
}

/// Aggregate of a directory run, in input-name order.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub results: Vec<ProcessingResult>,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ProcessingResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

/// A file and the output path reserved for it.
#[derive(Debug, Clone)]
struct Job {
    input: PathBuf,
    output: PathBuf,
}

impl SanitizationEngine {
    /// Sanitize every eligible top-level file of `input_dir` into `output_dir`.
    pub fn process_directory(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchSummary> {
        self.process_directory_with_progress(input_dir, output_dir, &NoProgress)
    }

    /// Like [`process_directory`](Self::process_directory), reporting
    /// `completed / total * 100` after each finished file.
    ///
    /// Fails as a whole only when `input_dir` is missing or unreadable or
    /// `output_dir` cannot be created.
    pub fn process_directory_with_progress(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<BatchSummary> {
        let started = Instant::now();
        if !input_dir.is_dir() {
            return Err(SanitizeError::NotFound {
                path: input_dir.to_path_buf(),
            });
        }
        std::fs::create_dir_all(output_dir).map_err(|e| SanitizeError::io(output_dir, e))?;

        let inputs = self.eligible_files(input_dir)?;
        let jobs = plan_jobs(&inputs, output_dir, self.config().overwrite_output);
        if jobs.is_empty() {
            info!(input_dir = %input_dir.display(), "no eligible files");
            return Ok(BatchSummary {
                results: Vec::new(),
                elapsed: started.elapsed(),
            });
        }

        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(jobs.len());
        info!(
            input_dir = %input_dir.display(),
            output_dir = %output_dir.display(),
            files = jobs.len(),
            workers,
            "sanitizing directory"
        );

        let outcomes = self.run_jobs(&jobs, workers, progress);
        let results: Vec<ProcessingResult> = jobs
            .into_iter()
            .zip(outcomes)
            .map(|(job, outcome)| {
                let outcome = outcome.unwrap_or_else(|| {
                    Err(SanitizeError::WorkerPanicked {
                        path: job.input.clone(),
                    })
                });
                if let Err(e) = &outcome {
                    warn!(input = %job.input.display(), error = %e, "file failed");
                }
                ProcessingResult {
                    input: job.input,
                    output: job.output,
                    outcome,
                }
            })
            .collect();

        let summary = BatchSummary {
            results,
            elapsed: started.elapsed(),
        };
        info!(
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "directory sanitized"
        );
        Ok(summary)
    }

    /// Top-level regular files with an allowed extension that are not
    /// previous output, sorted by name.
    fn eligible_files(&self, input_dir: &Path) -> Result<Vec<PathBuf>> {
        let entries =
            std::fs::read_dir(input_dir).map_err(|e| SanitizeError::io(input_dir, e))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| SanitizeError::io(input_dir, e))?.path();
            if path.is_file()
                && self.config().is_allowed_extension(&path)
                && !is_sanitized_name(&path)
            {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Run `jobs` on `workers` scoped threads. Slot `i` holds the outcome of
    /// `jobs[i]`, or `None` if its worker died before finishing it.
    fn run_jobs(
        &self,
        jobs: &[Job],
        workers: usize,
        progress: &dyn ProgressSink,
    ) -> Vec<Option<Result<FileStats>>> {
        let next = AtomicUsize::new(0);
        let completed = Mutex::new(0u64);
        let total = jobs.len() as u64;

        let finished: Vec<(usize, Result<FileStats>)> = thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    s.spawn(|| {
                        let mut done = Vec::new();
                        loop {
                            let idx = next.fetch_add(1, Ordering::Relaxed);
                            let Some(job) = jobs.get(idx) else {
                                break;
                            };
                            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                                self.process_file(&job.input, &job.output)
                            }))
                            .unwrap_or_else(|_| {
                                error!(input = %job.input.display(), "worker panicked");
                                Err(SanitizeError::WorkerPanicked {
                                    path: job.input.clone(),
                                })
                            });
                            done.push((idx, outcome));

                            let mut count = completed.lock().unwrap_or_else(|p| p.into_inner());
                            *count += 1;
                            progress.report(progress::percent(*count, total));
                        }
                        done
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|h| {
                    h.join().unwrap_or_else(|_| {
                        error!("directory worker thread panicked");
                        Vec::new()
                    })
                })
                .collect()
        });

        let mut slots: Vec<Option<Result<FileStats>>> = jobs.iter().map(|_| None).collect();
        for (idx, outcome) in finished {
            slots[idx] = Some(outcome);
        }
        slots
    }
}

/// Whether a file name carries the sanitized marker (`x_sanitized.log`,
/// `x_sanitized_3.log`).
pub fn is_sanitized_name(path: &Path) -> bool {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    if stem.ends_with(SANITIZED_MARKER) {
        return true;
    }
    match stem.rsplit_once('_') {
        Some((head, n)) => {
            !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()) && head.ends_with(SANITIZED_MARKER)
        }
        None => false,
    }
}

fn plan_jobs(inputs: &[PathBuf], output_dir: &Path, overwrite: bool) -> Vec<Job> {
    let mut reserved = HashSet::new();
    let mut jobs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let Some(name) = input.file_name() else {
            continue;
        };
        let output = if overwrite {
            output_dir.join(name)
        } else {
            plan_output_name(output_dir, &name.to_string_lossy(), &reserved)
        };
        reserved.insert(output.clone());
        jobs.push(Job {
            input: input.clone(),
            output,
        });
    }
    jobs
}

/// First free name among `name.ext`, `stem_sanitized.ext`,
/// `stem_sanitized_1.ext`, `stem_sanitized_2.ext`, ...
pub fn plan_output_name(output_dir: &Path, file_name: &str, reserved: &HashSet<PathBuf>) -> PathBuf {
    let is_free = |p: &Path| !p.exists() && !reserved.contains(p);

    let direct = output_dir.join(file_name);
    if is_free(&direct) {
        return direct;
    }

    let (stem, ext) = match file_name.rfind('.') {
        Some(dot) if dot > 0 => file_name.split_at(dot),
        _ => (file_name, ""),
    };
    let marked = output_dir.join(format!("{}{}{}", stem, SANITIZED_MARKER, ext));
    if is_free(&marked) {
        return marked;
    }

    let mut n = 1u64;
    loop {
        let candidate = output_dir.join(format!("{}{}_{}{}", stem, SANITIZED_MARKER, n, ext));
        if is_free(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
