//! Single-file processing.
//!
//! Output is always written to a temporary file next to the destination and
//! renamed into place once the last line is flushed. A failure at any point
//! drops the temporary file, so partial output never appears at the
//! destination, including when the destination is the input itself.

use crate::engine::SanitizationEngine;
use crate::error::{Result, SanitizeError};
use crate::progress::{self, NoProgress, ProgressSink};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// Line terminator written after every output line.
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
/// Line terminator written after every output line.
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// Counters for one processed file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FileStats {
    /// Lines read from the input.
    pub lines: u64,
    /// Bytes read from the input, terminators included.
    pub bytes_read: u64,
}

impl SanitizationEngine {
    /// Sanitize `input` into `output`.
    pub fn process_file(&self, input: &Path, output: &Path) -> Result<FileStats> {
        self.process_file_with_progress(input, output, &NoProgress)
    }

    /// Sanitize `input` into `output`, reporting byte-level progress after
    /// every line. An empty input produces no reports.
    pub fn process_file_with_progress(
        &self,
        input: &Path,
        output: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<FileStats> {
        let overwrite = self.config().overwrite_output;
        check_paths(input, output, overwrite)?;

        info!(
            input = %input.display(),
            output = %output.display(),
            "sanitizing file"
        );

        let parent = output_parent(output);
        let mut tmp = NamedTempFile::new_in(&parent).map_err(|e| SanitizeError::io(&parent, e))?;
        let stats = self.write_sanitized(input, &mut tmp, progress)?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| SanitizeError::io(tmp.path(), e))?;

        let persisted = if overwrite {
            tmp.persist(output)
        } else {
            tmp.persist_noclobber(output)
        };
        persisted.map_err(|e| {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                SanitizeError::OutputExists {
                    path: output.to_path_buf(),
                }
            } else {
                SanitizeError::io(output, e.error)
            }
        })?;

        info!(
            output = %output.display(),
            lines = stats.lines,
            bytes = stats.bytes_read,
            "file sanitized"
        );
        Ok(stats)
    }

    fn write_sanitized(
        &self,
        input: &Path,
        tmp: &mut NamedTempFile,
        progress: &dyn ProgressSink,
    ) -> Result<FileStats> {
        let file = File::open(input).map_err(|e| open_error(input, e))?;
        let total = file
            .metadata()
            .map_err(|e| SanitizeError::io(input, e))?
            .len();
        let mut reader = BufReader::new(file);
        let tmp_path = tmp.path().to_path_buf();
        let mut writer = BufWriter::new(tmp.as_file_mut());

        let mut stats = FileStats::default();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| SanitizeError::io(input, e))?;
            if read == 0 {
                break;
            }
            stats.lines += 1;
            stats.bytes_read += read as u64;

            let line = String::from_utf8_lossy(strip_terminator(&buf));
            let sanitized = self.sanitize_line(&line);
            writer
                .write_all(sanitized.as_bytes())
                .and_then(|()| writer.write_all(LINE_ENDING.as_bytes()))
                .map_err(|e| SanitizeError::io(&tmp_path, e))?;

            progress.report(progress::percent(stats.bytes_read, total));
        }

        writer
            .flush()
            .map_err(|e| SanitizeError::io(&tmp_path, e))?;
        Ok(stats)
    }
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn open_error(path: &Path, e: io::Error) -> SanitizeError {
    if e.kind() == io::ErrorKind::NotFound {
        SanitizeError::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        SanitizeError::io(path, e)
    }
}

fn output_parent(output: &Path) -> PathBuf {
    match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Canonical form of a path that may not exist yet: the parent is
/// canonicalized and the file name re-attached.
pub(crate) fn canonical_output(output: &Path) -> PathBuf {
    if let Ok(canonical) = output.canonicalize() {
        return canonical;
    }
    match (output_parent(output).canonicalize(), output.file_name()) {
        (Ok(parent), Some(name)) => parent.join(name),
        _ => output.to_path_buf(),
    }
}

fn check_paths(input: &Path, output: &Path, overwrite: bool) -> Result<()> {
    if !input.is_file() {
        return Err(SanitizeError::NotFound {
            path: input.to_path_buf(),
        });
    }
    let canonical_input = input
        .canonicalize()
        .map_err(|e| SanitizeError::io(input, e))?;

    if canonical_input == canonical_output(output) {
        if !overwrite {
            return Err(SanitizeError::SamePath {
                path: output.to_path_buf(),
            });
        }
        return Ok(());
    }

    if output.exists() && !overwrite {
        return Err(SanitizeError::OutputExists {
            path: output.to_path_buf(),
        });
    }
    Ok(())
}
