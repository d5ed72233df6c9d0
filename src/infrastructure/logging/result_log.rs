use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::common::error::GitherdError;
use crate::common::result::{GitherdResult, ResultExt};
use crate::domain::entities::operation_result::OperationResult;

/// Prefix of per-run result log files.
pub const LOG_FILE_PREFIX: &str = "githerd_";

/// Number of run logs retained in the log directory.
pub const LOG_KEEP_COUNT: usize = 5;

/// Append-only, per-run result log.
///
/// Each run gets its own timestamped file; only the most recent
/// [`LOG_KEEP_COUNT`] files are retained. One line is written per
/// repository: timestamp, repository name, operation, outcome and an
/// optional error excerpt.
#[derive(Debug, Clone)]
pub struct ResultLogger {
    log_file: PathBuf,
}

impl ResultLogger {
    /// Create a fresh run log in `dir` and prune old ones.
    pub fn create_in(dir: &Path) -> GitherdResult<Self> {
        if !dir.exists() {
            fs::create_dir_all(dir)
                .with_filesystem_error("failed to create log directory", Some(dir.to_path_buf()))?;
        }

        let file_name = format!(
            "{}{}.log",
            LOG_FILE_PREFIX,
            Local::now().format("%Y%m%d_%H%M%S")
        );
        let log_file = dir.join(file_name);

        fs::write(&log_file, "")
            .with_filesystem_error("failed to create result log", Some(log_file.clone()))?;

        Self::cleanup_old_logs(dir, LOG_KEEP_COUNT);
        debug!(log = %log_file.display(), "result log created");

        Ok(Self { log_file })
    }

    /// Create a logger writing to an explicit file path.
    pub fn at_path(log_file: impl Into<PathBuf>) -> Self {
        Self {
            log_file: log_file.into(),
        }
    }

    /// Path of the current run log.
    pub fn path(&self) -> &Path {
        &self.log_file
    }

    /// Append one line per result to the run log.
    pub fn append_results(&self, results: &[OperationResult]) -> GitherdResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .with_filesystem_error("failed to open result log", Some(self.log_file.clone()))?;

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        for result in results {
            let excerpt = result.error_excerpt().unwrap_or_else(|| "-".to_string());
            writeln!(
                file,
                "{} | {} | {} | {} | {}",
                timestamp, result.repository, result.operation, result.outcome, excerpt
            )
            .map_err(|e| {
                GitherdError::filesystem_error_with_source(
                    "failed to write result log line",
                    Some(self.log_file.clone()),
                    e,
                )
            })?;
        }

        Ok(())
    }

    /// Keep only the `keep` most recent run logs in `dir`.
    ///
    /// File names embed the run timestamp, so lexicographic order is
    /// chronological. Deletion problems are logged and otherwise ignored.
    fn cleanup_old_logs(dir: &Path, keep: usize) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };

        let mut logs: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension().map(|ext| ext == "log").unwrap_or(false)
                    && p.file_name()
                        .map(|n| n.to_string_lossy().starts_with(LOG_FILE_PREFIX))
                        .unwrap_or(false)
            })
            .collect();

        logs.sort();
        logs.reverse();

        for old_log in logs.into_iter().skip(keep) {
            if let Err(e) = fs::remove_file(&old_log) {
                warn!(log = %old_log.display(), error = %e, "failed to remove old result log");
            }
        }
    }
}
