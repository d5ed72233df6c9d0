use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal outcome of one operation against one repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Exit code 0
    Succeeded,
    /// Nonzero exit, spawn failure or timeout
    Failed,
    /// Benign no-op (e.g. nothing to commit)
    Skipped,
    /// Cancelled before the subprocess launched
    Interrupted,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Interrupted => "interrupted",
        };
        write!(f, "{}", label)
    }
}

/// Per-repository outcome record produced by the runner.
///
/// Consumed by the progress reporter and the result logger; not retained
/// after the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult {
    /// Repository display name
    pub repository: String,

    /// Operation name (status, pull, ...)
    pub operation: String,

    /// Terminal outcome
    pub outcome: Outcome,

    /// Exit code of the final subprocess, when one ran
    pub exit_code: Option<i32>,

    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,

    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,

    /// Error or skip reason, when not succeeded
    pub error_message: Option<String>,
}

impl OperationResult {
    /// Create a result shell for the given repository and operation.
    pub fn new(repository: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            operation: operation.into(),
            outcome: Outcome::Interrupted,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            duration_ms: 0,
            error_message: None,
        }
    }

    /// Mark as succeeded.
    pub fn with_success(mut self, exit_code: i32, stdout: String, stderr: String, duration_ms: u64) -> Self {
        self.outcome = Outcome::Succeeded;
        self.exit_code = Some(exit_code);
        self.stdout = stdout;
        self.stderr = stderr;
        self.duration_ms = duration_ms;
        self
    }

    /// Mark as failed.
    pub fn with_failure(mut self, exit_code: Option<i32>, error: String, duration_ms: u64) -> Self {
        self.outcome = Outcome::Failed;
        self.exit_code = exit_code;
        self.error_message = Some(error);
        self.duration_ms = duration_ms;
        self
    }

    /// Mark as skipped.
    pub fn with_skip(mut self, reason: String) -> Self {
        self.outcome = Outcome::Skipped;
        self.error_message = Some(reason);
        self
    }

    /// Mark as interrupted before launch.
    pub fn with_interrupt(mut self) -> Self {
        self.outcome = Outcome::Interrupted;
        self.error_message = Some("interrupted before the operation launched".to_string());
        self
    }

    /// Attach captured output without changing the outcome.
    pub fn with_output(mut self, stdout: String, stderr: String) -> Self {
        self.stdout = stdout;
        self.stderr = stderr;
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Succeeded)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, Outcome::Skipped)
    }

    /// Short single-line error text for the summary and the result log.
    pub fn error_excerpt(&self) -> Option<String> {
        let text = self
            .error_message
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| Some(self.stderr.as_str()).filter(|s| !s.trim().is_empty()))?;

        let line = text.lines().find(|l| !l.trim().is_empty())?.trim();
        Some(line.chars().take(120).collect())
    }
}

/// Aggregate result of one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// Operation applied to every repository
    pub operation: String,

    /// Per-repository results, in batch order
    pub results: Vec<OperationResult>,

    /// Number of succeeded repositories
    pub succeeded_count: usize,

    /// Number of failed repositories
    pub failed_count: usize,

    /// Number of skipped repositories
    pub skipped_count: usize,

    /// Number of interrupted repositories
    pub interrupted_count: usize,

    /// Total wall-clock duration in milliseconds
    pub total_duration_ms: u64,
}

impl BatchResult {
    /// Create an empty batch result for the given operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            results: Vec::new(),
            succeeded_count: 0,
            failed_count: 0,
            skipped_count: 0,
            interrupted_count: 0,
            total_duration_ms: 0,
        }
    }

    /// Append one result and update the counters.
    pub fn add_result(&mut self, result: OperationResult) {
        match result.outcome {
            Outcome::Succeeded => self.succeeded_count += 1,
            Outcome::Failed => self.failed_count += 1,
            Outcome::Skipped => self.skipped_count += 1,
            Outcome::Interrupted => self.interrupted_count += 1,
        }
        self.results.push(result);
    }

    /// Whether the run as a whole counts as successful: nothing failed and
    /// nothing was interrupted. Skips are benign.
    pub fn is_success(&self) -> bool {
        self.failed_count == 0 && self.interrupted_count == 0
    }

    /// Total number of repositories in the batch.
    pub fn total_count(&self) -> usize {
        self.results.len()
    }

    /// The failed results only.
    pub fn failed_results(&self) -> Vec<&OperationResult> {
        self.results.iter().filter(|r| r.is_failure()).collect()
    }
}
