use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::common::result::GitherdResult;
use crate::domain::entities::operation_result::{BatchResult, OperationResult};
use crate::infrastructure::logging::ResultLogger;

/// Consumer of repository lifecycle events emitted by the runner.
///
/// Implementations must serialize their own writes; events for different
/// repositories arrive from concurrent tasks in completion order.
#[cfg_attr(test, mockall::automock)]
pub trait ProgressReporter: Send + Sync {
    /// A repository's operation is about to launch.
    fn repository_started(&self, repository: &str);

    /// A repository reached a terminal outcome.
    fn repository_finished(&self, result: &OperationResult);
}

/// Reporter that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn repository_started(&self, _repository: &str) {}

    fn repository_finished(&self, _result: &OperationResult) {}
}

/// Per-run context owning the reporter handle, the result log sink and the
/// cancellation flag. Constructed once per run and threaded through the
/// discoverer, runner and logger calls.
pub struct RunContext {
    reporter: Arc<dyn ProgressReporter>,
    logger: Option<ResultLogger>,
    cancel: Arc<AtomicBool>,
}

impl RunContext {
    /// Create a context for one run.
    pub fn new(reporter: Arc<dyn ProgressReporter>, logger: Option<ResultLogger>) -> Self {
        Self {
            reporter,
            logger,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle to the progress reporter.
    pub fn reporter(&self) -> Arc<dyn ProgressReporter> {
        Arc::clone(&self.reporter)
    }

    /// Shared cancellation flag, checked before each repository launches.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Stop launching new repository operations. In-flight subprocesses
    /// are left to finish and record their real outcome.
    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Append the finalized results to the run log, when one is configured.
    /// Returns the log path for display.
    pub fn log_results(&self, batch: &BatchResult) -> GitherdResult<Option<&Path>> {
        match &self.logger {
            Some(logger) => {
                logger.append_results(&batch.results)?;
                Ok(Some(logger.path()))
            }
            None => Ok(None),
        }
    }
}
