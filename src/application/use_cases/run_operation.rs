use std::cmp;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::application::context::RunContext;
use crate::domain::entities::operation::Operation;
use crate::domain::entities::operation_result::{BatchResult, OperationResult, Outcome};
use crate::domain::entities::repository::{Repository, RepositoryState};
use crate::infrastructure::git::client::GitClient;
use crate::infrastructure::git::command::GitCommand;
use crate::infrastructure::network::connectivity::ConnectivityStatus;
use crate::infrastructure::process::ExecutionResult;

/// Batch runner errors.
#[derive(Debug, Error)]
pub enum RunOperationError {
    #[error("no repositories to operate on")]
    NoRepositories,
}

/// Configuration for one batch run.
#[derive(Debug, Clone)]
pub struct RunOperationConfig {
    /// Operation applied uniformly to every repository
    pub operation: Operation,

    /// Maximum concurrent git subprocesses (CPU count when unset)
    pub parallel_jobs: Option<usize>,
}

impl RunOperationConfig {
    /// Create a configuration for the given operation.
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            parallel_jobs: None,
        }
    }

    /// Set the concurrency cap.
    pub fn with_parallel_jobs(mut self, parallel_jobs: Option<usize>) -> Self {
        self.parallel_jobs = parallel_jobs;
        self
    }
}

/// Executes one operation against every repository in the batch.
///
/// Yields exactly one [`OperationResult`] per repository, in input order:
/// unreachable remotes and cancellations produce explicit results, never
/// omissions. One repository's failure never aborts the others.
pub struct RunOperationUseCase {
    config: RunOperationConfig,
    git: Arc<dyn GitClient>,
}

impl RunOperationUseCase {
    /// Create a runner for the given configuration and git client.
    pub fn new(config: RunOperationConfig, git: Arc<dyn GitClient>) -> Self {
        Self { config, git }
    }

    /// Run the batch.
    ///
    /// `connectivity` is the precomputed probe outcome; it is only
    /// consulted for network-dependent operations. When the remote is
    /// unreachable every repository fails uniformly and no subprocess is
    /// launched.
    pub async fn execute(
        &self,
        repositories: Vec<Repository>,
        connectivity: Option<&ConnectivityStatus>,
        ctx: &RunContext,
    ) -> Result<BatchResult, RunOperationError> {
        if repositories.is_empty() {
            return Err(RunOperationError::NoRepositories);
        }

        let started = Instant::now();
        let operation = &self.config.operation;
        let mut batch = BatchResult::new(operation.name());

        if operation.requires_network() {
            if let Some(ConnectivityStatus::Unreachable { reason }) = connectivity {
                let reporter = ctx.reporter();
                for repo in &repositories {
                    let result = OperationResult::new(&repo.name, operation.name())
                        .with_failure(None, format!("remote unreachable: {}", reason), 0);
                    reporter.repository_finished(&result);
                    batch.add_result(result);
                }
                batch.total_duration_ms = started.elapsed().as_millis() as u64;
                return Ok(batch);
            }
        }

        let max_jobs = cmp::max(
            1,
            self.config
                .parallel_jobs
                .unwrap_or_else(|| cmp::min(repositories.len(), num_cpus::get())),
        );
        let semaphore = Arc::new(Semaphore::new(max_jobs));
        debug!(operation = %operation, jobs = max_jobs, repos = repositories.len(), "starting batch");

        let names: Vec<String> = repositories.iter().map(|r| r.name.clone()).collect();

        let tasks: Vec<_> = repositories
            .into_iter()
            .map(|mut repo| {
                let git = Arc::clone(&self.git);
                let operation = operation.clone();
                let semaphore = Arc::clone(&semaphore);
                let reporter = ctx.reporter();
                let cancel = ctx.cancel_flag();

                tokio::spawn(async move {
                    if cancel.load(Ordering::SeqCst) {
                        let result =
                            OperationResult::new(&repo.name, operation.name()).with_interrupt();
                        reporter.repository_finished(&result);
                        return result;
                    }

                    let _permit = match semaphore.acquire().await {
                        Ok(permit) => permit,
                        Err(_) => {
                            let result =
                                OperationResult::new(&repo.name, operation.name()).with_interrupt();
                            reporter.repository_finished(&result);
                            return result;
                        }
                    };

                    // A cancel may have arrived while waiting for a slot
                    if cancel.load(Ordering::SeqCst) {
                        let result =
                            OperationResult::new(&repo.name, operation.name()).with_interrupt();
                        reporter.repository_finished(&result);
                        return result;
                    }

                    reporter.repository_started(&repo.name);
                    repo.state = RepositoryState::Running;

                    let result = run_in_repository(git.as_ref(), &operation, &repo).await;

                    repo.state = match result.outcome {
                        Outcome::Succeeded => RepositoryState::Succeeded,
                        Outcome::Failed => RepositoryState::Failed,
                        Outcome::Skipped => RepositoryState::Skipped,
                        Outcome::Interrupted => RepositoryState::Interrupted,
                    };
                    repo.last_error = result.error_message.clone();

                    reporter.repository_finished(&result);
                    result
                })
            })
            .collect();

        let joined = join_all(tasks).await;
        for (i, join_result) in joined.into_iter().enumerate() {
            match join_result {
                Ok(result) => batch.add_result(result),
                Err(e) => {
                    batch.add_result(
                        OperationResult::new(&names[i], self.config.operation.name())
                            .with_failure(None, format!("task join error: {}", e), 0),
                    );
                }
            }
        }

        batch.total_duration_ms = started.elapsed().as_millis() as u64;
        Ok(batch)
    }
}

/// Execute one operation inside one repository working tree.
async fn run_in_repository(
    git: &dyn GitClient,
    operation: &Operation,
    repo: &Repository,
) -> OperationResult {
    match operation {
        Operation::Status => run_single(git, repo, operation, GitCommand::status_short()).await,
        Operation::Fetch => run_single(git, repo, operation, GitCommand::fetch()).await,
        Operation::Pull => run_single(git, repo, operation, GitCommand::pull()).await,
        Operation::Push => run_single(git, repo, operation, GitCommand::push()).await,
        Operation::Log { max_count } => {
            run_single(git, repo, operation, GitCommand::log_oneline(*max_count)).await
        }
        Operation::Commit { message } => run_commit(git, repo, message).await,
    }
}

/// Run an operation that maps to a single git command.
async fn run_single(
    git: &dyn GitClient,
    repo: &Repository,
    operation: &Operation,
    command: GitCommand,
) -> OperationResult {
    let started = Instant::now();

    match git.run(&repo.path, &command).await {
        Ok(exec) if exec.success => OperationResult::new(&repo.name, operation.name())
            .with_success(
                exec.exit_code,
                exec.stdout,
                exec.stderr,
                started.elapsed().as_millis() as u64,
            ),
        Ok(exec) => {
            let reason = failure_reason(&exec);
            OperationResult::new(&repo.name, operation.name())
                .with_failure(
                    Some(exec.exit_code),
                    reason,
                    started.elapsed().as_millis() as u64,
                )
                .with_output(exec.stdout, exec.stderr)
        }
        Err(e) => OperationResult::new(&repo.name, operation.name()).with_failure(
            None,
            e.to_string(),
            started.elapsed().as_millis() as u64,
        ),
    }
}

/// Stage everything and commit, skipping cleanly when there is nothing to
/// commit.
async fn run_commit(git: &dyn GitClient, repo: &Repository, message: &str) -> OperationResult {
    let started = Instant::now();
    let name = "commit";

    let probe = match git.run(&repo.path, &GitCommand::status_porcelain()).await {
        Ok(exec) => exec,
        Err(e) => {
            return OperationResult::new(&repo.name, name).with_failure(
                None,
                e.to_string(),
                started.elapsed().as_millis() as u64,
            )
        }
    };

    if !probe.success {
        let reason = failure_reason(&probe);
        return OperationResult::new(&repo.name, name).with_failure(
            Some(probe.exit_code),
            reason,
            started.elapsed().as_millis() as u64,
        );
    }

    if probe.stdout.trim().is_empty() {
        let mut result = OperationResult::new(&repo.name, name)
            .with_skip("nothing to commit, working tree clean".to_string());
        result.duration_ms = started.elapsed().as_millis() as u64;
        return result;
    }

    let stage = match git.run(&repo.path, &GitCommand::stage_all()).await {
        Ok(exec) => exec,
        Err(e) => {
            return OperationResult::new(&repo.name, name).with_failure(
                None,
                e.to_string(),
                started.elapsed().as_millis() as u64,
            )
        }
    };

    if !stage.success {
        let reason = failure_reason(&stage);
        return OperationResult::new(&repo.name, name).with_failure(
            Some(stage.exit_code),
            reason,
            started.elapsed().as_millis() as u64,
        );
    }

    match git.run(&repo.path, &GitCommand::commit(message)).await {
        Ok(exec) if exec.success => OperationResult::new(&repo.name, name).with_success(
            exec.exit_code,
            exec.stdout,
            exec.stderr,
            started.elapsed().as_millis() as u64,
        ),
        Ok(exec) => {
            let reason = failure_reason(&exec);
            OperationResult::new(&repo.name, name)
                .with_failure(
                    Some(exec.exit_code),
                    reason,
                    started.elapsed().as_millis() as u64,
                )
                .with_output(exec.stdout, exec.stderr)
        }
        Err(e) => OperationResult::new(&repo.name, name).with_failure(
            None,
            e.to_string(),
            started.elapsed().as_millis() as u64,
        ),
    }
}

/// Pick the most useful single-source failure text from a completed
/// subprocess.
fn failure_reason(exec: &ExecutionResult) -> String {
    if !exec.stderr.trim().is_empty() {
        exec.stderr.trim().to_string()
    } else if !exec.stdout.trim().is_empty() {
        exec.stdout.trim().to_string()
    } else {
        format!("exited with code {}", exec.exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::context::{NullReporter, RunContext};
    use crate::infrastructure::git::client::MockGitClient;
    use pretty_assertions::assert_eq;

    fn repos(names: &[&str]) -> Vec<Repository> {
        names
            .iter()
            .map(|n| Repository::new(format!("/tmp/herd/{}", n)))
            .collect()
    }

    fn ctx() -> RunContext {
        RunContext::new(Arc::new(NullReporter), None)
    }

    fn ok_exec(stdout: &str) -> ExecutionResult {
        ExecutionResult::new(0, stdout.to_string(), String::new(), 1)
    }

    fn failed_exec(stderr: &str) -> ExecutionResult {
        ExecutionResult::new(1, String::new(), stderr.to_string(), 1)
    }

    #[tokio::test]
    async fn test_one_result_per_repository() {
        let mut git = MockGitClient::new();
        git.expect_run()
            .times(3)
            .returning(|_, _| Ok(ExecutionResult::new(0, "## main\n".to_string(), String::new(), 1)));

        let use_case =
            RunOperationUseCase::new(RunOperationConfig::new(Operation::Status), Arc::new(git));
        let batch = use_case
            .execute(repos(&["a", "b", "c"]), None, &ctx())
            .await
            .unwrap();

        assert_eq!(batch.total_count(), 3);
        assert_eq!(batch.succeeded_count, 3);
        assert!(batch.is_success());

        // Results come back in input order
        let names: Vec<_> = batch.results.iter().map(|r| r.repository.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_unreachable_remote_fails_uniformly_without_subprocesses() {
        let mut git = MockGitClient::new();
        git.expect_run().times(0);

        let use_case =
            RunOperationUseCase::new(RunOperationConfig::new(Operation::Pull), Arc::new(git));
        let status = ConnectivityStatus::Unreachable {
            reason: "connection to gitea.local:22 timed out after 5s".to_string(),
        };
        let batch = use_case
            .execute(repos(&["a", "b"]), Some(&status), &ctx())
            .await
            .unwrap();

        assert_eq!(batch.total_count(), 2);
        assert_eq!(batch.failed_count, 2);
        for result in &batch.results {
            assert_eq!(result.outcome, Outcome::Failed);
            assert!(result.error_message.as_ref().unwrap().contains("unreachable"));
        }
    }

    #[tokio::test]
    async fn test_local_operation_ignores_unreachable_remote() {
        let mut git = MockGitClient::new();
        git.expect_run()
            .times(1)
            .returning(|_, _| Ok(ExecutionResult::new(0, String::new(), String::new(), 1)));

        let use_case =
            RunOperationUseCase::new(RunOperationConfig::new(Operation::Status), Arc::new(git));
        let status = ConnectivityStatus::Unreachable {
            reason: "down".to_string(),
        };
        let batch = use_case
            .execute(repos(&["a"]), Some(&status), &ctx())
            .await
            .unwrap();

        assert_eq!(batch.succeeded_count, 1);
    }

    #[tokio::test]
    async fn test_failure_is_isolated_per_repository() {
        let mut git = MockGitClient::new();
        git.expect_run().times(2).returning(|path, _| {
            if path.ends_with("bad") {
                Ok(ExecutionResult::new(
                    1,
                    String::new(),
                    "fatal: 'origin' does not appear to be a git repository\n".to_string(),
                    1,
                ))
            } else {
                Ok(ExecutionResult::new(0, String::new(), String::new(), 1))
            }
        });

        let use_case =
            RunOperationUseCase::new(RunOperationConfig::new(Operation::Pull), Arc::new(git));
        let batch = use_case
            .execute(repos(&["bad", "good"]), Some(&ConnectivityStatus::Reachable), &ctx())
            .await
            .unwrap();

        assert_eq!(batch.total_count(), 2);
        assert_eq!(batch.succeeded_count, 1);
        assert_eq!(batch.failed_count, 1);

        let failed = batch.failed_results();
        assert_eq!(failed[0].repository, "bad");
        assert!(failed[0]
            .error_message
            .as_ref()
            .unwrap()
            .contains("does not appear to be a git repository"));
    }

    #[tokio::test]
    async fn test_commit_on_clean_tree_is_skipped() {
        let mut git = MockGitClient::new();
        // Only the dirtiness probe runs; no staging, no commit
        git.expect_run()
            .times(1)
            .returning(|_, command| {
                assert_eq!(command.args()[0], "status");
                Ok(ExecutionResult::new(0, String::new(), String::new(), 1))
            });

        let operation = Operation::commit("tidy up").unwrap();
        let use_case = RunOperationUseCase::new(RunOperationConfig::new(operation), Arc::new(git));
        let batch = use_case.execute(repos(&["clean"]), None, &ctx()).await.unwrap();

        assert_eq!(batch.skipped_count, 1);
        assert_eq!(batch.results[0].outcome, Outcome::Skipped);
        assert!(batch.results[0]
            .error_message
            .as_ref()
            .unwrap()
            .contains("nothing to commit"));
        assert!(batch.is_success());
    }

    #[tokio::test]
    async fn test_commit_on_dirty_tree_stages_and_commits() {
        let mut git = MockGitClient::new();
        git.expect_run().times(3).returning(|_, command| {
            Ok(match command.args()[0].as_str() {
                "status" => ok_exec(" M src/lib.rs\n"),
                "add" => ok_exec(""),
                "commit" => ok_exec("1 file changed"),
                other => panic!("unexpected git subcommand: {}", other),
            })
        });

        let operation = Operation::commit("fix lib").unwrap();
        let use_case = RunOperationUseCase::new(RunOperationConfig::new(operation), Arc::new(git));
        let batch = use_case.execute(repos(&["dirty"]), None, &ctx()).await.unwrap();

        assert_eq!(batch.succeeded_count, 1);
        assert!(batch.results[0].stdout.contains("1 file changed"));
    }

    #[tokio::test]
    async fn test_commit_failure_surfaces_stderr() {
        let mut git = MockGitClient::new();
        git.expect_run().times(3).returning(|_, command| {
            Ok(match command.args()[0].as_str() {
                "status" => ok_exec("?? junk\n"),
                "add" => ok_exec(""),
                "commit" => failed_exec("error: gpg failed to sign the data\n"),
                other => panic!("unexpected git subcommand: {}", other),
            })
        });

        let operation = Operation::commit("signed work").unwrap();
        let use_case = RunOperationUseCase::new(RunOperationConfig::new(operation), Arc::new(git));
        let batch = use_case.execute(repos(&["repo"]), None, &ctx()).await.unwrap();

        assert_eq!(batch.failed_count, 1);
        assert!(batch.results[0]
            .error_message
            .as_ref()
            .unwrap()
            .contains("gpg failed"));
    }

    #[tokio::test]
    async fn test_cancelled_run_interrupts_unlaunched_repositories() {
        let mut git = MockGitClient::new();
        git.expect_run().times(0);

        let context = ctx();
        context.request_cancel();

        let use_case =
            RunOperationUseCase::new(RunOperationConfig::new(Operation::Status), Arc::new(git));
        let batch = use_case
            .execute(repos(&["a", "b"]), None, &context)
            .await
            .unwrap();

        assert_eq!(batch.total_count(), 2);
        assert_eq!(batch.interrupted_count, 2);
        assert!(!batch.is_success());
    }

    #[tokio::test]
    async fn test_reporter_sees_one_lifecycle_per_repository() {
        use crate::application::context::MockProgressReporter;

        let mut git = MockGitClient::new();
        git.expect_run()
            .times(2)
            .returning(|_, _| Ok(ExecutionResult::new(0, String::new(), String::new(), 1)));

        let mut reporter = MockProgressReporter::new();
        reporter.expect_repository_started().times(2).return_const(());
        reporter.expect_repository_finished().times(2).return_const(());

        let context = RunContext::new(Arc::new(reporter), None);
        let use_case =
            RunOperationUseCase::new(RunOperationConfig::new(Operation::Status), Arc::new(git));
        let batch = use_case
            .execute(repos(&["a", "b"]), None, &context)
            .await
            .unwrap();

        assert_eq!(batch.total_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_batch_is_an_error() {
        let git = MockGitClient::new();
        let use_case =
            RunOperationUseCase::new(RunOperationConfig::new(Operation::Status), Arc::new(git));
        let result = use_case.execute(Vec::new(), None, &ctx()).await;
        assert!(matches!(result, Err(RunOperationError::NoRepositories)));
    }

    #[test]
    fn test_failure_reason_falls_back_to_exit_code() {
        let exec = ExecutionResult::new(128, String::new(), String::new(), 1);
        assert_eq!(failure_reason(&exec), "exited with code 128");

        let exec = ExecutionResult::new(1, "merge conflict\n".to_string(), String::new(), 1);
        assert_eq!(failure_reason(&exec), "merge conflict");
    }
}
