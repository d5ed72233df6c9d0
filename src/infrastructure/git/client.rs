use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

use crate::infrastructure::git::command::GitCommand;
use crate::infrastructure::process::{
    CommandExecutor, CommandExecutorError, ExecutionConfig, ExecutionResult,
};

/// Interface for running git commands against a repository working tree.
///
/// The runner and the summary use case depend on this trait rather than on
/// the subprocess layer directly, so they can be exercised without spawning
/// a single process.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitClient: Send + Sync {
    /// Run one git command inside the given repository path.
    async fn run(
        &self,
        repo_path: &Path,
        command: &GitCommand,
    ) -> Result<ExecutionResult, CommandExecutorError>;
}

/// Git client backed by the system `git` binary.
#[derive(Debug, Clone, Default)]
pub struct SystemGitClient {
    timeout_seconds: Option<u64>,
}

impl SystemGitClient {
    /// Create a client with no per-command timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a per-command timeout.
    pub fn with_timeout(mut self, timeout_seconds: Option<u64>) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

#[async_trait]
impl GitClient for SystemGitClient {
    async fn run(
        &self,
        repo_path: &Path,
        command: &GitCommand,
    ) -> Result<ExecutionResult, CommandExecutorError> {
        debug!(repo = %repo_path.display(), command = %command, "running git command");

        let mut config = ExecutionConfig::new().with_working_directory(repo_path);
        if let Some(secs) = self.timeout_seconds {
            config = config.with_timeout(secs);
        }

        CommandExecutor::execute("git", command.args(), &config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_builder() {
        let client = SystemGitClient::new();
        assert_eq!(client.timeout_seconds, None);

        let client = SystemGitClient::new().with_timeout(Some(30));
        assert_eq!(client.timeout_seconds, Some(30));
    }
}
