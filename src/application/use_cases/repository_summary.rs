use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::domain::entities::repository::Repository;
use crate::infrastructure::git::client::GitClient;
use crate::infrastructure::git::command::GitCommand;

/// Condition of a repository working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkingTreeState {
    /// No uncommitted changes
    Clean,
    /// Uncommitted changes present
    Dirty,
    /// The status query itself failed
    Error,
}

/// Overview of a single repository: branch, dirtiness and remote drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySummary {
    /// Repository display name
    pub name: String,

    /// Working tree condition
    pub state: WorkingTreeState,

    /// Current branch (None when detached)
    pub branch: Option<String>,

    /// Number of uncommitted entries (staged, modified and untracked)
    pub uncommitted: usize,

    /// Commits ahead of the upstream branch
    pub ahead: usize,

    /// Commits behind the upstream branch
    pub behind: usize,

    /// Error text when the query failed
    pub error_message: Option<String>,
}

impl RepositorySummary {
    /// Create a clean summary for the given repository.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: WorkingTreeState::Clean,
            branch: None,
            uncommitted: 0,
            ahead: 0,
            behind: 0,
            error_message: None,
        }
    }

    /// Mark the summary as failed.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.state = WorkingTreeState::Error;
        self.error_message = Some(error.into());
        self
    }

    /// Whether the repository needs attention.
    pub fn has_issues(&self) -> bool {
        !matches!(self.state, WorkingTreeState::Clean) || self.ahead > 0 || self.behind > 0
    }
}

/// Aggregate summary over all repositories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResult {
    /// Per-repository summaries, in batch order
    pub repositories: Vec<RepositorySummary>,

    /// Number of clean repositories
    pub clean_count: usize,

    /// Number of dirty repositories
    pub dirty_count: usize,

    /// Number of repositories whose query failed
    pub error_count: usize,
}

impl SummaryResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self {
            repositories: Vec::new(),
            clean_count: 0,
            dirty_count: 0,
            error_count: 0,
        }
    }

    /// Append one summary and update the counters.
    pub fn add_repository(&mut self, summary: RepositorySummary) {
        match summary.state {
            WorkingTreeState::Clean => self.clean_count += 1,
            WorkingTreeState::Dirty => self.dirty_count += 1,
            WorkingTreeState::Error => self.error_count += 1,
        }
        self.repositories.push(summary);
    }

    /// Whether any repository needs attention.
    pub fn has_issues(&self) -> bool {
        self.dirty_count > 0
            || self.error_count > 0
            || self.repositories.iter().any(|r| r.has_issues())
    }

    /// Total number of repositories.
    pub fn total_count(&self) -> usize {
        self.repositories.len()
    }
}

impl Default for SummaryResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the repository overview from one `git status --porcelain
/// --branch` query per repository.
pub struct RepositorySummaryUseCase {
    git: Arc<dyn GitClient>,
    branch_re: Regex,
    ahead_re: Regex,
    behind_re: Regex,
}

impl RepositorySummaryUseCase {
    /// Create a summary use case over the given git client.
    pub fn new(git: Arc<dyn GitClient>) -> Self {
        Self {
            git,
            branch_re: Regex::new(r"^## (\S+?)(?:\.\.\.(\S+))?(?: \[.*\])?$")
                .expect("branch header pattern is valid"),
            ahead_re: Regex::new(r"ahead (\d+)").expect("ahead pattern is valid"),
            behind_re: Regex::new(r"behind (\d+)").expect("behind pattern is valid"),
        }
    }

    /// Query every repository in turn.
    pub async fn execute(&self, repositories: &[Repository]) -> SummaryResult {
        let mut result = SummaryResult::new();
        for repo in repositories {
            debug!(repo = %repo.name, "collecting summary");
            result.add_repository(self.summarize_repository(repo).await);
        }
        result
    }

    async fn summarize_repository(&self, repo: &Repository) -> RepositorySummary {
        match self
            .git
            .run(&repo.path, &GitCommand::status_branch_porcelain())
            .await
        {
            Ok(exec) if exec.success => self.parse_porcelain(&repo.name, &exec.stdout),
            Ok(exec) => {
                let reason = if exec.stderr.trim().is_empty() {
                    format!("git status exited with code {}", exec.exit_code)
                } else {
                    exec.stderr.trim().to_string()
                };
                RepositorySummary::new(&repo.name).with_error(reason)
            }
            Err(e) => RepositorySummary::new(&repo.name).with_error(e.to_string()),
        }
    }

    /// Parse `git status --porcelain --branch` output: a `## branch` header
    /// followed by one line per changed path.
    fn parse_porcelain(&self, name: &str, output: &str) -> RepositorySummary {
        let mut summary = RepositorySummary::new(name);
        let mut lines = output.lines();

        if let Some(header) = lines.next() {
            if let Some(rest) = header.strip_prefix("## No commits yet on ") {
                summary.branch = Some(rest.trim().to_string());
            } else if header.starts_with("## HEAD") {
                // detached HEAD
                summary.branch = None;
            } else if let Some(caps) = self.branch_re.captures(header) {
                summary.branch = caps.get(1).map(|m| m.as_str().to_string());
                summary.ahead = self
                    .ahead_re
                    .captures(header)
                    .and_then(|c| c[1].parse().ok())
                    .unwrap_or(0);
                summary.behind = self
                    .behind_re
                    .captures(header)
                    .and_then(|c| c[1].parse().ok())
                    .unwrap_or(0);
            }
        }

        summary.uncommitted = lines.filter(|l| !l.trim().is_empty()).count();
        summary.state = if summary.uncommitted > 0 {
            WorkingTreeState::Dirty
        } else {
            WorkingTreeState::Clean
        };

        summary
    }
}
