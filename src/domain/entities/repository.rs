use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Lifecycle state of a repository within a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryState {
    /// Discovered, not yet scheduled
    Pending,
    /// Operation subprocess in flight
    Running,
    /// Operation completed with exit code 0
    Succeeded,
    /// Operation completed with a failure
    Failed,
    /// Operation was benignly skipped (e.g. nothing to commit)
    Skipped,
    /// Run was cancelled before the operation launched
    Interrupted,
}

/// A git repository discovered under the batch root.
///
/// Identified by its filesystem path; the display name is the directory
/// basename. State is mutated as the run progresses and is discarded at
/// process exit — nothing is persisted between runs beyond the result log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Absolute or root-relative path of the repository
    pub path: PathBuf,

    /// Display name (directory basename)
    pub name: String,

    /// Outcome of the last operation applied to this repository
    pub state: RepositoryState,

    /// Error text from the last failed operation, if any
    pub last_error: Option<String>,
}

impl Repository {
    /// Create a new repository entity from its filesystem path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            path,
            name,
            state: RepositoryState::Pending,
            last_error: None,
        }
    }

    /// Set the state.
    pub fn with_state(mut self, state: RepositoryState) -> Self {
        self.state = state;
        self
    }

    /// Path of the version-control metadata directory.
    pub fn git_dir(&self) -> PathBuf {
        self.path.join(".git")
    }

    /// Record a failed operation.
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.state = RepositoryState::Failed;
        self.last_error = Some(error.into());
    }

    /// Whether the repository reached a terminal state this run.
    pub fn is_settled(&self) -> bool {
        !matches!(self.state, RepositoryState::Pending | RepositoryState::Running)
    }
}

impl AsRef<Path> for Repository {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_creation() {
        let repo = Repository::new("/srv/repos/frontend");
        assert_eq!(repo.name, "frontend");
        assert_eq!(repo.path, PathBuf::from("/srv/repos/frontend"));
        assert_eq!(repo.state, RepositoryState::Pending);
        assert!(repo.last_error.is_none());
        assert!(!repo.is_settled());
    }

    #[test]
    fn test_git_dir() {
        let repo = Repository::new("/srv/repos/frontend");
        assert_eq!(repo.git_dir(), PathBuf::from("/srv/repos/frontend/.git"));
    }

    #[test]
    fn test_mark_failed() {
        let mut repo = Repository::new("/srv/repos/api");
        repo.mark_failed("merge conflict");
        assert_eq!(repo.state, RepositoryState::Failed);
        assert_eq!(repo.last_error.as_deref(), Some("merge conflict"));
        assert!(repo.is_settled());
    }

    #[test]
    fn test_with_state_builder() {
        let repo = Repository::new("/srv/repos/api").with_state(RepositoryState::Succeeded);
        assert_eq!(repo.state, RepositoryState::Succeeded);
        assert!(repo.is_settled());
    }
}
