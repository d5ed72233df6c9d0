use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::domain::entities::repository::Repository;

/// Repository discovery errors. These are the only errors fatal to a whole
/// run: they occur before any operation is attempted.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("root directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("root path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to read directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Discovers git repositories directly under a root directory.
pub struct RepositoryDiscoverer;

impl RepositoryDiscoverer {
    /// Return the immediate child directories of `root` that contain a
    /// `.git` entry, ordered lexicographically by path.
    ///
    /// Does not recurse: nested repositories below the first level are
    /// intentionally ignored.
    pub fn discover(root: &Path) -> Result<Vec<Repository>, DiscoveryError> {
        if !root.exists() {
            return Err(DiscoveryError::RootNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(DiscoveryError::NotADirectory(root.to_path_buf()));
        }

        let mut repositories = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
            let entry = entry?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let path = entry.path();
            if path.join(".git").exists() {
                debug!(repo = %path.display(), "discovered repository");
                repositories.push(Repository::new(path));
            }
        }

        repositories.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(repositories)
    }

    /// Move the named repositories to the front of the list, in the order
    /// given, leaving the relative order of the remainder untouched.
    pub fn promote_preferred(repositories: &mut Vec<Repository>, preferred: &[String]) {
        if preferred.is_empty() {
            return;
        }

        let mut front = Vec::new();
        for name in preferred {
            if let Some(pos) = repositories.iter().position(|r| &r.name == name) {
                front.push(repositories.remove(pos));
            }
        }
        front.append(repositories);
        *repositories = front;
    }
}
