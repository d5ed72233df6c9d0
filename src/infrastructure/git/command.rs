use std::fmt;

/// A typed git argument list.
///
/// Every supported invocation has a named constructor, so the mapping from
/// operation to subcommand is explicit and independently testable, and no
/// command line is ever assembled from untrusted strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommand {
    args: Vec<String>,
}

impl GitCommand {
    fn new<const N: usize>(args: [&str; N]) -> Self {
        Self {
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// `git status --short --branch`
    pub fn status_short() -> Self {
        Self::new(["status", "--short", "--branch"])
    }

    /// `git status --porcelain` — machine-readable dirtiness probe
    pub fn status_porcelain() -> Self {
        Self::new(["status", "--porcelain"])
    }

    /// `git status --porcelain --branch` — dirtiness plus branch header
    pub fn status_branch_porcelain() -> Self {
        Self::new(["status", "--porcelain", "--branch"])
    }

    /// `git fetch`
    pub fn fetch() -> Self {
        Self::new(["fetch"])
    }

    /// `git pull`
    pub fn pull() -> Self {
        Self::new(["pull"])
    }

    /// `git push`
    pub fn push() -> Self {
        Self::new(["push"])
    }

    /// `git add --all`
    pub fn stage_all() -> Self {
        Self::new(["add", "--all"])
    }

    /// `git commit -m <message>`
    pub fn commit(message: &str) -> Self {
        Self {
            args: vec![
                "commit".to_string(),
                "-m".to_string(),
                message.to_string(),
            ],
        }
    }

    /// `git log --oneline -n <max_count>`
    pub fn log_oneline(max_count: usize) -> Self {
        Self {
            args: vec![
                "log".to_string(),
                "--oneline".to_string(),
                "-n".to_string(),
                max_count.to_string(),
            ],
        }
    }

    /// The argument list, without the leading `git`.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for GitCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "git {}", self.args.join(" "))
    }
}
