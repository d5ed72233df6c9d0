use std::fmt;
use thiserror::Error;

/// Minimum accepted commit message length after trimming.
pub const MIN_COMMIT_MESSAGE_LEN: usize = 3;

/// Default number of commits shown by the log operation.
pub const DEFAULT_LOG_COUNT: usize = 10;

/// Operation construction errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OperationError {
    #[error("commit message must be at least {MIN_COMMIT_MESSAGE_LEN} characters long")]
    CommitMessageTooShort,
}

/// The batch operation applied uniformly to every discovered repository.
///
/// A closed set matched exhaustively, so adding an operation is a
/// compile-time-checked change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Read-only query of working-tree state
    Status,
    /// Download refs and objects from the configured remote
    Fetch,
    /// Fetch and merge from the configured remote
    Pull,
    /// Publish local commits to the configured remote
    Push,
    /// Stage all changes and create a commit with the supplied message
    Commit { message: String },
    /// Show the most recent commits, one line each
    Log { max_count: usize },
}

impl Operation {
    /// Create a commit operation, validating the message.
    pub fn commit(message: impl Into<String>) -> Result<Self, OperationError> {
        let message = message.into();
        if message.trim().len() < MIN_COMMIT_MESSAGE_LEN {
            return Err(OperationError::CommitMessageTooShort);
        }
        Ok(Self::Commit {
            message: message.trim().to_string(),
        })
    }

    /// Create a log operation showing up to `max_count` commits.
    pub fn log(max_count: usize) -> Self {
        Self::Log {
            max_count: max_count.max(1),
        }
    }

    /// Stable lowercase name used in reports and the result log.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Fetch => "fetch",
            Self::Pull => "pull",
            Self::Push => "push",
            Self::Commit { .. } => "commit",
            Self::Log { .. } => "log",
        }
    }

    /// Whether the operation talks to the configured remote and therefore
    /// participates in the connectivity precheck.
    pub fn requires_network(&self) -> bool {
        match self {
            Self::Fetch | Self::Pull | Self::Push => true,
            Self::Status | Self::Commit { .. } | Self::Log { .. } => false,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_message_validation() {
        assert_eq!(
            Operation::commit("ab"),
            Err(OperationError::CommitMessageTooShort)
        );
        assert_eq!(
            Operation::commit("   x   "),
            Err(OperationError::CommitMessageTooShort)
        );

        let op = Operation::commit("  Fix the build  ").unwrap();
        assert_eq!(
            op,
            Operation::Commit {
                message: "Fix the build".to_string()
            }
        );
    }

    #[test]
    fn test_network_classification() {
        assert!(Operation::Pull.requires_network());
        assert!(Operation::Push.requires_network());
        assert!(Operation::Fetch.requires_network());
        assert!(!Operation::Status.requires_network());
        assert!(!Operation::log(5).requires_network());
        assert!(!Operation::commit("message").unwrap().requires_network());
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(Operation::Status.name(), "status");
        assert_eq!(Operation::Pull.to_string(), "pull");
        assert_eq!(Operation::commit("message").unwrap().name(), "commit");
    }

    #[test]
    fn test_log_count_floor() {
        assert_eq!(Operation::log(0), Operation::Log { max_count: 1 });
    }
}
