use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Command executor errors
#[derive(Debug, Error)]
pub enum CommandExecutorError {
    #[error("Command timed out after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Process spawn failed: {0}")]
    SpawnFailed(String),
}

/// Configuration for command execution
#[derive(Debug, Clone, Default)]
pub struct ExecutionConfig {
    /// Working directory for command execution
    pub working_directory: Option<PathBuf>,

    /// Environment variables to set for the process
    pub environment_variables: HashMap<String, String>,

    /// Timeout for command execution in seconds
    pub timeout_seconds: Option<u64>,
}

impl ExecutionConfig {
    /// Create a new execution config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set working directory
    pub fn with_working_directory<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.working_directory = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Add environment variable
    pub fn with_environment_variable(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.environment_variables.insert(key.into(), value.into());
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }
}

/// Result of command execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Exit code of the process
    pub exit_code: i32,

    /// Standard output
    pub stdout: String,

    /// Standard error output
    pub stderr: String,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,

    /// Whether the command was successful (exit code 0)
    pub success: bool,
}

impl ExecutionResult {
    /// Create a new execution result
    pub fn new(exit_code: i32, stdout: String, stderr: String, execution_time_ms: u64) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            execution_time_ms,
            success: exit_code == 0,
        }
    }
}

/// Command executor for running external processes.
///
/// Commands are always given as a program plus a typed argument list; there
/// is no shell involved and no string splitting of user input.
pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute a single command and capture its output.
    pub async fn execute(
        program: &str,
        args: &[String],
        config: &ExecutionConfig,
    ) -> Result<ExecutionResult, CommandExecutorError> {
        if program.trim().is_empty() {
            return Err(CommandExecutorError::InvalidCommand(
                "Program name is empty".to_string(),
            ));
        }

        let start_time = Instant::now();

        let mut cmd = TokioCommand::new(program);
        cmd.args(args);

        if let Some(working_dir) = &config.working_directory {
            cmd.current_dir(working_dir);
        }

        for (key, value) in &config.environment_variables {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        // Dropping the wait future on timeout must not leak the subprocess
        cmd.kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            CommandExecutorError::SpawnFailed(format!("Failed to spawn '{}': {}", program, e))
        })?;

        let output = if let Some(timeout_secs) = config.timeout_seconds {
            match timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await {
                Ok(output) => output?,
                Err(_) => {
                    return Err(CommandExecutorError::Timeout {
                        timeout_seconds: timeout_secs,
                    })
                }
            }
        } else {
            child.wait_with_output().await?
        };

        let execution_time = start_time.elapsed().as_millis() as u64;
        let exit_code = output.status.code().unwrap_or(-1);

        Ok(ExecutionResult::new(
            exit_code,
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
            execution_time,
        ))
    }

    /// Check if a command exists in PATH
    pub fn command_exists(command: &str) -> bool {
        std::process::Command::new("which")
            .arg(command)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_simple_command_execution() {
        let config = ExecutionConfig::new();
        let result = CommandExecutor::execute("echo", &args(&["Hello, World!"]), &config).await;

        assert!(result.is_ok());
        let exec_result = result.unwrap();
        assert!(exec_result.success);
        assert_eq!(exec_result.exit_code, 0);
        assert!(exec_result.stdout.contains("Hello, World!"));
    }

    #[tokio::test]
    async fn test_command_with_working_directory() {
        let temp_dir = TempDir::new().unwrap();
        let config = ExecutionConfig::new().with_working_directory(temp_dir.path());

        let result = CommandExecutor::execute("pwd", &[], &config).await;

        assert!(result.is_ok());
        let exec_result = result.unwrap();
        assert!(exec_result.success);
        let expected = temp_dir.path().canonicalize().unwrap();
        assert!(exec_result
            .stdout
            .trim()
            .contains(&expected.to_string_lossy().to_string()));
    }

    #[tokio::test]
    async fn test_command_with_environment_variables() {
        let config = ExecutionConfig::new().with_environment_variable("PROBE_VAR", "probe_value");

        let result = CommandExecutor::execute("env", &[], &config).await;

        assert!(result.is_ok());
        let exec_result = result.unwrap();
        assert!(exec_result.success);
        assert!(exec_result.stdout.contains("PROBE_VAR=probe_value"));
    }

    #[tokio::test]
    async fn test_command_timeout() {
        let config = ExecutionConfig::new().with_timeout(1);

        let result = CommandExecutor::execute("sleep", &args(&["3"]), &config).await;

        assert!(result.is_err());
        if let Err(CommandExecutorError::Timeout { timeout_seconds }) = result {
            assert_eq!(timeout_seconds, 1);
        } else {
            panic!("Expected timeout error");
        }
    }

    #[tokio::test]
    async fn test_failed_command() {
        let config = ExecutionConfig::new();
        let result = CommandExecutor::execute("false", &[], &config).await;

        assert!(result.is_ok());
        let exec_result = result.unwrap();
        assert!(!exec_result.success);
        assert_ne!(exec_result.exit_code, 0);
    }

    #[tokio::test]
    async fn test_empty_program_rejected() {
        let config = ExecutionConfig::new();
        let result = CommandExecutor::execute("", &[], &config).await;
        assert!(matches!(
            result,
            Err(CommandExecutorError::InvalidCommand(_))
        ));
    }

    #[test]
    fn test_command_exists() {
        assert!(CommandExecutor::command_exists("echo"));
        assert!(!CommandExecutor::command_exists(
            "definitely-not-a-real-command-xyz"
        ));
    }
}
