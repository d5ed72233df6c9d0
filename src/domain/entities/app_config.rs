use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// Default bounded-duration for the connectivity probe, in seconds.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Configuration file name looked up in the user's home directory.
pub const CONFIG_FILE_NAME: &str = ".githerd.yml";

/// Per-user tool configuration, loaded from a YAML file.
///
/// Every field has a default so a missing or partial file still yields a
/// usable configuration; values are validated on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    /// Remote host probed before network-dependent operations,
    /// as `host` or `host:port`
    pub git_server: Option<String>,

    /// Repositories promoted to the front of every batch, in order
    pub preferred_repos: Vec<String>,

    /// Maximum concurrent git subprocesses
    #[validate(range(min = 1, max = 64))]
    pub parallel_jobs: usize,

    /// Connectivity probe timeout in seconds
    #[validate(range(min = 1, max = 300))]
    pub probe_timeout_secs: u64,

    /// Per-command timeout in seconds (no timeout when unset)
    pub command_timeout_secs: Option<u64>,

    /// Directory receiving the per-run result logs (home directory when unset)
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            git_server: None,
            preferred_repos: Vec::new(),
            parallel_jobs: num_cpus::get().clamp(1, 64),
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            command_timeout_secs: None,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Default configuration file path (`~/.githerd.yml`), when a home
    /// directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }
}

/// The user's home directory, from `HOME` (or `USERPROFILE` on Windows).
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.git_server.is_none());
        assert!(config.preferred_repos.is_empty());
        assert!(config.parallel_jobs >= 1);
        assert_eq!(config.probe_timeout_secs, DEFAULT_PROBE_TIMEOUT_SECS);
    }

    #[test]
    fn test_zero_jobs_rejected() {
        let config = AppConfig {
            parallel_jobs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: AppConfig =
            serde_yaml::from_str("git_server: git.example.com:22\n").unwrap();
        assert_eq!(config.git_server.as_deref(), Some("git.example.com:22"));
        assert_eq!(config.probe_timeout_secs, DEFAULT_PROBE_TIMEOUT_SECS);
        assert!(config.command_timeout_secs.is_none());
    }

    #[test]
    fn test_roundtrip() {
        let config = AppConfig {
            git_server: Some("gitea.local".to_string()),
            preferred_repos: vec!["work".to_string(), "gaming".to_string()],
            ..Default::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
