use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Port assumed when the configured remote omits one (SSH).
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Remote host parsing errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RemoteHostError {
    #[error("remote host must not be empty")]
    Empty,

    #[error("invalid port in remote host '{0}'")]
    InvalidPort(String),
}

/// A probe target: `host` or `host:port`, validated at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteHost {
    host: String,
    port: u16,
}

impl RemoteHost {
    /// Create a remote host from its parts.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, RemoteHostError> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(RemoteHostError::Empty);
        }
        Ok(Self {
            host: host.trim().to_string(),
            port,
        })
    }

    /// Host name or address.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port.
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for RemoteHost {
    type Err = RemoteHostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RemoteHostError::Empty);
        }

        match s.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| RemoteHostError::InvalidPort(s.to_string()))?;
                Self::new(host, port)
            }
            None => Self::new(s, DEFAULT_SSH_PORT),
        }
    }
}

impl fmt::Display for RemoteHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_only_defaults_to_ssh_port() {
        let remote: RemoteHost = "git.example.com".parse().unwrap();
        assert_eq!(remote.host(), "git.example.com");
        assert_eq!(remote.port(), DEFAULT_SSH_PORT);
    }

    #[test]
    fn test_parse_host_and_port() {
        let remote: RemoteHost = "gitea.local:2222".parse().unwrap();
        assert_eq!(remote.host(), "gitea.local");
        assert_eq!(remote.port(), 2222);
    }

    #[test]
    fn test_parse_rejects_empty_and_bad_port() {
        assert_eq!("".parse::<RemoteHost>(), Err(RemoteHostError::Empty));
        assert_eq!("   ".parse::<RemoteHost>(), Err(RemoteHostError::Empty));
        assert_eq!(
            ":22".parse::<RemoteHost>(),
            Err(RemoteHostError::Empty)
        );
        assert!(matches!(
            "host:notaport".parse::<RemoteHost>(),
            Err(RemoteHostError::InvalidPort(_))
        ));
        assert!(matches!(
            "host:99999".parse::<RemoteHost>(),
            Err(RemoteHostError::InvalidPort(_))
        ));
    }

    #[test]
    fn test_display() {
        let remote: RemoteHost = "gitea.local".parse().unwrap();
        assert_eq!(remote.to_string(), "gitea.local:22");
    }
}
