use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::domain::entities::app_config::DEFAULT_PROBE_TIMEOUT_SECS;
use crate::domain::value_objects::remote_host::RemoteHost;

/// Outcome of the connectivity precheck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityStatus {
    /// The remote accepted a TCP connection within the probe timeout
    Reachable,
    /// The remote could not be reached; carries diagnostic text
    Unreachable { reason: String },
}

impl ConnectivityStatus {
    /// Whether the remote was reachable.
    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable)
    }

    /// Diagnostic text for the unreachable case.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Reachable => None,
            Self::Unreachable { reason } => Some(reason),
        }
    }
}

/// Bounded-duration TCP reachability probe.
///
/// Run at most once per batch, before any network-dependent operation, so a
/// dead git server costs one timeout instead of one per repository.
#[derive(Debug, Clone)]
pub struct ConnectivityProbe {
    timeout: Duration,
}

impl Default for ConnectivityProbe {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
        }
    }
}

impl ConnectivityProbe {
    /// Create a probe with the default timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the probe timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attempt a TCP connection to the remote within the configured timeout.
    pub async fn check(&self, remote: &RemoteHost) -> ConnectivityStatus {
        let target = (remote.host().to_string(), remote.port());

        match timeout(self.timeout, TcpStream::connect(target)).await {
            Ok(Ok(_stream)) => {
                info!(remote = %remote, "remote is reachable");
                ConnectivityStatus::Reachable
            }
            Ok(Err(e)) => {
                warn!(remote = %remote, error = %e, "remote is unreachable");
                ConnectivityStatus::Unreachable {
                    reason: format!("cannot connect to {}: {}", remote, e),
                }
            }
            Err(_) => {
                warn!(remote = %remote, "connectivity probe timed out");
                ConnectivityStatus::Unreachable {
                    reason: format!(
                        "connection to {} timed out after {}s",
                        remote,
                        self.timeout.as_secs()
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_listening_port_is_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let remote = RemoteHost::new("127.0.0.1", addr.port()).unwrap();
        let status = ConnectivityProbe::new().check(&remote).await;
        assert!(status.is_reachable());
        assert!(status.reason().is_none());
    }

    #[tokio::test]
    async fn test_closed_port_is_unreachable() {
        // Bind then drop to obtain a port that is very likely closed
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let remote = RemoteHost::new("127.0.0.1", addr.port()).unwrap();
        let status = ConnectivityProbe::new().check(&remote).await;
        assert!(!status.is_reachable());
        let reason = status.reason().unwrap();
        assert!(reason.contains("127.0.0.1"));
    }
}
