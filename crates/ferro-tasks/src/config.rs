use std::time::Duration;

use crate::RetryBackoff;

/// Configuration for one task server instance.
///
/// No process-wide defaults exist; every server is constructed with an
/// explicit config.
///
/// ## Field semantics
/// - `concurrency`: how many tasks this instance handles simultaneously.
/// - `poll_timeout`: upper bound on one blocking claim call. Bounds how long
///   shutdown can lag behind cancellation.
/// - `reap_interval`: cadence of the lease-recovery and retention-purge pass.
/// - `lease_grace`: slack added to a task's execution timeout when computing
///   its claim lease, covering outcome reporting after the deadline.
/// - `shutdown_grace`: how long to wait for in-flight handlers on shutdown.
/// - `backoff`: retry delay policy for failed tasks.
/// - `identity`: name this instance claims tasks under; shows up as the
///   lease owner when diagnosing stuck work.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub concurrency: usize,
    pub poll_timeout: Duration,
    pub reap_interval: Duration,
    pub lease_grace: Duration,
    pub shutdown_grace: Duration,
    pub backoff: RetryBackoff,
    pub identity: String,
}

impl Default for ServerConfig {
    /// Defaults: 10 workers, 5s claim poll, 30s reap interval, 30s lease
    /// grace, 30s shutdown grace, identity from the host name.
    fn default() -> Self {
        Self {
            concurrency: 10,
            poll_timeout: Duration::from_secs(5),
            reap_interval: Duration::from_secs(30),
            lease_grace: Duration::from_secs(30),
            shutdown_grace: Duration::from_secs(30),
            backoff: RetryBackoff::default(),
            identity: default_identity(),
        }
    }
}

fn default_identity() -> String {
    hostname::get()
        .ok()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ferro-tasks".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.concurrency, 10);
        assert_eq!(cfg.poll_timeout, Duration::from_secs(5));
        assert!(!cfg.identity.is_empty());
    }
}
