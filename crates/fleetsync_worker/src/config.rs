//! Configuration for a worker connection.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for one worker's connection to its master.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// This worker's node name.
    pub node_name: String,
    /// Address of the master node.
    pub master_address: String,
    /// Root directory for the worker's on-disk agent state.
    pub worker_root: PathBuf,
    /// Interval between integrity checks.
    pub integrity_interval: Duration,
    /// Timeout for a single request to the master.
    pub request_timeout: Duration,
    /// Delay before retrying a failed connection.
    pub connection_retry: Duration,
}

impl WorkerConfig {
    /// Creates a configuration with default intervals.
    pub fn new(
        node_name: impl Into<String>,
        master_address: impl Into<String>,
        worker_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            node_name: node_name.into(),
            master_address: master_address.into(),
            worker_root: worker_root.into(),
            integrity_interval: Duration::from_secs(60),
            request_timeout: Duration::from_secs(30),
            connection_retry: Duration::from_secs(10),
        }
    }

    /// Sets the integrity check interval.
    pub fn with_integrity_interval(mut self, interval: Duration) -> Self {
        self.integrity_interval = interval;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the connection retry delay.
    pub fn with_connection_retry(mut self, retry: Duration) -> Self {
        self.connection_retry = retry;
        self
    }
}
