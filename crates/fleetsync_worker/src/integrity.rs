//! The periodic integrity-check loop.

use crate::channel::ConnectionChannel;
use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use fleetsync_protocol::Command;
use std::time::{Duration, Instant};
use tracing::debug;

/// Drives periodic integrity checks over the lifetime of a connection.
///
/// Each tick asks the master for the current integrity-sync status and
/// then sleeps until the next tick. Unlike a sync round, failures here
/// are NOT absorbed: a timeout or a node error in the heartbeat means
/// the connection itself may be desynchronized, and the enclosing
/// connection manager must react (reconnect or tear down).
#[derive(Debug, Clone)]
pub struct IntegrityLoop {
    interval: Duration,
    request_timeout: Duration,
}

impl IntegrityLoop {
    /// Creates a loop with the configured intervals.
    pub fn new(config: &WorkerConfig) -> Self {
        Self {
            interval: config.integrity_interval,
            request_timeout: config.request_timeout,
        }
    }

    /// Creates a loop with explicit intervals.
    pub fn with_intervals(interval: Duration, request_timeout: Duration) -> Self {
        Self {
            interval,
            request_timeout,
        }
    }

    /// Runs one tick: status request, then sleep until the next tick.
    ///
    /// # Errors
    ///
    /// Propagates unchanged:
    /// - [`WorkerError::Timeout`] when the master does not answer within
    ///   the request timeout
    /// - any error from the master's reply, preserving its code
    pub async fn tick<C: ConnectionChannel>(&self, channel: &C) -> WorkerResult<()> {
        let started = Instant::now();

        let status = tokio::time::timeout(
            self.request_timeout,
            channel.send_request(Command::IntegrityCheck, b""),
        )
        .await
        .map_err(|_| WorkerError::Timeout)??;

        debug!(status = %String::from_utf8_lossy(&status), "integrity status received");

        // Next tick lands on the interval boundary, not interval after
        // the reply.
        let remaining = self.interval.saturating_sub(started.elapsed());
        tokio::time::sleep(remaining).await;

        Ok(())
    }

    /// Runs ticks until one fails; the first failure is returned to the
    /// connection manager.
    pub async fn run<C: ConnectionChannel>(&self, channel: &C) -> WorkerResult<()> {
        loop {
            self.tick(channel).await?;
        }
    }
}
