//! Error types for the worker.

use thiserror::Error;

/// Result type for worker operations.
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors that can occur on a worker connection.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Network or channel error.
    #[error("channel error: {message}")]
    Channel {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// A wait on the master ran out of time.
    ///
    /// Never absorbed by the integrity loop: a timed-out heartbeat means
    /// the connection itself may be desynchronized.
    #[error("timed out waiting for the master")]
    Timeout,

    /// A domain-level error reported by a cluster node, carrying its
    /// original error code.
    #[error("node error {code}: {message}")]
    Node {
        /// The node's numeric error code.
        code: u16,
        /// The node's error message.
        message: String,
    },

    /// Protocol payload error.
    #[error(transparent)]
    Protocol(#[from] fleetsync_protocol::ProtocolError),

    /// Registry handling error.
    #[error(transparent)]
    Registry(#[from] fleetsync_registry::RegistryError),

    /// The connection is not established.
    #[error("not connected to the master")]
    NotConnected,
}

impl WorkerError {
    /// Creates a retryable channel error.
    pub fn channel_retryable(message: impl Into<String>) -> Self {
        Self::Channel {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable channel error.
    pub fn channel_fatal(message: impl Into<String>) -> Self {
        Self::Channel {
            message: message.into(),
            retryable: false,
        }
    }

    /// Creates a node error with a code.
    pub fn node(code: u16, message: impl Into<String>) -> Self {
        Self::Node {
            code,
            message: message.into(),
        }
    }

    /// Returns true if this error can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkerError::Channel { retryable, .. } => *retryable,
            WorkerError::Timeout => true,
            _ => false,
        }
    }

    /// Returns the node error code, if this is a node error.
    pub fn code(&self) -> Option<u16> {
        match self {
            WorkerError::Node { code, .. } => Some(*code),
            _ => None,
        }
    }
}
