//! Error types for registry operations.

use thiserror::Error;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors that can occur during registry handling.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// An I/O error while reading a snapshot source or removing artifacts.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The agent directory failed to resolve a batch of ids.
    #[error("agent directory error: {0}")]
    Directory(String),

    /// The agent database rejected an operation.
    #[error("agent database error: {0}")]
    Database(String),

    /// An agent id did not have the expected shape.
    #[error("invalid agent id '{0}': expected a 3-digit zero-padded number")]
    InvalidAgentId(String),
}
