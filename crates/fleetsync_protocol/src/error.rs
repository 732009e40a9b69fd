//! Error types for the protocol crate.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while encoding or decoding protocol payloads.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// A payload did not match the expected structure.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// JSON encoding or decoding failed.
    #[error("payload codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// An I/O error while reading a file for checksumming.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
