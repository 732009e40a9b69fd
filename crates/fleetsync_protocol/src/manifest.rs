//! Sync manifests: file labels and their checksums.

use crate::error::{ProtocolError, ProtocolResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A lowercase hex SHA-256 digest of a file's contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileChecksum(String);

impl FileChecksum {
    /// Wraps an already-computed hex digest.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Computes the checksum of a file by streaming its contents.
    pub fn of_file(path: &Path) -> ProtocolResult<Self> {
        let mut file = File::open(path)?;
        let mut hasher = Sha256::new();
        let mut buffer = [0u8; 8192];

        loop {
            let read = file.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }

        let digest = hasher.finalize();
        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest {
            use fmt::Write;
            let _ = write!(hex, "{byte:02x}");
        }
        Ok(Self(hex))
    }

    /// Returns the hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Labelled checksums for one batch of files offered to the master.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncManifest {
    checksums: BTreeMap<String, FileChecksum>,
}

impl SyncManifest {
    /// Creates an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a labelled checksum.
    pub fn insert(&mut self, label: impl Into<String>, checksum: FileChecksum) {
        self.checksums.insert(label.into(), checksum);
    }

    /// Looks up a checksum by label.
    pub fn get(&self, label: &str) -> Option<&FileChecksum> {
        self.checksums.get(label)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.checksums.len()
    }

    /// Returns true if the manifest has no entries.
    pub fn is_empty(&self) -> bool {
        self.checksums.is_empty()
    }

    /// Iterates over labels and checksums in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileChecksum)> {
        self.checksums.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Payload of a sync permission request.
///
/// Carries the job's command token and the checksums of the files the
/// worker wants to push, so the master can decide whether the transfer
/// is worth accepting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRequest {
    /// Wire token of the command the worker intends to run.
    pub command: String,
    /// Checksums of the files offered for transfer.
    pub checksums: SyncManifest,
}

impl PermissionRequest {
    /// Creates a permission request.
    pub fn new(command: impl Into<String>, checksums: SyncManifest) -> Self {
        Self {
            command: command.into(),
            checksums,
        }
    }

    /// Encodes the request as a JSON payload.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes a request from a JSON payload.
    pub fn decode(raw: &[u8]) -> ProtocolResult<Self> {
        if raw.is_empty() {
            return Err(ProtocolError::Malformed("empty permission payload".into()));
        }
        Ok(serde_json::from_slice(raw)?)
    }
}
