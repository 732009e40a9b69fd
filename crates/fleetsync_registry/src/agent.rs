//! Agent identity and profile types.

use crate::error::{RegistryError, RegistryResult};
use std::fmt;

/// A fixed-width 3-digit zero-padded agent identifier.
///
/// Ids are compared by exact string equality, never numerically:
/// `"001"` and `"1"` are different things, and the latter is rejected
/// at parse time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentId(String);

impl AgentId {
    /// Parses an id, requiring exactly three ASCII digits.
    pub fn parse(raw: &str) -> RegistryResult<Self> {
        if raw.len() == 3 && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(RegistryError::InvalidAgentId(raw.to_string()))
        }
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One parsed line of a registry snapshot.
///
/// Immutable once parsed. A disabled agent is marked by a leading `!`
/// on the name field in the serialized line; the marker is stripped
/// from the stored name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRecord {
    /// The agent's id.
    pub id: AgentId,
    /// The agent's name, without the disabled marker.
    pub name: String,
    /// The agent's registered address.
    pub address: String,
    /// Hash of the agent's pre-shared key.
    pub key_hash: String,
    /// Whether the agent is enabled.
    pub enabled: bool,
}

/// The subset of an agent's record needed to template artifact paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    /// The agent's id.
    pub id: AgentId,
    /// The agent's name.
    pub name: String,
    /// The agent's registered address.
    pub address: String,
}

impl AgentProfile {
    /// Creates a profile.
    pub fn new(id: AgentId, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            address: address.into(),
        }
    }
}

impl From<&AgentRecord> for AgentProfile {
    fn from(record: &AgentRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            address: record.address.clone(),
        }
    }
}
