//! Registry snapshot parsing.

use crate::agent::{AgentId, AgentRecord};
use std::collections::HashMap;

/// Marker character that flags a disabled agent on the name field.
const DISABLED_MARKER: char = '!';

/// A point-in-time listing of agents and their enable state.
///
/// Parsed from line-oriented text, one agent per non-empty line:
///
/// ```text
/// id name address key_hash
/// ```
///
/// Line order carries no meaning for diffing. Malformed lines (wrong
/// field count, bad id) are skipped rather than failing the whole
/// snapshot, so a registry reconciliation degrades gracefully instead
/// of aborting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySnapshot {
    records: Vec<AgentRecord>,
}

impl RegistrySnapshot {
    /// Creates an empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a snapshot from its line-oriented serialization.
    ///
    /// A blank source yields an empty snapshot.
    pub fn parse(source: &str) -> Self {
        let mut records = Vec::new();

        for line in source.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            let [id, name, address, key_hash] = fields.as_slice() else {
                continue;
            };

            let Ok(id) = AgentId::parse(id) else {
                continue;
            };

            let (name, enabled) = match name.strip_prefix(DISABLED_MARKER) {
                Some(stripped) => (stripped, false),
                None => (*name, true),
            };

            records.push(AgentRecord {
                id,
                name: name.to_string(),
                address: address.to_string(),
                key_hash: key_hash.to_string(),
                enabled,
            });
        }

        Self { records }
    }

    /// Returns the parsed records in source order.
    pub fn records(&self) -> &[AgentRecord] {
        &self.records
    }

    /// Returns true if the snapshot has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Builds an id → enabled lookup. Duplicate ids: last wins.
    pub(crate) fn enabled_by_id(&self) -> HashMap<&AgentId, bool> {
        self.records
            .iter()
            .map(|record| (&record.id, record.enabled))
            .collect()
    }

    /// Finds the last record with the given id, if any.
    pub fn find(&self, id: &AgentId) -> Option<&AgentRecord> {
        self.records.iter().rev().find(|record| &record.id == id)
    }
}
