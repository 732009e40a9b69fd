//! The agent directory seam.

use crate::agent::{AgentId, AgentProfile};
use crate::error::RegistryResult;
use crate::snapshot::RegistrySnapshot;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

/// Resolves agent ids to their profiles.
///
/// Resolution is batched: one call with the full id set, so a directory
/// backed by an expensive store answers a purge pass with a single
/// lookup. Ids the directory does not know are simply absent from the
/// returned batch; the caller decides what to do about them.
pub trait AgentDirectory: Send + Sync {
    /// Resolves every known id in `ids` to its profile.
    fn resolve_batch(&self, ids: &BTreeSet<AgentId>) -> RegistryResult<Vec<AgentProfile>>;
}

/// An in-memory agent directory for tests and tools.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    profiles: RwLock<BTreeMap<AgentId, AgentProfile>>,
}

impl MemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a profile.
    pub fn insert(&self, profile: AgentProfile) {
        self.profiles.write().insert(profile.id.clone(), profile);
    }

    /// Returns the number of known profiles.
    pub fn len(&self) -> usize {
        self.profiles.read().len()
    }

    /// Returns true if the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.profiles.read().is_empty()
    }
}

impl AgentDirectory for MemoryDirectory {
    fn resolve_batch(&self, ids: &BTreeSet<AgentId>) -> RegistryResult<Vec<AgentProfile>> {
        let profiles = self.profiles.read();
        Ok(ids
            .iter()
            .filter_map(|id| profiles.get(id).cloned())
            .collect())
    }
}

/// A directory that answers from a registry snapshot.
///
/// Useful when the ids being purged come from diffing snapshots: the
/// previous snapshot still carries the name and address needed to
/// template artifact paths for agents that are already gone from the
/// current one.
#[derive(Debug)]
pub struct SnapshotDirectory {
    snapshot: RegistrySnapshot,
}

impl SnapshotDirectory {
    /// Creates a directory over the given snapshot.
    pub fn new(snapshot: RegistrySnapshot) -> Self {
        Self { snapshot }
    }
}

impl AgentDirectory for SnapshotDirectory {
    fn resolve_batch(&self, ids: &BTreeSet<AgentId>) -> RegistryResult<Vec<AgentProfile>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.snapshot.find(id).map(AgentProfile::from))
            .collect())
    }
}
