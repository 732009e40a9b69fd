//! The global agent database seam.

use crate::agent::AgentId;
use crate::error::RegistryResult;
use parking_lot::RwLock;
use std::collections::BTreeSet;

/// The global agent database shared by all agents on a worker.
///
/// The store behind this trait is external; deprovisioning only needs
/// to delete one row keyed by agent id, and the deletion must tolerate
/// a row that is already gone.
pub trait AgentDatabase: Send + Sync {
    /// Removes the row for `id`. Returns true if a row existed.
    fn remove_agent(&self, id: &AgentId) -> RegistryResult<bool>;
}

/// An in-memory agent database for tests and tools.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    rows: RwLock<BTreeSet<AgentId>>,
}

impl MemoryDatabase {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row for `id`.
    pub fn insert(&self, id: AgentId) {
        self.rows.write().insert(id);
    }

    /// Returns true if a row exists for `id`.
    pub fn contains(&self, id: &AgentId) -> bool {
        self.rows.read().contains(id)
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Returns true if the database has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl AgentDatabase for MemoryDatabase {
    fn remove_agent(&self, id: &AgentId) -> RegistryResult<bool> {
        Ok(self.rows.write().remove(id))
    }
}
