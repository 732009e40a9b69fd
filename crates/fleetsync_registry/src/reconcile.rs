//! Serialized diff-and-purge passes over registry snapshots.

use crate::agent::AgentId;
use crate::database::AgentDatabase;
use crate::deprovision::Deprovisioner;
use crate::diff::removed_agents;
use crate::directory::AgentDirectory;
use crate::error::RegistryResult;
use crate::snapshot::RegistrySnapshot;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::{fs, io};
use tracing::info;

/// Where a registry snapshot comes from.
#[derive(Debug, Clone)]
pub enum RegistrySource {
    /// A snapshot file on disk. A missing file reads as an empty
    /// snapshot, so the first reconciliation on a fresh worker purges
    /// nothing.
    File(PathBuf),
    /// A snapshot held in memory.
    Inline(String),
}

impl RegistrySource {
    /// Loads and parses the snapshot.
    pub fn load(&self) -> io::Result<RegistrySnapshot> {
        match self {
            RegistrySource::File(path) => match fs::read_to_string(path) {
                Ok(contents) => Ok(RegistrySnapshot::parse(&contents)),
                Err(error) if error.kind() == ErrorKind::NotFound => {
                    Ok(RegistrySnapshot::empty())
                }
                Err(error) => Err(error),
            },
            RegistrySource::Inline(contents) => Ok(RegistrySnapshot::parse(contents)),
        }
    }
}

/// Runs diff-and-purge passes, one at a time.
///
/// Passes over a worker's shared filesystem and agent database must not
/// overlap; callers that race simply queue on the internal lock.
pub struct Reconciler<D: AgentDirectory, S: AgentDatabase> {
    deprovisioner: Deprovisioner<D, S>,
    gate: Mutex<()>,
}

impl<D: AgentDirectory, S: AgentDatabase> Reconciler<D, S> {
    /// Creates a reconciler around a deprovisioner.
    pub fn new(deprovisioner: Deprovisioner<D, S>) -> Self {
        Self {
            deprovisioner,
            gate: Mutex::new(()),
        }
    }

    /// Returns the wrapped deprovisioner.
    pub fn deprovisioner(&self) -> &Deprovisioner<D, S> {
        &self.deprovisioner
    }

    /// Diffs `previous` against `current` and purges the removed agents.
    ///
    /// Returns the removal set that was acted on.
    pub fn reconcile(
        &self,
        previous: &RegistrySource,
        current: &RegistrySource,
    ) -> RegistryResult<BTreeSet<AgentId>> {
        let _pass = self.gate.lock();

        let previous_snapshot = previous.load()?;
        let current_snapshot = current.load()?;

        let removed = removed_agents(&previous_snapshot, &current_snapshot);
        if removed.is_empty() {
            return Ok(removed);
        }

        info!(count = removed.len(), "purging agents removed from the registry");
        self.deprovisioner.deprovision(&removed)?;

        Ok(removed)
    }
}
