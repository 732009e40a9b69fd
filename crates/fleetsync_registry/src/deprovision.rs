//! Best-effort removal of all local state for a set of agents.

use crate::agent::{AgentId, AgentProfile};
use crate::database::AgentDatabase;
use crate::directory::AgentDirectory;
use crate::error::RegistryResult;
use crate::layout::ArtifactLayout;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::Path;
use std::{fs, io};
use tracing::{debug, warn};

/// Removes on-disk and database state for deprovisioned agents.
///
/// Deprovisioning is a sequence of independent, individually-idempotent
/// deletions rather than a transaction. An artifact that is already
/// gone counts as success (the registry diff may race with manual
/// cleanup or a prior partial run); any other failure is logged and the
/// pass moves on to the next artifact and agent. Partial completion
/// self-heals on the next snapshot comparison that still finds the id
/// pending.
pub struct Deprovisioner<D: AgentDirectory, S: AgentDatabase> {
    directory: D,
    database: S,
    layout: ArtifactLayout,
}

impl<D: AgentDirectory, S: AgentDatabase> Deprovisioner<D, S> {
    /// Creates a deprovisioner over the given collaborators.
    pub fn new(directory: D, database: S, layout: ArtifactLayout) -> Self {
        Self {
            directory,
            database,
            layout,
        }
    }

    /// Returns the artifact layout in use.
    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Returns the agent database collaborator.
    pub fn database(&self) -> &S {
        &self.database
    }

    /// Removes all local state for every id in `ids`.
    ///
    /// Ids are resolved to profiles in a single batched directory call.
    /// Returns the number of agents whose artifacts were processed.
    ///
    /// # Errors
    ///
    /// Only the batched directory lookup can fail the whole pass; every
    /// deletion failure past that point is logged and absorbed.
    pub fn deprovision(&self, ids: &BTreeSet<AgentId>) -> RegistryResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let profiles = self.directory.resolve_batch(ids)?;

        let resolved: BTreeSet<&AgentId> = profiles.iter().map(|p| &p.id).collect();
        for id in ids {
            if !resolved.contains(id) {
                debug!(agent = %id, "agent not in directory, skipping deprovision");
            }
        }

        let mut processed = 0;
        for profile in &profiles {
            self.remove_agent_state(profile);
            processed += 1;
        }

        Ok(processed)
    }

    /// Removes every artifact and the database row for one agent.
    fn remove_agent_state(&self, profile: &AgentProfile) {
        for path in self.layout.artifacts_for(profile) {
            match remove_path(&path) {
                Ok(true) => debug!(agent = %profile.id, path = %path.display(), "removed artifact"),
                Ok(false) => {}
                Err(error) => warn!(
                    agent = %profile.id,
                    path = %path.display(),
                    %error,
                    "failed to remove artifact"
                ),
            }
        }

        match self.database.remove_agent(&profile.id) {
            Ok(true) => debug!(agent = %profile.id, "removed agent database row"),
            Ok(false) => {}
            Err(error) => warn!(agent = %profile.id, %error, "failed to remove agent database row"),
        }
    }
}

/// Removes a path, choosing recursive removal for directories.
///
/// Returns `Ok(false)` when the path was already absent.
fn remove_path(path: &Path) -> io::Result<bool> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
        Err(error) => Err(error),
    }
}
