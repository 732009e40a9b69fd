//! Purge command implementation.

use fleetsync_registry::{
    removed_agents, AgentDirectory, ArtifactLayout, Deprovisioner, MemoryDatabase,
    RegistrySnapshot, SnapshotDirectory,
};
use std::fs;
use std::path::Path;

/// Runs the purge command.
///
/// The previous snapshot supplies the name/address needed to template
/// artifact paths for agents that are already gone from the current
/// one. The global agent database is managed by its own store and is
/// not touched from here.
pub fn run(
    previous: &Path,
    current: &Path,
    root: &Path,
    apply: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let previous_snapshot = RegistrySnapshot::parse(&fs::read_to_string(previous)?);
    let current_snapshot = RegistrySnapshot::parse(&fs::read_to_string(current)?);

    let removed = removed_agents(&previous_snapshot, &current_snapshot);
    if removed.is_empty() {
        println!("No agents to purge");
        return Ok(());
    }

    let layout = ArtifactLayout::new(root);
    let directory = SnapshotDirectory::new(previous_snapshot);

    if !apply {
        println!("Would purge {} agent(s):", removed.len());
        for profile in directory.resolve_batch(&removed)? {
            for path in layout.artifacts_for(&profile) {
                if path.exists() {
                    println!("  {}", path.display());
                }
            }
        }
        println!("Re-run with --apply to delete");
        return Ok(());
    }

    let deprovisioner = Deprovisioner::new(directory, MemoryDatabase::new(), layout);
    let processed = deprovisioner.deprovision(&removed)?;
    println!("Purged {processed} agent(s)");

    Ok(())
}
