//! Diff command implementation.

use fleetsync_registry::{removed_agents, RegistrySnapshot};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Runs the diff command.
pub fn run(previous: &Path, current: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let previous_snapshot = RegistrySnapshot::parse(&fs::read_to_string(previous)?);
    let current_snapshot = RegistrySnapshot::parse(&fs::read_to_string(current)?);

    debug!(
        previous = previous_snapshot.len(),
        current = current_snapshot.len(),
        "snapshots parsed"
    );

    let removed = removed_agents(&previous_snapshot, &current_snapshot);

    match format {
        "json" => {
            let ids: Vec<&str> = removed.iter().map(|id| id.as_str()).collect();
            println!("{}", serde_json::to_string_pretty(&ids)?);
        }
        _ => {
            if removed.is_empty() {
                println!("No agents to purge");
            } else {
                println!("Agents to purge ({}):", removed.len());
                for id in &removed {
                    match previous_snapshot.find(id) {
                        Some(record) => {
                            println!("  {} {} ({})", id, record.name, record.address);
                        }
                        None => println!("  {id}"),
                    }
                }
            }
        }
    }

    Ok(())
}
