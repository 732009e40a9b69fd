//! Inspect command implementation.

use fleetsync_protocol::FileChecksum;
use fleetsync_registry::RegistrySnapshot;
use std::fs;
use std::path::Path;

/// Runs the inspect command.
pub fn run(registry: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(registry)?;
    let snapshot = RegistrySnapshot::parse(&contents);

    // The checksum a sync manifest would carry for this file.
    let checksum = FileChecksum::of_file(registry)?;

    let enabled = snapshot.records().iter().filter(|r| r.enabled).count();
    let disabled = snapshot.len() - enabled;

    match format {
        "json" => {
            let summary = serde_json::json!({
                "agents": snapshot.len(),
                "enabled": enabled,
                "disabled": disabled,
                "checksum": checksum.as_str(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        _ => {
            println!("Registry: {}", registry.display());
            println!("  Checksum: {checksum}");
            println!("  Agents:   {}", snapshot.len());
            println!("  Enabled:  {enabled}");
            println!("  Disabled: {disabled}");

            for record in snapshot.records() {
                let state = if record.enabled { "enabled" } else { "disabled" };
                println!(
                    "  {} {} ({}) [{state}]",
                    record.id, record.name, record.address
                );
            }
        }
    }

    Ok(())
}
