//! FleetSync CLI
//!
//! Command-line tools for FleetSync worker maintenance.
//!
//! # Commands
//!
//! - `inspect` - Summarize a registry snapshot
//! - `diff` - Show which agents a snapshot change would purge
//! - `purge` - Remove on-disk state for agents gone from the registry

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// FleetSync worker maintenance tools.
#[derive(Parser)]
#[command(name = "fleetsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a registry snapshot
    Inspect {
        /// Path to the registry snapshot file
        registry: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show which agents a snapshot change would purge
    Diff {
        /// Path to the previous registry snapshot
        previous: PathBuf,

        /// Path to the current registry snapshot
        current: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Remove on-disk state for agents gone from the registry
    Purge {
        /// Path to the previous registry snapshot
        previous: PathBuf,

        /// Path to the current registry snapshot
        current: PathBuf,

        /// Worker root directory holding the agent state
        #[arg(short, long)]
        root: PathBuf,

        /// Actually delete; without this flag the command only prints
        /// what it would remove
        #[arg(long)]
        apply: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { registry, format } => {
            commands::inspect::run(&registry, &format)?;
        }
        Commands::Diff {
            previous,
            current,
            format,
        } => {
            commands::diff::run(&previous, &current, &format)?;
        }
        Commands::Purge {
            previous,
            current,
            root,
            apply,
        } => {
            commands::purge::run(&previous, &current, &root, apply)?;
        }
        Commands::Version => {
            println!("FleetSync CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
