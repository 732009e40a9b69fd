//! # FleetSync Registry
//!
//! Agent registry handling for FleetSync workers.
//!
//! This crate provides:
//! - Registry snapshot parsing (`id name address key_hash` lines)
//! - The registry diff engine that decides which agents to purge
//! - Batched agent directory and agent database seams
//! - Artifact path templates for per-agent on-disk state
//! - The best-effort, idempotent deprovisioner
//! - A serialized diff-and-purge reconciler
//!
//! ## Key Invariants
//!
//! - Agent ids are 3-digit zero-padded strings compared by exact equality
//! - An agent unknown in the previous snapshot is never purged
//! - Deprovisioning tolerates already-missing artifacts and never rolls back

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod agent;
mod database;
mod deprovision;
mod diff;
mod directory;
mod error;
mod layout;
mod reconcile;
mod snapshot;

pub use agent::{AgentId, AgentProfile, AgentRecord};
pub use database::{AgentDatabase, MemoryDatabase};
pub use deprovision::Deprovisioner;
pub use diff::removed_agents;
pub use directory::{AgentDirectory, MemoryDirectory, SnapshotDirectory};
pub use error::{RegistryError, RegistryResult};
pub use layout::ArtifactLayout;
pub use reconcile::{Reconciler, RegistrySource};
pub use snapshot::RegistrySnapshot;
