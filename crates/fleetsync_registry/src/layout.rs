//! Artifact path templates for per-agent on-disk state.
//!
//! A worker keeps per-agent state in a fixed layout under its root
//! directory:
//!
//! ```text
//! <root>/
//! ├─ queue/
//! │  ├─ agent-info/{name}-{address}
//! │  ├─ rootcheck/({name}) {address}->rootcheck
//! │  ├─ diff/{name}/            # directory, removed recursively
//! │  ├─ agent-groups/{id}
//! │  ├─ rids/{id}
//! │  └─ cluster/                # staging area for inbound transfers
//! └─ var/db/agents/{name}-{id}.db
//! ```

use crate::agent::AgentProfile;
use std::path::{Path, PathBuf};

/// Directory for per-agent info files.
const AGENT_INFO_DIR: &str = "queue/agent-info";
/// Directory for per-agent rootcheck markers.
const ROOTCHECK_DIR: &str = "queue/rootcheck";
/// Directory holding one diff directory per agent.
const DIFF_DIR: &str = "queue/diff";
/// Directory for per-agent group assignments.
const GROUPS_DIR: &str = "queue/agent-groups";
/// Directory for per-agent rids counters.
const RIDS_DIR: &str = "queue/rids";
/// Directory for per-agent local databases.
const AGENT_DB_DIR: &str = "var/db/agents";
/// Staging directory for files pushed by the master.
const STAGING_DIR: &str = "queue/cluster";

/// Templates the on-disk artifact paths for agents under a worker root.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    root: PathBuf,
}

impl ArtifactLayout {
    /// Creates a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the worker root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Per-agent info file.
    pub fn agent_info_file(&self, profile: &AgentProfile) -> PathBuf {
        self.root
            .join(AGENT_INFO_DIR)
            .join(format!("{}-{}", profile.name, profile.address))
    }

    /// Per-agent rootcheck marker file.
    pub fn rootcheck_file(&self, profile: &AgentProfile) -> PathBuf {
        self.root
            .join(ROOTCHECK_DIR)
            .join(format!("({}) {}->rootcheck", profile.name, profile.address))
    }

    /// Per-agent diff directory, removed recursively on deprovision.
    pub fn diff_dir(&self, profile: &AgentProfile) -> PathBuf {
        self.root.join(DIFF_DIR).join(&profile.name)
    }

    /// Per-agent groups file.
    pub fn groups_file(&self, profile: &AgentProfile) -> PathBuf {
        self.root.join(GROUPS_DIR).join(profile.id.as_str())
    }

    /// Per-agent rids file.
    pub fn rids_file(&self, profile: &AgentProfile) -> PathBuf {
        self.root.join(RIDS_DIR).join(profile.id.as_str())
    }

    /// Per-agent local database file.
    pub fn agent_db_file(&self, profile: &AgentProfile) -> PathBuf {
        self.root
            .join(AGENT_DB_DIR)
            .join(format!("{}-{}.db", profile.name, profile.id))
    }

    /// Staging directory for inbound file transfers.
    pub fn staging_dir(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }

    /// Every artifact path deprovisioning must delete for `profile`,
    /// in deletion order. The diff directory is among them and is the
    /// only entry expected to be a directory.
    pub fn artifacts_for(&self, profile: &AgentProfile) -> Vec<PathBuf> {
        vec![
            self.agent_info_file(profile),
            self.rootcheck_file(profile),
            self.diff_dir(profile),
            self.groups_file(profile),
            self.rids_file(profile),
            self.agent_db_file(profile),
        ]
    }
}
