//! Negotiated one-shot sync rounds.

use crate::channel::ConnectionChannel;
use crate::error::WorkerError;
use crate::report::SyncReporter;
use fleetsync_protocol::{Command, FileChecksum, PermissionReply, PermissionRequest, SyncManifest};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One batch of files to synchronize to the master.
///
/// Constructed fresh per synchronization attempt; a job carries no
/// mutable state beyond the single round it executes.
#[derive(Debug, Clone)]
pub struct SyncJob {
    /// The request code for this batch.
    pub command: Command,
    /// Labelled paths of the files to push.
    pub files_to_sync: BTreeMap<String, PathBuf>,
    /// Checksums of the files, sent with the permission request.
    pub checksums: SyncManifest,
}

impl SyncJob {
    /// Creates an empty job for the given command.
    pub fn new(command: Command) -> Self {
        Self {
            command,
            files_to_sync: BTreeMap::new(),
            checksums: SyncManifest::new(),
        }
    }

    /// Adds a labelled file to the batch.
    pub fn with_file(
        mut self,
        label: impl Into<String>,
        path: impl Into<PathBuf>,
        checksum: FileChecksum,
    ) -> Self {
        let label = label.into();
        self.files_to_sync.insert(label.clone(), path.into());
        self.checksums.insert(label, checksum);
        self
    }
}

/// The outcome of a permission negotiation.
///
/// Three-way by design: a transport failure is a different thing from
/// the master saying no, and both are different from a go-ahead.
#[derive(Debug)]
pub enum PermissionOutcome {
    /// The master granted permission.
    Granted,
    /// The master denied permission.
    Denied,
    /// The permission request itself failed.
    Failed(WorkerError),
}

/// One negotiated file-synchronization attempt.
///
/// A round asks the master for permission, transfers on grant, and
/// reports the outcome. Every failure branch is absorbed here: a failed
/// round is an expected, retryable event, and the caller simply runs
/// another round on its next scheduled attempt.
#[derive(Debug)]
pub struct SyncRound {
    job: SyncJob,
}

impl SyncRound {
    /// Creates a round for the given job.
    pub fn new(job: SyncJob) -> Self {
        Self { job }
    }

    /// Returns the job this round executes.
    pub fn job(&self) -> &SyncJob {
        &self.job
    }

    /// Runs the round: ask permission, transfer on grant, report.
    ///
    /// Never returns an error; each terminal branch emits exactly one
    /// log line through `reporter`.
    pub async fn run<C, R>(&self, channel: &C, reporter: &R)
    where
        C: ConnectionChannel,
        R: SyncReporter,
    {
        match self.ask_permission(channel).await {
            PermissionOutcome::Failed(error) => {
                reporter.error(&format!("Error asking for permission: {error}"));
            }
            PermissionOutcome::Denied => {
                reporter.info("Master didnt grant permission to synchronize");
            }
            PermissionOutcome::Granted => self.transfer(channel, reporter).await,
        }
    }

    /// Asks the master for permission to push this job's batch.
    async fn ask_permission<C: ConnectionChannel>(&self, channel: &C) -> PermissionOutcome {
        let request =
            PermissionRequest::new(self.job.command.as_token(), self.job.checksums.clone());
        let payload = match request.encode() {
            Ok(payload) => payload,
            Err(error) => return PermissionOutcome::Failed(error.into()),
        };

        match channel
            .send_request(Command::RequestPermission, &payload)
            .await
        {
            Err(error) => PermissionOutcome::Failed(error),
            Ok(raw) => match PermissionReply::parse(&raw) {
                PermissionReply::Granted => PermissionOutcome::Granted,
                PermissionReply::Denied => PermissionOutcome::Denied,
            },
        }
    }

    /// Sends every file in the job over the channel.
    async fn transfer<C, R>(&self, channel: &C, reporter: &R)
    where
        C: ConnectionChannel,
        R: SyncReporter,
    {
        for path in self.job.files_to_sync.values() {
            if let Err(error) = channel.send_file(path).await {
                reporter.error(&format!("Error sending files information: {error}"));
                return;
            }
        }

        reporter.info("Worker files sent to master");
    }
}
