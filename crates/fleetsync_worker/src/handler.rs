//! The per-connection worker handler and its command dispatch.

use crate::channel::ConnectionChannel;
use crate::config::WorkerConfig;
use crate::error::WorkerResult;
use crate::integrity::IntegrityLoop;
use crate::receive::{FileReceiver, ReceiveTask};
use crate::report::SyncReporter;
use crate::sync::{SyncJob, SyncRound};
use fleetsync_protocol::{Command, Reply};
use fleetsync_registry::{
    AgentDatabase, AgentDirectory, AgentId, ArtifactLayout, Reconciler, RegistrySource,
};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

/// A forwarded distributed-query event for local consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryEvent {
    /// A response forwarded by the master.
    Response(Vec<u8>),
    /// An error forwarded by the master.
    Error(Vec<u8>),
}

/// The worker side of one master connection.
///
/// Owns the channel and the dispatch over inbound command tokens, and
/// composes the integrity loop, sync rounds, receive tasks, and the
/// registry reconciler. A deployment instantiates one handler per
/// master connection; the handler keeps no persistent state beyond the
/// connection flag and its in-flight tasks.
pub struct WorkerHandler<C, F, D, S>
where
    C: ConnectionChannel + 'static,
    F: FileReceiver,
    D: AgentDirectory,
    S: AgentDatabase,
{
    config: WorkerConfig,
    channel: Arc<C>,
    receiver: Arc<F>,
    reconciler: Arc<Reconciler<D, S>>,
    query_events: mpsc::Sender<QueryEvent>,
    api_queue: mpsc::Sender<Vec<u8>>,
    connected: AtomicBool,
    sync_acknowledged: AtomicBool,
    integrity: Mutex<Option<JoinHandle<WorkerResult<()>>>>,
    receive_tasks: Mutex<Vec<ReceiveTask>>,
}

impl<C, F, D, S> WorkerHandler<C, F, D, S>
where
    C: ConnectionChannel + 'static,
    F: FileReceiver,
    D: AgentDirectory,
    S: AgentDatabase,
{
    /// Creates a handler over its collaborators.
    pub fn new(
        config: WorkerConfig,
        channel: Arc<C>,
        receiver: Arc<F>,
        reconciler: Arc<Reconciler<D, S>>,
        query_events: mpsc::Sender<QueryEvent>,
        api_queue: mpsc::Sender<Vec<u8>>,
    ) -> Self {
        Self {
            config,
            channel,
            receiver,
            reconciler,
            query_events,
            api_queue,
            connected: AtomicBool::new(false),
            sync_acknowledged: AtomicBool::new(false),
            integrity: Mutex::new(None),
            receive_tasks: Mutex::new(Vec::new()),
        }
    }

    /// Returns the worker configuration.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Returns true while the connection is established.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Returns true once the master acknowledged the last sync round.
    pub fn sync_acknowledged(&self) -> bool {
        self.sync_acknowledged.load(Ordering::SeqCst)
    }

    /// Marks the connection established and prepares local state.
    ///
    /// Ensures the staging directory for inbound transfers exists; the
    /// master may start pushing files at any moment after this point.
    pub fn connection_made(&self) -> WorkerResult<()> {
        let staging = ArtifactLayout::new(&self.config.worker_root).staging_dir();
        if !staging.exists() {
            fs::create_dir_all(&staging).map_err(fleetsync_registry::RegistryError::from)?;
        }

        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Marks the connection lost and cancels connection-scoped tasks.
    ///
    /// The integrity loop and pending receive tasks are aborted; an
    /// in-flight sync round is left to finish or fail naturally since
    /// it absorbs its own errors.
    pub fn connection_lost(&self) {
        self.connected.store(false, Ordering::SeqCst);

        if let Some(handle) = self.integrity.lock().take() {
            handle.abort();
        }

        for task in self.receive_tasks.lock().drain(..) {
            task.abort();
        }
    }

    /// Spawns the integrity loop for this connection.
    ///
    /// The loop runs until its first failure; awaiting the returned
    /// result is the connection manager's job, via [`Self::join_integrity`].
    pub fn start_integrity(&self) {
        let loop_ = IntegrityLoop::new(&self.config);
        let channel = Arc::clone(&self.channel);
        let handle = tokio::spawn(async move { loop_.run(channel.as_ref()).await });

        if let Some(previous) = self.integrity.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Awaits the integrity loop's outcome.
    ///
    /// Returns `None` if no loop is running; a cancelled loop reads as
    /// a clean `Ok`.
    pub async fn join_integrity(&self) -> Option<WorkerResult<()>> {
        let handle = self.integrity.lock().take()?;
        Some(handle.await.unwrap_or(Ok(())))
    }

    /// Runs one sync round for `job`, absorbing all failures.
    pub async fn run_sync_round<R: SyncReporter>(&self, job: SyncJob, reporter: &R) {
        self.sync_acknowledged.store(false, Ordering::SeqCst);
        SyncRound::new(job).run(self.channel.as_ref(), reporter).await;
    }

    /// Diffs two registry snapshots and purges the removed agents.
    ///
    /// Invoked whenever a new registry snapshot arrives, locally or
    /// pushed by the master. Passes are serialized; a concurrent caller
    /// queues on the reconciler's internal lock.
    pub fn reconcile_registry(
        &self,
        previous: &RegistrySource,
        current: &RegistrySource,
    ) -> WorkerResult<BTreeSet<AgentId>> {
        Ok(self.reconciler.reconcile(previous, current)?)
    }

    /// Dispatches one inbound frame by command token.
    ///
    /// Classification is synchronous; heavier work is scheduled as
    /// tasks. Every token gets a structured reply, so an unknown
    /// command never tears the connection down.
    pub fn process_request(&self, token: &str, data: &[u8]) -> Reply {
        let Some(command) = Command::parse(token) else {
            return Reply::unknown_command(token);
        };

        match command {
            Command::SyncAck => {
                self.sync_acknowledged.store(true, Ordering::SeqCst);
                Reply::ok_with("Thanks")
            }
            Command::SyncStart => {
                self.start_receive_task();
                Reply::ok()
            }
            Command::SyncEnd => {
                if let Err(error) = self.receiver.finalize(&String::from_utf8_lossy(data)) {
                    warn!(%error, "failed to finalize inbound transfer");
                }
                Reply::ok()
            }
            Command::SyncError => {
                if let Err(error) = self.receiver.on_error(&String::from_utf8_lossy(data)) {
                    warn!(%error, "failed to handle inbound transfer error");
                }
                Reply::ok()
            }
            Command::QueryResponse => {
                let events = self.query_events.clone();
                let payload = data.to_vec();
                tokio::spawn(async move {
                    if events.send(QueryEvent::Response(payload)).await.is_err() {
                        warn!("query consumer is gone, dropping forwarded response");
                    }
                });
                Reply::ok_with("Response forwarded to worker")
            }
            Command::QueryError => {
                if self
                    .query_events
                    .try_send(QueryEvent::Error(data.to_vec()))
                    .is_err()
                {
                    warn!("query consumer is gone or busy, dropping forwarded error");
                }
                Reply::ok_with("DAPI error forwarded to worker")
            }
            Command::QueryRequest => {
                if self.api_queue.try_send(data.to_vec()).is_err() {
                    warn!("api queue is full, dropping query request");
                }
                Reply::ok_with("Added request to API requests queue")
            }
            // Worker-originated commands are not valid inbound.
            Command::RequestPermission | Command::FileSync | Command::IntegrityCheck => {
                Reply::unknown_command(token)
            }
        }
    }

    /// Schedules a receive task for a file push the master announced.
    fn start_receive_task(&self) {
        let task = ReceiveTask::spawn(Arc::clone(&self.receiver));

        let mut tasks = self.receive_tasks.lock();
        tasks.retain(|task| !task.is_finished());
        tasks.push(task);
    }

    /// Number of receive tasks that have not finished yet.
    pub fn pending_receives(&self) -> usize {
        self.receive_tasks
            .lock()
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }
}
