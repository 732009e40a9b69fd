//! Integration tests wiring a worker handler to an in-memory master.

use fleetsync_protocol::{Command, FileChecksum, PermissionRequest, ReplyStatus, GRANTED};
use fleetsync_registry::{
    AgentId, AgentProfile, ArtifactLayout, Deprovisioner, MemoryDatabase, MemoryDirectory,
    Reconciler, RegistrySource,
};
use fleetsync_worker::{
    ConnectionChannel, MockReceiver, QueryEvent, RecordingReporter, ReportLevel, SyncJob,
    WorkerConfig, WorkerError, WorkerHandler, WorkerResult,
};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

/// A channel backed by an in-memory master that records what it
/// receives and answers permission requests per its configuration.
#[derive(Default)]
struct InMemoryMaster {
    permission_requests: Mutex<Vec<PermissionRequest>>,
    received_files: Mutex<Vec<PathBuf>>,
    grant: std::sync::atomic::AtomicBool,
}

impl InMemoryMaster {
    fn new(grant: bool) -> Self {
        Self {
            grant: std::sync::atomic::AtomicBool::new(grant),
            ..Self::default()
        }
    }
}

impl ConnectionChannel for InMemoryMaster {
    async fn send_request(&self, command: Command, payload: &[u8]) -> WorkerResult<Vec<u8>> {
        match command {
            Command::RequestPermission => {
                let request = PermissionRequest::decode(payload)?;
                self.permission_requests.lock().push(request);
                if self.grant.load(std::sync::atomic::Ordering::SeqCst) {
                    Ok(GRANTED.to_vec())
                } else {
                    Ok(b"denied".to_vec())
                }
            }
            Command::IntegrityCheck => Ok(b"synced".to_vec()),
            _ => Err(WorkerError::channel_fatal("unexpected request")),
        }
    }

    async fn send_file(&self, path: &Path) -> WorkerResult<()> {
        self.received_files.lock().push(path.to_path_buf());
        Ok(())
    }
}

struct Cluster {
    handler: WorkerHandler<InMemoryMaster, MockReceiver, MemoryDirectory, MemoryDatabase>,
    master: Arc<InMemoryMaster>,
    query_events: mpsc::Receiver<QueryEvent>,
    layout: ArtifactLayout,
}

fn cluster(root: &Path, grant: bool) -> Cluster {
    let master = Arc::new(InMemoryMaster::new(grant));
    let layout = ArtifactLayout::new(root);

    let directory = MemoryDirectory::new();
    let database = MemoryDatabase::new();
    for (id, name) in [("001", "edge-1"), ("002", "edge-2")] {
        let agent_id = AgentId::parse(id).unwrap();
        directory.insert(AgentProfile::new(agent_id.clone(), name, "any"));
        database.insert(agent_id);
    }

    let reconciler = Arc::new(Reconciler::new(Deprovisioner::new(
        directory,
        database,
        layout.clone(),
    )));

    let (query_tx, query_rx) = mpsc::channel(8);
    let (api_tx, _api_rx) = mpsc::channel(8);

    let config = WorkerConfig::new("worker-1", "master:1516", root);
    let handler = WorkerHandler::new(
        config,
        Arc::clone(&master),
        Arc::new(MockReceiver::new()),
        reconciler,
        query_tx,
        api_tx,
    );

    Cluster {
        handler,
        master,
        query_events: query_rx,
        layout,
    }
}

#[tokio::test]
async fn granted_round_delivers_files_to_the_master() {
    let temp = tempfile::tempdir().unwrap();
    let cluster = cluster(temp.path(), true);
    cluster.handler.connection_made().unwrap();

    let keys = temp.path().join("etc-keys");
    std::fs::write(&keys, "001 edge-1 any ab\n").unwrap();

    let job = SyncJob::new(Command::FileSync).with_file(
        "keys",
        keys.clone(),
        FileChecksum::of_file(&keys).unwrap(),
    );

    let reporter = RecordingReporter::new();
    cluster.handler.run_sync_round(job, &reporter).await;

    assert_eq!(
        reporter.last().unwrap(),
        (ReportLevel::Info, "Worker files sent to master".to_string())
    );
    assert_eq!(cluster.master.received_files.lock().as_slice(), [keys]);

    let requests = cluster.master.permission_requests.lock();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].command, "sync-files");
    assert!(requests[0].checksums.get("keys").is_some());
}

#[tokio::test]
async fn denied_round_sends_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let cluster = cluster(temp.path(), false);
    cluster.handler.connection_made().unwrap();

    let reporter = RecordingReporter::new();
    cluster
        .handler
        .run_sync_round(SyncJob::new(Command::FileSync), &reporter)
        .await;

    assert_eq!(
        reporter.last().unwrap(),
        (
            ReportLevel::Info,
            "Master didnt grant permission to synchronize".to_string()
        )
    );
    assert!(cluster.master.received_files.lock().is_empty());
}

#[tokio::test]
async fn master_ack_completes_the_round_trip() {
    let temp = tempfile::tempdir().unwrap();
    let cluster = cluster(temp.path(), true);
    cluster.handler.connection_made().unwrap();

    let reporter = RecordingReporter::new();
    cluster
        .handler
        .run_sync_round(SyncJob::new(Command::FileSync), &reporter)
        .await;
    assert!(!cluster.handler.sync_acknowledged());

    let reply = cluster.handler.process_request("sync-ack", b"");
    assert_eq!(reply.status, ReplyStatus::Ok);
    assert_eq!(reply.detail, "Thanks");
    assert!(cluster.handler.sync_acknowledged());
}

#[tokio::test]
async fn pushed_registry_snapshot_triggers_a_purge() {
    let temp = tempfile::tempdir().unwrap();
    let cluster = cluster(temp.path(), true);
    cluster.handler.connection_made().unwrap();

    // Seed artifacts for the agent that is about to disappear.
    let profile = AgentProfile::new(AgentId::parse("001").unwrap(), "edge-1", "any");
    let groups = cluster.layout.groups_file(&profile);
    std::fs::create_dir_all(groups.parent().unwrap()).unwrap();
    std::fs::write(&groups, "default").unwrap();

    // Previous snapshot on disk; current snapshot as pushed content.
    let previous_path = temp.path().join("registry.old");
    std::fs::write(&previous_path, "001 edge-1 any ab\n002 edge-2 any cd\n").unwrap();

    let removed = cluster
        .handler
        .reconcile_registry(
            &RegistrySource::File(previous_path),
            &RegistrySource::Inline("002 edge-2 any cd\n".into()),
        )
        .unwrap();

    assert_eq!(removed.len(), 1);
    assert!(removed.contains(&AgentId::parse("001").unwrap()));
    assert!(!groups.exists());

    // Idempotent: a second pass over the same snapshots is a no-op
    // that still reports the pending removal.
    let removed_again = cluster
        .handler
        .reconcile_registry(
            &RegistrySource::Inline("001 edge-1 any ab\n002 edge-2 any cd\n".into()),
            &RegistrySource::Inline("002 edge-2 any cd\n".into()),
        )
        .unwrap();
    assert_eq!(removed_again.len(), 1);
}

#[tokio::test]
async fn inbound_push_runs_concurrently_with_query_forwarding() {
    let temp = tempfile::tempdir().unwrap();
    let mut cluster = cluster(temp.path(), true);
    cluster.handler.connection_made().unwrap();

    let reply = cluster.handler.process_request("sync-start", b"keys");
    assert_eq!(reply.status, ReplyStatus::Ok);
    assert_eq!(cluster.handler.pending_receives(), 1);

    let reply = cluster.handler.process_request("query-response", b"rows");
    assert_eq!(reply.detail, "Response forwarded to worker");
    assert_eq!(
        cluster.query_events.recv().await.unwrap(),
        QueryEvent::Response(b"rows".to_vec())
    );

    cluster.handler.connection_lost();
    assert_eq!(cluster.handler.pending_receives(), 0);
}

#[tokio::test]
async fn heartbeat_survives_while_the_master_answers() {
    let temp = tempfile::tempdir().unwrap();
    let cluster = cluster(temp.path(), true);
    cluster.handler.connection_made().unwrap();

    cluster.handler.start_integrity();

    // The master answers every integrity check, so the loop is still
    // alive when the connection goes away and gets cancelled cleanly.
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    cluster.handler.connection_lost();
    assert!(cluster.handler.join_integrity().await.is_none());
}
