//! Cancellable inbound file-receive tasks.

use crate::error::WorkerResult;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::warn;

/// The file-transfer collaborator on the receiving side.
///
/// The collaborator owns write atomicity: cancelling a receive must not
/// leave corrupted output behind, which is why the worker only ever
/// schedules or aborts the receive future and never touches the bytes.
pub trait FileReceiver: Send + Sync + 'static {
    /// Accepts one inbound file stream pushed by the master.
    ///
    /// Resolves when the stream is fully received and committed.
    fn receive(&self) -> impl Future<Output = WorkerResult<()>> + Send;

    /// Finalizes the transfer after the master signals completion.
    fn finalize(&self, detail: &str) -> WorkerResult<()>;

    /// Handles a transfer problem reported by the master.
    fn on_error(&self, detail: &str) -> WorkerResult<()>;
}

/// One scheduled inbound file-receive operation.
///
/// Wraps the collaborator's receive future in a spawned task so the
/// handler can let it run concurrently with outbound traffic and cancel
/// it cleanly on connection teardown.
#[derive(Debug)]
pub struct ReceiveTask {
    handle: JoinHandle<()>,
}

impl ReceiveTask {
    /// Sets up the receive as a scheduled unit of work.
    pub fn spawn<R: FileReceiver>(receiver: Arc<R>) -> Self {
        let handle = tokio::spawn(async move {
            if let Err(error) = receiver.receive().await {
                warn!(%error, "inbound file receive failed");
            }
        });

        Self { handle }
    }

    /// Cancels the receive.
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Returns true once the task has finished or been cancelled.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the task to finish.
    pub async fn join(self) {
        // Cancellation surfaces as a JoinError; both outcomes are final.
        let _ = self.handle.await;
    }
}

/// A scriptable receiver for tests.
#[derive(Debug, Default)]
pub struct MockReceiver {
    release: tokio::sync::Notify,
    completed: std::sync::atomic::AtomicBool,
    finalized: parking_lot::Mutex<Vec<String>>,
    errors: parking_lot::Mutex<Vec<String>>,
}

impl MockReceiver {
    /// Creates a receiver whose `receive` blocks until released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets a pending `receive` complete.
    pub fn release(&self) {
        self.release.notify_one();
    }

    /// Returns true if a `receive` ran to completion.
    pub fn completed(&self) -> bool {
        self.completed.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Returns recorded finalize details.
    pub fn finalized(&self) -> Vec<String> {
        self.finalized.lock().clone()
    }

    /// Returns recorded error details.
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }
}

impl FileReceiver for MockReceiver {
    async fn receive(&self) -> WorkerResult<()> {
        self.release.notified().await;
        self.completed
            .store(true, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }

    fn finalize(&self, detail: &str) -> WorkerResult<()> {
        self.finalized.lock().push(detail.to_string());
        Ok(())
    }

    fn on_error(&self, detail: &str) -> WorkerResult<()> {
        self.errors.lock().push(detail.to_string());
        Ok(())
    }
}
