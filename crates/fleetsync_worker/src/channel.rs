//! Transport seam for a worker connection.

use crate::error::{WorkerError, WorkerResult};
use fleetsync_protocol::Command;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::path::{Path, PathBuf};

/// One logical connection to the master.
///
/// The channel delivers whole messages reliably over an authenticated
/// transport; framing and encryption live below this seam. Both
/// operations are correlated to the same connection and may fail with
/// transport errors.
pub trait ConnectionChannel: Send + Sync {
    /// Sends a request and awaits the correlated response.
    fn send_request(
        &self,
        command: Command,
        payload: &[u8],
    ) -> impl Future<Output = WorkerResult<Vec<u8>>> + Send;

    /// Sends a file's contents over the connection and awaits the ack.
    fn send_file(&self, path: &Path) -> impl Future<Output = WorkerResult<()>> + Send;
}

/// A mock channel with scripted outcomes, for tests.
///
/// Responses are consumed in FIFO order; an exhausted script yields a
/// retryable channel error.
#[derive(Debug, Default)]
pub struct MockChannel {
    responses: Mutex<VecDeque<WorkerResult<Vec<u8>>>>,
    file_outcomes: Mutex<VecDeque<WorkerResult<()>>>,
    requests: Mutex<Vec<(Command, Vec<u8>)>>,
    sent_files: Mutex<Vec<PathBuf>>,
}

impl MockChannel {
    /// Creates a channel with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the outcome of the next request.
    pub fn push_response(&self, outcome: WorkerResult<Vec<u8>>) {
        self.responses.lock().push_back(outcome);
    }

    /// Queues the outcome of the next file send.
    pub fn push_file_outcome(&self, outcome: WorkerResult<()>) {
        self.file_outcomes.lock().push_back(outcome);
    }

    /// Returns every request sent so far.
    pub fn requests(&self) -> Vec<(Command, Vec<u8>)> {
        self.requests.lock().clone()
    }

    /// Returns every file path sent so far.
    pub fn sent_files(&self) -> Vec<PathBuf> {
        self.sent_files.lock().clone()
    }
}

impl ConnectionChannel for MockChannel {
    async fn send_request(&self, command: Command, payload: &[u8]) -> WorkerResult<Vec<u8>> {
        self.requests.lock().push((command, payload.to_vec()));
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(WorkerError::channel_retryable("no scripted response")))
    }

    async fn send_file(&self, path: &Path) -> WorkerResult<()> {
        self.sent_files.lock().push(path.to_path_buf());
        self.file_outcomes
            .lock()
            .pop_front()
            .unwrap_or(Ok(()))
    }
}
