//! # FleetSync Worker
//!
//! Worker-side connection handler and sync state machine for FleetSync.
//!
//! This crate provides:
//! - The `ConnectionChannel` transport seam (request/response + file send)
//! - Negotiated one-shot sync rounds (permission → transfer → report)
//! - The periodic integrity-check loop and its failure contract
//! - Cancellable inbound file-receive tasks
//! - The per-connection `WorkerHandler` and its command dispatch
//!
//! ## Architecture
//!
//! One `WorkerHandler` is instantiated per master connection. Over the
//! same channel it drives two independent periodic activities as
//! separate tasks: the integrity loop, and on-demand sync rounds. Inbound
//! frames are dispatched synchronously by command; the heavier work
//! (file receives, query forwarding) is scheduled as tasks.
//!
//! ## Key Invariants
//!
//! - A sync round absorbs its own failures; the caller retries on the
//!   next scheduled attempt
//! - Integrity heartbeat failures propagate so the connection manager
//!   can tear down and reconnect
//! - Unknown commands get a structured error reply, never a dropped
//!   connection

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod channel;
mod config;
mod error;
mod handler;
mod integrity;
mod receive;
mod report;
mod sync;

pub use channel::{ConnectionChannel, MockChannel};
pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use handler::{QueryEvent, WorkerHandler};
pub use integrity::IntegrityLoop;
pub use receive::{FileReceiver, MockReceiver, ReceiveTask};
pub use report::{RecordingReporter, ReportLevel, SyncReporter, TracingReporter};
pub use sync::{PermissionOutcome, SyncJob, SyncRound};
