//! Vehicle Data Synchronization Module
//!
//! This module provides all the core logic and services for synchronizing
//! the local vehicle registry with the management server. It is composed of
//! several submodules, each responsible for one aspect of the sync process:
//!
//! - `orchestrator`: The main entry point and coordinator for a sync run. It
//!   wires together all services and walks the sync state machine.
//! - `retry`: Bounded retry with exponential backoff around the dataset
//!   fetch, classifying failures as retryable or terminal.
//! - `backup`: Pre-sync snapshot of the registry and best-effort rollback.
//! - `transform`: Conversion of server records into registry entities, with
//!   per-shape validation.
//! - `writer`: Chunked replacement of the registry contents with throttled,
//!   progress-reporting inserts.
//! - `progress`: The progress sink contract exposed to callers.
//! - `cancel`: Cooperative cancellation threaded through every suspension
//!   point.
//!
//! One sync runs as a single async task; callers must not start a second
//! sync against the same store while one is in flight.

/// Pre-sync backup and rollback
mod backup;
/// Cooperative cancellation primitives
mod cancel;
/// Main coordinator for the sync process
mod orchestrator;
/// Progress reporting contract
mod progress;
/// Bounded retry with exponential backoff
mod retry;
/// Server record to registry entity transformation
mod transform;
/// Shared result, session, config, and error types
mod types;
/// Chunked registry writes
mod writer;

pub use backup::{BackupManager, RegistrySnapshot};
pub use cancel::{CancelSource, CancelToken, cancellation_pair};
pub use orchestrator::SyncOrchestrator;
pub use progress::{LogProgress, NullProgress, ProgressSink};
pub use retry::RetryCoordinator;
pub use transform::{RemoteRecord, transform_payload};
pub use types::{SyncConfig, SyncError, SyncResult, SyncSession};
pub use writer::ChunkedWriter;
