//! Shared types for the vehicle data sync engine.

use crate::api::ApiError;
use crate::registry::StoreError;
use std::time::Duration;

/// Error types for the sync engine
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The access token was blank; checked locally before any network call.
    #[error("prerequisite check failed: access token is blank")]
    MissingToken,

    /// The server refused the credentials (HTTP 4xx). Terminal, never retried.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// The host could not be reached at the transport level. Terminal.
    #[error("network connection error: {0}")]
    Connection(String),

    /// Every attempt in the retry budget failed.
    #[error("sync failed after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    /// Transformation or chunked write failed after a successful fetch.
    #[error("data processing error: {0}")]
    Processing(String),

    /// The operation was cancelled at a suspension point.
    #[error("sync cancelled")]
    Cancelled,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Outcome of one sync operation.
///
/// This is the stable return contract; the raw payload fetched from the
/// server is handed between sync phases as a typed value and never exposed
/// here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub success: bool,
    /// Human-readable outcome description. No raw exception detail.
    pub message: String,
    /// Number of vehicle entities persisted to the registry.
    pub vehicle_count: usize,
    /// Number of resident accounts in the fetched dataset.
    pub resident_count: usize,
    /// Number of visitor vehicle records in the fetched dataset.
    pub visitor_vehicle_count: usize,
    /// Number of sub-accounts in the fetched dataset.
    pub sub_account_count: usize,
}

impl SyncResult {
    /// A failure result with zeroed counts.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            vehicle_count: 0,
            resident_count: 0,
            visitor_vehicle_count: 0,
            sub_account_count: 0,
        }
    }
}

/// Explicit session context for one sync call.
///
/// Passed into the engine rather than read from process-wide state, so the
/// caller decides whose credentials drive the sync.
#[derive(Debug, Clone)]
pub struct SyncSession {
    /// Bearer token for the management server.
    pub access_token: String,
}

impl SyncSession {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }
}

/// Configuration for the sync engine
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Maximum number of fetch attempts.
    pub max_attempts: u32,
    /// Backoff delay before the second attempt; doubles per attempt.
    pub initial_retry_delay: Duration,
    /// Maximum number of entities written per insert call.
    pub chunk_size: usize,
    /// Pause between chunk inserts when more than one chunk exists.
    pub chunk_pause: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_retry_delay: Duration::from_millis(1000),
            chunk_size: 100,
            chunk_pause: Duration::from_millis(50),
        }
    }
}
