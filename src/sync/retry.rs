//! Bounded retry with exponential backoff around the dataset fetch.
//!
//! Failures are classified before retrying: HTTP 4xx means the credentials
//! are bad and more attempts cannot help; a connect-level transport fault
//! means the host is unreachable. Both are terminal. Everything else (5xx,
//! rejected or malformed bodies, timeouts) is retried up to the attempt
//! budget with doubling delays between attempts, never after the last.

use crate::api::{ComprehensiveDataApi, ComprehensiveVehicleData};
use crate::sync::cancel::CancelToken;
use crate::sync::progress::ProgressSink;
use crate::sync::types::{SyncConfig, SyncError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Drives the remote data client until success, a terminal failure, or
/// attempt exhaustion.
pub struct RetryCoordinator {
    client: Arc<dyn ComprehensiveDataApi>,
    config: SyncConfig,
}

impl RetryCoordinator {
    pub fn new(client: Arc<dyn ComprehensiveDataApi>, config: SyncConfig) -> Self {
        Self { client, config }
    }

    /// Fetch the comprehensive dataset, retrying retryable failures.
    ///
    /// Progress is reported before each attempt; cancellation is honored
    /// before each attempt and inside the backoff delay.
    pub async fn fetch_with_retry(
        &self,
        token: &str,
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<ComprehensiveVehicleData, SyncError> {
        let max_attempts = self.config.max_attempts;
        let mut last_error = String::new();

        for attempt in 0..max_attempts {
            cancel.check()?;

            let percent = (20 + attempt * 20).min(95) as u8;
            progress.on_progress(
                percent,
                &format!(
                    "downloading data from server (attempt {}/{})",
                    attempt + 1,
                    max_attempts
                ),
            );
            debug!("Starting fetch attempt {} of {}", attempt + 1, max_attempts);

            match self.client.fetch_comprehensive(token).await {
                Ok(data) => return Ok(data),
                Err(error) => {
                    if error.is_auth_failure() {
                        return Err(SyncError::Authentication(error.to_string()));
                    }
                    if error.is_connect_failure() {
                        return Err(SyncError::Connection(error.to_string()));
                    }
                    warn!("Fetch attempt {} failed: {}", attempt + 1, error);
                    last_error = error.to_string();
                }
            }

            if attempt + 1 < max_attempts {
                let delay = self.config.initial_retry_delay * 2u32.pow(attempt);
                debug!("Waiting {:?} before retry", delay);
                cancel.pause(delay).await?;
            }
        }

        Err(SyncError::RetriesExhausted {
            attempts: max_attempts,
            last_error,
        })
    }
}
