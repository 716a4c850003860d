//! Cooperative cancellation for the sync engine.
//!
//! A sync operation suspends at network calls, backoff delays, and
//! inter-chunk pauses. Cancellation is checked at each of those points: the
//! engine stops with a distinct "cancelled" failure rather than silently
//! going quiet. The engine does not roll back on cancellation; a store left
//! partially written by a cancelled chunked write is the caller's accepted
//! risk window.

use crate::sync::SyncError;
use std::time::Duration;
use tokio::sync::watch;

/// Create a linked cancellation source/token pair.
pub fn cancellation_pair() -> (CancelSource, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelSource { tx }, CancelToken { rx })
}

/// Caller-held handle that requests cancellation.
pub struct CancelSource {
    tx: watch::Sender<bool>,
}

impl CancelSource {
    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        // Receivers observe the value; a dropped source never cancels.
        let _ = self.tx.send(true);
    }
}

/// Token threaded through every suspension point of a sync operation.
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that never cancels, for callers without a cancel control.
    pub fn never() -> Self {
        let (_, token) = cancellation_pair();
        token
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Fail fast if cancellation has been requested.
    pub fn check(&self) -> Result<(), SyncError> {
        if self.is_cancelled() {
            Err(SyncError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Sleep for the given duration, waking early with `SyncError::Cancelled`
    /// if cancellation is requested mid-wait.
    pub async fn pause(&self, duration: Duration) -> Result<(), SyncError> {
        self.check()?;

        let mut rx = self.rx.clone();
        let sleep = tokio::time::sleep(duration);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return Ok(()),
                changed = rx.changed() => {
                    if changed.is_err() {
                        // Source dropped; no cancellation can arrive. Finish
                        // the remaining sleep.
                        sleep.await;
                        return Ok(());
                    }
                    if *rx.borrow() {
                        return Err(SyncError::Cancelled);
                    }
                }
            }
        }
    }
}
