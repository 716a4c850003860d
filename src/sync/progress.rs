//! Progress reporting for the sync engine.
//!
//! The engine reports `(percent, message)` tuples to a caller-supplied sink
//! at each phase boundary: 0 at start, 10 after backup, 20+ per fetch
//! attempt, 70 once old data is cleared, 80 after transformation, 80–95 per
//! written chunk, and 100 on completion or failure.
//!
//! Sinks are invoked from the engine's background task and are responsible
//! for marshalling to a UI context themselves.

use tracing::info;

/// Receiver for sync progress updates.
pub trait ProgressSink: Send + Sync {
    /// Called with a completion percentage in 0..=100 and a human message.
    fn on_progress(&self, percent: u8, message: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(u8, &str) + Send + Sync,
{
    fn on_progress(&self, percent: u8, message: &str) {
        self(percent, message);
    }
}

/// Sink that reports progress through the tracing subscriber.
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn on_progress(&self, percent: u8, message: &str) {
        info!("Sync progress {}%: {}", percent, message);
    }
}

/// Sink for callers that do not observe progress.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_progress(&self, _percent: u8, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn closures_are_sinks() {
        let seen = Mutex::new(Vec::new());
        let sink = |percent: u8, message: &str| {
            seen.lock().unwrap().push((percent, message.to_string()));
        };
        sink.on_progress(10, "backup complete");
        assert_eq!(seen.lock().unwrap().as_slice(), &[(10, "backup complete".to_string())]);
    }
}
