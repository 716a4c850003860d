//! Chunked replacement of the registry contents.
//!
//! Large datasets are applied as consecutive bounded-size inserts rather
//! than one call: the destination is cleared first, then chunks of at most
//! `chunk_size` entities are inserted with incremental progress after each
//! chunk and a short pause between chunks. Insertion within a chunk is
//! all-or-nothing at the store's discretion; the writer does not attempt
//! partial-chunk recovery.

use crate::registry::{Vehicle, VehicleStore};
use crate::sync::cancel::CancelToken;
use crate::sync::progress::ProgressSink;
use crate::sync::types::{SyncConfig, SyncError};
use tracing::info;

pub struct ChunkedWriter {
    config: SyncConfig,
}

impl ChunkedWriter {
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    /// Delete every existing entity from the destination store.
    pub async fn clear(
        &self,
        store: &dyn VehicleStore,
        progress: &dyn ProgressSink,
    ) -> Result<(), SyncError> {
        store.delete_all().await?;
        progress.on_progress(70, "old data cleared");
        Ok(())
    }

    /// Insert the entity set in consecutive chunks of at most `chunk_size`.
    ///
    /// Progress after chunk i of n is `80 + ((i + 1) * 15 / n)`, reaching 95
    /// with the final chunk. The inter-chunk pause is cancellable; a
    /// cancelled write leaves the chunks already applied in place.
    pub async fn insert_chunked(
        &self,
        store: &dyn VehicleStore,
        vehicles: &[Vehicle],
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<(), SyncError> {
        let total = vehicles.len();
        let chunks: Vec<&[Vehicle]> = vehicles.chunks(self.config.chunk_size.max(1)).collect();
        let chunk_count = chunks.len();

        for (index, chunk) in chunks.iter().enumerate() {
            store.insert_many(chunk).await?;

            let written = (index * self.config.chunk_size + chunk.len()).min(total);
            let percent = (80 + (index + 1) * 15 / chunk_count) as u8;
            progress.on_progress(percent, &format!("saving data... ({}/{})", written, total));

            // Throttle between chunks to avoid overwhelming the store.
            if chunk_count > 1 && index + 1 < chunk_count {
                cancel.pause(self.config.chunk_pause).await?;
            }
        }

        info!(
            "Saved {} vehicles to the registry in {} chunks",
            total, chunk_count
        );
        Ok(())
    }
}
