//! Pre-sync backup and rollback of the local registry.
//!
//! The sync replaces the registry wholesale, so a snapshot is taken before
//! the destructive write. Both directions are deliberately best-effort: a
//! failed backup yields an empty snapshot and the sync proceeds (a degraded
//! backup beats aborting), and a failed restore is logged, not retried.

use crate::registry::{Vehicle, VehicleStore};
use tracing::{error, info, warn};

/// In-memory copy of the full registry captured before mutation.
///
/// Owned by the orchestrator for the duration of one sync call and discarded
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    vehicles: Vec<Vehicle>,
}

impl RegistrySnapshot {
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

/// Snapshots the registry before a destructive sync and restores it on a
/// write-phase failure.
pub struct BackupManager;

impl BackupManager {
    /// Read the entire current registry into memory.
    ///
    /// A read failure is logged and produces an empty snapshot; it never
    /// propagates.
    pub async fn backup(store: &dyn VehicleStore) -> RegistrySnapshot {
        match store.get_all().await {
            Ok(vehicles) => {
                info!("Created backup of {} vehicles", vehicles.len());
                RegistrySnapshot { vehicles }
            }
            Err(error) => {
                warn!("Failed to create backup, continuing with empty snapshot: {}", error);
                RegistrySnapshot::default()
            }
        }
    }

    /// Replace the registry contents with the snapshot.
    ///
    /// Used only as the rollback path, at most once per sync. Failure is
    /// logged, not retried.
    pub async fn restore(store: &dyn VehicleStore, snapshot: &RegistrySnapshot) {
        info!("Rolling back to previous data ({} vehicles)", snapshot.len());

        let outcome = async {
            store.delete_all().await?;
            store.insert_many(&snapshot.vehicles).await
        }
        .await;

        match outcome {
            Ok(()) => info!("Rollback completed successfully"),
            Err(err) => error!("Rollback failed: {}", err),
        }
    }
}
