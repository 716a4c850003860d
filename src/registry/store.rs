//! Local vehicle registry storage.
//!
//! This module defines the `VehicleStore` trait consumed by the sync engine,
//! together with a file-backed implementation used by the application and an
//! in-memory implementation used for embedding and tests.
//!
//! Stores guarantee per-call atomicity only; there is no multi-statement
//! transaction. The sync engine compensates with backup and rollback.

use crate::registry::Vehicle;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info};

/// Error types for registry storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("registry file parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("store error: {0}")]
    Other(String),
}

/// On-device registry of vehicles.
///
/// During a sync operation the store is mutated exclusively by the sync
/// engine; no other writer may run concurrently with a delete-all/insert-all
/// cycle.
#[async_trait]
pub trait VehicleStore: Send + Sync {
    /// Read the full registry.
    async fn get_all(&self) -> Result<Vec<Vehicle>, StoreError>;

    /// Insert a batch of vehicles. Existing entries with the same identifier
    /// are replaced.
    async fn insert_many(&self, vehicles: &[Vehicle]) -> Result<(), StoreError>;

    /// Delete every entry in the registry.
    async fn delete_all(&self) -> Result<(), StoreError>;

    /// Number of entries currently in the registry.
    async fn count(&self) -> Result<usize, StoreError>;

    /// Look up a single entry by exact plate number.
    async fn find_by_plate(&self, plate_number: &str) -> Result<Option<Vehicle>, StoreError>;
}

fn upsert(entries: &mut Vec<Vehicle>, vehicles: &[Vehicle]) {
    for vehicle in vehicles {
        if let Some(existing) = entries
            .iter_mut()
            .find(|entry| entry.vehicle_id == vehicle.vehicle_id)
        {
            *existing = vehicle.clone();
        } else {
            entries.push(vehicle.clone());
        }
    }
}

/// File-based implementation of `VehicleStore`.
///
/// The registry is kept as a single JSON document under the data directory.
/// A missing file reads as an empty registry.
pub struct FileVehicleStore {
    data_dir: PathBuf,
}

impl FileVehicleStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn registry_filename(&self) -> PathBuf {
        self.data_dir.join("vehicles.json")
    }

    async fn read_entries(&self) -> Result<Vec<Vehicle>, StoreError> {
        let filename = self.registry_filename();
        if !filename.exists() {
            return Ok(Vec::new());
        }

        let content = tokio::fs::read_to_string(&filename).await?;
        let entries: Vec<Vehicle> = serde_json::from_str(&content)?;
        Ok(entries)
    }

    async fn write_entries(&self, entries: &[Vehicle]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(self.registry_filename(), content).await?;
        Ok(())
    }
}

#[async_trait]
impl VehicleStore for FileVehicleStore {
    async fn get_all(&self) -> Result<Vec<Vehicle>, StoreError> {
        self.read_entries().await
    }

    async fn insert_many(&self, vehicles: &[Vehicle]) -> Result<(), StoreError> {
        let mut entries = self.read_entries().await?;
        upsert(&mut entries, vehicles);
        self.write_entries(&entries).await?;
        debug!("Inserted {} vehicles into registry file", vehicles.len());
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.write_entries(&[]).await?;
        info!("Cleared vehicle registry file");
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.read_entries().await?.len())
    }

    async fn find_by_plate(&self, plate_number: &str) -> Result<Option<Vehicle>, StoreError> {
        let entries = self.read_entries().await?;
        Ok(entries
            .into_iter()
            .find(|entry| entry.plate_number == plate_number))
    }
}

/// In-memory implementation of `VehicleStore`.
pub struct MemoryVehicleStore {
    entries: Mutex<Vec<Vehicle>>,
}

impl MemoryVehicleStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }
}

impl Default for MemoryVehicleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VehicleStore for MemoryVehicleStore {
    async fn get_all(&self) -> Result<Vec<Vehicle>, StoreError> {
        Ok(self.entries.lock().unwrap().clone())
    }

    async fn insert_many(&self, vehicles: &[Vehicle]) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap();
        upsert(&mut entries, vehicles);
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.entries.lock().unwrap().clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.entries.lock().unwrap().len())
    }

    async fn find_by_plate(&self, plate_number: &str) -> Result<Option<Vehicle>, StoreError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .find(|entry| entry.plate_number == plate_number)
            .cloned())
    }
}
