//! Sync orchestrator and integration point for all sync services.
//!
//! This module defines the `SyncOrchestrator`, which composes the backup
//! manager, retry coordinator, transformer, and chunked writer into one sync
//! operation with rollback-on-failure. The orchestrator walks a small state
//! machine:
//!
//! `Idle → ValidatingPrerequisites → BackingUp → Fetching → Writing →
//! Completed | Failed`, with `RollingBack` entered only when the write phase
//! fails after a successful fetch. Fetch failures never roll back, because
//! nothing destructive has happened yet.
//!
//! All failures are folded into the returned `SyncResult`; the orchestrator
//! never panics and never surfaces raw errors past the result message.

use crate::api::{ComprehensiveDataApi, ComprehensiveVehicleData};
use crate::registry::VehicleStore;
use crate::sync::backup::BackupManager;
use crate::sync::cancel::CancelToken;
use crate::sync::progress::ProgressSink;
use crate::sync::retry::RetryCoordinator;
use crate::sync::transform::transform_payload;
use crate::sync::types::{SyncConfig, SyncError, SyncResult, SyncSession};
use crate::sync::writer::ChunkedWriter;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Phases of one sync operation, in transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncPhase {
    Idle,
    ValidatingPrerequisites,
    BackingUp,
    Fetching,
    Writing,
    RollingBack,
    Completed,
    Failed,
}

impl SyncPhase {
    fn as_str(self) -> &'static str {
        match self {
            SyncPhase::Idle => "idle",
            SyncPhase::ValidatingPrerequisites => "validating-prerequisites",
            SyncPhase::BackingUp => "backing-up",
            SyncPhase::Fetching => "fetching",
            SyncPhase::Writing => "writing",
            SyncPhase::RollingBack => "rolling-back",
            SyncPhase::Completed => "completed",
            SyncPhase::Failed => "failed",
        }
    }
}

/// Top-level coordinator for vehicle data synchronization.
///
/// Callers must serialize sync invocations: at most one in-flight sync per
/// store instance. The store is mutated exclusively by the engine during a
/// sync; a concurrent writer can observe an inconsistent partial state
/// between chunk boundaries.
pub struct SyncOrchestrator {
    store: Arc<dyn VehicleStore>,
    retry: RetryCoordinator,
    writer: ChunkedWriter,
}

impl SyncOrchestrator {
    pub fn new(
        client: Arc<dyn ComprehensiveDataApi>,
        store: Arc<dyn VehicleStore>,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            retry: RetryCoordinator::new(client, config.clone()),
            writer: ChunkedWriter::new(config),
        }
    }

    /// Run one full sync operation.
    ///
    /// Cancellation is honored at every suspension point and yields a
    /// distinct "cancelled" failure. A cancelled chunked write is not rolled
    /// back; the partially-replaced store is the caller's accepted risk.
    pub async fn sync(
        &self,
        session: &SyncSession,
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> SyncResult {
        let mut phase = SyncPhase::Idle;

        self.transition(&mut phase, SyncPhase::ValidatingPrerequisites);
        if session.access_token.trim().is_empty() {
            self.transition(&mut phase, SyncPhase::Failed);
            progress.on_progress(100, "sync failed");
            return SyncResult::failure(SyncError::MissingToken.to_string());
        }

        progress.on_progress(0, "preparing sync...");

        self.transition(&mut phase, SyncPhase::BackingUp);
        // Backup failure is non-fatal; a degraded backup beats aborting.
        let snapshot = BackupManager::backup(self.store.as_ref()).await;
        progress.on_progress(10, "data backup complete");

        self.transition(&mut phase, SyncPhase::Fetching);
        let data = match self
            .retry
            .fetch_with_retry(&session.access_token, progress, cancel)
            .await
        {
            Ok(data) => data,
            Err(err) => {
                // Nothing destructive has happened yet; no rollback.
                self.transition(&mut phase, SyncPhase::Failed);
                progress.on_progress(100, "sync failed");
                return SyncResult::failure(err.to_string());
            }
        };

        self.transition(&mut phase, SyncPhase::Writing);
        match self.write_dataset(&data, progress, cancel).await {
            Ok(persisted) => {
                self.transition(&mut phase, SyncPhase::Completed);
                progress.on_progress(100, "sync complete");

                let message = if persisted == 0 {
                    "vehicle data sync complete: no vehicles are currently registered".to_string()
                } else {
                    format!("vehicle data sync complete: {} vehicles updated", persisted)
                };
                SyncResult {
                    success: true,
                    message,
                    vehicle_count: persisted,
                    resident_count: data.residents.len(),
                    visitor_vehicle_count: data.visitor_vehicles.len(),
                    sub_account_count: data.sub_accounts.len(),
                }
            }
            Err(SyncError::Cancelled) => {
                // Cancellation is the caller's risk window: no rollback,
                // chunks already applied stay in place.
                warn!("Sync cancelled during write phase");
                self.transition(&mut phase, SyncPhase::Failed);
                progress.on_progress(100, "sync cancelled");
                SyncResult::failure(SyncError::Cancelled.to_string())
            }
            Err(err) => {
                error!("Write phase failed, rolling back: {}", err);
                self.transition(&mut phase, SyncPhase::RollingBack);
                // Rollback outcome is logged inside restore, never surfaced.
                BackupManager::restore(self.store.as_ref(), &snapshot).await;
                self.transition(&mut phase, SyncPhase::Failed);
                progress.on_progress(100, "sync failed");
                SyncResult::failure(SyncError::Processing(err.to_string()).to_string())
            }
        }
    }

    /// Clear, transform, and write the fetched dataset. Returns the number
    /// of persisted entities.
    async fn write_dataset(
        &self,
        data: &ComprehensiveVehicleData,
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<usize, SyncError> {
        self.writer.clear(self.store.as_ref(), progress).await?;

        let entities = transform_payload(data, Utc::now());
        progress.on_progress(80, "data transformation complete");

        self.writer
            .insert_chunked(self.store.as_ref(), &entities, progress, cancel)
            .await?;
        Ok(entities.len())
    }

    fn transition(&self, phase: &mut SyncPhase, next: SyncPhase) {
        info!("Sync phase: {} -> {}", phase.as_str(), next.as_str());
        *phase = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, ResidentVehicle, VisitorVehicle};
    use crate::registry::{MemoryVehicleStore, StoreError, Vehicle};
    use crate::sync::cancel::cancellation_pair;
    use crate::sync::progress::NullProgress;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn resident(id: i64, plate: &str, owner: &str) -> ResidentVehicle {
        ResidentVehicle {
            id,
            plate_number: plate.to_string(),
            vehicle_type: None,
            owner_name: owner.to_string(),
            owner_phone: None,
            dong: None,
            ho: None,
            registered_date: None,
            is_active: true,
        }
    }

    fn visitor(id: i64, plate: &str) -> VisitorVehicle {
        VisitorVehicle {
            id,
            plate_number: plate.to_string(),
            owner_name: None,
            contact_number: None,
            visit_date: None,
            registered_by: None,
            dong: None,
            ho: None,
            is_active: true,
        }
    }

    fn payload(
        vehicles: Vec<ResidentVehicle>,
        visitor_vehicles: Vec<VisitorVehicle>,
    ) -> ComprehensiveVehicleData {
        ComprehensiveVehicleData {
            vehicles,
            residents: Vec::new(),
            visitor_vehicles,
            sub_accounts: Vec::new(),
            success: true,
            message: None,
            last_updated: 0,
        }
    }

    struct ScriptedApi {
        outcomes: Mutex<VecDeque<Result<ComprehensiveVehicleData, ApiError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedApi {
        fn new(outcomes: Vec<Result<ComprehensiveVehicleData, ApiError>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ComprehensiveDataApi for ScriptedApi {
        async fn fetch_comprehensive(
            &self,
            _token: &str,
        ) -> Result<ComprehensiveVehicleData, ApiError> {
            *self.calls.lock().unwrap() += 1;
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted API ran out of outcomes")
        }
    }

    /// Store that fails a scripted number of insert calls, then recovers.
    /// Models a write-phase fault that still allows the rollback to land.
    struct FlakyInsertStore {
        inner: MemoryVehicleStore,
        failures_left: Mutex<u32>,
    }

    impl FlakyInsertStore {
        fn new(failures: u32) -> Self {
            Self {
                inner: MemoryVehicleStore::new(),
                failures_left: Mutex::new(failures),
            }
        }
    }

    #[async_trait]
    impl VehicleStore for FlakyInsertStore {
        async fn get_all(&self) -> Result<Vec<Vehicle>, StoreError> {
            self.inner.get_all().await
        }
        async fn insert_many(&self, vehicles: &[Vehicle]) -> Result<(), StoreError> {
            {
                let mut failures = self.failures_left.lock().unwrap();
                if *failures > 0 {
                    *failures -= 1;
                    return Err(StoreError::Other("insert fault".into()));
                }
            }
            self.inner.insert_many(vehicles).await
        }
        async fn delete_all(&self) -> Result<(), StoreError> {
            self.inner.delete_all().await
        }
        async fn count(&self) -> Result<usize, StoreError> {
            self.inner.count().await
        }
        async fn find_by_plate(&self, plate: &str) -> Result<Option<Vehicle>, StoreError> {
            self.inner.find_by_plate(plate).await
        }
    }

    fn orchestrator(
        api: Arc<dyn ComprehensiveDataApi>,
        store: Arc<dyn VehicleStore>,
    ) -> SyncOrchestrator {
        SyncOrchestrator::new(api, store, SyncConfig::default())
    }

    #[tokio::test]
    async fn blank_token_fails_without_a_network_call() {
        let api = ScriptedApi::new(Vec::new());
        let store = Arc::new(MemoryVehicleStore::new());
        let engine = orchestrator(api.clone(), store.clone());
        let (_source, cancel) = cancellation_pair();

        for token in ["", "   ", "\t\n"] {
            let result = engine
                .sync(&SyncSession::new(token), &NullProgress, &cancel)
                .await;
            assert!(!result.success);
        }
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn end_to_end_sync_persists_valid_records() {
        let api = ScriptedApi::new(vec![Ok(payload(
            vec![resident(1, "12가3456", "Kim"), resident(2, "34나5678", "  ")],
            vec![visitor(3, "56다7890")],
        ))]);
        let store = Arc::new(MemoryVehicleStore::new());
        let engine = orchestrator(api.clone(), store.clone());
        let (_source, cancel) = cancellation_pair();

        let result = engine
            .sync(&SyncSession::new("abc"), &NullProgress, &cancel)
            .await;

        assert!(result.success, "{}", result.message);
        // One resident dropped for its blank owner name.
        assert_eq!(result.vehicle_count, 2);
        assert_eq!(result.visitor_vehicle_count, 1);
        assert!(result.message.contains("2 vehicles updated"));

        let mut ids: Vec<String> = store
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.vehicle_id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["v_1".to_string(), "visitor_3".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_dataset_reports_zero_vehicles() {
        let api = ScriptedApi::new(vec![Ok(payload(Vec::new(), Vec::new()))]);
        let store = Arc::new(MemoryVehicleStore::new());
        let engine = orchestrator(api, store.clone());
        let (_source, cancel) = cancellation_pair();

        let result = engine
            .sync(&SyncSession::new("abc"), &NullProgress, &cancel)
            .await;

        assert!(result.success);
        assert_eq!(result.vehicle_count, 0);
        assert!(result.message.contains("no vehicles"));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_sync_with_unchanged_payload_is_idempotent() {
        let data = payload(
            vec![resident(1, "12가3456", "Kim"), resident(2, "34나5678", "Lee")],
            vec![visitor(3, "56다7890")],
        );
        let api = ScriptedApi::new(vec![Ok(data.clone()), Ok(data)]);
        let store = Arc::new(MemoryVehicleStore::new());
        let engine = orchestrator(api, store.clone());
        let (_source, cancel) = cancellation_pair();

        let session = SyncSession::new("abc");
        engine.sync(&session, &NullProgress, &cancel).await;
        let first: Vec<(String, String)> = store
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|v| (v.vehicle_id, v.plate_number))
            .collect();

        engine.sync(&session, &NullProgress, &cancel).await;
        let second: Vec<(String, String)> = store
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|v| (v.vehicle_id, v.plate_number))
            .collect();

        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_failure_leaves_the_registry_untouched() {
        let api = ScriptedApi::new(vec![Err(ApiError::Status {
            status: 401,
            message: "token expired".into(),
        })]);
        let store = Arc::new(MemoryVehicleStore::new());
        let engine = orchestrator(api.clone(), store.clone());
        let (_source, cancel) = cancellation_pair();

        // Seed the registry so an unwanted clear would be visible.
        let seeded = payload(vec![resident(9, "98마7654", "Park")], Vec::new());
        let seed_api = ScriptedApi::new(vec![Ok(seeded)]);
        orchestrator(seed_api, store.clone())
            .sync(&SyncSession::new("abc"), &NullProgress, &cancel)
            .await;
        assert_eq!(store.count().await.unwrap(), 1);

        let result = engine
            .sync(&SyncSession::new("abc"), &NullProgress, &cancel)
            .await;

        assert!(!result.success);
        assert!(result.message.contains("authentication error"));
        assert_eq!(api.calls(), 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn write_failure_rolls_back_to_the_snapshot() {
        let store = Arc::new(FlakyInsertStore::new(0));
        let (_source, cancel) = cancellation_pair();

        // Seed three entities that the rollback must bring back.
        let seed = payload(
            vec![
                resident(1, "11가1111", "Kim"),
                resident(2, "22나2222", "Lee"),
                resident(3, "33다3333", "Park"),
            ],
            Vec::new(),
        );
        orchestrator(ScriptedApi::new(vec![Ok(seed)]), store.clone())
            .sync(&SyncSession::new("abc"), &NullProgress, &cancel)
            .await;
        let before: Vec<String> = store
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.vehicle_id)
            .collect();
        assert_eq!(before.len(), 3);

        // Next sync fetches 50 entities but the first insert faults.
        *store.failures_left.lock().unwrap() = 1;
        let fetched = payload(
            (0..50)
                .map(|i| resident(100 + i, &format!("{}가{:04}", i, i), "Choi"))
                .collect(),
            Vec::new(),
        );
        let result = orchestrator(ScriptedApi::new(vec![Ok(fetched)]), store.clone())
            .sync(&SyncSession::new("abc"), &NullProgress, &cancel)
            .await;

        assert!(!result.success);
        assert!(result.message.contains("data processing error"));

        let after: Vec<String> = store
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.vehicle_id)
            .collect();
        assert_eq!(after, before);
    }

    #[tokio::test(start_paused = true)]
    async fn pre_cancelled_token_fails_with_a_cancelled_reason() {
        let api = ScriptedApi::new(Vec::new());
        let store = Arc::new(MemoryVehicleStore::new());
        let engine = orchestrator(api.clone(), store);
        let (source, cancel) = cancellation_pair();
        source.cancel();

        let result = engine
            .sync(&SyncSession::new("abc"), &NullProgress, &cancel)
            .await;

        assert!(!result.success);
        assert!(result.message.contains("cancelled"));
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn progress_runs_from_zero_to_one_hundred() {
        let api = ScriptedApi::new(vec![Ok(payload(
            vec![resident(1, "12가3456", "Kim")],
            Vec::new(),
        ))]);
        let store = Arc::new(MemoryVehicleStore::new());
        let engine = orchestrator(api, store);
        let (_source, cancel) = cancellation_pair();

        let reported = Mutex::new(Vec::new());
        let sink = |percent: u8, _message: &str| {
            reported.lock().unwrap().push(percent);
        };
        let result = engine.sync(&SyncSession::new("abc"), &sink, &cancel).await;
        assert!(result.success);

        let reported = reported.lock().unwrap();
        assert_eq!(reported.as_slice(), &[0, 10, 20, 70, 80, 95, 100]);
    }
}
