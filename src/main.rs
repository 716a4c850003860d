use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use vehicle_registry_sync::api::HttpDataClient;
use vehicle_registry_sync::registry::{FileVehicleStore, VehicleStore};
use vehicle_registry_sync::sync::{
    CancelToken, LogProgress, SyncConfig, SyncOrchestrator, SyncSession,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::time())
        .init();

    info!("Starting vehicle registry sync");

    let base_url =
        std::env::var("APTGO_API_URL").unwrap_or_else(|_| "https://aptgo.org".to_string());
    let access_token = match std::env::var("APTGO_ACCESS_TOKEN") {
        Ok(token) => token,
        Err(_) => {
            error!("APTGO_ACCESS_TOKEN is not set");
            return;
        }
    };
    let data_dir = std::env::var("APTGO_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"));

    if let Err(e) = tokio::fs::create_dir_all(&data_dir).await {
        error!("Failed to create data directory {:?}: {}", data_dir, e);
        return;
    }

    let client = match HttpDataClient::new(base_url) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to create API client: {}", e);
            return;
        }
    };
    let store = Arc::new(FileVehicleStore::new(data_dir));

    let orchestrator = SyncOrchestrator::new(client, store.clone(), SyncConfig::default());
    let session = SyncSession::new(access_token);

    let result = orchestrator
        .sync(&session, &LogProgress, &CancelToken::never())
        .await;

    if result.success {
        info!("{}", result.message);
        info!(
            "Dataset counts - vehicles: {}, residents: {}, visitor vehicles: {}, sub-accounts: {}",
            result.vehicle_count,
            result.resident_count,
            result.visitor_vehicle_count,
            result.sub_account_count
        );
        match store.count().await {
            Ok(count) => info!("Local registry now holds {} vehicles", count),
            Err(e) => error!("Failed to read back registry count: {}", e),
        }
    } else {
        error!("Sync failed: {}", result.message);
    }
}
