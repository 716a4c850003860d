//!
//! HTTP client for the apartment-complex vehicle management API.
//!
//! This module provides an async client for fetching the comprehensive
//! vehicle dataset in a single authenticated call. The client performs
//! exactly one round trip per call; retry policy lives in the sync engine,
//! not here. All methods are async and designed for use with Tokio.

use super::types::{ApiError, ComprehensiveVehicleData};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Source of the comprehensive vehicle dataset.
///
/// The sync engine talks to the server exclusively through this trait so the
/// retry and orchestration layers can be exercised against scripted fakes.
#[async_trait]
pub trait ComprehensiveDataApi: Send + Sync {
    /// Fetch the full remote dataset with the given access token.
    ///
    /// One network round trip; no retries.
    async fn fetch_comprehensive(
        &self,
        token: &str,
    ) -> Result<ComprehensiveVehicleData, ApiError>;
}

/// Vehicle management API client backed by reqwest.
#[derive(Clone)]
pub struct HttpDataClient {
    /// The underlying HTTP client.
    http_client: Client,
    /// Base URL of the management server, without a trailing slash.
    base_url: String,
}

/// Minimal body shape used to surface server messages on error statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl HttpDataClient {
    /// Create a new API client for the given base URL.
    ///
    /// Transport timeouts are configured here; the retry layer never extends
    /// them.
    pub fn new(base_url: String) -> Result<Self, ApiError> {
        let http_client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ComprehensiveDataApi for HttpDataClient {
    async fn fetch_comprehensive(
        &self,
        token: &str,
    ) -> Result<ComprehensiveVehicleData, ApiError> {
        let url = format!("{}/api/comprehensive/", self.base_url);
        debug!("Fetching comprehensive vehicle data from {}", url);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|parsed| parsed.message)
                .unwrap_or_else(|| {
                    if body.trim().is_empty() {
                        format!("HTTP {}", status.as_u16())
                    } else {
                        body.trim().to_string()
                    }
                });
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let data = response.json::<ComprehensiveVehicleData>().await?;

        if !data.success {
            let message = data
                .message
                .unwrap_or_else(|| "server reported failure".to_string());
            return Err(ApiError::Rejected(message));
        }

        info!(
            "Received dataset - vehicles: {}, residents: {}, visitor vehicles: {}, sub-accounts: {}",
            data.vehicles.len(),
            data.residents.len(),
            data.visitor_vehicles.len(),
            data.sub_accounts.len()
        );

        Ok(data)
    }
}
