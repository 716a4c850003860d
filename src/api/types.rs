//! Types for the comprehensive vehicle data endpoint.

use serde::{Deserialize, Serialize};

/// Full dataset returned by one call to the comprehensive endpoint.
///
/// Covers registered vehicles, resident accounts, visitor vehicles, and
/// sub-accounts, together with a server-level success flag and message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComprehensiveVehicleData {
    /// Registered resident vehicles.
    pub vehicles: Vec<ResidentVehicle>,
    /// Resident accounts.
    pub residents: Vec<ResidentAccount>,
    /// Visitor vehicles registered by residents.
    #[serde(rename = "visitorVehicles")]
    pub visitor_vehicles: Vec<VisitorVehicle>,
    /// Sub-accounts attached to resident accounts.
    #[serde(rename = "subAccounts")]
    pub sub_accounts: Vec<SubAccount>,
    /// Server-level success flag for the response body.
    pub success: bool,
    /// Optional server-level message.
    pub message: Option<String>,
    /// Server-side timestamp of the last dataset update (epoch millis).
    #[serde(rename = "lastUpdated", default)]
    pub last_updated: i64,
}

/// A registered resident vehicle as shaped by the server.
///
/// Consumed only during transformation into the local registry entity; never
/// persisted directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResidentVehicle {
    pub id: i64,
    #[serde(rename = "plateNumber")]
    pub plate_number: String,
    #[serde(rename = "vehicleType", default)]
    pub vehicle_type: Option<String>,
    #[serde(rename = "ownerName")]
    pub owner_name: String,
    #[serde(rename = "ownerPhone")]
    pub owner_phone: Option<String>,
    /// Building number ("dong").
    pub dong: Option<String>,
    /// Unit number ("ho").
    pub ho: Option<String>,
    #[serde(rename = "registeredDate", default)]
    pub registered_date: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: bool,
}

/// A visitor vehicle as shaped by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitorVehicle {
    pub id: i64,
    #[serde(rename = "plateNumber")]
    pub plate_number: String,
    #[serde(rename = "ownerName")]
    pub owner_name: Option<String>,
    #[serde(rename = "contactNumber")]
    pub contact_number: Option<String>,
    #[serde(rename = "visitDate")]
    pub visit_date: Option<String>,
    /// Sub-account that registered the visit, when known.
    #[serde(rename = "registeredBy")]
    pub registered_by: Option<String>,
    pub dong: Option<String>,
    pub ho: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: bool,
}

/// A resident account. Only counted by the sync engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResidentAccount {
    pub id: i64,
    pub username: String,
    pub phone: Option<String>,
    pub dong: Option<String>,
    pub ho: Option<String>,
    pub user_type: String,
    pub parent_account: Option<String>,
}

/// A sub-account attached to a resident account. Only counted by the sync
/// engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubAccount {
    pub id: i64,
    pub username: String,
    pub user_type: String,
    pub is_manager: bool,
    pub parent_account: String,
    pub dong: Option<String>,
    pub ho: Option<String>,
}

/// Error types for comprehensive dataset fetches
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body carried `success: false`.
    #[error("server rejected request: {0}")]
    Rejected(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// True when the failure indicates the host could not be reached at the
    /// transport level (DNS, TCP, or TLS), as opposed to an HTTP-level reply.
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, ApiError::Http(e) if e.is_connect())
    }

    /// True for HTTP statuses in the 400..=499 range.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if (400..=499).contains(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_server_payload() {
        let body = r#"{
            "vehicles": [{
                "id": 7,
                "plateNumber": "12가3456",
                "vehicleType": "sedan",
                "ownerName": "Kim",
                "ownerPhone": "010-1234-5678",
                "dong": "101",
                "ho": "1203",
                "registeredDate": "2026-01-15",
                "isActive": true
            }],
            "residents": [],
            "visitorVehicles": [{
                "id": 3,
                "plateNumber": "34나5678",
                "ownerName": null,
                "contactNumber": null,
                "visitDate": "2026-02-01",
                "registeredBy": "unit1203-sub",
                "dong": "101",
                "ho": "1203",
                "isActive": true
            }],
            "subAccounts": [],
            "success": true,
            "message": "ok",
            "lastUpdated": 1756252800000
        }"#;

        let data: ComprehensiveVehicleData = serde_json::from_str(body).unwrap();
        assert!(data.success);
        assert_eq!(data.vehicles.len(), 1);
        assert_eq!(data.vehicles[0].plate_number, "12가3456");
        assert_eq!(data.visitor_vehicles.len(), 1);
        assert_eq!(
            data.visitor_vehicles[0].registered_by.as_deref(),
            Some("unit1203-sub")
        );
        assert_eq!(data.last_updated, 1756252800000);
    }

    #[test]
    fn auth_failure_covers_the_4xx_range() {
        let unauthorized = ApiError::Status {
            status: 401,
            message: "token expired".into(),
        };
        let server_error = ApiError::Status {
            status: 503,
            message: "maintenance".into(),
        };
        assert!(unauthorized.is_auth_failure());
        assert!(!server_error.is_auth_failure());
        assert!(!unauthorized.is_connect_failure());
    }
}
