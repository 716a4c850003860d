//! Local registry entity for a single vehicle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activation status of a registry entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Active,
    Inactive,
}

impl VehicleStatus {
    /// Derive the status from the server's active flag.
    pub fn from_active_flag(is_active: bool) -> Self {
        if is_active {
            VehicleStatus::Active
        } else {
            VehicleStatus::Inactive
        }
    }
}

/// Category of a registry entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VehicleCategory {
    /// Vehicle registered to a resident account.
    Resident,
    /// Visitor vehicle registered for a limited stay.
    Guest,
    /// Vehicle granted standing permission without a resident account.
    Permitted,
}

/// A single vehicle's registration record in the local registry.
///
/// Entries are bulk-replaced wholesale on each successful sync (delete-all
/// then insert-all); the sync engine never patches individual fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vehicle {
    /// Unique identifier, prefixed by origin: `v_<id>` for resident vehicles,
    /// `visitor_<id>` for visitor vehicles.
    pub vehicle_id: String,
    /// License plate number, trimmed and non-empty.
    pub plate_number: String,
    /// Owner name; a placeholder for visitor entries with no recorded owner.
    pub owner_name: String,
    /// Building/unit descriptor derived from the server's dong/ho fields.
    /// May be empty.
    pub unit_label: String,
    pub phone_number: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub status: VehicleStatus,
    pub category: VehicleCategory,
    /// Free-text memo recording sync provenance.
    pub memo: Option<String>,
    pub updated_at: DateTime<Utc>,
}
