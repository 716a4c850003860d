//! Transformation of server records into registry entities.
//!
//! The fetched payload hands the transformer two known record shapes:
//! resident vehicles and visitor vehicles. Each shape has its own validator;
//! records that fail validation are dropped without failing the sync. The
//! result is the ordered entity set to persist, residents first, stable in
//! the server's order. No deduplication is performed across categories: the
//! identifier prefix keeps a resident and a visitor entry distinct even when
//! they share a plate number.

use crate::api::{ComprehensiveVehicleData, ResidentVehicle, VisitorVehicle};
use crate::registry::{Vehicle, VehicleCategory, VehicleStatus};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Owner placeholder for visitor entries with no recorded owner name.
const VISITOR_OWNER_PLACEHOLDER: &str = "visitor";
/// Registering-party placeholder when the server omits it.
const UNKNOWN_REGISTRAR: &str = "unknown";

/// One remote record in the transformation-phase handoff.
///
/// Tagged so the transformer is exhaustive over the known shapes; a new
/// server record shape becomes a compile-time-visible change here.
#[derive(Debug, Clone)]
pub enum RemoteRecord {
    Resident(ResidentVehicle),
    Visitor(VisitorVehicle),
}

impl RemoteRecord {
    /// Whether the record carries enough data to become a registry entry.
    pub fn is_valid(&self) -> bool {
        match self {
            RemoteRecord::Resident(record) => validate_resident(record),
            RemoteRecord::Visitor(record) => validate_visitor(record),
        }
    }
}

/// A resident vehicle is valid only with a non-blank plate and owner name.
fn validate_resident(record: &ResidentVehicle) -> bool {
    !record.plate_number.trim().is_empty() && !record.owner_name.trim().is_empty()
}

/// A visitor vehicle is valid with a non-blank plate.
fn validate_visitor(record: &VisitorVehicle) -> bool {
    !record.plate_number.trim().is_empty()
}

fn unit_label(dong: Option<&str>, ho: Option<&str>, visiting: bool) -> String {
    let dong = dong.unwrap_or("").trim();
    let ho = ho.unwrap_or("").trim();
    if dong.is_empty() && ho.is_empty() {
        return String::new();
    }
    let label = format!("{}동 {}호", dong, ho);
    if visiting {
        format!("{} 방문", label.trim())
    } else {
        label.trim().to_string()
    }
}

fn resident_entity(record: &ResidentVehicle, synced_at: DateTime<Utc>) -> Vehicle {
    Vehicle {
        vehicle_id: format!("v_{}", record.id),
        plate_number: record.plate_number.trim().to_string(),
        owner_name: record.owner_name.trim().to_string(),
        unit_label: unit_label(record.dong.as_deref(), record.ho.as_deref(), false),
        phone_number: record.owner_phone.as_deref().map(|phone| phone.trim().to_string()),
        registered_at: synced_at,
        status: VehicleStatus::from_active_flag(record.is_active),
        category: VehicleCategory::Resident,
        memo: Some(format!("server sync - {}", synced_at.to_rfc3339())),
        updated_at: synced_at,
    }
}

fn visitor_entity(record: &VisitorVehicle, synced_at: DateTime<Utc>) -> Vehicle {
    let owner_name = record
        .owner_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(VISITOR_OWNER_PLACEHOLDER)
        .to_string();
    let registrar = record
        .registered_by
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_REGISTRAR);

    Vehicle {
        vehicle_id: format!("visitor_{}", record.id),
        plate_number: record.plate_number.trim().to_string(),
        owner_name,
        unit_label: unit_label(record.dong.as_deref(), record.ho.as_deref(), true),
        phone_number: record
            .contact_number
            .as_deref()
            .map(|phone| phone.trim().to_string()),
        registered_at: synced_at,
        status: VehicleStatus::from_active_flag(record.is_active),
        category: VehicleCategory::Guest,
        memo: Some(format!("visitor vehicle - registered by: {}", registrar)),
        updated_at: synced_at,
    }
}

/// Produce the ordered entity set to persist from a fetched payload.
///
/// Resident-derived entities precede visitor-derived entities; within each
/// category the server's order is preserved. Invalid records are dropped.
pub fn transform_payload(data: &ComprehensiveVehicleData, synced_at: DateTime<Utc>) -> Vec<Vehicle> {
    let records = data
        .vehicles
        .iter()
        .cloned()
        .map(RemoteRecord::Resident)
        .chain(data.visitor_vehicles.iter().cloned().map(RemoteRecord::Visitor));

    let mut entities = Vec::new();
    let mut dropped = 0usize;

    for record in records {
        if !record.is_valid() {
            debug!("Dropping invalid remote record: {:?}", record);
            dropped += 1;
            continue;
        }
        let entity = match &record {
            RemoteRecord::Resident(resident) => resident_entity(resident, synced_at),
            RemoteRecord::Visitor(visitor) => visitor_entity(visitor, synced_at),
        };
        entities.push(entity);
    }

    if dropped > 0 {
        info!("Dropped {} invalid records during transformation", dropped);
    }

    entities
}
