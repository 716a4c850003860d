//! Local vehicle registry module
//!
//! The registry is the on-device copy of the complex's vehicle data that the
//! plate recognizer reads from. It is populated and wholly replaced by the
//! sync engine.

/// Storage trait and implementations for the registry
mod store;
/// Registry entity types
mod vehicle;

pub use store::{FileVehicleStore, MemoryVehicleStore, StoreError, VehicleStore};
pub use vehicle::{Vehicle, VehicleCategory, VehicleStatus};
