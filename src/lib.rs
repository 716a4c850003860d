//! Vehicle registry synchronization engine for apartment-complex access
//! control.
//!
//! The engine fetches the comprehensive vehicle dataset from the management
//! server, reconciles it against the on-device registry, and keeps the
//! registry safe under network failure with bounded retry, pre-sync backup,
//! chunked writes, and rollback.

/// Remote API client and payload types
pub mod api;
/// Local vehicle registry
pub mod registry;
/// The synchronization engine
pub mod sync;
