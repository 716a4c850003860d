//! Remote API module for the vehicle management server
//!
//! This module provides the client and types for fetching the comprehensive
//! vehicle dataset from the management server. The server aggregates
//! registered vehicles, resident accounts, visitor vehicles, and sub-accounts
//! into a single authenticated endpoint.

/// HTTP client for the comprehensive dataset endpoint
mod client;
/// Type definitions for server payload shapes
mod types;

pub use client::{ComprehensiveDataApi, HttpDataClient};
pub use types::*;
