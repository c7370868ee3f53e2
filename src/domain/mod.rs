//! Domain layer for policywatch
//!
//! Core models, error types and the ports infrastructure adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DetectorError, ReloadFailure, ScanError};
