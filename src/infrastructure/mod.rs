//! Infrastructure layer module
//!
//! Adapters that satisfy the domain ports, plus ambient concerns:
//! - Filesystem document and policy sources
//! - Anthropic Messages API semantic detector
//! - Configuration management
//! - Logging infrastructure

pub mod anthropic;
pub mod config;
pub mod filesystem;
pub mod logging;
