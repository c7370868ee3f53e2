//! Policywatch - document compliance monitor
//!
//! Periodically scans a monitored document against a set of compliance
//! policies and keeps a stable, deduplicated ledger of violations over time.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors and port traits
//! - **Service Layer** (`services`): detectors, policy tracking and reconciliation
//! - **Application Layer** (`application`): scan state and the scan orchestrator
//! - **Infrastructure Layer** (`infrastructure`): filesystem sources, the
//!   Anthropic semantic detector, configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use policywatch::{ConfigLoader, cli::service::build_orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let orchestrator = build_orchestrator(&config)?;
//!     orchestrator.initialize().await?;
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{MonitorState, ScanEvent, ScanOrchestrator, ScanOutcome, ScanStatus};
pub use domain::errors::{DetectorError, ReloadFailure, ScanError};
pub use domain::models::{
    CandidateViolation, Config, Policy, Severity, Source, Violation, ViolationDetails,
    ViolationFilter, ViolationStatus,
};
pub use domain::ports::{DocumentSource, ModificationSignal, PolicySource, SemanticDetector};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{DetectionPipeline, HeuristicDetector, PolicyStore, ReconcileSummary, reconcile};
