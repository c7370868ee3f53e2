//! Service layer: detection, policy tracking and reconciliation.

pub mod change_tracker;
pub mod detection_pipeline;
pub mod heuristic_detector;
pub mod policy_store;
pub mod reconciler;

pub use change_tracker::{scan_due, ChangeTracker};
pub use detection_pipeline::{DetectionOutcome, DetectionPipeline, DetectorKind};
pub use heuristic_detector::{has_retention_phrase, HeuristicDetector, HeuristicSignals};
pub use policy_store::PolicyStore;
pub use reconciler::{reconcile, ReconcileSummary};
