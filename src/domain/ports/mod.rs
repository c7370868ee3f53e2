//! Port trait definitions (Hexagonal Architecture)
//!
//! - `SemanticDetector`: external reasoning-based violation finder
//! - `PolicySource`: backing store for policy documents
//! - `DocumentSource`: the monitored document

pub mod semantic_detector;
pub mod sources;

pub use semantic_detector::SemanticDetector;
pub use sources::{DocumentSource, ModificationSignal, PolicySource};
