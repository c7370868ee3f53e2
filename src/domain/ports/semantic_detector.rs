use async_trait::async_trait;

use crate::domain::errors::DetectorError;
use crate::domain::models::{CandidateViolation, Policy, Violation};

/// Port for an external reasoning service that finds violations.
///
/// Implementations receive the currently open violations so they can keep
/// reporting still-valid ones under the same id and leave out resolved ones.
/// A successful empty list is a legitimate answer. Malformed items must be
/// dropped at this boundary, never passed through.
#[async_trait]
pub trait SemanticDetector: Send + Sync {
    /// Model or service identifier, for status reporting.
    fn model(&self) -> &str;

    async fn detect(
        &self,
        document_text: &str,
        policies: &[Policy],
        existing_open: &[Violation],
    ) -> Result<Vec<CandidateViolation>, DetectorError>;
}
