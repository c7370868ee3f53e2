//! Detector dispatch: semantic when configured, heuristic otherwise.
//!
//! `detect` never fails. Semantic detector errors fall back to the heuristic
//! detector and are kept as a diagnostic; a panicking detector yields an empty
//! candidate list so the scan cycle still completes.

use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::heuristic_detector::HeuristicDetector;
use crate::domain::models::{CandidateViolation, Policy, Violation};
use crate::domain::ports::SemanticDetector;

/// Which detector produced a candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    Semantic,
    Heuristic,
    /// Nothing usable came back; the list is empty.
    None,
}

impl DetectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Semantic => "semantic",
            Self::Heuristic => "heuristic",
            Self::None => "none",
        }
    }
}

/// Result of one detection pass.
#[derive(Debug, Clone)]
pub struct DetectionOutcome {
    pub candidates: Vec<CandidateViolation>,
    pub detector: DetectorKind,
    /// Text of a recovered detector failure, if any.
    pub diagnostic: Option<String>,
}

/// Two-tier detection pipeline.
#[derive(Clone)]
pub struct DetectionPipeline {
    heuristic: HeuristicDetector,
    semantic: Option<Arc<dyn SemanticDetector>>,
}

impl DetectionPipeline {
    pub fn new(heuristic: HeuristicDetector, semantic: Option<Arc<dyn SemanticDetector>>) -> Self {
        Self { heuristic, semantic }
    }

    /// Heuristic-only pipeline.
    pub fn heuristic_only(heuristic: HeuristicDetector) -> Self {
        Self::new(heuristic, None)
    }

    /// Model identifier of the semantic detector, if one is configured.
    pub fn model(&self) -> Option<&str> {
        self.semantic.as_deref().map(|detector| detector.model())
    }

    pub async fn detect(
        &self,
        document_text: &str,
        policies: &[Policy],
        existing_open: &[Violation],
    ) -> DetectionOutcome {
        let Some(semantic) = &self.semantic else {
            info!("No semantic detector configured; using heuristic detector");
            return DetectionOutcome {
                candidates: self.heuristic.detect(document_text, policies),
                detector: DetectorKind::Heuristic,
                diagnostic: None,
            };
        };

        let call = semantic.detect(document_text, policies, existing_open);
        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(candidates)) => {
                if candidates.is_empty() {
                    warn!(model = semantic.model(), "Semantic detector returned 0 open violations");
                }
                DetectionOutcome {
                    candidates,
                    detector: DetectorKind::Semantic,
                    diagnostic: None,
                }
            }
            Ok(Err(err)) => {
                error!(
                    error = %err,
                    model = semantic.model(),
                    "Semantic detector failed; falling back to heuristic detector"
                );
                DetectionOutcome {
                    candidates: self.heuristic.detect(document_text, policies),
                    detector: DetectorKind::Heuristic,
                    diagnostic: Some(err.to_string()),
                }
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(
                    panic = %message,
                    model = semantic.model(),
                    "Semantic detector panicked; reporting no violations for this cycle"
                );
                DetectionOutcome {
                    candidates: Vec::new(),
                    detector: DetectorKind::None,
                    diagnostic: Some(format!("detector panicked: {message}")),
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
