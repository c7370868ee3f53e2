//! Wiring of the monitor from configuration.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::application::{MonitorState, ScanOrchestrator};
use crate::domain::models::Config;
use crate::domain::ports::SemanticDetector;
use crate::infrastructure::anthropic::AnthropicDetector;
use crate::infrastructure::filesystem::{FsDocumentSource, FsPolicySource};
use crate::services::{DetectionPipeline, HeuristicDetector, PolicyStore};

/// Build the orchestrator and its state owner from configuration.
pub fn build_orchestrator(config: &Config) -> Result<Arc<ScanOrchestrator>> {
    let source = config.source.to_source();

    let semantic: Option<Arc<dyn SemanticDetector>> = AnthropicDetector::from_config(config)
        .context("Failed to build semantic detector")?
        .map(|detector| Arc::new(detector) as Arc<dyn SemanticDetector>);
    let model = semantic.as_ref().map(|detector| detector.model().to_string());

    info!(
        source = %source.path,
        policies_dir = %config.policies.dir,
        detector_mode = if model.is_some() { "semantic" } else { "heuristic" },
        model = model.as_deref().unwrap_or("n/a"),
        "Monitor configured"
    );

    let policy_store = PolicyStore::new(Arc::new(FsPolicySource::new(
        &config.policies.dir,
        &config.policies.extension,
    )));
    let document = Arc::new(FsDocumentSource::new(&source.path));
    let pipeline = DetectionPipeline::new(HeuristicDetector::new(source.clone()), semantic);
    let monitor = Arc::new(MonitorState::new(source, policy_store, model));

    Ok(Arc::new(ScanOrchestrator::new(
        monitor,
        document,
        pipeline,
        config.diagnostics.clone(),
    )))
}
