//! Startup scan followed by a status report.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::application::ScanStatus;
use crate::cli::output::{CommandOutput, output};
use crate::cli::service::build_orchestrator;
use crate::domain::models::{Config, Source};

#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub sources: Vec<Source>,
    pub policy_count: usize,
    #[serde(flatten)]
    pub status: ScanStatus,
}

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        let s = &self.status;
        let mut lines = vec![
            "Policywatch Status".to_string(),
            "==================".to_string(),
        ];
        for source in &self.sources {
            lines.push(format!("Source:           {} ({})", source.name, source.path));
        }
        lines.push(format!("Policies:         {}", self.policy_count));
        lines.push(format!(
            "Detector:         {}{}",
            s.detector_mode,
            s.model.as_deref().map(|m| format!(" ({m})")).unwrap_or_default()
        ));
        lines.push(format!(
            "Last scan:        {}",
            s.last_scan_at
                .map_or_else(|| "never".to_string(), |at| at.to_rfc3339())
        ));
        lines.push(format!("Open violations:  {}", s.open_count));
        lines.push(format!("Resolved:         {}", s.resolved_count));
        if let Some(err) = &s.last_scan_error {
            lines.push(format!("Last scan error:  {err}"));
        }
        if let Some(diagnostic) = &s.last_detector_diagnostic {
            lines.push(format!("Detector note:    {diagnostic}"));
        }
        lines.join("\n")
    }
}

pub async fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    if let Err(err) = orchestrator.initialize().await {
        debug!(error = %err, "Startup scan failed");
    }

    let monitor = orchestrator.monitor();
    let result = StatusOutput {
        sources: monitor.sources().await,
        policy_count: monitor.policies().await.len(),
        status: monitor.status().await,
    };
    output(&result, json_mode);
    Ok(())
}
