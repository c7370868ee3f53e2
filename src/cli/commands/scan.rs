//! One forced scan.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::application::ScanOutcome;
use crate::cli::output::{CommandOutput, output};
use crate::cli::service::build_orchestrator;
use crate::cli::table::TableFormatter;
use crate::domain::models::{Config, Violation, ViolationFilter};

#[derive(Args, Debug, Default)]
pub struct ScanArgs {
    /// Only show violations from this source
    #[arg(long)]
    pub source: Option<String>,

    /// Only show violations under this policy
    #[arg(long)]
    pub policy: Option<String>,

    /// Hide resolved violations
    #[arg(long)]
    pub open: bool,
}

#[derive(Debug, Serialize)]
pub struct ScanOutput {
    #[serde(flatten)]
    pub outcome: ScanOutcome,
    pub last_scan_error: Option<String>,
    pub violations: Vec<Violation>,
}

impl CommandOutput for ScanOutput {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        match &self.outcome {
            ScanOutcome::Completed { summary, detector } => lines.push(format!(
                "Scan complete ({} detector): {} new, {} reopened, {} resolved; {} open, {} resolved in total",
                detector.as_str(),
                summary.new,
                summary.reopened,
                summary.resolved,
                summary.open_count,
                summary.resolved_count,
            )),
            ScanOutcome::Skipped => lines.push("No changes since the last scan".to_string()),
            ScanOutcome::SourceMissing => lines.push(format!(
                "Scan skipped: {}",
                self.last_scan_error.as_deref().unwrap_or("monitored document is missing")
            )),
        }
        if self.violations.is_empty() {
            lines.push("No violations.".to_string());
        } else {
            lines.push(TableFormatter::new().format_violations(&self.violations));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: ScanArgs, config: &Config, json_mode: bool) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    let outcome = orchestrator.initialize().await?;

    let monitor = orchestrator.monitor();
    let filter = ViolationFilter {
        source_id: args.source,
        policy_id: args.policy,
    };
    let mut violations = monitor.violations(&filter).await;
    if args.open {
        violations.retain(Violation::is_open);
    }

    let result = ScanOutput {
        outcome,
        last_scan_error: monitor.status().await.last_scan_error,
        violations,
    };
    output(&result, json_mode);
    Ok(())
}
