//! List loaded policies.

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{CommandOutput, output};
use crate::cli::service::build_orchestrator;
use crate::cli::table::TableFormatter;
use crate::domain::models::{Config, Policy};

#[derive(Debug, Serialize)]
pub struct PoliciesOutput {
    pub policies: Vec<Policy>,
}

impl CommandOutput for PoliciesOutput {
    fn to_human(&self) -> String {
        if self.policies.is_empty() {
            return "No policies loaded.".to_string();
        }
        format!(
            "{}\n{} polic{}",
            TableFormatter::new().format_policies(&self.policies),
            self.policies.len(),
            if self.policies.len() == 1 { "y" } else { "ies" }
        )
    }
}

pub async fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    let monitor = orchestrator.monitor();
    monitor.reload_policies().await?;
    let result = PoliciesOutput {
        policies: monitor.policies().await,
    };
    output(&result, json_mode);
    Ok(())
}
