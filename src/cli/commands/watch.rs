//! Continuous monitoring until Ctrl-C.

use anyhow::{Context, Result};
use clap::Args;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::application::ScanEvent;
use crate::cli::service::build_orchestrator;
use crate::domain::models::Config;

#[derive(Args, Debug, Default)]
pub struct WatchArgs {
    /// Seconds between scans (overrides scan.interval_secs)
    #[arg(short, long)]
    pub interval: Option<u64>,
}

pub async fn execute(args: WatchArgs, config: &Config, json_mode: bool) -> Result<()> {
    let interval_secs = args.interval.unwrap_or(config.scan.interval_secs).max(1);
    let orchestrator = build_orchestrator(config)?;
    let mut events = orchestrator.subscribe();

    if config.scan.scan_on_startup {
        if let Err(err) = orchestrator.initialize().await {
            warn!(error = %err, "Startup scan failed");
        }
    }

    let handle = orchestrator
        .start(Duration::from_secs(interval_secs))
        .context("Scan loop already running")?;

    if !json_mode {
        println!("Watching every {interval_secs}s; press Ctrl-C to stop");
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(ScanEvent::Scanned { summary, detector }) if summary.changed => {
                    if json_mode {
                        println!("{}", serde_json::to_string(&summary)?);
                    } else {
                        println!(
                            "[{}] {} new, {} reopened, {} resolved ({} open, {} detector)",
                            chrono::Utc::now().format("%H:%M:%S"),
                            summary.new,
                            summary.reopened,
                            summary.resolved,
                            summary.open_count,
                            detector.as_str(),
                        );
                    }
                }
                Ok(ScanEvent::Scanned { .. }) => {}
                Ok(ScanEvent::Shutdown) | Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Missed scan events"),
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received");
                orchestrator.shutdown();
            }
        }
    }

    handle.await.context("Scan loop task failed")?;
    Ok(())
}
