//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::scan::ScanArgs;
use super::commands::watch::WatchArgs;

#[derive(Parser)]
#[command(name = "policywatch")]
#[command(about = "Policywatch - document compliance monitor", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to policywatch.yaml plus local overrides)
    #[arg(short, long, global = true, env = "POLICYWATCH_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one forced scan and print the violation ledger
    Scan(ScanArgs),

    /// Scan on an interval until interrupted
    Watch(WatchArgs),

    /// List the loaded policies
    Policies,

    /// Run the startup scan and show scan status
    Status,
}
