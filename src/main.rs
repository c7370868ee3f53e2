//! Policywatch CLI entry point.

use clap::Parser;

use policywatch::cli::commands::{policies, scan, status, watch};
use policywatch::cli::{Cli, Commands, handle_error};
use policywatch::infrastructure::logging::LoggerImpl;
use policywatch::ConfigLoader;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Scan(args) => scan::execute(args, &config, cli.json).await,
        Commands::Watch(args) => watch::execute(args, &config, cli.json).await,
        Commands::Policies => policies::execute(&config, cli.json).await,
        Commands::Status => status::execute(&config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
