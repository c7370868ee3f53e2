//! Command-line interface: argument types, output formatting and commands.

pub mod commands;
pub mod output;
pub mod service;
pub mod table;
pub mod types;

pub use types::{Cli, Commands};

/// Print a command failure and exit with a non-zero status.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({ "error": format!("{err:#}") });
        eprintln!("{body}");
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
