//! Herald: manifest-driven agent registry and prompt dispatcher.
//!
//! This is the main entry point for the `herald` CLI. It parses arguments,
//! dispatches to the appropriate command handler, and handles errors with
//! proper exit codes.

mod cli;
mod commands;
pub mod agent;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod manifest;
pub mod registry;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse_args();

    match commands::dispatch(cli.command) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            // Return appropriate exit code
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
