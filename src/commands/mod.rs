//! Command implementations for herald.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the shared preamble that builds a registry from
//! the workspace (built-ins first, then the agents directory).

mod init;
mod list;
mod run;
mod show;
mod validate_cmd;

use crate::cli::Command;
use crate::config::HeraldConfig;
use crate::context::WorkspaceContext;
use crate::error::Result;
use crate::events::{Event, EventAction, append_event};
use crate::manifest::build_manifest_globset;
use crate::registry::{AgentRegistry, LoadReport};
use serde_json::json;

/// Dispatch a command to its implementation.
///
/// This is the main entry point for command execution. Each command
/// is routed to its handler function.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Init => init::cmd_init(),
        Command::Run(args) => run::cmd_run(args),
        Command::List => list::cmd_list(),
        Command::Show(args) => show::cmd_show(args),
        Command::Validate => validate_cmd::cmd_validate(),
    }
}

/// Build the workspace registry: built-ins, then the agents directory.
///
/// Collision warnings accumulated during the build are mirrored into the
/// event log (best-effort) when `log_events` is enabled.
pub(crate) fn build_registry(
    ctx: &WorkspaceContext,
    config: &HeraldConfig,
) -> Result<(AgentRegistry, LoadReport)> {
    let globs = build_manifest_globset(&config.manifest_globs)?;
    let mut registry =
        AgentRegistry::new(config.collision_policy, config.default_timeout_seconds);

    crate::agent::register_builtins(&mut registry)?;
    let report = registry.load_from_directory(&ctx.agents_dir(config), &globs)?;

    if config.log_events {
        for warning in registry.warnings() {
            let event = Event::new(EventAction::Collision)
                .with_agent(&warning.name)
                .with_details(json!({"detail": warning.detail}));
            if let Err(e) = append_event(ctx, &event) {
                eprintln!("Warning: failed to log collision event: {}", e);
            }
        }
    }

    Ok((registry, report))
}
