//! Implementation of the `herald show` command.

use crate::agent::{Agent, placeholders};
use crate::cli::ShowArgs;
use crate::context::require_initialized_workspace;
use crate::error::Result;

/// Execute the `herald show` command.
///
/// Prints one agent's manifest details. For template agents, also lists the
/// placeholders the template references.
pub fn cmd_show(args: ShowArgs) -> Result<()> {
    let (ctx, config) = require_initialized_workspace()?;
    let (registry, _report) = super::build_registry(&ctx, &config)?;

    let agent = registry.lookup(&args.agent)?;
    let manifest = agent.manifest();

    println!("{} ({})", manifest.name, agent.kind());
    if !manifest.description.is_empty() {
        println!("  Description: {}", manifest.description);
    }
    println!("  Version:     {}", manifest.version);

    if !manifest.required_variables.is_empty() {
        println!("  Requires:    {}", manifest.required_variables.join(", "));
    }
    if !manifest.defaults.is_empty() {
        println!("  Defaults:");
        for (key, value) in &manifest.defaults {
            println!("    {} = {}", key, value);
        }
    }
    if let Some(timeout) = manifest.timeout_seconds {
        println!("  Timeout:     {}s", timeout);
    }

    match &*agent {
        Agent::Template(t) => {
            let names = placeholders(t.template());
            if names.is_empty() {
                println!("  Placeholders: (none)");
            } else {
                println!("  Placeholders: {}", names.join(", "));
            }
        }
        Agent::Code(_) => {
            if let Some(ref entry_point) = manifest.entry_point {
                println!("  Entry point: {}", entry_point);
            }
        }
    }

    Ok(())
}
