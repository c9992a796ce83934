//! Implementation of the `herald list` command.

use crate::context::require_initialized_workspace;
use crate::error::Result;

/// Execute the `herald list` command.
///
/// Lists registered agents (built-ins and manifest-backed) in registration
/// order, plus any skips and collisions observed while building the
/// registry.
pub fn cmd_list() -> Result<()> {
    let (ctx, config) = require_initialized_workspace()?;
    let (registry, report) = super::build_registry(&ctx, &config)?;

    if registry.is_empty() {
        println!("No agents registered.");
        println!();
        println!(
            "Add manifests to '{}' to register agents.",
            ctx.agents_dir(&config).display()
        );
        return Ok(());
    }

    println!("Registered agents ({}):", registry.len());
    println!();

    for name in registry.list() {
        let agent = registry.lookup(name)?;
        let manifest = agent.manifest();

        println!("  {} ({})", name, agent.kind());
        if !manifest.description.is_empty() {
            println!("    Description: {}", manifest.description);
        }
        println!("    Version:     {}", manifest.version);
        if !manifest.required_variables.is_empty() {
            println!("    Requires:    {}", manifest.required_variables.join(", "));
        }
        println!();
    }

    if !report.skipped.is_empty() {
        println!("Skipped {} manifest file(s):", report.skipped.len());
        for warning in &report.skipped {
            println!("  {}", warning);
        }
        println!();
    }

    if !registry.warnings().is_empty() {
        println!("Collisions ({}):", registry.warnings().len());
        for warning in registry.warnings() {
            println!("  {}", warning);
        }
    }

    Ok(())
}
