//! Built-in code agents.
//!
//! These are registered in-process before any directory load, so a manifest
//! on disk may override them by name under the configured collision policy.

use crate::error::Result;
use crate::registry::AgentRegistry;
use std::sync::Arc;

/// Register the built-in code agents into a registry.
pub fn register_builtins(registry: &mut AgentRegistry) -> Result<()> {
    registry.register_builtin(
        "echo",
        "Returns the prompt unchanged",
        Arc::new(|prompt, _vars| Ok(prompt.to_string())),
    )?;

    registry.register_builtin(
        "upper",
        "Returns the prompt uppercased",
        Arc::new(|prompt, _vars| Ok(prompt.to_uppercase())),
    )?;

    registry.register_builtin(
        "template-debug",
        "Renders the merged variable mapping a template agent would see",
        Arc::new(|_prompt, vars| {
            let mut keys: Vec<_> = vars.keys().collect();
            keys.sort();
            let listing = keys
                .iter()
                .map(|k| format!("{} = {}", k, vars[k.as_str()]))
                .collect::<Vec<_>>()
                .join("\n");
            Ok(listing)
        }),
    )?;

    Ok(())
}
