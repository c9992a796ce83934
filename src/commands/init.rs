//! Implementation of the `herald init` command.
//!
//! Scaffolds a workspace in the current directory: `herald.yaml`, the
//! agents directory with a sample manifest, and the state directory.

use crate::config::HeraldConfig;
use crate::context::{CONFIG_FILE, WorkspaceContext};
use crate::error::{HeraldError, Result};
use crate::events::{Event, EventAction, append_event};
use serde_json::json;
use std::env;
use std::path::Path;

/// Sample manifest written into the new agents directory.
const SAMPLE_MANIFEST: &str = r#"name: greeter
description: "Sample template agent"
version: "0.1.0"
kind: template
template: |
  Hello, {{name}}!

  {{prompt}}
required_variables:
  - name
"#;

/// Execute the `herald init` command.
pub fn cmd_init() -> Result<()> {
    let cwd = env::current_dir().map_err(|e| {
        HeraldError::UserError(format!("failed to get current working directory: {}", e))
    })?;

    init_at(&cwd)
}

/// Scaffold a workspace at a specific directory.
pub(crate) fn init_at(root: &Path) -> Result<()> {
    let config_path = root.join(CONFIG_FILE);
    if config_path.exists() {
        return Err(HeraldError::UserError(format!(
            "workspace already initialized: '{}' exists",
            config_path.display()
        )));
    }

    let config = HeraldConfig::default();
    std::fs::write(&config_path, config.to_yaml()?).map_err(|e| {
        HeraldError::UserError(format!(
            "failed to write '{}': {}",
            config_path.display(),
            e
        ))
    })?;

    let agents_dir = root.join(&config.agents_dir);
    std::fs::create_dir_all(&agents_dir).map_err(|e| {
        HeraldError::UserError(format!(
            "failed to create agents directory '{}': {}",
            agents_dir.display(),
            e
        ))
    })?;

    let sample_path = agents_dir.join("greeter.yaml");
    if !sample_path.exists() {
        std::fs::write(&sample_path, SAMPLE_MANIFEST).map_err(|e| {
            HeraldError::UserError(format!(
                "failed to write sample manifest '{}': {}",
                sample_path.display(),
                e
            ))
        })?;
    }

    let ctx = WorkspaceContext::resolve_from(root)?;
    std::fs::create_dir_all(ctx.state_dir()).map_err(|e| {
        HeraldError::UserError(format!(
            "failed to create state directory '{}': {}",
            ctx.state_dir().display(),
            e
        ))
    })?;

    let event = Event::new(EventAction::Init)
        .with_details(json!({"agents_dir": config.agents_dir}));
    if let Err(e) = append_event(&ctx, &event) {
        eprintln!("Warning: failed to log init event: {}", e);
    }

    println!("Initialized herald workspace in {}", root.display());
    println!();
    println!("  Config:  {}", config_path.display());
    println!("  Agents:  {}", agents_dir.display());
    println!();
    println!("Try: herald run greeter --var name=Ada");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_scaffolds_workspace() {
        let temp = TempDir::new().unwrap();

        init_at(temp.path()).unwrap();

        assert!(temp.path().join("herald.yaml").is_file());
        assert!(temp.path().join("agents/greeter.yaml").is_file());
        assert!(temp.path().join(".herald").is_dir());

        // The scaffolded config parses and validates.
        let config = HeraldConfig::load(temp.path().join("herald.yaml"))
            .unwrap()
            .unwrap();
        assert_eq!(config.agents_dir, "agents");

        // The sample manifest parses and validates.
        let manifest =
            crate::manifest::AgentManifest::load(temp.path().join("agents/greeter.yaml")).unwrap();
        assert_eq!(manifest.name, "greeter");
        assert_eq!(manifest.required_variables, vec!["name"]);
    }

    #[test]
    fn test_init_twice_fails() {
        let temp = TempDir::new().unwrap();

        init_at(temp.path()).unwrap();
        let result = init_at(temp.path());

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("already initialized")
        );
    }

    #[test]
    fn test_init_logs_event() {
        let temp = TempDir::new().unwrap();

        init_at(temp.path()).unwrap();

        let events = std::fs::read_to_string(temp.path().join(".herald/events.ndjson")).unwrap();
        assert!(events.contains("\"action\":\"init\""));
    }
}
