//! Workspace configuration for herald (`herald.yaml`).
//!
//! # File Format
//!
//! ```yaml
//! agents_dir: agents
//! manifest_globs:
//!   - "*.yaml"
//!   - "*.yml"
//! collision_policy: warn
//! default_timeout_seconds: 60
//! log_events: true
//! ```
//!
//! All fields are optional; defaults are applied per field. Unknown fields
//! are preserved for forward compatibility.

use crate::error::{HeraldError, Result};
use crate::registry::CollisionPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Herald workspace configuration, loaded from `herald.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeraldConfig {
    /// Directory of agent manifests, relative to the workspace root.
    pub agents_dir: String,

    /// Filename globs selecting manifest files during discovery.
    pub manifest_globs: Vec<String>,

    /// What to do when two registrations share a name.
    pub collision_policy: CollisionPolicy,

    /// Default execution time bound for code agents, in seconds.
    /// Absent means unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_timeout_seconds: Option<u64>,

    /// Whether to append dispatch events to the NDJSON event log.
    pub log_events: bool,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for HeraldConfig {
    fn default() -> Self {
        Self {
            agents_dir: default_agents_dir(),
            manifest_globs: default_manifest_globs(),
            collision_policy: CollisionPolicy::default(),
            default_timeout_seconds: None,
            log_events: true,
            extra: BTreeMap::new(),
        }
    }
}

fn default_agents_dir() -> String {
    "agents".to_string()
}

fn default_manifest_globs() -> Vec<String> {
    vec!["*.yaml".to_string(), "*.yml".to_string()]
}

impl HeraldConfig {
    /// Load config from a YAML file.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    /// Returns `Err` if the file exists but cannot be parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            HeraldError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::from_yaml(&content)?;
        Ok(Some(config))
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: HeraldConfig = serde_yaml::from_str(yaml)
            .map_err(|e| HeraldError::UserError(format!("failed to parse herald.yaml: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| HeraldError::UserError(format!("failed to serialize config: {}", e)))
    }

    /// Validate config values.
    ///
    /// Rules:
    /// - `agents_dir` must be non-empty
    /// - `manifest_globs` must be non-empty, with non-empty entries
    /// - `default_timeout_seconds`, if set, must be positive
    pub fn validate(&self) -> Result<()> {
        if self.agents_dir.trim().is_empty() {
            return Err(HeraldError::UserError(
                "herald.yaml validation failed: agents_dir must be non-empty".to_string(),
            ));
        }

        if self.manifest_globs.is_empty() {
            return Err(HeraldError::UserError(
                "herald.yaml validation failed: manifest_globs must not be empty".to_string(),
            ));
        }
        for glob in &self.manifest_globs {
            if glob.trim().is_empty() {
                return Err(HeraldError::UserError(
                    "herald.yaml validation failed: manifest_globs entries must be non-empty"
                        .to_string(),
                ));
            }
        }

        if let Some(timeout) = self.default_timeout_seconds
            && timeout == 0
        {
            return Err(HeraldError::UserError(
                "herald.yaml validation failed: default_timeout_seconds must be greater than 0"
                    .to_string(),
            ));
        }

        Ok(())
    }
}
