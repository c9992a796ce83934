//! Agent manifest schema for herald.
//!
//! This module defines the manifest file format: one YAML document per
//! agent, discovered from the workspace agents directory.
//!
//! # File Format
//!
//! ```yaml
//! name: greeter
//! description: "Greets whoever is named in the variables"
//! version: "0.1.0"
//! kind: template
//! template: |
//!   Hello, {{name}}!
//! required_variables:
//!   - name
//! defaults:
//!   tone: friendly
//! ```
//!
//! A template-backed manifest carries either an inline `template` or a
//! `template_file` path (relative paths resolve against the manifest's
//! directory). A code-backed manifest (`kind: code`) instead carries an
//! `entry_point` naming a callable bound in-process.
//!
//! Exactly one of the two reference forms must be populated, consistent
//! with `kind`; a manifest violating this is rejected at load time.

mod discovery;

pub use discovery::{DiscoveryWarning, build_manifest_globset, discover_manifests};

use crate::error::{HeraldError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Which execution strategy an agent manifest declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Output produced by variable substitution into static text.
    Template,
    /// Output produced by invoking a bound callable.
    Code,
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentKind::Template => write!(f, "template"),
            AgentKind::Code => write!(f, "code"),
        }
    }
}

/// Declarative description of an agent's identity and execution strategy.
///
/// Manifests are immutable once loaded; the registry replaces agents
/// wholesale on reload rather than mutating them in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentManifest {
    /// Unique agent identifier, used as the registry key.
    pub name: String,

    /// Human-readable description. No behavioral effect.
    #[serde(default)]
    pub description: String,

    /// Semantic version string. Informational only.
    #[serde(default = "default_version")]
    pub version: String,

    /// Execution strategy for this agent.
    pub kind: AgentKind,

    /// Inline template text (kind = template).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Path to a template file, relative to the manifest's directory
    /// (kind = template).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_file: Option<String>,

    /// Name of a bound callable (kind = code).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,

    /// Variable names the template or callable expects. Validated before
    /// render/invoke; a missing one is a dispatch failure, not a silent gap.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_variables: Vec<String>,

    /// Default variable values, merged beneath caller-supplied variables.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, String>,

    /// Execution time bound for code agents, in seconds (overrides the
    /// config default if set). Ignored for template agents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

fn default_version() -> String {
    "0.0.0".to_string()
}

impl AgentManifest {
    /// Load a manifest from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            HeraldError::ManifestParse(format!(
                "failed to read manifest '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content).map_err(|e| match e {
            HeraldError::ManifestParse(msg) => {
                HeraldError::ManifestParse(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parse a manifest from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let manifest: AgentManifest = serde_yaml::from_str(yaml)
            .map_err(|e| HeraldError::ManifestParse(format!("failed to parse manifest: {}", e)))?;

        manifest.validate()?;
        Ok(manifest)
    }

    /// Serialize the manifest to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            HeraldError::UserError(format!("failed to serialize manifest: {}", e))
        })
    }

    /// Validate the manifest invariants.
    ///
    /// Rules:
    /// - `name` must be non-empty
    /// - exactly one of template reference / `entry_point` is populated,
    ///   consistent with `kind`
    /// - `timeout_seconds`, if set, must be positive
    /// - `required_variables` entries must be non-empty
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(HeraldError::ManifestParse(
                "manifest validation failed: name must be non-empty".to_string(),
            ));
        }

        let has_template = self.template.is_some() || self.template_file.is_some();
        let has_entry_point = self.entry_point.as_deref().is_some_and(|e| !e.is_empty());

        match self.kind {
            AgentKind::Template => {
                if !has_template {
                    return Err(HeraldError::ManifestParse(format!(
                        "manifest validation failed: agent '{}' has kind 'template' but neither 'template' nor 'template_file'",
                        self.name
                    )));
                }
                if self.template.is_some() && self.template_file.is_some() {
                    return Err(HeraldError::ManifestParse(format!(
                        "manifest validation failed: agent '{}' has both 'template' and 'template_file'",
                        self.name
                    )));
                }
                if self.entry_point.is_some() {
                    return Err(HeraldError::ManifestParse(format!(
                        "manifest validation failed: agent '{}' has kind 'template' but an 'entry_point'",
                        self.name
                    )));
                }
            }
            AgentKind::Code => {
                if !has_entry_point {
                    return Err(HeraldError::ManifestParse(format!(
                        "manifest validation failed: agent '{}' has kind 'code' but no 'entry_point'",
                        self.name
                    )));
                }
                if has_template {
                    return Err(HeraldError::ManifestParse(format!(
                        "manifest validation failed: agent '{}' has kind 'code' but a template reference",
                        self.name
                    )));
                }
            }
        }

        if let Some(timeout) = self.timeout_seconds
            && timeout == 0
        {
            return Err(HeraldError::ManifestParse(format!(
                "manifest validation failed: agent '{}' has timeout_seconds of 0",
                self.name
            )));
        }

        for var in &self.required_variables {
            if var.trim().is_empty() {
                return Err(HeraldError::ManifestParse(format!(
                    "manifest validation failed: agent '{}' has an empty entry in required_variables",
                    self.name
                )));
            }
        }

        Ok(())
    }

    /// Resolve the template text for a template-backed manifest.
    ///
    /// Inline `template` wins; otherwise `template_file` is read relative
    /// to `base_dir`.
    pub fn resolve_template(&self, base_dir: &Path) -> Result<String> {
        if let Some(ref inline) = self.template {
            return Ok(inline.clone());
        }

        let Some(ref file) = self.template_file else {
            return Err(HeraldError::ManifestParse(format!(
                "agent '{}' has no template reference",
                self.name
            )));
        };

        let path = base_dir.join(file);
        std::fs::read_to_string(&path).map_err(|e| {
            HeraldError::ManifestParse(format!(
                "agent '{}': failed to read template file '{}': {}",
                self.name,
                path.display(),
                e
            ))
        })
    }

    /// Construct a synthesized manifest for an in-process code agent.
    pub fn builtin(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            kind: AgentKind::Code,
            template: None,
            template_file: None,
            entry_point: Some(name.to_string()),
            required_variables: Vec::new(),
            defaults: BTreeMap::new(),
            timeout_seconds: None,
            extra: BTreeMap::new(),
        }
    }
}
