//! Workspace context resolution for herald.
//!
//! This module provides the "environment resolution" layer that finds the
//! workspace root from any working directory. The root is the nearest
//! ancestor directory containing `herald.yaml`; `HERALD_ROOT` overrides the
//! search entirely.
//!
//! All herald commands that need workspace state go through this module, so
//! operations target the same config, agents directory, and event log
//! regardless of where the command is invoked from.

use crate::config::HeraldConfig;
use crate::error::{HeraldError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Config file name marking a workspace root.
pub const CONFIG_FILE: &str = "herald.yaml";

/// State directory name within the workspace root.
pub const STATE_DIR: &str = ".herald";

/// Environment variable overriding workspace root resolution.
pub const ROOT_ENV_VAR: &str = "HERALD_ROOT";

/// Resolved paths for a herald workspace.
///
/// All paths are absolute.
#[derive(Debug, Clone)]
pub struct WorkspaceContext {
    /// Workspace root (the directory containing `herald.yaml`).
    pub root: PathBuf,
}

impl WorkspaceContext {
    /// Resolve the workspace context from the current working directory.
    ///
    /// Honors `HERALD_ROOT` if set; otherwise walks up from the current
    /// directory to the nearest `herald.yaml`.
    pub fn resolve() -> Result<Self> {
        if let Ok(root) = env::var(ROOT_ENV_VAR) {
            return Self::resolve_at(Path::new(&root));
        }

        let cwd = env::current_dir().map_err(|e| {
            HeraldError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        Self::resolve_from(&cwd)
    }

    /// Resolve by walking up from a specific directory.
    pub fn resolve_from<P: AsRef<Path>>(cwd: P) -> Result<Self> {
        let mut dir = cwd.as_ref();

        loop {
            if dir.join(CONFIG_FILE).is_file() {
                return Ok(Self {
                    root: dir.to_path_buf(),
                });
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => {
                    return Err(HeraldError::UserError(format!(
                        "no herald workspace found: '{}' not present in '{}' or any parent.\n\
                         Fix: run `herald init` in the directory that should hold your agents.",
                        CONFIG_FILE,
                        cwd.as_ref().display()
                    )));
                }
            }
        }
    }

    /// Resolve a specific directory as the root, requiring its config file.
    fn resolve_at(root: &Path) -> Result<Self> {
        if !root.join(CONFIG_FILE).is_file() {
            return Err(HeraldError::UserError(format!(
                "{} points at '{}', but it contains no '{}'",
                ROOT_ENV_VAR,
                root.display(),
                CONFIG_FILE
            )));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Path to the workspace config file.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Path to the agents directory, per config.
    pub fn agents_dir(&self, config: &HeraldConfig) -> PathBuf {
        self.root.join(&config.agents_dir)
    }

    /// Path to the state directory.
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    /// Path to the append-only event log.
    pub fn events_path(&self) -> PathBuf {
        self.state_dir().join("events.ndjson")
    }
}

/// Resolve the workspace, loading its config.
///
/// This is the common preamble for commands that need an initialized
/// workspace: resolve the root, then load and validate `herald.yaml`.
pub fn require_initialized_workspace() -> Result<(WorkspaceContext, HeraldConfig)> {
    let ctx = WorkspaceContext::resolve()?;
    let config = HeraldConfig::load(ctx.config_path())?.ok_or_else(|| {
        HeraldError::UserError(format!(
            "workspace config disappeared from '{}'",
            ctx.config_path().display()
        ))
    })?;
    Ok((ctx, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn init_workspace(dir: &Path) {
        std::fs::write(dir.join(CONFIG_FILE), "agents_dir: agents\n").unwrap();
    }

    #[test]
    fn test_resolve_from_root_itself() {
        let temp = TempDir::new().unwrap();
        init_workspace(temp.path());

        let ctx = WorkspaceContext::resolve_from(temp.path()).unwrap();
        assert_eq!(ctx.root, temp.path());
    }

    #[test]
    fn test_resolve_from_nested_directory() {
        let temp = TempDir::new().unwrap();
        init_workspace(temp.path());
        let nested = temp.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();

        let ctx = WorkspaceContext::resolve_from(&nested).unwrap();
        assert_eq!(ctx.root, temp.path());
    }

    #[test]
    fn test_resolve_fails_outside_workspace() {
        let temp = TempDir::new().unwrap();

        let result = WorkspaceContext::resolve_from(temp.path());
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("no herald workspace found")
        );
    }

    #[test]
    fn test_derived_paths() {
        let temp = TempDir::new().unwrap();
        init_workspace(temp.path());

        let ctx = WorkspaceContext::resolve_from(temp.path()).unwrap();
        let config = HeraldConfig::default();

        assert_eq!(ctx.config_path(), temp.path().join("herald.yaml"));
        assert_eq!(ctx.agents_dir(&config), temp.path().join("agents"));
        assert_eq!(
            ctx.events_path(),
            temp.path().join(".herald/events.ndjson")
        );
    }

    #[test]
    #[serial]
    fn test_root_env_override() {
        let temp = TempDir::new().unwrap();
        init_workspace(temp.path());

        // SAFETY: guarded by #[serial]; no other test thread touches the
        // environment while this runs.
        unsafe { env::set_var(ROOT_ENV_VAR, temp.path()) };
        let result = WorkspaceContext::resolve();
        unsafe { env::remove_var(ROOT_ENV_VAR) };

        let ctx = result.unwrap();
        assert_eq!(ctx.root, temp.path());
    }

    #[test]
    #[serial]
    fn test_root_env_override_requires_config() {
        let temp = TempDir::new().unwrap();

        unsafe { env::set_var(ROOT_ENV_VAR, temp.path()) };
        let result = WorkspaceContext::resolve();
        unsafe { env::remove_var(ROOT_ENV_VAR) };

        assert!(result.is_err());
    }
}
