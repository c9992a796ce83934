//! Implementation of the `herald validate` command.

use crate::context::require_initialized_workspace;
use crate::error::{HeraldError, Result};
use crate::manifest::{build_manifest_globset, discover_manifests};

/// Execute the `herald validate` command.
///
/// Runs discovery over the agents directory and reports every manifest that
/// parses and every file that would be skipped. Fails if any file was
/// skipped, so CI can gate on manifest validity.
pub fn cmd_validate() -> Result<()> {
    let (ctx, config) = require_initialized_workspace()?;
    let globs = build_manifest_globset(&config.manifest_globs)?;
    let agents_dir = ctx.agents_dir(&config);

    let (manifests, warnings) = discover_manifests(&agents_dir, &globs)?;

    println!("Checked '{}'", agents_dir.display());
    println!();
    println!("Valid manifests ({}):", manifests.len());
    for manifest in &manifests {
        println!("  {} ({})", manifest.name, manifest.kind);
    }

    if warnings.is_empty() {
        println!();
        println!("All manifest files are valid.");
        return Ok(());
    }

    println!();
    println!("Invalid manifest files ({}):", warnings.len());
    for warning in &warnings {
        println!("  {}", warning);
    }

    Err(HeraldError::ManifestParse(format!(
        "{} manifest file(s) failed validation",
        warnings.len()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init::init_at;
    use crate::context::ROOT_ENV_VAR;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_cmd_validate_clean_workspace() {
        let temp = TempDir::new().unwrap();
        init_at(temp.path()).unwrap();

        // SAFETY: guarded by #[serial].
        unsafe { env::set_var(ROOT_ENV_VAR, temp.path()) };
        let result = cmd_validate();
        unsafe { env::remove_var(ROOT_ENV_VAR) };

        result.unwrap();
    }

    #[test]
    #[serial]
    fn test_cmd_validate_reports_broken_manifest() {
        let temp = TempDir::new().unwrap();
        init_at(temp.path()).unwrap();
        std::fs::write(temp.path().join("agents/broken.yaml"), "kind: template\n").unwrap();

        unsafe { env::set_var(ROOT_ENV_VAR, temp.path()) };
        let result = cmd_validate();
        unsafe { env::remove_var(ROOT_ENV_VAR) };

        match result.unwrap_err() {
            HeraldError::ManifestParse(msg) => {
                assert!(msg.contains("1 manifest file(s) failed validation"));
            }
            err => panic!("unexpected error: {:?}", err),
        }
    }
}
