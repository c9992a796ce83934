//! Manifest discovery: directory scanning with partial-failure tolerance.
//!
//! Discovery never lets one malformed manifest abort the scan. Files that
//! fail to parse are skipped, and each skip is recorded as a
//! [`DiscoveryWarning`] so callers (and tests) can observe exactly what was
//! dropped.

use crate::error::{HeraldError, Result};
use crate::manifest::AgentManifest;
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::warn;
use std::path::{Path, PathBuf};

/// A manifest file that was skipped during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryWarning {
    /// The file that was skipped.
    pub path: PathBuf,
    /// Why it was skipped.
    pub reason: String,
}

impl std::fmt::Display for DiscoveryWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "skipped '{}': {}", self.path.display(), self.reason)
    }
}

/// Build a GlobSet for manifest filename matching.
pub fn build_manifest_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            HeraldError::UserError(format!(
                "invalid glob pattern in manifest_globs: '{}' - {}\n\
                 Fix: edit herald.yaml and correct or remove this pattern.",
                pattern, e
            ))
        })?;
        builder.add(glob);
    }

    builder.build().map_err(|e| {
        HeraldError::UserError(format!("failed to build manifest glob set: {}", e))
    })
}

/// Enumerate and parse manifest files in a directory.
///
/// Files are visited in filename order. Subdirectories are not descended
/// into. A file whose name matches the glob set but fails to parse is
/// skipped with one recorded warning; the scan always completes.
///
/// # Returns
///
/// `(manifests, warnings)` - parsed manifests and one warning per skip.
pub fn discover_manifests(
    dir: &Path,
    globs: &GlobSet,
) -> Result<(Vec<AgentManifest>, Vec<DiscoveryWarning>)> {
    if !dir.is_dir() {
        return Err(HeraldError::UserError(format!(
            "agents directory '{}' does not exist.\n\
             Fix: run `herald init` or point agents_dir in herald.yaml at a real directory.",
            dir.display()
        )));
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| {
            HeraldError::UserError(format!(
                "failed to read agents directory '{}': {}",
                dir.display(),
                e
            ))
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .map(|name| globs.is_match(name))
                .unwrap_or(false)
        })
        .collect();
    entries.sort();

    let mut manifests = Vec::new();
    let mut warnings = Vec::new();

    for path in entries {
        match AgentManifest::load(&path) {
            Ok(manifest) => manifests.push(manifest),
            Err(e) => {
                let warning = DiscoveryWarning {
                    path: path.clone(),
                    reason: e.to_string(),
                };
                warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }

    Ok((manifests, warnings))
}
