//! Agent registry: the name → agent lookup table used by the dispatcher.
//!
//! The registry is built two ways:
//!
//! - **Directory load**: manifest discovery over the workspace agents
//!   directory, constructing a template agent per valid manifest.
//! - **In-process registration**: code-backed agents (built-ins) registered
//!   directly, plus an entry-point table that code-kind manifests resolve
//!   their callables against.
//!
//! The registry has two states: `Unloaded` (constructed, empty) and
//! `Loaded` (after the first successful registration or directory load).
//! There is no teardown state; it lives for the process lifetime.
//!
//! # Collision Policy
//!
//! No two agents share a name. What happens when a registration collides is
//! a configurable policy: `warn` (default) keeps last-write-wins semantics
//! and records one collision warning per override; `error` makes the
//! collision a hard failure.
//!
//! # Concurrent Access
//!
//! The registry is read-heavy, write-rarely. [`SharedRegistry`] wraps it in
//! a read-write lock; `lookup` hands out `Arc<Agent>` clones so execution
//! proceeds without holding the lock, and `replace` swaps in a fully built
//! registry so in-flight readers never observe a partially populated
//! mapping.

use crate::agent::{Agent, AgentFn, CodeAgent, TemplateAgent};
use crate::error::{HeraldError, Result};
use crate::manifest::{AgentKind, AgentManifest, DiscoveryWarning, discover_manifests};
use globset::GlobSet;
use log::{debug, info, warn};
use parking_lot::{RwLock, RwLockReadGuard};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Policy for name collisions during registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Replace the existing agent and record a warning (default).
    #[default]
    Warn,
    /// Fail the registration outright.
    Error,
}

impl CollisionPolicy {
    /// Parse a collision policy from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "warn" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// A recorded registry warning (currently always a name collision).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryWarning {
    /// The agent name that collided.
    pub name: String,
    /// Human-readable description of what happened.
    pub detail: String,
}

impl std::fmt::Display for RegistryWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "agent '{}': {}", self.name, self.detail)
    }
}

/// Outcome of a directory load.
#[derive(Debug)]
pub struct LoadReport {
    /// Number of agents registered from manifests.
    pub registered: usize,
    /// Manifest files (or constructions) that were skipped, one warning each.
    pub skipped: Vec<DiscoveryWarning>,
}

/// Mapping from agent name to agent, with exclusive ownership.
///
/// Callers receive `Arc<Agent>` references from [`AgentRegistry::lookup`];
/// the registry is the only owner of the mapping itself.
pub struct AgentRegistry {
    agents: HashMap<String, Arc<Agent>>,
    /// Insertion order of names; replacement keeps the original position.
    order: Vec<String>,
    entry_points: HashMap<String, AgentFn>,
    policy: CollisionPolicy,
    default_timeout_seconds: Option<u64>,
    warnings: Vec<RegistryWarning>,
    loaded: bool,
}

impl AgentRegistry {
    /// Create an empty (`Unloaded`) registry.
    pub fn new(policy: CollisionPolicy, default_timeout_seconds: Option<u64>) -> Self {
        Self {
            agents: HashMap::new(),
            order: Vec::new(),
            entry_points: HashMap::new(),
            policy,
            default_timeout_seconds,
            warnings: Vec::new(),
            loaded: false,
        }
    }

    /// Bind a callable that code-kind manifests may reference by name.
    pub fn bind_entry_point(&mut self, name: &str, callable: AgentFn) {
        if self.entry_points.insert(name.to_string(), callable).is_some() {
            debug!("entry point '{}' rebound", name);
        }
    }

    /// Register an agent under its manifest name.
    ///
    /// Inserts or replaces. On collision, behavior follows the configured
    /// [`CollisionPolicy`]; under `warn` the later registration wins and one
    /// warning is recorded.
    pub fn register(&mut self, agent: Agent) -> Result<()> {
        let name = agent.name().to_string();

        if self.agents.contains_key(&name) {
            match self.policy {
                CollisionPolicy::Error => {
                    return Err(HeraldError::UserError(format!(
                        "agent name collision: '{}' is already registered.\n\
                         Fix: rename one of the agents, or set collision_policy to 'warn' in herald.yaml.",
                        name
                    )));
                }
                CollisionPolicy::Warn => {
                    let warning = RegistryWarning {
                        name: name.clone(),
                        detail: "replaced by a later registration".to_string(),
                    };
                    warn!("{}", warning);
                    self.warnings.push(warning);
                }
            }
        } else {
            self.order.push(name.clone());
        }

        self.agents.insert(name, Arc::new(agent));
        self.loaded = true;
        Ok(())
    }

    /// Register a built-in code agent.
    ///
    /// Binds the callable as an entry point (so manifests may reference it)
    /// and registers a code agent with a synthesized manifest.
    pub fn register_builtin(
        &mut self,
        name: &str,
        description: &str,
        callable: AgentFn,
    ) -> Result<()> {
        self.bind_entry_point(name, Arc::clone(&callable));
        let manifest = AgentManifest::builtin(name, description);
        self.register(Agent::Code(CodeAgent::new(
            manifest,
            callable,
            self.default_timeout_seconds,
        )))
    }

    /// Look up an agent by name.
    pub fn lookup(&self, name: &str) -> Result<Arc<Agent>> {
        self.agents
            .get(name)
            .cloned()
            .ok_or_else(|| HeraldError::AgentNotFound {
                name: name.to_string(),
                available: self.available(),
            })
    }

    /// Registered agent names, in insertion order.
    pub fn list(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Recorded warnings (collisions), in occurrence order.
    pub fn warnings(&self) -> &[RegistryWarning] {
        &self.warnings
    }

    /// Whether at least one load/registration has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Number of registered agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the registry has no agents.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Discover manifests in a directory and register an agent per valid one.
    ///
    /// Template manifests resolve `template_file` against the directory;
    /// code manifests resolve `entry_point` against the bound entry-point
    /// table. A manifest that parses but cannot be constructed (missing
    /// template file, unknown entry point) is skipped with a recorded
    /// warning, same as a parse failure — one bad manifest never aborts the
    /// load.
    pub fn load_from_directory(&mut self, dir: &Path, globs: &GlobSet) -> Result<LoadReport> {
        let (manifests, mut skipped) = discover_manifests(dir, globs)?;
        let mut registered = 0;

        for manifest in manifests {
            let agent = match manifest.kind {
                AgentKind::Template => {
                    match TemplateAgent::from_manifest(manifest, dir) {
                        Ok(t) => Agent::Template(t),
                        Err(e) => {
                            let warning = DiscoveryWarning {
                                path: dir.to_path_buf(),
                                reason: e.to_string(),
                            };
                            warn!("{}", warning);
                            skipped.push(warning);
                            continue;
                        }
                    }
                }
                AgentKind::Code => {
                    // validate() guarantees entry_point is present for code kind.
                    let entry_point = manifest.entry_point.clone().unwrap_or_default();
                    match self.entry_points.get(&entry_point) {
                        Some(callable) => Agent::Code(CodeAgent::new(
                            manifest,
                            Arc::clone(callable),
                            self.default_timeout_seconds,
                        )),
                        None => {
                            let warning = DiscoveryWarning {
                                path: dir.to_path_buf(),
                                reason: format!(
                                    "manifest references unknown entry point '{}'",
                                    entry_point
                                ),
                            };
                            warn!("{}", warning);
                            skipped.push(warning);
                            continue;
                        }
                    }
                }
            };

            self.register(agent)?;
            registered += 1;
        }

        info!(
            "registered {} agent(s) from '{}' ({} skipped)",
            registered,
            dir.display(),
            skipped.len()
        );

        Ok(LoadReport {
            registered,
            skipped,
        })
    }

    /// Formatted list of registered names for error messages.
    fn available(&self) -> String {
        if self.order.is_empty() {
            "(none)".to_string()
        } else {
            self.order.join(", ")
        }
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agents", &self.order)
            .field("policy", &self.policy)
            .field("loaded", &self.loaded)
            .finish()
    }
}

/// Thread-safe handle over an [`AgentRegistry`].
///
/// Lookups take the read lock briefly and return an `Arc<Agent>`, so agent
/// execution never holds the lock. Reload builds a complete registry
/// offline and publishes it atomically via [`SharedRegistry::replace`].
#[derive(Clone)]
pub struct SharedRegistry {
    inner: Arc<RwLock<AgentRegistry>>,
}

impl SharedRegistry {
    /// Wrap a built registry for shared access.
    pub fn new(registry: AgentRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    /// Look up an agent by name.
    pub fn lookup(&self, name: &str) -> Result<Arc<Agent>> {
        self.inner.read().lookup(name)
    }

    /// Registered agent names, in insertion order.
    pub fn list(&self) -> Vec<String> {
        self.inner.read().order.clone()
    }

    /// Swap in a replacement registry built offline.
    pub fn replace(&self, next: AgentRegistry) {
        *self.inner.write() = next;
    }

    /// Read access to the underlying registry.
    pub fn read(&self) -> RwLockReadGuard<'_, AgentRegistry> {
        self.inner.read()
    }
}
