//! Agent execution subsystem for herald.
//!
//! This module provides the runtime agent abstraction:
//!
//! - **Template**: `{{variable}}` substitution engine
//! - **Agent**: the polymorphic unit of execution (template- or code-backed)
//! - **Builtins**: in-process code agents registered at startup
//!
//! # Design Philosophy
//!
//! The two agent kinds sit behind one invocation contract,
//! `run(prompt, variables) -> String`. Callers (the dispatcher) never
//! discriminate the kind: a template agent can only fail on rendering or
//! missing variables, a code agent's failures are wrapped uniformly with the
//! original cause attached, and both surface through the same error type.
//!
//! The split is a sum type rather than a trait hierarchy: there are exactly
//! two variants, both known at compile time, and the registry owns them.

mod builtins;
mod template;

pub use builtins::register_builtins;
pub use template::{TemplateError, placeholders, render_template, vars};

use crate::error::{HeraldError, Result};
use crate::manifest::{AgentKind, AgentManifest};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

/// Reserved variable key carrying the request prompt into templates and
/// callables. A caller-supplied variable with this name is overridden.
pub const PROMPT_VAR: &str = "prompt";

/// Signature of a code agent's bound callable.
///
/// Callables receive the request prompt and the merged variable mapping and
/// produce the output string. Errors are arbitrary (`anyhow`); the agent
/// wraps them in `AgentExecution` so callers see one failure shape.
pub type AgentFn =
    Arc<dyn Fn(&str, &HashMap<String, String>) -> anyhow::Result<String> + Send + Sync>;

/// A named, invokable unit that turns a prompt plus variables into an
/// output string.
pub enum Agent {
    /// Output produced by variable substitution into the manifest's template.
    Template(TemplateAgent),
    /// Output produced by invoking a bound callable.
    Code(CodeAgent),
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Agent::Template(t) => f
                .debug_struct("TemplateAgent")
                .field("name", &t.manifest.name)
                .finish(),
            Agent::Code(c) => f
                .debug_struct("CodeAgent")
                .field("name", &c.manifest.name)
                .field("timeout", &c.timeout)
                .finish(),
        }
    }
}

impl Agent {
    /// The manifest this agent was constructed from.
    pub fn manifest(&self) -> &AgentManifest {
        match self {
            Agent::Template(t) => &t.manifest,
            Agent::Code(c) => &c.manifest,
        }
    }

    /// The agent's registry name.
    pub fn name(&self) -> &str {
        &self.manifest().name
    }

    /// The agent's execution strategy.
    pub fn kind(&self) -> AgentKind {
        match self {
            Agent::Template(_) => AgentKind::Template,
            Agent::Code(_) => AgentKind::Code,
        }
    }

    /// Run the agent: produce the output string for a prompt and variables.
    ///
    /// Manifest defaults are merged beneath the caller's variables, the
    /// prompt is inserted under the reserved `prompt` key, and
    /// `required_variables` are checked before any render or invoke.
    pub fn run(&self, prompt: &str, variables: &HashMap<String, String>) -> Result<String> {
        let merged = self.merge_variables(prompt, variables);
        self.check_required(&merged)?;

        match self {
            Agent::Template(t) => t.render(&merged),
            Agent::Code(c) => c.invoke(prompt, &merged),
        }
    }

    /// Merge manifest defaults, caller variables, and the reserved prompt key.
    pub fn merge_variables(
        &self,
        prompt: &str,
        variables: &HashMap<String, String>,
    ) -> HashMap<String, String> {
        let manifest = self.manifest();
        let mut merged: HashMap<String, String> = manifest
            .defaults
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        merged.extend(variables.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged.insert(PROMPT_VAR.to_string(), prompt.to_string());
        merged
    }

    fn check_required(&self, merged: &HashMap<String, String>) -> Result<()> {
        for name in &self.manifest().required_variables {
            if !merged.contains_key(name) {
                return Err(HeraldError::MissingVariable {
                    name: name.clone(),
                    agent: self.name().to_string(),
                });
            }
        }
        Ok(())
    }
}

/// An agent whose output is produced by rendering static template text.
#[derive(Debug, Clone)]
pub struct TemplateAgent {
    manifest: AgentManifest,
    template: String,
}

impl TemplateAgent {
    /// Construct from a manifest, resolving `template_file` against `base_dir`.
    pub fn from_manifest(manifest: AgentManifest, base_dir: &Path) -> Result<Self> {
        let template = manifest.resolve_template(base_dir)?;
        Ok(Self { manifest, template })
    }

    /// The resolved template text.
    pub fn template(&self) -> &str {
        &self.template
    }

    fn render(&self, merged: &HashMap<String, String>) -> Result<String> {
        render_template(&self.template, merged).map_err(|e| match e {
            TemplateError::UndefinedVariable { name, .. } => HeraldError::MissingVariable {
                name,
                agent: self.manifest.name.clone(),
            },
            malformed => HeraldError::UserError(format!(
                "agent '{}' template is malformed: {}",
                self.manifest.name, malformed
            )),
        })
    }
}

/// An agent whose output is produced by invoking a bound callable.
pub struct CodeAgent {
    manifest: AgentManifest,
    callable: AgentFn,
    timeout: Option<Duration>,
}

impl CodeAgent {
    /// Construct from a manifest and its resolved callable.
    ///
    /// The effective timeout is the manifest's `timeout_seconds`, falling
    /// back to `default_timeout_seconds`; absent means unbounded.
    pub fn new(
        manifest: AgentManifest,
        callable: AgentFn,
        default_timeout_seconds: Option<u64>,
    ) -> Self {
        let timeout = manifest
            .timeout_seconds
            .or(default_timeout_seconds)
            .map(Duration::from_secs);
        Self {
            manifest,
            callable,
            timeout,
        }
    }

    /// The effective execution time bound, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn invoke(&self, prompt: &str, merged: &HashMap<String, String>) -> Result<String> {
        let outcome = match self.timeout {
            None => (self.callable)(prompt, merged),
            Some(timeout) => self.invoke_with_deadline(prompt, merged, timeout),
        };

        outcome.map_err(|e| HeraldError::AgentExecution {
            agent: self.manifest.name.clone(),
            source: e.into(),
        })
    }

    /// Run the callable on a worker thread and await the result with a
    /// deadline.
    ///
    /// On timeout the worker is abandoned, not cancelled: an arbitrary
    /// callable cannot be interrupted from outside.
    fn invoke_with_deadline(
        &self,
        prompt: &str,
        merged: &HashMap<String, String>,
        timeout: Duration,
    ) -> anyhow::Result<String> {
        let callable = Arc::clone(&self.callable);
        let prompt = prompt.to_string();
        let merged = merged.clone();
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            let _ = tx.send(callable(&prompt, &merged));
        });

        match rx.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(anyhow::anyhow!(
                "timed out after {}s",
                timeout.as_secs()
            )),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(anyhow::anyhow!("callable panicked before producing a result"))
            }
        }
    }
}
