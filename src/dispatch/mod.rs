//! Dispatch: the single entry point that resolves and runs an agent.
//!
//! The dispatcher is deliberately thin: resolve the agent by name, run it,
//! wrap the output. It adds no error handling of its own and retries
//! nothing — every failure on this path (unknown name, bad template,
//! failing callable) is deterministic, so a retry would not change the
//! outcome. Callers get either a complete [`ExecutionResult`] or an error,
//! never partial output.

use crate::error::Result;
use crate::registry::SharedRegistry;
use std::collections::HashMap;

/// A single execution request. Constructed per call, discarded after.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// Name of the agent to resolve.
    pub agent_name: String,
    /// Free-text prompt, surfaced to the agent under the reserved
    /// `prompt` variable.
    pub prompt: String,
    /// Caller-supplied variables.
    pub variables: HashMap<String, String>,
}

impl ExecutionRequest {
    /// Create a request with no variables.
    pub fn new(agent_name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            prompt: prompt.into(),
            variables: HashMap::new(),
        }
    }

    /// Attach a variable mapping.
    pub fn with_variables(mut self, variables: HashMap<String, String>) -> Self {
        self.variables = variables;
        self
    }
}

/// The outcome of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// The string the agent produced.
    pub output: String,
    /// Which agent ran, echoed back.
    pub agent_name: String,
}

/// Resolves agents through a registry and runs them.
pub struct Dispatcher {
    registry: SharedRegistry,
}

impl Dispatcher {
    /// Create a dispatcher over a shared registry.
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }

    /// Execute a request: lookup, run, wrap.
    ///
    /// `AgentNotFound` and agent errors propagate unchanged.
    pub fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult> {
        let agent = self.registry.lookup(&request.agent_name)?;
        let output = agent.run(&request.prompt, &request.variables)?;

        Ok(ExecutionResult {
            output,
            agent_name: request.agent_name.clone(),
        })
    }
}
