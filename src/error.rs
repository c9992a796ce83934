//! Error types for the herald CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for herald operations.
///
/// Each variant maps to a specific exit code. The four dispatch-path variants
/// (`ManifestParse`, `AgentNotFound`, `MissingVariable`, `AgentExecution`)
/// are all deterministic, non-transient conditions: nothing in herald
/// retries them.
#[derive(Error, Debug)]
pub enum HeraldError {
    /// User provided invalid arguments or the workspace is in an invalid state.
    #[error("{0}")]
    UserError(String),

    /// A manifest file is structurally invalid.
    #[error("manifest error: {0}")]
    ManifestParse(String),

    /// The requested agent name has no registered entry.
    #[error("agent '{name}' is not registered. Available agents: {available}")]
    AgentNotFound {
        /// The name that failed to resolve.
        name: String,
        /// Comma-separated list of registered agent names, or "(none)".
        available: String,
    },

    /// A template placeholder or required variable has no corresponding value.
    #[error("agent '{agent}' requires variable '{name}', which was not provided")]
    MissingVariable {
        /// The variable name that was missing.
        name: String,
        /// The agent whose template or contract referenced it.
        agent: String,
    },

    /// A code-backed agent's callable failed. The original cause is attached.
    #[error("agent '{agent}' execution failed: {source}")]
    AgentExecution {
        /// The agent that was running.
        agent: String,
        /// The underlying failure from the callable.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl HeraldError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            HeraldError::UserError(_) => exit_codes::USER_ERROR,
            HeraldError::ManifestParse(_) => exit_codes::MANIFEST_FAILURE,
            HeraldError::AgentNotFound { .. } => exit_codes::AGENT_NOT_FOUND,
            HeraldError::MissingVariable { .. } => exit_codes::DISPATCH_FAILURE,
            HeraldError::AgentExecution { .. } => exit_codes::DISPATCH_FAILURE,
        }
    }
}

/// Result type alias for herald operations.
pub type Result<T> = std::result::Result<T, HeraldError>;
