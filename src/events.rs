//! Event logging subsystem for herald.
//!
//! This module implements append-only event logging to support auditing
//! what was loaded and dispatched. Events are stored in NDJSON format (one
//! JSON object per line) in `.herald/events.ndjson`.
//!
//! # Event Format
//!
//! Each event is a JSON object with the following fields:
//! - `ts`: RFC3339 timestamp
//! - `action`: The action performed (init, registry_load, dispatch, etc.)
//! - `actor`: The owner string (e.g., `user@HOST`)
//! - `agent`: Optional agent name for agent-specific events
//! - `details`: Freeform object with action-specific details
//!
//! Event logging is best-effort: a failed append is surfaced as a warning
//! by callers, never as a command failure.

use crate::context::WorkspaceContext;
use crate::error::{HeraldError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Workspace initialization
    Init,
    /// Registry loaded from the agents directory
    RegistryLoad,
    /// Agent name collision during registration
    Collision,
    /// Dispatch started
    Dispatch,
    /// Dispatch completed
    DispatchComplete,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Init => write!(f, "init"),
            EventAction::RegistryLoad => write!(f, "registry_load"),
            EventAction::Collision => write!(f, "collision"),
            EventAction::Dispatch => write!(f, "dispatch"),
            EventAction::DispatchComplete => write!(f, "dispatch_complete"),
        }
    }
}

/// An event record for the audit log.
///
/// Events are serialized as single-line JSON objects and appended to
/// the events.ndjson file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// The action that was performed.
    pub action: EventAction,

    /// The actor who performed the action (e.g., `user@HOST`).
    pub actor: String,

    /// Optional agent name for agent-specific events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,

    /// Freeform details object with action-specific information.
    pub details: Value,
}

impl Event {
    /// Create a new event with the given action.
    ///
    /// The timestamp is set to the current time, and the actor is
    /// determined from the environment (USER@HOSTNAME).
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: get_actor_string(),
            agent: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the agent name for this event.
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            HeraldError::UserError(format!("failed to serialize event to JSON: {}", e))
        })
    }
}

/// Get the actor string for event metadata.
fn get_actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append an event to the events log.
///
/// The event is written as a single JSON line to `.herald/events.ndjson`,
/// creating the state directory and file on first use.
pub fn append_event(ctx: &WorkspaceContext, event: &Event) -> Result<()> {
    let events_file = ctx.events_path();
    let json_line = event.to_ndjson_line()?;

    let state_dir = ctx.state_dir();
    if !state_dir.exists() {
        fs::create_dir_all(&state_dir).map_err(|e| {
            HeraldError::UserError(format!(
                "failed to create state directory '{}': {}",
                state_dir.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&events_file)
        .map_err(|e| {
            HeraldError::UserError(format!(
                "failed to open events file '{}': {}",
                events_file.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        HeraldError::UserError(format!(
            "failed to write event to '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn make_workspace() -> (TempDir, WorkspaceContext) {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("herald.yaml"), "").unwrap();
        let ctx = WorkspaceContext::resolve_from(temp.path()).unwrap();
        (temp, ctx)
    }

    #[test]
    fn test_event_serializes_to_single_line() {
        let event = Event::new(EventAction::Dispatch)
            .with_agent("greeter")
            .with_details(json!({"prompt_len": 12}));

        let line = event.to_ndjson_line().unwrap();
        assert!(!line.contains('\n'));
        assert!(line.contains("\"action\":\"dispatch\""));
        assert!(line.contains("\"agent\":\"greeter\""));
        assert!(line.contains("prompt_len"));
    }

    #[test]
    fn test_event_without_agent_omits_field() {
        let event = Event::new(EventAction::Init);
        let line = event.to_ndjson_line().unwrap();
        assert!(!line.contains("\"agent\""));
    }

    #[test]
    fn test_append_event_creates_file() {
        let (_temp, ctx) = make_workspace();
        assert!(!ctx.events_path().exists());

        let event = Event::new(EventAction::RegistryLoad).with_details(json!({"registered": 3}));
        append_event(&ctx, &event).unwrap();

        assert!(ctx.events_path().exists());
        let content = std::fs::read_to_string(ctx.events_path()).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("registry_load"));
    }

    #[test]
    fn test_append_event_appends_lines() {
        let (_temp, ctx) = make_workspace();

        append_event(&ctx, &Event::new(EventAction::Dispatch).with_agent("echo")).unwrap();
        append_event(
            &ctx,
            &Event::new(EventAction::DispatchComplete).with_agent("echo"),
        )
        .unwrap();

        let content = std::fs::read_to_string(ctx.events_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        // Every line is valid JSON on its own.
        for line in lines {
            let parsed: Value = serde_json::from_str(line).unwrap();
            assert!(parsed.get("ts").is_some());
            assert!(parsed.get("actor").is_some());
        }
    }

    #[test]
    fn test_actor_string_format() {
        let actor = get_actor_string();
        assert!(actor.contains('@'));
    }

    #[test]
    fn test_action_display() {
        assert_eq!(EventAction::Init.to_string(), "init");
        assert_eq!(EventAction::RegistryLoad.to_string(), "registry_load");
        assert_eq!(EventAction::Collision.to_string(), "collision");
        assert_eq!(EventAction::Dispatch.to_string(), "dispatch");
        assert_eq!(
            EventAction::DispatchComplete.to_string(),
            "dispatch_complete"
        );
    }
}
