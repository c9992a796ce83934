//! Implementation of the `herald run` command.
//!
//! Assembles an `ExecutionRequest` from CLI arguments, dispatches it, and
//! prints the agent's output to stdout. Diagnostics go to stderr, so the
//! output string stays pipeable.

use crate::agent::{Agent, render_template};
use crate::cli::RunArgs;
use crate::context::require_initialized_workspace;
use crate::dispatch::{Dispatcher, ExecutionRequest};
use crate::error::{HeraldError, Result};
use crate::events::{Event, EventAction, append_event};
use crate::registry::SharedRegistry;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};

/// Execute the `herald run` command.
///
/// 1. Builds the registry (built-ins + agents directory)
/// 2. Collects variables from --vars-file and --var flags
/// 3. Dispatches the request and prints the output
pub fn cmd_run(args: RunArgs) -> Result<()> {
    let (ctx, config) = require_initialized_workspace()?;
    let (registry, _report) = super::build_registry(&ctx, &config)?;

    let variables = collect_variables(&args)?;
    let request = ExecutionRequest::new(&args.agent, &args.prompt).with_variables(variables);

    if args.dry_run {
        let agent = registry.lookup(&args.agent)?;
        print_dry_run(&agent, &request);
        return Ok(());
    }

    if config.log_events {
        let event = Event::new(EventAction::Dispatch)
            .with_agent(&request.agent_name)
            .with_details(json!({
                "prompt_len": request.prompt.len(),
                "variables": request.variables.len(),
            }));
        if let Err(e) = append_event(&ctx, &event) {
            eprintln!("Warning: failed to log dispatch event: {}", e);
        }
    }

    let dispatcher = Dispatcher::new(SharedRegistry::new(registry));
    let result = dispatcher.execute(&request)?;

    if config.log_events {
        let event = Event::new(EventAction::DispatchComplete)
            .with_agent(&result.agent_name)
            .with_details(json!({"output_len": result.output.len()}));
        if let Err(e) = append_event(&ctx, &event) {
            eprintln!("Warning: failed to log dispatch_complete event: {}", e);
        }
    }

    println!("{}", result.output);
    Ok(())
}

/// Collect variables from --vars-file (base) and --var flags (override).
fn collect_variables(args: &RunArgs) -> Result<HashMap<String, String>> {
    let mut variables = HashMap::new();

    if let Some(ref path) = args.vars_file {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HeraldError::UserError(format!(
                "failed to read vars file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let parsed: BTreeMap<String, String> = serde_yaml::from_str(&content).map_err(|e| {
            HeraldError::UserError(format!(
                "vars file '{}' must be a YAML mapping of strings: {}",
                path.display(),
                e
            ))
        })?;
        variables.extend(parsed);
    }

    for pair in &args.vars {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            HeraldError::UserError(format!("--var expects KEY=VALUE, got '{}'", pair))
        })?;
        if key.trim().is_empty() {
            return Err(HeraldError::UserError(format!(
                "--var has an empty key: '{}'",
                pair
            )));
        }
        variables.insert(key.to_string(), value.to_string());
    }

    Ok(variables)
}

/// Print how the request would resolve, without invoking a code agent.
fn print_dry_run(agent: &Agent, request: &ExecutionRequest) {
    let manifest = agent.manifest();
    let merged = agent.merge_variables(&request.prompt, &request.variables);

    println!("Dry run - would dispatch:");
    println!();
    println!("  Agent:    {} ({})", manifest.name, agent.kind());
    println!("  Version:  {}", manifest.version);
    if let Some(ref entry_point) = manifest.entry_point {
        println!("  Entry:    {}", entry_point);
    }

    println!("  Variables:");
    let mut keys: Vec<_> = merged.keys().collect();
    keys.sort();
    for key in keys {
        println!("    {} = {}", key, merged[key.as_str()]);
    }

    if let Agent::Template(t) = agent {
        let preview = match render_template(t.template(), &merged) {
            Ok(rendered) => rendered,
            Err(e) => format!("<error rendering template: {}>", e),
        };
        println!("  Rendered:");
        for line in preview.lines() {
            println!("    {}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init::init_at;
    use crate::error::HeraldError;
    use crate::context::ROOT_ENV_VAR;
    use serial_test::serial;
    use std::env;
    use std::path::Path;
    use tempfile::TempDir;

    fn run_args(agent: &str) -> RunArgs {
        RunArgs {
            agent: agent.to_string(),
            prompt: String::new(),
            vars: Vec::new(),
            vars_file: None,
            dry_run: false,
        }
    }

    fn with_workspace<T>(f: impl FnOnce(&Path) -> T) -> T {
        let temp = TempDir::new().unwrap();
        init_at(temp.path()).unwrap();

        // SAFETY: guarded by #[serial] on every caller.
        unsafe { env::set_var(ROOT_ENV_VAR, temp.path()) };
        let outcome = f(temp.path());
        unsafe { env::remove_var(ROOT_ENV_VAR) };
        outcome
    }

    #[test]
    fn test_collect_variables_from_flags() {
        let mut args = run_args("echo");
        args.vars = vec!["name=Ada".to_string(), "tone=warm".to_string()];

        let vars = collect_variables(&args).unwrap();
        assert_eq!(vars.get("name"), Some(&"Ada".to_string()));
        assert_eq!(vars.get("tone"), Some(&"warm".to_string()));
    }

    #[test]
    fn test_collect_variables_value_may_contain_equals() {
        let mut args = run_args("echo");
        args.vars = vec!["expr=a=b".to_string()];

        let vars = collect_variables(&args).unwrap();
        assert_eq!(vars.get("expr"), Some(&"a=b".to_string()));
    }

    #[test]
    fn test_collect_variables_rejects_missing_equals() {
        let mut args = run_args("echo");
        args.vars = vec!["nonsense".to_string()];

        let result = collect_variables(&args);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("KEY=VALUE"));
    }

    #[test]
    fn test_collect_variables_rejects_empty_key() {
        let mut args = run_args("echo");
        args.vars = vec!["=value".to_string()];

        assert!(collect_variables(&args).is_err());
    }

    #[test]
    fn test_collect_variables_file_then_flag_override() {
        let temp = TempDir::new().unwrap();
        let vars_path = temp.path().join("vars.yaml");
        std::fs::write(&vars_path, "name: FromFile\ntone: warm\n").unwrap();

        let mut args = run_args("echo");
        args.vars_file = Some(vars_path);
        args.vars = vec!["name=FromFlag".to_string()];

        let vars = collect_variables(&args).unwrap();
        assert_eq!(vars.get("name"), Some(&"FromFlag".to_string()));
        assert_eq!(vars.get("tone"), Some(&"warm".to_string()));
    }

    #[test]
    fn test_collect_variables_rejects_non_mapping_file() {
        let temp = TempDir::new().unwrap();
        let vars_path = temp.path().join("vars.yaml");
        std::fs::write(&vars_path, "- a\n- b\n").unwrap();

        let mut args = run_args("echo");
        args.vars_file = Some(vars_path);

        let result = collect_variables(&args);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("mapping"));
    }

    #[test]
    #[serial]
    fn test_cmd_run_sample_agent() {
        with_workspace(|_root| {
            let mut args = run_args("greeter");
            args.vars = vec!["name=Ada".to_string()];
            cmd_run(args).unwrap();
        });
    }

    #[test]
    #[serial]
    fn test_cmd_run_missing_variable_fails() {
        with_workspace(|_root| {
            let args = run_args("greeter");
            let result = cmd_run(args);
            assert!(matches!(
                result.unwrap_err(),
                HeraldError::MissingVariable { .. }
            ));
        });
    }

    #[test]
    #[serial]
    fn test_cmd_run_unknown_agent_fails() {
        with_workspace(|_root| {
            let result = cmd_run(run_args("does-not-exist"));
            assert!(matches!(
                result.unwrap_err(),
                HeraldError::AgentNotFound { .. }
            ));
        });
    }

    #[test]
    #[serial]
    fn test_cmd_run_builtin_echo() {
        with_workspace(|_root| {
            let mut args = run_args("echo");
            args.prompt = "test".to_string();
            cmd_run(args).unwrap();
        });
    }

    #[test]
    #[serial]
    fn test_cmd_run_logs_events() {
        with_workspace(|root| {
            let mut args = run_args("echo");
            args.prompt = "hi".to_string();
            cmd_run(args).unwrap();

            let events = std::fs::read_to_string(root.join(".herald/events.ndjson")).unwrap();
            assert!(events.contains("\"action\":\"dispatch\""));
            assert!(events.contains("\"action\":\"dispatch_complete\""));
        });
    }

    #[test]
    #[serial]
    fn test_cmd_run_dry_run_does_not_dispatch() {
        with_workspace(|root| {
            let mut args = run_args("greeter");
            args.dry_run = true;
            // Missing variables are fine in a dry run; the preview renders
            // the failure instead of failing the command.
            cmd_run(args).unwrap();

            let events = std::fs::read_to_string(root.join(".herald/events.ndjson")).unwrap();
            assert!(!events.contains("\"action\":\"dispatch\""));
        });
    }
}
