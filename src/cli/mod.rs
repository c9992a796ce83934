//! CLI argument parsing for herald.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Herald: manifest-driven agent registry and prompt dispatcher.
///
/// Agents are declared as YAML manifests in a workspace agents directory
/// (template-backed) or registered in-process (code-backed built-ins).
/// A request names an agent, supplies a prompt and variables, and gets
/// back the agent's output string.
#[derive(Parser, Debug)]
#[command(name = "herald")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for herald.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a herald workspace in the current directory.
    ///
    /// Creates herald.yaml, the agents directory with a sample manifest,
    /// and the state directory.
    Init,

    /// Resolve an agent and run it.
    ///
    /// Dispatches the named agent with a prompt and variables, printing
    /// the agent's output to stdout.
    Run(RunArgs),

    /// List registered agents.
    ///
    /// Shows built-ins and manifest-backed agents in registration order.
    List,

    /// Show details of a specific agent.
    ///
    /// Prints the manifest fields and, for template agents, the
    /// placeholders the template references.
    Show(ShowArgs),

    /// Validate the agents directory.
    ///
    /// Runs manifest discovery and reports every file that would be
    /// skipped. Exits non-zero if any manifest is invalid.
    Validate,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Name of the agent to run.
    pub agent: String,

    /// Free-text prompt passed to the agent (reserved variable `prompt`).
    #[arg(short, long, default_value = "")]
    pub prompt: String,

    /// Variable as key=value. May be repeated; wins over --vars-file.
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// YAML file with a mapping of variable names to values.
    #[arg(long, value_name = "FILE")]
    pub vars_file: Option<PathBuf>,

    /// Show how the request would resolve without invoking a code agent.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `show` command.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Name of the agent to show.
    pub agent: String,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        // Verifies the CLI arguments configuration is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_init() {
        let cli = Cli::try_parse_from(["herald", "init"]).unwrap();
        assert!(matches!(cli.command, Command::Init));
    }

    #[test]
    fn parse_run_minimal() {
        let cli = Cli::try_parse_from(["herald", "run", "greeter"]).unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.agent, "greeter");
            assert_eq!(args.prompt, "");
            assert!(args.vars.is_empty());
            assert!(args.vars_file.is_none());
            assert!(!args.dry_run);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_run_full() {
        let cli = Cli::try_parse_from([
            "herald",
            "run",
            "greeter",
            "--prompt",
            "say hello",
            "--var",
            "name=Ada",
            "--var",
            "tone=warm",
            "--vars-file",
            "vars.yaml",
            "--dry-run",
        ])
        .unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.agent, "greeter");
            assert_eq!(args.prompt, "say hello");
            assert_eq!(args.vars, vec!["name=Ada", "tone=warm"]);
            assert_eq!(args.vars_file, Some(PathBuf::from("vars.yaml")));
            assert!(args.dry_run);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_run_short_prompt_flag() {
        let cli = Cli::try_parse_from(["herald", "run", "echo", "-p", "hi"]).unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.prompt, "hi");
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_list() {
        let cli = Cli::try_parse_from(["herald", "list"]).unwrap();
        assert!(matches!(cli.command, Command::List));
    }

    #[test]
    fn parse_show() {
        let cli = Cli::try_parse_from(["herald", "show", "greeter"]).unwrap();
        if let Command::Show(args) = cli.command {
            assert_eq!(args.agent, "greeter");
        } else {
            panic!("Expected Show command");
        }
    }

    #[test]
    fn parse_validate() {
        let cli = Cli::try_parse_from(["herald", "validate"]).unwrap();
        assert!(matches!(cli.command, Command::Validate));
    }

    #[test]
    fn parse_run_requires_agent() {
        let result = Cli::try_parse_from(["herald", "run"]);
        assert!(result.is_err());
    }
}
