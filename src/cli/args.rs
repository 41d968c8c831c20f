//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// stepgraph - Dependency resolution and planning for data pipeline DAGs.
#[derive(Debug, Parser)]
#[command(name = "stepgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Root DAG file (overrides `dag` in .stepgraph/config.yml)
    #[arg(long, global = true, env = "STEPGRAPH_DAG")]
    pub dag: Option<PathBuf>,

    /// Path to project root (overrides discovery from the current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the execution plan for a set of targets
    Plan(PlanArgs),

    /// Execute the plan for a set of targets
    Run(RunArgs),

    /// List the steps of the DAG
    List(ListArgs),

    /// Validate the DAG and report every problem
    Lint(LintArgs),

    /// Print the JSON Schema for DAG files
    Schema,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Target selection shared by `plan` and `run`.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SelectionArgs {
    /// Steps to produce (every step when omitted)
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Treat targets as substrings of step identifiers
    #[arg(short = 'm', long = "match")]
    pub pattern: bool,

    /// Also include every step that depends on a target
    #[arg(long)]
    pub downstream: bool,

    /// Plan only the targets, without their dependencies
    #[arg(long)]
    pub only: bool,

    /// Treat steps matching these substrings as satisfied (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Keep undeclared dependencies as external steps instead of failing
    #[arg(long)]
    pub lenient: bool,

    /// Report unknown targets and plan the rest
    #[arg(long)]
    pub best_effort: bool,
}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Steps already complete (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub satisfied: Vec<String>,

    /// Treat steps recorded as up to date in the state file as satisfied
    #[arg(long)]
    pub use_state: bool,

    /// Print the plan as waves of independent steps
    #[arg(long)]
    pub waves: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Preview the steps without executing them
    #[arg(long)]
    pub dry_run: bool,

    /// Re-run steps even when the state file marks them up to date
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Only list steps of this kind (snapshot, meadow, garden, grapher, explorers, export)
    #[arg(long)]
    pub kind: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `lint` command.
#[derive(Debug, Clone, clap::Args)]
pub struct LintArgs {
    /// Output format: human, json
    #[arg(long, default_value = "human")]
    pub format: String,
}

impl Default for LintArgs {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
        }
    }
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
