//! stepgraph - Dependency resolution and execution planning for data
//! pipeline DAGs.
//!
//! A DAG maps step identifiers such as `garden://wb/2024-10-07/pip` to the
//! steps they depend on. stepgraph validates the graph, works out which
//! steps a set of targets needs, and orders them so every dependency runs
//! first.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - DAG files and project configuration
//! - [`error`] - Error types and result aliases
//! - [`lint`] - DAG validation that reports every problem
//! - [`runner`] - Dependency graph, planning, and plan execution
//! - [`shell`] - Shell command execution
//! - [`state`] - Completion state for incremental planning
//! - [`steps`] - Step identifiers and definitions
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use stepgraph::runner::{build_graph, plan, PlanRequest, UnknownDependencyMode};
//!
//! let raw = vec![
//!     ("meadow://wb/2024-10-07/pip".to_string(), vec!["snapshot://wb/2024-10-07/pip.csv".to_string()]),
//!     ("garden://wb/2024-10-07/pip".to_string(), vec!["meadow://wb/2024-10-07/pip".to_string()]),
//! ];
//! let graph = build_graph(raw, UnknownDependencyMode::Strict).unwrap();
//!
//! let request = PlanRequest::new(["garden://wb/2024-10-07/pip"])
//!     .with_satisfied(["snapshot://wb/2024-10-07/pip.csv"]);
//! let plan = plan(&graph, &request).unwrap();
//! assert_eq!(
//!     plan.steps,
//!     vec!["meadow://wb/2024-10-07/pip", "garden://wb/2024-10-07/pip"]
//! );
//! ```
//!
//! For file-based DAG loading, see the integration tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod lint;
pub mod runner;
pub mod shell;
pub mod state;
pub mod steps;
pub mod ui;

pub use error::{Result, StepGraphError};
