//! Dependency resolution and plan execution.
//!
//! - [`dependency`] builds the validated [`DependencyGraph`]
//! - [`plan`](mod@plan) orders the steps needed for a set of targets
//! - [`selection`] turns command-line patterns into targets
//! - [`executor`] drives a [`StepExecutor`] over a plan

pub mod dependency;
pub mod executor;
pub mod plan;
pub mod selection;

pub use dependency::{build_graph, DependencyGraph, DependencyGraphBuilder, UnknownDependencyMode};
pub use executor::{
    DryRunExecutor, PlanRunner, RunProgress, RunSummary, ShellExecutor, StepExecutor,
};
pub use plan::{plan, ExecutionPlan, PlanRequest, UnknownTargetMode};
pub use selection::{SelectedTargets, TargetMatch, TargetSelection};
