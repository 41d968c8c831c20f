//! Plan execution.
//!
//! Running a step is the job of a [`StepExecutor`]. [`PlanRunner`] walks an
//! [`ExecutionPlan`] in order, calls the executor once per step, records
//! successes in the completion store, and stops at the first failure.
//! Retrying failed steps is left to the caller.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::error::{Result, StepGraphError};
use crate::shell::{self, CommandOptions};
use crate::state::CompletionStore;
use crate::steps::Step;

use super::dependency::DependencyGraph;
use super::plan::ExecutionPlan;

/// Placeholder replaced by the step identifier in shell command templates.
pub const STEP_PLACEHOLDER: &str = "{step}";

/// Runs a single step.
pub trait StepExecutor {
    /// Produce the step's output.
    fn run_step(&mut self, step: &Step) -> Result<()>;
}

/// Executor that only records which steps it was asked to run.
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    visited: Vec<String>,
}

impl DryRunExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps seen so far, in call order.
    pub fn visited(&self) -> &[String] {
        &self.visited
    }
}

impl StepExecutor for DryRunExecutor {
    fn run_step(&mut self, step: &Step) -> Result<()> {
        tracing::info!("[dry-run] {}", step.id());
        self.visited.push(step.id().to_string());
        Ok(())
    }
}

/// Executor that runs a shell command per step.
///
/// The command template may contain `{step}`, replaced by the identifier.
/// The identifier and kind are also exported as `STEPGRAPH_STEP` and
/// `STEPGRAPH_STEP_KIND`.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    template: String,
    options: CommandOptions,
}

impl ShellExecutor {
    /// Create an executor running `template` from `project_root`.
    pub fn new(template: impl Into<String>, project_root: &Path) -> Self {
        Self {
            template: template.into(),
            options: CommandOptions {
                cwd: Some(project_root.to_path_buf()),
                ..Default::default()
            },
        }
    }

    /// Capture command output instead of streaming it to the terminal.
    pub fn capture_output(mut self, capture: bool) -> Self {
        self.options.capture = capture;
        self
    }

    /// The command that would run for `step`.
    pub fn command_for(&self, step: &Step) -> String {
        self.template.replace(STEP_PLACEHOLDER, step.id())
    }
}

impl StepExecutor for ShellExecutor {
    fn run_step(&mut self, step: &Step) -> Result<()> {
        let command = self.command_for(step);

        let mut options = self.options.clone();
        options
            .env
            .insert("STEPGRAPH_STEP".to_string(), step.id().to_string());
        options
            .env
            .insert("STEPGRAPH_STEP_KIND".to_string(), step.kind().to_string());

        let result = shell::execute(&command, &options)?;
        if result.success {
            Ok(())
        } else {
            Err(StepGraphError::StepExecution {
                step: step.id().to_string(),
                message: format!("`{}` exited with code {:?}", command, result.exit_code),
            })
        }
    }
}

/// Progress events emitted while running a plan.
#[derive(Debug)]
pub enum RunProgress<'a> {
    /// A step is about to start.
    StepStarting {
        name: &'a str,
        index: usize,
        total: usize,
    },
    /// A step finished successfully.
    StepFinished { name: &'a str, duration: Duration },
    /// A step failed; the run stops here.
    StepFailed {
        name: &'a str,
        error: &'a StepGraphError,
    },
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Steps that completed, in order.
    pub completed: Vec<String>,
    /// Total duration.
    pub duration: Duration,
}

/// Walks a plan and drives an executor.
pub struct PlanRunner<'a> {
    graph: &'a DependencyGraph,
    store: Option<&'a mut CompletionStore>,
}

impl<'a> PlanRunner<'a> {
    /// Create a runner over `graph`.
    pub fn new(graph: &'a DependencyGraph) -> Self {
        Self { graph, store: None }
    }

    /// Record every successful step in `store`.
    pub fn with_store(mut self, store: &'a mut CompletionStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Run the plan in order.
    ///
    /// # Errors
    ///
    /// Returns [`StepGraphError::StepExecution`] for the first failing step.
    /// Steps completed before the failure stay recorded in the store.
    pub fn run(
        &mut self,
        plan: &ExecutionPlan,
        executor: &mut dyn StepExecutor,
        mut on_progress: impl FnMut(RunProgress<'_>),
    ) -> Result<RunSummary> {
        let start = Instant::now();
        let total = plan.len();
        let mut summary = RunSummary::default();

        for (index, name) in plan.steps.iter().enumerate() {
            let step = self
                .graph
                .get(name)
                .ok_or_else(|| StepGraphError::ConfigValidationError {
                    message: format!("Planned step '{}' is not in the graph", name),
                })?;

            on_progress(RunProgress::StepStarting {
                name,
                index: index + 1,
                total,
            });

            let step_start = Instant::now();
            if let Err(err) = executor.run_step(step) {
                let err = match err {
                    StepGraphError::StepExecution { .. } => err,
                    other => StepGraphError::StepExecution {
                        step: name.clone(),
                        message: other.to_string(),
                    },
                };
                tracing::error!("{}", err);
                on_progress(RunProgress::StepFailed { name, error: &err });
                return Err(err);
            }

            if let Some(store) = self.store.as_deref_mut() {
                store.record(step);
            }

            on_progress(RunProgress::StepFinished {
                name,
                duration: step_start.elapsed(),
            });
            summary.completed.push(name.clone());
        }

        summary.duration = start.elapsed();
        Ok(summary)
    }
}
