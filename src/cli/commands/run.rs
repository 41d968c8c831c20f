//! Run command implementation.
//!
//! The `stepgraph run` command plans the requested targets and hands each
//! step to an executor: the configured `run_command`, or a dry run.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::cli::args::RunArgs;
use crate::error::Result;
use crate::runner::{
    plan, DryRunExecutor, PlanRunner, RunProgress, ShellExecutor, StepExecutor,
};
use crate::state::{satisfied_steps, CompletionStore};
use crate::ui::{format_duration, UserInterface};

use super::context::{load_or_report, EXIT_DAG_NOT_FOUND};
use super::dispatcher::{Command, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    project_root: PathBuf,
    dag: Option<PathBuf>,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(project_root: &Path, dag: Option<&Path>, args: RunArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            dag: dag.map(Path::to_path_buf),
            args,
        }
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(context) = load_or_report(&self.project_root, self.dag.as_deref(), ui)? else {
            return Ok(CommandResult::failure(EXIT_DAG_NOT_FOUND));
        };

        let graph = context.graph(self.args.selection.lenient)?;
        let state_path = context.state_path();
        let mut store = CompletionStore::load(&state_path)?;

        // External steps are never produced here, forced or not.
        let satisfied: BTreeSet<String> = if self.args.force {
            graph
                .steps()
                .filter(|step| step.is_external())
                .map(|step| step.id().to_string())
                .collect()
        } else {
            satisfied_steps(&graph, &store.view(&graph))
        };

        let request = context.plan_request(&graph, &self.args.selection, satisfied);
        let plan = plan(&graph, &request)?;

        for target in &plan.unknown_targets {
            ui.warning(&format!("Unknown target: {}", target));
        }

        if plan.is_empty() {
            ui.success("Nothing to do: every target is up to date");
            return Ok(CommandResult::success());
        }

        let mut executor: Box<dyn StepExecutor> = if self.args.dry_run {
            Box::new(DryRunExecutor::new())
        } else {
            match &context.config.run_command {
                Some(template) => Box::new(ShellExecutor::new(template.clone(), &context.root)),
                None => {
                    ui.error("No run_command configured in .stepgraph/config.yml");
                    return Ok(CommandResult::failure(1));
                }
            }
        };

        let label = if self.args.dry_run { "Dry run" } else { "Running" };
        ui.show_header(&format!("{} {} step(s)", label, plan.len()));

        let mut runner = PlanRunner::new(&graph);
        if !self.args.dry_run {
            runner = runner.with_store(&mut store);
        }

        let outcome = runner.run(&plan, executor.as_mut(), |event| {
            if let RunProgress::StepStarting { name, index, total } = event {
                ui.show_progress(index, total, name);
            }
        });

        if !self.args.dry_run {
            store.save(&state_path)?;
        }

        match outcome {
            Ok(summary) => {
                ui.success(&format!(
                    "{} step(s) completed in {}",
                    summary.completed.len(),
                    format_duration(summary.duration)
                ));
                Ok(CommandResult::success())
            }
            Err(e) => {
                ui.error(&e.to_string());
                Ok(CommandResult::failure(1))
            }
        }
    }
}
