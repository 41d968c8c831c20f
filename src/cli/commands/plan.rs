//! Plan command implementation.
//!
//! The `stepgraph plan` command prints the steps needed to produce a set of
//! targets, in execution order or grouped into waves.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::PlanArgs;
use crate::error::Result;
use crate::runner::{plan, ExecutionPlan};
use crate::state::{satisfied_steps, CompletionStore};
use crate::ui::UserInterface;

use super::context::{load_or_report, EXIT_DAG_NOT_FOUND};
use super::dispatcher::{Command, CommandResult};

/// The plan command implementation.
pub struct PlanCommand {
    project_root: PathBuf,
    dag: Option<PathBuf>,
    args: PlanArgs,
}

#[derive(Serialize)]
struct PlanJson<'a> {
    steps: &'a [String],
    waves: &'a [Vec<String>],
    unknown_targets: &'a [String],
    fingerprint: String,
}

impl PlanCommand {
    /// Create a new plan command.
    pub fn new(project_root: &Path, dag: Option<&Path>, args: PlanArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            dag: dag.map(Path::to_path_buf),
            args,
        }
    }

    fn print_text(&self, plan: &ExecutionPlan, ui: &mut dyn UserInterface) {
        if self.args.waves {
            for (index, wave) in plan.waves.iter().enumerate() {
                ui.output(&format!("wave {}:", index + 1));
                for step in wave {
                    ui.output(&format!("  {}", step));
                }
            }
        } else {
            for step in &plan.steps {
                ui.output(step);
            }
        }
    }
}

impl Command for PlanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(context) = load_or_report(&self.project_root, self.dag.as_deref(), ui)? else {
            return Ok(CommandResult::failure(EXIT_DAG_NOT_FOUND));
        };

        let graph = context.graph(self.args.selection.lenient)?;

        let mut satisfied: BTreeSet<String> = self.args.satisfied.iter().cloned().collect();
        if self.args.use_state {
            let store = CompletionStore::load(&context.state_path())?;
            let from_state = satisfied_steps(&graph, &store.view(&graph));
            tracing::debug!("{} step(s) up to date in state file", from_state.len());
            satisfied.extend(from_state);
        }

        let request = context.plan_request(&graph, &self.args.selection, satisfied);
        let plan = plan(&graph, &request)?;

        for target in &plan.unknown_targets {
            ui.warning(&format!("Unknown target: {}", target));
        }

        if self.args.json {
            let json = PlanJson {
                steps: &plan.steps,
                waves: &plan.waves,
                unknown_targets: &plan.unknown_targets,
                fingerprint: plan.fingerprint(),
            };
            let text = serde_json::to_string_pretty(&json).map_err(anyhow::Error::from)?;
            ui.output(&text);
        } else if plan.is_empty() {
            ui.success("Nothing to do: every target is satisfied");
        } else {
            self.print_text(&plan, ui);
        }

        Ok(CommandResult::success())
    }
}
