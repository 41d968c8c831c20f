//! List command implementation.
//!
//! The `stepgraph list` command prints every step of the DAG, including
//! external snapshot leaves.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::ListArgs;
use crate::error::Result;
use crate::steps::{Step, StepKind};
use crate::ui::{should_use_colors, StepGraphTheme, UserInterface};

use super::context::{load_or_report, EXIT_DAG_NOT_FOUND};
use super::dispatcher::{Command, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    project_root: PathBuf,
    dag: Option<PathBuf>,
    args: ListArgs,
}

#[derive(Serialize)]
struct StepJson<'a> {
    id: &'a str,
    kind: &'static str,
    dependencies: Vec<&'a str>,
    external: bool,
    private: bool,
}

impl<'a> From<&'a Step> for StepJson<'a> {
    fn from(step: &'a Step) -> Self {
        Self {
            id: step.id(),
            kind: step.kind().as_str(),
            dependencies: step.dependencies().iter().map(String::as_str).collect(),
            external: step.is_external(),
            private: step.uri().is_private(),
        }
    }
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(project_root: &Path, dag: Option<&Path>, args: ListArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            dag: dag.map(Path::to_path_buf),
            args,
        }
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let kind = match self.args.kind.as_deref().map(str::parse::<StepKind>) {
            None => None,
            Some(Ok(kind)) => Some(kind),
            Some(Err(e)) => {
                ui.error(&e);
                return Ok(CommandResult::failure(1));
            }
        };

        let Some(context) = load_or_report(&self.project_root, self.dag.as_deref(), ui)? else {
            return Ok(CommandResult::failure(EXIT_DAG_NOT_FOUND));
        };
        // Listing never fails on undeclared dependencies; lint reports them.
        let graph = context.graph(true)?;

        let steps: Vec<&Step> = graph
            .steps()
            .filter(|step| kind.is_none_or(|k| step.kind() == k))
            .collect();

        if self.args.json {
            let json: Vec<StepJson<'_>> = steps.iter().map(|s| StepJson::from(*s)).collect();
            let text = serde_json::to_string_pretty(&json).map_err(anyhow::Error::from)?;
            ui.output(&text);
            return Ok(CommandResult::success());
        }

        let theme = if should_use_colors() {
            StepGraphTheme::new()
        } else {
            StepGraphTheme::plain()
        };
        for step in &steps {
            let mut line = theme.format_step(step.id(), step.kind(), step.is_external());
            if step.is_external() {
                line.push_str(" (external)");
            }
            ui.output(&line);
        }
        ui.message(&format!("{} step(s)", steps.len()));

        Ok(CommandResult::success())
    }
}
