//! Project context shared by commands that read the DAG.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::cli::args::SelectionArgs;
use crate::config::{
    load_dag, load_project_config, resolve_dag_path, resolve_state_path, LoadedDag,
    ProjectConfig,
};
use crate::error::{Result, StepGraphError};
use crate::runner::{
    DependencyGraph, PlanRequest, TargetMatch, TargetSelection, UnknownDependencyMode,
    UnknownTargetMode,
};
use crate::ui::{OutputMode, UserInterface};

/// Exit code for a missing DAG file.
pub const EXIT_DAG_NOT_FOUND: i32 = 2;

/// A project with its configuration and loaded DAG.
#[derive(Debug)]
pub struct ProjectContext {
    pub root: PathBuf,
    pub config: ProjectConfig,
    pub dag_path: PathBuf,
    pub dag: LoadedDag,
}

impl ProjectContext {
    /// Load configuration and the DAG for `project_root`.
    pub fn load(project_root: &Path, dag_override: Option<&Path>) -> Result<Self> {
        let config = load_project_config(project_root)?;
        let dag_path = resolve_dag_path(project_root, dag_override, &config);
        tracing::debug!("Using DAG {}", dag_path.display());
        let dag = load_dag(&dag_path, project_root)?;

        Ok(Self {
            root: project_root.to_path_buf(),
            config,
            dag_path,
            dag,
        })
    }

    /// Apply `settings.default_output` when no CLI flag was given.
    pub fn apply_output_mode(&self, ui: &mut dyn UserInterface) {
        if ui.output_mode() == OutputMode::Normal {
            ui.set_output_mode(self.config.settings.default_output.into());
        }
    }

    /// Build the dependency graph.
    ///
    /// `lenient` forces lenient handling of undeclared dependencies.
    pub fn graph(&self, lenient: bool) -> Result<DependencyGraph> {
        let mode = if lenient {
            UnknownDependencyMode::Lenient
        } else {
            self.config.settings.unknown_dependencies
        };
        self.dag.to_graph(mode)
    }

    /// Path of the completion store.
    pub fn state_path(&self) -> PathBuf {
        resolve_state_path(&self.root, &self.config)
    }

    /// Turn selection flags into a plan request.
    pub fn plan_request(
        &self,
        graph: &DependencyGraph,
        args: &SelectionArgs,
        satisfied: BTreeSet<String>,
    ) -> PlanRequest {
        let selection = TargetSelection {
            patterns: args.targets.clone(),
            matching: if args.pattern {
                TargetMatch::Substring
            } else {
                TargetMatch::Exact
            },
            downstream: args.downstream,
            exclude: args.exclude.clone(),
        };

        let unknown_targets = if args.best_effort {
            UnknownTargetMode::BestEffort
        } else {
            self.config.settings.unknown_targets
        };

        selection
            .resolve(graph)
            .into_request(satisfied, unknown_targets)
            .only_targets(args.only)
    }
}

/// Load the project, reporting a missing DAG on the UI.
///
/// Returns `Ok(None)` when the DAG does not exist; the caller should exit
/// with [`EXIT_DAG_NOT_FOUND`].
pub fn load_or_report(
    project_root: &Path,
    dag_override: Option<&Path>,
    ui: &mut dyn UserInterface,
) -> Result<Option<ProjectContext>> {
    match ProjectContext::load(project_root, dag_override) {
        Ok(context) => {
            context.apply_output_mode(ui);
            Ok(Some(context))
        }
        Err(StepGraphError::DagNotFound { path }) => {
            ui.error(&format!("DAG file not found: {}", path.display()));
            Ok(None)
        }
        Err(e) => Err(e),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::ui::MockUI;

    #[test]
    fn load_reads_config_and_dag() {
        let temp = setup_project();
        let context = ProjectContext::load(temp.path(), None).unwrap();
        assert_eq!(context.dag.steps.len(), 4);
        assert_eq!(context.dag_path, temp.path().join("dag/main.yml"));
    }

    #[test]
    fn dag_override_wins_over_config() {
        let temp = setup_project();
        write_config(temp.path(), "dag: missing.yml\n");
        std::fs::write(temp.path().join("alt.yml"), "steps:\n  garden://a/latest/b:\n").unwrap();

        let context = ProjectContext::load(temp.path(), Some(Path::new("alt.yml"))).unwrap();
        assert_eq!(context.dag.steps.len(), 1);
    }

    #[test]
    fn missing_dag_is_reported() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut ui = MockUI::new();

        let context = load_or_report(temp.path(), None, &mut ui).unwrap();
        assert!(context.is_none());
        assert!(ui.has_message("DAG file not found"));
    }

    #[test]
    fn config_output_mode_applies_without_flag() {
        let temp = setup_project();
        write_config(temp.path(), "settings:\n  default_output: quiet\n");
        let mut ui = MockUI::new();

        load_or_report(temp.path(), None, &mut ui).unwrap();
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn plan_request_combines_selection_and_settings() {
        let temp = setup_project();
        write_config(temp.path(), "settings:\n  unknown_targets: best_effort\n");
        let context = ProjectContext::load(temp.path(), None).unwrap();
        let graph = context.graph(false).unwrap();

        let args = SelectionArgs {
            targets: vec!["pip".to_string()],
            pattern: true,
            exclude: vec!["snapshot".to_string()],
            ..Default::default()
        };
        let request = context.plan_request(&graph, &args, BTreeSet::new());

        assert_eq!(request.targets.len(), 4);
        assert!(request.satisfied.contains(SNAP));
        assert_eq!(request.unknown_targets, UnknownTargetMode::BestEffort);
    }
}
