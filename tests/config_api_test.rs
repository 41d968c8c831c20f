//! Integration tests for DAG loading and completion state.

use std::fs;
use std::path::Path;

use stepgraph::config::{load_dag, load_project_config, resolve_state_path, OutputMode};
use stepgraph::runner::{plan, DryRunExecutor, PlanRequest, PlanRunner, UnknownDependencyMode};
use stepgraph::state::{satisfied_steps, CompletionStore};
use stepgraph::StepGraphError;
use tempfile::TempDir;

fn write(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, content).unwrap();
}

fn setup_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "dag/main.yml",
        r#"
steps:
  garden://wb/2024-10-07/pip:
    - meadow://wb/2024-10-07/pip
    - garden://ember/2023-12-12/electricity
include:
  - dag/wb.yml
  - dag/energy.yml
"#,
    );
    write(
        temp.path(),
        "dag/wb.yml",
        "steps:\n  meadow://wb/2024-10-07/pip:\n    - snapshot://wb/2024-10-07/pip.csv\n",
    );
    write(
        temp.path(),
        "dag/energy.yml",
        "steps:\n  garden://ember/2023-12-12/electricity:\n",
    );
    temp
}

#[test]
fn includes_are_merged_into_one_graph() {
    let temp = setup_project();
    let dag = load_dag(&temp.path().join("dag/main.yml"), temp.path()).unwrap();

    assert_eq!(dag.steps.len(), 3);
    assert_eq!(dag.files.len(), 3);
    assert!(dag.sources["garden://ember/2023-12-12/electricity"].ends_with("energy.yml"));

    let graph = dag.to_graph(UnknownDependencyMode::Strict).unwrap();
    let plan = plan(&graph, &PlanRequest::new(["garden://wb/2024-10-07/pip"])).unwrap();
    assert_eq!(
        plan.steps,
        vec![
            "garden://ember/2023-12-12/electricity",
            "snapshot://wb/2024-10-07/pip.csv",
            "meadow://wb/2024-10-07/pip",
            "garden://wb/2024-10-07/pip",
        ]
    );
}

#[test]
fn duplicate_step_across_files_is_rejected() {
    let temp = setup_project();
    write(
        temp.path(),
        "dag/energy.yml",
        "steps:\n  garden://ember/2023-12-12/electricity:\n  meadow://wb/2024-10-07/pip:\n",
    );

    let err = load_dag(&temp.path().join("dag/main.yml"), temp.path()).unwrap_err();
    assert!(matches!(err, StepGraphError::DuplicateStep { .. }));
}

#[test]
fn project_config_is_optional() {
    let temp = TempDir::new().unwrap();
    let config = load_project_config(temp.path()).unwrap();
    assert_eq!(config.settings.default_output, OutputMode::Verbose);
    assert_eq!(
        resolve_state_path(temp.path(), &config),
        temp.path().join(".stepgraph/state.yml")
    );
}

#[test]
fn completion_state_drives_incremental_plans() {
    let temp = setup_project();
    let dag = load_dag(&temp.path().join("dag/main.yml"), temp.path()).unwrap();
    let graph = dag.to_graph(UnknownDependencyMode::Strict).unwrap();
    let state_path = temp.path().join(".stepgraph/state.yml");
    let target = "garden://wb/2024-10-07/pip";

    let mut store = CompletionStore::load(&state_path).unwrap();
    let first = plan(
        &graph,
        &PlanRequest::new([target]).with_satisfied(satisfied_steps(&graph, &store.view(&graph))),
    )
    .unwrap();
    assert_eq!(first.len(), 3);

    PlanRunner::new(&graph)
        .with_store(&mut store)
        .run(&first, &mut DryRunExecutor::new(), |_| {})
        .unwrap();
    store.save(&state_path).unwrap();

    let store = CompletionStore::load(&state_path).unwrap();
    let second = plan(
        &graph,
        &PlanRequest::new([target]).with_satisfied(satisfied_steps(&graph, &store.view(&graph))),
    )
    .unwrap();
    assert!(second.is_empty());
}
