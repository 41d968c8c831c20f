//! Integration tests for the stepgraph binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const PIPELINE_DAG: &str = r#"
steps:
  meadow://wb/2024-10-07/pip:
    - snapshot://wb/2024-10-07/pip.csv
  garden://wb/2024-10-07/pip:
    - meadow://wb/2024-10-07/pip
  grapher://wb/2024-10-07/pip:
    - garden://wb/2024-10-07/pip
  garden://ember/2023-12-12/electricity:
"#;

fn setup_project(dag: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join(".stepgraph")).unwrap();
    fs::create_dir_all(temp.path().join("dag")).unwrap();
    fs::write(temp.path().join("dag/main.yml"), dag).unwrap();
    temp
}

fn stepgraph(temp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("stepgraph"));
    cmd.current_dir(temp.path());
    cmd.env_remove("STEPGRAPH_DAG");
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("stepgraph"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Dependency resolution"))
        .stdout(predicate::str::contains("plan"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("stepgraph"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_requires_subcommand() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("stepgraph"));
    cmd.assert().failure();
    Ok(())
}

#[test]
fn plan_prints_steps_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(PIPELINE_DAG);
    let output = stepgraph(&temp)
        .args(["plan", "grapher://wb/2024-10-07/pip"])
        .output()?;

    assert!(output.status.success());
    insta::assert_snapshot!(String::from_utf8(output.stdout)?, @r"
    snapshot://wb/2024-10-07/pip.csv
    meadow://wb/2024-10-07/pip
    garden://wb/2024-10-07/pip
    grapher://wb/2024-10-07/pip
    ");
    Ok(())
}

#[test]
fn plan_prints_waves() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(PIPELINE_DAG);
    stepgraph(&temp)
        .args(["plan", "--waves", "--satisfied", "snapshot://wb/2024-10-07/pip.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "wave 1:\n  garden://ember/2023-12-12/electricity\n  meadow://wb/2024-10-07/pip\n",
        ))
        .stdout(predicate::str::contains("wave 3:\n  grapher://wb/2024-10-07/pip"));
    Ok(())
}

#[test]
fn plan_json_output() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(PIPELINE_DAG);
    let output = stepgraph(&temp)
        .args(["plan", "--json", "--match", "ember"])
        .output()?;

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(
        json["steps"],
        serde_json::json!(["garden://ember/2023-12-12/electricity"])
    );
    assert_eq!(json["unknown_targets"], serde_json::json!([]));
    assert_eq!(json["fingerprint"].as_str().map(str::len), Some(64));
    Ok(())
}

#[test]
fn plan_unknown_target_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(PIPELINE_DAG);
    stepgraph(&temp)
        .args(["plan", "garden://nope/latest/missing"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown target: garden://nope/latest/missing"));
    Ok(())
}

#[test]
fn plan_best_effort_reports_unknown_target() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(PIPELINE_DAG);
    stepgraph(&temp)
        .args([
            "plan",
            "--best-effort",
            "garden://nope/latest/missing",
            "meadow://wb/2024-10-07/pip",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("meadow://wb/2024-10-07/pip"))
        .stderr(predicate::str::contains("Unknown target"));
    Ok(())
}

#[test]
fn plan_cycle_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(
        "steps:\n  garden://demo/latest/x:\n    - garden://demo/latest/y\n  garden://demo/latest/y:\n    - garden://demo/latest/x\n",
    );
    stepgraph(&temp)
        .args(["plan", "garden://demo/latest/x"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Cyclic dependency detected"));
    Ok(())
}

#[test]
fn missing_dag_exits_with_code_2() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    fs::create_dir_all(temp.path().join(".stepgraph"))?;
    stepgraph(&temp)
        .arg("plan")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("DAG file not found"));
    Ok(())
}

#[test]
fn dag_flag_selects_another_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(PIPELINE_DAG);
    fs::write(
        temp.path().join("other.yml"),
        "steps:\n  garden://other/latest/only:\n",
    )?;
    stepgraph(&temp)
        .args(["--dag", "other.yml", "plan"])
        .assert()
        .success()
        .stdout("garden://other/latest/only\n");
    Ok(())
}

#[test]
fn lint_clean_dag_succeeds() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(PIPELINE_DAG);
    stepgraph(&temp)
        .arg("lint")
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"));
    Ok(())
}

#[test]
fn lint_reports_errors() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(
        "steps:\n  garden://demo/latest/a:\n    - garden://demo/latest/a\n  garden://demo/latest/b:\n    - meadow://demo/latest/missing\n",
    );
    stepgraph(&temp)
        .arg("lint")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("self-dependency"))
        .stdout(predicate::str::contains("undefined-dependency"));
    Ok(())
}

#[test]
fn lint_json_output() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project("steps:\n  not-a-step:\n");
    let output = stepgraph(&temp).args(["lint", "--format", "json"]).output()?;

    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["diagnostics"][0]["rule_id"], "malformed-step");
    Ok(())
}

#[test]
fn run_dry_run_lists_steps() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(PIPELINE_DAG);
    stepgraph(&temp)
        .args(["run", "--dry-run", "garden://wb/2024-10-07/pip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[1/2] meadow://wb/2024-10-07/pip"))
        .stdout(predicate::str::contains("[2/2] garden://wb/2024-10-07/pip"));

    assert!(!temp.path().join(".stepgraph/state.yml").exists());
    Ok(())
}

#[cfg(unix)]
#[test]
fn run_executes_command_and_records_state() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(PIPELINE_DAG);
    fs::write(
        temp.path().join(".stepgraph/config.yml"),
        "run_command: echo {step} >> ran.txt\n",
    )?;

    stepgraph(&temp)
        .args(["run", "meadow://wb/2024-10-07/pip"])
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(temp.path().join("ran.txt"))?,
        "meadow://wb/2024-10-07/pip\n"
    );

    stepgraph(&temp)
        .args(["plan", "--use-state", "garden://wb/2024-10-07/pip"])
        .assert()
        .success()
        .stdout("garden://wb/2024-10-07/pip\n");
    Ok(())
}

#[test]
fn run_without_command_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(PIPELINE_DAG);
    stepgraph(&temp)
        .args(["run", "meadow://wb/2024-10-07/pip"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No run_command configured"));
    Ok(())
}

#[test]
fn list_prints_all_steps() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(PIPELINE_DAG);
    stepgraph(&temp)
        .args(["list", "--kind", "snapshot"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "snapshot://wb/2024-10-07/pip.csv (external)",
        ));
    Ok(())
}

#[test]
fn schema_prints_json_schema() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let output = stepgraph(&temp).arg("schema").output()?;

    assert!(output.status.success());
    let schema: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(schema["title"], "stepgraph DAG file");
    Ok(())
}

#[test]
fn completions_generates_script() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("stepgraph"));
    cmd.args(["completions", "bash"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("stepgraph"));
    Ok(())
}
