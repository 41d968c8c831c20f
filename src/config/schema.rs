//! Configuration schema definitions for stepgraph.
//!
//! This module contains the struct definitions that map to the DAG file
//! format and to the project configuration in `.stepgraph/config.yml`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::runner::{UnknownDependencyMode, UnknownTargetMode};

/// A DAG file.
///
/// ```yaml
/// steps:
///   meadow://wb/2024-10-07/pip:
///     - snapshot://wb/2024-10-07/pip.csv
///   garden://wb/2024-10-07/pip:
///     - meadow://wb/2024-10-07/pip
/// include:
///   - dag/energy.yml
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
#[schemars(title = "stepgraph DAG file")]
pub struct DagFile {
    /// Map of step identifier to the identifiers it depends on.
    ///
    /// A step with no dependencies may use `null` or an empty list.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub steps: BTreeMap<String, Option<Vec<String>>>,

    /// Further DAG files, relative to the project root.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<PathBuf>,
}

/// Project configuration in `.stepgraph/config.yml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Root DAG file, relative to the project root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dag: Option<PathBuf>,

    /// Completion store, relative to the project root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,

    /// Command run for each step by `stepgraph run`. `{step}` is replaced by
    /// the step identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_command: Option<String>,

    /// Global settings
    pub settings: Settings,
}

/// Settings that apply to every command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default output mode: verbose, quiet, silent
    pub default_output: OutputMode,

    /// Treatment of undeclared non-snapshot dependencies
    pub unknown_dependencies: UnknownDependencyMode,

    /// Treatment of targets that are not in the DAG
    pub unknown_targets: UnknownTargetMode,
}

/// Output verbosity as configured in YAML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Verbose,
    Quiet,
    Silent,
}

/// JSON Schema for DAG files.
pub fn dag_json_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(DagFile);
    serde_json::to_value(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dag_file_parses_steps_and_includes() {
        let yaml = r#"
steps:
  meadow://wb/2024-10-07/pip:
    - snapshot://wb/2024-10-07/pip.csv
  garden://wb/2024-10-07/pip:
    - meadow://wb/2024-10-07/pip
include:
  - dag/energy.yml
"#;
        let dag: DagFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(dag.steps.len(), 2);
        assert_eq!(dag.include, vec![PathBuf::from("dag/energy.yml")]);
        assert_eq!(
            dag.steps["garden://wb/2024-10-07/pip"],
            Some(vec!["meadow://wb/2024-10-07/pip".to_string()])
        );
    }

    #[test]
    fn dag_file_accepts_null_dependencies() {
        let yaml = "steps:\n  garden://demo/latest/a:\n";
        let dag: DagFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(dag.steps["garden://demo/latest/a"], None);
    }

    #[test]
    fn dag_file_rejects_unknown_keys() {
        let yaml = "stepz:\n  garden://demo/latest/a: []\n";
        assert!(serde_yaml::from_str::<DagFile>(yaml).is_err());
    }

    #[test]
    fn empty_dag_file_is_default() {
        let dag: DagFile = serde_yaml::from_str("{}").unwrap();
        assert_eq!(dag, DagFile::default());
    }

    #[test]
    fn project_config_defaults() {
        let config: ProjectConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.dag.is_none());
        assert!(config.run_command.is_none());
        assert_eq!(config.settings.default_output, OutputMode::Verbose);
        assert_eq!(
            config.settings.unknown_dependencies,
            UnknownDependencyMode::Strict
        );
        assert_eq!(config.settings.unknown_targets, UnknownTargetMode::FailFast);
    }

    #[test]
    fn project_config_parses_settings() {
        let yaml = r#"
dag: pipeline/dag.yml
run_command: etl run {step}
settings:
  default_output: quiet
  unknown_dependencies: lenient
  unknown_targets: best_effort
"#;
        let config: ProjectConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.dag, Some(PathBuf::from("pipeline/dag.yml")));
        assert_eq!(config.run_command.as_deref(), Some("etl run {step}"));
        assert_eq!(config.settings.default_output, OutputMode::Quiet);
        assert_eq!(
            config.settings.unknown_dependencies,
            UnknownDependencyMode::Lenient
        );
        assert_eq!(
            config.settings.unknown_targets,
            UnknownTargetMode::BestEffort
        );
    }

    #[test]
    fn dag_schema_describes_steps_and_include() {
        let schema = dag_json_schema();
        assert_eq!(schema["title"], "stepgraph DAG file");
        assert!(schema["properties"]["steps"].is_object());
        assert!(schema["properties"]["include"].is_object());
    }
}
