//! Error types for stepgraph operations.
//!
//! This module defines [`StepGraphError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `StepGraphError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `StepGraphError::Other`) for unexpected errors
//! - Every error names the offending identifier, file, or cycle path

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for stepgraph operations.
#[derive(Debug, Error)]
pub enum StepGraphError {
    /// A step identifier does not follow `scheme://namespace/version/name`.
    #[error("Malformed step identifier '{step}': {reason}")]
    MalformedStep { step: String, reason: String },

    /// A dependency has no definition and is not a known leaf scheme.
    #[error("Step '{step}' depends on unknown step '{dependency}'")]
    UnknownDependency { step: String, dependency: String },

    /// The dependency graph contains a cycle.
    #[error("Cyclic dependency detected: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    /// A requested target is not present in the graph.
    #[error("Unknown target: {target}")]
    UnknownTarget { target: String },

    /// The same step is declared by more than one DAG file.
    #[error("Step '{step}' is defined in both {first} and {second}")]
    DuplicateStep {
        step: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// DAG file not found at the expected location.
    #[error("DAG file not found: {path}")]
    DagNotFound { path: PathBuf },

    /// Failed to parse a DAG file, the project config, or the state file.
    #[error("Failed to parse {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// The step executor reported a failure.
    #[error("Step '{step}' failed: {message}")]
    StepExecution { step: String, message: String },

    /// Shell command could not be started.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StepGraphError {
    /// Identifier the error is about, when there is one.
    pub fn step(&self) -> Option<&str> {
        match self {
            Self::MalformedStep { step, .. }
            | Self::UnknownDependency { step, .. }
            | Self::DuplicateStep { step, .. }
            | Self::StepExecution { step, .. } => Some(step),
            Self::UnknownTarget { target } => Some(target),
            Self::CyclicDependency { cycle } => cycle.first().map(String::as_str),
            _ => None,
        }
    }
}

/// Result type alias for stepgraph operations.
pub type Result<T> = std::result::Result<T, StepGraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_step_displays_step_and_reason() {
        let err = StepGraphError::MalformedStep {
            step: "garden//2024".into(),
            reason: "missing scheme".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("garden//2024"));
        assert!(msg.contains("missing scheme"));
    }

    #[test]
    fn unknown_dependency_displays_both_steps() {
        let err = StepGraphError::UnknownDependency {
            step: "garden://wb/2024-01-01/pip".into(),
            dependency: "meadow://wb/2024-01-01/pip".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("garden://wb/2024-01-01/pip"));
        assert!(msg.contains("meadow://wb/2024-01-01/pip"));
    }

    #[test]
    fn cyclic_dependency_displays_cycle() {
        let err = StepGraphError::CyclicDependency {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Cyclic dependency detected: a -> b -> a");
    }

    #[test]
    fn unknown_target_displays_target() {
        let err = StepGraphError::UnknownTarget { target: "Z".into() };
        assert_eq!(err.to_string(), "Unknown target: Z");
    }

    #[test]
    fn duplicate_step_displays_both_files() {
        let err = StepGraphError::DuplicateStep {
            step: "garden://a/latest/b".into(),
            first: PathBuf::from("dag/main.yml"),
            second: PathBuf::from("dag/energy.yml"),
        };
        let msg = err.to_string();
        assert!(msg.contains("dag/main.yml"));
        assert!(msg.contains("dag/energy.yml"));
    }

    #[test]
    fn command_failed_displays_command_and_code() {
        let err = StepGraphError::CommandFailed {
            command: "etl run".into(),
            code: Some(1),
        };
        let msg = err.to_string();
        assert!(msg.contains("etl run"));
        assert!(msg.contains("1"));
    }

    #[test]
    fn dag_not_found_displays_path() {
        let err = StepGraphError::DagNotFound {
            path: PathBuf::from("/foo/dag/main.yml"),
        };
        assert!(err.to_string().contains("/foo/dag/main.yml"));
    }

    #[test]
    fn parse_error_names_the_file_not_the_dag() {
        let err = StepGraphError::ParseError {
            path: PathBuf::from(".stepgraph/state.yml"),
            message: "invalid type".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse .stepgraph/state.yml: invalid type"
        );
    }

    #[test]
    fn step_accessor_returns_offending_identifier() {
        let err = StepGraphError::UnknownTarget { target: "Z".into() };
        assert_eq!(err.step(), Some("Z"));

        let err = StepGraphError::CyclicDependency {
            cycle: vec!["x".into(), "y".into(), "x".into()],
        };
        assert_eq!(err.step(), Some("x"));

        let err = StepGraphError::ConfigValidationError {
            message: "bad".into(),
        };
        assert_eq!(err.step(), None);
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: StepGraphError = io_err.into();
        assert!(matches!(err, StepGraphError::Io(_)));
    }
}
