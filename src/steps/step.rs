//! Resolved step definitions.

use std::collections::BTreeSet;

use super::uri::{StepKind, StepUri};

/// A single step in the dependency graph.
///
/// Steps are immutable once the graph is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    uri: StepUri,
    dependencies: BTreeSet<String>,
    external: bool,
}

impl Step {
    /// Create a declared step.
    pub fn new(uri: StepUri, dependencies: BTreeSet<String>) -> Self {
        Self {
            uri,
            dependencies,
            external: false,
        }
    }

    /// Create an external leaf: referenced as a dependency but never declared.
    pub fn external(uri: StepUri) -> Self {
        Self {
            uri,
            dependencies: BTreeSet::new(),
            external: true,
        }
    }

    pub fn id(&self) -> &str {
        self.uri.as_str()
    }

    pub fn uri(&self) -> &StepUri {
        &self.uri
    }

    pub fn kind(&self) -> StepKind {
        self.uri.kind()
    }

    /// Direct dependency identifiers, sorted.
    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    /// True when the step was not declared in any DAG file.
    pub fn is_external(&self) -> bool {
        self.external
    }

    /// True when the step has no dependencies.
    pub fn is_leaf(&self) -> bool {
        self.dependencies.is_empty()
    }
}
