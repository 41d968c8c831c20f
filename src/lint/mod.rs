//! DAG validation and linting.
//!
//! Unlike graph construction, which stops at the first problem, linting
//! runs every rule over the raw step mapping and reports all issues.
//!
//! - **Rules** - Individual validation checks ([`LintRule`] trait)
//! - **Registry** - Collection of all available rules ([`RuleRegistry`])
//! - **Diagnostics** - Issue reports with severity and suggestions ([`LintDiagnostic`])
//!
//! # Example
//!
//! ```
//! use stepgraph::config::LoadedDag;
//! use stepgraph::lint::{lint_dag, RuleRegistry, Severity};
//!
//! let mut dag = LoadedDag::default();
//! dag.steps.insert(
//!     "garden://wb/latest/pip".to_string(),
//!     vec!["garden://wb/latest/pip".to_string()],
//! );
//!
//! let diagnostics = lint_dag(&RuleRegistry::with_builtins(), &dag);
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].severity, Severity::Error);
//! ```

pub mod diagnostic;
pub mod output;
pub mod registry;
pub mod rule;
pub mod rules;

pub use diagnostic::LintDiagnostic;
pub use output::{HumanFormatter, JsonFormatter, LintFormatter, OutputFormat};
pub use registry::RuleRegistry;
pub use rule::{LintRule, RuleId, Severity};
pub use rules::{
    CircularDependencyRule, MalformedStepRule, SelfDependencyRule, UndefinedDependencyRule,
};

use crate::config::LoadedDag;

/// Run every registered rule over `dag`.
///
/// Diagnostics are ordered by rule id, then by the order each rule emits.
pub fn lint_dag(registry: &RuleRegistry, dag: &LoadedDag) -> Vec<LintDiagnostic> {
    let mut diagnostics = Vec::new();
    for rule in registry.iter() {
        let found = rule.check(dag);
        tracing::debug!("Rule {} reported {} issue(s)", rule.id(), found.len());
        diagnostics.extend(found);
    }
    diagnostics
}

/// Whether any diagnostic is an error.
pub fn has_errors(diagnostics: &[LintDiagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == Severity::Error)
}
