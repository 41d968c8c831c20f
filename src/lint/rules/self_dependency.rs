//! Self-dependency detection.

use crate::config::LoadedDag;
use crate::lint::{LintDiagnostic, LintRule, RuleId, Severity};

/// Detects steps that list themselves as a dependency.
pub struct SelfDependencyRule;

impl LintRule for SelfDependencyRule {
    fn id(&self) -> RuleId {
        RuleId::new("self-dependency")
    }

    fn name(&self) -> &str {
        "Self Dependency"
    }

    fn description(&self) -> &str {
        "Detects steps that depend on themselves"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, dag: &LoadedDag) -> Vec<LintDiagnostic> {
        dag.steps
            .iter()
            .filter(|(step, deps)| deps.iter().any(|d| d == *step))
            .map(|(step, _)| {
                LintDiagnostic::new(
                    self.id(),
                    self.default_severity(),
                    format!("Step '{}' depends on itself", step),
                )
                .with_step(step)
                .with_file(dag.sources.get(step).cloned())
                .with_suggestion(format!("Remove '{}' from its own dependency list", step))
            })
            .collect()
    }
}
