//! Undefined dependency detection.
//!
//! Snapshot dependencies need no declaration. Any other dependency must be a
//! step of the DAG.

use crate::config::LoadedDag;
use crate::lint::{LintDiagnostic, LintRule, RuleId, Severity};
use crate::steps::StepUri;

/// Detects dependencies on steps that no DAG file declares.
pub struct UndefinedDependencyRule;

impl LintRule for UndefinedDependencyRule {
    fn id(&self) -> RuleId {
        RuleId::new("undefined-dependency")
    }

    fn name(&self) -> &str {
        "Undefined Dependency"
    }

    fn description(&self) -> &str {
        "Ensures every non-snapshot dependency is declared"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, dag: &LoadedDag) -> Vec<LintDiagnostic> {
        let mut diagnostics = Vec::new();

        for (step, deps) in &dag.steps {
            for dep in deps {
                if dag.steps.contains_key(dep) {
                    continue;
                }
                // Malformed identifiers are reported by malformed-step.
                let Ok(uri) = StepUri::parse(dep) else {
                    continue;
                };
                if uri.kind().is_leaf() {
                    continue;
                }

                let mut diag = LintDiagnostic::new(
                    self.id(),
                    self.default_severity(),
                    format!("Step '{}' depends on undefined step '{}'", step, dep),
                )
                .with_step(step)
                .with_file(dag.sources.get(step).cloned());

                if let Some(similar) = other_version(dag, &uri) {
                    diag = diag.with_suggestion(format!("Did you mean '{}'?", similar));
                }
                diagnostics.push(diag);
            }
        }

        diagnostics
    }
}

/// A declared step that differs from `uri` only by version.
fn other_version<'a>(dag: &'a LoadedDag, uri: &StepUri) -> Option<&'a str> {
    dag.steps
        .keys()
        .filter_map(|key| StepUri::parse(key).ok().map(|parsed| (key, parsed)))
        .filter(|(_, parsed)| {
            parsed.kind() == uri.kind()
                && parsed.namespace() == uri.namespace()
                && parsed.name() == uri.name()
        })
        .map(|(key, _)| key.as_str())
        .last()
}
