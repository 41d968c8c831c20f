//! Malformed identifier detection.

use crate::config::LoadedDag;
use crate::lint::{LintDiagnostic, LintRule, RuleId, Severity};
use crate::steps::StepUri;

/// Detects step keys and dependencies that are not valid step identifiers.
pub struct MalformedStepRule;

impl LintRule for MalformedStepRule {
    fn id(&self) -> RuleId {
        RuleId::new("malformed-step")
    }

    fn name(&self) -> &str {
        "Malformed Step"
    }

    fn description(&self) -> &str {
        "Ensures every identifier follows scheme://namespace/version/name"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, dag: &LoadedDag) -> Vec<LintDiagnostic> {
        let mut diagnostics = Vec::new();

        for (step, deps) in &dag.steps {
            let file = dag.sources.get(step).cloned();

            if let Err(err) = StepUri::parse(step) {
                diagnostics.push(
                    LintDiagnostic::new(self.id(), self.default_severity(), err.to_string())
                        .with_step(step)
                        .with_file(file.clone()),
                );
            }

            for dep in deps {
                if let Err(err) = StepUri::parse(dep) {
                    diagnostics.push(
                        LintDiagnostic::new(
                            self.id(),
                            self.default_severity(),
                            format!("Dependency of '{}': {}", step, err),
                        )
                        .with_step(step)
                        .with_file(file.clone()),
                    );
                }
            }
        }

        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::rules::dag;

    #[test]
    fn detects_malformed_key() {
        let dag = dag(&[("garden/wb/latest/pip", &[])]);
        let diagnostics = MalformedStepRule.check(&dag);

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("garden/wb/latest/pip"));
        assert_eq!(diagnostics[0].step.as_deref(), Some("garden/wb/latest/pip"));
    }

    #[test]
    fn detects_malformed_dependency() {
        let dag = dag(&[("garden://wb/latest/pip", &["meadow://wb/pip"])]);
        let diagnostics = MalformedStepRule.check(&dag);

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("meadow://wb/pip"));
        assert!(diagnostics[0].message.contains("garden://wb/latest/pip"));
    }

    #[test]
    fn accepts_well_formed_identifiers() {
        let dag = dag(&[
            ("meadow://wb/2024-10-07/pip", &["snapshot://wb/2024-10-07/pip.csv"]),
            ("data://garden/wb/2024/pip", &["meadow://wb/2024-10-07/pip"]),
        ]);
        assert!(MalformedStepRule.check(&dag).is_empty());
    }
}
