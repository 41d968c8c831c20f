//! Circular dependency detection.
//!
//! Self-loops are left to the self-dependency rule. Every other cycle is
//! reported once, however many of its members are visited first.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::LoadedDag;
use crate::lint::{LintDiagnostic, LintRule, RuleId, Severity};

/// Detects circular dependencies between steps.
pub struct CircularDependencyRule;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

impl LintRule for CircularDependencyRule {
    fn id(&self) -> RuleId {
        RuleId::new("circular-dependency")
    }

    fn name(&self) -> &str {
        "Circular Dependency"
    }

    fn description(&self) -> &str {
        "Detects circular dependencies between steps"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, dag: &LoadedDag) -> Vec<LintDiagnostic> {
        let mut cycles = Vec::new();
        let mut marks = BTreeMap::new();
        let mut path = Vec::new();

        for step in dag.steps.keys() {
            if !marks.contains_key(step.as_str()) {
                visit(dag, step, &mut marks, &mut path, &mut cycles);
            }
        }

        let mut reported = BTreeSet::new();
        cycles
            .into_iter()
            .filter(|cycle| {
                let members: BTreeSet<&String> = cycle.iter().collect();
                reported.insert(members.into_iter().cloned().collect::<Vec<_>>())
            })
            .map(|cycle| {
                let first = cycle[0].clone();
                LintDiagnostic::new(
                    self.id(),
                    self.default_severity(),
                    format!("Circular dependency detected: {}", cycle.join(" -> ")),
                )
                .with_file(dag.sources.get(&first).cloned())
                .with_step(first)
            })
            .collect()
    }
}

fn visit<'a>(
    dag: &'a LoadedDag,
    step: &'a str,
    marks: &mut BTreeMap<&'a str, Mark>,
    path: &mut Vec<&'a str>,
    cycles: &mut Vec<Vec<String>>,
) {
    marks.insert(step, Mark::InProgress);
    path.push(step);

    if let Some(deps) = dag.steps.get(step) {
        for dep in deps {
            if dep == step {
                continue;
            }
            match marks.get(dep.as_str()) {
                Some(Mark::InProgress) => {
                    if let Some(start) = path.iter().position(|p| *p == dep.as_str()) {
                        let mut cycle: Vec<String> =
                            path[start..].iter().map(|s| s.to_string()).collect();
                        cycle.push(dep.clone());
                        cycles.push(cycle);
                    }
                }
                Some(Mark::Done) => {}
                None => visit(dag, dep, marks, path, cycles),
            }
        }
    }

    path.pop();
    marks.insert(step, Mark::Done);
}
