//! Target selection.
//!
//! Turns user-supplied target patterns into exact step identifiers before
//! planning. Patterns that match nothing are passed through unchanged so
//! that planning reports them as unknown targets.

use std::collections::BTreeSet;

use super::dependency::DependencyGraph;
use super::plan::{PlanRequest, UnknownTargetMode};

/// How target patterns are compared with identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetMatch {
    /// Pattern must equal the identifier.
    #[default]
    Exact,
    /// Pattern may appear anywhere in the identifier.
    Substring,
}

/// A selection of targets as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct TargetSelection {
    /// Target patterns. Empty selects every step.
    pub patterns: Vec<String>,
    /// How patterns are matched.
    pub matching: TargetMatch,
    /// Also select every step that transitively depends on a selected target.
    pub downstream: bool,
    /// Substring patterns of steps to treat as satisfied.
    pub exclude: Vec<String>,
}

/// Result of resolving a [`TargetSelection`] against a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedTargets {
    /// Identifiers to plan, plus any patterns that matched nothing.
    pub targets: BTreeSet<String>,
    /// Identifiers matched by an exclude pattern.
    pub excluded: BTreeSet<String>,
}

impl SelectedTargets {
    /// Build a plan request from the selection.
    pub fn into_request(
        self,
        satisfied: BTreeSet<String>,
        unknown_targets: UnknownTargetMode,
    ) -> PlanRequest {
        PlanRequest {
            targets: self.targets,
            satisfied: satisfied.into_iter().chain(self.excluded).collect(),
            only_targets: false,
            unknown_targets,
        }
    }
}

impl TargetSelection {
    /// Create a selection of exact identifiers.
    pub fn exact<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: targets.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Resolve the selection against a graph.
    pub fn resolve(&self, graph: &DependencyGraph) -> SelectedTargets {
        let mut targets = BTreeSet::new();

        for pattern in &self.patterns {
            let matched: Vec<&str> = match self.matching {
                TargetMatch::Exact => graph.ids().filter(|id| *id == pattern.as_str()).collect(),
                TargetMatch::Substring => graph
                    .ids()
                    .filter(|id| id.contains(pattern.as_str()))
                    .collect(),
            };

            if matched.is_empty() {
                tracing::debug!("Pattern '{}' matched no steps", pattern);
                targets.insert(pattern.clone());
            } else {
                tracing::debug!("Pattern '{}' matched {} step(s)", pattern, matched.len());
                targets.extend(matched.into_iter().map(String::from));
            }
        }

        if self.downstream {
            let downstream: Vec<String> = targets
                .iter()
                .flat_map(|target| graph.transitive_dependents(target))
                .collect();
            targets.extend(downstream);
        }

        let excluded = graph
            .ids()
            .filter(|id| self.exclude.iter().any(|p| id.contains(p.as_str())))
            .map(String::from)
            .collect();

        SelectedTargets { targets, excluded }
    }
}
