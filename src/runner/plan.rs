//! Execution planning over a dependency graph.
//!
//! [`plan`] turns a [`DependencyGraph`] and a [`PlanRequest`] into an
//! [`ExecutionPlan`]: the requested targets plus everything they transitively
//! depend on, minus steps already satisfied, in dependency order. The plan
//! is also partitioned into waves of mutually independent steps so that an
//! executor can run each wave concurrently.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Result, StepGraphError};

use super::dependency::DependencyGraph;

/// What to do when a requested target is not in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTargetMode {
    /// Fail the whole plan on the first unknown target.
    #[default]
    FailFast,
    /// Record unknown targets on the plan and plan the rest.
    BestEffort,
}

/// Input to [`plan`].
#[derive(Debug, Clone, Default)]
pub struct PlanRequest {
    /// Steps to produce. Empty means every step in the graph.
    pub targets: BTreeSet<String>,
    /// Steps considered complete. They are not planned and not traversed.
    pub satisfied: BTreeSet<String>,
    /// Plan only the targets themselves, without their dependencies.
    pub only_targets: bool,
    /// Handling of targets missing from the graph.
    pub unknown_targets: UnknownTargetMode,
}

impl PlanRequest {
    /// Create a request for the given targets.
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Mark steps as already satisfied.
    pub fn with_satisfied<I, S>(mut self, satisfied: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.satisfied.extend(satisfied.into_iter().map(Into::into));
        self
    }

    /// Plan the targets without expanding their dependencies.
    pub fn only_targets(mut self, only: bool) -> Self {
        self.only_targets = only;
        self
    }

    /// Set how unknown targets are handled.
    pub fn unknown_targets(mut self, mode: UnknownTargetMode) -> Self {
        self.unknown_targets = mode;
        self
    }
}

/// An ordered, wave-partitioned list of steps to run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionPlan {
    /// Every planned step, each after all of its dependencies.
    pub steps: Vec<String>,
    /// The same steps grouped into waves; each wave is sorted.
    pub waves: Vec<Vec<String>>,
    /// Targets that were not found (best-effort mode only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown_targets: Vec<String>,
}

impl ExecutionPlan {
    /// Number of planned steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Check whether a step is part of the plan.
    pub fn contains(&self, step: &str) -> bool {
        self.steps.iter().any(|s| s == step)
    }

    /// Position of a step in the flat order.
    pub fn position(&self, step: &str) -> Option<usize> {
        self.steps.iter().position(|s| s == step)
    }

    /// SHA-256 of the flat order, for comparing plans across runs.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for step in &self.steps {
            hasher.update(step.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}

/// Compute an execution plan.
///
/// Pure function of its inputs: identical graphs and requests always yield
/// identical plans, regardless of declaration order.
///
/// # Errors
///
/// - [`StepGraphError::UnknownTarget`] when a target is missing and the
///   request is fail-fast
/// - [`StepGraphError::CyclicDependency`] when the graph contains a cycle,
///   whether or not the targets reach it
pub fn plan(graph: &DependencyGraph, request: &PlanRequest) -> Result<ExecutionPlan> {
    // Satisfied steps must not hide a cycle, so the whole graph is checked.
    if let Some(cycle) = graph.find_cycle() {
        return Err(StepGraphError::CyclicDependency { cycle });
    }

    let mut unknown_targets = Vec::new();
    let mut roots: BTreeSet<&str> = BTreeSet::new();

    if request.targets.is_empty() {
        roots.extend(graph.ids());
    } else {
        for target in &request.targets {
            if graph.contains(target) {
                roots.insert(target.as_str());
                continue;
            }
            match request.unknown_targets {
                UnknownTargetMode::FailFast => {
                    return Err(StepGraphError::UnknownTarget {
                        target: target.clone(),
                    });
                }
                UnknownTargetMode::BestEffort => {
                    tracing::warn!("Skipping unknown target '{}'", target);
                    unknown_targets.push(target.clone());
                }
            }
        }
    }

    let selected = if request.only_targets {
        roots
            .iter()
            .filter(|s| !request.satisfied.contains(**s))
            .map(|s| s.to_string())
            .collect()
    } else {
        reachable(graph, &roots, &request.satisfied)
    };

    let steps = ordered(graph, &selected);
    let waves = waves(graph, &selected, &steps);

    tracing::debug!(
        "Planned {} step(s) in {} wave(s) from {} target(s)",
        steps.len(),
        waves.len(),
        roots.len()
    );

    Ok(ExecutionPlan {
        steps,
        waves,
        unknown_targets,
    })
}

/// Targets plus everything they depend on, never entering satisfied steps.
fn reachable(
    graph: &DependencyGraph,
    roots: &BTreeSet<&str>,
    satisfied: &BTreeSet<String>,
) -> BTreeSet<String> {
    let mut result = BTreeSet::new();
    let mut to_visit: Vec<&str> = roots
        .iter()
        .copied()
        .filter(|s| !satisfied.contains(*s))
        .collect();

    while let Some(current) = to_visit.pop() {
        if !result.insert(current.to_string()) {
            continue;
        }
        if let Some(deps) = graph.dependencies_of(current) {
            for dep in deps {
                if !satisfied.contains(dep) && !result.contains(dep) {
                    to_visit.push(dep);
                }
            }
        }
    }

    result
}

/// Kahn's algorithm over `selected`, always taking the smallest ready step.
///
/// The graph must be acyclic.
fn ordered(graph: &DependencyGraph, selected: &BTreeSet<String>) -> Vec<String> {
    let mut in_degree: BTreeMap<&str, usize> = selected
        .iter()
        .map(|step| (step.as_str(), pending_dependencies(graph, step, selected).count()))
        .collect();

    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, &degree)| degree == 0)
        .map(|(step, _)| *step)
        .collect();

    let mut result = Vec::with_capacity(selected.len());

    while let Some(step) = ready.pop_first() {
        result.push(step.to_string());

        if let Some(dependents) = graph.dependents_of(step) {
            for dependent in dependents {
                if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(dependent.as_str());
                    }
                }
            }
        }
    }

    result
}

/// Group `order` by depth: a step's wave is one past its deepest dependency.
fn waves(graph: &DependencyGraph, selected: &BTreeSet<String>, order: &[String]) -> Vec<Vec<String>> {
    let mut depth: BTreeMap<&str, usize> = BTreeMap::new();
    let mut grouped: BTreeMap<usize, Vec<String>> = BTreeMap::new();

    for step in order {
        let level = pending_dependencies(graph, step, selected)
            .filter_map(|dep| depth.get(dep.as_str()))
            .map(|d| d + 1)
            .max()
            .unwrap_or(0);
        depth.insert(step.as_str(), level);
        grouped.entry(level).or_default().push(step.clone());
    }

    grouped
        .into_values()
        .map(|mut wave| {
            wave.sort();
            wave
        })
        .collect()
}

fn pending_dependencies<'a>(
    graph: &'a DependencyGraph,
    step: &str,
    selected: &'a BTreeSet<String>,
) -> impl Iterator<Item = &'a String> {
    graph
        .dependencies_of(step)
        .into_iter()
        .flatten()
        .filter(move |dep| selected.contains(*dep))
}
