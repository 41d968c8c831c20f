//! Dependency graph for step execution ordering.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StepGraphError};
use crate::steps::{Step, StepUri};

/// How to treat a dependency that has no definition and is not a leaf scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownDependencyMode {
    /// Fail graph construction.
    #[default]
    Strict,
    /// Keep the dependency as an external leaf and log a warning.
    Lenient,
}

/// Represents the dependency relationships between steps.
///
/// Built once per invocation and read-only afterwards. Ordered maps keep
/// every traversal independent of declaration order.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Map of step identifier to step.
    steps: BTreeMap<String, Step>,
    /// Map of step identifier to steps that depend on it.
    dependents: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    /// Create a new dependency graph builder.
    pub fn builder() -> DependencyGraphBuilder {
        DependencyGraphBuilder::new()
    }

    /// Get a step by identifier.
    pub fn get(&self, step: &str) -> Option<&Step> {
        self.steps.get(step)
    }

    /// Get the direct dependencies of a step.
    pub fn dependencies_of(&self, step: &str) -> Option<&BTreeSet<String>> {
        self.steps.get(step).map(Step::dependencies)
    }

    /// Get steps that depend on the given step.
    pub fn dependents_of(&self, step: &str) -> Option<&BTreeSet<String>> {
        self.dependents.get(step)
    }

    /// Check if a step exists in the graph.
    pub fn contains(&self, step: &str) -> bool {
        self.steps.contains_key(step)
    }

    /// Iterate over all steps in identifier order.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.values()
    }

    /// Iterate over all identifiers in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.steps.keys().map(String::as_str)
    }

    /// Get the number of steps in the graph, external leaves included.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Get all transitive dependencies of a step.
    pub fn transitive_dependencies(&self, step: &str) -> BTreeSet<String> {
        let mut result = BTreeSet::new();
        let mut to_visit = vec![step.to_string()];

        while let Some(current) = to_visit.pop() {
            if let Some(deps) = self.dependencies_of(&current) {
                for dep in deps {
                    if result.insert(dep.clone()) {
                        to_visit.push(dep.clone());
                    }
                }
            }
        }

        result
    }

    /// Get all transitive dependents of a step.
    ///
    /// Returns steps that depend on the given step, directly or indirectly.
    pub fn transitive_dependents(&self, step: &str) -> BTreeSet<String> {
        let mut result = BTreeSet::new();
        let mut to_visit = vec![step.to_string()];

        while let Some(current) = to_visit.pop() {
            if let Some(dependents) = self.dependents.get(&current) {
                for dep in dependents {
                    if result.insert(dep.clone()) {
                        to_visit.push(dep.clone());
                    }
                }
            }
        }

        result
    }

    /// Find a cycle anywhere in the graph, returning the path if one exists.
    ///
    /// The path starts and ends with the same step.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let all: BTreeSet<String> = self.steps.keys().cloned().collect();
        self.find_cycle_within(&all)
    }

    /// Find a cycle among `nodes`, ignoring edges that leave the set.
    pub fn find_cycle_within(&self, nodes: &BTreeSet<String>) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            Unvisited,
            Visiting,
            Visited,
        }

        fn dfs<'a>(
            node: &'a str,
            graph: &'a DependencyGraph,
            nodes: &BTreeSet<String>,
            state: &mut BTreeMap<&'a str, State>,
            path: &mut Vec<&'a str>,
        ) -> Option<Vec<String>> {
            state.insert(node, State::Visiting);
            path.push(node);

            if let Some(deps) = graph.dependencies_of(node) {
                for dep in deps.iter().filter(|d| nodes.contains(*d)) {
                    match state.get(dep.as_str()).copied() {
                        Some(State::Visiting) => {
                            let start = path.iter().position(|s| *s == dep.as_str())?;
                            let mut cycle: Vec<String> =
                                path[start..].iter().map(|s| s.to_string()).collect();
                            cycle.push(dep.clone());
                            return Some(cycle);
                        }
                        Some(State::Unvisited) | None => {
                            if let Some(cycle) = dfs(dep, graph, nodes, state, path) {
                                return Some(cycle);
                            }
                        }
                        Some(State::Visited) => {}
                    }
                }
            }

            path.pop();
            state.insert(node, State::Visited);
            None
        }

        let mut state: BTreeMap<&str, State> = nodes
            .iter()
            .map(|s| (s.as_str(), State::Unvisited))
            .collect();
        let mut path: Vec<&str> = Vec::new();

        for step in nodes {
            if state.get(step.as_str()) == Some(&State::Unvisited) {
                if let Some(cycle) = dfs(step, self, nodes, &mut state, &mut path) {
                    return Some(cycle);
                }
            }
        }

        None
    }
}

/// Build a graph from a raw `identifier -> dependencies` mapping.
pub fn build_graph<I>(raw: I, mode: UnknownDependencyMode) -> Result<DependencyGraph>
where
    I: IntoIterator<Item = (String, Vec<String>)>,
{
    raw.into_iter()
        .fold(DependencyGraph::builder().mode(mode), |builder, (step, deps)| {
            builder.add_step(step, deps)
        })
        .build()
}

/// Builder for constructing a DependencyGraph.
#[derive(Debug, Default)]
pub struct DependencyGraphBuilder {
    dependencies: BTreeMap<String, BTreeSet<String>>,
    mode: UnknownDependencyMode,
}

impl DependencyGraphBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how undefined dependencies are handled.
    pub fn mode(mut self, mode: UnknownDependencyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Add a step with its dependencies.
    pub fn add_step(mut self, name: impl Into<String>, depends_on: Vec<String>) -> Self {
        self.dependencies
            .entry(name.into())
            .or_default()
            .extend(depends_on);
        self
    }

    /// Build the dependency graph.
    ///
    /// Every identifier must parse. Dependencies without a definition become
    /// external leaves when they use a leaf scheme (or in lenient mode);
    /// otherwise construction fails.
    pub fn build(self) -> Result<DependencyGraph> {
        let mut steps: BTreeMap<String, Step> = BTreeMap::new();

        for (name, deps) in &self.dependencies {
            let uri = StepUri::parse(name)?;
            steps.insert(name.clone(), Step::new(uri, deps.clone()));
        }

        let mut external: BTreeMap<String, Step> = BTreeMap::new();
        for (name, deps) in &self.dependencies {
            for dep in deps {
                if steps.contains_key(dep) || external.contains_key(dep) {
                    continue;
                }

                let uri = StepUri::parse(dep)?;
                if uri.kind().is_leaf() {
                    tracing::debug!("Treating '{}' as an external leaf", dep);
                } else if self.mode == UnknownDependencyMode::Lenient {
                    tracing::warn!(
                        "Step '{}' depends on undefined step '{}', treating it as external",
                        name,
                        dep
                    );
                } else {
                    return Err(StepGraphError::UnknownDependency {
                        step: name.clone(),
                        dependency: dep.clone(),
                    });
                }
                external.insert(dep.clone(), Step::external(uri));
            }
        }
        steps.extend(external);

        // Build dependents map (reverse lookup)
        let mut dependents: BTreeMap<String, BTreeSet<String>> = steps
            .keys()
            .map(|name| (name.clone(), BTreeSet::new()))
            .collect();

        for (name, deps) in &self.dependencies {
            for dep in deps {
                dependents
                    .entry(dep.clone())
                    .or_default()
                    .insert(name.clone());
            }
        }

        tracing::debug!("Built dependency graph with {} steps", steps.len());

        Ok(DependencyGraph { steps, dependents })
    }
}
