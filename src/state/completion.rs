//! Completion state for incremental planning.
//!
//! The [`CompletionOracle`] trait answers "is this step already satisfied?"
//! for the planner. [`CompletionStore`] is the persisted implementation: it
//! remembers when each step last completed and which dependencies it had at
//! the time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::error::{Result, StepGraphError};
use crate::runner::DependencyGraph;
use crate::steps::Step;

/// Answers whether a step's output already exists and is up to date.
pub trait CompletionOracle {
    /// Whether the step can be skipped.
    fn is_satisfied(&self, step: &str) -> bool;
}

impl CompletionOracle for BTreeSet<String> {
    fn is_satisfied(&self, step: &str) -> bool {
        self.contains(step)
    }
}

/// Collect every step in the graph the oracle reports as satisfied.
pub fn satisfied_steps(graph: &DependencyGraph, oracle: &dyn CompletionOracle) -> BTreeSet<String> {
    graph
        .ids()
        .filter(|id| oracle.is_satisfied(id))
        .map(String::from)
        .collect()
}

/// Digest of a step's dependency list.
///
/// Changes whenever a dependency is added or removed.
pub fn dependencies_digest(step: &Step) -> String {
    let mut hasher = Sha256::new();
    for dep in step.dependencies() {
        hasher.update(dep.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

/// Record of one successful step run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// When the step finished.
    pub completed_at: DateTime<Utc>,
    /// [`dependencies_digest`] at completion time.
    pub dependencies_digest: String,
}

/// Persistent completion state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionStore {
    /// Schema version for migration.
    pub version: u32,

    /// Last successful completion per step.
    #[serde(default)]
    pub steps: BTreeMap<String, CompletionRecord>,
}

impl Default for CompletionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionStore {
    /// Current schema version.
    pub const CURRENT_VERSION: u32 = 1;

    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            steps: BTreeMap::new(),
        }
    }

    /// Load state from disk. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No completion state at {}", path.display());
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let store: Self =
            serde_yaml::from_str(&content).map_err(|e| StepGraphError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if store.version > Self::CURRENT_VERSION {
            return Err(StepGraphError::ConfigValidationError {
                message: format!(
                    "{} was written by a newer version (state version {})",
                    path.display(),
                    store.version
                ),
            });
        }

        Ok(store)
    }

    /// Save state to disk using atomic write.
    ///
    /// Writes to a temporary file and renames it over the target so the
    /// store is never left half-written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content =
            serde_yaml::to_string(self).map_err(|e| StepGraphError::ConfigValidationError {
                message: format!("Failed to serialize completion state: {}", e),
            })?;

        let temp_path = path.with_extension("yml.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Get the record for a step.
    pub fn get(&self, step: &str) -> Option<&CompletionRecord> {
        self.steps.get(step)
    }

    /// Record a successful run of `step` now.
    pub fn record(&mut self, step: &Step) {
        self.record_at(step, Utc::now());
    }

    /// Record a successful run of `step` at a given time.
    pub fn record_at(&mut self, step: &Step, completed_at: DateTime<Utc>) {
        self.steps.insert(
            step.id().to_string(),
            CompletionRecord {
                completed_at,
                dependencies_digest: dependencies_digest(step),
            },
        );
    }

    /// Forget a step, forcing it to be planned again.
    pub fn forget(&mut self, step: &str) -> bool {
        self.steps.remove(step).is_some()
    }

    /// Evaluate every step of `graph` against this store.
    pub fn view<'a>(&'a self, graph: &'a DependencyGraph) -> StoreView<'a> {
        let mut memo: BTreeMap<&str, bool> = BTreeMap::new();
        for id in graph.ids() {
            self.check(graph, id, &mut memo);
        }

        let satisfied = memo
            .into_iter()
            .filter(|(_, ok)| *ok)
            .map(|(id, _)| id)
            .collect();

        StoreView { satisfied }
    }

    /// A step is up to date when it has a record, its dependency list is
    /// unchanged, and every declared dependency is itself up to date and
    /// finished no later than it did. External leaves are not tracked.
    fn check<'a>(
        &self,
        graph: &'a DependencyGraph,
        id: &'a str,
        memo: &mut BTreeMap<&'a str, bool>,
    ) -> bool {
        if let Some(known) = memo.get(id) {
            return *known;
        }
        // Provisional answer; a cycle back to this step reads it as stale.
        memo.insert(id, false);

        let Some(step) = graph.get(id) else {
            return false;
        };

        let up_to_date = if step.is_external() {
            true
        } else {
            match self.get(id) {
                None => false,
                Some(record) if record.dependencies_digest != dependencies_digest(step) => {
                    tracing::debug!("'{}' is stale: dependency list changed", id);
                    false
                }
                Some(record) => step.dependencies().iter().all(|dep| {
                    let dep_ok = self.check(graph, dep, memo);
                    let finished_before = self
                        .get(dep)
                        .is_none_or(|d| d.completed_at <= record.completed_at);
                    dep_ok && finished_before
                }),
            }
        };

        memo.insert(id, up_to_date);
        up_to_date
    }
}

/// Snapshot of which steps a [`CompletionStore`] considers satisfied.
#[derive(Debug, Clone)]
pub struct StoreView<'a> {
    satisfied: BTreeSet<&'a str>,
}

impl StoreView<'_> {
    /// Number of satisfied steps.
    pub fn len(&self) -> usize {
        self.satisfied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.satisfied.is_empty()
    }
}

impl CompletionOracle for StoreView<'_> {
    fn is_satisfied(&self, step: &str) -> bool {
        self.satisfied.contains(step)
    }
}
