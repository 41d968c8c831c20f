//! DAG and project configuration discovery and loading.
//!
//! A DAG is declared by a root file whose `include:` entries pull in further
//! files, resolved relative to the project root. Loading walks includes
//! depth-first, reads each file once, and merges every `steps:` block into a
//! single mapping.

use crate::config::schema::{DagFile, ProjectConfig};
use crate::error::{Result, StepGraphError};
use crate::runner::{build_graph, DependencyGraph, UnknownDependencyMode};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory marking a stepgraph project.
pub const PROJECT_DIR: &str = ".stepgraph";

/// Default root DAG file, relative to the project root.
pub const DEFAULT_DAG_PATH: &str = "dag/main.yml";

/// Default completion store, relative to the project root.
pub const DEFAULT_STATE_PATH: &str = ".stepgraph/state.yml";

/// Find the project root by walking up from `start`.
///
/// Looks for:
/// 1. `.stepgraph` directory (primary indicator)
/// 2. `.git` directory (fallback)
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(PROJECT_DIR).is_dir() {
            return Some(current);
        }

        if current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Path of the project config file.
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_DIR).join("config.yml")
}

/// Load `.stepgraph/config.yml`, or defaults when it does not exist.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_config_path(project_root);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No project config at {}", path.display());
            return Ok(ProjectConfig::default());
        }
        Err(e) => return Err(StepGraphError::Io(e)),
    };

    if content.trim().is_empty() {
        return Ok(ProjectConfig::default());
    }

    serde_yaml::from_str(&content).map_err(|e| StepGraphError::ParseError {
        path,
        message: e.to_string(),
    })
}

/// Root DAG path for a project.
///
/// `explicit` is the `--dag` flag or `STEPGRAPH_DAG`; it wins over the
/// project config, which wins over [`DEFAULT_DAG_PATH`]. Relative paths are
/// resolved against the project root.
pub fn resolve_dag_path(
    project_root: &Path,
    explicit: Option<&Path>,
    config: &ProjectConfig,
) -> PathBuf {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| config.dag.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DAG_PATH));
    project_root.join(path)
}

/// Completion store path for a project.
pub fn resolve_state_path(project_root: &Path, config: &ProjectConfig) -> PathBuf {
    project_root.join(
        config
            .state_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH)),
    )
}

/// Parse YAML content into a [`DagFile`].
///
/// `source_path` is used for error reporting.
pub fn parse_dag(content: &str, source_path: &Path) -> Result<DagFile> {
    if content.trim().is_empty() {
        return Ok(DagFile::default());
    }
    serde_yaml::from_str(content).map_err(|e| StepGraphError::ParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a single DAG file.
///
/// # Errors
///
/// Returns `DagNotFound` if the file doesn't exist.
/// Returns `ParseError` if the YAML is invalid.
pub fn load_dag_file(path: &Path) -> Result<DagFile> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StepGraphError::DagNotFound {
                path: path.to_path_buf(),
            }
        } else {
            StepGraphError::Io(e)
        }
    })?;

    parse_dag(&content, path)
}

/// All steps of a DAG and its includes.
#[derive(Debug, Clone, Default)]
pub struct LoadedDag {
    /// Step identifier to declared dependencies.
    pub steps: BTreeMap<String, Vec<String>>,
    /// Step identifier to the file that declared it.
    pub sources: BTreeMap<String, PathBuf>,
    /// Every file read, in load order.
    pub files: Vec<PathBuf>,
}

impl LoadedDag {
    /// Build the validated dependency graph.
    pub fn to_graph(&self, mode: UnknownDependencyMode) -> Result<DependencyGraph> {
        build_graph(
            self.steps
                .iter()
                .map(|(name, deps)| (name.clone(), deps.clone())),
            mode,
        )
    }
}

/// Load the DAG rooted at `root_file`, following includes.
///
/// # Errors
///
/// Returns `DagNotFound` for a missing file, `DuplicateStep` when two files
/// declare the same step, and `ConfigValidationError` for an include cycle.
pub fn load_dag(root_file: &Path, project_root: &Path) -> Result<LoadedDag> {
    let mut loader = DagLoader {
        project_root,
        loaded: BTreeSet::new(),
        stack: Vec::new(),
        dag: LoadedDag::default(),
    };
    loader.load(root_file)?;
    tracing::debug!(
        "Loaded {} step(s) from {} file(s)",
        loader.dag.steps.len(),
        loader.dag.files.len()
    );
    Ok(loader.dag)
}

struct DagLoader<'a> {
    project_root: &'a Path,
    loaded: BTreeSet<PathBuf>,
    stack: Vec<PathBuf>,
    dag: LoadedDag,
}

impl DagLoader<'_> {
    fn load(&mut self, path: &Path) -> Result<()> {
        let key = fs::canonicalize(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StepGraphError::DagNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                StepGraphError::Io(e)
            }
        })?;

        if let Some(start) = self.stack.iter().position(|p| *p == key) {
            let chain: Vec<String> = self.stack[start..]
                .iter()
                .chain(std::iter::once(&key))
                .map(|p| p.display().to_string())
                .collect();
            return Err(StepGraphError::ConfigValidationError {
                message: format!("Include cycle: {}", chain.join(" -> ")),
            });
        }
        if !self.loaded.insert(key.clone()) {
            tracing::debug!("Skipping already loaded {}", path.display());
            return Ok(());
        }

        tracing::debug!("Loading DAG file {}", path.display());
        let file = load_dag_file(path)?;
        self.dag.files.push(path.to_path_buf());

        for (name, deps) in file.steps {
            if let Some(first) = self.dag.sources.get(&name) {
                return Err(StepGraphError::DuplicateStep {
                    step: name,
                    first: first.clone(),
                    second: path.to_path_buf(),
                });
            }
            self.dag.sources.insert(name.clone(), path.to_path_buf());
            self.dag.steps.insert(name, deps.unwrap_or_default());
        }

        self.stack.push(key);
        for include in &file.include {
            let include = self.project_root.join(include);
            self.load(&include)?;
        }
        self.stack.pop();

        Ok(())
    }
}
