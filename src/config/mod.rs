//! DAG files and project configuration.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//!
//! # Example
//!
//! ```
//! use stepgraph::config::{load_dag, UnknownDependencyMode};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dag = temp.path().join("main.yml");
//! fs::write(&dag, "steps:\n  garden://wb/latest/pip:\n    - snapshot://wb/latest/pip.csv\n").unwrap();
//!
//! let loaded = load_dag(&dag, temp.path()).unwrap();
//! let graph = loaded.to_graph(UnknownDependencyMode::Strict).unwrap();
//! assert_eq!(graph.len(), 2);
//! ```

pub mod loader;
pub mod schema;

pub use schema::{dag_json_schema, DagFile, OutputMode, ProjectConfig, Settings};

pub use loader::{
    find_project_root, load_dag, load_dag_file, load_project_config, parse_dag,
    project_config_path, resolve_dag_path, resolve_state_path, LoadedDag, DEFAULT_DAG_PATH,
    DEFAULT_STATE_PATH, PROJECT_DIR,
};

pub use crate::runner::{UnknownDependencyMode, UnknownTargetMode};
