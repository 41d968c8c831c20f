//! Schema command implementation.
//!
//! The `stepgraph schema` command prints the JSON Schema for DAG files, for
//! use with editor YAML language servers.

use crate::config::dag_json_schema;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The schema command implementation.
#[derive(Debug, Default)]
pub struct SchemaCommand;

impl SchemaCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for SchemaCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let schema = dag_json_schema();
        let text = serde_json::to_string_pretty(&schema).map_err(anyhow::Error::from)?;
        ui.output(&text);
        Ok(CommandResult::success())
    }
}
