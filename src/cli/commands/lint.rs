//! Lint command implementation.
//!
//! The `stepgraph lint` command runs every lint rule over the DAG and
//! reports all problems at once.

use std::path::{Path, PathBuf};

use crate::cli::args::LintArgs;
use crate::config::{load_dag, load_project_config, resolve_dag_path};
use crate::error::{Result, StepGraphError};
use crate::lint::{
    has_errors, lint_dag, HumanFormatter, JsonFormatter, LintDiagnostic, LintFormatter,
    OutputFormat, RuleRegistry,
};
use crate::ui::{should_use_colors, OutputMode, UserInterface};

use super::context::EXIT_DAG_NOT_FOUND;
use super::dispatcher::{Command, CommandResult};

/// The lint command implementation.
pub struct LintCommand {
    project_root: PathBuf,
    dag: Option<PathBuf>,
    args: LintArgs,
}

impl LintCommand {
    /// Create a new lint command.
    pub fn new(project_root: &Path, dag: Option<&Path>, args: LintArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            dag: dag.map(Path::to_path_buf),
            args,
        }
    }

    fn format_output(&self, format: OutputFormat, diagnostics: &[LintDiagnostic]) -> String {
        let mut output = Vec::new();
        let written = match format {
            OutputFormat::Json => JsonFormatter::new().format(diagnostics, &mut output),
            OutputFormat::Human => {
                HumanFormatter::new(should_use_colors()).format(diagnostics, &mut output)
            }
        };
        if let Err(e) = written {
            tracing::warn!("Failed to format lint output: {}", e);
        }
        String::from_utf8_lossy(&output).trim_end().to_string()
    }
}

impl Command for LintCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let format: OutputFormat = match self.args.format.parse() {
            Ok(f) => f,
            Err(e) => {
                ui.error(&e);
                return Ok(CommandResult::failure(1));
            }
        };

        let config = load_project_config(&self.project_root)?;
        if ui.output_mode() == OutputMode::Normal {
            ui.set_output_mode(config.settings.default_output.into());
        }

        let dag_path = resolve_dag_path(&self.project_root, self.dag.as_deref(), &config);
        let dag = match load_dag(&dag_path, &self.project_root) {
            Ok(dag) => dag,
            Err(StepGraphError::DagNotFound { path }) => {
                ui.error(&format!("DAG file not found: {}", path.display()));
                return Ok(CommandResult::failure(EXIT_DAG_NOT_FOUND));
            }
            Err(
                e @ (StepGraphError::ParseError { .. }
                | StepGraphError::DuplicateStep { .. }
                | StepGraphError::ConfigValidationError { .. }),
            ) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(1));
            }
            Err(e) => return Err(e),
        };

        let registry = RuleRegistry::with_builtins();
        let diagnostics = lint_dag(&registry, &dag);

        if diagnostics.is_empty() && format == OutputFormat::Human {
            ui.success(&format!("No issues found in {} step(s)", dag.steps.len()));
        } else {
            ui.output(&self.format_output(format, &diagnostics));
        }

        if has_errors(&diagnostics) {
            Ok(CommandResult::failure(1))
        } else {
            Ok(CommandResult::success())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::context::test_support::*;
    use super::*;
    use crate::ui::MockUI;

    fn lint(root: &Path, format: &str) -> (CommandResult, MockUI) {
        let mut ui = MockUI::new();
        let args = LintArgs {
            format: format.to_string(),
        };
        let result = LintCommand::new(root, None, args).execute(&mut ui).unwrap();
        (result, ui)
    }

    #[test]
    fn clean_dag_passes() {
        let temp = setup_project();
        let (result, ui) = lint(temp.path(), "human");

        assert!(result.success);
        assert!(ui.has_message("No issues found in 4 step(s)"));
    }

    #[test]
    fn reports_all_problems() {
        let temp = setup_project();
        write_dag(
            temp.path(),
            "steps:\n  garden://demo/latest/a:\n    - garden://demo/latest/b\n  garden://demo/latest/b:\n    - garden://demo/latest/a\n  garden://demo/latest/c:\n    - meadow://demo/latest/missing\n",
        );
        let (result, ui) = lint(temp.path(), "human");

        assert_eq!(result.exit_code, 1);
        let text = ui.output_text();
        assert!(text.contains("circular-dependency"));
        assert!(text.contains("undefined-dependency"));
        assert!(text.contains("Found 2 error(s)"));
    }

    #[test]
    fn json_format_has_summary() {
        let temp = setup_project();
        write_dag(temp.path(), "steps:\n  garden://demo/latest/a:\n    - garden://demo/latest/a\n");
        let (result, ui) = lint(temp.path(), "json");

        assert_eq!(result.exit_code, 1);
        let json: serde_json::Value = serde_json::from_str(&ui.output_text()).unwrap();
        assert_eq!(json["summary"]["errors"], 1);
        assert_eq!(json["diagnostics"][0]["rule_id"], "self-dependency");
    }

    #[test]
    fn clean_dag_json_is_still_printed() {
        let temp = setup_project();
        let (result, ui) = lint(temp.path(), "json");

        assert!(result.success);
        let json: serde_json::Value = serde_json::from_str(&ui.output_text()).unwrap();
        assert_eq!(json["summary"]["total"], 0);
    }

    #[test]
    fn missing_dag_exits_with_code_2() {
        let temp = tempfile::TempDir::new().unwrap();
        let (result, ui) = lint(temp.path(), "human");

        assert_eq!(result.exit_code, EXIT_DAG_NOT_FOUND);
        assert!(ui.has_message("DAG file not found"));
    }

    #[test]
    fn parse_error_is_reported() {
        let temp = setup_project();
        write_dag(temp.path(), "steps: [unclosed\n");
        let (result, ui) = lint(temp.path(), "human");

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_message("Failed to parse"));
    }

    #[test]
    fn unknown_format_is_rejected() {
        let temp = setup_project();
        let (result, ui) = lint(temp.path(), "sarif");

        assert_eq!(result.exit_code, 1);
        assert!(!ui.errors().is_empty());
    }
}
