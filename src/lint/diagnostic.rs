//! Lint diagnostic messages.

use std::path::PathBuf;

use super::rule::{RuleId, Severity};

/// A diagnostic message produced by a lint rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintDiagnostic {
    /// The rule that produced this diagnostic.
    pub rule_id: RuleId,
    /// Severity of this diagnostic.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Step the diagnostic is about.
    pub step: Option<String>,
    /// DAG file declaring that step.
    pub file: Option<PathBuf>,
    /// Optional suggestion for fixing the issue.
    pub suggestion: Option<String>,
}

impl LintDiagnostic {
    /// Create a new diagnostic.
    pub fn new(rule_id: RuleId, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule_id,
            severity,
            message: message.into(),
            step: None,
            file: None,
            suggestion: None,
        }
    }

    /// Attach the step the diagnostic is about.
    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.step = Some(step.into());
        self
    }

    /// Attach the declaring DAG file.
    pub fn with_file(mut self, file: Option<PathBuf>) -> Self {
        self.file = file;
        self
    }

    /// Add a fix suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_creation() {
        let diag = LintDiagnostic::new(RuleId::new("test-rule"), Severity::Error, "Test message");

        assert_eq!(diag.rule_id, RuleId::new("test-rule"));
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "Test message");
        assert!(diag.suggestion.is_none());
        assert!(diag.step.is_none());
        assert!(diag.file.is_none());
    }

    #[test]
    fn diagnostic_builder_pattern() {
        let diag = LintDiagnostic::new(RuleId::new("test"), Severity::Error, "Test message")
            .with_step("garden://wb/latest/pip")
            .with_file(Some(PathBuf::from("dag/main.yml")))
            .with_suggestion("Fix it like this");

        assert_eq!(diag.step.as_deref(), Some("garden://wb/latest/pip"));
        assert_eq!(diag.file, Some(PathBuf::from("dag/main.yml")));
        assert_eq!(diag.suggestion.as_deref(), Some("Fix it like this"));
    }
}
