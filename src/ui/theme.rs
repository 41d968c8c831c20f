//! Visual theme and styling.

use console::Style;

use crate::steps::StepKind;

/// stepgraph's visual theme.
#[derive(Debug, Clone)]
pub struct StepGraphTheme {
    /// Style for success messages (green).
    pub success: Style,
    /// Style for warning messages (orange).
    pub warning: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for dim/secondary text.
    pub dim: Style,
    /// Style for highlighted/important text (bold).
    pub highlight: Style,
    /// Style for headers (magenta bold).
    pub header: Style,
    /// Style for step counters and wave labels (dim).
    pub step_number: Style,
    /// Style for snapshot steps (cyan).
    pub snapshot: Style,
    /// Style for external steps (dim italic).
    pub external: Style,
}

impl Default for StepGraphTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl StepGraphTheme {
    /// Create the default theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().magenta(),
            step_number: Style::new().dim(),
            snapshot: Style::new().cyan(),
            external: Style::new().dim().italic(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            step_number: Style::new(),
            snapshot: Style::new(),
            external: Style::new(),
        }
    }

    /// Format a success message (icon + text in green).
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    /// Format a warning message (icon + text in orange).
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    /// Format an error message (icon + text in red bold).
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!("{} {}", self.header.apply_to("◆"), self.highlight.apply_to(title))
    }

    /// Format a step identifier according to its kind.
    pub fn format_step(&self, id: &str, kind: StepKind, external: bool) -> String {
        if external {
            format!("{}", self.external.apply_to(id))
        } else if kind == StepKind::Snapshot {
            format!("{}", self.snapshot.apply_to(id))
        } else {
            id.to_string()
        }
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // Check NO_COLOR env var (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_formats_success() {
        let msg = StepGraphTheme::plain().format_success("Complete");
        assert_eq!(msg, "✓ Complete");
    }

    #[test]
    fn theme_formats_warning() {
        let msg = StepGraphTheme::plain().format_warning("Caution");
        assert_eq!(msg, "⚠ Caution");
    }

    #[test]
    fn theme_formats_error() {
        let msg = StepGraphTheme::plain().format_error("Failed");
        assert_eq!(msg, "✗ Failed");
    }

    #[test]
    fn theme_formats_header() {
        let msg = StepGraphTheme::plain().format_header("dag/main.yml");
        assert!(msg.contains("dag/main.yml"));
    }

    #[test]
    fn plain_theme_leaves_steps_unstyled() {
        let theme = StepGraphTheme::plain();
        assert_eq!(
            theme.format_step("snapshot://wb/latest/pip.csv", StepKind::Snapshot, true),
            "snapshot://wb/latest/pip.csv"
        );
    }

    #[test]
    fn default_impl_matches_new() {
        let default = StepGraphTheme::default();
        let new = StepGraphTheme::new();
        assert_eq!(default.format_success("test"), new.format_success("test"));
    }
}
