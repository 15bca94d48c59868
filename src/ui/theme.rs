//! Visual theme and styling.

use console::Style;

/// MIDbench's visual theme.
#[derive(Debug, Clone)]
pub struct MidbenchTheme {
    /// Success messages (green).
    pub success: Style,
    /// Warning messages (yellow).
    pub warning: Style,
    /// Error messages (red bold).
    pub error: Style,
    /// Headers (cyan bold).
    pub header: Style,
    /// Secondary text.
    pub dim: Style,
    /// Environment ids and other names (bold).
    pub highlight: Style,
    /// Keys in key-value listings.
    pub key: Style,
    /// Numeric results.
    pub value: Style,
}

impl Default for MidbenchTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl MidbenchTheme {
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            header: Style::new().cyan().bold(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            key: Style::new().bold(),
            value: Style::new().cyan(),
        }
    }

    /// A theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            header: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            key: Style::new(),
            value: Style::new(),
        }
    }

    /// Pick [`new`](Self::new) or [`plain`](Self::plain) for the current terminal.
    pub fn detect() -> Self {
        if should_use_colors() {
            Self::new()
        } else {
            Self::plain()
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(format!("━━ {} ━━", title)))
    }

    /// `key: value` with the key padded to `width`.
    pub fn format_key_value(&self, key: &str, value: &str, width: usize) -> String {
        format!(
            "{} {}",
            self.key.apply_to(format!("{:<width$}", format!("{}:", key), width = width + 1)),
            value
        )
    }
}

/// Whether colored output should be used.
///
/// Honors `NO_COLOR` and falls back to plain output when stdout is not a
/// terminal.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    console::Term::stdout().is_term()
}
