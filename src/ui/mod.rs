//! Terminal output for the CLI.
//!
//! This module provides:
//! - [`UserInterface`] trait so commands can be tested against [`MockUI`]
//! - [`TerminalUI`] writing styled output to the terminal
//! - [`Table`] for column-aligned listings
//!
//! # Example
//!
//! ```
//! use midbench::ui::{MockUI, OutputMode, UserInterface};
//!
//! let mut ui = MockUI::with_mode(OutputMode::Quiet);
//! ui.show_header("Airfoil2d-v0");
//! ui.success("made Airfoil2d-v0");
//! ui.message("drag = 0.0123");
//! assert!(ui.headers().is_empty());
//! assert!(ui.successes().is_empty());
//! assert_eq!(ui.messages(), ["drag = 0.0123"]);
//! ```

pub mod mock;
pub mod output;
pub mod table;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use table::Table;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, MidbenchTheme};

/// Trait for user interface interactions.
///
/// Implementations decide per [`OutputMode`] what to show; callers always
/// report everything.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Replace the output mode (config `default_output` applies late).
    fn set_output_mode(&mut self, mode: OutputMode);

    /// Print command output (results, listings, JSON).
    fn message(&mut self, msg: &str);

    /// Print supporting detail, shown only in verbose mode.
    fn detail(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message. Always shown.
    fn error(&mut self, msg: &str);

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Check if output goes to a terminal.
    fn is_interactive(&self) -> bool;
}
