//! External process execution for solver adapters.

pub mod command;

pub use command::{execute, execute_checked, CommandLine, CommandOptions, CommandResult};
