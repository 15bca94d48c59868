//! External solver execution.

use crate::error::{MidbenchError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// A program and its leading arguments.
///
/// Deserializes from either a list (`["python3", "simulate.py"]`) or a
/// whitespace-separated string (`"python3 simulate.py"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommandLine(Vec<String>);

impl CommandLine {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(argv.into_iter().map(Into::into).collect())
    }

    /// Split a command string on whitespace.
    pub fn parse(command: &str) -> Self {
        Self::new(command.split_whitespace())
    }

    /// Program name, if any.
    pub fn program(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// This command line with more arguments appended.
    pub fn with_args<I, S>(&self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = self.0.clone();
        argv.extend(args.into_iter().map(Into::into));
        Self(argv)
    }

    pub fn argv(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

impl<'de> Deserialize<'de> for CommandLine {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Line(String),
            Argv(Vec<String>),
        }

        let command = match Raw::deserialize(deserializer)? {
            Raw::Line(line) => CommandLine::parse(&line),
            Raw::Argv(argv) => CommandLine(argv),
        };
        if command.0.is_empty() {
            return Err(serde::de::Error::custom("command must not be empty"));
        }
        Ok(command)
    }
}

/// Result of running a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output, empty unless captured.
    pub stdout: String,

    /// Standard error, empty unless captured.
    pub stderr: String,

    pub duration: Duration,

    /// Whether the command exited with code 0.
    pub success: bool,
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with system env).
    pub env: HashMap<String, String>,

    /// Capture stdout and stderr instead of inheriting them.
    pub capture: bool,
}

impl CommandOptions {
    /// Run in `dir`, inheriting output.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            cwd: Some(dir.to_path_buf()),
            ..Default::default()
        }
    }
}

/// Run a command to completion.
///
/// # Errors
///
/// Returns [`MidbenchError::CommandFailed`] if the program cannot be started.
/// A non-zero exit is reported in the [`CommandResult`], not as an error.
pub fn execute(command: &CommandLine, options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();

    let (program, args) =
        command
            .0
            .split_first()
            .ok_or_else(|| MidbenchError::CommandFailed {
                command: String::new(),
                code: None,
            })?;

    let mut cmd = Command::new(program);
    cmd.args(args);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    if options.capture {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    } else {
        cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
    }

    tracing::debug!(command = %command, cwd = ?options.cwd, "running solver command");

    let output = cmd.output().map_err(|e| {
        tracing::debug!(command = %command, error = %e, "failed to start command");
        MidbenchError::CommandFailed {
            command: command.to_string(),
            code: None,
        }
    })?;

    let duration = start.elapsed();
    tracing::debug!(
        command = %command,
        status = ?output.status.code(),
        ?duration,
        "command finished"
    );

    Ok(CommandResult {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        duration,
        success: output.status.success(),
    })
}

/// Run a command and fail unless it exits successfully.
pub fn execute_checked(command: &CommandLine, options: &CommandOptions) -> Result<CommandResult> {
    let result = execute(command, options)?;
    if result.success {
        Ok(result)
    } else {
        if !result.stderr.is_empty() {
            tracing::warn!("{}: {}", command, result.stderr.trim_end());
        }
        Err(MidbenchError::CommandFailed {
            command: command.to_string(),
            code: result.exit_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured() -> CommandOptions {
        CommandOptions {
            capture: true,
            ..Default::default()
        }
    }

    #[test]
    fn command_line_from_string_or_list() {
        let from_str: CommandLine = serde_json::from_str("\"python3  simulate.py\"").unwrap();
        let from_list: CommandLine =
            serde_json::from_str(r#"["python3", "simulate.py"]"#).unwrap();
        assert_eq!(from_str, from_list);
        assert_eq!(from_str.program(), Some("python3"));
        assert_eq!(from_str.to_string(), "python3 simulate.py");
    }

    #[test]
    fn empty_command_line_is_rejected() {
        assert!(serde_json::from_str::<CommandLine>("\"   \"").is_err());
        assert!(serde_json::from_str::<CommandLine>("[]").is_err());
    }

    #[test]
    fn with_args_appends() {
        let cmd = CommandLine::parse("SU2_CFD").with_args(["config.cfg"]);
        assert_eq!(cmd.argv(), ["SU2_CFD", "config.cfg"]);
    }

    #[cfg(unix)]
    #[test]
    fn execute_successful_command() {
        let result = execute(&CommandLine::parse("echo hello"), &captured()).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn execute_reports_nonzero_exit() {
        let result = execute(&CommandLine::parse("false"), &captured()).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(1));
    }

    #[cfg(unix)]
    #[test]
    fn execute_checked_fails_on_nonzero_exit() {
        let err = execute_checked(&CommandLine::parse("false"), &captured()).unwrap_err();
        assert!(matches!(
            err,
            MidbenchError::CommandFailed { code: Some(1), .. }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn execute_with_env_and_cwd() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut options = captured();
        options.cwd = Some(temp.path().to_path_buf());
        options
            .env
            .insert("MIDBENCH_TEST_VAR".to_string(), "my_value".to_string());

        let result = execute(
            &CommandLine::new(["sh", "-c", "echo $MIDBENCH_TEST_VAR; pwd"]),
            &options,
        )
        .unwrap();

        assert!(result.success);
        assert!(result.stdout.contains("my_value"));
    }

    #[test]
    fn missing_program_is_command_failed() {
        let err = execute(
            &CommandLine::parse("midbench-no-such-solver-binary"),
            &captured(),
        )
        .unwrap_err();
        assert!(matches!(err, MidbenchError::CommandFailed { code: None, .. }));
    }
}
