//! SU2 file exchange: `.cfg` option files and `history*.csv` convergence logs.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MidbenchError, Result};

/// An SU2 configuration file, edited in place line by line so that comments
/// and ordering survive a rewrite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Su2Config {
    lines: Vec<String>,
}

impl Su2Config {
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| MidbenchError::SolverOutput {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self::parse(&text))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_string())?;
        Ok(())
    }

    /// Value of an option, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines
            .iter()
            .find_map(|line| split_option(line).filter(|(k, _)| *k == key).map(|(_, v)| v))
    }

    /// Set an option, replacing its existing line or appending a new one.
    pub fn set(&mut self, key: &str, value: impl fmt::Display) {
        let line = format!("{}= {}", key, value);
        match self
            .lines
            .iter()
            .position(|l| split_option(l).is_some_and(|(k, _)| k == key))
        {
            Some(index) => self.lines[index] = line,
            None => self.lines.push(line),
        }
    }
}

impl fmt::Display for Su2Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

fn split_option(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('%') {
        return None;
    }
    let (key, value) = trimmed.split_once('=')?;
    Some((key.trim(), value.trim()))
}

/// A convergence history written by SU2, with quoted, padded headers.
#[derive(Debug, Clone)]
pub struct History {
    path: PathBuf,
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl History {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| MidbenchError::SolverOutput {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(path, &text)
    }

    /// Parse history text. Rows with a missing or non-numeric cell are dropped.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let header = lines.next().ok_or_else(|| MidbenchError::SolverOutput {
            path: path.to_path_buf(),
            message: "empty history file".to_string(),
        })?;
        let columns: Vec<String> = header.split(',').map(clean_cell).collect();

        let rows = lines
            .filter_map(|line| {
                let cells: Vec<f64> = line
                    .split(',')
                    .map(|cell| clean_cell(cell).parse::<f64>().ok())
                    .collect::<Option<_>>()?;
                (cells.len() == columns.len()).then_some(cells)
            })
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            columns,
            rows,
        })
    }

    /// The value of `column` in the final complete row.
    pub fn last(&self, column: &str) -> Result<f64> {
        let index = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| MidbenchError::SolverOutput {
                path: self.path.clone(),
                message: format!("no column \"{}\"", column),
            })?;
        let row = self.rows.last().ok_or_else(|| MidbenchError::SolverOutput {
            path: self.path.clone(),
            message: "no complete rows".to_string(),
        })?;
        Ok(row[index])
    }
}

fn clean_cell(cell: &str) -> String {
    cell.trim().trim_matches('"').trim().to_string()
}
