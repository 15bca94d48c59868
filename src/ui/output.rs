//! Output verbosity.

use std::str::FromStr;

pub use crate::config::OutputMode;

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verbose" => Ok(Self::Verbose),
            "normal" => Ok(Self::Normal),
            "quiet" => Ok(Self::Quiet),
            "silent" => Ok(Self::Silent),
            _ => Err(format!("unknown output mode: {}", s)),
        }
    }
}

impl OutputMode {
    /// Resolve the mode from CLI flags, falling back to the configured default.
    pub fn from_flags(verbose: bool, quiet: bool, configured: OutputMode) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            configured
        }
    }

    /// Results and status lines.
    pub fn shows_status(&self) -> bool {
        !matches!(self, Self::Silent)
    }

    /// Headers, successes and warnings.
    pub fn shows_decorations(&self) -> bool {
        matches!(self, Self::Verbose | Self::Normal)
    }

    /// Extra detail such as resolved kwargs and solver paths.
    pub fn shows_details(&self) -> bool {
        matches!(self, Self::Verbose)
    }
}
