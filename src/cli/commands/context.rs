//! State shared by the commands that touch the registry.

use std::path::{Path, PathBuf};

use crate::cli::args::{to_kwargs, KeyValue};
use crate::config::MidbenchConfig;
use crate::core::Kwargs;
use crate::envs;
use crate::error::Result;
use crate::registration::{PluginReport, Registry};

/// Project root plus its loaded configuration.
#[derive(Debug, Clone)]
pub struct CommandContext {
    project_root: PathBuf,
    config: MidbenchConfig,
}

impl CommandContext {
    pub fn new(project_root: impl Into<PathBuf>, config: MidbenchConfig) -> Self {
        Self {
            project_root: project_root.into(),
            config,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn config(&self) -> &MidbenchConfig {
        &self.config
    }

    /// A fresh registry with plugins and built-ins loaded.
    pub fn bootstrap(&self) -> Result<(Registry, PluginReport)> {
        envs::bootstrap(&self.config)
    }

    pub fn registry(&self) -> Result<Registry> {
        Ok(self.bootstrap()?.0)
    }

    /// Configured kwargs for `id` with command-line pairs layered on top.
    pub fn env_kwargs(&self, id: &str, overrides: &[KeyValue]) -> Kwargs {
        let mut kwargs = self.config.environment_kwargs(id);
        kwargs.extend(to_kwargs(overrides));
        kwargs
    }

    /// The explicit directory, or `settings.output_dir` under the project root.
    pub fn output_dir(&self, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(dir) => dir.to_path_buf(),
            None => self.project_root.join(&self.config.settings.output_dir),
        }
    }
}
