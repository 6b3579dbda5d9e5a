//! Resolved settings for one invocation
//!
//! A [`Project`] is built once at start-up and handed by reference to every
//! step; nothing downstream reads the environment on its own.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::PipelineError;
use crate::target::BuildTarget;

#[derive(Debug, Clone)]
pub struct Project {
    /// Directory containing the service sources
    pub root: PathBuf,
    pub config: Config,
    pub target: BuildTarget,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, config: Config, target: BuildTarget) -> Self {
        Self {
            root: root.into(),
            config,
            target,
        }
    }

    /// Load config for `root` and resolve the target, preferring `platform`
    /// over the environment
    pub fn load(root: &Path, platform: Option<&str>) -> Result<Self> {
        Self::load_from(root, platform, dirs::config_dir().as_deref())
    }

    /// [`Project::load`] with an explicit user config directory.
    ///
    /// `root` is made absolute first: the compiler runs with the root as its
    /// working directory, so every path handed to it must not depend on ours.
    pub fn load_from(
        root: &Path,
        platform: Option<&str>,
        user_config_dir: Option<&Path>,
    ) -> Result<Self> {
        let root = std::fs::canonicalize(root)
            .map_err(|e| PipelineError::fs("open project directory", root, e))?;
        let config = Config::load_from(&root, user_config_dir)?;
        let target = match platform {
            Some(platform) => BuildTarget::parse_platform(platform)?,
            None => BuildTarget::from_env(),
        };
        Ok(Self::new(root, config, target))
    }

    pub fn artifact_dir(&self) -> PathBuf {
        self.root.join(&self.config.artifact_dir)
    }

    /// Where the binary for `service` lands for the resolved target
    pub fn binary_path(&self, service: &str) -> PathBuf {
        self.artifact_dir()
            .join(self.target.executable_name(service))
    }
}
