use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::constants;
use crate::error::PipelineError;


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Output directory for binaries and demo scripts, relative to the project root
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,

    /// Build configuration
    #[serde(default)]
    pub build: BuildConfig,

    /// Services to compile, in build order
    #[serde(default = "default_services")]
    pub services: Vec<ServiceSpec>,

    /// Smoke-test table
    #[serde(default = "default_tests")]
    pub tests: Vec<CaseSpec>,

    /// Demo table
    #[serde(default = "default_demos")]
    pub demos: Vec<CaseSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toolchain {
    #[default]
    Go,
    Cargo,
}

impl Toolchain {
    /// Compiler program looked up on PATH when none is configured
    pub fn program(&self) -> &'static str {
        match self {
            Toolchain::Go => "go",
            Toolchain::Cargo => "cargo",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default)]
    pub toolchain: Toolchain,

    /// Explicit compiler path; relative paths are taken from the project root
    pub compiler: Option<PathBuf>,

    /// Extra flags passed to every compiler invocation
    #[serde(default = "default_build_flags")]
    pub flags: Vec<String>,

    /// Additional environment variables for the compiler
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Write the demo scripts after a successful build
    #[serde(default)]
    pub package: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub name: String,

    /// Source directory, relative to the project root
    pub source: PathBuf,

    /// Heading printed above the service's demo output
    #[serde(default)]
    pub description: String,
}

impl ServiceSpec {
    pub fn new(name: &str, source: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            source: PathBuf::from(source),
            description: description.to_string(),
        }
    }
}

/// One row of the smoke-test or demo table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSpec {
    pub service: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default = "default_true")]
    pub expect_success: bool,
}

impl CaseSpec {
    pub fn new(service: &str, args: &[&str]) -> Self {
        Self {
            service: service.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            expect_success: true,
        }
    }
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from(constants::artifact::DEFAULT_DIR)
}

fn default_build_flags() -> Vec<String> {
    vec!["-trimpath".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_services() -> Vec<ServiceSpec> {
    vec![
        ServiceSpec::new("service-1", "service-1", "Calculator"),
        ServiceSpec::new("service-2", "service-2", "String processor"),
    ]
}

fn default_tests() -> Vec<CaseSpec> {
    vec![
        CaseSpec::new("service-1", &["add", "2", "3"]),
        CaseSpec::new("service-2", &["reverse", "hello"]),
        CaseSpec::new("service-2", &["wordcount", "one two three"]),
    ]
}

fn default_demos() -> Vec<CaseSpec> {
    vec![
        CaseSpec::new("service-1", &["add", "15", "25"]),
        CaseSpec::new("service-1", &["mul", "7", "8"]),
        CaseSpec::new("service-2", &["reverse", "hello"]),
        CaseSpec::new("service-2", &["wordcount", "the quick brown fox"]),
    ]
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            toolchain: Toolchain::default(),
            compiler: None,
            flags: default_build_flags(),
            env: HashMap::new(),
            package: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            artifact_dir: default_artifact_dir(),
            build: BuildConfig::default(),
            services: default_services(),
            tests: default_tests(),
            demos: default_demos(),
        }
    }
}

impl Config {
    /// Load the project config, then the user config, then fall back to defaults
    pub fn load(project_root: &Path) -> Result<Self> {
        Self::load_from(project_root, dirs::config_dir().as_deref())
    }

    /// Same lookup as [`Config::load`] with an explicit user config directory
    pub fn load_from(project_root: &Path, user_config_dir: Option<&Path>) -> Result<Self> {
        let project_file = project_root.join(constants::config::PROJECT_FILE);
        if project_file.exists() {
            return Self::from_file(&project_file);
        }
        if let Some(config_dir) = user_config_dir {
            let config_path = config_dir
                .join(constants::config::USER_DIR)
                .join(constants::config::USER_FILE);
            if config_path.exists() {
                return Self::from_file(&config_path);
            }
        }
        debug!("No config file found, using built-in defaults");
        Ok(Config::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            PipelineError::config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.validate().map_err(|e| match e {
            PipelineError::Config { message } => {
                PipelineError::config(format!("{}: {}", path.display(), message))
            }
            other => other,
        })?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), PipelineError> {
        validate_artifact_dir(&self.artifact_dir)?;
        if self.services.is_empty() {
            return Err(PipelineError::config("at least one service must be declared"));
        }

        let mut names = HashSet::new();
        for service in &self.services {
            if service.name.is_empty() || service.name.contains(['/', '\\']) {
                return Err(PipelineError::config(format!(
                    "invalid service name {:?}",
                    service.name
                )));
            }
            if !names.insert(service.name.as_str()) {
                return Err(PipelineError::config(format!(
                    "service {} declared more than once",
                    service.name
                )));
            }
        }

        for (table, cases) in [("tests", &self.tests), ("demos", &self.demos)] {
            if let Some(case) = cases.iter().find(|c| !names.contains(c.service.as_str())) {
                return Err(PipelineError::config(format!(
                    "{} entry references unknown service {}",
                    table, case.service
                )));
            }
        }
        Ok(())
    }

    pub fn service(&self, name: &str) -> Option<&ServiceSpec> {
        self.services.iter().find(|s| s.name == name)
    }
}

/// `clean` deletes the artifact directory, so it must be a subdirectory of the
/// project root: relative, no `..`, and not the root itself
fn validate_artifact_dir(dir: &Path) -> std::result::Result<(), PipelineError> {
    let mut has_name = false;
    for component in dir.components() {
        match component {
            Component::Normal(_) => has_name = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(PipelineError::config(format!(
                    "artifact_dir {:?} must be a relative path inside the project",
                    dir
                )));
            }
        }
    }
    if !has_name {
        return Err(PipelineError::config(format!(
            "artifact_dir {:?} must name a subdirectory of the project",
            dir
        )));
    }
    Ok(())
}
