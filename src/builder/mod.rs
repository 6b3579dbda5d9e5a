use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::config::{ServiceSpec, Toolchain};
use crate::error::PipelineError;
use crate::exec::{CommandInvocation, CommandRunner};
use crate::project::Project;


/// Compiles every declared service into the artifact directory
pub struct ServiceBuilder<'a> {
    project: &'a Project,
    compiler: PathBuf,
}

/// A compiled service binary
#[derive(Debug, Clone)]
pub struct BuiltArtifact {
    pub service: String,
    pub path: PathBuf,
    pub sha256: String,
}

impl<'a> ServiceBuilder<'a> {
    /// Locate the compiler for the project's toolchain
    pub fn new(project: &'a Project) -> Result<Self> {
        let compiler = locate_compiler(project)?;
        debug!("Using compiler: {}", compiler.display());
        Ok(Self::with_compiler(project, compiler))
    }

    pub fn with_compiler(project: &'a Project, compiler: impl Into<PathBuf>) -> Self {
        Self {
            project,
            compiler: compiler.into(),
        }
    }

    /// Build all services in declaration order, stopping at the first failure
    pub fn build_all<R: CommandRunner>(&self, runner: &R) -> Result<Vec<BuiltArtifact>> {
        let artifact_dir = self.project.artifact_dir();
        std::fs::create_dir_all(&artifact_dir)
            .map_err(|e| PipelineError::fs("create", &artifact_dir, e))?;

        let mut artifacts = Vec::with_capacity(self.project.config.services.len());
        for service in &self.project.config.services {
            artifacts.push(self.build_service(runner, service)?);
        }
        Ok(artifacts)
    }

    pub fn build_service<R: CommandRunner>(
        &self,
        runner: &R,
        service: &ServiceSpec,
    ) -> Result<BuiltArtifact> {
        info!("Building {} for {}...", service.name, self.project.target);
        let output = self.project.binary_path(&service.name);

        match self.project.config.build.toolchain {
            Toolchain::Go => {
                let invocation = self.go_invocation(service, &output);
                self.compile(runner, service, &invocation)?;
            }
            Toolchain::Cargo => {
                // Keep cargo's target dir out of the artifact directory
                let scratch =
                    tempfile::tempdir().context("Failed to create temporary directory")?;
                let triple = self.project.target.rust_triple().map_err(|e| {
                    PipelineError::Toolchain {
                        service: service.name.clone(),
                        reason: format!("{:#}", e),
                    }
                })?;
                let invocation = self.cargo_invocation(service, &triple, scratch.path());
                self.compile(runner, service, &invocation)?;

                let package = package_name(&self.project.root.join(&service.source)).map_err(
                    |e| PipelineError::Toolchain {
                        service: service.name.clone(),
                        reason: format!("{:#}", e),
                    },
                )?;
                let built = scratch
                    .path()
                    .join(&triple)
                    .join("release")
                    .join(self.project.target.executable_name(&package));
                if built.exists() {
                    std::fs::copy(&built, &output)
                        .map_err(|e| PipelineError::fs("copy", &output, e))?;
                }
            }
        }

        if !output.exists() {
            return Err(PipelineError::Toolchain {
                service: service.name.clone(),
                reason: format!("compiler produced no binary at {}", output.display()),
            }
            .into());
        }

        let bytes = std::fs::read(&output).map_err(|e| PipelineError::fs("read", &output, e))?;
        let artifact = BuiltArtifact {
            service: service.name.clone(),
            sha256: sha256::digest(&bytes),
            path: output,
        };
        info!(
            "Built {} -> {} (sha256:{})",
            artifact.service,
            artifact.path.display(),
            artifact.sha256
        );
        Ok(artifact)
    }

    /// `go build <flags> -o <artifact>/<name> ./<source>` with GOOS/GOARCH set
    pub fn go_invocation(&self, service: &ServiceSpec, output: &Path) -> CommandInvocation {
        let source = Path::new(".").join(&service.source);
        let invocation = CommandInvocation::new(&self.compiler)
            .arg("build")
            .args(self.project.config.build.flags.iter().cloned())
            .arg("-o")
            .arg(output.to_string_lossy())
            .arg(source.to_string_lossy())
            .current_dir(&self.project.root);
        self.with_build_env(invocation)
            .env("GOOS", &self.project.target.os)
            .env("GOARCH", &self.project.target.arch)
            .env("CGO_ENABLED", "0")
    }

    /// `cargo build --release --target <triple>` into a scratch target dir
    pub fn cargo_invocation(
        &self,
        service: &ServiceSpec,
        triple: &str,
        target_dir: &Path,
    ) -> CommandInvocation {
        let manifest = self.project.root.join(&service.source).join("Cargo.toml");
        let invocation = CommandInvocation::new(&self.compiler)
            .args(["build", "--release", "--target", triple])
            .arg("--target-dir")
            .arg(target_dir.to_string_lossy())
            .arg("--manifest-path")
            .arg(manifest.to_string_lossy())
            .args(self.project.config.build.flags.iter().cloned())
            .current_dir(&self.project.root);
        self.with_build_env(invocation)
            .env("RUSTFLAGS", "-C target-feature=+crt-static")
    }

    fn with_build_env(&self, mut invocation: CommandInvocation) -> CommandInvocation {
        let mut extra: Vec<_> = self.project.config.build.env.iter().collect();
        extra.sort();
        for (key, value) in extra {
            invocation = invocation.env(key, value);
        }
        invocation
    }

    fn compile<R: CommandRunner>(
        &self,
        runner: &R,
        service: &ServiceSpec,
        invocation: &CommandInvocation,
    ) -> Result<()> {
        let outcome = runner
            .run(invocation)
            .map_err(|e| PipelineError::Toolchain {
                service: service.name.clone(),
                reason: format!("{:#}", e),
            })?;

        if !outcome.success() {
            error!("Build of {} failed!", service.name);
            if !outcome.stdout.trim().is_empty() {
                error!("stdout:\n{}", outcome.stdout);
            }
            if !outcome.stderr.trim().is_empty() {
                error!("stderr:\n{}", outcome.stderr);
            }
            return Err(PipelineError::Toolchain {
                service: service.name.clone(),
                reason: outcome.describe(),
            }
            .into());
        }
        Ok(())
    }
}

fn locate_compiler(project: &Project) -> Result<PathBuf> {
    let build = &project.config.build;
    match &build.compiler {
        Some(path) => {
            let path = project.root.join(path);
            if path.exists() {
                Ok(path)
            } else {
                Err(PipelineError::MissingTool {
                    program: path.display().to_string(),
                }
                .into())
            }
        }
        None => which::which(build.toolchain.program()).map_err(|_| {
            PipelineError::MissingTool {
                program: build.toolchain.program().to_string(),
            }
            .into()
        }),
    }
}

/// Package name from a crate's Cargo.toml, which cargo uses for the binary name
fn package_name(crate_dir: &Path) -> Result<String> {
    let cargo_toml_path = crate_dir.join("Cargo.toml");
    let content = std::fs::read_to_string(&cargo_toml_path)
        .with_context(|| format!("Failed to read {}", cargo_toml_path.display()))?;

    let manifest: toml::Value = toml::from_str(&content).context("Failed to parse Cargo.toml")?;

    let name = manifest
        .get("package")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .context("Failed to get package name from Cargo.toml")?;

    Ok(name.to_string())
}
