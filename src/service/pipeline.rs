//! Task graph for clean / build / package / test / demo
//!
//! Dependencies are a static list per task, resolved depth-first before the
//! task itself runs. Each task runs at most once per [`Pipeline`].

use anyhow::Result;
use std::fmt;
use tracing::{error, info};

use crate::{
    builder::{BuiltArtifact, ServiceBuilder},
    error::PipelineError,
    exec::CommandRunner,
    package::write_demo_scripts,
    project::Project,
    smoke::CaseRunner,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    Clean,
    Build,
    Package,
    Test,
    Demo,
}

impl Task {
    /// Tasks that must complete before this one
    pub fn deps(&self) -> &'static [Task] {
        match self {
            Task::Clean => &[],
            Task::Build => &[Task::Clean],
            Task::Package | Task::Test | Task::Demo => &[Task::Build],
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Task::Clean => "clean",
            Task::Build => "build",
            Task::Package => "package",
            Task::Test => "test",
            Task::Demo => "demo",
        };
        f.write_str(name)
    }
}

/// Runs tasks against one [`Project`]
pub struct Pipeline<'a, R: CommandRunner> {
    project: &'a Project,
    runner: R,
    builder: Option<ServiceBuilder<'a>>,
    completed: Vec<Task>,
    artifacts: Vec<BuiltArtifact>,
}

impl<'a, R: CommandRunner> Pipeline<'a, R> {
    /// Compiler lookup is deferred until a build actually runs
    pub fn new(project: &'a Project, runner: R) -> Self {
        Self {
            project,
            runner,
            builder: None,
            completed: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    /// Use `builder` instead of locating the compiler
    pub fn with_builder(mut self, builder: ServiceBuilder<'a>) -> Self {
        self.builder = Some(builder);
        self
    }

    /// Tasks finished so far, in execution order
    pub fn completed(&self) -> &[Task] {
        &self.completed
    }

    /// Binaries produced by the build task
    pub fn artifacts(&self) -> &[BuiltArtifact] {
        &self.artifacts
    }

    /// Run `task` after its dependencies; a task already completed is skipped
    pub fn run(&mut self, task: Task) -> Result<()> {
        if self.completed.contains(&task) {
            return Ok(());
        }
        for dep in task.deps() {
            self.run(*dep)?;
        }

        info!("Running {}...", task);
        if let Err(e) = self.execute(task) {
            let failed = e.downcast_ref::<PipelineError>().and_then(|p| p.service());
            if let Some(service) = failed {
                error!("Task {} failed at {}", task, service);
            }
            return Err(e);
        }
        self.completed.push(task);

        if task == Task::Build && self.project.config.build.package {
            self.run(Task::Package)?;
        }
        Ok(())
    }

    fn execute(&mut self, task: Task) -> Result<()> {
        match task {
            Task::Clean => self.clean(),
            Task::Build => self.build(),
            Task::Package => {
                write_demo_scripts(&self.project.artifact_dir())?;
                Ok(())
            }
            Task::Test => {
                CaseRunner::new(self.project, &self.runner).run_tests()?;
                Ok(())
            }
            Task::Demo => {
                CaseRunner::new(self.project, &self.runner).run_demo()?;
                Ok(())
            }
        }
    }

    fn clean(&self) -> Result<()> {
        let dir = self.project.artifact_dir();
        info!("Cleaning {}...", dir.display());
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PipelineError::fs("remove", dir, e).into()),
        }
    }

    fn build(&mut self) -> Result<()> {
        let builder = match self.builder.take() {
            Some(builder) => builder,
            None => ServiceBuilder::new(self.project)?,
        };
        let result = builder.build_all(&self.runner);
        self.builder = Some(builder);
        self.artifacts = result?;
        info!(
            "Build complete! {} service(s) for {}",
            self.artifacts.len(),
            self.project.target
        );
        Ok(())
    }
}
