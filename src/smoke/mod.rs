//! Running built services against the smoke-test and demo tables
//!
//! Both tables go through [`CaseRunner::run_cases`]; they differ only in
//! [`FailurePolicy`] and in whether output is captured.

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::CaseSpec;
use crate::error::PipelineError;
use crate::exec::{display_args, CommandInvocation, CommandRunner};
use crate::project::Project;


/// What a failing case does to the rest of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failing case and return its error
    Abort,
    /// Log a warning and move on to the next case
    Continue,
}

/// Tally of a completed run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn attempted(&self) -> usize {
        self.passed + self.failed
    }
}

pub struct CaseRunner<'a, R: CommandRunner> {
    project: &'a Project,
    runner: R,
}

impl<'a, R: CommandRunner> CaseRunner<'a, R> {
    pub fn new(project: &'a Project, runner: R) -> Self {
        Self { project, runner }
    }

    /// Run the smoke-test table; any case missing its expectation aborts
    pub fn run_tests(&self) -> Result<RunSummary> {
        let summary = self.run_cases(&self.project.config.tests, FailurePolicy::Abort, false)?;
        info!("All {} smoke tests passed!", summary.passed);
        Ok(summary)
    }

    /// Run the demo table with output on the console; failures are only logged
    pub fn run_demo(&self) -> Result<RunSummary> {
        println!("=== Demo ===");
        let summary = self.run_cases(&self.project.config.demos, FailurePolicy::Continue, true)?;
        println!("\n=== Demo Complete ===");

        if summary.attempted() > 0 && summary.passed == 0 {
            return Err(PipelineError::DemoUnavailable {
                attempted: summary.attempted(),
            }
            .into());
        }
        if summary.failed > 0 {
            warn!(
                "{} of {} demo cases failed",
                summary.failed,
                summary.attempted()
            );
        }
        Ok(summary)
    }

    /// Run `cases` in order. With `console`, child output goes straight to the
    /// terminal and the owning service's description is printed each time the
    /// service changes; otherwise output is captured.
    pub fn run_cases(
        &self,
        cases: &[CaseSpec],
        policy: FailurePolicy,
        console: bool,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut current_service: Option<&str> = None;

        for case in cases {
            if console && current_service != Some(case.service.as_str()) {
                if current_service.is_some() {
                    println!();
                }
                println!("{}:", self.heading(case));
                current_service = Some(case.service.as_str());
            }

            match self.run_case(case, console) {
                Ok(()) => summary.passed += 1,
                Err(e) => match policy {
                    FailurePolicy::Abort => return Err(e),
                    FailurePolicy::Continue => {
                        warn!("{:#}", e);
                        summary.failed += 1;
                    }
                },
            }
        }
        Ok(summary)
    }

    fn run_case(&self, case: &CaseSpec, console: bool) -> Result<()> {
        let args = display_args(&case.args);
        let mut invocation = CommandInvocation::new(self.project.binary_path(&case.service))
            .args(case.args.iter().cloned());
        if console {
            invocation = invocation.inherit_output();
        } else {
            info!("Testing {} {}...", case.service, args);
        }

        let failure = |reason: String| PipelineError::Smoke {
            service: case.service.clone(),
            args: args.clone(),
            reason,
        };

        let outcome = self
            .runner
            .run(&invocation)
            .map_err(|e| failure(format!("{:#}", e)))?;
        if !outcome.stdout.is_empty() {
            debug!("{} stdout: {}", case.service, outcome.stdout.trim_end());
        }
        if !outcome.stderr.is_empty() {
            debug!("{} stderr: {}", case.service, outcome.stderr.trim_end());
        }

        match (case.expect_success, outcome.success()) {
            (true, true) | (false, false) => Ok(()),
            (true, false) => Err(failure(outcome.describe()).into()),
            (false, true) => Err(failure("expected failure but exited 0".to_string()).into()),
        }
    }

    fn heading(&self, case: &CaseSpec) -> String {
        match self.project.config.service(&case.service) {
            Some(service) if !service.description.is_empty() => service.description.clone(),
            _ => case.service.clone(),
        }
    }
}
