use super::*;
use crate::builder::ServiceBuilder;
use crate::config::Config;
use crate::constants::platform;
use crate::exec::fake::{exit, FakeRunner};
use crate::project::Project;
use crate::target::BuildTarget;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn project(root: &Path) -> Project {
    Project::new(
        root,
        Config::default(),
        BuildTarget::parse_platform(platform::LINUX_AMD64).unwrap(),
    )
}

fn is_compile(call: &str) -> bool {
    call.starts_with("go build")
}

#[test]
fn test_task_deps() {
    assert!(Task::Clean.deps().is_empty());
    assert_eq!(Task::Build.deps(), &[Task::Clean]);
    assert_eq!(Task::Package.deps(), &[Task::Build]);
    assert_eq!(Task::Test.deps(), &[Task::Build]);
    assert_eq!(Task::Demo.deps(), &[Task::Build]);
    assert_eq!(Task::Package.to_string(), "package");
}

#[test]
fn test_run_test_resolves_dependencies() {
    let dir = tempdir().unwrap();
    let project = project(dir.path());
    let runner = FakeRunner::succeeding();
    let mut pipeline = Pipeline::new(&project, &runner)
        .with_builder(ServiceBuilder::with_compiler(&project, "go"));

    pipeline.run(Task::Test).unwrap();
    assert_eq!(pipeline.completed(), &[Task::Clean, Task::Build, Task::Test]);
    assert_eq!(pipeline.artifacts().len(), 2);

    let calls = runner.rendered();
    assert_eq!(calls.len(), 5);
    assert!(calls[..2].iter().all(|c| is_compile(c)));
    assert!(calls[2].ends_with("service-1 add 2 3"));
}

#[test]
fn test_each_task_runs_once() {
    let dir = tempdir().unwrap();
    let project = project(dir.path());
    let runner = FakeRunner::succeeding();
    let mut pipeline = Pipeline::new(&project, &runner)
        .with_builder(ServiceBuilder::with_compiler(&project, "go"));

    pipeline.run(Task::Package).unwrap();
    pipeline.run(Task::Demo).unwrap();
    pipeline.run(Task::Build).unwrap();

    assert_eq!(
        pipeline.completed(),
        &[Task::Clean, Task::Build, Task::Package, Task::Demo]
    );
    let compiles = runner.rendered().iter().filter(|c| is_compile(c)).count();
    assert_eq!(compiles, 2);
}

#[test]
fn test_build_removes_stale_artifacts() {
    let dir = tempdir().unwrap();
    let project = project(dir.path());
    let dist = project.artifact_dir();
    fs::create_dir_all(&dist).unwrap();
    fs::write(dist.join("service-1.exe"), "from a windows build").unwrap();

    let runner = FakeRunner::succeeding();
    let mut pipeline = Pipeline::new(&project, &runner)
        .with_builder(ServiceBuilder::with_compiler(&project, "go"));
    pipeline.run(Task::Build).unwrap();

    let mut entries: Vec<String> = fs::read_dir(&dist)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    entries.sort();
    assert_eq!(entries, vec!["service-1", "service-2"]);
}

#[test]
fn test_build_with_package_follow_up() {
    let dir = tempdir().unwrap();
    let mut project = project(dir.path());
    project.config.build.package = true;

    let runner = FakeRunner::succeeding();
    let mut pipeline = Pipeline::new(&project, &runner)
        .with_builder(ServiceBuilder::with_compiler(&project, "go"));
    pipeline.run(Task::Build).unwrap();

    assert_eq!(
        pipeline.completed(),
        &[Task::Clean, Task::Build, Task::Package]
    );
    assert!(project.artifact_dir().join("demo.sh").is_file());
    assert!(project.artifact_dir().join("demo.bat").is_file());
}

#[test]
fn test_build_failure_stops_pipeline() {
    let dir = tempdir().unwrap();
    let project = project(dir.path());
    let runner = FakeRunner::new(|inv| {
        if inv.args.iter().any(|a| a == "./service-1") {
            Ok(exit(1))
        } else {
            Ok(exit(0))
        }
    });
    let mut pipeline = Pipeline::new(&project, &runner)
        .with_builder(ServiceBuilder::with_compiler(&project, "go"));

    let err = pipeline.run(Task::Test).unwrap_err();
    assert!(err.to_string().contains("failed to build service-1"));
    assert_eq!(runner.call_count(), 1);
    assert_eq!(pipeline.completed(), &[Task::Clean]);
}

#[test]
fn test_clean_without_artifact_dir() {
    let dir = tempdir().unwrap();
    let project = project(dir.path());
    let runner = FakeRunner::succeeding();
    let mut pipeline = Pipeline::new(&project, &runner);

    pipeline.run(Task::Clean).unwrap();
    assert!(!project.artifact_dir().exists());
    assert_eq!(runner.call_count(), 0);
}
