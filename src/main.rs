use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use svcbuild::{
    cli::{Cli, Commands},
    exec::SystemRunner,
    project::Project,
    service::Pipeline,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let task = match cli.command.task() {
        Some(task) => task,
        None => {
            println!("svcbuild {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
    };

    let root = cli.project_dir.unwrap_or_else(|| PathBuf::from("."));
    let mut project = Project::load(&root, cli.command.platform())?;
    if let Commands::Build { package: true, .. } = cli.command {
        project.config.build.package = true;
    }
    info!("Target platform: {}", project.target);

    let mut pipeline = Pipeline::new(&project, SystemRunner);
    pipeline.run(task)?;

    info!("Done: {}", task);
    Ok(())
}
