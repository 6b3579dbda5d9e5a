use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::service::Task;

#[derive(Parser)]
#[command(name = "svcbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory containing the service sources
    #[arg(short = 'C', long, global = true, value_name = "DIRECTORY")]
    pub project_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Target platform as OS/ARCH (e.g. linux/amd64, windows/amd64).
    /// Defaults to SVCBUILD_TARGET_OS / SVCBUILD_TARGET_ARCH, then the host
    #[arg(long)]
    pub platform: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean, then compile every service into the artifact directory
    Build {
        #[command(flatten)]
        target: TargetArgs,

        /// Write the demo scripts after a successful build
        #[arg(long)]
        package: bool,
    },

    /// Remove the artifact directory
    Clean,

    /// Build, then write demo.sh and demo.bat next to the binaries
    #[command(alias = "install")]
    Package {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Build, then run the smoke-test table against the binaries
    Test {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Build, then run each service with illustrative arguments
    Demo {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Show version information
    Version,
}

impl Commands {
    /// Pipeline task for this command, if it runs one
    pub fn task(&self) -> Option<Task> {
        match self {
            Commands::Build { .. } => Some(Task::Build),
            Commands::Clean => Some(Task::Clean),
            Commands::Package { .. } => Some(Task::Package),
            Commands::Test { .. } => Some(Task::Test),
            Commands::Demo { .. } => Some(Task::Demo),
            Commands::Version => None,
        }
    }

    pub fn platform(&self) -> Option<&str> {
        match self {
            Commands::Build { target, .. }
            | Commands::Package { target }
            | Commands::Test { target }
            | Commands::Demo { target } => target.platform.as_deref(),
            Commands::Clean | Commands::Version => None,
        }
    }
}
