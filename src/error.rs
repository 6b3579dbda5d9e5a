//! Error taxonomy for the build pipeline
//!
//! Operations return `anyhow::Result`; the variants here are what ends up inside,
//! so callers can `downcast_ref::<PipelineError>()` to tell failures apart.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// The toolchain compiler failed for a service
    #[error("failed to build {service}: {reason}")]
    Toolchain { service: String, reason: String },

    /// The compiler program could not be located
    #[error("missing toolchain: `{program}` not found")]
    MissingTool { program: String },

    /// A filesystem operation on the project or artifact directory failed
    #[error("failed to {action} {}", .path.display())]
    FileSystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A test or demo case did not meet its expectation
    #[error("{service} {args}: {reason}")]
    Smoke {
        service: String,
        args: String,
        reason: String,
    },

    /// Every demo case failed to run
    #[error("no demo case could run ({attempted} attempted)")]
    DemoUnavailable { attempted: usize },

    /// Invalid configuration file or command-line setting
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl PipelineError {
    pub fn fs(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            action,
            path: path.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Service named by this error, if any; the pipeline logs it with the failed task
    pub fn service(&self) -> Option<&str> {
        match self {
            Self::Toolchain { service, .. } | Self::Smoke { service, .. } => {
                Some(service.as_str())
            }
            _ => None,
        }
    }
}
