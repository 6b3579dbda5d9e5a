pub mod builder;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod exec;
pub mod package;
pub mod project;
pub mod service;
pub mod smoke;
pub mod target;

pub use anyhow::Result;
