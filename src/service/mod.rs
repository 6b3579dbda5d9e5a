//! Service layer for task orchestration
//!
//! Keeps the step ordering and failure handling out of the CLI layer in main.rs.

pub mod pipeline;

pub use pipeline::{Pipeline, Task};

#[cfg(test)]
mod tests;
