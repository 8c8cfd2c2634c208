//! Configuration module for the followers workflow.
//! Reads settings from the environment and wires the orchestrator.
mod dependencies;

pub use dependencies::{Dependencies, Settings};
