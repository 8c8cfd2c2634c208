//! Error types for the followers workflow.

use challenge_api::ApiError;
use thiserror::Error;

use crate::delivery::DeliveryError;

/// Errors that can occur during workflow initialization or execution.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Neither the configured source nor the fallback produced a problem.
    #[error("Fetch error: {0}")]
    FetchError(#[from] ApiError),

    /// Delivery exhausted its attempt budget and the failure mode is abort.
    #[error("Delivery error: {0}")]
    DeliveryError(#[from] DeliveryError),
}

impl WorkflowError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
