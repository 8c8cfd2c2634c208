//! Client for the hiring challenge API.
//!
//! This crate provides:
//! - [`ProblemSource`] config enum for choosing between mock and live problem sources
//! - [`ProblemFetcher`] trait for abstracting the registration call
//! - [`ApiClient`] production client that registers against the challenge API
//! - [`MockApiClient`] mock client returning a fixed problem
//! - [`WebhookTransport`] trait and [`HttpTransport`] for submitting answers
//! - [`models`] wire types and the normalization into a [`Problem`]
//!
//! ## Usage with ProblemSource (Recommended)
//!
//! ```ignore
//! use challenge_api::{http_client, ProblemSource};
//!
//! let client = http_client(Duration::from_secs(30))?;
//!
//! // Development/testing: use the fixed mock problem
//! let fetcher = ProblemSource::mock().into_fetcher(client.clone());
//!
//! // Production: register against the live API
//! let fetcher = ProblemSource::live(DEFAULT_API_URL).into_fetcher(client);
//!
//! let problem = fetcher.register(&request).await?.into_problem()?;
//! ```

mod mock;
pub mod models;
mod transport;

pub use mock::{mock_problem_response, MockApiClient, MockWebhookTransport, Submission};
pub use models::{InitialRequest, InitialResponse, NodeId, Problem, UserRecord, WebhookRequest};
pub use transport::{HttpTransport, WebhookTransport};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;

/// Registration endpoint of the challenge API.
pub const DEFAULT_API_URL: &str = "https://bfhldevapigw.healthrx.co.in/hiring/generateWebhook";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("invalid field {field}: {value}")]
    InvalidField { field: &'static str, value: String },
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ApiError {
    pub(crate) fn invalid(field: &'static str, value: impl ToString) -> Self {
        Self::InvalidField {
            field,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Build the HTTP client shared by the problem fetcher and the webhook transport.
///
/// Every request made through it resolves within `timeout`, so a hung call
/// surfaces as a failed attempt instead of stalling the caller.
pub fn http_client(timeout: Duration) -> Result<ReqwestClient> {
    let client = ReqwestClient::builder().timeout(timeout).build()?;
    Ok(client)
}

/// Trait for obtaining a problem from the challenge API.
///
/// Production code uses [`ApiClient`], while tests and offline runs use
/// [`MockApiClient`].
#[async_trait]
pub trait ProblemFetcher: Send + Sync {
    /// Register the candidate and return the raw API response.
    ///
    /// The response is not validated here; call
    /// [`InitialResponse::into_problem`] to normalize it.
    async fn register(&self, request: &InitialRequest) -> Result<InitialResponse>;
}

/// Production client that registers against the challenge API.
pub struct ApiClient {
    url: String,
    client: ReqwestClient,
}

impl ApiClient {
    pub fn new(url: &str, client: ReqwestClient) -> Self {
        ApiClient {
            url: url.to_string(),
            client,
        }
    }
}

#[async_trait]
impl ProblemFetcher for ApiClient {
    async fn register(&self, request: &InitialRequest) -> Result<InitialResponse> {
        tracing::info!(url = %self.url, "Sending registration request");
        tracing::debug!(request = ?request, "Registration request body");

        let res = self.client.post(&self.url).json(request).send().await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::error!(status = %status, "Challenge API returned error status");
            return Err(ApiError::Status { status, body });
        }

        let bytes = res.bytes().await?;
        let response: InitialResponse = serde_json::from_slice(&bytes)?;

        tracing::info!(
            webhook_url = ?response.webhook_url,
            "Received registration response"
        );
        Ok(response)
    }
}

/// Configuration for the problem source.
///
/// Pick mock or live explicitly and turn it into a boxed [`ProblemFetcher`].
#[derive(Debug, Clone)]
pub enum ProblemSource {
    /// Return a fixed response without touching the network.
    Mock(InitialResponse),

    /// Register against a live challenge API.
    Live {
        /// Registration endpoint (e.g. [`DEFAULT_API_URL`])
        api_url: String,
    },
}

impl ProblemSource {
    /// Mock source serving the built-in fallback problem.
    pub fn mock() -> Self {
        Self::Mock(mock_problem_response())
    }

    pub fn live(api_url: impl Into<String>) -> Self {
        Self::Live {
            api_url: api_url.into(),
        }
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, Self::Mock(_))
    }

    /// Create the appropriate ProblemFetcher implementation.
    ///
    /// The mock variant ignores `client`.
    pub fn into_fetcher(self, client: ReqwestClient) -> Box<dyn ProblemFetcher> {
        match self {
            Self::Mock(response) => Box::new(MockApiClient::new(response)),
            Self::Live { api_url } => Box::new(ApiClient::new(&api_url, client)),
        }
    }
}
