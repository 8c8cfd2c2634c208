//! Mock clients for testing and offline runs.
//!
//! [`MockApiClient`] answers registrations with a fixed response, by default
//! the fallback problem from [`mock_problem_response`]. [`MockWebhookTransport`]
//! records submissions and fails a scripted number of them.
//!
//! # Example
//!
//! ```ignore
//! use challenge_api::{MockApiClient, MockWebhookTransport, ProblemFetcher};
//!
//! let client = MockApiClient::default();
//! let problem = client.register(&request).await?.into_problem()?;
//!
//! // Fails the first three submissions, accepts the fourth
//! let transport = MockWebhookTransport::failing_first(3);
//! ```

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::json;
use tokio::time::Instant;

use crate::{
    ApiError, InitialRequest, InitialResponse, ProblemFetcher, Result, WebhookRequest,
    WebhookTransport,
};

const MOCK_WEBHOOK_URL: &str = "https://mockwebhook.bajajfinserv.in/webhook";
const MOCK_ACCESS_TOKEN: &str = "mock-jwt-token-12345";

/// The fallback problem used when the live API is unusable.
///
/// User 1 follows 2 and 3, user 2 follows 4, user 3 follows 4 and 5. Starting
/// from 1, level 1 is `[2, 3]` and level 2 is `[4, 5]`. The problem is carried
/// in the nested `data` shape.
pub fn mock_problem_response() -> InitialResponse {
    InitialResponse {
        webhook_url: Some(MOCK_WEBHOOK_URL.to_string()),
        access_token: Some(MOCK_ACCESS_TOKEN.to_string()),
        data: Some(json!({
            "findId": 1,
            "level": 2,
            "users": [
                { "id": 1, "follows": [2, 3] },
                { "id": 2, "follows": [4] },
                { "id": 3, "follows": [4, 5] },
                { "id": 4, "follows": [] },
                { "id": 5, "follows": [] }
            ]
        })),
        ..Default::default()
    }
}

/// Mock problem fetcher returning a pre-configured response.
pub struct MockApiClient {
    response: Option<InitialResponse>,
    requests: Mutex<Vec<InitialRequest>>,
}

impl MockApiClient {
    /// Create a mock that always returns `response`.
    pub fn new(response: InitialResponse) -> Self {
        Self {
            response: Some(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock whose registration call always fails.
    pub fn unavailable() -> Self {
        Self {
            response: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Registration requests received so far.
    pub fn requests(&self) -> Vec<InitialRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MockApiClient {
    fn default() -> Self {
        Self::new(mock_problem_response())
    }
}

#[async_trait]
impl ProblemFetcher for MockApiClient {
    async fn register(&self, request: &InitialRequest) -> Result<InitialResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        self.response
            .clone()
            .ok_or_else(|| ApiError::NetworkError("mock challenge API is unavailable".to_string()))
    }
}

/// A submission seen by [`MockWebhookTransport`].
#[derive(Debug, Clone)]
pub struct Submission {
    pub webhook_url: String,
    pub access_token: String,
    pub request: WebhookRequest,
    /// When the attempt was made, on the tokio clock.
    pub at: Instant,
}

/// Mock webhook that fails a scripted number of submissions.
pub struct MockWebhookTransport {
    failures_before_success: Option<usize>,
    submissions: Mutex<Vec<Submission>>,
}

impl MockWebhookTransport {
    /// Accept every submission.
    pub fn accepting() -> Self {
        Self::failing_first(0)
    }

    /// Fail the first `failures` submissions, then accept.
    pub fn failing_first(failures: usize) -> Self {
        Self {
            failures_before_success: Some(failures),
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// Fail every submission.
    pub fn always_failing() -> Self {
        Self {
            failures_before_success: None,
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn attempts(&self) -> usize {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl WebhookTransport for MockWebhookTransport {
    async fn submit(
        &self,
        webhook_url: &str,
        access_token: &str,
        request: &WebhookRequest,
    ) -> Result<String> {
        let attempt = {
            let mut submissions = self.submissions.lock().unwrap_or_else(PoisonError::into_inner);
            submissions.push(Submission {
                webhook_url: webhook_url.to_string(),
                access_token: access_token.to_string(),
                request: request.clone(),
                at: Instant::now(),
            });
            submissions.len()
        };

        match self.failures_before_success {
            Some(failures) if attempt > failures => Ok(format!("accepted on attempt {}", attempt)),
            _ => Err(ApiError::NetworkError(format!(
                "mock webhook rejected attempt {}",
                attempt
            ))),
        }
    }
}
