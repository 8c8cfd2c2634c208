//! Webhook submission.

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;

use crate::{ApiError, Result, WebhookRequest};

/// Trait for posting an answer to a webhook.
///
/// One call is one attempt: implementations must not retry internally.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// Post `request` to `webhook_url` with `access_token` as bearer credential.
    ///
    /// Returns the response body on a success status. Any other status, or a
    /// transport-level failure, is an error.
    async fn submit(
        &self,
        webhook_url: &str,
        access_token: &str,
        request: &WebhookRequest,
    ) -> Result<String>;
}

/// Webhook transport backed by reqwest.
#[derive(Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
}

impl HttpTransport {
    pub fn new(client: ReqwestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WebhookTransport for HttpTransport {
    async fn submit(
        &self,
        webhook_url: &str,
        access_token: &str,
        request: &WebhookRequest,
    ) -> Result<String> {
        tracing::debug!(webhook_url = %webhook_url, request = ?request, "Posting webhook request");

        let res = self
            .client
            .post(webhook_url)
            .bearer_auth(access_token)
            .json(request)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status { status, body });
        }

        Ok(body)
    }
}
