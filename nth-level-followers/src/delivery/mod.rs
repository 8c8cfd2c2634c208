//! Delivery module: retry-bounded webhook submission.
//!
//! Submits an answer through an injected [`WebhookTransport`], retrying
//! failed attempts on a fixed interval until the attempt budget is spent.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use challenge_api::{ApiError, WebhookRequest, WebhookTransport};
use tokio_retry::{strategy::FixedInterval, Retry};
use tracing::{error, info, instrument, warn};

/// Default number of attempts, including the first.
pub const DEFAULT_MAX_ATTEMPTS: usize = 4;

/// Default pause between consecutive attempts.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Attempt budget and fixed backoff for delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPolicy {
    /// Total attempts, including the first. Values below 1 behave as 1.
    pub max_attempts: usize,
    /// Constant pause between attempts.
    pub backoff: Duration,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl DeliveryPolicy {
    /// Pauses taken between attempts: one fewer than the attempt budget.
    fn retry_strategy(&self) -> impl Iterator<Item = Duration> {
        FixedInterval::new(self.backoff).take(self.max_attempts.saturating_sub(1))
    }
}

/// Terminal delivery failure.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Every attempt failed; carries the last attempt's error.
    #[error("Delivery failed after {attempts} attempts: {source}")]
    Exhausted {
        attempts: usize,
        #[source]
        source: ApiError,
    },
}

/// Successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Attempts made, including the successful one.
    pub attempts: usize,
    /// Response body returned by the webhook.
    pub response: String,
}

/// Delivers answers with a bounded number of attempts.
pub struct DeliveryRetrier {
    transport: Arc<dyn WebhookTransport>,
    policy: DeliveryPolicy,
}

impl DeliveryRetrier {
    /// Create a retrier with the default policy (4 attempts, 1 second apart).
    pub fn new(transport: Arc<dyn WebhookTransport>) -> Self {
        Self::with_policy(transport, DeliveryPolicy::default())
    }

    pub fn with_policy(transport: Arc<dyn WebhookTransport>, policy: DeliveryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Deliver `payload` to `destination`, authenticated with `credential`.
    ///
    /// Each attempt is one call to the transport. After a failure the retrier
    /// waits the fixed backoff and tries again, until an attempt succeeds or
    /// the budget is spent. Exhaustion returns [`DeliveryError::Exhausted`]
    /// with the last error.
    #[instrument(skip(self, payload, credential), fields(outcome_len = payload.outcome.len()))]
    pub async fn deliver(
        &self,
        payload: &WebhookRequest,
        destination: &str,
        credential: &str,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        info!(
            max_attempts = self.policy.max_attempts.max(1),
            backoff_ms = self.policy.backoff.as_millis() as u64,
            "Sending webhook request"
        );

        let attempts = AtomicUsize::new(0);
        let result = Retry::spawn(self.policy.retry_strategy(), || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                match self.transport.submit(destination, credential, payload).await {
                    Ok(response) => {
                        info!(attempt, response = %response, "Webhook accepted submission");
                        Ok(response)
                    }
                    Err(e) => {
                        warn!(attempt, error = %e, "Webhook attempt failed");
                        Err(e)
                    }
                }
            }
        })
        .await;

        let attempts = attempts.load(Ordering::SeqCst);
        match result {
            Ok(response) => Ok(DeliveryReceipt { attempts, response }),
            Err(source) => {
                error!(attempts, error = %source, "All webhook attempts failed");
                Err(DeliveryError::Exhausted { attempts, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use challenge_api::MockWebhookTransport;
    use tokio::time::Instant;

    const URL: &str = "https://example.com/webhook";
    const TOKEN: &str = "token";

    fn payload() -> WebhookRequest {
        WebhookRequest::new("REG123", vec![4, 5])
    }

    /// Paused-clock timers fire on millisecond ticks.
    fn assert_waited(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual < expected + Duration::from_millis(10),
            "waited {:?}, expected {:?}",
            actual,
            expected
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success_has_no_pause() {
        let transport = Arc::new(MockWebhookTransport::accepting());
        let retrier = DeliveryRetrier::new(transport.clone());

        let started = Instant::now();
        let receipt = retrier.deliver(&payload(), URL, TOKEN).await.unwrap();

        assert_eq!(receipt.attempts, 1);
        assert_eq!(transport.attempts(), 1);
        assert_waited(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_fourth_attempt() {
        let transport = Arc::new(MockWebhookTransport::failing_first(3));
        let retrier = DeliveryRetrier::new(transport.clone());

        let started = Instant::now();
        let receipt = retrier.deliver(&payload(), URL, TOKEN).await.unwrap();

        assert_eq!(receipt.attempts, 4);
        assert_eq!(receipt.response, "accepted on attempt 4");

        let submissions = transport.submissions();
        assert_eq!(submissions.len(), 4);
        for pair in submissions.windows(2) {
            assert_waited(pair[1].at - pair[0].at, DEFAULT_BACKOFF);
        }
        assert_waited(started.elapsed(), DEFAULT_BACKOFF * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_stops_after_budget() {
        let transport = Arc::new(MockWebhookTransport::always_failing());
        let retrier = DeliveryRetrier::new(transport.clone());

        let started = Instant::now();
        let err = retrier.deliver(&payload(), URL, TOKEN).await.unwrap_err();

        let DeliveryError::Exhausted { attempts, source } = err;
        assert_eq!(attempts, 4);
        assert_eq!(transport.attempts(), 4);
        assert!(source.to_string().contains("attempt 4"));
        assert_waited(started.elapsed(), DEFAULT_BACKOFF * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_attempt_carries_destination_and_credential() {
        let transport = Arc::new(MockWebhookTransport::failing_first(1));
        let retrier = DeliveryRetrier::new(transport.clone());

        retrier.deliver(&payload(), URL, TOKEN).await.unwrap();

        for submission in transport.submissions() {
            assert_eq!(submission.webhook_url, URL);
            assert_eq!(submission.access_token, TOKEN);
            assert_eq!(submission.request, payload());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_policy() {
        let transport = Arc::new(MockWebhookTransport::always_failing());
        let policy = DeliveryPolicy {
            max_attempts: 2,
            backoff: Duration::from_millis(250),
        };
        let retrier = DeliveryRetrier::with_policy(transport.clone(), policy);

        let started = Instant::now();
        assert!(retrier.deliver(&payload(), URL, TOKEN).await.is_err());
        assert_eq!(transport.attempts(), 2);
        assert_waited(started.elapsed(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_budget_still_attempts_once() {
        let transport = Arc::new(MockWebhookTransport::always_failing());
        let policy = DeliveryPolicy {
            max_attempts: 0,
            backoff: DEFAULT_BACKOFF,
        };
        let retrier = DeliveryRetrier::with_policy(transport.clone(), policy);

        let err = retrier.deliver(&payload(), URL, TOKEN).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Exhausted { attempts: 1, .. }));
        assert_eq!(transport.attempts(), 1);
    }
}
