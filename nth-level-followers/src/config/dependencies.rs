//! Dependency initialization and wiring for the followers workflow.

use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use challenge_api::{http_client, HttpTransport, InitialRequest, ProblemSource, DEFAULT_API_URL};

use crate::delivery::{DeliveryPolicy, DeliveryRetrier, DEFAULT_BACKOFF, DEFAULT_MAX_ATTEMPTS};
use crate::errors::WorkflowError;
use crate::orchestrator::{DeliveryFailureMode, Orchestrator, OrchestratorConfig};

/// Default per-request HTTP timeout in seconds.
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

impl DeliveryFailureMode {
    /// Parse failure mode from environment variable.
    ///
    /// Valid values: "log" or "fail" (case-insensitive)
    /// Defaults to "log" if not set or invalid.
    fn from_env() -> Self {
        match env::var("DELIVERY_FAILURE_MODE")
            .unwrap_or_else(|_| "log".to_string())
            .to_lowercase()
            .as_str()
        {
            "log" | "continue" | "log-and-continue" => Self::LogAndContinue,
            "fail" | "abort" => Self::Abort,
            _ => {
                warn!("Invalid DELIVERY_FAILURE_MODE, defaulting to 'log'");
                Self::LogAndContinue
            }
        }
    }
}

/// Settings read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source: ProblemSource,
    pub registration: InitialRequest,
    pub http_timeout: Duration,
    pub delivery: DeliveryPolicy,
    pub failure_mode: DeliveryFailureMode,
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `PROBLEM_SOURCE`: "live" or "mock" (default: live)
    /// - `CHALLENGE_API_URL`: Registration endpoint (default: the hiring generateWebhook endpoint)
    /// - `CANDIDATE_NAME`, `CANDIDATE_REG_NO`, `CANDIDATE_EMAIL`: Registration body (required)
    /// - `HTTP_TIMEOUT_SECS`: Per-request timeout in seconds (default: 30)
    /// - `DELIVERY_MAX_ATTEMPTS`: Webhook attempt budget (default: 4)
    /// - `DELIVERY_BACKOFF_MS`: Pause between webhook attempts (default: 1000)
    /// - `DELIVERY_FAILURE_MODE`: "log" or "fail" (default: log)
    pub fn from_env() -> Result<Self, WorkflowError> {
        let api_url =
            env::var("CHALLENGE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let source = match env::var("PROBLEM_SOURCE")
            .unwrap_or_else(|_| "live".to_string())
            .to_lowercase()
            .as_str()
        {
            "mock" => ProblemSource::mock(),
            "live" => ProblemSource::live(api_url),
            _ => {
                warn!("Invalid PROBLEM_SOURCE, defaulting to 'live'");
                ProblemSource::live(api_url)
            }
        };

        let registration = InitialRequest::new(
            required_var("CANDIDATE_NAME")?,
            required_var("CANDIDATE_REG_NO")?,
            required_var("CANDIDATE_EMAIL")?,
        );

        let http_timeout = Duration::from_secs(
            parsed_var("HTTP_TIMEOUT_SECS", |secs: &u64| *secs > 0)
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        );

        let delivery = DeliveryPolicy {
            max_attempts: parsed_var("DELIVERY_MAX_ATTEMPTS", |n: &usize| *n > 0)
                .unwrap_or(DEFAULT_MAX_ATTEMPTS),
            backoff: parsed_var("DELIVERY_BACKOFF_MS", |_: &u64| true)
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_BACKOFF),
        };

        Ok(Self {
            source,
            registration,
            http_timeout,
            delivery,
            failure_mode: DeliveryFailureMode::from_env(),
        })
    }
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// See [`Settings::from_env`] for the variables read.
    pub fn new() -> Result<Self, WorkflowError> {
        Self::from_settings(Settings::from_env()?)
    }

    /// Wire the orchestrator from already-read settings.
    pub fn from_settings(settings: Settings) -> Result<Self, WorkflowError> {
        info!(
            mock_source = settings.source.is_mock(),
            http_timeout_secs = settings.http_timeout.as_secs(),
            max_attempts = settings.delivery.max_attempts,
            backoff_ms = settings.delivery.backoff.as_millis() as u64,
            failure_mode = ?settings.failure_mode,
            "Initializing dependencies"
        );

        let client = http_client(settings.http_timeout)
            .map_err(|e| WorkflowError::config(format!("Failed to build HTTP client: {}", e)))?;

        let fetcher = settings.source.into_fetcher(client.clone());
        let transport = Arc::new(HttpTransport::new(client));
        let retrier = DeliveryRetrier::with_policy(transport, settings.delivery);

        let orchestrator = Orchestrator::with_config(
            fetcher,
            retrier,
            settings.registration,
            OrchestratorConfig {
                failure_mode: settings.failure_mode,
            },
        );

        Ok(Self { orchestrator })
    }
}

fn required_var(name: &str) -> Result<String, WorkflowError> {
    env::var(name).map_err(|_| WorkflowError::config(format!("{} must be set", name)))
}

/// Parse an optional variable, warning and returning `None` when it is
/// present but unparseable or rejected by `valid`.
fn parsed_var<T: std::str::FromStr>(name: &str, valid: impl Fn(&T) -> bool) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => Some(value),
        _ => {
            warn!(variable = name, value = %raw, "Invalid value, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "PROBLEM_SOURCE",
        "CHALLENGE_API_URL",
        "CANDIDATE_NAME",
        "CANDIDATE_REG_NO",
        "CANDIDATE_EMAIL",
        "HTTP_TIMEOUT_SECS",
        "DELIVERY_MAX_ATTEMPTS",
        "DELIVERY_BACKOFF_MS",
        "DELIVERY_FAILURE_MODE",
    ];

    fn clear_env_vars() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn set_candidate_vars() {
        env::set_var("CANDIDATE_NAME", "Jane Doe");
        env::set_var("CANDIDATE_REG_NO", "REG123");
        env::set_var("CANDIDATE_EMAIL", "jane@example.com");
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env_vars();
        set_candidate_vars();

        let settings = Settings::from_env().unwrap();
        assert!(matches!(
            &settings.source,
            ProblemSource::Live { api_url } if api_url == DEFAULT_API_URL
        ));
        assert_eq!(
            settings.registration,
            InitialRequest::new("Jane Doe", "REG123", "jane@example.com")
        );
        assert_eq!(settings.http_timeout, Duration::from_secs(30));
        assert_eq!(settings.delivery, DeliveryPolicy::default());
        assert_eq!(settings.failure_mode, DeliveryFailureMode::LogAndContinue);

        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_missing_candidate_is_config_error() {
        clear_env_vars();
        env::set_var("CANDIDATE_NAME", "Jane Doe");

        match Settings::from_env() {
            Err(WorkflowError::ConfigError(msg)) => {
                assert!(msg.contains("CANDIDATE_REG_NO"))
            }
            other => panic!("Expected config error, got {:?}", other.map(|_| ())),
        }

        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env_vars();
        set_candidate_vars();
        env::set_var("PROBLEM_SOURCE", "MOCK");
        env::set_var("HTTP_TIMEOUT_SECS", "5");
        env::set_var("DELIVERY_MAX_ATTEMPTS", "2");
        env::set_var("DELIVERY_BACKOFF_MS", "250");
        env::set_var("DELIVERY_FAILURE_MODE", "fail");

        let settings = Settings::from_env().unwrap();
        assert!(settings.source.is_mock());
        assert_eq!(settings.http_timeout, Duration::from_secs(5));
        assert_eq!(settings.delivery.max_attempts, 2);
        assert_eq!(settings.delivery.backoff, Duration::from_millis(250));
        assert_eq!(settings.failure_mode, DeliveryFailureMode::Abort);

        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_invalid_values_fall_back_to_defaults() {
        clear_env_vars();
        set_candidate_vars();
        env::set_var("CHALLENGE_API_URL", "http://localhost:9000/register");
        env::set_var("PROBLEM_SOURCE", "carrier-pigeon");
        env::set_var("HTTP_TIMEOUT_SECS", "0");
        env::set_var("DELIVERY_MAX_ATTEMPTS", "-3");
        env::set_var("DELIVERY_BACKOFF_MS", "soon");
        env::set_var("DELIVERY_FAILURE_MODE", "shrug");

        let settings = Settings::from_env().unwrap();
        assert!(matches!(
            &settings.source,
            ProblemSource::Live { api_url } if api_url == "http://localhost:9000/register"
        ));
        assert_eq!(settings.http_timeout, Duration::from_secs(30));
        assert_eq!(settings.delivery, DeliveryPolicy::default());
        assert_eq!(settings.failure_mode, DeliveryFailureMode::LogAndContinue);

        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_dependencies_wire_from_env() {
        clear_env_vars();
        set_candidate_vars();
        env::set_var("PROBLEM_SOURCE", "mock");

        assert!(Dependencies::new().is_ok());

        clear_env_vars();
    }
}
