//! Orchestrator module for the followers workflow.
//!
//! Runs the one-shot flow: obtain a problem, resolve the followers at the
//! requested level, submit the answer.

use challenge_api::{
    InitialRequest, InitialResponse, MockApiClient, NodeId, Problem, ProblemFetcher,
    WebhookRequest,
};
use tracing::{error, info, instrument, warn};

use crate::delivery::{DeliveryError, DeliveryRetrier};
use crate::errors::WorkflowError;
use crate::graph::{find_at_level, Graph};

/// What to do when delivery exhausts its attempt budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryFailureMode {
    /// Log the failure and the unsent answer, then complete.
    #[default]
    LogAndContinue,
    /// Return the delivery error from the run.
    Abort,
}

/// Configuration for the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub failure_mode: DeliveryFailureMode,
}

/// Where the problem came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemOrigin {
    /// The configured problem source.
    Primary,
    /// The fallback source, after the primary failed or was incomplete.
    Fallback,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowReport {
    pub origin: ProblemOrigin,
    pub find_id: NodeId,
    pub level: i64,
    /// Ids at the requested level, ascending.
    pub outcome: Vec<NodeId>,
    /// Whether the webhook accepted the answer.
    pub delivered: bool,
    /// Attempts spent on delivery.
    pub attempts: usize,
}

/// Orchestrator that runs the workflow once.
pub struct Orchestrator {
    fetcher: Box<dyn ProblemFetcher>,
    fallback: Box<dyn ProblemFetcher>,
    retrier: DeliveryRetrier,
    registration: InitialRequest,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create an orchestrator that falls back to the built-in mock problem.
    pub fn new(
        fetcher: Box<dyn ProblemFetcher>,
        retrier: DeliveryRetrier,
        registration: InitialRequest,
    ) -> Self {
        Self::with_config(fetcher, retrier, registration, OrchestratorConfig::default())
    }

    /// Create an orchestrator with custom configuration.
    pub fn with_config(
        fetcher: Box<dyn ProblemFetcher>,
        retrier: DeliveryRetrier,
        registration: InitialRequest,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            fetcher,
            fallback: Box::new(MockApiClient::default()),
            retrier,
            registration,
            config,
        }
    }

    /// Replace the fallback problem source.
    pub fn with_fallback(mut self, fallback: Box<dyn ProblemFetcher>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Run the workflow.
    ///
    /// Fails only when no problem can be obtained at all, or when delivery
    /// fails under [`DeliveryFailureMode::Abort`].
    #[instrument(skip(self), fields(reg_no = %self.registration.reg_no))]
    pub async fn run(&self) -> Result<WorkflowReport, WorkflowError> {
        info!("Starting nth-level followers workflow");

        let (problem, origin) = self.acquire_problem().await?;

        info!(
            origin = ?origin,
            find_id = problem.find_id,
            level = problem.level,
            users = problem.users.len(),
            "Processing problem"
        );

        let graph = Graph::from_records(problem.users);
        let outcome = find_at_level(&graph, problem.find_id, problem.level);

        info!(level = problem.level, outcome = ?outcome, "Found followers at level");

        let payload = WebhookRequest::new(self.registration.reg_no.clone(), outcome);

        let (delivered, attempts) = match self
            .retrier
            .deliver(&payload, &problem.webhook_url, &problem.access_token)
            .await
        {
            Ok(receipt) => {
                info!(attempts = receipt.attempts, "Successfully submitted solution to webhook");
                (true, receipt.attempts)
            }
            Err(e) => match self.config.failure_mode {
                DeliveryFailureMode::Abort => {
                    error!(error = %e, "Failed to submit solution to webhook, aborting");
                    return Err(e.into());
                }
                DeliveryFailureMode::LogAndContinue => {
                    error!(error = %e, "Failed to submit solution to webhook");
                    info!(payload = ?payload, "Would have submitted this solution");
                    let DeliveryError::Exhausted { attempts, .. } = e;
                    (false, attempts)
                }
            },
        };

        info!(delivered, "Workflow completed");

        Ok(WorkflowReport {
            origin,
            find_id: problem.find_id,
            level: problem.level,
            outcome: payload.outcome,
            delivered,
            attempts,
        })
    }

    /// Fetch and normalize a problem, falling back when the primary source
    /// fails or returns an incomplete response.
    async fn acquire_problem(&self) -> Result<(Problem, ProblemOrigin), WorkflowError> {
        let primary = self
            .fetcher
            .register(&self.registration)
            .await
            .and_then(InitialResponse::into_problem);

        match primary {
            Ok(problem) => Ok((problem, ProblemOrigin::Primary)),
            Err(e) => {
                warn!(error = %e, "Problem source unusable, using fallback data instead");
                let problem = self
                    .fallback
                    .register(&self.registration)
                    .await?
                    .into_problem()?;
                Ok((problem, ProblemOrigin::Fallback))
            }
        }
    }
}
