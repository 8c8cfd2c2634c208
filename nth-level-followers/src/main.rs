//! Nth-Level Followers Main Entry Point
//!
//! Runs the challenge workflow once and exits.

use dotenv::dotenv;
use nth_level_followers::{Dependencies, WorkflowError};
use std::env;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nth_level_followers=info,challenge_api=info"));

    let json = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();
    }

    info!(
        service_name = "nth-level-followers",
        service_version = env!("CARGO_PKG_VERSION"),
        json,
        "Tracing initialized"
    );
}

#[tokio::main]
async fn main() -> Result<(), WorkflowError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing();

    let deps = match Dependencies::new() {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    match deps.orchestrator.run().await {
        Ok(report) => {
            info!(
                origin = ?report.origin,
                outcome = ?report.outcome,
                delivered = report.delivered,
                attempts = report.attempts,
                "Challenge workflow finished"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Challenge workflow failed");
            Err(e)
        }
    }
}
