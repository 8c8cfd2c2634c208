//! # Nth-Level Followers
//!
//! Registers with the hiring challenge API, resolves the users at an exact
//! distance from a start user in the returned follows graph, and submits the
//! answer to the challenge webhook.
//!
//! ## Architecture
//!
//! The workflow is a single linear pass:
//!
//! 1. **Fetch**: obtain the problem from the configured source, or the fixed
//!    fallback when that fails
//! 2. **Find**: breadth-first search for the ids at the requested level
//! 3. **Deliver**: post the answer, retrying on a fixed interval
//!
//! ## Modules
//!
//! - [`config`]: Settings and dependency initialization
//! - [`graph`]: Follows graph and level finding
//! - [`delivery`]: Retry-bounded webhook delivery
//! - [`orchestrator`]: Runs the workflow once
//! - [`errors`]: Error types for the workflow

pub mod config;
pub mod delivery;
pub mod errors;
pub mod graph;
pub mod orchestrator;

pub use config::Dependencies;
pub use errors::WorkflowError;
