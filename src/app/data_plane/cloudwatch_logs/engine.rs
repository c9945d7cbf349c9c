//! Query engine abstraction.
//!
//! The poller only talks to the remote engine through [`QueryEngine`], so the
//! AWS client can be swapped for a scripted engine in tests.

#![warn(clippy::all, rust_2018_idioms)]

use async_trait::async_trait;

use super::error::InsightsError;
use super::types::{QueryHandle, QueryRequest, QueryResultsPage};

#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Submit a query and return its handle.
    ///
    /// Errors are [`InsightsError::Submission`].
    async fn start_query(&self, request: &QueryRequest) -> Result<QueryHandle, InsightsError>;

    /// Fetch the current status, plus rows once the query is complete.
    ///
    /// Errors are [`InsightsError::Transport`].
    async fn get_query_results(
        &self,
        handle: &QueryHandle,
    ) -> Result<QueryResultsPage, InsightsError>;

    /// Ask the engine to stop a running query. Returns whether it was stopped.
    async fn stop_query(&self, handle: &QueryHandle) -> Result<bool, InsightsError>;
}
