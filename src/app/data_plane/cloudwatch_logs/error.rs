//! Error types for Insights queries.

use std::time::Duration;

use super::types::QueryStatus;

#[derive(Debug, thiserror::Error)]
pub enum InsightsError {
    /// Ambient AWS config or credentials could not be resolved
    #[error("AWS configuration error: {0}")]
    Configuration(String),

    /// The engine rejected the query or could not be reached to submit it
    #[error("failed to start query on log group {log_group}: {message}")]
    Submission { log_group: String, message: String },

    /// A status or stop call failed after submission
    #[error("failed to reach query engine for query {query_id}: {message}")]
    Transport { query_id: String, message: String },

    /// The query reached a terminal status other than Complete
    #[error("query {query_id} ended with status {status}")]
    QueryFailed {
        query_id: String,
        status: QueryStatus,
    },

    #[error("invalid query request: {0}")]
    InvalidRequest(String),

    #[error("query {query_id} did not complete within {elapsed:?}")]
    DeadlineExceeded { query_id: String, elapsed: Duration },
}

impl InsightsError {
    /// Whether the query itself ran and finished unsuccessfully
    pub fn is_query_failure(&self) -> bool {
        matches!(self, InsightsError::QueryFailed { .. })
    }
}
