//! CloudWatch Logs Insights Integration Module
//!
//! Runs a single time-ranged Logs Insights query against one log group and
//! waits for it to finish.
//!
//! ## Features
//!
//! - Fixed query selecting request id, type and message, newest first
//! - Fixed-interval status polling with an optional overall deadline
//! - Pluggable [`QueryEngine`] so the poll loop runs against a fake engine in tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use awsinsights::app::data_plane::cloudwatch_logs::{
//!     ClientSettings, CloudWatchInsightsClient, QueryPoller, QueryRange,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = CloudWatchInsightsClient::connect(&ClientSettings::default()).await?;
//! let poller = QueryPoller::new(client);
//!
//! let range = QueryRange::new(1_700_000_000, 1_700_003_600)?;
//! for record in poller.find_logs_by_range("/aws/lambda/my-function", range).await? {
//!     println!("{}: {}", record.request_id, record.message);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all, rust_2018_idioms)]

pub mod client;
pub mod engine;
pub mod error;
pub mod poller;
pub mod types;

// Re-export commonly used types
pub use client::{ClientSettings, CloudWatchInsightsClient};
pub use engine::QueryEngine;
pub use error::InsightsError;
pub use poller::{PollSettings, QueryPoller};
pub use types::{
    LogRecord, QueryHandle, QueryRange, QueryRequest, QueryResultsPage, QueryStatistics,
    QueryStatus, ResultField, ResultRow, DEFAULT_POLL_INTERVAL, DEFAULT_QUERY,
};
