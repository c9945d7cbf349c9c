//! Data Plane Services Module
//!
//! AWS data plane integrations: services that query data held inside AWS
//! resources rather than discover or manage the resources themselves.
//!
//! ## Available Services
//!
//! - **CloudWatch Logs Insights**: run a range query over a log group and
//!   collect the matching records

pub mod cloudwatch_logs;

// Re-export commonly used types
pub use cloudwatch_logs::{
    CloudWatchInsightsClient, InsightsError, LogRecord, QueryPoller, QueryRange,
};
