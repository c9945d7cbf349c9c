//! AWS Insights - CloudWatch Logs Insights range query tool
//!
//! Runs one Logs Insights query over a single log group and time window,
//! polls until the query finishes, and prints the request id, type and
//! message of every matching record, newest first.
//!
//! # Architecture Overview
//!
//! - **Query poller** ([`app::data_plane::cloudwatch_logs::QueryPoller`]): submits
//!   the query and drives the status poll loop
//! - **Engine seam** ([`app::data_plane::cloudwatch_logs::QueryEngine`]): the three
//!   remote operations, implemented for AWS by
//!   [`app::data_plane::cloudwatch_logs::CloudWatchInsightsClient`]
//! - **CLI** ([`app::cli`]): argument parsing and defaults
//! - **Output** ([`app::output`]): text and JSON rendering

#![warn(clippy::all, rust_2018_idioms)]

// Include logging macros first
#[macro_use]
pub mod logging_macros;

pub mod app;
