//! Core application modules for AWS Insights.
//!
//! # Module Organization
//!
//! - [`data_plane`] - CloudWatch Logs Insights client, query poller and record types
//! - [`cli`] - Command line arguments and the settings derived from them
//! - [`output`] - Rendering of records to stdout
//!
//! # Architecture
//!
//! [`cli`] turns arguments into settings, [`data_plane`] runs the query and
//! [`output`] prints what came back. The binary in `main.rs` wires the three
//! together and owns the tokio runtime and logging.

pub mod cli;
pub mod data_plane;
pub mod output;
