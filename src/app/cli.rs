//! Command line interface.
//!
//! [`Cli`] is the raw clap surface; [`Cli::into_settings`] resolves defaults
//! (notably the time window) into a [`Settings`] the binary can run with.

#![warn(clippy::all, rust_2018_idioms)]

use std::time::Duration;

use clap::Parser;

use crate::app::data_plane::cloudwatch_logs::{
    ClientSettings, InsightsError, PollSettings, QueryRange,
};
use crate::app::output::OutputFormat;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_BRANCH"),
    " ",
    env!("GIT_COMMIT"),
    ")"
);

/// Query a CloudWatch Logs group with Logs Insights and print matching records
#[derive(Debug, Parser)]
#[command(name = "awsinsights")]
#[command(author, version, long_version = LONG_VERSION, about, long_about = None)]
pub struct Cli {
    /// Log group to search
    pub log_group: String,

    /// Range start, Unix seconds (defaults to two hours ago)
    #[arg(long, value_name = "UNIX_SECS", requires = "end")]
    pub start: Option<i64>,

    /// Range end, Unix seconds (defaults to one hour ago)
    #[arg(long, value_name = "UNIX_SECS", requires = "start")]
    pub end: Option<i64>,

    /// Seconds to wait between status checks
    #[arg(
        long,
        value_name = "SECS",
        env = "AWSINSIGHTS_POLL_INTERVAL",
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval: u64,

    /// Stop the query and fail if it has not finished after this many seconds
    #[arg(long, value_name = "SECS", env = "AWSINSIGHTS_DEADLINE")]
    pub deadline: Option<u64>,

    /// Maximum number of records to return
    #[arg(long, value_parser = clap::value_parser!(i32).range(1..=10000))]
    pub limit: Option<i32>,

    /// AWS region (overrides the ambient configuration)
    #[arg(long)]
    pub region: Option<String>,

    /// AWS shared config profile
    #[arg(long)]
    pub profile: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Log level when RUST_LOG is not set (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

/// Everything one invocation needs, with defaults resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub log_group: String,
    pub range: QueryRange,
    pub limit: Option<i32>,
    pub poll: PollSettings,
    pub client: ClientSettings,
    pub output: OutputFormat,
}

impl Cli {
    /// Resolve defaults relative to `now` (Unix seconds)
    pub fn into_settings(self, now: i64) -> Result<Settings, InsightsError> {
        let range = match (self.start, self.end) {
            (Some(from), Some(to)) => QueryRange::new(from, to)?,
            (None, None) => QueryRange::default_window(now),
            _ => {
                return Err(InsightsError::InvalidRequest(
                    "--start and --end must be given together".to_string(),
                ))
            }
        };

        Ok(Settings {
            log_group: self.log_group,
            range,
            limit: self.limit,
            poll: PollSettings {
                interval: Duration::from_secs(self.poll_interval),
                deadline: self.deadline.map(Duration::from_secs),
            },
            client: ClientSettings {
                region: self.region,
                profile: self.profile,
            },
            output: self.output,
        })
    }
}
