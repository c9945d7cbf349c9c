#![warn(clippy::all, rust_2018_idioms)]

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::prelude::*;

use awsinsights::app::cli::{Cli, Settings};
use awsinsights::app::data_plane::cloudwatch_logs::{
    CloudWatchInsightsClient, QueryPoller, QueryRequest,
};
use awsinsights::app::output;
use awsinsights::trace_info;

/// AWS SDK crates are noisy at info; keep them at warn unless RUST_LOG says otherwise
const SDK_FILTER: &str = "aws_config=warn,aws_sigv4=warn,aws_smithy_runtime=warn,aws_smithy_runtime_api=warn,aws_smithy_http=warn,aws_endpoint=warn,hyper=warn";

fn init_logging(default_level: &str) -> Result<()> {
    let directives = std::env::var("RUST_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| format!("awsinsights={},{}", default_level, SDK_FILTER));

    let filter = tracing_subscriber::EnvFilter::builder()
        .parse(&directives)
        .with_context(|| format!("Failed to parse log filter: {}", directives))?;

    // stdout carries the records, so all diagnostics go to stderr
    let subscriber = tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false),
    );

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    // Bridge log crate events from dependencies to tracing
    tracing_log::LogTracer::init().context("Failed to initialize log-to-tracing bridge")?;

    Ok(())
}

async fn run(settings: Settings) -> Result<()> {
    let client = CloudWatchInsightsClient::connect(&settings.client)
        .await
        .context("Failed to set up CloudWatch Logs client")?;

    let poller = QueryPoller::new(client).with_settings(settings.poll);
    let request =
        QueryRequest::new(settings.log_group.clone(), settings.range).with_limit(settings.limit);

    let records = poller
        .find_logs(request)
        .await
        .with_context(|| format!("Failed to query log group {}", settings.log_group))?;

    let stdout = std::io::stdout();
    output::write_records(&mut stdout.lock(), &records, settings.output)?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    trace_info!(
        "awsinsights {} ({} {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_BRANCH"),
        env!("GIT_COMMIT")
    );

    let settings = cli
        .into_settings(chrono::Utc::now().timestamp())
        .context("Invalid arguments")?;

    // anyhow prints the context chain to stderr on error
    run(settings).await
}
