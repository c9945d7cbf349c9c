//! Insights query poller
//!
//! Submits one range query, polls `GetQueryResults` at a fixed interval until
//! the query reaches a terminal status, and maps the rows into [`LogRecord`]s.
//!
//! ```text
//! start_query ──► Scheduled ─┐
//!                 Running ◄──┘ (sleep interval, poll again)
//!                    │
//!                    ├─► Complete            => Ok(records)
//!                    └─► Failed/Cancelled/…  => Err(QueryFailed)
//! ```

#![warn(clippy::all, rust_2018_idioms)]

use std::time::Duration;

use tokio::time::Instant;

use super::engine::QueryEngine;
use super::error::InsightsError;
use super::types::{
    LogRecord, QueryHandle, QueryRange, QueryRequest, QueryResultsPage, QueryStatus,
    DEFAULT_POLL_INTERVAL,
};

/// Poll loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Wait between status checks while the query is pending
    pub interval: Duration,
    /// Give up (and stop the remote query) after this long. `None` polls forever.
    pub deadline: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            deadline: None,
        }
    }
}

/// Runs range queries against a [`QueryEngine`] and waits for their results
pub struct QueryPoller<E> {
    engine: E,
    settings: PollSettings,
}

impl<E: QueryEngine> QueryPoller<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            settings: PollSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: PollSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Find log records in `log_group` within `range`, newest first
    pub async fn find_logs_by_range(
        &self,
        log_group: &str,
        range: QueryRange,
    ) -> Result<Vec<LogRecord>, InsightsError> {
        self.find_logs(QueryRequest::new(log_group, range)).await
    }

    /// Run an arbitrary request and map its rows, preserving engine row order
    pub async fn find_logs(&self, request: QueryRequest) -> Result<Vec<LogRecord>, InsightsError> {
        validate_request(&request)?;

        trace_info!(
            "Starting Insights query on {} for {}",
            request.log_group,
            request.range
        );
        let handle = self.engine.start_query(&request).await?;
        trace_debug!("Query {} accepted", handle);

        let page = self.wait_for_completion(&handle).await?;

        let records: Vec<LogRecord> = page
            .rows
            .iter()
            .map(|row| LogRecord::from_row(row))
            .collect();

        trace_info!(
            "Query {} complete: {} records ({} matched, {} scanned, {} bytes)",
            handle,
            records.len(),
            page.statistics.records_matched,
            page.statistics.records_scanned,
            page.statistics.bytes_scanned
        );
        Ok(records)
    }

    /// Poll until the query is terminal. Exactly one status call per observed state.
    async fn wait_for_completion(
        &self,
        handle: &QueryHandle,
    ) -> Result<QueryResultsPage, InsightsError> {
        let started = Instant::now();
        let mut poll_count: u32 = 0;

        loop {
            let page = self.engine.get_query_results(handle).await?;
            poll_count += 1;

            if page.status.is_pending() {
                trace_debug!(
                    "Query {} is {} (poll #{}), waiting {:?}",
                    handle,
                    page.status,
                    poll_count,
                    self.settings.interval
                );

                if let Some(deadline) = self.settings.deadline {
                    let elapsed = started.elapsed();
                    if elapsed + self.settings.interval > deadline {
                        self.abandon(handle).await;
                        return Err(InsightsError::DeadlineExceeded {
                            query_id: handle.to_string(),
                            elapsed,
                        });
                    }
                }

                tokio::time::sleep(self.settings.interval).await;
                continue;
            }

            if page.status == QueryStatus::Complete {
                trace_debug!(
                    "Query {} completed after {} polls in {:.1}s",
                    handle,
                    poll_count,
                    started.elapsed().as_secs_f64()
                );
                return Ok(page);
            }

            trace_warn!("Query {} ended with status {}", handle, page.status);
            return Err(InsightsError::QueryFailed {
                query_id: handle.to_string(),
                status: page.status,
            });
        }
    }

    /// Best-effort stop of a query we are no longer waiting for
    async fn abandon(&self, handle: &QueryHandle) {
        match self.engine.stop_query(handle).await {
            Ok(true) => {
                trace_info!("Stopped query {} after deadline", handle);
            }
            Ok(false) => {
                trace_debug!("Query {} was already finished when stopped", handle);
            }
            Err(e) => {
                trace_warn!("Failed to stop query {}: {}", handle, e);
            }
        }
    }
}

fn validate_request(request: &QueryRequest) -> Result<(), InsightsError> {
    if request.log_group.trim().is_empty() {
        return Err(InsightsError::InvalidRequest(
            "log group name must not be empty".to_string(),
        ));
    }
    if request.range.from() > request.range.to() {
        return Err(InsightsError::InvalidRequest(format!(
            "range start {} is after range end {}",
            request.range.from(),
            request.range.to()
        )));
    }
    if let Some(limit) = request.limit {
        if limit <= 0 {
            return Err(InsightsError::InvalidRequest(format!(
                "limit must be positive, got {}",
                limit
            )));
        }
    }
    Ok(())
}
