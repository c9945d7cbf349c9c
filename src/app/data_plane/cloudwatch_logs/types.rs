//! CloudWatch Logs Insights Data Types
//!
//! Data structures for Insights queries, poll responses, and the records
//! produced from result rows.

#![warn(clippy::all, rust_2018_idioms)]

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::InsightsError;

/// Query expression submitted for every range lookup.
///
/// Ordering is a property of this text; rows are never re-sorted locally.
pub const DEFAULT_QUERY: &str =
    "fields @timestamp, @requestId, @type, @message | sort @timestamp desc";

/// Interval between status checks while a query is scheduled or running
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Inclusive time window in Unix seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRange {
    from: i64,
    to: i64,
}

impl QueryRange {
    /// Create a range, rejecting `from > to`
    pub fn new(from: i64, to: i64) -> Result<Self, InsightsError> {
        if from > to {
            return Err(InsightsError::InvalidRequest(format!(
                "range start {} is after range end {}",
                from, to
            )));
        }
        Ok(Self { from, to })
    }

    /// The hour ending one hour before `now`: `[now - 2h, now - 1h]`
    pub fn default_window(now: i64) -> Self {
        Self {
            from: now - 2 * 3600,
            to: now - 3600,
        }
    }

    pub fn from(&self) -> i64 {
        self.from
    }

    pub fn to(&self) -> i64 {
        self.to
    }
}

impl fmt::Display for QueryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let render = |ts: i64| {
            chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
                .unwrap_or_else(|| ts.to_string())
        };
        write!(f, "{} .. {}", render(self.from), render(self.to))
    }
}

/// Everything needed to start one Insights query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub log_group: String,
    pub range: QueryRange,
    pub query_string: String,
    /// Maximum rows to return (engine default applies when unset)
    pub limit: Option<i32>,
}

impl QueryRequest {
    /// Build a request using [`DEFAULT_QUERY`]
    pub fn new(log_group: impl Into<String>, range: QueryRange) -> Self {
        Self {
            log_group: log_group.into(),
            range,
            query_string: DEFAULT_QUERY.to_string(),
            limit: None,
        }
    }

    /// Set the result limit
    pub fn with_limit(mut self, limit: Option<i32>) -> Self {
        self.limit = limit;
        self
    }
}

/// Opaque query id handed back by the engine on submission
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryHandle(String);

impl QueryHandle {
    pub fn new(query_id: impl Into<String>) -> Self {
        Self(query_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status of an Insights query as reported by `GetQueryResults`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
    Scheduled,
    Running,
    Complete,
    Failed,
    Cancelled,
    Timeout,
    /// A status value this build does not recognize
    Unknown(String),
}

impl QueryStatus {
    /// Parse a wire value (`"Scheduled"`, `"Running"`, ...)
    pub fn from_wire(value: &str) -> Self {
        match value {
            "Scheduled" => QueryStatus::Scheduled,
            "Running" => QueryStatus::Running,
            "Complete" => QueryStatus::Complete,
            "Failed" => QueryStatus::Failed,
            "Cancelled" => QueryStatus::Cancelled,
            "Timeout" => QueryStatus::Timeout,
            other => QueryStatus::Unknown(other.to_string()),
        }
    }

    /// True while the poll loop should keep waiting
    pub fn is_pending(&self) -> bool {
        matches!(self, QueryStatus::Scheduled | QueryStatus::Running)
    }

    pub fn as_str(&self) -> &str {
        match self {
            QueryStatus::Scheduled => "Scheduled",
            QueryStatus::Running => "Running",
            QueryStatus::Complete => "Complete",
            QueryStatus::Failed => "Failed",
            QueryStatus::Cancelled => "Cancelled",
            QueryStatus::Timeout => "Timeout",
            QueryStatus::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field/value pair of a result row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultField {
    pub field: String,
    pub value: String,
}

impl ResultField {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// A result row, fields in the order the engine returned them
pub type ResultRow = Vec<ResultField>;

/// Statistics about an Insights query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryStatistics {
    /// Bytes scanned during the query
    pub bytes_scanned: f64,
    /// Number of records that matched the query
    pub records_matched: f64,
    /// Total number of records scanned
    pub records_scanned: f64,
}

impl QueryStatistics {
    pub fn new(bytes_scanned: f64, records_matched: f64, records_scanned: f64) -> Self {
        Self {
            bytes_scanned,
            records_matched,
            records_scanned,
        }
    }
}

/// A single `GetQueryResults` response
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResultsPage {
    pub status: QueryStatus,
    pub rows: Vec<ResultRow>,
    pub statistics: QueryStatistics,
}

impl QueryResultsPage {
    /// A page carrying only a status, as seen while the query is pending or after it failed
    pub fn status_only(status: QueryStatus) -> Self {
        Self {
            status,
            rows: Vec::new(),
            statistics: QueryStatistics::default(),
        }
    }

    pub fn complete(rows: Vec<ResultRow>) -> Self {
        Self {
            status: QueryStatus::Complete,
            rows,
            statistics: QueryStatistics::default(),
        }
    }
}

/// A log line extracted from one result row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(rename = "requestId")]
    pub request_id: String,
    #[serde(rename = "type")]
    pub log_type: String,
    pub message: String,
}

impl LogRecord {
    pub fn new(
        request_id: impl Into<String>,
        log_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            log_type: log_type.into(),
            message: message.into(),
        }
    }

    /// Map a result row onto a record.
    ///
    /// Accepts the Insights spelling (`@requestId`) as well as the bare name.
    /// Fields other than requestId, type and message are dropped.
    pub fn from_row(row: &[ResultField]) -> Self {
        let mut record = LogRecord::default();
        for pair in row {
            let name = pair.field.strip_prefix('@').unwrap_or(pair.field.as_str());
            match name {
                "requestId" => record.request_id = pair.value.clone(),
                "type" => record.log_type = pair.value.clone(),
                "message" => record.message = pair.value.clone(),
                _ => continue,
            }
        }
        record
    }
}
