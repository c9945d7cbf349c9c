//! CloudWatch Logs Insights Client Wrapper
//!
//! Implements [`QueryEngine`] on top of the AWS SDK. The ambient AWS config is
//! loaded once in [`CloudWatchInsightsClient::connect`] and the resulting SDK
//! client is reused for every call.

#![warn(clippy::all, rust_2018_idioms)]

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_cloudwatchlogs as cloudwatchlogs;
use aws_smithy_types::error::display::DisplayErrorContext;
use aws_types::region::Region;

use super::engine::QueryEngine;
use super::error::InsightsError;
use super::types::{
    QueryHandle, QueryRequest, QueryResultsPage, QueryStatistics, QueryStatus, ResultField,
    ResultRow,
};

/// Overrides applied on top of the default AWS config chain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientSettings {
    pub region: Option<String>,
    pub profile: Option<String>,
}

/// CloudWatch Logs Insights client wrapper
#[derive(Clone)]
pub struct CloudWatchInsightsClient {
    client: cloudwatchlogs::Client,
}

impl CloudWatchInsightsClient {
    /// Resolve the ambient AWS config and credentials and build the SDK client.
    ///
    /// Credentials are resolved eagerly so a broken environment fails here,
    /// before any query is submitted.
    pub async fn connect(settings: &ClientSettings) -> Result<Self, InsightsError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &settings.profile {
            loader = loader.profile_name(profile);
        }
        let aws_config = loader.load().await;

        let region = aws_config.region().ok_or_else(|| {
            InsightsError::Configuration(
                "no AWS region configured (set AWS_REGION or pass --region)".to_string(),
            )
        })?;

        let provider = aws_config.credentials_provider().ok_or_else(|| {
            InsightsError::Configuration("no AWS credentials provider available".to_string())
        })?;
        provider.provide_credentials().await.map_err(|e| {
            InsightsError::Configuration(format!(
                "failed to resolve AWS credentials: {}",
                DisplayErrorContext(&e)
            ))
        })?;

        trace_debug!("Resolved AWS config for region {}", region);

        Ok(Self {
            client: cloudwatchlogs::Client::new(&aws_config),
        })
    }
}

/// Placeholder status when `GetQueryResults` carries no status at all
const MISSING_STATUS: &str = "<missing>";

/// A missing status is treated like any other unrecognized value.
fn status_from_response(status: Option<&cloudwatchlogs::types::QueryStatus>) -> QueryStatus {
    status
        .map(|s| QueryStatus::from_wire(s.as_str()))
        .unwrap_or_else(|| QueryStatus::Unknown(MISSING_STATUS.to_string()))
}

#[async_trait]
impl QueryEngine for CloudWatchInsightsClient {
    async fn start_query(&self, request: &QueryRequest) -> Result<QueryHandle, InsightsError> {
        let submission_error = |message: String| InsightsError::Submission {
            log_group: request.log_group.clone(),
            message,
        };

        let response = self
            .client
            .start_query()
            .log_group_names(request.log_group.clone())
            .start_time(request.range.from())
            .end_time(request.range.to())
            .query_string(request.query_string.clone())
            .set_limit(request.limit)
            .send()
            .await
            .map_err(|e| submission_error(DisplayErrorContext(&e).to_string()))?;

        response
            .query_id
            .map(QueryHandle::new)
            .ok_or_else(|| submission_error("response carried no query id".to_string()))
    }

    async fn get_query_results(
        &self,
        handle: &QueryHandle,
    ) -> Result<QueryResultsPage, InsightsError> {
        let response = self
            .client
            .get_query_results()
            .query_id(handle.as_str())
            .send()
            .await
            .map_err(|e| InsightsError::Transport {
                query_id: handle.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let status = status_from_response(response.status.as_ref());

        let rows: Vec<ResultRow> = response
            .results
            .unwrap_or_default()
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|pair| {
                        ResultField::new(
                            pair.field.unwrap_or_default(),
                            pair.value.unwrap_or_default(),
                        )
                    })
                    .collect()
            })
            .collect();

        let statistics = response
            .statistics
            .map(|s| QueryStatistics::new(s.bytes_scanned, s.records_matched, s.records_scanned))
            .unwrap_or_default();

        trace_trace!(
            "GetQueryResults for {} returned {} with {} rows",
            handle,
            status,
            rows.len()
        );

        Ok(QueryResultsPage {
            status,
            rows,
            statistics,
        })
    }

    async fn stop_query(&self, handle: &QueryHandle) -> Result<bool, InsightsError> {
        let response = self
            .client
            .stop_query()
            .query_id(handle.as_str())
            .send()
            .await
            .map_err(|e| InsightsError::Transport {
                query_id: handle.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(response.success())
    }
}
