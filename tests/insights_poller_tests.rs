//! Poll loop behaviour against a scripted query engine.
//!
//! Time is paused in every test, so interval waits advance the tokio clock
//! instantly and can be measured exactly.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use awsinsights::app::data_plane::cloudwatch_logs::{
    InsightsError, LogRecord, PollSettings, QueryEngine, QueryHandle, QueryPoller, QueryRange,
    QueryRequest, QueryResultsPage, QueryStatus, ResultField, ResultRow, DEFAULT_QUERY,
};
use pretty_assertions::assert_eq;
use tokio::time::Instant;

/// Engine that replays a fixed sequence of poll responses.
///
/// Once the script runs out every further poll reports `Running`.
#[derive(Default)]
struct ScriptedEngine {
    start_error: Mutex<Option<InsightsError>>,
    script: Mutex<VecDeque<Result<QueryResultsPage, InsightsError>>>,
    requests: Mutex<Vec<QueryRequest>>,
    poll_times: Mutex<Vec<Instant>>,
    stop_calls: Mutex<Vec<QueryHandle>>,
    stop_error: Mutex<Option<InsightsError>>,
}

impl ScriptedEngine {
    fn with_script(script: Vec<Result<QueryResultsPage, InsightsError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    fn failing_start(error: InsightsError) -> Self {
        Self {
            start_error: Mutex::new(Some(error)),
            ..Default::default()
        }
    }

    fn failing_stop(error: InsightsError) -> Self {
        Self {
            stop_error: Mutex::new(Some(error)),
            ..Default::default()
        }
    }

    fn poll_count(&self) -> usize {
        self.poll_times.lock().unwrap().len()
    }

    fn poll_gaps(&self) -> Vec<Duration> {
        let times = self.poll_times.lock().unwrap();
        times.windows(2).map(|w| w[1] - w[0]).collect()
    }

    fn requests(&self) -> Vec<QueryRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn stop_count(&self) -> usize {
        self.stop_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl QueryEngine for ScriptedEngine {
    async fn start_query(&self, request: &QueryRequest) -> Result<QueryHandle, InsightsError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.start_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(QueryHandle::new("q-1")),
        }
    }

    async fn get_query_results(
        &self,
        _handle: &QueryHandle,
    ) -> Result<QueryResultsPage, InsightsError> {
        self.poll_times.lock().unwrap().push(Instant::now());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(QueryResultsPage::status_only(QueryStatus::Running)))
    }

    async fn stop_query(&self, handle: &QueryHandle) -> Result<bool, InsightsError> {
        self.stop_calls.lock().unwrap().push(handle.clone());
        match self.stop_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(true),
        }
    }
}

fn row(pairs: &[(&str, &str)]) -> ResultRow {
    pairs
        .iter()
        .map(|(field, value)| ResultField::new(*field, *value))
        .collect()
}

fn orders_rows() -> Vec<ResultRow> {
    vec![
        row(&[
            ("@timestamp", "2023-11-14 23:10:00.000"),
            ("@requestId", "r1"),
            ("@type", "ERROR"),
            ("@message", "boom"),
        ]),
        row(&[
            ("@timestamp", "2023-11-14 22:20:00.000"),
            ("@requestId", "r2"),
            ("@type", "INFO"),
            ("@message", "ok"),
        ]),
    ]
}

fn orders_range() -> QueryRange {
    QueryRange::new(1_700_000_000, 1_700_003_600).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_end_to_end_orders_example() {
    let engine = ScriptedEngine::with_script(vec![Ok(QueryResultsPage::complete(orders_rows()))]);
    let poller = QueryPoller::new(engine);

    let records = poller
        .find_logs_by_range("/svc/orders", orders_range())
        .await
        .unwrap();

    assert_eq!(
        records,
        vec![
            LogRecord::new("r1", "ERROR", "boom"),
            LogRecord::new("r2", "INFO", "ok"),
        ]
    );

    let requests = poller.engine().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].log_group, "/svc/orders");
    assert_eq!(requests[0].range, orders_range());
    assert_eq!(requests[0].query_string, DEFAULT_QUERY);
    assert_eq!(requests[0].limit, None);
}

#[tokio::test(start_paused = true)]
async fn test_polls_once_per_state_until_complete() {
    let engine = ScriptedEngine::with_script(vec![
        Ok(QueryResultsPage::status_only(QueryStatus::Scheduled)),
        Ok(QueryResultsPage::status_only(QueryStatus::Running)),
        Ok(QueryResultsPage::status_only(QueryStatus::Running)),
        Ok(QueryResultsPage::complete(orders_rows())),
    ]);
    let poller = QueryPoller::new(engine);
    let started = Instant::now();

    let records = poller
        .find_logs_by_range("/svc/orders", orders_range())
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].request_id, "r1");
    assert_eq!(poller.engine().poll_count(), 4);
    assert_eq!(poller.engine().poll_gaps(), vec![Duration::from_secs(5); 3]);
    assert_eq!(started.elapsed(), Duration::from_secs(15));
    assert_eq!(poller.engine().stop_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_custom_interval_is_used_between_polls() {
    let engine = ScriptedEngine::with_script(vec![
        Ok(QueryResultsPage::status_only(QueryStatus::Running)),
        Ok(QueryResultsPage::complete(Vec::new())),
    ]);
    let poller = QueryPoller::new(engine).with_settings(PollSettings {
        interval: Duration::from_secs(1),
        deadline: None,
    });

    poller
        .find_logs_by_range("/svc/orders", orders_range())
        .await
        .unwrap();

    assert_eq!(poller.engine().poll_gaps(), vec![Duration::from_secs(1)]);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_query_fails_without_further_polls() {
    let engine = ScriptedEngine::with_script(vec![
        Ok(QueryResultsPage::status_only(QueryStatus::Cancelled)),
        Ok(QueryResultsPage::complete(orders_rows())),
    ]);
    let poller = QueryPoller::new(engine);

    let err = poller
        .find_logs_by_range("/svc/orders", orders_range())
        .await
        .unwrap_err();

    match err {
        InsightsError::QueryFailed { query_id, status } => {
            assert_eq!(query_id, "q-1");
            assert_eq!(status, QueryStatus::Cancelled);
        }
        other => panic!("expected QueryFailed, got {:?}", other),
    }
    assert_eq!(poller.engine().poll_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_every_non_complete_terminal_status_is_a_query_failure() {
    let terminal = [
        QueryStatus::Failed,
        QueryStatus::Timeout,
        QueryStatus::Unknown("Paused".to_string()),
    ];

    for status in terminal {
        let engine = ScriptedEngine::with_script(vec![
            Ok(QueryResultsPage::status_only(QueryStatus::Running)),
            Ok(QueryResultsPage::status_only(status.clone())),
        ]);
        let poller = QueryPoller::new(engine);

        let err = poller
            .find_logs_by_range("/svc/orders", orders_range())
            .await
            .unwrap_err();

        assert!(err.is_query_failure(), "{} should fail the query", status);
        assert!(err.to_string().contains(status.as_str()));
        assert_eq!(poller.engine().poll_count(), 2);
    }
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_aborts_the_loop() {
    let engine = ScriptedEngine::with_script(vec![
        Ok(QueryResultsPage::status_only(QueryStatus::Running)),
        Err(InsightsError::Transport {
            query_id: "q-1".to_string(),
            message: "dispatch failure".to_string(),
        }),
        Ok(QueryResultsPage::complete(orders_rows())),
    ]);
    let poller = QueryPoller::new(engine);

    let err = poller
        .find_logs_by_range("/svc/orders", orders_range())
        .await
        .unwrap_err();

    assert!(matches!(err, InsightsError::Transport { .. }));
    assert!(!err.is_query_failure());
    assert_eq!(poller.engine().poll_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_submission_error_skips_polling() {
    let engine = ScriptedEngine::failing_start(InsightsError::Submission {
        log_group: "/svc/orders".to_string(),
        message: "ResourceNotFoundException".to_string(),
    });
    let poller = QueryPoller::new(engine);

    let err = poller
        .find_logs_by_range("/svc/orders", orders_range())
        .await
        .unwrap_err();

    assert!(matches!(err, InsightsError::Submission { .. }));
    assert_eq!(poller.engine().requests().len(), 1);
    assert_eq!(poller.engine().poll_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_empty_log_group_never_reaches_the_engine() {
    let poller = QueryPoller::new(ScriptedEngine::default());

    let err = poller
        .find_logs_by_range("", orders_range())
        .await
        .unwrap_err();

    assert!(matches!(err, InsightsError::InvalidRequest(_)));
    assert!(poller.engine().requests().is_empty());
    assert_eq!(poller.engine().poll_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_empty_result_set_is_not_an_error() {
    let engine = ScriptedEngine::with_script(vec![Ok(QueryResultsPage::complete(Vec::new()))]);
    let poller = QueryPoller::new(engine);
    let range = QueryRange::new(1_700_000_000, 1_700_000_000).unwrap();

    let records = poller.find_logs_by_range("/svc/orders", range).await.unwrap();

    assert!(records.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_field_order_within_row_does_not_matter() {
    let rows = vec![
        row(&[("@message", "boom"), ("@type", "ERROR"), ("@requestId", "r1")]),
        row(&[
            ("@ptr", "CmAKJgoiMTIz"),
            ("@requestId", "r2"),
            ("@logStream", "2023/11/14/[$LATEST]abc"),
            ("@message", "ok"),
            ("@type", "INFO"),
        ]),
    ];
    let engine = ScriptedEngine::with_script(vec![Ok(QueryResultsPage::complete(rows))]);
    let poller = QueryPoller::new(engine);

    let records = poller
        .find_logs_by_range("/svc/orders", orders_range())
        .await
        .unwrap();

    assert_eq!(
        records,
        vec![
            LogRecord::new("r1", "ERROR", "boom"),
            LogRecord::new("r2", "INFO", "ok"),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_same_inputs_give_identical_results() {
    let mut runs = Vec::new();
    for _ in 0..2 {
        let engine = ScriptedEngine::with_script(vec![
            Ok(QueryResultsPage::status_only(QueryStatus::Scheduled)),
            Ok(QueryResultsPage::complete(orders_rows())),
        ]);
        let poller = QueryPoller::new(engine);
        runs.push(
            poller
                .find_logs_by_range("/svc/orders", orders_range())
                .await
                .unwrap(),
        );
    }

    assert_eq!(runs[0], runs[1]);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_stops_the_query() {
    // Never completes: the script is empty, so every poll reports Running.
    let poller = QueryPoller::new(ScriptedEngine::default()).with_settings(PollSettings {
        interval: Duration::from_secs(5),
        deadline: Some(Duration::from_secs(12)),
    });

    let err = poller
        .find_logs_by_range("/svc/orders", orders_range())
        .await
        .unwrap_err();

    match err {
        InsightsError::DeadlineExceeded { query_id, elapsed } => {
            assert_eq!(query_id, "q-1");
            assert_eq!(elapsed, Duration::from_secs(10));
        }
        other => panic!("expected DeadlineExceeded, got {:?}", other),
    }
    assert_eq!(poller.engine().poll_count(), 3);
    assert_eq!(poller.engine().stop_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_limit_is_forwarded_to_the_engine() {
    let engine = ScriptedEngine::with_script(vec![Ok(QueryResultsPage::complete(Vec::new()))]);
    let poller = QueryPoller::new(engine);

    poller
        .find_logs(QueryRequest::new("/svc/orders", orders_range()).with_limit(Some(25)))
        .await
        .unwrap();

    assert_eq!(poller.engine().requests()[0].limit, Some(25));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_is_reported_even_when_stop_fails() {
    let engine = ScriptedEngine::failing_stop(InsightsError::Transport {
        query_id: "q-1".to_string(),
        message: "connection reset".to_string(),
    });
    let poller = QueryPoller::new(engine).with_settings(PollSettings {
        interval: Duration::from_secs(5),
        deadline: Some(Duration::ZERO),
    });

    let err = poller
        .find_logs_by_range("/svc/orders", orders_range())
        .await
        .unwrap_err();

    assert!(matches!(err, InsightsError::DeadlineExceeded { .. }));
    assert_eq!(poller.engine().poll_count(), 1);
    assert_eq!(poller.engine().stop_count(), 1);
}
