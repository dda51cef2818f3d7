// tests/fanout_remote.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::time::{Duration, Instant};

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use flowdag::config::RequestSection;
use flowdag::dag::{Scheduler, SchedulerOptions, TaskStatus};
use flowdag::fanout::{multi_request_task, request_task, FanOutCaller};
use flowdag::task::{Payload, Row, Table, Task, TaskOutput};
use flowdag::types::FailedCallValue;

fn rows(n: i64) -> Vec<Row> {
    (1..=n)
        .map(|id| {
            let mut row = Row::new();
            row.insert("id".into(), json!(id));
            row
        })
        .collect()
}

/// Answers `{"prediction": id * 10}` for a posted `{"id": ..}`.
fn echo_prediction(req: &Request) -> ResponseTemplate {
    let body: Value = serde_json::from_slice(&req.body).unwrap();
    let id = body["id"].as_i64().unwrap();
    ResponseTemplate::new(200).set_body_json(json!({ "prediction": id * 10 }))
}

async fn mount_echo(server: &MockServer, route: &str) {
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(echo_prediction)
        .mount(server)
        .await;
}

async fn mount_failure_for(server: &MockServer, route: &str, id: i64) {
    Mock::given(method("POST"))
        .and(path(route))
        .and(body_partial_json(json!({ "id": id })))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .mount(server)
        .await;
}

fn caller(cap: usize, policy: FailedCallValue) -> FanOutCaller {
    FanOutCaller::new(cap, policy, Some(Duration::from_secs(5))).unwrap()
}

#[tokio::test]
async fn one_failing_row_yields_sentinel_in_place() {
    init_tracing();
    let server = MockServer::start().await;
    mount_failure_for(&server, "/predict", 3).await;
    mount_echo(&server, "/predict").await;

    let endpoint = format!("{}/predict", server.uri());
    let batch = with_timeout(caller(10, FailedCallValue::Null).call_rows(&endpoint, &rows(5))).await;

    assert_eq!(batch.results.len(), 5);
    assert_eq!(batch.failures, 1);
    assert_eq!(
        batch.results,
        vec![json!(10), json!(20), Value::Null, json!(40), json!(50)]
    );
}

#[tokio::test]
async fn error_marker_policy_substitutes_literal_error() {
    let server = MockServer::start().await;
    mount_failure_for(&server, "/predict", 2).await;
    mount_echo(&server, "/predict").await;

    let endpoint = format!("{}/predict", server.uri());
    let batch = with_timeout(caller(4, FailedCallValue::Error).call_rows(&endpoint, &rows(3))).await;

    assert_eq!(batch.results[1], json!("ERROR"));
    assert!(FailedCallValue::Error.is_sentinel(&batch.results[1]));
    assert_eq!(batch.failures, 1);
}

#[tokio::test]
async fn output_order_follows_input_order_when_responses_arrive_reversed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/slow-first"))
        .respond_with(|req: &Request| {
            let body: Value = serde_json::from_slice(&req.body).unwrap();
            let id = body["id"].as_i64().unwrap();
            // Earlier rows answer later.
            ResponseTemplate::new(200)
                .set_body_json(json!({ "v": id }))
                .set_delay(Duration::from_millis(20 * (6 - id) as u64))
        })
        .mount(&server)
        .await;

    let endpoint = format!("{}/slow-first", server.uri());
    let batch = with_timeout(caller(5, FailedCallValue::Null).call_rows(&endpoint, &rows(5))).await;

    assert_eq!(
        batch.results,
        vec![json!(1), json!(2), json!(3), json!(4), json!(5)]
    );
    assert_eq!(batch.failures, 0);
}

#[tokio::test]
async fn cap_bounds_calls_in_flight() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/delayed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": true }))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;
    let endpoint = format!("{}/delayed", server.uri());

    // Six 100ms calls, two at a time: at least three rounds.
    let started = Instant::now();
    let batch = with_timeout(caller(2, FailedCallValue::Null).call_rows(&endpoint, &rows(6))).await;
    assert!(started.elapsed() >= Duration::from_millis(300));
    assert_eq!(batch.failures, 0);

    // One at a time.
    let started = Instant::now();
    with_timeout(caller(1, FailedCallValue::Null).call_rows(&endpoint, &rows(3))).await;
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn transport_errors_and_empty_bodies_are_counted() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let c = caller(3, FailedCallValue::Null);

    let empty = with_timeout(c.call_rows(&format!("{}/empty", server.uri()), &rows(2))).await;
    assert_eq!(empty.results, vec![Value::Null, Value::Null]);
    assert_eq!(empty.failures, 2);

    // Nothing listens on port 1.
    let refused = with_timeout(c.call_rows("http://127.0.0.1:1/predict", &rows(3))).await;
    assert_eq!(refused.results.len(), 3);
    assert_eq!(refused.failures, 3);
}

#[tokio::test]
async fn multi_endpoint_results_are_grouped_per_row() {
    let server = MockServer::start().await;
    mount_failure_for(&server, "/b", 2).await;
    mount_echo(&server, "/a").await;
    mount_echo(&server, "/b").await;

    let endpoints = vec![format!("{}/a", server.uri()), format!("{}/b", server.uri())];
    let batch = with_timeout(
        caller(1000, FailedCallValue::Null).call_rows_multi(&endpoints, &rows(3)),
    )
    .await;

    assert_eq!(
        batch.results,
        vec![
            json!([10, 10]),
            json!([20, null]),
            json!([30, 30]),
        ]
    );
    assert_eq!(batch.failures, 1);
}

fn member_table(n: i64) -> Task {
    Task::blocking("Members", move |_| {
        let mut table = Table::new(vec!["id".into()]);
        for id in 1..=n {
            table.push_row(vec![json!(id)])?;
        }
        Ok(TaskOutput::new(Payload::Table(table), n as u64, 0))
    })
}

#[tokio::test]
async fn request_task_reports_rows_and_failures_to_the_summary() {
    init_tracing();
    let server = MockServer::start().await;
    mount_failure_for(&server, "/predict", 3).await;
    mount_echo(&server, "/predict").await;
    let endpoint = format!("{}/predict", server.uri());

    let mut s = Scheduler::with_options(SchedulerOptions::new(Some(2)));
    s.add_task(member_table(5)).unwrap();
    s.add_task(request_task("Predict", endpoint, caller(10, FailedCallValue::Null)).after(["Members"]))
        .unwrap();

    with_timeout(s.execute()).await.unwrap();

    let values = s.results().get("Predict").flatten().unwrap().as_values().unwrap().to_vec();
    assert_eq!(values.len(), 5);
    assert_eq!(values[2], Value::Null);

    let summary = s.summary();
    let predict = &summary.tasks["Predict"];
    assert_eq!(predict.processed_item_count, 5);
    assert_eq!(predict.item_failure_count, 1);
    assert_eq!(predict.status, TaskStatus::Failed);
    assert_eq!(summary.tasks["Members"].status, TaskStatus::Success);
}

#[tokio::test]
async fn multi_request_task_with_missing_input_fails_cleanly() {
    let mut s = Scheduler::with_options(SchedulerOptions::new(Some(2)));
    s.add_task(Task::blocking("Broken", |_| anyhow::bail!("no input file")))
        .unwrap();
    s.add_task(
        multi_request_task(
            "Predict all",
            vec!["http://127.0.0.1:1/a".into()],
            caller(10, FailedCallValue::Null),
        )
        .after(["Broken"]),
    )
    .unwrap();

    with_timeout(s.execute()).await.unwrap();

    assert_eq!(s.results().get("Predict all"), Some(None));
    let metrics = s.graph().task("Predict all").unwrap().metrics();
    assert!(metrics.last_error.as_deref().unwrap().contains("Broken"));
}

async fn run_multi_with(requests: &RequestSection, endpoints: Vec<String>) -> Duration {
    let mut s = Scheduler::with_options(SchedulerOptions::new(Some(2)));
    s.add_task(member_table(2)).unwrap();
    s.add_task(
        multi_request_task("Predict all", endpoints, FanOutCaller::multi_from(requests).unwrap())
            .after(["Members"]),
    )
    .unwrap();

    with_timeout(s.execute()).await.unwrap();
    let summary = s.summary();
    assert_eq!(summary.tasks["Predict all"].status, TaskStatus::Success);
    assert_eq!(summary.tasks["Predict all"].processed_item_count, 2);
    summary.tasks["Predict all"].execution_time_sec.map(Duration::from_secs_f64).unwrap()
}

#[tokio::test]
async fn multi_request_cap_comes_from_config() {
    let server = MockServer::start().await;
    for route in ["/a", "/b"] {
        Mock::given(method("POST"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "ok": true }))
                    .set_delay(Duration::from_millis(100)),
            )
            .mount(&server)
            .await;
    }
    let endpoints = vec![format!("{}/a", server.uri()), format!("{}/b", server.uri())];

    // Two rows by two endpoints, one call at a time: four rounds.
    let one_at_a_time = RequestSection {
        max_concurrent_multi_requests: 1,
        ..RequestSection::default()
    };
    let serial = run_multi_with(&one_at_a_time, endpoints.clone()).await;
    assert!(serial >= Duration::from_millis(400), "took {serial:?}");

    // Default cap lets all four calls overlap.
    let parallel = run_multi_with(&RequestSection::default(), endpoints).await;
    assert!(parallel < Duration::from_millis(350), "took {parallel:?}");
}

#[test]
fn derived_caller_keeps_sentinel_policy() {
    let base = caller(8, FailedCallValue::Error);
    let sequential = base.with_max_in_flight(1);
    assert_eq!(sequential.max_in_flight(), 1);
    assert_eq!(sequential.failed_value(), FailedCallValue::Error);
}
