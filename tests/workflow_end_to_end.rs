// tests/workflow_end_to_end.rs

mod common;
use crate::common::builders::WorkflowConfigBuilder;
use crate::common::{init_tracing, with_timeout, write_sample_csv};

use std::fs;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use flowdag::cli::CliArgs;
use flowdag::dag::{ExecutionSummary, TaskStatus};
use flowdag::types::WorkflowKind;
use flowdag::workflow::steps::{
    ATS_PREDICT, COMBINER, EXTRACT, LOAD, OFFER_RECOMMENDATION, RESP2_PREDICT, RESP_PREDICT,
    TRANSFORM,
};
use flowdag::workflow::Workflow;

/// ATS predicts the member's average points, RESP a fixed 1.5, and the offer
/// service picks OFFER_2 when their product reaches 300.
async fn prediction_service() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ml/ats/predict"))
        .respond_with(|req: &Request| {
            let row: Value = serde_json::from_slice(&req.body).unwrap();
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ats": row["AVG_POINTS_BOUGHT"].clone() }))
        })
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/ml/resp/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "resp": 1.5 })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/offer/assign"))
        .respond_with(|req: &Request| {
            let p: Value = serde_json::from_slice(&req.body).unwrap();
            let score = p["ats_prediction"].as_f64().unwrap() * p["resp_prediction"].as_f64().unwrap();
            let offer = if score >= 300.0 { "OFFER_2" } else { "OFFER_1" };
            ResponseTemplate::new(200).set_body_json(json!({ "offer": offer }))
        })
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn offer_workflow_writes_result_and_summary() {
    init_tracing();
    let server = prediction_service().await;
    let dir = tempfile::tempdir().unwrap();
    let csv = write_sample_csv(dir.path());

    let cfg = WorkflowConfigBuilder::new("offer-e2e")
        .description("end to end")
        .paths_in(dir.path(), csv)
        .endpoints(&server.uri())
        .max_workers(4)
        .build();

    let mut workflow = Workflow::new(WorkflowKind::Offer, cfg);
    let summary = with_timeout(workflow.start()).await.unwrap();

    let names: Vec<&str> = summary.run.tasks.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec![EXTRACT, TRANSFORM, ATS_PREDICT, RESP_PREDICT, COMBINER, OFFER_RECOMMENDATION, LOAD]
    );
    for (name, task) in summary.run.tasks.iter() {
        assert_eq!(task.status, TaskStatus::Success, "{name} failed");
    }
    assert_eq!(summary.run.tasks[EXTRACT].processed_item_count, 5);
    assert_eq!(summary.run.tasks[TRANSFORM].processed_item_count, 2);
    assert_eq!(summary.run.tasks[LOAD].processed_item_count, 2);

    let result = fs::read_to_string(dir.path().join("result.csv")).unwrap();
    let mut lines = result.lines();
    assert!(lines.next().unwrap().ends_with(",ATS,RESP,OFFER"));
    // Member 1 averages 200 points -> 300 -> OFFER_2; member 2 averages 200 too.
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.ends_with(",1.5,OFFER_2")));

    let written: ExecutionSummary =
        serde_json::from_str(&fs::read_to_string(dir.path().join("summary.json")).unwrap())
            .unwrap();
    assert_eq!(written.name, "offer-e2e");
    assert_eq!(written.description, "end to end");
    assert_eq!(written.run.tasks.len(), 7);
    assert!(written.run.total_execution_time_sec.is_some());
    assert_eq!(written.run.completion_timestamp.len(), "2024-01-01 00:00:00".len());
}

#[tokio::test]
async fn failing_everything_still_produces_a_summary() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();

    let cfg = WorkflowConfigBuilder::new("doomed")
        .paths_in(dir.path(), dir.path().join("does-not-exist.csv"))
        .endpoints("http://127.0.0.1:1")
        .build();

    let mut workflow = Workflow::new(WorkflowKind::Offer, cfg);
    let summary = with_timeout(workflow.start()).await.unwrap();

    assert_eq!(summary.run.tasks.len(), 7);
    for task in summary.run.tasks.values() {
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.throughput_items_per_sec, 0.0);
    }
    assert!(dir.path().join("summary.json").exists());
    assert!(!dir.path().join("result.csv").exists());
}

#[tokio::test]
async fn ats_workflow_posts_sequentially_to_three_predictors() {
    init_tracing();
    let server = prediction_service().await;
    let dir = tempfile::tempdir().unwrap();
    let csv = write_sample_csv(dir.path());

    let cfg = WorkflowConfigBuilder::new("ats-e2e")
        .csv_path(csv)
        .performance_output_path(dir.path().join("ats-summary.json"))
        .endpoints(&server.uri())
        .build();

    let mut workflow = Workflow::new(WorkflowKind::Ats, cfg);
    let summary = with_timeout(workflow.start()).await.unwrap();

    let names: Vec<&str> = summary.run.tasks.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec![EXTRACT, TRANSFORM, ATS_PREDICT, RESP_PREDICT, RESP2_PREDICT]
    );
    assert!(summary.run.failed_tasks().next().is_none());
    assert!(dir.path().join("ats-summary.json").exists());

    let resp_calls = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/ml/resp/predict")
        .count();
    assert_eq!(resp_calls, 4);
}

#[tokio::test]
async fn preload_is_idempotent_and_start_runs_once() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_sample_csv(dir.path());
    let cfg = WorkflowConfigBuilder::new("twice")
        .csv_path(csv)
        .performance_output_path(dir.path().join("s.json"))
        .endpoints("http://127.0.0.1:1")
        .build();

    let mut workflow = Workflow::new(WorkflowKind::Ats, cfg);
    workflow.preload().unwrap();
    workflow.preload().unwrap();
    assert_eq!(workflow.scheduler().graph().len(), 5);

    with_timeout(workflow.start()).await.unwrap();
    assert!(workflow.start().await.is_err());
}

#[tokio::test]
async fn dry_run_builds_the_graph_without_executing() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("workflow.toml");
    fs::write(
        &config_path,
        format!(
            r#"
name = "dry"
csv_path = "{csv}"
result_output_path = "{out}"
performance_output_path = "{perf}"
ats_url = "http://127.0.0.1:1/ats"
resp_url = "http://127.0.0.1:1/resp"
offer_url = "http://127.0.0.1:1/offer"
"#,
            csv = dir.path().join("missing.csv").display(),
            out = dir.path().join("result.csv").display(),
            perf = dir.path().join("summary.json").display(),
        ),
    )
    .unwrap();

    let args = CliArgs {
        workflow: WorkflowKind::Offer,
        config: config_path.display().to_string(),
        log_level: None,
        dry_run: true,
    };

    flowdag::run(args).await.unwrap();
    assert!(!dir.path().join("summary.json").exists());
}
