//! HTTP API integration tests
//!
//! Tests full request/response cycles through the axum router with in-process
//! embedder and completion doubles.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use selector::api;
use selector::completion::{CompletionEngine, CompletionError};
use selector::corpus::RecursiveSplitter;
use selector::pipeline::AgentSelector;
use selector::retrieval::{Embedder, RetrievalError};

struct ConstantEmbedder;

#[async_trait]
impl Embedder for ConstantEmbedder {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, RetrievalError> {
        Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
    }
}

struct CannedEngine(Result<&'static str, u16>);

#[async_trait]
impl CompletionEngine for CannedEngine {
    async fn answer(&self, _question: &str, _context: &[String]) -> Result<String, CompletionError> {
        match self.0 {
            Ok(reply) => Ok(reply.to_string()),
            Err(status) => Err(CompletionError::Status {
                status,
                body: "upstream unavailable".to_string(),
            }),
        }
    }
}

fn setup_test_app(engine: CannedEngine) -> (axum::Router, tempfile::TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    std::fs::write(
        temp_dir.path().join("agents.json"),
        r#"{"name": "Dana Lee", "phone": "+1 555 0100", "focus": "data pipelines"}"#,
    )
    .expect("Failed to write corpus");

    let selector = AgentSelector::new(
        temp_dir.path(),
        RecursiveSplitter::new(1000, 20).unwrap(),
        4,
        Arc::new(ConstantEmbedder),
        Arc::new(engine),
    )
    .expect("Failed to build selector");

    let state = api::ApiState {
        selector: Arc::new(selector),
    };
    (api::router().with_state(state), temp_dir)
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(req).await.expect("Request failed");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    (status, body.to_vec())
}

fn select_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/select")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_index_page_has_form() {
    let (app, _dir) = setup_test_app(CannedEngine(Ok("unused")));
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("<title>Agent Selector</title>"));
    assert!(html.contains("Enter the task you have:"));
    assert!(html.contains("Select agent"));
    assert!(html.contains("Selected Agents:"));
}

#[tokio::test]
async fn test_health_check() {
    let (app, _dir) = setup_test_app(CannedEngine(Ok("unused")));
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["status"], "healthy");
}

#[tokio::test]
async fn test_select_returns_restored_answer() {
    let (app, _dir) = setup_test_app(CannedEngine(Ok("**ID_1** is the best fit.")));

    let (status, body) = send(&app, select_request(json!({ "task": "etl job" }))).await;
    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["answer"], "**Dana Lee (Phone: +1 555 0100)** is the best fit.");
    assert!(value["answer_html"]
        .as_str()
        .unwrap()
        .contains("<strong>Dana Lee (Phone: +1 555 0100)</strong>"));
    assert_eq!(value["masked_names"], 1);
    assert_eq!(value["masked_phones"], 1);
    assert!(value["source"].as_str().unwrap().ends_with("agents.json"));
    assert_eq!(value["session_id"].as_str().unwrap().len(), 26);
}

#[tokio::test]
async fn test_select_escapes_html_from_the_model() {
    let (app, _dir) = setup_test_app(CannedEngine(Ok(
        "Pick <img src=x onerror=alert(1)> ID_1 or [call](javascript:alert(1))",
    )));

    let (status, body) = send(&app, select_request(json!({ "task": "etl job" }))).await;
    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&body).unwrap();
    let html = value["answer_html"].as_str().unwrap();
    assert!(!html.contains("<img"));
    assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
    assert!(html.contains(r##"<a href="#">call</a>"##));
    assert!(html.contains("Dana Lee (Phone: +1 555 0100)"));
}

#[tokio::test]
async fn test_blank_task_is_bad_request() {
    let (app, _dir) = setup_test_app(CannedEngine(Ok("unused")));

    let (status, body) = send(&app, select_request(json!({ "task": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["stage"], "input");
}

#[tokio::test]
async fn test_completion_failure_is_reported() {
    let (app, _dir) = setup_test_app(CannedEngine(Err(503)));

    let (status, body) = send(&app, select_request(json!({ "task": "etl job" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["stage"], "completion");
    let error = value["error"].as_str().unwrap();
    assert!(error.starts_with("Error running QA chain: "));
    assert!(error.contains("503"));
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let (app, _dir) = setup_test_app(CannedEngine(Ok("unused")));

    let (status, _) = send(&app, select_request(json!({ "query": "etl" }))).await;
    assert!(status.is_client_error());
}
