//! End-to-end API integration tests
//!
//! These tests drive the complete HTTP flows with a scripted LLM double:
//! - successful analysis runs and their response shape
//! - the error taxonomy (missing credential, upstream failure, input format)
//! - override precedence for model and API key
//! - that blocked runs never reach the model

use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use insightcrew_api::agents::errors::{AgentError, AgentResult};
use insightcrew_api::agents::gemini::{GenerateRequest, LlmClient};
use insightcrew_api::api::{router, AppState};
use insightcrew_api::config::{AppConfig, RunConfig};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for oneshot

/// One recorded model call
#[derive(Debug, Clone)]
struct RecordedCall {
    model: String,
    api_key: String,
    system: String,
}

/// LLM double that records calls and replays canned stage outputs
#[derive(Clone)]
struct ScriptedLlm {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    responses: Arc<Vec<&'static str>>,
    fail_with: Option<&'static str>,
}

impl ScriptedLlm {
    fn succeeding() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            responses: Arc::new(vec![
                "The numbers are stable with one clear outlier.",
                "- Revenue is concentrated in one product\n- Sales volume is healthy",
                "# Business Intelligence Report\n\nRevenue is concentrated.",
                "1. Bar chart: Widget leads the catalog.",
            ]),
            fail_with: None,
        }
    }

    fn failing(message: &'static str) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            responses: Arc::new(Vec::new()),
            fail_with: Some(message),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedLlm {
    async fn generate(&self, run: &RunConfig, request: GenerateRequest) -> AgentResult<String> {
        let mut calls = self.calls.lock().unwrap();
        let index = calls.len();
        calls.push(RecordedCall {
            model: run.model.clone(),
            api_key: run.api_key.clone(),
            system: request.system,
        });

        if let Some(message) = self.fail_with {
            return Err(AgentError::Upstream(message.to_string()));
        }

        Ok(self
            .responses
            .get(index)
            .copied()
            .unwrap_or("more output")
            .to_string())
    }
}

/// Setup test application with the given configuration and LLM double
fn setup_app(config: AppConfig, llm: ScriptedLlm) -> Router {
    router(AppState {
        config: Arc::new(config),
        llm: Arc::new(llm),
    })
}

fn config_without_key() -> AppConfig {
    AppConfig::default()
}

fn config_with_env_key() -> AppConfig {
    AppConfig {
        gemini_api_key: Some("env-key".to_string()),
        ..AppConfig::default()
    }
}

/// The 3-row sample sales table used across scenarios
const SALES_CSV: &str = "product,sales\nWidget,120\nGadget,340\nWidget,95\n";

fn analyze_payload() -> Value {
    json!({
        "csv_data": SALES_CSV,
        "filename": "sales.csv",
        "analysis_depth": "detailed",
        "chart_types": ["bar", "line"],
        "api_key": "sidebar-key"
    })
}

async fn post(app: Router, uri: &str, payload: &Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_app(config_without_key(), ScriptedLlm::succeeding());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_dashboard_page_is_served() {
    let app = setup_app(config_without_key(), ScriptedLlm::succeeding());

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let page = String::from_utf8(body.to_vec()).unwrap();
    assert!(page.contains("Business Intelligence Dashboard"));
}

#[tokio::test]
async fn test_analyze_returns_report_insights_and_charts() {
    let llm = ScriptedLlm::succeeding();
    let app = setup_app(config_without_key(), llm.clone());

    let (status, body) = post(app, "/api/analyze", &analyze_payload()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body["report"].as_str().unwrap().is_empty());
    assert_eq!(body["insights"].as_array().unwrap().len(), 2);
    assert!(body["run_id"].is_string());
    assert_eq!(body["metadata"]["row_count"], 3);

    // Both requested chart kinds are satisfiable: bar from `product`,
    // line from `sales`. Every spec must carry at least one trace.
    let charts = body["charts"].as_array().unwrap();
    assert_eq!(charts.len(), 2);
    for chart in charts {
        let traces = chart["figure"]["data"].as_array().unwrap();
        assert!(!traces.is_empty());
    }

    // Four stages, fixed order
    let calls = llm.calls.lock().unwrap();
    assert_eq!(calls.len(), 4);
    assert!(calls[0].system.contains("Data Analyst"));
    assert!(calls[1].system.contains("Business Intelligence Analyst"));
    assert!(calls[2].system.contains("Report Writer"));
    assert!(calls[3].system.contains("Visualization Specialist"));
}

#[tokio::test]
async fn test_missing_credential_blocks_run_before_any_call() {
    let llm = ScriptedLlm::succeeding();
    let app = setup_app(config_without_key(), llm.clone());

    let mut payload = analyze_payload();
    payload.as_object_mut().unwrap().remove("api_key");

    let (status, body) = post(app, "/api/analyze", &payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "missing_credential");
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_environment_key_is_used_when_no_override() {
    let llm = ScriptedLlm::succeeding();
    let app = setup_app(config_with_env_key(), llm.clone());

    let mut payload = analyze_payload();
    payload.as_object_mut().unwrap().remove("api_key");

    let (status, _body) = post(app, "/api/analyze", &payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(llm.calls.lock().unwrap()[0].api_key, "env-key");
}

#[tokio::test]
async fn test_ui_overrides_beat_environment_values() {
    let llm = ScriptedLlm::succeeding();
    let app = setup_app(config_with_env_key(), llm.clone());

    let mut payload = analyze_payload();
    payload["model"] = json!("gemini-1.5-pro");

    let (status, body) = post(app, "/api/analyze", &payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["model"], "gemini-1.5-pro");

    let calls = llm.calls.lock().unwrap();
    assert_eq!(calls[0].model, "gemini-1.5-pro");
    assert_eq!(calls[0].api_key, "sidebar-key");
}

#[tokio::test]
async fn test_upstream_failure_surfaces_and_next_run_succeeds() {
    let failing = ScriptedLlm::failing("connection refused");
    let app = setup_app(config_with_env_key(), failing.clone());

    let (status, body) = post(app, "/api/analyze", &analyze_payload()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["kind"], "upstream_failure");
    assert!(body["error"].as_str().unwrap().contains("connection refused"));

    // The shell returns to idle; a retry against a healthy upstream works
    let app = setup_app(config_with_env_key(), ScriptedLlm::succeeding());
    let (status, _body) = post(app, "/api/analyze", &analyze_payload()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_single_column_upload_is_rejected() {
    let llm = ScriptedLlm::succeeding();
    let app = setup_app(config_with_env_key(), llm.clone());

    let payload = json!({ "csv_data": "sales\n120\n340\n" });
    let (status, body) = post(app, "/api/analyze", &payload).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "input_format");
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_non_numeric_upload_is_rejected() {
    let llm = ScriptedLlm::succeeding();
    let app = setup_app(config_with_env_key(), llm.clone());

    let payload = json!({ "csv_data": "name,city\nAda,London\nAlan,Manchester\n" });
    let (status, body) = post(app, "/api/analyze", &payload).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "input_format");
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let llm = ScriptedLlm::succeeding();
    let config = AppConfig {
        max_upload_bytes: 16,
        ..config_with_env_key()
    };
    let app = setup_app(config, llm.clone());

    let (status, body) = post(app, "/api/analyze", &analyze_payload()).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["kind"], "input_format");
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_preview_profiles_without_touching_the_model() {
    let llm = ScriptedLlm::succeeding();
    let app = setup_app(config_without_key(), llm.clone());

    let payload = json!({
        "csv_data": SALES_CSV,
        "filename": "sales.csv",
        "analysis_depth": "detailed"
    });
    let (status, body) = post(app, "/api/preview", &payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["row_count"], 3);
    assert_eq!(body["profile"]["numeric_columns"][0], "sales");
    assert!(!body["observations"].as_array().unwrap().is_empty());
    assert_eq!(llm.call_count(), 0);
}
