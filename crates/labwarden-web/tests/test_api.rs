//! End-to-end API tests over an in-memory store and a scripted assessment provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use labwarden_db::MemoryStore;
use labwarden_llm::{HazardAssessor, LlmBackend, LlmError, LlmRequest, LlmResponse};
use labwarden_web::{router::build_router, state::AppState};

/// Answers every completion with a fixed reply and counts the calls.
struct ScriptedBackend {
    reply: Result<String, String>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    fn replying(content: &str) -> Arc<Self> {
        Arc::new(Self { reply: Ok(content.to_string()), calls: AtomicUsize::new(0) })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self { reply: Err(message.to_string()), calls: AtomicUsize::new(0) })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn complete(&self, _req: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(content) => Ok(LlmResponse {
                content: content.clone(),
                model: "scripted".to_string(),
                prompt_tokens: 100,
                completion_tokens: 40,
            }),
            Err(message) => Err(LlmError::ApiError { status: 503, message: message.clone() }),
        }
    }

    fn model_id(&self) -> &str { "scripted" }
    fn is_local(&self) -> bool { true }
}

fn app_with(backend: Arc<ScriptedBackend>) -> Router {
    let state = AppState::new(Arc::new(MemoryStore::new()), HazardAssessor::new(backend));
    build_router(state, None)
}

fn app() -> Router {
    app_with(ScriptedBackend::replying("{}"))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

// ── Experiments ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_predict_stores_assessed_experiment() {
    let backend = ScriptedBackend::replying(
        r#"{"hazardLevel":"danger","analysis":"Corrosive.","recommendations":"Wear gloves."}"#,
    );
    let app = app_with(backend.clone());

    let (status, exp) = post(
        &app,
        "/api/experiments/predict",
        json!({"compoundName": "Sodium Hydroxide", "concentration": "2.5", "temperature": "25"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(exp["compoundName"], "Sodium Hydroxide");
    assert_eq!(exp["concentration"], "2.5");
    assert_eq!(exp["temperature"], "25");
    assert_eq!(exp["hazardLevel"], "danger");
    assert_eq!(exp["aiPrediction"], "Corrosive.");
    assert_eq!(exp["recommendations"], "Wear gloves.");
    assert!(exp["id"].as_i64().unwrap() > 0);
    assert!(exp["createdAt"].is_string());
    assert_eq!(backend.calls(), 1);

    let (status, list) = get(&app, "/api/experiments").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0], exp);
}

#[tokio::test]
async fn test_predict_fills_defaults_for_missing_fields() {
    let app = app_with(ScriptedBackend::replying(r#"{"recommendations":"Use a fume hood."}"#));
    let (status, exp) = post(
        &app,
        "/api/experiments/predict",
        json!({"compoundName": "Acetone", "concentration": 1, "temperature": 20.5}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(exp["hazardLevel"], "caution");
    assert_eq!(exp["aiPrediction"], "Analysis not available");
    assert_eq!(exp["recommendations"], "Use a fume hood.");
    assert_eq!(exp["temperature"], "20.5");
}

#[tokio::test]
async fn test_predict_ignores_client_supplied_hazard_fields() {
    let app = app_with(ScriptedBackend::replying(r#"{"hazardLevel":"safe","analysis":"Inert."}"#));
    let (_, exp) = post(
        &app,
        "/api/experiments/predict",
        json!({
            "compoundName": "Nitrogen", "concentration": "1", "temperature": "20",
            "hazardLevel": "critical", "aiPrediction": "forged"
        }),
    )
    .await;
    assert_eq!(exp["hazardLevel"], "safe");
    assert_eq!(exp["aiPrediction"], "Inert.");
    assert!(exp["recommendations"].is_null());
}

#[tokio::test]
async fn test_invalid_predict_never_calls_provider() {
    let backend = ScriptedBackend::replying("{}");
    let app = app_with(backend.clone());

    for body in [
        json!({"compoundName": "", "concentration": "2.5", "temperature": "25"}),
        json!({"compoundName": "   ", "concentration": "2.5", "temperature": "25"}),
        json!({"concentration": "2.5", "temperature": "25"}),
        json!({"compoundName": "NaOH", "temperature": "25"}),
        json!({"compoundName": "NaOH", "concentration": "lots", "temperature": "25"}),
        json!({"compoundName": 7, "concentration": "2.5", "temperature": "25"}),
    ] {
        let (status, err) = post(&app, "/api/experiments/predict", body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert!(err["message"].is_string());
    }
    assert_eq!(backend.calls(), 0);

    let (_, list) = get(&app, "/api/experiments").await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_provider_failure_is_500_and_stores_nothing() {
    let backend = ScriptedBackend::failing("model overloaded");
    let app = app_with(backend.clone());

    let (status, err) = post(
        &app,
        "/api/experiments/predict",
        json!({"compoundName": "Benzene", "concentration": "0.1", "temperature": "25"}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(err["message"].as_str().unwrap().contains("model overloaded"));
    assert_eq!(backend.calls(), 1);

    let (_, list) = get(&app, "/api/experiments").await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_identical_predicts_each_call_provider() {
    let backend = ScriptedBackend::replying(r#"{"hazardLevel":"caution"}"#);
    let app = app_with(backend.clone());
    let body = json!({"compoundName": "Ethanol", "concentration": "1", "temperature": "25"});

    let (_, first) = post(&app, "/api/experiments/predict", body.clone()).await;
    let (_, second) = post(&app, "/api/experiments/predict", body).await;
    assert_eq!(backend.calls(), 2);
    assert!(second["id"].as_i64() > first["id"].as_i64());

    let (_, list) = get(&app, "/api/experiments").await;
    assert_eq!(list[0]["id"], second["id"]);
    assert_eq!(list[1]["id"], first["id"]);
}

// ── Lab notes ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_created_note_is_listed_first() {
    let app = app();
    let (_, older) = post(&app, "/api/lab-notes", json!({"title": "Setup", "content": "Calibrated pH meter"})).await;

    let (status, note) = post(
        &app,
        "/api/lab-notes",
        json!({"title": "Titration run 1", "content": "Observed color change at pH 7.2", "tags": "titration, pH"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(note["id"].as_i64().unwrap() > older["id"].as_i64().unwrap());
    assert_eq!(note["title"], "Titration run 1");
    assert_eq!(note["content"], "Observed color change at pH 7.2");
    assert_eq!(note["tags"], "titration, pH");
    assert!(note["createdAt"].is_string());

    let (_, list) = get(&app, "/api/lab-notes").await;
    assert_eq!(list[0], note);
    assert_eq!(list[1], older);
}

#[tokio::test]
async fn test_note_search_is_case_insensitive() {
    let app = app();
    post(&app, "/api/lab-notes", json!({"title": "Titration", "content": "pH 7.2", "tags": "acid-base"})).await;
    post(&app, "/api/lab-notes", json!({"title": "Distillation", "content": "Collected at 78C"})).await;

    let (_, hits) = get(&app, "/api/lab-notes?q=ACID").await;
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["title"], "Titration");

    let (_, all) = get(&app, "/api/lab-notes?q=").await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_note_requires_title_and_content() {
    let app = app();
    let (status, err) = post(&app, "/api/lab-notes", json!({"title": "No body"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["message"].as_str().unwrap().contains("content"));

    let (_, list) = get(&app, "/api/lab-notes").await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_malformed_json_is_400_with_message() {
    let app = app();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/lab-notes")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["message"].is_string());
}

// ── Compliance tasks ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_tasks_listed_by_soonest_deadline() {
    let app = app();
    post(&app, "/api/compliance-tasks", json!({"title": "B", "description": "d", "deadline": "2031-06-01"})).await;
    post(&app, "/api/compliance-tasks", json!({"title": "A", "description": "d", "deadline": "2030-01-15"})).await;
    post(&app, "/api/compliance-tasks", json!({"title": "C", "description": "d", "deadline": "2030-03-01", "status": "completed"})).await;

    let (_, list) = get(&app, "/api/compliance-tasks").await;
    let titles: Vec<&str> = list.as_array().unwrap().iter().map(|t| t["title"].as_str().unwrap()).collect();
    assert_eq!(titles, ["A", "C", "B"]);
    assert_eq!(list[0]["status"], "pending");

    let (_, done) = get(&app, "/api/compliance-tasks?status=completed").await;
    assert_eq!(done.as_array().unwrap().len(), 1);
    assert_eq!(done[0]["title"], "C");

    let (status, _) = get(&app, "/api/compliance-tasks?status=overdue").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_task_rejects_bad_deadline_and_status() {
    let app = app();
    let (status, _) = post(&app, "/api/compliance-tasks", json!({"title": "T", "description": "d", "deadline": "soon"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = post(
        &app,
        "/api/compliance-tasks",
        json!({"title": "T", "description": "d", "deadline": "2030-01-01", "status": "overdue"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_changes_only_status() {
    let app = app();
    let (_, task) = post(
        &app,
        "/api/compliance-tasks",
        json!({"title": "Fume hood certification", "description": "Annual check", "deadline": "2030-01-01"}),
    )
    .await;
    let uri = format!("/api/compliance-tasks/{}", task["id"]);

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({"status": "completed", "title": "ignored"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let mut expected = task.clone();
    expected["status"] = json!("completed");
    assert_eq!(updated, expected);

    // No status: nothing changes.
    let (status, same) = send(&app, Method::PATCH, &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(same, expected);
    // No body at all behaves like `{}`.
    let (status, same) = send(&app, Method::PATCH, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(same, expected);

    let (status, err) = send(&app, Method::PATCH, "/api/compliance-tasks/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["message"], "Task not found");
}

#[tokio::test]
async fn test_patch_unknown_id_is_404_and_store_unchanged() {
    let app = app();
    let (_, task) = post(&app, "/api/compliance-tasks", json!({"title": "T", "description": "d", "deadline": "2030-01-01"})).await;

    let (status, err) = send(&app, Method::PATCH, "/api/compliance-tasks/9999", Some(json!({"status": "completed"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["message"], "Task not found");

    let (_, list) = get(&app, "/api/compliance-tasks").await;
    assert_eq!(list, json!([task]));
}

#[tokio::test]
async fn test_patch_bad_id_or_status_is_400() {
    let app = app();
    let (status, _) = send(&app, Method::PATCH, "/api/compliance-tasks/abc", Some(json!({"status": "completed"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, task) = post(&app, "/api/compliance-tasks", json!({"title": "T", "description": "d", "deadline": "2030-01-01"})).await;
    let uri = format!("/api/compliance-tasks/{}", task["id"]);
    let (status, _) = send(&app, Method::PATCH, &uri, Some(json!({"status": "archived"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Safety reports ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_safety_report_defaults_severity() {
    let app = app();
    let (status, report) = post(
        &app,
        "/api/safety-reports",
        json!({"title": "Acid spill", "content": "Small HCl spill on bench 3", "incidentDate": "2024-03-12"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["severity"], "low");
    assert_eq!(report["incidentDate"], "2024-03-12");

    let (_, newer) = post(
        &app,
        "/api/safety-reports",
        json!({"title": "Fire alarm", "content": "Hot plate smoke", "incidentDate": "2024-03-13", "severity": "high"}),
    )
    .await;
    let (_, list) = get(&app, "/api/safety-reports").await;
    assert_eq!(list[0], newer);
    assert_eq!(list[1], report);

    let (status, _) = post(
        &app,
        "/api/safety-reports",
        json!({"title": "x", "content": "y", "incidentDate": "2024-03-13", "severity": "catastrophic"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Dashboard / health ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_dashboard_summarizes_records() {
    let app = app_with(ScriptedBackend::replying(r#"{"hazardLevel":"critical","analysis":"Toxic."}"#));
    for i in 0..6 {
        post(
            &app,
            "/api/experiments/predict",
            json!({"compoundName": format!("Compound {i}"), "concentration": "1", "temperature": "25"}),
        )
        .await;
    }
    post(&app, "/api/lab-notes", json!({"title": "n", "content": "c"})).await;
    post(&app, "/api/compliance-tasks", json!({"title": "t1", "description": "d", "deadline": "2030-01-01"})).await;
    post(&app, "/api/compliance-tasks", json!({"title": "t2", "description": "d", "deadline": "2030-01-02", "status": "completed"})).await;

    let (status, dash) = get(&app, "/api/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dash["totalExperiments"], 6);
    assert_eq!(dash["hazardCounts"], json!({"safe": 0, "caution": 0, "danger": 0, "critical": 6}));
    assert_eq!(dash["activeHazards"], 6);
    assert_eq!(dash["recentExperiments"].as_array().unwrap().len(), 5);
    assert_eq!(dash["recentExperiments"][0]["compoundName"], "Compound 5");
    assert_eq!(dash["labNotes"], 1);
    assert_eq!(dash["pendingTasks"], 1);
    assert_eq!(dash["completedTasks"], 1);
    assert_eq!(dash["safetyReports"], 0);
}

#[tokio::test]
async fn test_health_reports_backends() {
    let (status, health) = get(&app(), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["storage"], "memory");
    assert_eq!(health["model"], "scripted");
    assert!(health["version"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (status, _) = get(&app(), "/api/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
