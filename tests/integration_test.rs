//! End-to-end tests over the wire.
//!
//! Each test binds the full application router on an ephemeral port together
//! with a local webhook receiver standing in for the spreadsheet endpoint,
//! then drives the API with a real HTTP client. No external infrastructure
//! is required.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use serde_json::{json, Value};

use maintenance_intake::app_state::AppState;
use maintenance_intake::routes;
use maintenance_intake::services::ai::{
    AiError, ImageClassifier, SummaryContext, SummaryGenerator,
};
use maintenance_intake::services::delivery::WebhookDelivery;

/// One request captured by the webhook stand-in.
#[derive(Debug, Clone)]
struct CapturedDelivery {
    content_type: String,
    body: Value,
}

#[derive(Clone)]
struct WebhookState {
    captured: Arc<Mutex<Vec<CapturedDelivery>>>,
    respond_with: StatusCode,
}

async fn capture_delivery(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body: Value = serde_json::from_str(&body).expect("webhook body is not JSON");

    state
        .captured
        .lock()
        .unwrap()
        .push(CapturedDelivery { content_type, body });

    state.respond_with
}

/// Bind the webhook stand-in on an ephemeral port.
async fn spawn_webhook(respond_with: StatusCode) -> (String, Arc<Mutex<Vec<CapturedDelivery>>>) {
    let state = WebhookState {
        captured: Arc::new(Mutex::new(Vec::new())),
        respond_with,
    };
    let captured = state.captured.clone();

    let app = Router::new()
        .route("/exec", post(capture_delivery))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/exec", addr), captured)
}

/// AI stand-in with fixed answers, so tests exercise the real pipeline and
/// delivery channel without an AI account.
struct CannedAi;

#[async_trait::async_trait]
impl ImageClassifier for CannedAi {
    async fn classify(&self, _photo_data_uri: &str) -> Result<Vec<String>, AiError> {
        Ok(vec!["تسريب مياه".to_string()])
    }
}

#[async_trait::async_trait]
impl SummaryGenerator for CannedAi {
    async fn summarize(&self, _ctx: &SummaryContext) -> Result<String, AiError> {
        Ok("تسريب مياه في الحمام يحتاج سباك".to_string())
    }
}

/// Bind the full application on an ephemeral port, delivering to the given
/// webhook URL.
async fn spawn_api(webhook_url: &str) -> String {
    let delivery = WebhookDelivery::new(webhook_url, Duration::from_secs(5)).unwrap();
    let ai = Arc::new(CannedAi);
    let state = AppState::new(ai.clone(), ai, Arc::new(delivery));
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn valid_maintenance_request() -> Value {
    json!({
        "problemDescription": "تسريب مياه في الحمام",
        "phoneNumber": "01012345678",
        "geolocation": "30.0,31.2",
        "problemPhotoDataUri": "data:image/png;base64,AAAA",
    })
}

fn valid_worker_registration() -> Value {
    json!({
        "name": "أحمد علي",
        "phone": "01098765432",
        "specialization": "سباكة",
        "city": "القاهرة",
        "experience": "عشر سنوات خبرة في السباكة",
    })
}

#[tokio::test]
async fn maintenance_request_round_trip() {
    let (webhook_url, captured) = spawn_webhook(StatusCode::OK).await;
    let base_url = spawn_api(&webhook_url).await;
    let client = reqwest::Client::new();

    let outcome: Value = client
        .post(format!("{}/api/v1/requests", base_url))
        .json(&valid_maintenance_request())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(outcome["success"], true);
    assert_eq!(outcome["message"], "تم إرسال طلبك بنجاح!");

    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].content_type, "text/plain;charset=utf-8");

    let body = &captured[0].body;
    assert_eq!(body["type"], "maintenanceRequest");
    assert_eq!(body["problemDescription"], "تسريب مياه في الحمام");
    assert_eq!(body["phoneNumber"], "01012345678");
    assert_eq!(body["geolocation"], "30.0,31.2");
    assert_eq!(body["summary"], "تسريب مياه في الحمام يحتاج سباك");
    assert!(!body["timestamp"].as_str().unwrap().is_empty());
    // The client never ran image analysis, so the field is absent entirely.
    assert!(body.get("aiAnalysisResults").is_none());
}

#[tokio::test]
async fn webhook_failure_collapses_to_a_generic_error() {
    let (webhook_url, captured) = spawn_webhook(StatusCode::INTERNAL_SERVER_ERROR).await;
    let base_url = spawn_api(&webhook_url).await;
    let client = reqwest::Client::new();

    let outcome: Value = client
        .post(format!("{}/api/v1/requests", base_url))
        .json(&valid_maintenance_request())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(outcome["success"], false);
    let error = outcome["error"].as_str().unwrap();
    assert_eq!(error, "حدث خطأ أثناء إرسال الطلب.");
    assert!(!error.contains("500"));

    // The attempt still reached the webhook exactly once.
    assert_eq!(captured.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn identical_submissions_deliver_independently() {
    let (webhook_url, captured) = spawn_webhook(StatusCode::OK).await;
    let base_url = spawn_api(&webhook_url).await;
    let client = reqwest::Client::new();

    let submit = |client: reqwest::Client, base_url: String| async move {
        client
            .post(format!("{}/api/v1/requests", base_url))
            .json(&valid_maintenance_request())
            .send()
            .await
            .unwrap()
            .json::<Value>()
            .await
            .unwrap()
    };

    let outcomes = futures::future::join_all([
        submit(client.clone(), base_url.clone()),
        submit(client.clone(), base_url.clone()),
    ])
    .await;

    for outcome in outcomes {
        assert_eq!(outcome["success"], true);
    }
    assert_eq!(captured.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn worker_registration_round_trip() {
    let (webhook_url, captured) = spawn_webhook(StatusCode::OK).await;
    let base_url = spawn_api(&webhook_url).await;
    let client = reqwest::Client::new();

    let outcome: Value = client
        .post(format!("{}/api/v1/workers", base_url))
        .json(&valid_worker_registration())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(outcome["success"], true);
    assert_eq!(outcome["message"], "تم تسجيلك بنجاح!");

    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    let body = &captured[0].body;
    assert_eq!(body["type"], "workerRegistration");
    assert_eq!(body["name"], "أحمد علي");
    assert!(body.get("summary").is_none());
}

#[tokio::test]
async fn invalid_input_never_reaches_the_webhook() {
    let (webhook_url, captured) = spawn_webhook(StatusCode::OK).await;
    let base_url = spawn_api(&webhook_url).await;
    let client = reqwest::Client::new();

    let outcome: Value = client
        .post(format!("{}/api/v1/requests", base_url))
        .json(&json!({
            "problemDescription": "قصير",
            "phoneNumber": "010",
            "geolocation": "",
            "problemPhotoDataUri": "",
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(outcome["success"], false);
    assert_eq!(outcome["error"], "البيانات المدخلة غير صالحة.");
    assert!(captured.lock().unwrap().is_empty());
}

#[tokio::test]
async fn analyze_endpoint_returns_problem_labels() {
    let (webhook_url, _captured) = spawn_webhook(StatusCode::OK).await;
    let base_url = spawn_api(&webhook_url).await;
    let client = reqwest::Client::new();

    let outcome: Value = client
        .post(format!("{}/api/v1/analyze", base_url))
        .json(&json!({ "photoDataUri": "data:image/png;base64,AAAA" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(outcome["success"], true);
    assert_eq!(outcome["problems"], json!(["تسريب مياه"]));
}

#[tokio::test]
async fn health_check_reports_ok() {
    let (webhook_url, _captured) = spawn_webhook(StatusCode::OK).await;
    let base_url = spawn_api(&webhook_url).await;

    let response = reqwest::get(format!("{}/health", base_url)).await.unwrap();
    assert!(response.status().is_success());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}
