//! Access request email dispatch tests against a local fake email API.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use tower::ServiceExt;

use gatefold::server::{create_router, RouterConfig};

use super::test_utils::{spawn_server, test_state, MockObjectStore, MockVisitorStore};

/// What the fake email API saw.
#[derive(Default, Clone)]
struct CapturedEmail {
    bearer: Option<String>,
    payload: Option<serde_json::Value>,
}

type Captured = Arc<Mutex<CapturedEmail>>;

/// Fake email endpoint that records the request and answers 200.
fn accepting_email_api(captured: Captured) -> Router {
    async fn handle(
        State(captured): State<Captured>,
        headers: HeaderMap,
        Json(payload): Json<serde_json::Value>,
    ) -> Json<serde_json::Value> {
        let mut slot = captured.lock().unwrap();
        slot.bearer = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        slot.payload = Some(payload);
        Json(serde_json::json!({"id": "email_123"}))
    }

    Router::new()
        .route("/emails", post(handle))
        .with_state(captured)
}

/// Fake email endpoint that always answers 500.
fn rejecting_email_api() -> Router {
    async fn handle() -> (StatusCode, Json<serde_json::Value>) {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "nope"})),
        )
    }

    Router::new().route("/emails", post(handle))
}

fn requests_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/requests")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_album_access_request_reaches_operator() {
    let captured: Captured = Arc::new(Mutex::new(CapturedEmail::default()));
    let addr = spawn_server(accepting_email_api(Arc::clone(&captured))).await;

    let router = create_router(
        test_state(
            MockObjectStore::new(),
            MockVisitorStore::new(),
            Some(format!("http://{addr}/emails")),
        ),
        RouterConfig::new().with_tracing(false),
    );

    let response = router
        .oneshot(requests_request(
            r#"{"kind": "album_access", "email": "fan@example.com", "album_url": "https://zine.example/photos/launch"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], true);

    let seen = captured.lock().unwrap().clone();
    assert_eq!(seen.bearer.as_deref(), Some("Bearer re_test_key"));

    let payload = seen.payload.unwrap();
    assert_eq!(payload["from"], "gatefold <onboarding@resend.dev>");
    assert_eq!(payload["to"], "operator@example.com");
    assert_eq!(payload["subject"], "Album Access Request");
    let text = payload["text"].as_str().unwrap();
    assert!(text.contains("fan@example.com"));
    assert!(text.contains("https://zine.example/photos/launch"));
}

#[tokio::test]
async fn test_zine_request_subject() {
    let captured: Captured = Arc::new(Mutex::new(CapturedEmail::default()));
    let addr = spawn_server(accepting_email_api(Arc::clone(&captured))).await;

    let router = create_router(
        test_state(
            MockObjectStore::new(),
            MockVisitorStore::new(),
            Some(format!("http://{addr}/emails")),
        ),
        RouterConfig::new().with_tracing(false),
    );

    let response = router
        .oneshot(requests_request(
            r#"{"kind": "new_zine", "email": "fan@example.com"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let payload = captured.lock().unwrap().clone().payload.unwrap();
    assert_eq!(payload["subject"], "New Zine Request");
    assert!(!payload["text"].as_str().unwrap().contains("Album URL"));
}

#[tokio::test]
async fn test_rejected_send_surfaces_generic_error() {
    let addr = spawn_server(rejecting_email_api()).await;

    let router = create_router(
        test_state(
            MockObjectStore::new(),
            MockVisitorStore::new(),
            Some(format!("http://{addr}/emails")),
        ),
        RouterConfig::new().with_tracing(false),
    );

    let response = router
        .oneshot(requests_request(
            r#"{"kind": "new_zine", "email": "fan@example.com"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "request_failed");
}
