//! Watermarked download tests against a local fake photo host.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use gatefold::server::{create_router, RouterConfig};

use super::test_utils::{
    is_valid_jpeg, png_photo, spawn_server, test_state, MockObjectStore, MockVisitorStore,
};

/// Fake photo host serving one PNG.
fn photo_host() -> Router {
    async fn handle() -> ([(&'static str, &'static str); 1], Vec<u8>) {
        ([("content-type", "image/png")], png_photo(64, 64))
    }

    Router::new().route("/photo.png", get(handle))
}

fn download_request(url: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/watermark?url={}", urlencoding::encode(url)))
        .body(Body::empty())
        .unwrap()
}

fn app_router() -> Router {
    create_router(
        test_state(MockObjectStore::new(), MockVisitorStore::new(), None),
        RouterConfig::new().with_tracing(false),
    )
}

#[tokio::test]
async fn test_download_returns_watermarked_jpeg() {
    let addr = spawn_server(photo_host()).await;

    let response = app_router()
        .oneshot(download_request(&format!("http://{addr}/photo.png")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/jpeg"
    );
    assert!(response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("attachment"));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(is_valid_jpeg(&body));
}

#[tokio::test]
async fn test_download_is_deterministic() {
    let addr = spawn_server(photo_host()).await;
    let url = format!("http://{addr}/photo.png");

    let mut outputs = Vec::new();
    for _ in 0..2 {
        let response = app_router()
            .oneshot(download_request(&url))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        outputs.push(response.into_body().collect().await.unwrap().to_bytes());
    }

    assert_eq!(outputs[0], outputs[1]);
}

#[tokio::test]
async fn test_upstream_404_surfaces_generic_save_error() {
    let addr = spawn_server(photo_host()).await;

    let response = app_router()
        .oneshot(download_request(&format!("http://{addr}/missing.png")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "save_failed");
    assert_eq!(json["message"], "Failed to save photo.");
}

#[tokio::test]
async fn test_non_image_bytes_surface_generic_save_error() {
    async fn handle() -> &'static str {
        "definitely not an image"
    }
    let addr = spawn_server(Router::new().route("/junk", get(handle))).await;

    let response = app_router()
        .oneshot(download_request(&format!("http://{addr}/junk")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "save_failed");
}
