//! Album content resolution tests through the full router.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use super::test_utils::{test_router, MockObjectStore, MockVisitorStore};

async fn fetch_album(keys: &[&str], album: &str) -> (StatusCode, serde_json::Value) {
    let id = Uuid::new_v4();
    let router = test_router(
        MockObjectStore::new().with_keys(keys),
        MockVisitorStore::new().with_visitor(id),
    );

    let request = Request::builder()
        .uri(format!("/photos/{album}"))
        .header("cookie", format!("user_session={id}"))
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_album_content_partition_and_order() {
    let (status, json) = fetch_album(
        &[
            "albums/x/a.jpg",
            "albums/x/b.png",
            "albums/x/track.MP3",
            "albums/x/readme.txt",
        ],
        "x",
    )
    .await;

    assert_eq!(status, StatusCode::OK);

    let photos = json["photos"].as_array().unwrap();
    assert_eq!(photos.len(), 2);
    assert_eq!(photos[0]["key"], "albums/x/a.jpg");
    assert_eq!(photos[1]["key"], "albums/x/b.png");
    assert!(photos[0]["url"]
        .as_str()
        .unwrap()
        .contains("albums/x/a.jpg"));

    assert_eq!(json["audio"]["song_name"], "track");
}

#[tokio::test]
async fn test_album_without_audio_yields_null() {
    let (status, json) = fetch_album(&["albums/x/a.jpg"], "x").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["audio"].is_null());
}

#[tokio::test]
async fn test_album_ignores_unrelated_prefixes() {
    let (status, json) = fetch_album(
        &["albums/x/a.jpg", "albums/other/b.jpg", "albums/x/c.png"],
        "x",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let photos = json["photos"].as_array().unwrap();
    let keys: Vec<&str> = photos.iter().map(|p| p["key"].as_str().unwrap()).collect();
    assert_eq!(keys, vec!["albums/x/a.jpg", "albums/x/c.png"]);
}

#[tokio::test]
async fn test_uppercase_photo_extensions_not_recognized() {
    let (status, json) = fetch_album(&["albums/x/a.JPG", "albums/x/b.jpg"], "x").await;

    assert_eq!(status, StatusCode::OK);
    let photos = json["photos"].as_array().unwrap();
    assert_eq!(photos.len(), 1);
    assert_eq!(photos[0]["key"], "albums/x/b.jpg");
}
