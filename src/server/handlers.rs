//! HTTP request handlers.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /register` - Visitor registration, sets the session cookie
//! - `GET /photos/{album}` - Gated album content (gate runs as middleware)
//! - `POST /requests` - Access/zine request email
//! - `GET /watermark?url=...` - Watermarked photo download
//!
//! Component failures are re-raised here as coarse, user-safe errors:
//! internal details go to the log, never into the response body.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::album::{AlbumContent, AlbumResolver};
use crate::error::{NotificationError, RegistrationError, StorageError, WatermarkError};
use crate::gate::{AccessGate, GateDecision};
use crate::notify::{AccessRequest, Notifier};
use crate::storage::ObjectStore;
use crate::visitor::{RegistrationService, Visitor, VisitorStore};
use crate::watermark::Watermarker;

use super::session::{build_session_cookie, session_value, SessionConfig};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state, passed to all handlers via Axum's State
/// extractor. Every component is constructed by the composition root and
/// injected here; nothing is ambient.
pub struct AppState<S: ObjectStore, V: VisitorStore> {
    pub resolver: Arc<AlbumResolver<S>>,
    pub gate: Arc<AccessGate<S, V>>,
    pub registration: Arc<RegistrationService<V>>,
    pub notifier: Arc<Notifier>,
    pub watermarker: Arc<Watermarker>,
    pub session: SessionConfig,
}

impl<S: ObjectStore, V: VisitorStore> Clone for AppState<S, V> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            gate: Arc::clone(&self.gate),
            registration: Arc::clone(&self.registration),
            notifier: Arc::clone(&self.notifier),
            watermarker: Arc::clone(&self.watermarker),
            session: self.session.clone(),
        }
    }
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Body of `POST /register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Visitor name, stored verbatim
    pub name: String,

    /// Phone number; formatting is stripped before storage
    pub phone: String,
}

/// Body of `POST /requests`.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccessRequestBody {
    /// Request the next printed zine
    NewZine { email: String },

    /// Request access to a specific album
    AlbumAccess { email: String, album_url: String },
}

impl AccessRequestBody {
    fn into_parts(self) -> (String, AccessRequest) {
        match self {
            AccessRequestBody::NewZine { email } => (email, AccessRequest::NewZine),
            AccessRequestBody::AlbumAccess { email, album_url } => {
                (email, AccessRequest::Album { album_url })
            }
        }
    }
}

/// Query parameters for the watermark endpoint.
#[derive(Debug, Deserialize)]
pub struct WatermarkQueryParams {
    /// Signed URL of the photo to watermark
    pub url: String,
}

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g. "invalid_phone")
    pub error: String,

    /// User-safe message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Response of `POST /requests`.
#[derive(Debug, Serialize)]
pub struct RequestAccepted {
    pub success: bool,
}

// =============================================================================
// Error Mapping
// =============================================================================

fn error_response(
    status: StatusCode,
    error_type: &str,
    message: &str,
    detail: &dyn std::fmt::Display,
) -> Response {
    if status.is_server_error() {
        error!(error_type, status = status.as_u16(), "{detail}");
    } else {
        warn!(error_type, status = status.as_u16(), "{detail}");
    }

    let body = ErrorResponse::with_status(error_type, message, status);
    (status, Json(body)).into_response()
}

/// Wrapper for album loading failures.
pub struct AlbumError(pub StorageError);

impl IntoResponse for AlbumError {
    fn into_response(self) -> Response {
        error_response(
            StatusCode::BAD_GATEWAY,
            "album_unavailable",
            "There was an error loading the album content. Please try again later.",
            &self.0,
        )
    }
}

impl From<StorageError> for AlbumError {
    fn from(err: StorageError) -> Self {
        AlbumError(err)
    }
}

impl IntoResponse for RegistrationError {
    fn into_response(self) -> Response {
        match &self {
            RegistrationError::InvalidPhone { .. } => error_response(
                StatusCode::BAD_REQUEST,
                "invalid_phone",
                "Please enter a valid 10-digit phone number.",
                &self,
            ),
            RegistrationError::Persistence(_) => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "submission_failed",
                "Failed to process submission.",
                &self,
            ),
        }
    }
}

impl IntoResponse for NotificationError {
    fn into_response(self) -> Response {
        error_response(
            StatusCode::BAD_GATEWAY,
            "request_failed",
            "Failed to send access request.",
            &self,
        )
    }
}

impl IntoResponse for WatermarkError {
    fn into_response(self) -> Response {
        let status = match &self {
            WatermarkError::Fetch(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error_response(status, "save_failed", "Failed to save photo.", &self)
    }
}

// =============================================================================
// Gate Middleware
// =============================================================================

/// Build the login redirect target carrying the requested album.
pub fn login_redirect_target(album: &str) -> String {
    format!("/photos?album={}", urlencoding::encode(album))
}

/// Per-request access gate for `GET /photos/{album}`.
///
/// Runs on every navigation, not just once: a session stays valid only as
/// long as the visitor row it references exists.
pub async fn gate_middleware<S: ObjectStore + 'static, V: VisitorStore + 'static>(
    State(state): State<AppState<S, V>>,
    Path(album): Path<String>,
    request: Request,
    next: Next,
) -> Response {
    let session = session_value(request.headers());

    match state.gate.evaluate(&album, session.as_deref()).await {
        Ok(GateDecision::Allow) => next.run(request).await,
        Ok(GateDecision::RedirectLogin { album }) => {
            Redirect::temporary(&login_redirect_target(&album)).into_response()
        }
        Ok(GateDecision::RedirectHome) => Redirect::temporary("/").into_response(),
        Err(err) => AlbumError(err).into_response(),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle visitor registration.
///
/// # Endpoint
///
/// `POST /register` with JSON body `{"name": ..., "phone": ...}`
///
/// # Response
///
/// - `200 OK`: visitor JSON, plus a `Set-Cookie` header establishing the
///   session. Registration is the only path that sets a session; "login"
///   is simply re-registering or already holding a valid cookie.
/// - `400 Bad Request`: phone did not normalize to 10 digits
/// - `500 Internal Server Error`: the insert was rejected
pub async fn register_handler<S: ObjectStore, V: VisitorStore>(
    State(state): State<AppState<S, V>>,
    Json(body): Json<RegisterRequest>,
) -> Result<(
    [(header::HeaderName, String); 1],
    Json<Visitor>,
), RegistrationError> {
    let visitor = state.registration.register(&body.name, &body.phone).await?;

    let cookie = build_session_cookie(&visitor.id, &state.session);
    Ok(([(header::SET_COOKIE, cookie)], Json(visitor)))
}

/// Handle album content requests.
///
/// # Endpoint
///
/// `GET /photos/{album}` (behind [`gate_middleware`])
///
/// # Response
///
/// - `200 OK`: `{"photos": [{"url", "key"}, ...], "audio": {"url",
///   "song_name"} | null}`, photos in listing order
/// - `502 Bad Gateway`: listing or signing failed
pub async fn album_content_handler<S: ObjectStore, V: VisitorStore>(
    State(state): State<AppState<S, V>>,
    Path(album): Path<String>,
) -> Result<Json<AlbumContent>, AlbumError> {
    let content = state.resolver.resolve(&album).await?;
    Ok(Json(content))
}

/// Handle access/zine request submissions.
///
/// # Endpoint
///
/// `POST /requests` with JSON body
/// `{"kind": "new_zine", "email": ...}` or
/// `{"kind": "album_access", "email": ..., "album_url": ...}`
///
/// # Response
///
/// - `200 OK`: `{"success": true}`
/// - `502 Bad Gateway`: the email API rejected the send or the transport
///   failed; there is nothing durable to roll back
pub async fn access_request_handler<S: ObjectStore, V: VisitorStore>(
    State(state): State<AppState<S, V>>,
    Json(body): Json<AccessRequestBody>,
) -> Result<Json<RequestAccepted>, NotificationError> {
    let (email, request) = body.into_parts();
    state.notifier.notify(&email, &request).await?;
    Ok(Json(RequestAccepted { success: true }))
}

/// Handle watermarked photo downloads.
///
/// # Endpoint
///
/// `GET /watermark?url=<signed-photo-url>`
///
/// # Response
///
/// - `200 OK`: JPEG bytes with `Content-Disposition: attachment`; the
///   caller chooses the delivery mechanism for the bytes
/// - `502 Bad Gateway`: the photo could not be fetched
/// - `500 Internal Server Error`: decode or encode failed
pub async fn watermark_handler<S: ObjectStore, V: VisitorStore>(
    State(state): State<AppState<S, V>>,
    Query(query): Query<WatermarkQueryParams>,
) -> Result<Response, WatermarkError> {
    let bytes = state.watermarker.watermark_url(&query.url).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/jpeg")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"photo.jpg\"",
        )
        .body(axum::body::Body::from(bytes))
        .unwrap();

    Ok(response)
}

// =============================================================================
// Tests
// =============================================================================
