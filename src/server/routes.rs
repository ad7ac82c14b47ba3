//! Router configuration.
//!
//! # Route Structure
//!
//! ```text
//! /health                  - Health check (public)
//! /register                - Visitor registration (public, sets session)
//! /requests                - Access/zine request email (public)
//! /watermark               - Watermarked photo download
//! /photos/{album}          - Album content (gated per request)
//! ```
//!
//! The album route is wrapped in the gate middleware; redirect targets
//! (`/photos?album=<name>`, `/`) are frontend routes this service points
//! at but does not render.

use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    access_request_handler, album_content_handler, gate_middleware, health_handler,
    register_handler, watermark_handler, AppState,
};
use crate::storage::ObjectStore;
use crate::visitor::VisitorStore;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Defaults: any origin, tracing enabled.
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the application router.
///
/// The gate middleware is applied only to the album route; registration
/// and request submission stay reachable without a session (they are how
/// a session comes to exist).
pub fn create_router<S, V>(state: AppState<S, V>, config: RouterConfig) -> Router
where
    S: ObjectStore + 'static,
    V: VisitorStore + 'static,
{
    let cors = build_cors_layer(&config);

    // Gated album routes
    let album_routes = Router::new()
        .route("/{album}", get(album_content_handler::<S, V>))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate_middleware::<S, V>,
        ));

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/register", post(register_handler::<S, V>))
        .route("/requests", post(access_request_handler::<S, V>))
        .route("/watermark", get(watermark_handler::<S, V>))
        .nest("/photos", album_routes)
        .with_state(state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
