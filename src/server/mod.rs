//! HTTP server layer.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                          HTTP Layer                           │
//! │              GET /photos/{album}   POST /register             │
//! │                                                               │
//! │  ┌─────────────┐  ┌──────────────┐  ┌─────────────────────┐   │
//! │  │  handlers   │  │   session    │  │       routes        │   │
//! │  │ (requests)  │  │ (cookie codec│  │  (router config)    │   │
//! │  │             │  │  + gate mw)  │  │                     │   │
//! │  └─────────────┘  └──────────────┘  └─────────────────────┘   │
//! └───────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;
pub mod session;

pub use handlers::{
    access_request_handler, album_content_handler, gate_middleware, health_handler,
    login_redirect_target, register_handler, watermark_handler, AccessRequestBody, AlbumError,
    AppState, ErrorResponse, HealthResponse, RegisterRequest, RequestAccepted,
    WatermarkQueryParams,
};
pub use routes::{create_router, RouterConfig};
pub use session::{build_session_cookie, session_value, SessionConfig, SESSION_COOKIE};
