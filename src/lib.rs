//! # gatefold
//!
//! A gated event photo album server backed by S3-compatible object storage.
//!
//! Attendees of an event register with name and phone to unlock a gallery
//! of photos (and an optional audio track) for an album. Albums are plain
//! key prefixes in a bucket, uploaded out of band; this service lists them,
//! signs time-limited URLs, gates access behind a session cookie, forwards
//! access requests to the operator by email, and releases downloads only as
//! watermarked copies.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`storage`] - Object store trait and S3 implementation
//! - [`album`] - Album content resolution (listing → signed gallery)
//! - [`gate`] - Per-request access gate for album routes
//! - [`visitor`] - Visitor registration and Postgres-backed store
//! - [`notify`] - Transactional email dispatch for access requests
//! - [`watermark`] - Photo fetch, text overlay compositing, re-encoding
//! - [`server`] - Axum-based HTTP server, session cookies, routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use gatefold::album::AlbumResolver;
//! use gatefold::storage::{create_s3_client, S3ObjectStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = create_s3_client(None, "us-east-1").await;
//!     let store = Arc::new(S3ObjectStore::new(client, "event-albums".to_string()));
//!
//!     let resolver = AlbumResolver::new(store, Duration::from_secs(3600));
//!     let content = resolver.resolve("launch-party").await.unwrap();
//!     println!("{} photos", content.photos.len());
//! }
//! ```

pub mod album;
pub mod config;
pub mod error;
pub mod gate;
pub mod notify;
pub mod server;
pub mod storage;
pub mod visitor;
pub mod watermark;

// Re-export commonly used types
pub use album::{
    album_prefix, is_audio_key, is_photo_key, song_name_from_key, AlbumContent, AlbumResolver,
    AudioEntry, PhotoEntry,
};
pub use config::Config;
pub use error::{
    ConfigError, NotificationError, PersistenceError, RegistrationError, StorageError,
    WatermarkError,
};
pub use gate::{AccessGate, GateDecision};
pub use notify::{build_message, AccessRequest, Notifier, NotifierConfig};
pub use server::{create_router, AppState, RouterConfig, SessionConfig, SESSION_COOKIE};
pub use storage::{create_s3_client, ObjectInfo, ObjectStore, S3ObjectStore};
pub use visitor::{clean_phone, PgVisitorStore, RegistrationService, Visitor, VisitorStore};
pub use watermark::{load_font, OverlaySpec, Watermarker};
