//! Test utilities for integration tests.
//!
//! Provides in-memory implementations of the storage and visitor seams,
//! plus helpers for spinning up local HTTP endpoints standing in for the
//! email API and the signed photo host.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use uuid::Uuid;

use gatefold::album::AlbumResolver;
use gatefold::error::{PersistenceError, StorageError};
use gatefold::gate::AccessGate;
use gatefold::notify::{Notifier, NotifierConfig};
use gatefold::server::{create_router, AppState, RouterConfig, SessionConfig};
use gatefold::storage::{ObjectInfo, ObjectStore};
use gatefold::visitor::{RegistrationService, Visitor, VisitorStore};
use gatefold::watermark::Watermarker;

// =============================================================================
// Mock Object Store
// =============================================================================

/// Object store over a fixed key list.
#[derive(Default)]
pub struct MockObjectStore {
    keys: Vec<String>,
    fail: bool,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(mut self, keys: &[&str]) -> Self {
        self.keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    /// Every call fails with `StorageError::Unavailable`.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.fail {
            Err(StorageError::Unavailable("mock outage".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectInfo>, StorageError> {
        self.check()?;
        Ok(self
            .keys
            .iter()
            .filter(|k| k.starts_with(prefix))
            .map(|k| ObjectInfo::new(k.clone()))
            .collect())
    }

    async fn presign_get(
        &self,
        key: &str,
        _expires_in: Duration,
    ) -> Result<String, StorageError> {
        self.check()?;
        Ok(format!("https://signed.example/{key}?sig=test"))
    }

    async fn prefix_exists(&self, prefix: &str) -> Result<bool, StorageError> {
        self.check()?;
        Ok(self.keys.iter().any(|k| k.starts_with(prefix)))
    }
}

// =============================================================================
// Mock Visitor Store
// =============================================================================

/// In-memory visitor store.
#[derive(Default)]
pub struct MockVisitorStore {
    rows: Mutex<HashMap<Uuid, Visitor>>,
    fail_insert: bool,
    fail_find: bool,
}

impl MockVisitorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a visitor with a known id.
    pub fn with_visitor(self, id: Uuid) -> Self {
        self.rows.lock().unwrap().insert(
            id,
            Visitor {
                id,
                name: "Jane Doe".to_string(),
                phone: "5551234567".to_string(),
                created_at: Utc::now(),
            },
        );
        self
    }

    pub fn failing_insert(mut self) -> Self {
        self.fail_insert = true;
        self
    }

    pub fn failing_find(mut self) -> Self {
        self.fail_find = true;
        self
    }
}

#[async_trait]
impl VisitorStore for MockVisitorStore {
    async fn insert(&self, name: &str, phone: &str) -> Result<Visitor, PersistenceError> {
        if self.fail_insert {
            return Err(PersistenceError("mock insert failure".to_string()));
        }
        let visitor = Visitor {
            id: Uuid::new_v4(),
            name: name.to_string(),
            phone: phone.to_string(),
            created_at: Utc::now(),
        };
        self.rows
            .lock()
            .unwrap()
            .insert(visitor.id, visitor.clone());
        Ok(visitor)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Visitor>, PersistenceError> {
        if self.fail_find {
            return Err(PersistenceError("mock find failure".to_string()));
        }
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }
}

// =============================================================================
// State / Router Builders
// =============================================================================

/// Endpoint nothing listens on; tests that never send email use it.
const DEAD_EMAIL_ENDPOINT: &str = "http://127.0.0.1:9/emails";

/// A small synthetic mark standing in for rendered overlay text.
pub fn test_mark() -> RgbaImage {
    RgbaImage::from_pixel(16, 8, Rgba([255, 255, 255, 200]))
}

/// Build application state over mock stores.
///
/// `email_endpoint` overrides where the notifier posts; pass `None` for
/// tests that never dispatch mail.
pub fn test_state(
    store: MockObjectStore,
    visitors: MockVisitorStore,
    email_endpoint: Option<String>,
) -> AppState<MockObjectStore, MockVisitorStore> {
    let store = Arc::new(store);
    let visitors = Arc::new(visitors);
    let http = reqwest::Client::new();

    AppState {
        resolver: Arc::new(AlbumResolver::new(
            Arc::clone(&store),
            Duration::from_secs(3600),
        )),
        gate: Arc::new(AccessGate::new(Arc::clone(&store), Arc::clone(&visitors))),
        registration: Arc::new(RegistrationService::new(visitors)),
        notifier: Arc::new(Notifier::new(
            http.clone(),
            NotifierConfig {
                endpoint: email_endpoint.unwrap_or_else(|| DEAD_EMAIL_ENDPOINT.to_string()),
                api_key: "re_test_key".to_string(),
                from: "gatefold <onboarding@resend.dev>".to_string(),
                to: "operator@example.com".to_string(),
            },
        )),
        watermarker: Arc::new(Watermarker::with_mark(http, test_mark(), 4)),
        session: SessionConfig::default(),
    }
}

/// Build a router over mock stores with tracing disabled.
pub fn test_router(store: MockObjectStore, visitors: MockVisitorStore) -> Router {
    create_router(
        test_state(store, visitors, None),
        RouterConfig::new().with_tracing(false),
    )
}

/// Serve a router on an ephemeral local port, returning its address.
pub async fn spawn_server(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Encode a flat-colored photo as PNG bytes.
pub fn png_photo(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([40, 80, 120]));
    let mut buf = std::io::Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// Check for the JPEG SOI marker.
pub fn is_valid_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}
