//! Object storage gateway.
//!
//! This module abstracts the object store behind the [`ObjectStore`] trait
//! so the resolver and gate can be exercised against fakes in tests. The
//! production implementation is S3-backed ([`S3ObjectStore`]).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐
//! │ AlbumResolver│   │  AccessGate  │
//! └──────┬───────┘   └──────┬───────┘
//!        │                  │
//!        ▼                  ▼
//! ┌─────────────────────────────────┐
//! │        ObjectStore trait        │
//! │ (list, presign, existence probe)│
//! └────────────────┬────────────────┘
//!                  │
//!                  ▼
//! ┌─────────────────────────────────┐
//! │          S3ObjectStore          │
//! └─────────────────────────────────┘
//! ```

mod s3;

pub use s3::{create_s3_client, S3ObjectStore};

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StorageError;

/// Basic metadata for one stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Full object key (e.g. "albums/summer/cover.jpg")
    pub key: String,

    /// Object size in bytes, when the listing reports one
    pub size: Option<i64>,
}

impl ObjectInfo {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size: None,
        }
    }
}

/// Interface to an object store holding album content.
///
/// Implementations must return listings in the service's native order; the
/// resolver relies on that order when assembling galleries.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List every object under the given key prefix.
    ///
    /// Follows continuation tokens until the listing is exhausted. Any
    /// transport or service failure is a [`StorageError::Unavailable`];
    /// partial results are never returned.
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectInfo>, StorageError>;

    /// Produce a signed, time-limited GET URL for one object.
    async fn presign_get(&self, key: &str, expires_in: Duration)
        -> Result<String, StorageError>;

    /// Check whether at least one object exists under the prefix.
    ///
    /// Cheaper than a full listing; used by the access gate before the
    /// session check.
    async fn prefix_exists(&self, prefix: &str) -> Result<bool, StorageError>;
}
