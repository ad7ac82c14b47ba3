//! Album content resolution.
//!
//! An album is a named set of objects sharing the storage-key prefix
//! `albums/<name>/`. The resolver turns a raw object listing into a typed
//! gallery: photo entries with signed URLs, plus at most one audio track.
//!
//! There is no caching here. Every call re-lists the prefix and re-signs
//! every photo, so repeated requests for the same album pay the full
//! listing plus N signing calls.

use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use serde::Serialize;

use crate::error::StorageError;
use crate::storage::ObjectStore;

/// Storage-key prefix shared by all albums.
pub const ALBUM_ROOT: &str = "albums/";

/// Photo extensions, matched case-sensitively.
pub const PHOTO_EXTENSIONS: [&str; 2] = [".jpg", ".png"];

/// Audio extension, matched case-insensitively.
pub const AUDIO_EXTENSION: &str = ".mp3";

/// Fallback track name when the key yields an empty one.
pub const DEFAULT_SONG_NAME: &str = "Album Audio";

/// Build the full key prefix for an album name.
///
/// The name is used verbatim as a path segment; albums are created by an
/// operator, not end users.
pub fn album_prefix(name: &str) -> String {
    format!("{ALBUM_ROOT}{name}/")
}

/// One photo in a resolved album.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PhotoEntry {
    /// Signed, time-limited URL for the photo
    pub url: String,

    /// Storage object key
    pub key: String,
}

/// The album's audio track, when one exists.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AudioEntry {
    /// Signed, time-limited URL for the track
    pub url: String,

    /// Track name derived from the object key's filename
    pub song_name: String,
}

/// A fully resolved album.
#[derive(Debug, Clone, Serialize)]
pub struct AlbumContent {
    /// Photos in listing order
    pub photos: Vec<PhotoEntry>,

    /// At most one audio track (first `.mp3` in listing order)
    pub audio: Option<AudioEntry>,
}

// =============================================================================
// Resolver
// =============================================================================

/// Resolves album names into signed photo/audio collections.
pub struct AlbumResolver<S: ObjectStore> {
    store: Arc<S>,
    signed_url_ttl: Duration,
}

impl<S: ObjectStore> AlbumResolver<S> {
    /// Create a resolver over the given store.
    ///
    /// `signed_url_ttl` bounds how long resolved URLs remain valid.
    pub fn new(store: Arc<S>, signed_url_ttl: Duration) -> Self {
        Self {
            store,
            signed_url_ttl,
        }
    }

    /// Resolve the content of one album.
    ///
    /// Lists every object under the album prefix, partitions keys into
    /// photo and audio candidates, and signs a URL for each photo. Signing
    /// is fanned out concurrently; the returned entries follow the listing
    /// order, not completion order.
    pub async fn resolve(&self, album_name: &str) -> Result<AlbumContent, StorageError> {
        let prefix = album_prefix(album_name);
        let listing = self.store.list_objects(&prefix).await?;

        let photo_keys: Vec<&str> = listing
            .iter()
            .map(|obj| obj.key.as_str())
            .filter(|key| is_photo_key(key))
            .collect();

        let photo_futures = photo_keys.iter().map(|key| {
            let store = Arc::clone(&self.store);
            let ttl = self.signed_url_ttl;
            async move {
                store.presign_get(key, ttl).await.map(|url| PhotoEntry {
                    url,
                    key: (*key).to_string(),
                })
            }
        });

        // try_join_all preserves input order regardless of completion order
        let photos = try_join_all(photo_futures).await?;

        let audio = match listing.iter().find(|obj| is_audio_key(&obj.key)) {
            Some(obj) => {
                let url = self.store.presign_get(&obj.key, self.signed_url_ttl).await?;
                Some(AudioEntry {
                    url,
                    song_name: song_name_from_key(&obj.key),
                })
            }
            None => None,
        };

        Ok(AlbumContent { photos, audio })
    }
}

// =============================================================================
// Key Classification
// =============================================================================

/// Whether a key names a photo (`.jpg`/`.png`, case-sensitive).
pub fn is_photo_key(key: &str) -> bool {
    PHOTO_EXTENSIONS.iter().any(|ext| key.ends_with(ext))
}

/// Whether a key names an audio track (`.mp3`, case-insensitive).
pub fn is_audio_key(key: &str) -> bool {
    key.to_lowercase().ends_with(AUDIO_EXTENSION)
}

/// Derive the track name from an audio key.
///
/// Takes the last path segment and strips the `.mp3` suffix; an empty
/// result falls back to [`DEFAULT_SONG_NAME`].
pub fn song_name_from_key(key: &str) -> String {
    let filename = key.rsplit('/').next().unwrap_or(key);
    let stem = if filename.to_lowercase().ends_with(AUDIO_EXTENSION) {
        &filename[..filename.len() - AUDIO_EXTENSION.len()]
    } else {
        filename
    };

    if stem.is_empty() {
        DEFAULT_SONG_NAME.to_string()
    } else {
        stem.to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================
