//! Access gate for protected album routes.
//!
//! Every navigation to `GET /photos/{album}` is evaluated fresh; holding a
//! session does not grant anything beyond the next request. The decision is
//! three-state:
//!
//! - the album prefix holds no objects → redirect home
//! - no session, unparseable session, unknown visitor, or a failing lookup
//!   → redirect to login, carrying the album name
//! - otherwise → allow
//!
//! The two checks run sequentially and short-circuit: a missing album never
//! costs a database lookup.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::album::album_prefix;
use crate::error::StorageError;
use crate::storage::ObjectStore;
use crate::visitor::VisitorStore;

/// Outcome of gating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Session references a live visitor and the album exists
    Allow,

    /// Visitor must (re-)register; carries the album to return to
    RedirectLogin { album: String },

    /// The album does not exist
    RedirectHome,
}

/// Per-request gate over album routes.
pub struct AccessGate<S: ObjectStore, V: VisitorStore> {
    store: Arc<S>,
    visitors: Arc<V>,
}

impl<S: ObjectStore, V: VisitorStore> AccessGate<S, V> {
    pub fn new(store: Arc<S>, visitors: Arc<V>) -> Self {
        Self { store, visitors }
    }

    /// Evaluate a request for `album_name` carrying an optional session
    /// cookie value.
    ///
    /// A failing visitor lookup is treated as an invalid session (logged,
    /// not propagated); a failing storage probe is a real error and
    /// propagates.
    pub async fn evaluate(
        &self,
        album_name: &str,
        session_value: Option<&str>,
    ) -> Result<GateDecision, StorageError> {
        let prefix = album_prefix(album_name);
        if !self.store.prefix_exists(&prefix).await? {
            return Ok(GateDecision::RedirectHome);
        }

        let Some(session_value) = session_value else {
            return Ok(GateDecision::RedirectLogin {
                album: album_name.to_string(),
            });
        };

        let Ok(visitor_id) = Uuid::parse_str(session_value) else {
            return Ok(GateDecision::RedirectLogin {
                album: album_name.to_string(),
            });
        };

        match self.visitors.find(visitor_id).await {
            Ok(Some(_)) => Ok(GateDecision::Allow),
            Ok(None) => Ok(GateDecision::RedirectLogin {
                album: album_name.to_string(),
            }),
            Err(err) => {
                warn!(%visitor_id, "visitor lookup failed, treating session as invalid: {err}");
                Ok(GateDecision::RedirectLogin {
                    album: album_name.to_string(),
                })
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
