//! Visitor registration and lookup.
//!
//! Visitors are the people who unlock a gallery by submitting name and
//! phone. The table is append-only: rows are never updated or deleted by
//! this service, and uniqueness is not enforced, so repeated submissions
//! create new rows. Registration is also the only path that establishes a
//! session; there is no separate login step.

mod postgres;

pub use postgres::PgVisitorStore;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{PersistenceError, RegistrationError};

/// Number of digits a normalized phone number must have.
pub const PHONE_DIGITS: usize = 10;

/// One row of the `users` relation.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Visitor {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// Persistence interface for visitors.
///
/// The gate queries by exact id for session validation; registration
/// appends rows.
#[async_trait]
pub trait VisitorStore: Send + Sync {
    /// Persist a new visitor and return the stored row.
    async fn insert(&self, name: &str, phone: &str) -> Result<Visitor, PersistenceError>;

    /// Look up a visitor by id. `Ok(None)` means the row is absent.
    async fn find(&self, id: Uuid) -> Result<Option<Visitor>, PersistenceError>;
}

// =============================================================================
// Registration
// =============================================================================

/// Validates and persists visitor registrations.
pub struct RegistrationService<V: VisitorStore> {
    store: Arc<V>,
}

impl<V: VisitorStore> RegistrationService<V> {
    pub fn new(store: Arc<V>) -> Self {
        Self { store }
    }

    /// Register a visitor.
    ///
    /// Strips all non-digit characters from `raw_phone` before storage and
    /// rejects anything that does not normalize to exactly ten digits. The
    /// caller binds the returned row's id into a session cookie.
    pub async fn register(
        &self,
        name: &str,
        raw_phone: &str,
    ) -> Result<Visitor, RegistrationError> {
        let phone = clean_phone(raw_phone);
        if phone.len() != PHONE_DIGITS {
            return Err(RegistrationError::InvalidPhone {
                digits: phone.len(),
            });
        }

        let visitor = self.store.insert(name, &phone).await?;
        Ok(visitor)
    }
}

/// Strip every non-digit character from a raw phone string.
pub fn clean_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

// =============================================================================
// Tests
// =============================================================================
