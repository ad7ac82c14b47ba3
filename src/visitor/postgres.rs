//! Postgres-backed implementation of [`VisitorStore`].
//!
//! Expects a single relation:
//!
//! ```sql
//! CREATE TABLE users (
//!     id         uuid PRIMARY KEY DEFAULT gen_random_uuid(),
//!     name       text NOT NULL,
//!     phone      text NOT NULL,
//!     created_at timestamptz NOT NULL
//! );
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Visitor, VisitorStore};
use crate::error::PersistenceError;

/// Visitor store over a shared connection pool.
#[derive(Clone)]
pub struct PgVisitorStore {
    pool: PgPool,
}

impl PgVisitorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitorStore for PgVisitorStore {
    async fn insert(&self, name: &str, phone: &str) -> Result<Visitor, PersistenceError> {
        // fetch_one: an insert that returns no row is a persistence failure
        sqlx::query_as::<_, Visitor>(
            "INSERT INTO users (name, phone, created_at) \
             VALUES ($1, $2, $3) \
             RETURNING id, name, phone, created_at",
        )
        .bind(name)
        .bind(phone)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PersistenceError(e.to_string()))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Visitor>, PersistenceError> {
        sqlx::query_as::<_, Visitor>(
            "SELECT id, name, phone, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PersistenceError(e.to_string()))
    }
}
