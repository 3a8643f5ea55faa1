//! Datastore seam.
//!
//! Handlers never talk to a database driver directly; they go through
//! [`Datastore`], which has a PostgreSQL implementation for deployments and an
//! in-process one for local runs and tests. Uniqueness of emails, usernames,
//! access tokens and (user, listing) pairs is the store's job.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::config::AppConfig;
use crate::saved::repo_types::SavedItem;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Connection string that selects the in-process store.
pub const MEMORY_URL_SCHEME: &str = "memory://";

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("duplicate value for {field}")]
    Duplicate { field: String },

    #[error("datastore unavailable")]
    Unavailable,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    pub fn duplicate(field: impl Into<String>) -> Self {
        StoreError::Duplicate {
            field: field.into(),
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Everything needed to persist a user; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub access_token: String,
}

#[async_trait]
pub trait Datastore: Send + Sync {
    /// Whether the backing store can currently serve requests.
    async fn is_ready(&self) -> bool;

    /// Brings the schema up to date. Stores without a schema do nothing.
    async fn run_migrations(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn insert_user(&self, user: NewUserRecord) -> StoreResult<User>;
    async fn find_user_by_token(&self, token: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Records a saved listing; fails with [`StoreError::Duplicate`] when the
    /// user already saved it.
    async fn insert_saved_item(&self, user_id: Uuid, listing_id: i64) -> StoreResult<SavedItem>;

    /// Saved items of one user, newest first.
    async fn list_saved_items(&self, user_id: Uuid) -> StoreResult<Vec<SavedItem>>;
}

/// Opens the store selected by `DATABASE_URL`.
///
/// PostgreSQL pools connect lazily so the process starts (and the
/// connectivity gate answers 503) even while the database is down.
pub fn connect(config: &AppConfig) -> anyhow::Result<Arc<dyn Datastore>> {
    if config.database_url.starts_with(MEMORY_URL_SCHEME) {
        tracing::warn!("using in-process datastore; data is lost on restart");
        return Ok(Arc::new(MemoryStore::new()));
    }
    Ok(Arc::new(PgStore::connect_lazy(config)?))
}
