//! Document store access.
//!
//! The pool's tournaments, golfers and entries live in an external
//! document store. `DocumentStore` covers the handful of queries the
//! leaderboard needs; `MemoryStore` backs tests and local runs,
//! `SqliteStore` is the persistent backend.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Entry, Golfer, LiveScore, Tournament};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
    #[error("{collection} document {id} not found")]
    NotFound { collection: &'static str, id: String },
    #[error("corrupt {collection} document: {reason}")]
    Corrupt { collection: &'static str, reason: String },
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Queries and writes against the `tournaments`, `golfers` and `entries`
/// collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// First tournament whose status is `upcoming` or `active`.
    async fn current_tournament(&self) -> Result<Option<Tournament>, StoreError>;

    async fn tournament(&self, id: &str) -> Result<Option<Tournament>, StoreError>;

    /// First golfer (in insertion order) whose name matches exactly.
    async fn golfer_by_name(&self, name: &str) -> Result<Option<Golfer>, StoreError>;

    async fn golfers(&self) -> Result<Vec<Golfer>, StoreError>;

    /// Overwrite a golfer's live fields.
    async fn update_golfer_live(&self, id: &str, live: &LiveScore) -> Result<(), StoreError>;

    /// Record sync progress on a tournament. A `None` round keeps the
    /// stored one.
    async fn update_tournament_progress(
        &self,
        id: &str,
        current_round: Option<u32>,
        last_update: i64,
    ) -> Result<(), StoreError>;

    /// Entries for a tournament in submission order.
    async fn entries_for_tournament(&self, tournament_id: &str) -> Result<Vec<Entry>, StoreError>;

    async fn insert_entry(&self, entry: &Entry) -> Result<(), StoreError>;

    /// Mark an entry's fee as received (or not).
    async fn set_entry_paid(&self, entry_id: &str, paid: bool) -> Result<(), StoreError>;

    async fn insert_golfer(&self, golfer: &Golfer) -> Result<(), StoreError>;

    async fn insert_tournament(&self, tournament: &Tournament) -> Result<(), StoreError>;
}
