//! Event persistence
//!
//! [`EventStore`] is the backing store seen by the services. It owns the
//! authoritative event collection; callers never keep a private copy across
//! requests.

pub mod event_store;

pub use event_store::RedbEventStore;

use chrono::{DateTime, Utc};
use shared::models::{Event, EventUpdate};
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    /// A [`RankPlan`] refused the current collection; nothing was written
    #[error("{0}")]
    Rejected(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Computes a new presentation order from the collection as it is stored
/// inside the write transaction. Returning `Err` aborts the transaction.
pub type RankPlan<'a> = dyn FnMut(Vec<Event>) -> Result<Vec<Event>, String> + 'a;

/// Backing store for the event collection
///
/// Each method is one atomic unit from the caller's perspective.
pub trait EventStore: Send + Sync {
    /// Full collection in presentation order
    fn load_all(&self) -> StorageResult<Vec<Event>>;

    fn get(&self, id: &str) -> StorageResult<Option<Event>>;

    /// Insert a new event ranked after every existing one. The incoming
    /// `display_order` is ignored.
    fn create(&self, event: Event) -> StorageResult<Event>;

    /// Apply a partial update to the stored record and return it. The stored
    /// `display_order` is kept.
    fn update(&self, id: &str, update: EventUpdate, now: DateTime<Utc>) -> StorageResult<Event>;

    /// Remove an event and compact the remaining ranks; returns the remaining
    /// collection in presentation order
    fn delete(&self, id: &str) -> StorageResult<Vec<Event>>;

    /// Read the collection, run `plan` on it and store the resulting order as
    /// ranks `0..N`, all in one transaction. Only ranks are written: ids the
    /// plan invents are skipped and stored events it leaves out follow in
    /// their previous relative order. Returns the collection in its new order.
    fn rerank(&self, plan: &mut RankPlan<'_>) -> StorageResult<Vec<Event>>;
}

/// Sort by rank; ties (only possible with externally edited data) fall back to
/// creation time, then id.
pub(crate) fn sort_by_display_order(events: &mut [Event]) {
    events.sort_by(|a, b| {
        a.display_order
            .cmp(&b.display_order)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
}
