use async_trait::async_trait;

use crate::event::{CanonicalEvent, StoredEvent};
use crate::ids::RecordId;

/// Failure reported by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Append-only event log consumed by the dispatcher and the read path.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist one record. Either the whole record is written or nothing is.
    async fn append(&self, event: &CanonicalEvent) -> Result<RecordId, StorageError>;

    /// Up to `limit` records ordered by `created_at`, newest first.
    async fn fetch_latest(&self, limit: usize) -> Result<Vec<StoredEvent>, StorageError>;
}
