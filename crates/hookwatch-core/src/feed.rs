use std::sync::Arc;

use tracing::instrument;

use crate::event::EventView;
use crate::store::{EventStore, StorageError};

/// Number of records served to the dashboard.
pub const LATEST_EVENTS_LIMIT: usize = 20;

/// Read path: the newest events, stripped of storage and audit fields.
#[derive(Clone)]
pub struct EventFeed {
    store: Arc<dyn EventStore>,
}

impl EventFeed {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// The newest [`LATEST_EVENTS_LIMIT`] events, newest first.
    #[instrument(skip(self))]
    pub async fn latest(&self) -> Result<Vec<EventView>, StorageError> {
        let records = self.store.fetch_latest(LATEST_EVENTS_LIMIT).await?;
        Ok(records.iter().map(|r| r.event.to_view()).collect())
    }
}
