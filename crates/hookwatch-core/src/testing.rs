//! In-process fakes for unit tests.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::clock::Clock;
use crate::event::{CanonicalEvent, StoredEvent};
use crate::ids::RecordId;
use crate::store::{EventStore, StorageError};

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<StoredEvent>>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn all(&self) -> Vec<StoredEvent> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn append(&self, event: &CanonicalEvent) -> Result<RecordId, StorageError> {
        let record_id = RecordId::generate();
        self.records.lock().push(StoredEvent {
            record_id: record_id.clone(),
            event: event.clone(),
        });
        Ok(record_id)
    }

    async fn fetch_latest(&self, limit: usize) -> Result<Vec<StoredEvent>, StorageError> {
        let records = self.records.lock();
        let mut indexed: Vec<(usize, &StoredEvent)> = records.iter().enumerate().collect();
        indexed.sort_by(|(ia, a), (ib, b)| {
            b.event.created_at.cmp(&a.event.created_at).then(ib.cmp(ia))
        });
        Ok(indexed.into_iter().take(limit).map(|(_, r)| r.clone()).collect())
    }
}

/// Store whose every call fails.
pub struct DownStore;

#[async_trait]
impl EventStore for DownStore {
    async fn append(&self, _event: &CanonicalEvent) -> Result<RecordId, StorageError> {
        Err(StorageError::Unavailable("connection refused".into()))
    }

    async fn fetch_latest(&self, _limit: usize) -> Result<Vec<StoredEvent>, StorageError> {
        Err(StorageError::Unavailable("connection refused".into()))
    }
}

/// Clock advancing one second per reading from a fixed origin.
pub struct StepClock {
    origin: DateTime<Utc>,
    ticks: AtomicI64,
}

impl StepClock {
    pub fn new(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let n = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.origin + Duration::seconds(n)
    }
}
