//! Normalization and ingestion pipeline for repository webhook events.
//!
//! Webhook payloads come in as loose JSON plus an event-type header. The
//! [`dispatch::Dispatcher`] routes each one to a normalizer in [`normalize`],
//! stamps the resulting [`event::CanonicalEvent`] and appends it to an
//! [`store::EventStore`]. [`feed::EventFeed`] serves the newest records back.

pub mod clock;
pub mod dispatch;
pub mod event;
pub mod feed;
pub mod ids;
pub mod normalize;
pub mod payload;
pub mod store;
pub mod timestamp;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatch::{Dispatcher, IngestOutcome};
pub use event::{CanonicalEvent, EventAction, EventView, NormalizedEvent, StoredEvent};
pub use feed::{EventFeed, LATEST_EVENTS_LIMIT};
pub use store::{EventStore, StorageError};
