use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

/// Source of ingestion timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock truncated to microseconds that never steps backwards between
/// readings.
#[derive(Debug, Default)]
pub struct SystemClock {
    last_micros: AtomicI64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let wall = Utc::now();
        let micros = wall.timestamp_micros();
        let previous = self.last_micros.fetch_max(micros, Ordering::AcqRel);
        DateTime::from_timestamp_micros(previous.max(micros)).unwrap_or(wall)
    }
}
