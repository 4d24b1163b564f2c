use async_trait::async_trait;
use chrono::SecondsFormat;
use tracing::instrument;

use hookwatch_core::ids::RecordId;
use hookwatch_core::{CanonicalEvent, EventAction, EventStore, StorageError, StoredEvent};

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers;

const SELECT_COLUMNS: &str = "record_id, source_id, author, to_branch, from_branch, timestamp, \
                              action, message, created_at, raw_payload";

/// SQLite-backed append-only event log.
#[derive(Clone)]
pub struct EventRepo {
    db: Database,
}

impl EventRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert one record and return its storage identifier.
    #[instrument(skip(self, event), fields(action = %event.action, source_id = %event.id))]
    pub fn append(&self, event: &CanonicalEvent) -> Result<RecordId, StoreError> {
        let record_id = RecordId::generate();
        let raw_payload = serde_json::to_string(&event.raw_payload)?;

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO events (record_id, source_id, author, to_branch, from_branch,
                                     timestamp, action, message, created_at, raw_payload)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    record_id.as_str(),
                    event.id,
                    event.author,
                    event.to_branch,
                    event.from_branch,
                    event.timestamp,
                    event.action.as_str(),
                    event.message,
                    encode_created_at(event),
                    raw_payload,
                ],
            )?;
            Ok(())
        })?;

        Ok(record_id)
    }

    /// Newest records first; ties on `created_at` resolve to the later insert.
    #[instrument(skip(self))]
    pub fn latest(&self, limit: u32) -> Result<Vec<StoredEvent>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM events
                 ORDER BY created_at DESC, seq DESC
                 LIMIT ?1"
            ))?;
            let mut rows = stmt.query([limit])?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                results.push(row_to_event(row)?);
            }
            Ok(results)
        })
    }

    /// Number of records in the log.
    #[instrument(skip(self))]
    pub fn count(&self) -> Result<i64, StoreError> {
        self.db.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?)
        })
    }

    async fn blocking<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(EventRepo) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let repo = self.clone();
        tokio::task::spawn_blocking(move || f(repo))
            .await
            .map_err(|e| StoreError::Join(e.to_string()))?
    }
}

#[async_trait]
impl EventStore for EventRepo {
    async fn append(&self, event: &CanonicalEvent) -> Result<RecordId, StorageError> {
        let event = event.clone();
        Ok(self.blocking(move |repo| repo.append(&event)).await?)
    }

    async fn fetch_latest(&self, limit: usize) -> Result<Vec<StoredEvent>, StorageError> {
        let limit = u32::try_from(limit).unwrap_or(u32::MAX);
        Ok(self.blocking(move |repo| repo.latest(limit)).await?)
    }
}

// Fixed-width UTC text so lexical order matches chronological order.
fn encode_created_at(event: &CanonicalEvent) -> String {
    event.created_at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn row_to_event(row: &rusqlite::Row<'_>) -> Result<StoredEvent, StoreError> {
    let action: String = row_helpers::get(row, 6, "events", "action")?;
    let created_at: String = row_helpers::get(row, 8, "events", "created_at")?;
    let raw_payload: String = row_helpers::get(row, 9, "events", "raw_payload")?;

    Ok(StoredEvent {
        record_id: RecordId::from_raw(row_helpers::get::<String>(row, 0, "events", "record_id")?),
        event: CanonicalEvent {
            id: row_helpers::get(row, 1, "events", "source_id")?,
            author: row_helpers::get(row, 2, "events", "author")?,
            to_branch: row_helpers::get(row, 3, "events", "to_branch")?,
            from_branch: row_helpers::get_opt(row, 4, "events", "from_branch")?,
            timestamp: row_helpers::get(row, 5, "events", "timestamp")?,
            action: row_helpers::parse_enum::<EventAction>(&action, "events", "action")?,
            message: row_helpers::get(row, 7, "events", "message")?,
            created_at: row_helpers::parse_utc(&created_at, "events", "created_at")?,
            raw_payload: row_helpers::parse_json(&raw_payload, "events", "raw_payload")?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use hookwatch_core::normalize::{normalize_merge, normalize_push};
    use serde_json::json;
    use std::sync::Arc;

    fn push_at(sha: &str, created_at: DateTime<Utc>) -> CanonicalEvent {
        let payload = json!({
            "ref": "refs/heads/main",
            "after": sha,
            "pusher": {"name": "dev"},
            "head_commit": {"timestamp": "2024-03-15T14:30:00Z"}
        });
        normalize_push(&payload).into_canonical(created_at, payload)
    }

    fn origin() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn append_and_read_back() {
        let repo = EventRepo::new(Database::in_memory().unwrap());
        let evt = push_at("abc", origin());
        let record_id = repo.append(&evt).unwrap();
        assert!(record_id.as_str().starts_with("rec_"));

        let stored = repo.latest(20).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].record_id, record_id);
        assert_eq!(stored[0].event, evt);
    }

    #[test]
    fn push_from_branch_stays_absent() {
        let repo = EventRepo::new(Database::in_memory().unwrap());
        repo.append(&push_at("abc", origin())).unwrap();
        let stored = repo.latest(1).unwrap();
        assert!(stored[0].event.from_branch.is_none());

        let is_null: bool = repo
            .db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT from_branch IS NULL FROM events", [], |row| row.get(0))?)
            })
            .unwrap();
        assert!(is_null);
    }

    #[test]
    fn merge_round_trips_from_branch() {
        let repo = EventRepo::new(Database::in_memory().unwrap());
        let payload = json!({
            "action": "closed",
            "pull_request": {"merged": true, "head": {"ref": "topic"}}
        });
        let evt = normalize_merge(&payload).into_canonical(origin(), payload);
        repo.append(&evt).unwrap();
        let stored = repo.latest(1).unwrap();
        assert_eq!(stored[0].event.from_branch.as_deref(), Some("topic"));
        assert_eq!(stored[0].event.action, EventAction::Merge);
        assert_eq!(stored[0].event.raw_payload["pull_request"]["merged"], true);
    }

    #[test]
    fn latest_orders_by_created_at_desc() {
        let repo = EventRepo::new(Database::in_memory().unwrap());
        // Insert out of chronological order
        for offset in [3, 0, 4, 1, 2] {
            repo.append(&push_at(&format!("sha{offset}"), origin() + Duration::seconds(offset)))
                .unwrap();
        }
        let ids: Vec<String> = repo.latest(10).unwrap().into_iter().map(|s| s.event.id).collect();
        assert_eq!(ids, ["sha4", "sha3", "sha2", "sha1", "sha0"]);
    }

    #[test]
    fn latest_respects_limit() {
        let repo = EventRepo::new(Database::in_memory().unwrap());
        for i in 0..25 {
            repo.append(&push_at(&format!("sha{i}"), origin() + Duration::seconds(i)))
                .unwrap();
        }
        let stored = repo.latest(20).unwrap();
        assert_eq!(stored.len(), 20);
        assert_eq!(stored[0].event.id, "sha24");
        assert_eq!(stored[19].event.id, "sha5");
        assert_eq!(repo.count().unwrap(), 25);
    }

    #[test]
    fn equal_created_at_newest_insert_first() {
        let repo = EventRepo::new(Database::in_memory().unwrap());
        repo.append(&push_at("first", origin())).unwrap();
        repo.append(&push_at("second", origin())).unwrap();
        let stored = repo.latest(2).unwrap();
        assert_eq!(stored[0].event.id, "second");
        assert_eq!(stored[1].event.id, "first");
    }

    #[test]
    fn sub_second_created_at_preserved() {
        let repo = EventRepo::new(Database::in_memory().unwrap());
        let a = origin() + Duration::microseconds(1);
        let b = origin() + Duration::microseconds(999_999);
        repo.append(&push_at("b", b)).unwrap();
        repo.append(&push_at("a", a)).unwrap();
        let stored = repo.latest(2).unwrap();
        assert_eq!(stored[0].event.created_at, b);
        assert_eq!(stored[1].event.created_at, a);
    }

    #[test]
    fn empty_log_returns_nothing() {
        let repo = EventRepo::new(Database::in_memory().unwrap());
        assert!(repo.latest(20).unwrap().is_empty());
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn unknown_action_rejected_by_schema() {
        let db = Database::in_memory().unwrap();
        let result = db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO events (record_id, source_id, author, to_branch,
                                     timestamp, action, message, created_at, raw_payload)
                 VALUES ('rec_x', '', '', '', '', 'issues', '',
                         '2024-01-01T00:00:00.000000Z', '{}')",
                [],
            )?;
            Ok(())
        });
        assert!(matches!(result, Err(StoreError::Database(_))));
    }

    #[test]
    fn malformed_payload_returns_corrupt_row() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO events (record_id, source_id, author, to_branch,
                                     timestamp, action, message, created_at, raw_payload)
                 VALUES ('rec_x', '', '', '', '', 'push', '',
                         '2024-01-01T00:00:00.000000Z', 'not valid json')",
                [],
            )?;
            Ok(())
        })
        .unwrap();

        let repo = EventRepo::new(db);
        let result = repo.latest(20);
        assert!(matches!(result, Err(StoreError::CorruptRow { column: "raw_payload", .. })));
    }

    #[tokio::test]
    async fn event_store_trait_round_trip() {
        let repo = EventRepo::new(Database::in_memory().unwrap());
        let store: Arc<dyn EventStore> = Arc::new(repo.clone());

        let evt = push_at("async", origin());
        let record_id = store.append(&evt).await.unwrap();
        let stored = store.fetch_latest(20).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].record_id, record_id);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn event_store_maps_corrupt_rows() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO events (record_id, source_id, author, to_branch,
                                     timestamp, action, message, created_at, raw_payload)
                 VALUES ('rec_x', '', '', '', '', 'push', '', 'garbage', '{}')",
                [],
            )?;
            Ok(())
        })
        .unwrap();

        let store = EventRepo::new(db);
        let result = EventStore::fetch_latest(&store, 20).await;
        assert!(matches!(result, Err(StorageError::Corrupt(_))));
    }

    #[tokio::test]
    async fn concurrent_appends_all_land() {
        let store: Arc<dyn EventStore> = Arc::new(EventRepo::new(Database::in_memory().unwrap()));
        let mut handles = vec![];
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append(&push_at(&format!("sha{i}"), origin() + Duration::seconds(i)))
                    .await
                    .unwrap()
            }));
        }
        let mut ids = vec![];
        for h in handles {
            ids.push(h.await.unwrap());
        }
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids.dedup();
        assert_eq!(ids.len(), 10);
        assert_eq!(store.fetch_latest(100).await.unwrap().len(), 10);
    }
}
