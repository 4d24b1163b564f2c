/// SQL DDL for the event log.
/// WAL mode enabled at connection time.
pub const SCHEMA_VERSION: u32 = 1;

pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    record_id TEXT NOT NULL UNIQUE,
    source_id TEXT NOT NULL,
    author TEXT NOT NULL,
    to_branch TEXT NOT NULL,
    from_branch TEXT,
    timestamp TEXT NOT NULL,
    action TEXT NOT NULL CHECK (action IN ('push', 'pull_request', 'merge')),
    message TEXT NOT NULL,
    created_at TEXT NOT NULL,
    raw_payload TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_events_created ON events(created_at DESC, seq DESC);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);
"#;

pub const PRAGMAS: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA busy_timeout = 5000;
PRAGMA synchronous = NORMAL;
"#;
