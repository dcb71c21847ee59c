//! Database layer for devscribe.
//!
//! Provides a unified `Database` struct that owns the SQLite connection and
//! hands out the append-only `Records` store. Records are only ever inserted;
//! there is no update or delete path.

mod records;

pub use records::Records;

use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not determine data directory")]
    DataDir,

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// The main database struct that owns the SQLite connection.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the default location,
    /// `~/.local/share/devscribe/devscribe.db`.
    pub fn open() -> Result<Self, StoreError> {
        let db_path = Self::default_path().ok_or(StoreError::DataDir)?;

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        Self::open_at(&db_path)
    }

    /// Open or create a database at a specific path.
    pub fn open_at(path: &std::path::Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (useful for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get the default database path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("devscribe").join("devscribe.db"))
    }

    /// Access the records store.
    pub fn records(&self) -> Records<'_> {
        let conn = self.conn.lock().expect("Database lock poisoned");
        Records::new(conn)
    }

    /// Initialize the database schema.
    fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                speaker TEXT NOT NULL,
                kind TEXT NOT NULL,
                text TEXT NOT NULL,
                file_path TEXT,
                change_kind TEXT,
                before_text TEXT,
                after_text TEXT,
                detail TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_records_session ON records(session_id);
            CREATE INDEX IF NOT EXISTS idx_records_timestamp ON records(timestamp);
            "#,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use devscribe_core::{ChangeKind, Record, RecordBody, Speaker};
    use std::path::PathBuf;

    fn dialogue(id: &str, session: &str, secs: u32, speaker: Speaker, text: &str) -> Record {
        Record {
            id: id.to_string(),
            session_id: session.to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, secs).unwrap(),
            speaker,
            body: RecordBody::dialogue(text),
        }
    }

    #[test]
    fn test_append_and_read_back() {
        let db = Database::open_in_memory().unwrap();
        let record = dialogue("r1", "s1", 0, Speaker::User, "how does this work exactly?");

        db.records().append(&record).unwrap();

        let stored = db.records().by_session("s1").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0], record);
    }

    #[test]
    fn test_append_same_text_twice_keeps_both() {
        let db = Database::open_in_memory().unwrap();
        db.records()
            .append(&dialogue("r1", "s1", 0, Speaker::User, "how does this work?"))
            .unwrap();
        db.records()
            .append(&dialogue("r2", "s1", 1, Speaker::User, "how does this work?"))
            .unwrap();

        assert_eq!(db.records().by_session("s1").unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.records()
            .append(&dialogue("r1", "s1", 0, Speaker::User, "first insert here"))
            .unwrap();
        let result = db
            .records()
            .append(&dialogue("r1", "s1", 1, Speaker::User, "second insert here"));
        assert!(result.is_err());
    }

    #[test]
    fn test_by_session_orders_ascending() {
        let db = Database::open_in_memory().unwrap();
        db.records()
            .append(&dialogue("r2", "s1", 30, Speaker::AgentChat, "second message text"))
            .unwrap();
        db.records()
            .append(&dialogue("r1", "s1", 10, Speaker::User, "first message text"))
            .unwrap();

        let stored = db.records().by_session("s1").unwrap();
        assert_eq!(stored[0].id, "r1");
        assert_eq!(stored[1].id, "r2");
    }

    #[test]
    fn test_query_keyword_and_time_bounds() {
        let db = Database::open_in_memory().unwrap();
        db.records()
            .append(&dialogue("r1", "s1", 0, Speaker::User, "searching for the cache"))
            .unwrap();
        db.records()
            .append(&dialogue("r2", "s1", 20, Speaker::User, "cache strategy question"))
            .unwrap();
        db.records()
            .append(&dialogue("r3", "s1", 40, Speaker::User, "unrelated topic entirely"))
            .unwrap();

        let hits = db.records().query(Some("CACHE"), None, None).unwrap();
        assert_eq!(hits.len(), 2);
        // Newest first.
        assert_eq!(hits[0].id, "r2");

        let after = Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 10).unwrap();
        let hits = db.records().query(Some("cache"), Some(after), None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "r2");

        let before = Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 10).unwrap();
        let hits = db.records().query(None, None, Some(before)).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "r1");
    }

    #[test]
    fn test_session_ids_ordered_by_most_recent() {
        let db = Database::open_in_memory().unwrap();
        // s1 starts first but has the most recent record; s2 sits in between.
        db.records()
            .append(&dialogue("r1", "s1", 0, Speaker::User, "earliest record text"))
            .unwrap();
        db.records()
            .append(&dialogue("r2", "s2", 20, Speaker::User, "middle record text"))
            .unwrap();
        db.records()
            .append(&dialogue("r3", "s1", 40, Speaker::User, "latest record text"))
            .unwrap();

        let ids = db.records().session_ids().unwrap();
        assert_eq!(ids, vec!["s1".to_string(), "s2".to_string()]);
    }

    #[test]
    fn test_file_change_row_survives() {
        let db = Database::open_in_memory().unwrap();
        let record = Record {
            id: "r1".to_string(),
            session_id: "s1".to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap(),
            speaker: Speaker::AgentBuilder,
            body: RecordBody::FileChange {
                text: "modified src/lib.rs".to_string(),
                file_path: PathBuf::from("src/lib.rs"),
                change_kind: ChangeKind::Modified,
                before_text: Some("old".to_string()),
                after_text: Some("new".to_string()),
            },
        };

        db.records().append(&record).unwrap();

        let stored = db.records().by_session("s1").unwrap();
        assert_eq!(stored[0], record);
    }

    #[test]
    fn test_all_and_count() {
        let db = Database::open_in_memory().unwrap();
        db.records()
            .append(&dialogue("r1", "s1", 0, Speaker::User, "first message text"))
            .unwrap();
        db.records()
            .append(&dialogue("r2", "s2", 10, Speaker::AgentChat, "second message text"))
            .unwrap();

        assert_eq!(db.records().count().unwrap(), 2);
        let all = db.records().all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "r1");
    }
}
