//! Records store: flat row mapping for the tagged record body.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::fmt;
use std::path::PathBuf;
use std::sync::MutexGuard;

use devscribe_core::{ChangeKind, Record, RecordBody, RecordKind, Speaker};

use crate::StoreError;

const RECORD_COLUMNS: &str =
    "id, session_id, timestamp, speaker, kind, text, file_path, change_kind, \
     before_text, after_text, detail";

/// Records store with a borrowed connection.
pub struct Records<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl<'db> Records<'db> {
    /// Create a new Records store with a borrowed connection.
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    /// Append one record. Appends are independent single-statement inserts,
    /// so concurrent callers interleave without partial rows.
    pub fn append(&self, record: &Record) -> Result<(), StoreError> {
        let (file_path, change_kind, before_text, after_text, detail) = match &record.body {
            RecordBody::Dialogue { .. } => (None, None, None, None, None),
            RecordBody::FileChange {
                file_path,
                change_kind,
                before_text,
                after_text,
                ..
            } => (
                Some(file_path.to_string_lossy().to_string()),
                Some(change_kind.as_str()),
                before_text.clone(),
                after_text.clone(),
                None,
            ),
            RecordBody::Undo { detail, .. } | RecordBody::Redo { detail, .. } => {
                (None, None, None, None, detail.clone())
            }
        };

        self.conn.execute(
            r#"
            INSERT INTO records (
                id, session_id, timestamp, speaker, kind, text,
                file_path, change_kind, before_text, after_text, detail
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                record.id,
                record.session_id,
                record.timestamp.to_rfc3339(),
                record.speaker.as_str(),
                record.kind().as_str(),
                record.text(),
                file_path,
                change_kind,
                before_text,
                after_text,
                detail,
            ],
        )?;

        Ok(())
    }

    /// Narrow by keyword substring and inclusive time bounds. This is the
    /// only store-level filter; everything else is applied in memory by the
    /// ranker. Results come back newest first.
    pub fn query(
        &self,
        keyword: Option<&str>,
        after: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    ) -> Result<Vec<Record>, StoreError> {
        let mut sql = format!("SELECT {} FROM records WHERE 1=1", RECORD_COLUMNS);
        let mut param_values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(keyword) = keyword {
            if !keyword.is_empty() {
                sql.push_str(" AND text LIKE ?");
                param_values.push(Box::new(format!("%{}%", keyword)));
            }
        }

        if let Some(after) = after {
            sql.push_str(" AND timestamp >= ?");
            param_values.push(Box::new(after.to_rfc3339()));
        }

        if let Some(before) = before {
            sql.push_str(" AND timestamp <= ?");
            param_values.push(Box::new(before.to_rfc3339()));
        }

        sql.push_str(" ORDER BY timestamp DESC");

        let params: Vec<&dyn rusqlite::ToSql> = param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params.as_slice(), Self::row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }

        Ok(records)
    }

    /// All records of one session, ascending by timestamp.
    pub fn by_session(&self, session_id: &str) -> Result<Vec<Record>, StoreError> {
        let sql = format!(
            "SELECT {} FROM records WHERE session_id = ?1 ORDER BY timestamp ASC",
            RECORD_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![session_id], Self::row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }

        Ok(records)
    }

    /// Distinct session ids, ordered by each session's most recent record.
    pub fn session_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT session_id FROM records GROUP BY session_id ORDER BY MAX(timestamp) DESC",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }

        Ok(ids)
    }

    /// Every record in the store, ascending by timestamp (export feed).
    pub fn all(&self) -> Result<Vec<Record>, StoreError> {
        let sql = format!("SELECT {} FROM records ORDER BY timestamp ASC", RECORD_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }

        Ok(records)
    }

    /// Total number of records.
    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn row_to_record(row: &rusqlite::Row) -> Result<Record, rusqlite::Error> {
        let timestamp_str: String = row.get(2)?;
        let speaker_str: String = row.get(3)?;
        let kind_str: String = row.get(4)?;
        let text: String = row.get(5)?;

        let speaker = Speaker::parse(&speaker_str)
            .ok_or_else(|| bad_column(3, format!("unknown speaker: {}", speaker_str)))?;
        let kind = RecordKind::parse(&kind_str)
            .ok_or_else(|| bad_column(4, format!("unknown kind: {}", kind_str)))?;

        let body = match kind {
            RecordKind::Dialogue => RecordBody::Dialogue { text },
            RecordKind::FileChange => {
                let file_path: Option<String> = row.get(6)?;
                let change_kind_str: Option<String> = row.get(7)?;
                let file_path = file_path
                    .ok_or_else(|| bad_column(6, "file_change row without file_path".into()))?;
                let change_kind = change_kind_str
                    .as_deref()
                    .and_then(ChangeKind::parse)
                    .ok_or_else(|| bad_column(7, "file_change row without change_kind".into()))?;
                RecordBody::FileChange {
                    text,
                    file_path: PathBuf::from(file_path),
                    change_kind,
                    before_text: row.get(8)?,
                    after_text: row.get(9)?,
                }
            }
            RecordKind::Undo => RecordBody::Undo {
                text,
                detail: row.get(10)?,
            },
            RecordKind::Redo => RecordBody::Redo {
                text,
                detail: row.get(10)?,
            },
        };

        Ok(Record {
            id: row.get(0)?,
            session_id: row.get(1)?,
            timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            speaker,
            body,
        })
    }
}

#[derive(Debug)]
struct BadColumn(String);

impl fmt::Display for BadColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for BadColumn {}

fn bad_column(index: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        index,
        rusqlite::types::Type::Text,
        Box::new(BadColumn(message)),
    )
}
