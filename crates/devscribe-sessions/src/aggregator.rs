use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use devscribe_core::Speaker;
use devscribe_db::{Database, StoreError};

use crate::types::{DayCount, SessionDetail, SessionStats, SessionSummary, SpeakerCount};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Read-only derivation of per-session views over the record store.
pub struct SessionIndex<'a> {
    db: &'a Database,
}

impl<'a> SessionIndex<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Distinct session ids, ordered by each session's most recent record
    /// timestamp, descending.
    pub fn list_sessions(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.db.records().session_ids()?)
    }

    /// One summary per session, in the same order as [`Self::list_sessions`].
    pub fn session_summaries(&self) -> Result<Vec<SessionSummary>, SessionError> {
        let mut summaries = Vec::new();
        for session_id in self.list_sessions()? {
            let records = self.db.records().by_session(&session_id)?;
            if records.is_empty() {
                continue;
            }

            let mut speakers: Vec<Speaker> = Vec::new();
            for record in &records {
                if !speakers.contains(&record.speaker) {
                    speakers.push(record.speaker);
                }
            }

            summaries.push(SessionSummary {
                session_id,
                record_count: records.len(),
                first_timestamp: records[0].timestamp,
                last_timestamp: records[records.len() - 1].timestamp,
                speakers,
            });
        }

        Ok(summaries)
    }

    /// Full record list for one session, ascending by timestamp. A session
    /// with zero records is an explicit error, distinguishable from a valid
    /// zero-duration session.
    pub fn session_detail(&self, session_id: &str) -> Result<SessionDetail, SessionError> {
        let records = self.db.records().by_session(session_id)?;
        if records.is_empty() {
            return Err(SessionError::NotFound(session_id.to_string()));
        }

        let elapsed = records[records.len() - 1].timestamp - records[0].timestamp;
        let duration = format_duration(elapsed.num_seconds());

        Ok(SessionDetail {
            session_id: session_id.to_string(),
            duration,
            records,
        })
    }

    /// Aggregate statistics over every session in the store.
    pub fn stats(&self) -> Result<SessionStats, SessionError> {
        let records = self.db.records().all()?;
        let total_records = records.len();

        let mut day_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut speaker_counts: HashMap<Speaker, usize> = HashMap::new();
        for record in &records {
            let date = record.timestamp.format("%Y-%m-%d").to_string();
            *day_counts.entry(date).or_insert(0) += 1;
            *speaker_counts.entry(record.speaker).or_insert(0) += 1;
        }

        let records_over_time: Vec<DayCount> = day_counts
            .into_iter()
            .map(|(date, count)| DayCount { date, count })
            .collect();

        let mut by_speaker: Vec<SpeakerCount> = speaker_counts
            .into_iter()
            .map(|(speaker, count)| SpeakerCount { speaker, count })
            .collect();
        by_speaker.sort_by(|a, b| b.count.cmp(&a.count).then(a.speaker.as_str().cmp(b.speaker.as_str())));

        Ok(SessionStats {
            total_sessions: self.list_sessions()?.len(),
            total_records,
            records_over_time,
            by_speaker,
        })
    }
}

/// Largest applicable unit breakdown: hours+minutes, minutes+seconds, or
/// bare seconds.
pub fn format_duration(total_secs: i64) -> String {
    let total_secs = total_secs.max(0);
    if total_secs >= 3600 {
        format!("{}h {}m", total_secs / 3600, (total_secs % 3600) / 60)
    } else if total_secs >= 60 {
        format!("{}m {}s", total_secs / 60, total_secs % 60)
    } else {
        format!("{}s", total_secs)
    }
}
