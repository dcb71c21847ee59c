use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use devscribe_core::{Record, Speaker};

/// Summary for list views. Derived on demand; never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub record_count: usize,
    pub first_timestamp: DateTime<Utc>,
    pub last_timestamp: DateTime<Utc>,
    /// Distinct speakers observed, in order of first appearance.
    pub speakers: Vec<Speaker>,
}

/// Full session contents plus a formatted duration.
#[derive(Debug, Clone, Serialize)]
pub struct SessionDetail {
    pub session_id: String,
    /// Largest applicable unit breakdown, e.g. "2h 14m", "3m 42s", "17s".
    pub duration: String,
    /// Records ascending by timestamp.
    pub records: Vec<Record>,
}

/// Aggregate statistics over the whole store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_sessions: usize,
    pub total_records: usize,
    pub records_over_time: Vec<DayCount>,
    pub by_speaker: Vec<SpeakerCount>,
}

/// Records count for a single day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayCount {
    pub date: String,
    pub count: usize,
}

/// Records count for one speaker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakerCount {
    pub speaker: Speaker,
    pub count: usize,
}
