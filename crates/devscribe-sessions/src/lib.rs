pub mod aggregator;
pub mod types;

pub use aggregator::{format_duration, SessionError, SessionIndex};
pub use types::{DayCount, SessionDetail, SessionStats, SessionSummary, SpeakerCount};
