use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::record::{Record, RecordBody, Speaker};

/// Identity of one observer run, threaded explicitly into every
/// classification call. A new context is created per run; the session id it
/// carries is stable for the context's lifetime, so two concurrent observers
/// never cross-talk.
#[derive(Debug, Clone)]
pub struct ObserveContext {
    session_id: String,
}

impl ObserveContext {
    /// Create a context with a freshly generated session id. The id is the
    /// current UTC timestamp plus a short hash over the label and a random
    /// nonce, so ids stay unique even for same-second runs.
    pub fn new(label: &str) -> Self {
        let timestamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();

        let mut hasher = Sha256::new();
        hasher.update(label.as_bytes());
        hasher.update(Uuid::new_v4().as_bytes());
        let hash = hex::encode(hasher.finalize());
        let short_hash = &hash[..6];

        Self {
            session_id: format!("{}_{}", timestamp, short_hash),
        }
    }

    /// Adopt an existing session id (useful for testing).
    pub fn with_session_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Stamp a classified candidate into a full record: fresh unique id,
    /// this context's session id, classification time.
    pub fn stamp(&self, speaker: Speaker, body: RecordBody) -> Record {
        Record {
            id: Uuid::new_v4().to_string(),
            session_id: self.session_id.clone(),
            timestamp: Utc::now(),
            speaker,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_are_unique() {
        let a = ObserveContext::new("test");
        let b = ObserveContext::new("test");
        assert_ne!(a.session_id(), b.session_id());
    }

    #[test]
    fn test_stamp_assigns_distinct_ids() {
        let ctx = ObserveContext::with_session_id("session-1");
        let r1 = ctx.stamp(Speaker::User, RecordBody::dialogue("how do I do this?"));
        let r2 = ctx.stamp(Speaker::User, RecordBody::dialogue("how do I do this?"));

        assert_ne!(r1.id, r2.id);
        assert_eq!(r1.session_id, r2.session_id);
        assert_eq!(r1.text(), r2.text());
        assert_eq!(r1.speaker, r2.speaker);
    }
}
