use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Who produced a recorded fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    AgentBuilder,
    AgentChat,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::AgentBuilder => "agent_builder",
            Speaker::AgentChat => "agent_chat",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Speaker::User),
            "agent_builder" => Some(Speaker::AgentBuilder),
            "agent_chat" => Some(Speaker::AgentChat),
            _ => None,
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to a file in a file-change record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
    Renamed,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Created => "created",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Renamed => "renamed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(ChangeKind::Created),
            "modified" => Some(ChangeKind::Modified),
            "deleted" => Some(ChangeKind::Deleted),
            "renamed" => Some(ChangeKind::Renamed),
            _ => None,
        }
    }
}

/// Category tag, used by query filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Dialogue,
    FileChange,
    Undo,
    Redo,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Dialogue => "dialogue",
            RecordKind::FileChange => "file_change",
            RecordKind::Undo => "undo",
            RecordKind::Redo => "redo",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dialogue" => Some(RecordKind::Dialogue),
            "file_change" => Some(RecordKind::FileChange),
            "undo" => Some(RecordKind::Undo),
            "redo" => Some(RecordKind::Redo),
            _ => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific payload. One variant per kind, so a dialogue record cannot
/// carry file-change fields and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordBody {
    Dialogue {
        text: String,
    },
    FileChange {
        text: String,
        file_path: PathBuf,
        change_kind: ChangeKind,
        before_text: Option<String>,
        after_text: Option<String>,
    },
    Undo {
        text: String,
        detail: Option<String>,
    },
    Redo {
        text: String,
        detail: Option<String>,
    },
}

impl RecordBody {
    pub fn dialogue(text: impl Into<String>) -> Self {
        RecordBody::Dialogue { text: text.into() }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            RecordBody::Dialogue { .. } => RecordKind::Dialogue,
            RecordBody::FileChange { .. } => RecordKind::FileChange,
            RecordBody::Undo { .. } => RecordKind::Undo,
            RecordBody::Redo { .. } => RecordKind::Redo,
        }
    }

    /// The searchable content of the record, present for every kind.
    pub fn text(&self) -> &str {
        match self {
            RecordBody::Dialogue { text }
            | RecordBody::FileChange { text, .. }
            | RecordBody::Undo { text, .. }
            | RecordBody::Redo { text, .. } => text,
        }
    }

    pub fn file_path(&self) -> Option<&PathBuf> {
        match self {
            RecordBody::FileChange { file_path, .. } => Some(file_path),
            _ => None,
        }
    }
}

/// A classified record. Immutable once appended to the store; "editing" means
/// appending a new record under the same session id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub speaker: Speaker,
    #[serde(flatten)]
    pub body: RecordBody,
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        self.body.kind()
    }

    pub fn text(&self) -> &str {
        self.body.text()
    }
}
