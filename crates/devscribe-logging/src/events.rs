use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Structured events emitted while observing a stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ObserveEvent {
    ObserveStarted {
        session_id: String,
        source: String,
    },
    LineRecorded {
        speaker: String,
        preview: String,
    },
    EventRecorded {
        speaker: String,
        message: String,
    },
    StoreFailed {
        error: String,
    },
    ObserveStopped {
        session_id: String,
        recorded: usize,
        discarded: usize,
    },
}

impl ObserveEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Writes observe-mode milestones to stderr in the configured format.
pub struct ObserveLogger {
    format: LogFormat,
}

impl ObserveLogger {
    pub fn new(format: LogFormat) -> Self {
        Self { format }
    }

    pub fn log(&self, event: &ObserveEvent) {
        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &ObserveEvent) {
        let _ = writeln!(std::io::stderr(), "{}", event.with_timestamp());
    }

    fn log_pretty(&self, event: &ObserveEvent) {
        let mut stderr = std::io::stderr();
        match event {
            ObserveEvent::ObserveStarted { session_id, source } => {
                let _ = writeln!(
                    stderr,
                    "{} observing {} (session {})",
                    "▶".bright_blue(),
                    source.bold(),
                    session_id.dimmed()
                );
            }
            ObserveEvent::LineRecorded { speaker, preview } => {
                let _ = writeln!(
                    stderr,
                    "  {} [{}] {}",
                    "✓".bright_green(),
                    speaker.bright_cyan(),
                    preview.dimmed()
                );
            }
            ObserveEvent::EventRecorded { speaker, message } => {
                let _ = writeln!(
                    stderr,
                    "  {} [{}] {}",
                    "◆".bright_magenta(),
                    speaker.bright_cyan(),
                    message.dimmed()
                );
            }
            ObserveEvent::StoreFailed { error } => {
                let _ = writeln!(stderr, "  {} store append failed: {}", "✗".bright_red(), error);
            }
            ObserveEvent::ObserveStopped {
                session_id,
                recorded,
                discarded,
            } => {
                let _ = writeln!(
                    stderr,
                    "{} session {} done: {} recorded, {} discarded",
                    "■".bright_blue(),
                    session_id.dimmed(),
                    recorded.to_string().bright_green(),
                    discarded.to_string().dimmed()
                );
            }
        }
    }

    fn log_compact(&self, event: &ObserveEvent) {
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            ObserveEvent::ObserveStarted { session_id, .. } => {
                format!("[{}] observe:start:{}", timestamp, session_id)
            }
            ObserveEvent::LineRecorded { speaker, .. } => {
                format!("[{}] rec:{}", timestamp, speaker)
            }
            ObserveEvent::EventRecorded { speaker, message } => {
                format!("[{}] evt:{}:{}", timestamp, speaker, message)
            }
            ObserveEvent::StoreFailed { error } => format!("[{}] store:fail:{}", timestamp, error),
            ObserveEvent::ObserveStopped {
                recorded,
                discarded,
                ..
            } => format!("[{}] observe:stop {}/{}", timestamp, recorded, discarded),
        };
        let _ = writeln!(std::io::stderr(), "{}", msg);
    }
}
