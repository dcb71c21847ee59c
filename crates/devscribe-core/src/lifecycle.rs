use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::record::Speaker;

/// Where a breakpoint sits: a file location or a function name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BreakpointSite {
    Line { file: PathBuf, line: u32 },
    Function { function: String },
}

impl fmt::Display for BreakpointSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakpointSite::Line { file, line } => write!(f, "{}:{}", file.display(), line),
            BreakpointSite::Function { function } => f.write_str(function),
        }
    }
}

/// Structured host events. These never pass through the text pipeline; each
/// maps to a fixed speaker and message template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    DebugSessionStarted { name: String },
    DebugSessionEnded { name: String },
    TerminalOpened { name: String },
    TerminalClosed { name: String },
    BreakpointAdded { site: BreakpointSite },
    BreakpointRemoved { site: BreakpointSite },
}

impl LifecycleEvent {
    /// Debugger and breakpoint activity is attributed to the user; terminal
    /// lifecycle to the builder agent that drives it.
    pub fn speaker(&self) -> Speaker {
        match self {
            LifecycleEvent::DebugSessionStarted { .. }
            | LifecycleEvent::DebugSessionEnded { .. }
            | LifecycleEvent::BreakpointAdded { .. }
            | LifecycleEvent::BreakpointRemoved { .. } => Speaker::User,
            LifecycleEvent::TerminalOpened { .. } | LifecycleEvent::TerminalClosed { .. } => {
                Speaker::AgentBuilder
            }
        }
    }

    pub fn message(&self) -> String {
        match self {
            LifecycleEvent::DebugSessionStarted { name } => {
                format!("debug session started: {}", name)
            }
            LifecycleEvent::DebugSessionEnded { name } => {
                format!("debug session ended: {}", name)
            }
            LifecycleEvent::TerminalOpened { name } => format!("terminal created: {}", name),
            LifecycleEvent::TerminalClosed { name } => format!("terminal closed: {}", name),
            LifecycleEvent::BreakpointAdded { site } => format!("breakpoint set: {}", site),
            LifecycleEvent::BreakpointRemoved { site } => format!("breakpoint removed: {}", site),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use crate::context::ObserveContext;

    #[test]
    fn test_terminal_open_template() {
        let event = LifecycleEvent::TerminalOpened {
            name: "zsh".to_string(),
        };
        assert_eq!(event.speaker(), Speaker::AgentBuilder);
        assert_eq!(event.message(), "terminal created: zsh");
    }

    #[test]
    fn test_breakpoint_template() {
        let event = LifecycleEvent::BreakpointAdded {
            site: BreakpointSite::Line {
                file: PathBuf::from("src/main.rs"),
                line: 42,
            },
        };
        assert_eq!(event.speaker(), Speaker::User);
        assert_eq!(event.message(), "breakpoint set: src/main.rs:42");
    }

    #[test]
    fn test_function_breakpoint_template() {
        let event = LifecycleEvent::BreakpointRemoved {
            site: BreakpointSite::Function {
                function: "main".to_string(),
            },
        };
        assert_eq!(event.message(), "breakpoint removed: main");
    }

    #[test]
    fn test_events_bypass_text_pipeline() {
        // "terminal" is a noise keyword, yet the event is always recorded.
        let classifier = Classifier::new();
        let ctx = ObserveContext::with_session_id("session-a");
        let event = LifecycleEvent::TerminalOpened {
            name: "build".to_string(),
        };
        let record = classifier.record_event(&ctx, &event);
        assert_eq!(record.speaker, Speaker::AgentBuilder);
        assert_eq!(record.text(), "terminal created: build");
    }
}
