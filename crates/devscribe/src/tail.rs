//! Tail a growing file and emit whole appended lines.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// Watches one file for appended content. Lines already present when the
/// follower is created are skipped; only new output is observed.
pub struct LineFollower {
    rx: mpsc::UnboundedReceiver<String>,
    _watcher: RecommendedWatcher,
}

impl LineFollower {
    pub fn new(path: &Path) -> Result<Self> {
        let mut file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        file.seek(SeekFrom::End(0))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let mut pending = String::new();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(_) => return,
            };
            if !matches!(event.kind, EventKind::Modify(_)) {
                return;
            }

            let mut appended = String::new();
            if file.read_to_string(&mut appended).is_err() {
                return;
            }
            pending.push_str(&appended);

            while let Some(idx) = pending.find('\n') {
                let line = pending[..idx].trim_end_matches('\r').to_string();
                pending.drain(..=idx);
                let _ = tx.send(line);
            }
        })?;

        watcher.watch(path, RecursiveMode::NonRecursive)?;

        Ok(Self {
            rx,
            _watcher: watcher,
        })
    }

    /// Next appended line, or `None` once the channel is closed.
    pub async fn next_line(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}
