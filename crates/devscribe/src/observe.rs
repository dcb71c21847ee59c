//! Observe mode: feed raw lines and lifecycle events into the classifier.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::AsyncBufReadExt;

use devscribe_core::{Classifier, LifecycleEvent, ObserveContext};
use devscribe_db::Database;
use devscribe_logging::{LogFormat, ObserveEvent, ObserveLogger};

use crate::tail::LineFollower;

/// Prefix that carries a typed lifecycle event instead of a raw text line.
const EVENT_PREFIX: &str = "@event ";

/// How often the loop wakes up to check for Ctrl+C while idle.
const INTERRUPT_POLL: Duration = Duration::from_millis(200);

struct ObserveRun<'a> {
    db: &'a Database,
    classifier: Classifier,
    ctx: ObserveContext,
    logger: ObserveLogger,
    recorded: usize,
    discarded: usize,
}

impl ObserveRun<'_> {
    /// One line in, at most one record out. Store failures are logged and
    /// the line is treated as if never seen; nothing here is fatal.
    fn handle_line(&mut self, raw: &str) {
        if let Some(event_json) = raw.trim().strip_prefix(EVENT_PREFIX) {
            match serde_json::from_str::<LifecycleEvent>(event_json) {
                Ok(event) => {
                    let record = self.classifier.record_event(&self.ctx, &event);
                    let speaker = record.speaker.as_str().to_string();
                    let message = record.text().to_string();
                    if self.append(record) {
                        self.logger
                            .log(&ObserveEvent::EventRecorded { speaker, message });
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Ignoring malformed lifecycle event");
                    self.discarded += 1;
                }
            }
            return;
        }

        match self.classifier.classify(&self.ctx, raw) {
            Some(record) => {
                let speaker = record.speaker.as_str().to_string();
                let preview: String = record.text().chars().take(60).collect();
                if self.append(record) {
                    self.logger
                        .log(&ObserveEvent::LineRecorded { speaker, preview });
                }
            }
            None => self.discarded += 1,
        }
    }

    fn append(&mut self, record: devscribe_core::Record) -> bool {
        match self.db.records().append(&record) {
            Ok(()) => {
                self.recorded += 1;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to append record");
                self.logger.log(&ObserveEvent::StoreFailed {
                    error: e.to_string(),
                });
                self.discarded += 1;
                false
            }
        }
    }
}

pub async fn run(
    db: &Database,
    classifier: Classifier,
    format: LogFormat,
    label: String,
    follow: Option<PathBuf>,
) -> Result<()> {
    let ctx = ObserveContext::new(&label);
    let logger = ObserveLogger::new(format);

    let source = follow
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdin".to_string());
    logger.log(&ObserveEvent::ObserveStarted {
        session_id: ctx.session_id().to_string(),
        source,
    });

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupt_handle = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupt_handle.store(true, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    let mut run = ObserveRun {
        db,
        classifier,
        ctx,
        logger,
        recorded: 0,
        discarded: 0,
    };

    match follow {
        Some(path) => {
            let mut follower = LineFollower::new(&path)?;
            while !interrupted.load(Ordering::SeqCst) {
                tokio::select! {
                    line = follower.next_line() => match line {
                        Some(line) => run.handle_line(&line),
                        None => break,
                    },
                    _ = tokio::time::sleep(INTERRUPT_POLL) => {}
                }
            }
        }
        None => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut lines = stdin.lines();
            while !interrupted.load(Ordering::SeqCst) {
                tokio::select! {
                    line = lines.next_line() => match line.context("Failed to read stdin")? {
                        Some(line) => run.handle_line(&line),
                        None => break,
                    },
                    _ = tokio::time::sleep(INTERRUPT_POLL) => {}
                }
            }
        }
    }

    run.logger.log(&ObserveEvent::ObserveStopped {
        session_id: run.ctx.session_id().to_string(),
        recorded: run.recorded,
        discarded: run.discarded,
    });

    Ok(())
}
