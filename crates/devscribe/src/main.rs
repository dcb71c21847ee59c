use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::OnceCell;

use devscribe_core::{Classifier, RecordKind, Speaker};
use devscribe_db::Database;
use devscribe_logging::LogFormat;

mod commands;
mod config;
mod observe;
mod tail;

use commands::SearchParams;
use config::ProjectConfig;

#[derive(Parser, Debug)]
#[command(
    name = "devscribe",
    about = "Passive dialogue recorder and search for interactive coding sessions",
    version,
    author
)]
struct Cli {
    /// Record store path (default: platform data dir)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Tracing level filter
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format (overrides devscribe.toml)
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormatChoice>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Observe a text stream and record classified dialogue
    Observe {
        /// Label mixed into the generated session id
        #[arg(short, long, default_value = "observe")]
        label: String,

        /// Tail a growing file instead of reading stdin
        #[arg(long)]
        follow: Option<PathBuf>,
    },

    /// Search recorded dialogue with relevance ranking
    Search {
        /// Keyword substring (case-insensitive; omit to match everything)
        keyword: Option<String>,

        /// Only records on or after this date (YYYY-MM-DD)
        #[arg(long)]
        after: Option<String>,

        /// Only records on or before this date (YYYY-MM-DD)
        #[arg(long)]
        before: Option<String>,

        /// Filter by speaker
        #[arg(long, value_enum)]
        speaker: Option<SpeakerChoice>,

        /// Filter by record kind
        #[arg(long, value_enum)]
        kind: Option<KindChoice>,

        /// Filter file-change records by file extension
        #[arg(long)]
        ext: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List observed sessions, most recent first
    Sessions {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show all records of one session
    Show {
        /// Session ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show aggregate statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export every record as JSONL
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SpeakerChoice {
    User,
    AgentBuilder,
    AgentChat,
}

impl From<SpeakerChoice> for Speaker {
    fn from(choice: SpeakerChoice) -> Self {
        match choice {
            SpeakerChoice::User => Speaker::User,
            SpeakerChoice::AgentBuilder => Speaker::AgentBuilder,
            SpeakerChoice::AgentChat => Speaker::AgentChat,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindChoice {
    Dialogue,
    FileChange,
    Undo,
    Redo,
}

impl From<KindChoice> for RecordKind {
    fn from(choice: KindChoice) -> Self {
        match choice {
            KindChoice::Dialogue => RecordKind::Dialogue,
            KindChoice::FileChange => RecordKind::FileChange,
            KindChoice::Undo => RecordKind::Undo,
            KindChoice::Redo => RecordKind::Redo,
        }
    }
}

/// Process-wide store handle, opened lazily exactly once. Callers that
/// arrive during the first open await it instead of racing a second one.
static DATABASE: OnceCell<Database> = OnceCell::const_new();

async fn database(path: Option<PathBuf>) -> Result<&'static Database> {
    DATABASE
        .get_or_try_init(|| async move {
            match path {
                Some(path) => Database::open_at(&path),
                None => Database::open(),
            }
        })
        .await
        .context("Failed to open record store")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let config = ProjectConfig::load(&working_dir)?.unwrap_or_default();

    let format: LogFormat = match cli.log_format {
        Some(choice) => choice.into(),
        None => config
            .log_format
            .as_deref()
            .map(|s| s.parse::<LogFormat>())
            .transpose()
            .map_err(|e| anyhow::anyhow!(e))?
            .unwrap_or_default(),
    };

    // The guard keeps the file appender alive for the process lifetime.
    let _log_guard = match config.log_dir.as_deref() {
        Some(dir) => Some(devscribe_logging::init_tracing_with_file(
            &cli.log_level,
            format,
            dir,
        )),
        None => {
            devscribe_logging::init_tracing(&cli.log_level, format);
            None
        }
    };

    let db = database(cli.db.clone().or_else(|| config.db_path.clone())).await?;

    match cli.command {
        Command::Observe { label, follow } => {
            let classifier = Classifier::with_config(config.classifier_config());
            observe::run(db, classifier, format, label, follow).await
        }
        Command::Search {
            keyword,
            after,
            before,
            speaker,
            kind,
            ext,
            json,
        } => commands::handle_search(
            db,
            SearchParams {
                keyword,
                after,
                before,
                speaker: speaker.map(Into::into),
                kind: kind.map(Into::into),
                extension: ext,
                json,
            },
        ),
        Command::Sessions { json } => commands::handle_sessions(db, json),
        Command::Show { id, json } => commands::handle_show(db, &id, json),
        Command::Stats { json } => commands::handle_stats(db, json),
        Command::Export { output } => commands::handle_export(db, output),
    }
}
