//! Read-side subcommands: search, session listing, detail, stats, export.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use colored::Colorize;

use devscribe_core::{Record, RecordKind, Speaker};
use devscribe_db::Database;
use devscribe_search::{SearchQuery, SearchResult, Searcher};
use devscribe_sessions::{format_duration, SessionIndex, SessionStats, SessionSummary};

pub struct SearchParams {
    pub keyword: Option<String>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub speaker: Option<Speaker>,
    pub kind: Option<RecordKind>,
    pub extension: Option<String>,
    pub json: bool,
}

pub fn handle_search(db: &Database, params: SearchParams) -> Result<()> {
    let query = SearchQuery {
        keyword: params.keyword,
        start_time: parse_day(params.after.as_deref(), false)?,
        end_time: parse_day(params.before.as_deref(), true)?,
        speaker: params.speaker,
        kind: params.kind,
        file_extension: params.extension,
    };

    let results = Searcher::new(db).search(&query)?;

    if params.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        println!("{}", "No matching records.".dimmed());
    } else {
        print_results(&results);
    }

    Ok(())
}

pub fn handle_sessions(db: &Database, json: bool) -> Result<()> {
    let summaries = SessionIndex::new(db).session_summaries()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else if summaries.is_empty() {
        println!("{}", "No sessions found.".dimmed());
    } else {
        print_sessions_table(&summaries);
    }

    Ok(())
}

pub fn handle_show(db: &Database, id: &str, json: bool) -> Result<()> {
    let detail = SessionIndex::new(db).session_detail(id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    println!("{}", "=== Session Detail ===".bright_blue().bold());
    println!("{}  {}", "ID:".dimmed(), detail.session_id);
    println!("{}  {}", "Records:".dimmed(), detail.records.len());
    println!("{}  {}", "Duration:".dimmed(), detail.duration);
    println!();

    for record in &detail.records {
        let preview: String = record.text().chars().take(100).collect();
        println!(
            "  {} {} {}",
            record.timestamp.format("%H:%M:%S").to_string().dimmed(),
            format!("[{}]", record.speaker).bright_cyan(),
            preview
        );
    }

    Ok(())
}

pub fn handle_stats(db: &Database, json: bool) -> Result<()> {
    let stats = SessionIndex::new(db).stats()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_stats(&stats);
    }

    Ok(())
}

pub fn handle_export(db: &Database, output: Option<PathBuf>) -> Result<()> {
    let records: Vec<Record> = Searcher::new(db).fetch_all()?;

    match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            for record in &records {
                writeln!(writer, "{}", serde_json::to_string(record)?)?;
            }
            writer.flush()?;
            println!("Exported {} records to {}", records.len(), path.display());
        }
        None => {
            for record in &records {
                println!("{}", serde_json::to_string(record)?);
            }
        }
    }

    Ok(())
}

fn parse_day(value: Option<&str>, end_of_day: bool) -> Result<Option<DateTime<Utc>>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(|d| {
                    let time = if end_of_day {
                        d.and_hms_opt(23, 59, 59).unwrap()
                    } else {
                        d.and_hms_opt(0, 0, 0).unwrap()
                    };
                    Utc.from_utc_datetime(&time)
                })
                .map_err(|e| anyhow::anyhow!("Invalid date '{}': {}", s, e))
        })
        .transpose()
}

fn speaker_colored(speaker: Speaker) -> String {
    match speaker {
        Speaker::User => speaker.as_str().bright_green().to_string(),
        Speaker::AgentBuilder => speaker.as_str().bright_yellow().to_string(),
        Speaker::AgentChat => speaker.as_str().bright_cyan().to_string(),
    }
}

fn print_results(results: &[SearchResult]) {
    println!(
        "{:<6} {:<17} {:<14} {:<12} {}",
        "SCORE".dimmed(),
        "TIMESTAMP".dimmed(),
        "SPEAKER".dimmed(),
        "KIND".dimmed(),
        "TEXT".dimmed(),
    );

    for result in results {
        let ts = result.record.timestamp.format("%Y-%m-%d %H:%M").to_string();
        let preview: String = result.record.text().chars().take(50).collect();
        println!(
            "{:<6.2} {:<17} {:<14} {:<12} {}",
            result.relevance,
            ts,
            speaker_colored(result.record.speaker),
            result.record.kind(),
            preview
        );
        for excerpt in &result.excerpts {
            println!("       {} {}", "…".dimmed(), excerpt.dimmed());
        }
    }
}

fn print_sessions_table(summaries: &[SessionSummary]) {
    println!(
        "{:<24} {:<8} {:<17} {:<10} {}",
        "SESSION".dimmed(),
        "RECORDS".dimmed(),
        "STARTED".dimmed(),
        "DURATION".dimmed(),
        "SPEAKERS".dimmed(),
    );

    for s in summaries {
        let started = s.first_timestamp.format("%Y-%m-%d %H:%M").to_string();
        let duration = format_duration((s.last_timestamp - s.first_timestamp).num_seconds());
        let speakers: Vec<&str> = s.speakers.iter().map(|sp| sp.as_str()).collect();

        println!(
            "{:<24} {:<8} {:<17} {:<10} {}",
            s.session_id,
            s.record_count,
            started,
            duration,
            speakers.join(", ")
        );
    }
}

fn print_stats(stats: &SessionStats) {
    println!("{}", "=== Record Statistics ===".bright_blue().bold());
    println!("{}  {}", "Total Sessions:".dimmed(), stats.total_sessions);
    println!("{}  {}", "Total Records:".dimmed(), stats.total_records);

    if !stats.by_speaker.is_empty() {
        println!();
        println!("{}", "By Speaker:".dimmed());
        for s in &stats.by_speaker {
            println!("  {:<16} {}", speaker_colored(s.speaker), s.count);
        }
    }

    if !stats.records_over_time.is_empty() {
        println!();
        println!("{}", "Per Day:".dimmed());
        for d in &stats.records_over_time {
            println!("  {:<12} {}", d.date, d.count);
        }
    }
}
