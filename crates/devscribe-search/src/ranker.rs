use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use devscribe_core::{Record, RecordKind, Speaker};
use devscribe_db::{Database, StoreError};

use crate::excerpt;

/// Neutral score for keyword-less structured queries, so they still produce
/// a stable order.
const NEUTRAL_SCORE: f64 = 0.5;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Free-text keyword plus structured filters, conjunctively combined. All
/// fields optional; an empty query matches everything.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub keyword: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub speaker: Option<Speaker>,
    pub kind: Option<RecordKind>,
    pub file_extension: Option<String>,
}

/// A record with its relevance and the excerpt around each keyword hit.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub record: Record,
    pub relevance: f64,
    pub excerpts: Vec<String>,
}

/// Read-side ranking over the record store.
pub struct Searcher<'a> {
    db: &'a Database,
}

impl<'a> Searcher<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Run a query: narrow by keyword and time bounds at the store, apply
    /// the remaining filters in memory, score, and order. A store failure
    /// propagates as-is; there are no partial results and no retry here.
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SearchError> {
        if let (Some(start), Some(end)) = (query.start_time, query.end_time) {
            if start > end {
                return Err(SearchError::InvalidQuery(format!(
                    "start_time {} is after end_time {}",
                    start, end
                )));
            }
        }

        let keyword = query
            .keyword
            .as_deref()
            .filter(|k| !k.is_empty());

        let narrowed =
            self.db
                .records()
                .query(keyword, query.start_time, query.end_time)?;

        let mut results = Vec::new();
        for record in narrowed {
            if !matches_filters(&record, query) {
                continue;
            }

            let (relevance, excerpts) = match keyword {
                None => (NEUTRAL_SCORE, Vec::new()),
                Some(kw) => {
                    let positions = excerpt::find_occurrences(record.text(), kw);
                    if positions.is_empty() {
                        // Keyword-driven search never returns zero-occurrence
                        // records.
                        continue;
                    }
                    (
                        score_keyword(record.text(), &positions),
                        excerpt::excerpts(record.text(), kw, &positions),
                    )
                }
            };

            results.push(SearchResult {
                record,
                relevance,
                excerpts,
            });
        }

        // Stable sort: equal scores keep the store's newest-first order.
        results.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(Ordering::Equal)
        });

        Ok(results)
    }

    /// Unfiltered fetch of every record, oldest first (export feed).
    pub fn fetch_all(&self) -> Result<Vec<Record>, SearchError> {
        Ok(self.db.records().all()?)
    }
}

/// `min(1, 0.3 + occurrences*0.2 + position*0.5)` where position rewards an
/// early first match.
fn score_keyword(text: &str, positions: &[usize]) -> f64 {
    let char_len = text.chars().count();
    if char_len == 0 || positions.is_empty() {
        return 0.0;
    }

    let occurrence_score = positions.len() as f64 * 0.2;
    let position_score = (1.0 - positions[0] as f64 / char_len as f64).max(0.0);

    (0.3 + occurrence_score + position_score * 0.5).min(1.0)
}

fn matches_filters(record: &Record, query: &SearchQuery) -> bool {
    if let Some(speaker) = query.speaker {
        if record.speaker != speaker {
            return false;
        }
    }

    if let Some(kind) = query.kind {
        if record.kind() != kind {
            return false;
        }
    }

    if let Some(ref ext) = query.file_extension {
        let want = ext.trim_start_matches('.');
        let found = record
            .body
            .file_path()
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str());
        match found {
            Some(have) if have.eq_ignore_ascii_case(want) => {}
            _ => return false,
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excerpt::find_occurrences;

    fn score(text: &str, keyword: &str) -> f64 {
        score_keyword(text, &find_occurrences(text, keyword))
    }

    #[test]
    fn test_score_single_match_at_start_caps_at_one() {
        // 0.3 + 1*0.2 + 0.5*1.0 = 1.0
        let text = format!("项目{}", "x".repeat(48));
        assert!((score(&text, "项目") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_two_late_matches() {
        // 50 chars, first occurrence at 40: 0.3 + 2*0.2 + 0.5*(1-0.8) = 0.8
        let text = format!("{}项目创建项目创建", "x".repeat(40));
        assert_eq!(text.chars().count(), 48);
        let text = format!("{}yz", text);
        assert_eq!(text.chars().count(), 50);
        let positions = find_occurrences(&text, "项目");
        assert_eq!(positions, vec![40, 44]);
        assert!((score_keyword(&text, &positions) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_early_single_beats_late_double() {
        let early = format!("项目{}", "x".repeat(48));
        let late = format!("{}项目创建项目创建yz", "x".repeat(40));
        assert!(score(&early, "项目") > score(&late, "项目"));
    }

    #[test]
    fn test_more_occurrences_near_start_score_higher() {
        // Equal-length texts, both starting with the keyword; the one with a
        // second occurrence ranks strictly higher until the cap.
        let one = format!("cache {}", "x".repeat(44));
        let two = format!("cache cache {}", "x".repeat(38));
        assert_eq!(one.chars().count(), two.chars().count());
        let s_one = score(&one, "cache");
        let s_two = score(&two, "cache");
        assert!(s_two >= s_one);
        assert!((s_two - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_occurrences_scores_zero() {
        assert_eq!(score("nothing relevant here", "cache"), 0.0);
    }
}
