use chrono::{TimeZone, Utc};

use devscribe_core::{ChangeKind, Record, RecordBody, RecordKind, Speaker};
use devscribe_db::Database;
use devscribe_search::{SearchError, SearchQuery, Searcher};

/// Helper: build a populated in-memory store.
fn seed_db() -> Database {
    let db = Database::open_in_memory().unwrap();

    let rows = [
        ("r1", "s1", 0, Speaker::User, "怎么创建一个新的项目呢请告诉我"),
        ("r2", "s1", 1, Speaker::AgentBuilder, "我来帮您创建一个新的项目结构"),
        ("r3", "s1", 2, Speaker::AgentChat, "the cache layer stores recent results"),
        ("r4", "s2", 3, Speaker::User, "why is the cache empty after restart?"),
    ];
    for (id, session, minute, speaker, text) in rows {
        db.records()
            .append(&Record {
                id: id.to_string(),
                session_id: session.to_string(),
                timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 9, minute, 0).unwrap(),
                speaker,
                body: RecordBody::dialogue(text),
            })
            .unwrap();
    }

    db.records()
        .append(&Record {
            id: "r5".to_string(),
            session_id: "s2".to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 9, 4, 0).unwrap(),
            speaker: Speaker::AgentBuilder,
            body: RecordBody::FileChange {
                text: "modified src/cache.rs".to_string(),
                file_path: "src/cache.rs".into(),
                change_kind: ChangeKind::Modified,
                before_text: None,
                after_text: None,
            },
        })
        .unwrap();

    db
}

#[test]
fn test_keyword_search_ranks_by_relevance() {
    let db = Database::open_in_memory().unwrap();

    // Record A: one occurrence at position 0 of a 50-char text.
    let a_text = format!("项目{}", "x".repeat(48));
    // Record B: two occurrences, the first at position 40 of a 50-char text.
    let b_text = format!("{}项目创建项目创建yz", "x".repeat(40));
    assert_eq!(a_text.chars().count(), 50);
    assert_eq!(b_text.chars().count(), 50);

    for (id, text) in [("a", &a_text), ("b", &b_text)] {
        db.records()
            .append(&Record {
                id: id.to_string(),
                session_id: "s1".to_string(),
                timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap(),
                speaker: Speaker::AgentChat,
                body: RecordBody::dialogue(text.clone()),
            })
            .unwrap();
    }

    let searcher = Searcher::new(&db);
    let results = searcher
        .search(&SearchQuery {
            keyword: Some("项目".to_string()),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].record.id, "a");
    assert!((results[0].relevance - 1.0).abs() < 1e-9);
    assert_eq!(results[1].record.id, "b");
    assert!((results[1].relevance - 0.8).abs() < 1e-9);
}

#[test]
fn test_two_early_beats_one_late_for_equal_length() {
    let db = Database::open_in_memory().unwrap();
    let two_near_start = format!("cache cache {}", "x".repeat(38));
    let one_near_end = format!("{}cache", "x".repeat(45));
    assert_eq!(two_near_start.chars().count(), one_near_end.chars().count());

    for (id, text) in [("early", &two_near_start), ("late", &one_near_end)] {
        db.records()
            .append(&Record {
                id: id.to_string(),
                session_id: "s1".to_string(),
                timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap(),
                speaker: Speaker::AgentChat,
                body: RecordBody::dialogue(text.clone()),
            })
            .unwrap();
    }

    let results = Searcher::new(&db)
        .search(&SearchQuery {
            keyword: Some("cache".to_string()),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(results[0].record.id, "early");
    assert!(results[0].relevance > results[1].relevance);
}

#[test]
fn test_empty_keyword_scores_neutral_and_orders_newest_first() {
    let db = seed_db();
    let results = Searcher::new(&db).search(&SearchQuery::default()).unwrap();

    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| r.relevance == 0.5));
    assert!(results.iter().all(|r| r.excerpts.is_empty()));
    // Deterministic tie-break: newest first.
    assert_eq!(results[0].record.id, "r5");
    assert_eq!(results[4].record.id, "r1");
}

#[test]
fn test_keyword_excludes_non_matching_records() {
    let db = seed_db();
    let results = Searcher::new(&db)
        .search(&SearchQuery {
            keyword: Some("cache".to_string()),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.relevance > 0.0));
    assert!(results
        .iter()
        .all(|r| r.record.text().to_lowercase().contains("cache")));
}

#[test]
fn test_filters_are_conjunctive() {
    let db = seed_db();

    let results = Searcher::new(&db)
        .search(&SearchQuery {
            keyword: Some("cache".to_string()),
            speaker: Some(Speaker::User),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].record.id, "r4");

    let results = Searcher::new(&db)
        .search(&SearchQuery {
            kind: Some(RecordKind::FileChange),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].record.id, "r5");
}

#[test]
fn test_file_extension_filter() {
    let db = seed_db();

    let results = Searcher::new(&db)
        .search(&SearchQuery {
            file_extension: Some(".rs".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].record.id, "r5");

    let results = Searcher::new(&db)
        .search(&SearchQuery {
            file_extension: Some("toml".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_time_bounds_are_inclusive() {
    let db = seed_db();

    let results = Searcher::new(&db)
        .search(&SearchQuery {
            start_time: Some(Utc.with_ymd_and_hms(2026, 3, 14, 9, 1, 0).unwrap()),
            end_time: Some(Utc.with_ymd_and_hms(2026, 3, 14, 9, 3, 0).unwrap()),
            ..Default::default()
        })
        .unwrap();

    let ids: Vec<&str> = results.iter().map(|r| r.record.id.as_str()).collect();
    assert_eq!(ids, vec!["r4", "r3", "r2"]);
}

#[test]
fn test_malformed_bounds_rejected() {
    let db = seed_db();
    let result = Searcher::new(&db).search(&SearchQuery {
        start_time: Some(Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap()),
        end_time: Some(Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap()),
        ..Default::default()
    });

    assert!(matches!(result, Err(SearchError::InvalidQuery(_))));
}

#[test]
fn test_excerpts_surround_every_occurrence() {
    let db = Database::open_in_memory().unwrap();
    let text = format!(
        "cache warmup begins, {} and finally the cache settles",
        "z".repeat(40)
    );
    db.records()
        .append(&Record {
            id: "r1".to_string(),
            session_id: "s1".to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap(),
            speaker: Speaker::AgentChat,
            body: RecordBody::dialogue(text),
        })
        .unwrap();

    let results = Searcher::new(&db)
        .search(&SearchQuery {
            keyword: Some("cache".to_string()),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(results.len(), 1);
    let excerpts = &results[0].excerpts;
    assert_eq!(excerpts.len(), 2);
    assert!(excerpts[0].starts_with("cache warmup"));
    assert!(excerpts[1].contains("the cache settles"));
}

#[test]
fn test_fetch_all_for_export() {
    let db = seed_db();
    let all = Searcher::new(&db).fetch_all().unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all[0].id, "r1");
}
