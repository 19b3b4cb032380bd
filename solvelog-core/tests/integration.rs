//! Integration tests for the solvelog ingestion and analytics pipeline
//!
//! These tests use fixture files in `tests/fixtures/` to verify the
//! end-to-end flow from a raw event file to every derived view.

use chrono::{DateTime, TimeZone, Utc};
use solvelog_core::analytics::{
    compute_cumulative_series, compute_dashboard, compute_entity_rollup, compute_milestones,
    compute_skill_matrix, compute_streaks_and_records, compute_superlatives, compute_totals,
    outcome_breakdown, Calendar, FilterSpec, Granularity, GroupBy, MilestoneCounter, Ratio,
    RecordKind, ResultCache, SeriesMetric, TrophyKind,
};
use solvelog_core::ingest::{
    load_catalog, load_raw_submissions, Corpus, JsonFileSource, MemoryStore, Normalizer,
    RejectReason, SnapshotStore, SyncCoordinator,
};
use solvelog_core::present::{rollup_chart, rollup_table, trophy_table, RollupMetric};
use solvelog_core::{Difficulty, Status};
use std::path::PathBuf;

/// Get the path to a fixture file
fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap()
}

/// Normalize the fixture with the metadata catalog applied
fn fixture_corpus() -> Corpus {
    let raw = load_raw_submissions(&fixture_path("submissions.json")).expect("fixture should load");
    let catalog = load_catalog(&fixture_path("catalog.json")).expect("catalog should load");
    Normalizer::with_catalog(catalog).normalize(raw).corpus
}

// ============================================
// Normalization
// ============================================

#[test]
fn test_normalize_fixture() {
    solvelog_core::logging::init_test();
    let raw = load_raw_submissions(&fixture_path("submissions.json")).unwrap();
    assert_eq!(raw.len(), 16);

    let outcome = solvelog_core::normalize(raw);

    assert_eq!(outcome.corpus.len(), 12);
    assert_eq!(outcome.duplicates, 1);
    assert_eq!(outcome.unknown_statuses, 1);
    assert_eq!(outcome.rejected.len(), 3);
    assert!(outcome
        .rejected
        .iter()
        .any(|r| r.id == Some(113) && matches!(r.reason, RejectReason::UnparsableTimestamp(_))));
    assert!(outcome
        .rejected
        .iter()
        .any(|r| r.id == Some(114) && r.reason == RejectReason::MissingSlug));
    // Null timestamp: rejected on its own, the rest of the file still loads.
    assert!(outcome.rejected.iter().any(|r| {
        r.id == Some(115) && r.index == 15 && matches!(r.reason, RejectReason::Malformed(_))
    }));
    assert_eq!(outcome.corpus.max_id(), Some(112));
}

#[test]
fn test_attempt_sequences_are_chronological() {
    let corpus = fixture_corpus();

    // Accepted submission 107 arrived before 104-106 but happened last.
    let median = corpus.problem("median-of-two-sorted-arrays").unwrap();
    let ids: Vec<u64> = corpus.attempts(median).map(|s| s.id).collect();
    assert_eq!(ids, vec![104, 105, 106, 107]);

    let slugs: Vec<&str> = corpus.problems().iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(
        slugs,
        vec![
            "two-sum",
            "median-of-two-sorted-arrays",
            "add-two-numbers",
            "valid-parentheses",
            "trapping-rain-water",
        ]
    );

    let rebuilt = Corpus::from_submissions(corpus.submissions().to_vec());
    assert!(rebuilt.content_eq(&corpus));
}

#[test]
fn test_catalog_fills_missing_metadata_only() {
    let corpus = fixture_corpus();

    // Inline "easy" wins over the catalog's "medium".
    assert_eq!(corpus.problem("two-sum").unwrap().difficulty, Some(Difficulty::Easy));
    assert_eq!(
        corpus.problem("add-two-numbers").unwrap().difficulty,
        Some(Difficulty::Medium)
    );
    assert_eq!(
        corpus.problem("trapping-rain-water").unwrap().topics.as_ref().map(Vec::len),
        Some(3)
    );
}

// ============================================
// Analytics
// ============================================

#[test]
fn test_language_rollup() {
    let corpus = fixture_corpus();
    let rollup = compute_entity_rollup(
        &corpus,
        GroupBy::Language,
        &FilterSpec::all_time(now()),
        &Calendar::utc(),
    );

    let python = &rollup.per_key["python3"];
    assert_eq!((python.attempted, python.solved), (2, 2));
    assert_eq!(python.avg_attempts, Ratio::Defined(1.5));
    assert_eq!(python.first_ace_rate, Ratio::Defined(50.0));

    let cpp = &rollup.per_key["cpp"];
    assert_eq!(cpp.avg_attempts, Ratio::Defined(4.0));
    assert_eq!(cpp.first_ace_rate, Ratio::Defined(0.0));

    let rust = &rollup.per_key["rust"];
    assert_eq!((rust.attempted, rust.solved, rust.submissions), (2, 1, 5));

    let table = rollup_table(&rollup);
    assert_eq!(table.rows[0][0], "rust");

    let chart = rollup_chart(&rollup, RollupMetric::FirstAceRate);
    assert_eq!(chart.series.len(), 3);
    assert!(chart.series.iter().all(|s| s.points.len() == chart.labels.len()));
}

#[test]
fn test_topic_rollup_and_skill_matrix() {
    let corpus = fixture_corpus();
    let filter = FilterSpec::all_time(now());

    let rollup = compute_entity_rollup(&corpus, GroupBy::Topic, &filter, &Calendar::utc());
    let array = &rollup.per_key["Array"];
    // two-sum, median, trapping-rain-water
    assert_eq!(array.attempted, 3);
    assert_eq!(array.solved, 2);

    let matrix = compute_skill_matrix(&corpus, &filter);
    let array_row = matrix.row("Array").unwrap();
    assert_eq!(array_row.cell(Difficulty::Hard).attempted, 2);
    assert_eq!(array_row.cell(Difficulty::Hard).solved, 1);
    assert_eq!(array_row.cell(Difficulty::Easy).solved, 1);
}

#[test]
fn test_cumulative_series() {
    let corpus = fixture_corpus();
    let table = compute_cumulative_series(&corpus, &FilterSpec::all_time(now()), &Calendar::utc());

    assert_eq!(table.granularity, Some(Granularity::Daily));
    assert_eq!(table.labels.len(), 31);
    let total = table.get("Total").unwrap();
    assert_eq!(total.values.len(), 31);
    assert!(total.values.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*total.values.last().unwrap(), 4);

    // A one-week window still opens at the running total.
    let week = FilterSpec::trailing(7, now()).with_metric(SeriesMetric::SubmissionsCumulative);
    let windowed = compute_cumulative_series(&corpus, &week, &Calendar::utc());
    assert_eq!(windowed.get("Total").unwrap().values[0], 12);
}

#[test]
fn test_records() {
    let corpus = fixture_corpus();
    let records = compute_streaks_and_records(&corpus, &Calendar::utc());

    assert_eq!(records.get(RecordKind::LongestSubmissionStreak).unwrap().value, 3);
    let gap = records.get(RecordKind::LongestBreak).unwrap();
    assert_eq!(gap.value, 14);
    assert_eq!(gap.detail.as_deref(), Some("valid-parentheses → trapping-rain-water"));
}

#[test]
fn test_trophies() {
    let corpus = fixture_corpus();
    let trophies = compute_superlatives(&corpus);

    let before_solve = trophies.get(TrophyKind::MostAttemptsBeforeSolve).unwrap();
    assert!(before_solve.achieved);
    assert_eq!(
        before_solve.holder.as_ref().map(|h| h.slug.as_str()),
        Some("median-of-two-sorted-arrays")
    );

    let never = trophies.get(TrophyKind::MostAttemptsNeverSolved).unwrap();
    assert!(never.achieved);
    assert_eq!(never.holder.as_ref().map(|h| h.value), Some(3));

    let stubborn = trophies.get(TrophyKind::StubbornEasy).unwrap();
    assert!(!stubborn.achieved);
    assert_eq!(stubborn.holder.as_ref().map(|h| h.slug.as_str()), Some("two-sum"));

    let first = trophies.get(TrophyKind::FirstAccepted).unwrap();
    assert_eq!(first.holder.as_ref().map(|h| h.slug.as_str()), Some("two-sum"));

    let longest = trophies.get(TrophyKind::LongestTimeToSolve).unwrap();
    assert_eq!(longest.holder.as_ref().map(|h| h.value), Some(63 * 3600));

    assert_eq!(trophy_table(&trophies).rows.len(), TrophyKind::ALL.len());
}

#[test]
fn test_milestones() {
    let corpus = fixture_corpus();
    let milestones = compute_milestones(&corpus);

    let submissions: Vec<u64> = milestones
        .for_counter(MilestoneCounter::Submissions)
        .map(|m| m.submission_id)
        .collect();
    assert_eq!(submissions, vec![101, 110]);

    let hard: Vec<&str> = milestones
        .for_counter(MilestoneCounter::SolvedHard)
        .map(|m| m.slug.as_str())
        .collect();
    assert_eq!(hard, vec!["median-of-two-sorted-arrays"]);
}

#[test]
fn test_totals_and_outcomes() {
    let corpus = fixture_corpus();
    let filter = FilterSpec::all_time(now());

    let totals = compute_totals(&corpus, &filter);
    assert_eq!(totals.submissions, 12);
    assert_eq!(totals.accepted, 4);
    assert_eq!((totals.attempted, totals.solved), (5, 4));
    assert_eq!(totals.tier(Difficulty::Hard).attempted, 2);

    let outcomes = outcome_breakdown(&corpus, &filter);
    assert_eq!(outcomes[0].status, Status::Accepted);
    assert!(outcomes.iter().any(|o| o.status == Status::Unknown(99)));

    let dashboard = compute_dashboard(&corpus, &FilterSpec::all_time(now()), &Calendar::utc());
    assert_eq!(dashboard.longest_streak, 3);
    assert_eq!(dashboard.current_streak, 0);
}

#[test]
fn test_result_cache_follows_corpus_version() {
    let corpus = fixture_corpus();
    let filter = FilterSpec::all_time(now());
    let mut cache = ResultCache::new();

    let solved = cache.get_or_compute(&corpus, &filter, |c, f| compute_totals(c, f).solved);
    assert_eq!(*solved, 4);
    assert!(cache.is_fresh(&corpus, &filter));
    assert!(!cache.is_fresh(&corpus, &filter.clone().with_difficulty(Difficulty::Easy)));
}

// ============================================
// Sync
// ============================================

#[test]
fn test_sync_from_json_file() {
    let source = JsonFileSource::new(fixture_path("submissions.json"));
    let mut coordinator = SyncCoordinator::new(source, MemoryStore::default());

    let first = coordinator.sync().expect("first sync should succeed");
    assert_eq!(first.fetched, 16);
    assert_eq!(first.added, 12);
    assert_eq!(first.rejected.len(), 3);
    assert_eq!(first.cursor, Some(115));
    assert_eq!(coordinator.store().load_submissions().unwrap().len(), 12);

    let second = coordinator.sync().expect("second sync should succeed");
    assert_eq!(second.added, 0);
    assert_eq!(second.corpus.len(), 12);
}
