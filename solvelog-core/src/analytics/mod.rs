//! Aggregation engine for solvelog
//!
//! Every computation here is a pure function of a [`Corpus`](crate::ingest::Corpus),
//! an optional [`FilterSpec`] and a [`Calendar`]. Nothing is cached between
//! calls; callers that want memoization hold a [`ResultCache`].
//!
//! - [`series`] - gap-filled per-bucket and cumulative series
//! - [`rollup`] - per-language / per-topic / per-difficulty metrics and the skill matrix
//! - [`records`] - streaks, the longest break, busiest days
//! - [`trophies`] - superlatives with unlock thresholds
//! - [`milestones`] - round-number counter crossings
//! - [`totals`] and [`dashboard`] - headline numbers for the summary view
//!
//! Shared building blocks live in [`calendar`] (day truncation, bucketing),
//! [`streak`] (the one streak/gap scanner) and [`ratio`] (division-safe rates).

pub mod cache;
pub mod calendar;
pub mod dashboard;
pub mod filter;
pub mod milestones;
pub mod ratio;
pub mod records;
pub mod rollup;
pub mod series;
pub mod streak;
pub mod totals;
pub mod trophies;

pub use cache::ResultCache;
pub use calendar::{BucketRange, Calendar, Granularity};
pub use dashboard::{compute_dashboard, DashboardStats};
pub use filter::{DifficultyFilter, FilterSpec, TimeWindow};
pub use milestones::{compute_milestones, Milestone, MilestoneCounter, MilestoneList};
pub use ratio::Ratio;
pub use records::{compute_streaks_and_records, Record, RecordKind, RecordList};
pub use rollup::{
    compute_entity_rollup, compute_skill_matrix, EntityMetrics, GroupBy, Rollup, SkillMatrix,
    TimeSeriesPoint,
};
pub use series::{compute_cumulative_series, NamedSeries, SeriesMetric, SeriesTable};
pub use streak::{compute_longest_gap, compute_streak, current_streak, Gap, Streak};
pub use totals::{compute_totals, outcome_breakdown, OutcomeCount, Totals};
pub use trophies::{compute_superlatives, Trophy, TrophyKind, TrophyList};
