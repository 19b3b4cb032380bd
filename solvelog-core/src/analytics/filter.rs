//! Filter parameters shared by the windowed computations.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use super::calendar::{day_diff, BucketRange, Calendar, Granularity};
use super::series::SeriesMetric;
use crate::ingest::Corpus;
use crate::types::{Difficulty, Submission};

/// Which part of the history is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    AllTime,
    /// The last `days` days, anchored at [`FilterSpec::now`]
    Trailing { days: u32 },
}

/// Difficulty constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DifficultyFilter {
    #[default]
    All,
    Only(Difficulty),
}

impl DifficultyFilter {
    /// Submissions without a known difficulty only pass `All`.
    pub fn matches(&self, difficulty: Option<Difficulty>) -> bool {
        match self {
            DifficultyFilter::All => true,
            DifficultyFilter::Only(wanted) => difficulty == Some(*wanted),
        }
    }
}

/// Filter and view selection for one computation.
///
/// `now` is an explicit input so every computation stays pure.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub window: TimeWindow,
    pub difficulty: DifficultyFilter,
    /// Fixed bucket width; `None` picks one from the span
    pub granularity: Option<Granularity>,
    pub metric: SeriesMetric,
    pub now: DateTime<Utc>,
}

impl FilterSpec {
    pub fn all_time(now: DateTime<Utc>) -> Self {
        Self {
            window: TimeWindow::AllTime,
            difficulty: DifficultyFilter::All,
            granularity: None,
            metric: SeriesMetric::default(),
            now,
        }
    }

    pub fn trailing(days: u32, now: DateTime<Utc>) -> Self {
        Self {
            window: TimeWindow::Trailing { days },
            ..Self::all_time(now)
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = DifficultyFilter::Only(difficulty);
        self
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = Some(granularity);
        self
    }

    pub fn with_metric(mut self, metric: SeriesMetric) -> Self {
        self.metric = metric;
        self
    }

    /// First visible instant, `None` for all-time.
    ///
    /// A trailing window reaching past the earliest representable instant
    /// covers everything and behaves as all-time.
    pub fn window_start(&self) -> Option<DateTime<Utc>> {
        match self.window {
            TimeWindow::AllTime => None,
            TimeWindow::Trailing { days } => self
                .now
                .checked_sub_signed(Duration::days(i64::from(days))),
        }
    }

    pub fn in_window(&self, ts: DateTime<Utc>) -> bool {
        self.window_start().map_or(true, |start| ts >= start)
    }

    pub fn matches_difficulty(&self, sub: &Submission) -> bool {
        self.difficulty.matches(sub.difficulty)
    }

    /// Passes both the window and the difficulty constraint.
    pub fn includes(&self, sub: &Submission) -> bool {
        self.in_window(sub.timestamp) && self.matches_difficulty(sub)
    }

    /// First and last visible calendar dates.
    ///
    /// `None` for an all-time window over an empty corpus.
    pub fn date_span(&self, corpus: &Corpus, cal: &Calendar) -> Option<(NaiveDate, NaiveDate)> {
        let end = cal.date_of(self.now);
        let start = match self.window_start() {
            Some(start) => cal.date_of(start),
            None => cal.date_of(corpus.chronological().next()?.timestamp),
        };
        Some((start.min(end), end))
    }

    /// The complete bucket sequence for this window.
    pub fn bucket_range(&self, corpus: &Corpus, cal: &Calendar) -> Option<BucketRange> {
        let (start, end) = self.date_span(corpus, cal)?;
        let granularity = self
            .granularity
            .unwrap_or_else(|| Granularity::auto(day_diff(start, end)));
        Some(BucketRange::new(granularity, start, end))
    }
}
