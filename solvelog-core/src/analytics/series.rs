//! Time-bucketed and cumulative series.
//!
//! [`compute_cumulative_series`] produces one value per bucket across the
//! whole visible window, zero buckets included, so a chart can draw a
//! continuous axis. Cumulative metrics start from the total accumulated
//! before the window opened.

use std::collections::HashSet;

use serde::Serialize;

use super::calendar::{Calendar, Granularity};
use super::filter::{DifficultyFilter, FilterSpec};
use crate::ingest::Corpus;
use crate::types::{Difficulty, Submission};

/// What a series counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesMetric {
    /// Distinct problems solved so far, per tier
    #[default]
    SolvedCumulative,
    /// Submissions so far, accepted vs failed
    SubmissionsCumulative,
    /// Problems first solved within each bucket, per tier
    Solved,
    /// Submissions within each bucket, accepted vs failed
    Submissions,
}

impl SeriesMetric {
    pub fn is_cumulative(&self) -> bool {
        matches!(
            self,
            SeriesMetric::SolvedCumulative | SeriesMetric::SubmissionsCumulative
        )
    }

    fn counts_solved(&self) -> bool {
        matches!(self, SeriesMetric::SolvedCumulative | SeriesMetric::Solved)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesMetric::SolvedCumulative => "solved_cumulative",
            SeriesMetric::SubmissionsCumulative => "submissions_cumulative",
            SeriesMetric::Solved => "solved",
            SeriesMetric::Submissions => "submissions",
        }
    }
}

impl std::str::FromStr for SeriesMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "solved_cumulative" => Ok(SeriesMetric::SolvedCumulative),
            "submissions_cumulative" => Ok(SeriesMetric::SubmissionsCumulative),
            "solved" => Ok(SeriesMetric::Solved),
            "submissions" => Ok(SeriesMetric::Submissions),
            _ => Err(format!("unknown series metric: {}", s)),
        }
    }
}

/// One labelled line of values, aligned with [`SeriesTable::labels`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedSeries {
    pub name: String,
    pub values: Vec<u64>,
}

/// Chart-ready series output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesTable {
    pub metric: SeriesMetric,
    /// `None` only for an empty table
    pub granularity: Option<Granularity>,
    pub labels: Vec<String>,
    pub series: Vec<NamedSeries>,
}

impl SeriesTable {
    fn empty(metric: SeriesMetric) -> Self {
        Self {
            metric,
            granularity: None,
            labels: Vec::new(),
            series: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&NamedSeries> {
        self.series.iter().find(|s| s.name == name)
    }
}

/// Series lines for a metric under a difficulty filter.
fn series_names(metric: SeriesMetric, difficulty: DifficultyFilter) -> Vec<&'static str> {
    if metric.counts_solved() {
        let mut names: Vec<&'static str> = Difficulty::ALL
            .iter()
            .filter(|d| difficulty.matches(Some(**d)))
            .map(|d| d.label())
            .collect();
        names.push("Total");
        names
    } else {
        vec!["Accepted", "Failed", "Total"]
    }
}

/// Which series lines a submission increments.
///
/// `solved` holds every slug already solved; it is updated here so the
/// first acceptance of each problem counts exactly once.
fn increments<'a>(
    metric: SeriesMetric,
    names: &[&'static str],
    sub: &'a Submission,
    solved: &mut HashSet<&'a str>,
) -> Vec<usize> {
    let position = |name: &str| names.iter().position(|n| *n == name);

    if metric.counts_solved() {
        if !sub.is_accepted() || !solved.insert(sub.slug.as_str()) {
            return Vec::new();
        }
        let mut hit = Vec::with_capacity(2);
        if let Some(tier) = sub.difficulty.and_then(|d| position(d.label())) {
            hit.push(tier);
        }
        hit.extend(position("Total"));
        hit
    } else {
        let outcome = if sub.is_accepted() { "Accepted" } else { "Failed" };
        position(outcome).into_iter().chain(position("Total")).collect()
    }
}

/// Build the bucketed series selected by `filter.metric`.
///
/// Returns an empty table for an all-time window over an empty corpus.
pub fn compute_cumulative_series(corpus: &Corpus, filter: &FilterSpec, cal: &Calendar) -> SeriesTable {
    let metric = filter.metric;
    let Some(range) = filter.bucket_range(corpus, cal) else {
        return SeriesTable::empty(metric);
    };

    let names = series_names(metric, filter.difficulty);
    let buckets = range.len();
    let mut opening = vec![0u64; names.len()];
    let mut deltas = vec![vec![0u64; buckets]; names.len()];
    let mut solved: HashSet<&str> = HashSet::new();

    for sub in corpus.chronological().filter(|s| filter.matches_difficulty(s)) {
        let hits = increments(metric, &names, sub, &mut solved);
        if hits.is_empty() {
            continue;
        }

        let date = cal.date_of(sub.timestamp);
        if !filter.in_window(sub.timestamp) || range.is_before(date) {
            for line in hits {
                opening[line] += 1;
            }
        } else if let Some(bucket) = range.index_of(date) {
            for line in hits {
                deltas[line][bucket] += 1;
            }
        }
    }

    let series = names
        .iter()
        .zip(deltas)
        .zip(opening)
        .map(|((name, per_bucket), start)| {
            let values = if metric.is_cumulative() {
                per_bucket
                    .iter()
                    .scan(start, |running, delta| {
                        *running += delta;
                        Some(*running)
                    })
                    .collect()
            } else {
                per_bucket
            };
            NamedSeries {
                name: (*name).to_string(),
                values,
            }
        })
        .collect();

    tracing::debug!(
        metric = metric.as_str(),
        granularity = range.granularity().as_str(),
        buckets,
        "Computed series"
    );

    SeriesTable {
        metric,
        granularity: Some(range.granularity()),
        labels: range.labels(),
        series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Status;
    use chrono::{DateTime, TimeZone, Utc};

    fn sub(id: u64, slug: &str, ts: DateTime<Utc>, status: Status, d: Option<Difficulty>) -> Submission {
        Submission {
            id,
            slug: slug.to_string(),
            title: slug.to_string(),
            status,
            lang: "go".to_string(),
            timestamp: ts,
            difficulty: d,
            topics: None,
        }
    }

    fn on(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, month, day, 10, 0, 0).unwrap()
    }

    fn corpus() -> Corpus {
        Corpus::from_submissions(vec![
            sub(1, "a", on(1, 5), Status::WrongAnswer, Some(Difficulty::Easy)),
            sub(2, "a", on(1, 5), Status::Accepted, Some(Difficulty::Easy)),
            sub(3, "b", on(6, 2), Status::Accepted, Some(Difficulty::Hard)),
            sub(4, "b", on(6, 4), Status::Accepted, Some(Difficulty::Hard)),
            sub(5, "c", on(6, 4), Status::RuntimeError, None),
            sub(6, "c", on(6, 9), Status::Accepted, None),
        ])
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_window_is_gap_filled() {
        let filter = FilterSpec::trailing(9, now()).with_metric(SeriesMetric::Submissions);
        let table = compute_cumulative_series(&corpus(), &filter, &Calendar::utc());

        assert_eq!(table.granularity, Some(Granularity::Daily));
        assert_eq!(table.labels.len(), 10);
        assert_eq!(table.labels[0], "2024-06-01");
        let total = table.get("Total").unwrap();
        assert_eq!(total.values.len(), table.labels.len());
        assert_eq!(total.values, vec![0, 1, 0, 2, 0, 0, 0, 0, 1, 0]);
        assert_eq!(table.get("Failed").unwrap().values.iter().sum::<u64>(), 1);
    }

    #[test]
    fn test_cumulative_folds_pre_window_history() {
        let filter = FilterSpec::trailing(9, now());
        let table = compute_cumulative_series(&corpus(), &filter, &Calendar::utc());

        let total = table.get("Total").unwrap();
        // "a" was solved in January and opens the window at 1.
        assert_eq!(total.values[0], 1);
        assert_eq!(*total.values.last().unwrap(), 3);
        assert!(total.values.windows(2).all(|w| w[0] <= w[1]));

        assert_eq!(*table.get("Easy").unwrap().values.last().unwrap(), 1);
        // Re-accepting "b" does not count twice.
        assert_eq!(*table.get("Hard").unwrap().values.last().unwrap(), 1);
        // "c" has no difficulty: only in Total.
        assert_eq!(*table.get("Medium").unwrap().values.last().unwrap(), 0);
    }

    #[test]
    fn test_per_bucket_solved_ignores_pre_window_solves() {
        let filter = FilterSpec::trailing(9, now()).with_metric(SeriesMetric::Solved);
        let table = compute_cumulative_series(&corpus(), &filter, &Calendar::utc());
        assert_eq!(table.get("Total").unwrap().values.iter().sum::<u64>(), 2);
    }

    #[test]
    fn test_all_time_monthly_buckets() {
        let filter = FilterSpec::all_time(now()).with_metric(SeriesMetric::SubmissionsCumulative);
        let table = compute_cumulative_series(&corpus(), &filter, &Calendar::utc());

        assert_eq!(table.granularity, Some(Granularity::Monthly));
        assert_eq!(
            table.labels,
            vec!["2024-01", "2024-02", "2024-03", "2024-04", "2024-05", "2024-06"]
        );
        assert_eq!(table.get("Total").unwrap().values, vec![2, 2, 2, 2, 2, 6]);
        assert_eq!(table.get("Accepted").unwrap().values, vec![1, 1, 1, 1, 1, 4]);
    }

    #[test]
    fn test_difficulty_filter_limits_lines() {
        let filter = FilterSpec::all_time(now()).with_difficulty(Difficulty::Hard);
        let table = compute_cumulative_series(&corpus(), &filter, &Calendar::utc());

        let names: Vec<&str> = table.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Hard", "Total"]);
        assert_eq!(*table.get("Total").unwrap().values.last().unwrap(), 1);
    }

    #[test]
    fn test_empty_corpus() {
        let empty = Corpus::empty();
        let all_time = compute_cumulative_series(&empty, &FilterSpec::all_time(now()), &Calendar::utc());
        assert!(all_time.is_empty());
        assert!(all_time.series.is_empty());

        let trailing = compute_cumulative_series(&empty, &FilterSpec::trailing(6, now()), &Calendar::utc());
        assert_eq!(trailing.labels.len(), 7);
        assert!(trailing.series.iter().all(|s| s.values.iter().all(|v| *v == 0)));
    }
}
