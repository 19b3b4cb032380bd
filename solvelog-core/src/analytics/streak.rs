//! Chronological streak and gap scanning.
//!
//! Every function here expects its input already sorted ascending by
//! instant (for example [`Corpus::chronological`](crate::ingest::Corpus::chronological)
//! or a filtered view of it). The scanners never re-sort; unsorted input is
//! a caller bug and trips a debug assertion.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::calendar::{day_diff, Calendar};
use crate::types::Submission;

/// A run of consecutive calendar days with activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Streak {
    pub length: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Streak {
    fn single(day: NaiveDate) -> Self {
        Self {
            length: 1,
            start_date: day,
            end_date: day,
        }
    }

    /// Extend with the next active day.
    ///
    /// `dayDiff == 0` keeps the run, `1` extends it, anything else restarts.
    fn advance(self, day: NaiveDate) -> Self {
        match day_diff(self.end_date, day) {
            0 => self,
            1 => Self {
                length: self.length + 1,
                end_date: day,
                ..self
            },
            _ => Self::single(day),
        }
    }
}

/// One end of a gap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GapAnchor {
    pub id: u64,
    pub slug: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&Submission> for GapAnchor {
    fn from(sub: &Submission) -> Self {
        Self {
            id: sub.id,
            slug: sub.slug.clone(),
            timestamp: sub.timestamp,
        }
    }
}

/// The longest quiet period between two adjacent submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gap {
    /// Wall-clock length in seconds
    pub duration_secs: i64,
    /// Whole days (floor)
    pub days: i64,
    pub before: GapAnchor,
    pub after: GapAnchor,
}

fn check_sorted(prev: &mut Option<DateTime<Utc>>, ts: DateTime<Utc>) {
    debug_assert!(
        prev.map_or(true, |p| p <= ts),
        "streak scanner input must be sorted ascending"
    );
    *prev = Some(ts);
}

/// Longest run of consecutive active calendar days.
///
/// Ties keep the earlier run. `None` for empty input.
pub fn compute_streak<'a, I>(sorted: I, cal: &Calendar) -> Option<Streak>
where
    I: IntoIterator<Item = &'a Submission>,
{
    let mut best: Option<Streak> = None;
    let mut run: Option<Streak> = None;
    let mut prev = None;

    for sub in sorted {
        check_sorted(&mut prev, sub.timestamp);
        let day = cal.date_of(sub.timestamp);
        let next = match run {
            Some(r) => r.advance(day),
            None => Streak::single(day),
        };
        if best.map_or(true, |b| next.length > b.length) {
            best = Some(next);
        }
        run = Some(next);
    }

    best
}

/// Length of the run that ends today or yesterday, 0 otherwise.
pub fn current_streak<'a, I>(sorted: I, cal: &Calendar, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = &'a Submission>,
{
    let mut run: Option<Streak> = None;
    let mut prev = None;

    for sub in sorted {
        check_sorted(&mut prev, sub.timestamp);
        let day = cal.date_of(sub.timestamp);
        run = Some(match run {
            Some(r) => r.advance(day),
            None => Streak::single(day),
        });
    }

    match run {
        Some(r) if (0..=1).contains(&day_diff(r.end_date, today)) => r.length,
        _ => 0,
    }
}

/// Largest wall-clock gap between chronologically adjacent submissions.
///
/// Ties keep the earlier gap. `None` with fewer than two submissions.
pub fn compute_longest_gap<'a, I>(sorted: I) -> Option<Gap>
where
    I: IntoIterator<Item = &'a Submission>,
{
    let mut best: Option<(i64, &Submission, &Submission)> = None;
    let mut previous: Option<&Submission> = None;
    let mut prev = None;

    for sub in sorted {
        check_sorted(&mut prev, sub.timestamp);
        if let Some(before) = previous {
            let secs = (sub.timestamp - before.timestamp).num_seconds();
            if best.map_or(true, |(longest, _, _)| secs > longest) {
                best = Some((secs, before, sub));
            }
        }
        previous = Some(sub);
    }

    best.map(|(secs, before, after)| Gap {
        duration_secs: secs,
        days: secs.div_euclid(86_400),
        before: before.into(),
        after: after.into(),
    })
}
