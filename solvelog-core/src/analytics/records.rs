//! Personal records: streaks, the longest break and the busiest days.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use super::calendar::Calendar;
use super::streak::{compute_longest_gap, compute_streak};
use crate::ingest::Corpus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    LongestSubmissionStreak,
    LongestAcceptedStreak,
    LongestBreak,
    MostSubmissionsInDay,
    MostSolvedInDay,
}

impl RecordKind {
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::LongestSubmissionStreak => "Longest streak",
            RecordKind::LongestAcceptedStreak => "Longest accepted streak",
            RecordKind::LongestBreak => "Longest break",
            RecordKind::MostSubmissionsInDay => "Most submissions in a day",
            RecordKind::MostSolvedInDay => "Most problems solved in a day",
        }
    }

    /// Unit of [`Record::value`].
    pub fn unit(&self) -> &'static str {
        match self {
            RecordKind::LongestSubmissionStreak
            | RecordKind::LongestAcceptedStreak
            | RecordKind::LongestBreak => "days",
            RecordKind::MostSubmissionsInDay => "submissions",
            RecordKind::MostSolvedInDay => "problems",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub kind: RecordKind,
    pub value: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Extra context, e.g. the problems bounding a break
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordList {
    pub records: Vec<Record>,
}

impl RecordList {
    pub fn get(&self, kind: RecordKind) -> Option<&Record> {
        self.records.iter().find(|r| r.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Busiest date in a per-day count map; ties keep the earlier date.
fn busiest_day(counts: &BTreeMap<NaiveDate, u64>) -> Option<(NaiveDate, u64)> {
    counts.iter().fold(None, |best, (&day, &count)| match best {
        Some((_, top)) if top >= count => best,
        _ => Some((day, count)),
    })
}

/// Compute every record over the whole corpus.
///
/// Records with no data (no accepts, fewer than two submissions) are
/// omitted rather than reported as zero.
pub fn compute_streaks_and_records(corpus: &Corpus, cal: &Calendar) -> RecordList {
    let mut records = Vec::new();

    if let Some(streak) = compute_streak(corpus.chronological(), cal) {
        records.push(Record {
            kind: RecordKind::LongestSubmissionStreak,
            value: u64::from(streak.length),
            start_date: streak.start_date,
            end_date: streak.end_date,
            detail: None,
        });
    }

    if let Some(streak) = compute_streak(corpus.chronological().filter(|s| s.is_accepted()), cal) {
        records.push(Record {
            kind: RecordKind::LongestAcceptedStreak,
            value: u64::from(streak.length),
            start_date: streak.start_date,
            end_date: streak.end_date,
            detail: None,
        });
    }

    if let Some(gap) = compute_longest_gap(corpus.chronological()) {
        records.push(Record {
            kind: RecordKind::LongestBreak,
            value: gap.days.max(0) as u64,
            start_date: cal.date_of(gap.before.timestamp),
            end_date: cal.date_of(gap.after.timestamp),
            detail: Some(format!("{} → {}", gap.before.slug, gap.after.slug)),
        });
    }

    let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    let mut solved_per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    let mut solved: HashSet<&str> = HashSet::new();
    for sub in corpus.chronological() {
        let day = cal.date_of(sub.timestamp);
        *per_day.entry(day).or_default() += 1;
        if sub.is_accepted() && solved.insert(sub.slug.as_str()) {
            *solved_per_day.entry(day).or_default() += 1;
        }
    }

    for (kind, counts) in [
        (RecordKind::MostSubmissionsInDay, &per_day),
        (RecordKind::MostSolvedInDay, &solved_per_day),
    ] {
        if let Some((day, count)) = busiest_day(counts) {
            records.push(Record {
                kind,
                value: count,
                start_date: day,
                end_date: day,
                detail: None,
            });
        }
    }

    RecordList { records }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Status;
    use crate::types::Submission;
    use chrono::{Duration, TimeZone, Utc};

    fn sub(id: u64, slug: &str, day: i64, hour: i64, status: Status) -> Submission {
        Submission {
            id,
            slug: slug.to_string(),
            title: slug.to_string(),
            status,
            lang: "rust".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()
                + Duration::days(day)
                + Duration::hours(hour),
            difficulty: None,
            topics: None,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, day).unwrap()
    }

    #[test]
    fn test_records() {
        let corpus = Corpus::from_submissions(vec![
            sub(1, "a", 0, 9, Status::WrongAnswer),
            sub(2, "a", 0, 10, Status::Accepted),
            sub(3, "b", 1, 9, Status::Accepted),
            sub(4, "c", 1, 10, Status::Accepted),
            sub(5, "c", 2, 9, Status::WrongAnswer),
            sub(6, "d", 8, 9, Status::WrongAnswer),
            sub(7, "d", 8, 10, Status::WrongAnswer),
            sub(8, "d", 8, 11, Status::WrongAnswer),
        ]);
        let records = compute_streaks_and_records(&corpus, &Calendar::utc());

        let streak = records.get(RecordKind::LongestSubmissionStreak).unwrap();
        assert_eq!(streak.value, 3);
        assert_eq!((streak.start_date, streak.end_date), (date(1), date(3)));

        assert_eq!(records.get(RecordKind::LongestAcceptedStreak).unwrap().value, 2);

        let gap = records.get(RecordKind::LongestBreak).unwrap();
        assert_eq!(gap.value, 6);
        assert_eq!(gap.detail.as_deref(), Some("c → d"));

        let busiest = records.get(RecordKind::MostSubmissionsInDay).unwrap();
        assert_eq!(busiest.value, 3);
        assert_eq!(busiest.start_date, date(9));

        let solved = records.get(RecordKind::MostSolvedInDay).unwrap();
        assert_eq!(solved.value, 2);
        assert_eq!(solved.start_date, date(2));
    }

    #[test]
    fn test_no_accepts_omits_accept_records() {
        let corpus = Corpus::from_submissions(vec![sub(1, "a", 0, 9, Status::WrongAnswer)]);
        let records = compute_streaks_and_records(&corpus, &Calendar::utc());

        assert!(records.get(RecordKind::LongestAcceptedStreak).is_none());
        assert!(records.get(RecordKind::MostSolvedInDay).is_none());
        assert!(records.get(RecordKind::LongestBreak).is_none());
        assert_eq!(records.get(RecordKind::LongestSubmissionStreak).unwrap().value, 1);
    }

    #[test]
    fn test_empty_corpus() {
        assert!(compute_streaks_and_records(&Corpus::empty(), &Calendar::utc()).is_empty());
    }
}
