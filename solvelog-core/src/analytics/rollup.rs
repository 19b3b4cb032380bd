//! Per-key rollups: language, topic and difficulty breakdowns.
//!
//! A submission belongs to exactly one language group and one difficulty
//! group, but to every topic group it is tagged with. Submissions without
//! a difficulty are left out of difficulty rollups; submissions without
//! topics are left out of topic rollups and of the skill matrix.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use super::calendar::{Calendar, Granularity};
use super::filter::FilterSpec;
use super::ratio::Ratio;
use crate::ingest::Corpus;
use crate::types::{Difficulty, Submission};

/// Language key used when a submission carries no language tag.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

// ============================================
// Grouping
// ============================================

/// Rollup dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Language,
    Topic,
    Difficulty,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Language => "language",
            GroupBy::Topic => "topic",
            GroupBy::Difficulty => "difficulty",
        }
    }

    /// Every group a submission belongs to under this dimension, each once.
    pub fn keys<'a>(&self, sub: &'a Submission) -> Vec<&'a str> {
        match self {
            GroupBy::Language if sub.lang.trim().is_empty() => vec![UNKNOWN_LANGUAGE],
            GroupBy::Language => vec![sub.lang.as_str()],
            GroupBy::Topic => {
                let mut keys: Vec<&str> = Vec::new();
                for tag in sub.topic_tags() {
                    if !keys.contains(&tag.as_str()) {
                        keys.push(tag);
                    }
                }
                keys
            }
            GroupBy::Difficulty => sub.difficulty.map(|d| d.label()).into_iter().collect(),
        }
    }
}

impl std::str::FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "language" | "lang" => Ok(GroupBy::Language),
            "topic" | "tag" => Ok(GroupBy::Topic),
            "difficulty" => Ok(GroupBy::Difficulty),
            _ => Err(format!("unknown grouping: {}", s)),
        }
    }
}

// ============================================
// Metrics
// ============================================

/// Aggregates for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityMetrics {
    /// Distinct problems with at least one submission
    pub attempted: u64,
    /// Distinct problems with at least one accepted submission
    pub solved: u64,
    pub submissions: u64,
    pub accepted: u64,
    /// `submissions / accepted`
    pub avg_attempts: Ratio,
    /// Share of attempted problems whose first submission was accepted, in percent
    pub first_ace_rate: Ratio,
}

/// Cumulative metrics for one group at the end of a bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub bucket_start: NaiveDate,
    pub label: String,
    pub metrics: EntityMetrics,
}

/// Result of [`compute_entity_rollup`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rollup {
    pub group_by: GroupBy,
    /// `None` when there is no bucket range (all-time over an empty corpus)
    pub granularity: Option<Granularity>,
    pub per_key: BTreeMap<String, EntityMetrics>,
    pub time_series: BTreeMap<String, Vec<TimeSeriesPoint>>,
}

impl Rollup {
    /// Keys ordered by submission count, busiest first.
    pub fn keys_by_volume(&self) -> Vec<&str> {
        let mut keys: Vec<(&str, u64)> = self
            .per_key
            .iter()
            .map(|(key, m)| (key.as_str(), m.submissions))
            .collect();
        keys.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        keys.into_iter().map(|(key, _)| key).collect()
    }
}

/// Running state for one group.
///
/// Must be fed submissions in chronological order: the first submission
/// seen for a problem is taken as its first attempt within the group.
#[derive(Debug, Default)]
struct KeyState<'a> {
    submissions: u64,
    accepted: u64,
    first_accepted: HashMap<&'a str, bool>,
    first_aces: u64,
    solved: HashSet<&'a str>,
}

impl<'a> KeyState<'a> {
    fn record(&mut self, sub: &'a Submission) {
        let accepted = sub.is_accepted();
        self.submissions += 1;
        if accepted {
            self.accepted += 1;
            self.solved.insert(sub.slug.as_str());
        }
        if !self.first_accepted.contains_key(sub.slug.as_str()) {
            self.first_accepted.insert(sub.slug.as_str(), accepted);
            if accepted {
                self.first_aces += 1;
            }
        }
    }

    fn metrics(&self) -> EntityMetrics {
        let attempted = self.first_accepted.len() as u64;
        EntityMetrics {
            attempted,
            solved: self.solved.len() as u64,
            submissions: self.submissions,
            accepted: self.accepted,
            avg_attempts: Ratio::of(self.submissions, self.accepted),
            first_ace_rate: Ratio::percent(self.first_aces, attempted),
        }
    }
}

/// Roll up the filtered history by `group_by`.
///
/// `per_key` covers submissions inside the window. The time series is
/// built in one chronological pass over the whole difficulty-filtered
/// history, so pre-window submissions are already folded into the first
/// visible point. Each key gets one point per bucket in which it had a
/// submission inside the window.
pub fn compute_entity_rollup(
    corpus: &Corpus,
    group_by: GroupBy,
    filter: &FilterSpec,
    cal: &Calendar,
) -> Rollup {
    let range = filter.bucket_range(corpus, cal);

    let mut window: BTreeMap<&str, KeyState> = BTreeMap::new();
    let mut running: HashMap<&str, KeyState> = HashMap::new();
    let mut time_series: BTreeMap<String, Vec<TimeSeriesPoint>> = BTreeMap::new();
    let mut last_bucket: HashMap<&str, usize> = HashMap::new();

    for sub in corpus.chronological().filter(|s| filter.matches_difficulty(s)) {
        let in_window = filter.in_window(sub.timestamp);
        let bucket = range
            .as_ref()
            .filter(|_| in_window)
            .and_then(|r| r.index_of(cal.date_of(sub.timestamp)).map(|i| (r, i)));

        for key in group_by.keys(sub) {
            let state = running.entry(key).or_default();
            state.record(sub);

            if in_window {
                window.entry(key).or_default().record(sub);
            }

            let Some((range, index)) = bucket else {
                continue;
            };
            let point = TimeSeriesPoint {
                bucket_start: range.starts_at(index),
                label: range.label_at(index),
                metrics: state.metrics(),
            };
            let points = time_series.entry(key.to_string()).or_default();
            if last_bucket.insert(key, index) == Some(index) {
                if let Some(last) = points.last_mut() {
                    *last = point;
                }
            } else {
                points.push(point);
            }
        }
    }

    let per_key = window
        .into_iter()
        .map(|(key, state)| (key.to_string(), state.metrics()))
        .collect::<BTreeMap<_, _>>();

    tracing::debug!(
        group_by = group_by.as_str(),
        keys = per_key.len(),
        "Computed entity rollup"
    );

    Rollup {
        group_by,
        granularity: range.map(|r| r.granularity()),
        per_key,
        time_series,
    }
}

// ============================================
// Skill matrix
// ============================================

/// Attempted and solved problem counts for one topic/tier cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkillCell {
    pub attempted: u64,
    pub solved: u64,
}

impl SkillCell {
    pub fn solve_rate(&self) -> Ratio {
        Ratio::percent(self.solved, self.attempted)
    }
}

/// One topic across the difficulty tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillRow {
    pub topic: String,
    /// Indexed by [`Difficulty::index`]
    pub tiers: [SkillCell; 3],
    pub total: SkillCell,
}

impl SkillRow {
    pub fn cell(&self, difficulty: Difficulty) -> SkillCell {
        self.tiers[difficulty.index()]
    }
}

/// Topic × difficulty table of distinct problems attempted and solved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkillMatrix {
    pub rows: Vec<SkillRow>,
}

impl SkillMatrix {
    pub fn row(&self, topic: &str) -> Option<&SkillRow> {
        self.rows.iter().find(|r| r.topic == topic)
    }
}

/// Build the topic × difficulty matrix over the filtered submissions.
///
/// Rows are ordered by problems solved, then attempted, then topic name.
pub fn compute_skill_matrix(corpus: &Corpus, filter: &FilterSpec) -> SkillMatrix {
    // (topic, tier) -> problem slug -> solved
    let mut cells: HashMap<(&str, Difficulty), HashMap<&str, bool>> = HashMap::new();

    for sub in corpus.submissions().iter().filter(|s| filter.includes(s)) {
        let Some(difficulty) = sub.difficulty else {
            continue;
        };
        for topic in sub.topic_tags() {
            let solved = cells
                .entry((topic.as_str(), difficulty))
                .or_default()
                .entry(sub.slug.as_str())
                .or_insert(false);
            *solved |= sub.is_accepted();
        }
    }

    let mut rows: BTreeMap<&str, SkillRow> = BTreeMap::new();
    for ((topic, difficulty), problems) in cells {
        let row = rows.entry(topic).or_insert_with(|| SkillRow {
            topic: topic.to_string(),
            tiers: [SkillCell::default(); 3],
            total: SkillCell::default(),
        });
        let cell = SkillCell {
            attempted: problems.len() as u64,
            solved: problems.values().filter(|s| **s).count() as u64,
        };
        row.tiers[difficulty.index()] = cell;
        row.total.attempted += cell.attempted;
        row.total.solved += cell.solved;
    }

    let mut rows: Vec<SkillRow> = rows.into_values().collect();
    rows.sort_by(|a, b| {
        b.total
            .solved
            .cmp(&a.total.solved)
            .then_with(|| b.total.attempted.cmp(&a.total.attempted))
            .then_with(|| a.topic.cmp(&b.topic))
    });

    SkillMatrix { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Status;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    struct Builder {
        subs: Vec<Submission>,
    }

    impl Builder {
        fn new() -> Self {
            Self { subs: Vec::new() }
        }

        fn add(mut self, slug: &str, lang: &str, hours: i64, status: Status) -> Self {
            let id = self.subs.len() as u64 + 1;
            self.subs.push(Submission {
                id,
                slug: slug.to_string(),
                title: slug.to_string(),
                status,
                lang: lang.to_string(),
                timestamp: base() + Duration::hours(hours),
                difficulty: None,
                topics: None,
            });
            self
        }

        fn tag(mut self, difficulty: Difficulty, topics: &[&str]) -> Self {
            if let Some(last) = self.subs.last_mut() {
                last.difficulty = Some(difficulty);
                last.topics = Some(topics.iter().map(|t| t.to_string()).collect());
            }
            self
        }

        fn corpus(self) -> Corpus {
            Corpus::from_submissions(self.subs)
        }
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn now() -> DateTime<Utc> {
        base() + Duration::days(10)
    }

    #[test]
    fn test_two_problem_scenario() {
        let corpus = Builder::new()
            .add("a", "python3", 0, Status::WrongAnswer)
            .add("a", "python3", 1, Status::WrongAnswer)
            .add("b", "rust", 2, Status::Accepted)
            .add("a", "python3", 3, Status::Accepted)
            .corpus();

        let rollup = compute_entity_rollup(
            &corpus,
            GroupBy::Language,
            &FilterSpec::all_time(now()),
            &Calendar::utc(),
        );

        let a = &rollup.per_key["python3"];
        assert_eq!((a.attempted, a.solved), (1, 1));
        assert_eq!(a.avg_attempts, Ratio::Defined(3.0));
        assert_eq!(a.first_ace_rate, Ratio::Defined(0.0));

        let b = &rollup.per_key["rust"];
        assert_eq!((b.attempted, b.solved), (1, 1));
        assert_eq!(b.avg_attempts, Ratio::Defined(1.0));
        assert_eq!(b.first_ace_rate, Ratio::Defined(100.0));
    }

    #[test]
    fn test_avg_attempts_undefined_without_accepts() {
        let corpus = Builder::new()
            .add("a", "go", 0, Status::WrongAnswer)
            .add("a", "go", 1, Status::TimeLimitExceeded)
            .add("a", "go", 2, Status::CompileError)
            .corpus();

        let rollup = compute_entity_rollup(
            &corpus,
            GroupBy::Language,
            &FilterSpec::all_time(now()),
            &Calendar::utc(),
        );
        let go = &rollup.per_key["go"];
        assert_eq!(go.avg_attempts, Ratio::Undefined);
        assert_eq!(go.solved, 0);
        assert_eq!(go.first_ace_rate, Ratio::Defined(0.0));
    }

    #[test]
    fn test_first_ace_uses_chronological_order() {
        // Arrival order puts the accept first, but it happened last.
        let mut subs = Builder::new()
            .add("a", "go", 5, Status::Accepted)
            .add("a", "go", 1, Status::WrongAnswer)
            .corpus()
            .submissions()
            .to_vec();
        subs.push(Submission {
            id: 10,
            slug: "b".to_string(),
            title: "b".to_string(),
            status: Status::Accepted,
            lang: "go".to_string(),
            timestamp: base(),
            difficulty: None,
            topics: None,
        });
        let corpus = Corpus::from_submissions(subs);

        let rollup = compute_entity_rollup(
            &corpus,
            GroupBy::Language,
            &FilterSpec::all_time(now()),
            &Calendar::utc(),
        );
        assert_eq!(rollup.per_key["go"].first_ace_rate, Ratio::Defined(50.0));
    }

    #[test]
    fn test_topics_are_multi_valued() {
        let corpus = Builder::new()
            .add("a", "go", 0, Status::Accepted)
            .tag(Difficulty::Easy, &["Array", "Hash Table"])
            .add("b", "go", 1, Status::WrongAnswer)
            .tag(Difficulty::Hard, &["Array"])
            .add("c", "go", 2, Status::Accepted)
            .corpus();

        let rollup = compute_entity_rollup(
            &corpus,
            GroupBy::Topic,
            &FilterSpec::all_time(now()),
            &Calendar::utc(),
        );
        assert_eq!(rollup.per_key.len(), 2);
        assert_eq!(rollup.per_key["Array"].attempted, 2);
        assert_eq!(rollup.per_key["Array"].solved, 1);
        assert_eq!(rollup.per_key["Hash Table"].submissions, 1);

        let by_tier = compute_entity_rollup(
            &corpus,
            GroupBy::Difficulty,
            &FilterSpec::all_time(now()),
            &Calendar::utc(),
        );
        let keys: Vec<&str> = by_tier.per_key.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Easy", "Hard"]);
    }

    #[test]
    fn test_repeated_tag_counts_once() {
        let corpus = Builder::new()
            .add("a", "go", 0, Status::Accepted)
            .tag(Difficulty::Easy, &["Array", "Array", "Stack"])
            .corpus();

        let rollup = compute_entity_rollup(
            &corpus,
            GroupBy::Topic,
            &FilterSpec::all_time(now()),
            &Calendar::utc(),
        );
        let array = &rollup.per_key["Array"];
        assert_eq!((array.submissions, array.accepted), (1, 1));
        assert_eq!(array.avg_attempts, Ratio::Defined(1.0));
        assert_eq!(GroupBy::Topic.keys(&corpus.submissions()[0]), vec!["Array", "Stack"]);
    }

    #[test]
    fn test_time_series_one_point_per_bucket() {
        let corpus = Builder::new()
            .add("a", "go", 0, Status::WrongAnswer)
            .add("a", "go", 2, Status::Accepted)
            .add("b", "go", 48, Status::Accepted)
            .add("c", "rust", 49, Status::Accepted)
            .corpus();

        let filter = FilterSpec::all_time(now()).with_granularity(Granularity::Daily);
        let rollup = compute_entity_rollup(&corpus, GroupBy::Language, &filter, &Calendar::utc());

        let go = &rollup.time_series["go"];
        assert_eq!(go.len(), 2);
        assert_eq!(go[0].label, "2024-03-01");
        assert_eq!(go[0].metrics.submissions, 2);
        assert_eq!(go[0].metrics.avg_attempts, Ratio::Defined(2.0));
        assert_eq!(go[1].label, "2024-03-03");
        assert_eq!(go[1].metrics.submissions, 3);
        assert_eq!(go[1].metrics.solved, 2);
        assert_eq!(rollup.time_series["rust"].len(), 1);
    }

    #[test]
    fn test_window_limits_per_key_but_series_folds_history() {
        let corpus = Builder::new()
            .add("a", "go", 0, Status::WrongAnswer)
            .add("a", "go", 1, Status::WrongAnswer)
            .add("b", "go", 24 * 9, Status::Accepted)
            .corpus();

        let filter = FilterSpec::trailing(3, now());
        let rollup = compute_entity_rollup(&corpus, GroupBy::Language, &filter, &Calendar::utc());

        let go = &rollup.per_key["go"];
        assert_eq!(go.submissions, 1);
        assert_eq!(go.first_ace_rate, Ratio::Defined(100.0));

        let series = &rollup.time_series["go"];
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].metrics.submissions, 3);
        assert_eq!(series[0].metrics.attempted, 2);
    }

    #[test]
    fn test_empty_corpus_rollup() {
        let rollup = compute_entity_rollup(
            &Corpus::empty(),
            GroupBy::Topic,
            &FilterSpec::all_time(now()),
            &Calendar::utc(),
        );
        assert!(rollup.per_key.is_empty());
        assert!(rollup.time_series.is_empty());
        assert_eq!(rollup.granularity, None);
    }

    #[test]
    fn test_skill_matrix() {
        let corpus = Builder::new()
            .add("a", "go", 0, Status::WrongAnswer)
            .tag(Difficulty::Easy, &["Array"])
            .add("a", "go", 1, Status::Accepted)
            .tag(Difficulty::Easy, &["Array"])
            .add("b", "go", 2, Status::WrongAnswer)
            .tag(Difficulty::Hard, &["Array", "Graph"])
            .add("c", "go", 3, Status::Accepted)
            .corpus();

        let matrix = compute_skill_matrix(&corpus, &FilterSpec::all_time(now()));
        assert_eq!(matrix.rows.len(), 2);
        assert_eq!(matrix.rows[0].topic, "Array");

        let array = matrix.row("Array").unwrap();
        assert_eq!(array.cell(Difficulty::Easy), SkillCell { attempted: 1, solved: 1 });
        assert_eq!(array.cell(Difficulty::Hard), SkillCell { attempted: 1, solved: 0 });
        assert_eq!(array.cell(Difficulty::Medium).solve_rate(), Ratio::Undefined);
        assert_eq!(array.total, SkillCell { attempted: 2, solved: 1 });
    }
}
