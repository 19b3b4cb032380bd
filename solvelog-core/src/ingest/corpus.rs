//! The normalized submission corpus.
//!
//! A [`Corpus`] owns the arrival-ordered submissions plus two derived
//! indexes: a chronological order over all submissions, and the per-problem
//! attempt sequences. Both indexes are rebuilt from scratch whenever the
//! corpus changes; [`Corpus::merge`] returns a new corpus and leaves the
//! old one untouched.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::types::{Difficulty, Submission};

/// All submissions for one problem, in attempt order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemHistory {
    pub slug: String,
    pub title: String,
    /// First known difficulty among the problem's submissions
    pub difficulty: Option<Difficulty>,
    /// First known topic set among the problem's submissions
    pub topics: Option<Vec<String>>,
    /// Indices into [`Corpus::submissions`], sorted by (instant, id)
    attempts: Vec<usize>,
}

impl ProblemHistory {
    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }
}

/// Normalized, deduplicated submission history.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    submissions: Vec<Submission>,
    chronological: Vec<usize>,
    problems: Vec<ProblemHistory>,
    index: HashMap<String, usize>,
    max_id: Option<u64>,
    version: u64,
}

impl Corpus {
    /// An empty corpus.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a corpus from already-normalized submissions.
    ///
    /// Later submissions whose id was already seen are dropped.
    pub fn from_submissions(submissions: Vec<Submission>) -> Self {
        Self::build(submissions, 0).0
    }

    /// Build a corpus, returning the number of dropped duplicate ids.
    pub(crate) fn build(submissions: Vec<Submission>, version: u64) -> (Self, usize) {
        let mut seen = HashSet::with_capacity(submissions.len());
        let mut kept = Vec::with_capacity(submissions.len());
        let mut duplicates = 0;

        for sub in submissions {
            if seen.insert(sub.id) {
                kept.push(sub);
            } else {
                duplicates += 1;
            }
        }

        let mut chronological: Vec<usize> = (0..kept.len()).collect();
        chronological.sort_by_key(|&i| kept[i].chrono_key());

        let mut problems: Vec<ProblemHistory> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (i, sub) in kept.iter().enumerate() {
            let slot = match index.get(&sub.slug) {
                Some(&slot) => slot,
                None => {
                    index.insert(sub.slug.clone(), problems.len());
                    problems.push(ProblemHistory {
                        slug: sub.slug.clone(),
                        title: sub.title.clone(),
                        difficulty: None,
                        topics: None,
                        attempts: Vec::new(),
                    });
                    problems.len() - 1
                }
            };
            let problem = &mut problems[slot];
            if problem.difficulty.is_none() {
                problem.difficulty = sub.difficulty;
            }
            if problem.topics.is_none() {
                problem.topics = sub.topics.clone();
            }
            problem.attempts.push(i);
        }

        for problem in &mut problems {
            problem.attempts.sort_by_key(|&i| kept[i].chrono_key());
        }

        let max_id = kept.iter().map(|s| s.id).max();

        let corpus = Corpus {
            submissions: kept,
            chronological,
            problems,
            index,
            max_id,
            version,
        };
        (corpus, duplicates)
    }

    /// Merge a batch into a new corpus.
    ///
    /// Returns the merged corpus and the number of submissions actually
    /// added. The version is bumped only when something was added.
    pub fn merge(&self, batch: Vec<Submission>) -> (Corpus, usize) {
        let before = self.submissions.len();
        let mut all = self.submissions.clone();
        all.extend(batch);

        let (merged, _) = Self::build(all, self.version);
        let added = merged.submissions.len() - before;
        let version = if added > 0 {
            self.version + 1
        } else {
            self.version
        };
        (Corpus { version, ..merged }, added)
    }

    /// Submissions in arrival order.
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn len(&self) -> usize {
        self.submissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }

    /// Bumped on every merge that added submissions.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Highest submission id seen, the incremental-fetch cursor.
    pub fn max_id(&self) -> Option<u64> {
        self.max_id
    }

    /// All submissions sorted ascending by (instant, id).
    pub fn chronological(&self) -> impl DoubleEndedIterator<Item = &Submission> + Clone + '_ {
        self.chronological.iter().map(|&i| &self.submissions[i])
    }

    /// Problems in order of first arrival.
    pub fn problems(&self) -> &[ProblemHistory] {
        &self.problems
    }

    pub fn problem(&self, slug: &str) -> Option<&ProblemHistory> {
        self.index.get(slug).map(|&slot| &self.problems[slot])
    }

    /// A problem's attempt sequence.
    pub fn attempts<'a>(
        &'a self,
        problem: &'a ProblemHistory,
    ) -> impl DoubleEndedIterator<Item = &'a Submission> + Clone + 'a {
        problem.attempts.iter().map(|&i| &self.submissions[i])
    }

    /// Earliest and latest submission instants.
    pub fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = self.chronological().next()?;
        let last = self.chronological().next_back()?;
        Some((first.timestamp, last.timestamp))
    }

    /// Same submissions and grouping, ignoring the version counter.
    pub fn content_eq(&self, other: &Corpus) -> bool {
        self.submissions == other.submissions
            && self.chronological == other.chronological
            && self.problems == other.problems
            && self.max_id == other.max_id
    }
}
