//! Superlatives ("trophies") over per-problem histories.
//!
//! Each trophy tracks one running best across the problems in grouping
//! order. A candidate only replaces the holder when strictly better, so
//! the first problem encountered wins a tie. Every trophy has a fixed
//! unlock threshold; below it the best candidate is still reported, but
//! with `achieved = false`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ingest::{Corpus, ProblemHistory};
use crate::types::Difficulty;

const SECONDS_PER_DAY: i64 = 86_400;

/// The named superlatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrophyKind {
    /// Solved problem with the most attempts up to its first accept
    MostAttemptsBeforeSolve,
    /// Never-solved problem with the most attempts
    MostAttemptsNeverSolved,
    /// Easy problem with the most failed attempts
    StubbornEasy,
    /// Longest time from first attempt to first accept
    LongestTimeToSolve,
    /// Earliest accepted submission
    FirstAccepted,
    /// Problem accepted the most times
    MostAcceptedResubmits,
}

impl TrophyKind {
    pub const ALL: [TrophyKind; 6] = [
        TrophyKind::MostAttemptsBeforeSolve,
        TrophyKind::MostAttemptsNeverSolved,
        TrophyKind::StubbornEasy,
        TrophyKind::LongestTimeToSolve,
        TrophyKind::FirstAccepted,
        TrophyKind::MostAcceptedResubmits,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrophyKind::MostAttemptsBeforeSolve => "most_attempts_before_solve",
            TrophyKind::MostAttemptsNeverSolved => "most_attempts_never_solved",
            TrophyKind::StubbornEasy => "stubborn_easy",
            TrophyKind::LongestTimeToSolve => "longest_time_to_solve",
            TrophyKind::FirstAccepted => "first_accepted",
            TrophyKind::MostAcceptedResubmits => "most_accepted_resubmits",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TrophyKind::MostAttemptsBeforeSolve => "Persistence Pays",
            TrophyKind::MostAttemptsNeverSolved => "The One That Got Away",
            TrophyKind::StubbornEasy => "Not So Easy",
            TrophyKind::LongestTimeToSolve => "Long Game",
            TrophyKind::FirstAccepted => "First Blood",
            TrophyKind::MostAcceptedResubmits => "Encore",
        }
    }

    /// Minimum value for the trophy to count as achieved.
    ///
    /// Attempt counts for the attempt-based trophies, seconds for
    /// [`TrophyKind::LongestTimeToSolve`].
    pub fn threshold(&self) -> i64 {
        match self {
            TrophyKind::MostAttemptsBeforeSolve => 2,
            TrophyKind::MostAttemptsNeverSolved => 3,
            TrophyKind::StubbornEasy => 4,
            TrophyKind::LongestTimeToSolve => SECONDS_PER_DAY,
            TrophyKind::FirstAccepted => 1,
            TrophyKind::MostAcceptedResubmits => 3,
        }
    }
}

/// The problem currently holding a trophy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrophyHolder {
    pub slug: String,
    pub title: String,
    pub value: i64,
    /// Instant of the submission that settled the value
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trophy {
    pub kind: TrophyKind,
    pub achieved: bool,
    /// Best candidate, even when below the threshold
    pub holder: Option<TrophyHolder>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrophyList {
    pub trophies: Vec<Trophy>,
}

impl TrophyList {
    pub fn get(&self, kind: TrophyKind) -> Option<&Trophy> {
        self.trophies.iter().find(|t| t.kind == kind)
    }

    pub fn achieved(&self) -> impl Iterator<Item = &Trophy> {
        self.trophies.iter().filter(|t| t.achieved)
    }
}

/// Facts about one problem, gathered in a single pass over its attempts.
struct ProblemFacts<'a> {
    problem: &'a ProblemHistory,
    attempts: i64,
    failed: i64,
    accepted: i64,
    first_attempt: DateTime<Utc>,
    last_attempt: DateTime<Utc>,
    last_failed: Option<DateTime<Utc>>,
    last_accepted: Option<DateTime<Utc>>,
    /// (1-based attempt index, instant) of the first accept
    first_accept: Option<(i64, DateTime<Utc>)>,
}

impl<'a> ProblemFacts<'a> {
    fn gather(corpus: &'a Corpus, problem: &'a ProblemHistory) -> Option<Self> {
        let first = corpus.attempts(problem).next()?;
        let mut facts = Self {
            problem,
            attempts: 0,
            failed: 0,
            accepted: 0,
            first_attempt: first.timestamp,
            last_attempt: first.timestamp,
            last_failed: None,
            last_accepted: None,
            first_accept: None,
        };

        for sub in corpus.attempts(problem) {
            facts.attempts += 1;
            facts.last_attempt = sub.timestamp;
            if sub.is_accepted() {
                facts.accepted += 1;
                facts.last_accepted = Some(sub.timestamp);
                if facts.first_accept.is_none() {
                    facts.first_accept = Some((facts.attempts, sub.timestamp));
                }
            } else {
                facts.failed += 1;
                facts.last_failed = Some(sub.timestamp);
            }
        }
        Some(facts)
    }

    /// This problem's value for a trophy, if it qualifies as a candidate.
    fn candidate(&self, kind: TrophyKind) -> Option<(i64, DateTime<Utc>)> {
        match kind {
            TrophyKind::MostAttemptsBeforeSolve => self.first_accept,
            TrophyKind::MostAttemptsNeverSolved => {
                (self.accepted == 0).then_some((self.attempts, self.last_attempt))
            }
            TrophyKind::StubbornEasy => {
                if self.problem.difficulty != Some(Difficulty::Easy) {
                    return None;
                }
                self.last_failed.map(|at| (self.failed, at))
            }
            TrophyKind::LongestTimeToSolve => self
                .first_accept
                .map(|(_, at)| ((at - self.first_attempt).num_seconds(), at)),
            TrophyKind::FirstAccepted => self.first_accept.map(|(_, at)| (1, at)),
            TrophyKind::MostAcceptedResubmits => self.last_accepted.map(|at| (self.accepted, at)),
        }
    }

    fn holder(&self, value: i64, at: DateTime<Utc>) -> TrophyHolder {
        TrophyHolder {
            slug: self.problem.slug.clone(),
            title: self.problem.title.clone(),
            value,
            at,
        }
    }
}

/// Whether a candidate replaces the current holder.
fn beats(kind: TrophyKind, candidate: (i64, DateTime<Utc>), holder: &TrophyHolder) -> bool {
    match kind {
        TrophyKind::FirstAccepted => candidate.1 < holder.at,
        _ => candidate.0 > holder.value,
    }
}

/// Detect every trophy over the whole corpus.
pub fn compute_superlatives(corpus: &Corpus) -> TrophyList {
    let facts: Vec<ProblemFacts> = corpus
        .problems()
        .iter()
        .filter_map(|p| ProblemFacts::gather(corpus, p))
        .collect();

    let trophies = TrophyKind::ALL
        .iter()
        .map(|&kind| {
            let mut holder: Option<TrophyHolder> = None;
            for problem in &facts {
                let Some(candidate) = problem.candidate(kind) else {
                    continue;
                };
                if holder.as_ref().map_or(true, |h| beats(kind, candidate, h)) {
                    holder = Some(problem.holder(candidate.0, candidate.1));
                }
            }
            Trophy {
                kind,
                achieved: holder.as_ref().map_or(false, |h| h.value >= kind.threshold()),
                holder,
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        problems = facts.len(),
        achieved = trophies.iter().filter(|t| t.achieved).count(),
        "Computed trophies"
    );

    TrophyList { trophies }
}
