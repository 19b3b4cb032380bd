//! Milestone crossings: the submission that took a counter to a round number.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ingest::Corpus;
use crate::types::{Difficulty, Submission};

/// Round numbers that count as milestones, ascending.
pub const MILESTONE_THRESHOLDS: [u64; 10] = [1, 10, 50, 100, 250, 500, 1000, 2000, 5000, 10000];

/// Counters tracked during the milestone pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneCounter {
    Submissions,
    Solved,
    SolvedEasy,
    SolvedMedium,
    SolvedHard,
}

impl MilestoneCounter {
    pub const ALL: [MilestoneCounter; 5] = [
        MilestoneCounter::Submissions,
        MilestoneCounter::Solved,
        MilestoneCounter::SolvedEasy,
        MilestoneCounter::SolvedMedium,
        MilestoneCounter::SolvedHard,
    ];

    fn solved_tier(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => MilestoneCounter::SolvedEasy,
            Difficulty::Medium => MilestoneCounter::SolvedMedium,
            Difficulty::Hard => MilestoneCounter::SolvedHard,
        }
    }

    fn slot(&self) -> usize {
        match self {
            MilestoneCounter::Submissions => 0,
            MilestoneCounter::Solved => 1,
            MilestoneCounter::SolvedEasy => 2,
            MilestoneCounter::SolvedMedium => 3,
            MilestoneCounter::SolvedHard => 4,
        }
    }

    /// Noun for display, e.g. "10th Easy solve".
    pub fn noun(&self) -> &'static str {
        match self {
            MilestoneCounter::Submissions => "submission",
            MilestoneCounter::Solved => "problem solved",
            MilestoneCounter::SolvedEasy => "Easy solve",
            MilestoneCounter::SolvedMedium => "Medium solve",
            MilestoneCounter::SolvedHard => "Hard solve",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneCounter::Submissions => "submissions",
            MilestoneCounter::Solved => "solved",
            MilestoneCounter::SolvedEasy => "solved_easy",
            MilestoneCounter::SolvedMedium => "solved_medium",
            MilestoneCounter::SolvedHard => "solved_hard",
        }
    }
}

/// A counter reaching a threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub counter: MilestoneCounter,
    pub value: u64,
    pub at: DateTime<Utc>,
    pub submission_id: u64,
    pub slug: String,
    pub title: String,
}

/// Where a counter stands after the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MilestoneProgress {
    pub counter: MilestoneCounter,
    pub current: u64,
    /// Next threshold, `None` once the last one is passed
    pub next: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MilestoneList {
    /// Crossings in chronological order
    pub milestones: Vec<Milestone>,
    pub progress: Vec<MilestoneProgress>,
}

impl MilestoneList {
    pub fn for_counter(&self, counter: MilestoneCounter) -> impl Iterator<Item = &Milestone> {
        self.milestones.iter().filter(move |m| m.counter == counter)
    }
}

/// Next threshold strictly above `value`.
pub fn next_threshold(value: u64) -> Option<u64> {
    MILESTONE_THRESHOLDS.iter().copied().find(|t| *t > value)
}

fn bump(counts: &mut [u64; 5], counter: MilestoneCounter, sub: &Submission, out: &mut Vec<Milestone>) {
    let value = &mut counts[counter.slot()];
    *value += 1;
    if MILESTONE_THRESHOLDS.contains(value) {
        out.push(Milestone {
            counter,
            value: *value,
            at: sub.timestamp,
            submission_id: sub.id,
            slug: sub.slug.clone(),
            title: sub.title.clone(),
        });
    }
}

/// One chronological pass emitting a record each time a counter lands
/// exactly on a threshold.
pub fn compute_milestones(corpus: &Corpus) -> MilestoneList {
    let mut counts = [0u64; 5];
    let mut solved: HashSet<&str> = HashSet::new();
    let mut milestones = Vec::new();

    for sub in corpus.chronological() {
        bump(&mut counts, MilestoneCounter::Submissions, sub, &mut milestones);

        if sub.is_accepted() && solved.insert(sub.slug.as_str()) {
            bump(&mut counts, MilestoneCounter::Solved, sub, &mut milestones);
            if let Some(difficulty) = sub.difficulty {
                bump(
                    &mut counts,
                    MilestoneCounter::solved_tier(difficulty),
                    sub,
                    &mut milestones,
                );
            }
        }
    }

    let progress = MilestoneCounter::ALL
        .iter()
        .map(|&counter| {
            let current = counts[counter.slot()];
            MilestoneProgress {
                counter,
                current,
                next: next_threshold(current),
            }
        })
        .collect();

    MilestoneList {
        milestones,
        progress,
    }
}
