//! Headline totals and the per-outcome breakdown.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::filter::FilterSpec;
use super::ratio::Ratio;
use super::rollup::GroupBy;
use crate::ingest::Corpus;
use crate::outcome::Status;
use crate::types::Difficulty;

/// Distinct problems attempted and solved in one tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierTotals {
    pub attempted: u64,
    pub solved: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub submissions: u64,
    pub accepted: u64,
    /// `accepted / submissions`, in percent
    pub acceptance_rate: Ratio,
    pub attempted: u64,
    pub solved: u64,
    /// Indexed by [`Difficulty::index`]
    pub tiers: [TierTotals; 3],
    /// Submissions per language, busiest first
    pub languages: Vec<(String, u64)>,
}

impl Totals {
    pub fn failed(&self) -> u64 {
        self.submissions - self.accepted
    }

    pub fn tier(&self, difficulty: Difficulty) -> TierTotals {
        self.tiers[difficulty.index()]
    }
}

/// Totals over the filtered submissions.
pub fn compute_totals(corpus: &Corpus, filter: &FilterSpec) -> Totals {
    let mut submissions = 0u64;
    let mut accepted = 0u64;
    // slug -> (difficulty, solved)
    let mut problems: HashMap<&str, (Option<Difficulty>, bool)> = HashMap::new();
    let mut languages: HashMap<&str, u64> = HashMap::new();

    for sub in corpus.submissions().iter().filter(|s| filter.includes(s)) {
        submissions += 1;
        if sub.is_accepted() {
            accepted += 1;
        }
        let entry = problems
            .entry(sub.slug.as_str())
            .or_insert((sub.difficulty, false));
        entry.0 = entry.0.or(sub.difficulty);
        entry.1 |= sub.is_accepted();
        for lang in GroupBy::Language.keys(sub) {
            *languages.entry(lang).or_default() += 1;
        }
    }

    let mut tiers = [TierTotals::default(); 3];
    for (difficulty, solved) in problems.values() {
        if let Some(d) = difficulty {
            let tier = &mut tiers[d.index()];
            tier.attempted += 1;
            tier.solved += u64::from(*solved);
        }
    }

    let mut languages: Vec<(String, u64)> = languages
        .into_iter()
        .map(|(lang, count)| (lang.to_string(), count))
        .collect();
    languages.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    Totals {
        submissions,
        accepted,
        acceptance_rate: Ratio::percent(accepted, submissions),
        attempted: problems.len() as u64,
        solved: problems.values().filter(|(_, solved)| *solved).count() as u64,
        tiers,
        languages,
    }
}

/// Submission count for one judge outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutcomeCount {
    pub status: Status,
    pub count: u64,
}

impl OutcomeCount {
    pub fn label(&self) -> &'static str {
        self.status.label()
    }
}

/// Filtered submissions grouped by outcome, most frequent first.
pub fn outcome_breakdown(corpus: &Corpus, filter: &FilterSpec) -> Vec<OutcomeCount> {
    let mut counts: HashMap<Status, u64> = HashMap::new();
    let mut unknown: HashSet<i64> = HashSet::new();

    for sub in corpus.submissions().iter().filter(|s| filter.includes(s)) {
        *counts.entry(sub.status).or_default() += 1;
        if !sub.status.is_known() {
            unknown.insert(sub.status.code());
        }
    }

    if !unknown.is_empty() {
        tracing::debug!(codes = ?unknown, "Outcome breakdown includes unknown status codes");
    }

    let mut breakdown: Vec<OutcomeCount> = counts
        .into_iter()
        .map(|(status, count)| OutcomeCount { status, count })
        .collect();
    breakdown.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.status.code().cmp(&b.status.code()))
    });
    breakdown
}
