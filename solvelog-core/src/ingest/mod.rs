//! Ingestion layer: raw submission records into a normalized [`Corpus`]
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐     ┌──────────────────┐
//! │ SubmissionSource │ ──► │    Normalizer    │ ──► │      Corpus      │
//! │ (JSON file, ...) │     │ parse, validate, │     │ arrival order +  │
//! └──────────────────┘     │ resolve metadata │     │ attempt index    │
//!          ▲               └──────────────────┘     └──────────────────┘
//!          │ cursor                                          │
//!          │               ┌──────────────────┐              │
//!          └────────────── │  SnapshotStore   │ ◄────────────┘
//!                          └──────────────────┘
//! ```
//!
//! Malformed records are rejected one at a time with a reason; the rest of
//! the batch is still ingested.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use solvelog_core::ingest::{JsonFileSource, MemoryStore, SyncCoordinator};
//!
//! let mut coordinator = SyncCoordinator::new(JsonFileSource::new(path), MemoryStore::default());
//! let result = coordinator.sync()?;
//! println!("{} new submissions, {} rejected", result.added, result.rejected.len());
//! ```

mod corpus;
mod source;
mod store;

pub use corpus::{Corpus, ProblemHistory};
pub use source::{load_catalog, load_raw_submissions, JsonFileSource, SubmissionSource};
pub use store::{MemoryStore, SnapshotStore};

use crate::error::Result;
use crate::types::{Difficulty, ProblemCatalog, RawRecord, RawSubmission, Submission};

/// Why a single record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("missing problem slug")]
    MissingSlug,
    #[error("unparsable timestamp: {0}")]
    UnparsableTimestamp(String),
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// A record that did not make it into the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    /// Position in the input batch
    pub index: usize,
    /// Submission id as delivered, if readable
    pub id: Option<u64>,
    pub reason: RejectReason,
}

/// Result of normalizing a batch.
#[derive(Debug, Default)]
pub struct NormalizeOutcome {
    pub corpus: Corpus,
    /// Records dropped for data-shape problems
    pub rejected: Vec<RejectedRecord>,
    /// Records dropped because their id was already present
    pub duplicates: usize,
    /// Records kept whose status code is not a known outcome
    pub unknown_statuses: usize,
}

/// Converts raw records into canonical [`Submission`]s.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    catalog: Option<ProblemCatalog>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve missing difficulty/topics from a catalog.
    pub fn with_catalog(catalog: ProblemCatalog) -> Self {
        Self {
            catalog: Some(catalog),
        }
    }

    /// Normalize a full batch into a fresh corpus.
    ///
    /// Accepts [`RawSubmission`]s or [`RawRecord`]s.
    pub fn normalize<I>(&self, raw: I) -> NormalizeOutcome
    where
        I: IntoIterator,
        I::Item: Into<RawRecord>,
    {
        self.merge(&Corpus::empty(), raw)
    }

    /// Normalize a batch and merge it into an existing corpus.
    pub fn merge<I>(&self, base: &Corpus, raw: I) -> NormalizeOutcome
    where
        I: IntoIterator,
        I::Item: Into<RawRecord>,
    {
        let mut total = 0usize;
        let mut rejected = Vec::new();
        let mut unknown_statuses = 0;
        let mut batch = Vec::new();

        for (index, record) in raw.into_iter().enumerate() {
            total += 1;
            let record: RawRecord = record.into();
            let id = record.id();
            let result = match record {
                RawRecord::Submission(raw) => self.normalize_record(raw),
                RawRecord::Malformed { error, .. } => Err(RejectReason::Malformed(error)),
            };
            match result {
                Ok(sub) => {
                    if !sub.status.is_known() {
                        unknown_statuses += 1;
                        tracing::warn!(
                            id = sub.id,
                            code = sub.status.code(),
                            "Unknown status code, counting as failure"
                        );
                    }
                    batch.push(sub);
                }
                Err(reason) => {
                    tracing::warn!(index, id = ?id, reason = %reason, "Rejected submission record");
                    rejected.push(RejectedRecord { index, id, reason });
                }
            }
        }

        let accepted_records = batch.len();
        let (corpus, added) = base.merge(batch);
        let duplicates = accepted_records - added;

        tracing::debug!(
            total,
            added,
            duplicates,
            rejected = rejected.len(),
            "Normalized submission batch"
        );

        NormalizeOutcome {
            corpus,
            rejected,
            duplicates,
            unknown_statuses,
        }
    }

    /// Validate and convert a single record.
    pub fn normalize_record(&self, raw: RawSubmission) -> std::result::Result<Submission, RejectReason> {
        let slug = raw
            .title_slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(RejectReason::MissingSlug)?
            .to_string();

        let timestamp = raw
            .timestamp
            .parse()
            .ok_or_else(|| RejectReason::UnparsableTimestamp(raw.timestamp.to_string()))?;

        let catalog_meta = self.catalog.as_ref().and_then(|c| c.get(&slug));

        let inline_difficulty = raw.difficulty.as_deref().and_then(|d| {
            d.parse::<Difficulty>()
                .map_err(|e| tracing::warn!(id = raw.id, error = %e, "Ignoring difficulty"))
                .ok()
        });
        let difficulty =
            inline_difficulty.or_else(|| catalog_meta.and_then(|meta| meta.difficulty));

        let topics = raw
            .topics
            .or_else(|| catalog_meta.and_then(|meta| meta.topics.clone()));

        let title = if raw.title.trim().is_empty() {
            slug.clone()
        } else {
            raw.title
        };

        Ok(Submission {
            id: raw.id,
            slug,
            title,
            status: crate::outcome::Status::from_code(raw.status),
            lang: raw.lang,
            timestamp,
            difficulty,
            topics,
        })
    }
}

/// Normalize a batch with no metadata catalog.
pub fn normalize<I>(raw: I) -> NormalizeOutcome
where
    I: IntoIterator,
    I::Item: Into<RawRecord>,
{
    Normalizer::new().normalize(raw)
}

/// Result of one sync round.
#[derive(Debug)]
pub struct SyncResult {
    /// Records delivered by the source
    pub fetched: usize,
    /// Submissions added to the corpus
    pub added: usize,
    /// Records skipped because their id was already stored
    pub duplicates: usize,
    /// Records rejected during normalization
    pub rejected: Vec<RejectedRecord>,
    /// Cursor saved for the next round
    pub cursor: Option<u64>,
    /// The merged corpus
    pub corpus: Corpus,
}

/// Coordinates incremental ingestion from a source into a snapshot store.
///
/// Each round loads the stored submissions, asks the source for records
/// newer than the cursor, merges them and writes the snapshot back.
pub struct SyncCoordinator<S, P> {
    source: S,
    store: P,
    normalizer: Normalizer,
}

impl<S: SubmissionSource, P: SnapshotStore> SyncCoordinator<S, P> {
    pub fn new(source: S, store: P) -> Self {
        Self {
            source,
            store,
            normalizer: Normalizer::new(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    /// Run one incremental sync round.
    pub fn sync(&mut self) -> Result<SyncResult> {
        let stored = self.store.load_submissions()?;
        let base = Corpus::from_submissions(stored);
        let cursor = match self.store.load_cursor()? {
            Some(saved) => Some(saved.max(base.max_id().unwrap_or(0))),
            None => base.max_id(),
        };

        let raw = self.source.fetch_since(cursor)?;
        let fetched = raw.len();
        // Rejected records still advance the cursor so they are not refetched forever.
        let fetched_max = raw.iter().filter_map(RawRecord::id).max();

        let outcome = self.normalizer.merge(&base, raw);
        let added = outcome.corpus.len() - base.len();

        let new_cursor = match (cursor, fetched_max) {
            (Some(c), Some(f)) => Some(c.max(f)),
            (c, f) => c.or(f),
        };

        if added > 0 {
            self.store.save_submissions(outcome.corpus.submissions())?;
        }
        if let Some(c) = new_cursor {
            self.store.save_cursor(c)?;
        }

        tracing::info!(
            fetched,
            added,
            rejected = outcome.rejected.len(),
            cursor = ?new_cursor,
            "Sync complete"
        );

        Ok(SyncResult {
            fetched,
            added,
            duplicates: outcome.duplicates,
            rejected: outcome.rejected,
            cursor: new_cursor,
            corpus: outcome.corpus,
        })
    }
}
