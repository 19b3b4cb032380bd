//! Caller-owned memoization of one computation.
//!
//! The engine itself keeps no state. A caller that recomputes a view on
//! every filter change can hold a [`ResultCache`] per view; it reuses the
//! last result while the corpus version and the filter are unchanged.
//!
//! Versions are only comparable within one corpus lineage (a corpus and
//! the corpora produced from it by [`Corpus::merge`]).

use super::filter::FilterSpec;
use crate::ingest::Corpus;

#[derive(Debug, Clone)]
struct Entry<R> {
    corpus_version: u64,
    filter: FilterSpec,
    result: R,
}

/// Last result of a computation, keyed by corpus version and filter.
#[derive(Debug, Clone)]
pub struct ResultCache<R> {
    entry: Option<Entry<R>>,
}

impl<R> Default for ResultCache<R> {
    fn default() -> Self {
        Self { entry: None }
    }
}

impl<R> ResultCache<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the cached result was computed for this corpus and filter.
    pub fn is_fresh(&self, corpus: &Corpus, filter: &FilterSpec) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|e| e.corpus_version == corpus.version() && e.filter == *filter)
    }

    /// The cached result, or a fresh one from `compute`.
    pub fn get_or_compute<F>(&mut self, corpus: &Corpus, filter: &FilterSpec, compute: F) -> &R
    where
        F: FnOnce(&Corpus, &FilterSpec) -> R,
    {
        if !self.is_fresh(corpus, filter) {
            self.entry = None;
        }
        let entry = self.entry.get_or_insert_with(|| {
            tracing::debug!(corpus_version = corpus.version(), "Result cache miss");
            Entry {
                corpus_version: corpus.version(),
                filter: filter.clone(),
                result: compute(corpus, filter),
            }
        });
        &entry.result
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
