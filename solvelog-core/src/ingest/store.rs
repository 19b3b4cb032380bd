//! Snapshot persistence interface.
//!
//! The corpus is persisted by the caller as an opaque pair: the last-seen
//! submission id and the submission list. The storage medium is not this
//! crate's concern; [`MemoryStore`] is the in-process implementation.

use crate::error::Result;
use crate::types::Submission;

/// Read/write access to the persisted corpus snapshot.
pub trait SnapshotStore {
    fn load_cursor(&self) -> Result<Option<u64>>;

    fn save_cursor(&mut self, cursor: u64) -> Result<()>;

    fn load_submissions(&self) -> Result<Vec<Submission>>;

    fn save_submissions(&mut self, submissions: &[Submission]) -> Result<()>;
}

/// Keeps the snapshot in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    cursor: Option<u64>,
    submissions: Vec<Submission>,
}

impl SnapshotStore for MemoryStore {
    fn load_cursor(&self) -> Result<Option<u64>> {
        Ok(self.cursor)
    }

    fn save_cursor(&mut self, cursor: u64) -> Result<()> {
        self.cursor = Some(cursor);
        Ok(())
    }

    fn load_submissions(&self) -> Result<Vec<Submission>> {
        Ok(self.submissions.clone())
    }

    fn save_submissions(&mut self, submissions: &[Submission]) -> Result<()> {
        self.submissions = submissions.to_vec();
        Ok(())
    }
}
