//! Event sources.
//!
//! The fetch layer (remote API, pagination, retries) lives outside this
//! crate. It plugs in through [`SubmissionSource`]; [`JsonFileSource`]
//! covers the common case of a previously exported JSON array.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{ProblemCatalog, RawRecord};

/// Something that can deliver raw submission records.
pub trait SubmissionSource {
    /// Records with an id strictly greater than `cursor` (all records when `None`).
    ///
    /// Records whose id cannot be read are always delivered.
    fn fetch_since(&self, cursor: Option<u64>) -> Result<Vec<RawRecord>>;
}

/// Reads a JSON array of raw submissions from disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SubmissionSource for JsonFileSource {
    fn fetch_since(&self, cursor: Option<u64>) -> Result<Vec<RawRecord>> {
        let mut records = load_raw_submissions(&self.path)?;
        if let Some(cursor) = cursor {
            records.retain(|r| r.id().map_or(true, |id| id > cursor));
        }
        Ok(records)
    }
}

/// Load a JSON array of raw submissions.
///
/// The file must hold a JSON array; each element is read on its own, so one
/// malformed element comes back as [`RawRecord::Malformed`] instead of
/// failing the load.
pub fn load_raw_submissions(path: &Path) -> Result<Vec<RawRecord>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Source(format!("failed to read {}: {}", path.display(), e))
    })?;
    let values: Vec<serde_json::Value> = serde_json::from_str(&content)?;
    let records: Vec<RawRecord> = values.into_iter().map(RawRecord::from_value).collect();
    let malformed = records
        .iter()
        .filter(|r| matches!(r, RawRecord::Malformed { .. }))
        .count();
    tracing::debug!(
        path = %path.display(),
        count = records.len(),
        malformed,
        "Loaded raw submissions"
    );
    Ok(records)
}

/// Load a slug → metadata catalog from a JSON object.
pub fn load_catalog(path: &Path) -> Result<ProblemCatalog> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Source(format!("failed to read {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_json_source_honors_cursor() {
        let file = write_file(
            r#"[
                {"id": 1, "title_slug": "a", "status": 10, "lang": "rust", "timestamp": 100},
                {"id": 2, "title_slug": "a", "status": 11, "lang": "rust", "timestamp": 200},
                {"id": 3, "title_slug": "b", "status": 10, "lang": "rust", "timestamp": "300"}
            ]"#,
        );
        let source = JsonFileSource::new(file.path());

        assert_eq!(source.fetch_since(None).unwrap().len(), 3);
        let newer = source.fetch_since(Some(2)).unwrap();
        assert_eq!(newer.len(), 1);
        assert_eq!(newer[0].id(), Some(3));
    }

    #[test]
    fn test_bad_elements_do_not_fail_the_file() {
        let file = write_file(
            r#"[
                {"id": 1, "title_slug": "a", "status": 10, "lang": "rust", "timestamp": 100},
                {"id": 2, "title_slug": "a", "status": 10, "lang": "rust", "timestamp": null},
                {"id": 3, "title_slug": "a", "status": 10, "lang": "rust", "timestamp": 1700000000.5},
                {"id": 4, "title_slug": "a", "status": 10, "lang": "rust", "timestamp": {"s": 1}},
                {"id": 5, "title_slug": "a", "lang": "rust", "timestamp": 100},
                {"id": 6, "title_slug": "a", "status": 10, "lang": "rust"},
                "junk"
            ]"#,
        );

        let records = load_raw_submissions(file.path()).unwrap();
        assert_eq!(records.len(), 7);
        assert!(matches!(records[0], RawRecord::Submission(_)));
        assert!(matches!(records[1], RawRecord::Malformed { id: Some(2), .. }));
        assert!(matches!(records[2], RawRecord::Submission(_)));
        assert!(matches!(records[3], RawRecord::Malformed { id: Some(4), .. }));
        assert!(matches!(records[4], RawRecord::Malformed { id: Some(5), .. }));
        assert!(matches!(records[5], RawRecord::Malformed { id: Some(6), .. }));
        assert!(matches!(records[6], RawRecord::Malformed { id: None, .. }));

        // Unreadable ids cannot be compared against the cursor.
        let newer = JsonFileSource::new(file.path()).fetch_since(Some(5)).unwrap();
        assert_eq!(newer.len(), 2);
    }

    #[test]
    fn test_missing_file_is_source_error() {
        let source = JsonFileSource::new("/definitely/not/here.json");
        assert!(matches!(source.fetch_since(None), Err(Error::Source(_))));
    }

    #[test]
    fn test_malformed_file_is_json_error() {
        let file = write_file("{not json");
        assert!(matches!(
            load_raw_submissions(file.path()),
            Err(Error::Json(_))
        ));
    }
}
