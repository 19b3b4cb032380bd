//! Core domain types for solvelog
//!
//! These types describe the submission history at two levels:
//!
//! | Type | Layer | Description |
//! |------|-------|-------------|
//! | [`RawSubmission`] | input | One record as delivered by the fetch layer (loosely typed) |
//! | [`RawRecord`] | input | One array element: a readable record or the reason it is not |
//! | [`Submission`] | canonical | A validated, typed record with resolved problem metadata |
//! | [`ProblemCatalog`] | metadata | Slug → difficulty/topics lookup used during normalization |
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Problem** | A distinct practice problem, identified by its slug |
//! | **Submission** | One judged attempt at a problem |
//! | **Attempt sequence** | A problem's submissions sorted by instant ascending |
//! | **Solved** | A problem with at least one accepted submission |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use crate::outcome::Status;

// ============================================
// Difficulty
// ============================================

/// Difficulty tier of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// All tiers in ascending order.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Capitalized label for tables and chart legends.
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Position in [`Difficulty::ALL`], handy for per-tier arrays.
    pub fn index(&self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "1" => Ok(Difficulty::Easy),
            "medium" | "2" => Ok(Difficulty::Medium),
            "hard" | "3" => Ok(Difficulty::Hard),
            _ => Err(format!("unknown difficulty: {}", s)),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================
// Raw input
// ============================================

/// Timestamp as it arrives from the source: epoch seconds or a string.
///
/// Epoch seconds may be fractional (`1700000000.5`). Strings may hold epoch
/// seconds (`"1700000000"`) or an RFC 3339 instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Seconds(i64),
    Fractional(f64),
    Text(String),
}

impl RawTimestamp {
    /// Parse into an instant. Returns `None` for anything unparsable.
    pub fn parse(&self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Seconds(secs) => DateTime::from_timestamp(*secs, 0),
            RawTimestamp::Fractional(secs) => from_fractional_seconds(*secs),
            RawTimestamp::Text(text) => {
                let text = text.trim();
                if let Ok(secs) = text.parse::<i64>() {
                    return DateTime::from_timestamp(secs, 0);
                }
                if let Ok(secs) = text.parse::<f64>() {
                    return from_fractional_seconds(secs);
                }
                DateTime::parse_from_rfc3339(text)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
            }
        }
    }
}

fn from_fractional_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9) as u32;
    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
}

impl std::fmt::Display for RawTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawTimestamp::Seconds(secs) => write!(f, "{}", secs),
            RawTimestamp::Fractional(secs) => write!(f, "{}", secs),
            RawTimestamp::Text(text) => f.write_str(text),
        }
    }
}

impl From<DateTime<Utc>> for RawTimestamp {
    fn from(ts: DateTime<Utc>) -> Self {
        RawTimestamp::Seconds(ts.timestamp())
    }
}

/// A submission record as delivered by the ingestion layer.
///
/// Field aliases accept the camelCase names used by the upstream API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSubmission {
    /// Stable submission identifier (also the incremental-fetch cursor)
    #[serde(deserialize_with = "lenient_u64")]
    pub id: u64,
    /// Display title of the problem
    #[serde(default)]
    pub title: String,
    /// Problem slug, the grouping key
    #[serde(default, alias = "titleSlug")]
    pub title_slug: Option<String>,
    /// Numeric judge outcome code
    #[serde(alias = "statusCode")]
    pub status: i64,
    /// Language tag (e.g. "python3")
    #[serde(default, alias = "language")]
    pub lang: String,
    /// Submission instant
    pub timestamp: RawTimestamp,
    /// Inline difficulty, if the source resolved it
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Inline topic tags, if the source resolved them
    #[serde(default, alias = "topicTags")]
    pub topics: Option<Vec<String>>,
}

/// One element of a raw event array.
///
/// Elements that do not read as a [`RawSubmission`] (null timestamp, missing
/// status, not an object at all) are kept as `Malformed` so the normalizer
/// can reject them one at a time instead of failing the whole batch.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    Submission(RawSubmission),
    Malformed {
        /// Submission id, when the element carries a readable one
        id: Option<u64>,
        error: String,
    },
}

impl RawRecord {
    /// Read one array element.
    pub fn from_value(value: serde_json::Value) -> Self {
        let id = value.get("id").and_then(|id| match id {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });
        match serde_json::from_value::<RawSubmission>(value) {
            Ok(raw) => RawRecord::Submission(raw),
            Err(e) => RawRecord::Malformed {
                id,
                error: e.to_string(),
            },
        }
    }

    pub fn id(&self) -> Option<u64> {
        match self {
            RawRecord::Submission(raw) => Some(raw.id),
            RawRecord::Malformed { id, .. } => *id,
        }
    }
}

impl From<RawSubmission> for RawRecord {
    fn from(raw: RawSubmission) -> Self {
        RawRecord::Submission(raw)
    }
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdValue {
        Number(u64),
        Text(String),
    }

    match IdValue::deserialize(deserializer)? {
        IdValue::Number(n) => Ok(n),
        IdValue::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

// ============================================
// Problem metadata
// ============================================

/// Difficulty and topic metadata for one problem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemMeta {
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub topics: Option<Vec<String>>,
}

/// Lookup of problem metadata by slug.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemCatalog {
    problems: HashMap<String, ProblemMeta>,
}

impl ProblemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slug: impl Into<String>, meta: ProblemMeta) {
        self.problems.insert(slug.into(), meta);
    }

    pub fn get(&self, slug: &str) -> Option<&ProblemMeta> {
        self.problems.get(slug)
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}

// ============================================
// Canonical submission
// ============================================

/// A normalized submission.
///
/// Immutable once produced by the normalizer. Optional metadata stays
/// optional: a submission without a difficulty is left out of per-tier
/// aggregates, one without topics is left out of topic aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: u64,
    pub slug: String,
    pub title: String,
    pub status: Status,
    pub lang: String,
    pub timestamp: DateTime<Utc>,
    pub difficulty: Option<Difficulty>,
    pub topics: Option<Vec<String>>,
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        self.status.is_accepted()
    }

    /// Topic tags, empty when unknown.
    pub fn topic_tags(&self) -> &[String] {
        self.topics.as_deref().unwrap_or(&[])
    }

    /// Chronological sort key; ties on the instant fall back to the id.
    pub fn chrono_key(&self) -> (DateTime<Utc>, u64) {
        (self.timestamp, self.id)
    }
}

impl From<&Submission> for RawSubmission {
    fn from(sub: &Submission) -> Self {
        RawSubmission {
            id: sub.id,
            title: sub.title.clone(),
            title_slug: Some(sub.slug.clone()),
            status: sub.status.code(),
            lang: sub.lang.clone(),
            timestamp: sub.timestamp.into(),
            difficulty: sub.difficulty.map(|d| d.as_str().to_string()),
            topics: sub.topics.clone(),
        }
    }
}
