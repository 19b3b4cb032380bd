//! # solvelog-core
//!
//! Core library for solvelog - analytics over a coding-practice submission history.
//!
//! This library provides:
//! - Domain types for raw and normalized submissions
//! - A normalizer that turns raw records into an indexed [`Corpus`](ingest::Corpus)
//! - The aggregation engine: series, rollups, records, trophies, milestones
//! - Renderer-agnostic view models for charts and tables
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Data flows through three layers:
//! - **Raw:** [`RawSubmission`] records from an event file or another [`ingest::SubmissionSource`]
//! - **Canonical:** a deduplicated, chronologically indexed [`ingest::Corpus`]
//! - **Derived:** value types computed per filter and discarded on the next change
//!
//! ## Example
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use solvelog_core::analytics::{compute_cumulative_series, Calendar, FilterSpec};
//! use solvelog_core::ingest::{load_raw_submissions, normalize};
//!
//! let raw = load_raw_submissions(std::path::Path::new("submissions.json")).expect("failed to read events");
//! let outcome = normalize(raw);
//!
//! let filter = FilterSpec::trailing(30, Utc::now());
//! let table = compute_cumulative_series(&outcome.corpus, &filter, &Calendar::Local);
//! println!("{} buckets", table.labels.len());
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use ingest::{normalize, Corpus, NormalizeOutcome, SyncCoordinator, SyncResult};
pub use outcome::Status;
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod error;
pub mod format;
pub mod ingest;
pub mod logging;
pub mod outcome;
pub mod present;
pub mod types;
