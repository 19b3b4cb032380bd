//! Error types for solvelog-core
//!
//! Only I/O-bound paths (event sources, snapshot stores, config) return
//! errors. Data-shape problems inside a batch are reported as
//! [`RejectedRecord`](crate::ingest::RejectedRecord)s and the analytics
//! functions never fail.

use thiserror::Error;

/// Main error type for the solvelog-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Event source failed to deliver a batch
    #[error("source error: {0}")]
    Source(String),

    /// Snapshot store failed to read or write
    #[error("store error: {0}")]
    Store(String),
}

/// Result type alias for solvelog-core
pub type Result<T> = std::result::Result<T, Error>;
