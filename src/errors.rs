// src/errors.rs
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Keyword dictionary could not be loaded. Fatal: raised before any classification.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("keyword dictionary not found at {0}")]
    Missing(PathBuf),
    #[error("reading keyword dictionary from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("keyword dictionary {origin} is malformed: {reason}")]
    Malformed { origin: String, reason: String },
}

/// A record that cannot be read, bucketed or location-resolved.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DataError {
    /// Source element that does not deserialize into an item.
    #[error("record {record_id}: malformed item: {reason}")]
    Malformed { record_id: String, reason: String },
    #[error("record {record_id}: unparseable timestamp `{timestamp}`")]
    Timestamp {
        record_id: String,
        timestamp: String,
    },
    #[error("record {record_id}: no region and no language to fall back on")]
    Location { record_id: String },
}

impl DataError {
    /// Identity of the offending record.
    pub fn record_id(&self) -> &str {
        match self {
            DataError::Malformed { record_id, .. }
            | DataError::Timestamp { record_id, .. }
            | DataError::Location { record_id } => record_id,
        }
    }
}
