// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod dictionary;
pub mod errors;
pub mod matching;
pub mod model;
pub mod pipeline;
pub mod sink;
pub mod telemetry;
pub mod week;

// Source collaborators (providers + normalization)
pub mod ingest;

// ---- Re-exports for stable public API ----
pub use crate::aggregator::{aggregate, aggregate_lenient};
pub use crate::classifier::Classifier;
pub use crate::dictionary::KeywordDictionary;
pub use crate::errors::{ConfigError, DataError};
pub use crate::model::{AggregateRow, ClassificationRecord, Location, LocationKind, RawItem};
pub use crate::pipeline::{DataErrorPolicy, RunReport};
