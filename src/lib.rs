//! # loghunt
//!
//! Lucene-style log search for a security training game. Queries such as
//! `status:failed`, `path:*admin* AND hour:[0 TO 5]` or `user:john OR
//! user:mike` run against a small, fixed corpus of authentication logs and
//! come back with the matches plus feedback on whether the query met the
//! player's current mission.
//!
//!
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod judge;
pub mod query;
pub mod types;

use once_cell::sync::Lazy;

// Re-export main types
pub use config::EngineConfig;
pub use corpus::Corpus;
pub use engine::HuntEngine;
pub use error::{CorpusError, QueryError};
pub use query::{parse_clause, parse_query, Clause, Query};
pub use types::{FieldValue, LogEntry, LogRecord, RecordId, SearchOutcome};

static DEFAULT_ENGINE: Lazy<HuntEngine> = Lazy::new(HuntEngine::new);

/// Searches the built-in corpus with default limits.
///
/// `max_results` is clamped into `[1, 100]`. Always returns an outcome.
pub fn search(query: &str, mission_id: Option<&str>, max_results: usize) -> SearchOutcome {
    DEFAULT_ENGINE.search(query, mission_id, max_results)
}
