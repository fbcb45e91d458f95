//! Error types for query parsing and corpus loading.

use thiserror::Error;

/// Raised while turning query text into a [`crate::query::Query`].
///
/// These never escape [`crate::HuntEngine::search`]; the engine folds them
/// into a zero-match outcome with a "query error" message.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("query is {len} characters long, the limit is {max}")]
    TooLong { len: usize, max: usize },

    #[error("malformed clause `{fragment}`: {reason}")]
    MalformedClause { fragment: String, reason: String },

    #[error("invalid wildcard pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Raised while building a [`crate::corpus::Corpus`] from external data, or
/// while reading the engine config that points at it.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[source] std::io::Error),

    #[error("invalid JSON on record {record}: {source}")]
    Json {
        record: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("record {record} is not a JSON object")]
    NotAnObject { record: usize },

    #[error("record {record}: field `{field}` must be an integer or a string")]
    UnsupportedValue { record: usize, field: String },

    #[error("corpus source must be a JSON array of objects")]
    NotAnArray,
}
