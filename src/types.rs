//! # Core types
//!
//! Log records, their field values, the identities used to combine match
//! sets, and the outcome handed back to callers of a search.

use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

/// A record's position in the corpus. Two records with identical fields still
/// have distinct ids, so AND/OR composition never merges them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub usize);

/// Ordered list of matching record ids. The reference corpus is tiny, so most
/// match sets never leave the inline buffer.
pub type MatchSet = SmallVec<[RecordId; 16]>;

/// A single field value. Only integers and strings occur in log records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Int(i64),
    Str(String),
}

impl FieldValue {
    /// Returns the integer payload, or `None` for string values.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            FieldValue::Str(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

/// An immutable structured log record.
///
/// Fields keep their insertion order. Records are heterogeneous: not every
/// record carries every field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogRecord {
    fields: Vec<(String, FieldValue)>,
}

impl LogRecord {
    /// Builds a record from `(name, value)` pairs. A repeated name keeps its
    /// first value.
    pub fn new<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut out: Vec<(String, FieldValue)> = Vec::new();
        for (k, v) in fields {
            let k = k.into();
            if !out.iter().any(|(name, _)| *name == k) {
                out.push((k, v.into()));
            }
        }
        Self { fields: out }
    }

    /// Looks up a field by exact name.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// String form of a field, if present.
    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field).map(|v| v.to_string())
    }

    /// Iterates fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The projection of a [`LogRecord`] returned to callers.
///
/// Absent source fields surface as `None`. `details` carries the record's
/// `path` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub timestamp: Option<String>,
    pub level: Option<String>,
    pub user: Option<String>,
    pub action: Option<String>,
    pub status: Option<String>,
    pub ip: Option<String>,
    pub details: Option<String>,
}

impl From<&LogRecord> for LogEntry {
    fn from(record: &LogRecord) -> Self {
        Self {
            timestamp: record.text("timestamp"),
            level: record.text("level"),
            user: record.text("user"),
            action: record.text("action"),
            status: record.text("status"),
            ip: record.text("ip"),
            details: record.text("path"),
        }
    }
}

/// The full response to a search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    /// The query as received, trimmed.
    pub query: String,
    /// Number of entries in `results`, i.e. the count after capping.
    pub total_matches: usize,
    pub results: Vec<LogEntry>,
    pub is_correct: bool,
    pub feedback: String,
}

impl SearchOutcome {
    /// An outcome with no matches, judged incorrect.
    pub fn empty(query: impl Into<String>, feedback: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            total_matches: 0,
            results: Vec::new(),
            is_correct: false,
            feedback: feedback.into(),
        }
    }
}
