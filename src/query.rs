//! # Query language
//!
//! A small Lucene-like grammar:
//!
//! - `field:value` case-insensitive exact match on the value's string form
//! - `field:*part*` wildcard, `*` stands for any run of characters and the
//!   pattern may match anywhere inside the value
//! - `field:[min TO max]` inclusive integer range
//! - anything else is a free-text search over every field
//!
//! Terms can be joined with `AND` or with `OR`, but not both: `AND` is looked
//! for first, and when present the whole query is split on it.

use crate::error::QueryError;
use crate::types::LogRecord;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::num::IntErrorKind;

static RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9_]+):\[([0-9]+)\s+TO\s+([0-9]+)\]").expect("range clause regex")
});

static FIELD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9_]+):(.+)").expect("field clause regex"));

static AND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+AND\s+").expect("AND regex"));

static OR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+OR\s+").expect("OR regex"));

/// A predicate over a single record.
#[derive(Debug, Clone)]
pub enum Clause {
    /// Case-insensitive equality against the field's string form.
    Exact { field: String, value: String },
    /// `pattern` is the text as written; `regex` is its compiled,
    /// case-insensitive, unanchored form.
    Wildcard {
        field: String,
        pattern: String,
        regex: Regex,
    },
    /// Inclusive bounds; only integer field values can match.
    Range { field: String, min: i64, max: i64 },
    /// Free text searched in every field. Empty text matches nothing.
    Fallback(String),
}

impl Clause {
    /// Tests the clause against one record. A missing field never matches.
    pub fn matches(&self, record: &LogRecord) -> bool {
        match self {
            Clause::Exact { field, value } => record
                .text(field)
                .is_some_and(|text| text.to_lowercase() == value.to_lowercase()),
            Clause::Wildcard { field, regex, .. } => {
                record.text(field).is_some_and(|text| regex.is_match(&text))
            }
            Clause::Range { field, min, max } => record
                .get(field)
                .and_then(|v| v.as_int())
                .is_some_and(|n| *min <= n && n <= *max),
            Clause::Fallback(text) => {
                if text.is_empty() {
                    return false;
                }
                let needle = text.to_lowercase();
                record
                    .fields()
                    .any(|(_, v)| v.to_string().to_lowercase().contains(&needle))
            }
        }
    }
}

/// A parsed query: one clause, or several joined by a single operator kind.
#[derive(Debug, Clone)]
pub enum Query {
    Single(Clause),
    And(Vec<Clause>),
    Or(Vec<Clause>),
}

impl Query {
    pub fn clauses(&self) -> &[Clause] {
        match self {
            Query::Single(clause) => std::slice::from_ref(clause),
            Query::And(clauses) | Query::Or(clauses) => clauses,
        }
    }
}

/// Parses a complete query.
///
/// Splits on every top-level `AND` (or, failing that, every `OR`) and parses
/// each fragment with [`parse_clause`]. A query mixing both keywords takes the
/// `AND` path, leaving `OR` inside the fragments as literal text.
pub fn parse_query(query: &str) -> Result<Query, QueryError> {
    let query = query.trim();

    if AND_RE.is_match(query) {
        let clauses = split_fragments(&AND_RE, query)?;
        tracing::debug!("AND query with {} fragments", clauses.len());
        return Ok(Query::And(clauses));
    }

    if OR_RE.is_match(query) {
        let clauses = split_fragments(&OR_RE, query)?;
        tracing::debug!("OR query with {} fragments", clauses.len());
        return Ok(Query::Or(clauses));
    }

    Ok(Query::Single(parse_clause(query)?))
}

fn split_fragments(keyword: &Regex, query: &str) -> Result<Vec<Clause>, QueryError> {
    keyword
        .split(query)
        .map(|fragment| parse_clause(fragment.trim()))
        .collect()
}

/// Parses one fragment that contains no boolean keyword.
///
/// Recognition order: range, wildcard, exact, free text. Text that does not
/// look like `field:...` always parses (as [`Clause::Fallback`]); errors only
/// come from a well-shaped clause whose content is unusable. Range bounds
/// beyond `i64::MAX` saturate, since no stored value can exceed them.
pub fn parse_clause(fragment: &str) -> Result<Clause, QueryError> {
    if let Some(caps) = RANGE_RE.captures(fragment) {
        let min = parse_bound(fragment, &caps[2])?;
        let max = parse_bound(fragment, &caps[3])?;
        if min > max {
            tracing::debug!("inverted range {} TO {} in `{}` can never match", min, max, fragment);
        }
        return Ok(Clause::Range {
            field: caps[1].to_string(),
            min,
            max,
        });
    }

    if let Some(caps) = FIELD_RE.captures(fragment) {
        let field = caps[1].to_string();
        let value = caps[2].trim_matches(|c: char| c == '"' || c == '\'');

        if value.contains('*') {
            let regex = wildcard_regex(value)?;
            return Ok(Clause::Wildcard {
                field,
                pattern: value.to_string(),
                regex,
            });
        }

        return Ok(Clause::Exact {
            field,
            value: value.to_string(),
        });
    }

    Ok(Clause::Fallback(fragment.to_string()))
}

fn parse_bound(fragment: &str, digits: &str) -> Result<i64, QueryError> {
    match digits.parse::<i64>() {
        Ok(n) => Ok(n),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(i64::MAX),
        Err(e) => Err(QueryError::MalformedClause {
            fragment: fragment.to_string(),
            reason: format!("range bound `{}` is not a usable integer ({})", digits, e),
        }),
    }
}

/// Escapes everything but `*`, which becomes `.*`.
fn wildcard_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    RegexBuilder::new(&body).case_insensitive(true).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldValue;

    fn record() -> LogRecord {
        LogRecord::new(vec![
            ("user", FieldValue::from("Admin")),
            ("status", FieldValue::from("success")),
            ("ip", FieldValue::from("10.0.50.99")),
            ("hour", FieldValue::Int(23)),
            ("path", FieldValue::from("/admin/panel")),
        ])
    }

    #[test]
    fn recognises_range_first() {
        match parse_clause("hour:[1 TO 5]").unwrap() {
            Clause::Range { field, min, max } => {
                assert_eq!(field, "hour");
                assert_eq!((min, max), (1, 5));
            }
            other => panic!("expected range, got {:?}", other),
        }
    }

    #[test]
    fn lowercase_to_is_not_a_range() {
        assert!(matches!(
            parse_clause("hour:[1 to 5]").unwrap(),
            Clause::Exact { .. }
        ));
    }

    #[test]
    fn strips_quotes_from_values() {
        match parse_clause("status:\"failed\"").unwrap() {
            Clause::Exact { field, value } => {
                assert_eq!(field, "status");
                assert_eq!(value, "failed");
            }
            other => panic!("expected exact, got {:?}", other),
        }
        match parse_clause("path:'*admin*'").unwrap() {
            Clause::Wildcard { pattern, .. } => assert_eq!(pattern, "*admin*"),
            other => panic!("expected wildcard, got {:?}", other),
        }
    }

    #[test]
    fn non_field_text_falls_back() {
        assert!(matches!(parse_clause("failed").unwrap(), Clause::Fallback(t) if t == "failed"));
        assert!(matches!(parse_clause("-x:y").unwrap(), Clause::Fallback(_)));
        assert!(matches!(parse_clause("status:").unwrap(), Clause::Fallback(_)));
    }

    #[test]
    fn exact_match_ignores_case_and_stringifies_integers() {
        let r = record();
        assert!(parse_clause("user:admin").unwrap().matches(&r));
        assert!(parse_clause("hour:23").unwrap().matches(&r));
        assert!(!parse_clause("user:adm").unwrap().matches(&r));
        assert!(!parse_clause("level:INFO").unwrap().matches(&r));
    }

    #[test]
    fn wildcard_searches_anywhere_in_value() {
        let r = record();
        assert!(parse_clause("path:*ADMIN*").unwrap().matches(&r));
        assert!(parse_clause("path:admin*").unwrap().matches(&r));
        assert!(parse_clause("ip:10.0.*").unwrap().matches(&r));
        assert!(!parse_clause("ip:10x0*").unwrap().matches(&r));
        assert!(!parse_clause("details:*admin*").unwrap().matches(&r));
    }

    #[test]
    fn wildcard_treats_regex_metacharacters_literally() {
        let r = LogRecord::new(vec![("path", FieldValue::from("/a(b)/c"))]);
        assert!(parse_clause("path:*(b)*").unwrap().matches(&r));
        assert!(parse_clause("path:*[*").is_ok());
    }

    #[test]
    fn range_is_inclusive_and_integer_only() {
        let r = record();
        assert!(parse_clause("hour:[23 TO 23]").unwrap().matches(&r));
        assert!(parse_clause("hour:[0 TO 23]").unwrap().matches(&r));
        assert!(!parse_clause("hour:[0 TO 22]").unwrap().matches(&r));
        assert!(!parse_clause("hour:[23 TO 5]").unwrap().matches(&r));
        assert!(!parse_clause("ip:[0 TO 99]").unwrap().matches(&r));
        assert!(!parse_clause("minute:[0 TO 99]").unwrap().matches(&r));
    }

    #[test]
    fn oversized_range_bounds_saturate() {
        let r = record();
        match parse_clause("hour:[0 TO 99999999999999999999]").unwrap() {
            Clause::Range { min, max, .. } => assert_eq!((min, max), (0, i64::MAX)),
            other => panic!("expected range, got {:?}", other),
        }
        assert!(parse_clause("hour:[0 TO 99999999999999999999]").unwrap().matches(&r));
        assert!(!parse_clause("hour:[99999999999999999999 TO 5]").unwrap().matches(&r));
        assert!(!parse_clause("hour:[99999999999999999999 TO 99999999999999999999]")
            .unwrap()
            .matches(&r));
    }

    #[test]
    fn non_ascii_digits_are_not_range_bounds() {
        match parse_clause("hour:[\u{663} TO 5]").unwrap() {
            Clause::Exact { field, value } => {
                assert_eq!(field, "hour");
                assert_eq!(value, "[\u{663} TO 5]");
            }
            other => panic!("expected exact, got {:?}", other),
        }
    }

    #[test]
    fn fallback_searches_all_fields_and_empty_matches_nothing() {
        let r = record();
        assert!(Clause::Fallback("50.99".into()).matches(&r));
        assert!(Clause::Fallback("PANEL".into()).matches(&r));
        assert!(!Clause::Fallback("failed".into()).matches(&r));
        assert!(!Clause::Fallback(String::new()).matches(&r));
    }

    #[test]
    fn splits_on_every_and() {
        match parse_query("user:john and status:failed AND ip:10.0.50.99").unwrap() {
            Query::And(clauses) => assert_eq!(clauses.len(), 3),
            other => panic!("expected AND, got {:?}", other),
        }
    }

    #[test]
    fn or_query_when_no_and() {
        match parse_query("user:john OR user:mike or user:sarah").unwrap() {
            Query::Or(clauses) => assert_eq!(clauses.len(), 3),
            other => panic!("expected OR, got {:?}", other),
        }
    }

    #[test]
    fn mixed_operators_take_the_and_path() {
        match parse_query("user:admin AND hour:23 OR hour:2").unwrap() {
            Query::And(clauses) => {
                assert_eq!(clauses.len(), 2);
                assert!(matches!(&clauses[1], Clause::Exact { value, .. } if value == "23 OR hour:2"));
            }
            other => panic!("expected AND, got {:?}", other),
        }
    }

    #[test]
    fn keyword_needs_surrounding_whitespace() {
        assert!(matches!(parse_query("user:ANDY").unwrap(), Query::Single(_)));
        assert!(matches!(parse_query("ORACLE").unwrap(), Query::Single(_)));
    }

    #[test]
    fn single_clause_has_one_fragment() {
        let q = parse_query("  status:failed ").unwrap();
        assert_eq!(q.clauses().len(), 1);
    }
}
