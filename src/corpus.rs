//! # Record corpus
//!
//! The fixed set of log records every query runs against. The built-in
//! training corpus is materialised once per process and shared through an
//! `Arc`; it is never mutated afterwards, so readers need no locking.

use crate::error::CorpusError;
use crate::types::{FieldValue, LogRecord, RecordId};
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::io::BufRead;
use std::sync::Arc;

static BUILTIN: Lazy<Arc<Corpus>> = Lazy::new(|| {
    let records = builtin_logs()
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| match record_from_json(i, &v) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("skipping built-in record {}: {}", i, e);
                None
            }
        })
        .collect::<Vec<_>>();
    tracing::debug!("built-in corpus ready with {} records", records.len());
    Arc::new(Corpus { records })
});

/// An immutable, ordered collection of log records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    records: Vec<LogRecord>,
}

impl Corpus {
    /// Wraps already-built records. Their order becomes their identity.
    pub fn new(records: Vec<LogRecord>) -> Self {
        Self { records }
    }

    /// The shared training corpus.
    pub fn builtin() -> Arc<Corpus> {
        Arc::clone(&BUILTIN)
    }

    /// Builds a corpus from a JSON array of flat objects.
    pub fn from_json_value(value: &Value) -> Result<Self, CorpusError> {
        let items = value.as_array().ok_or(CorpusError::NotAnArray)?;
        let records = items
            .iter()
            .enumerate()
            .map(|(i, v)| record_from_json(i, v))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!("loaded {} records from JSON array", records.len());
        Ok(Self { records })
    }

    /// Reads JSON Lines: one flat object per line, blank lines skipped.
    pub fn ingest_from_reader<R: BufRead>(reader: R) -> Result<Self, CorpusError> {
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let index = records.len();
            let value: Value = serde_json::from_str(&line).map_err(|source| CorpusError::Json {
                record: index,
                source,
            })?;
            records.push(record_from_json(index, &value)?);
        }
        tracing::info!("loaded {} records from reader", records.len());
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&LogRecord> {
        self.records.get(id.0)
    }

    /// Iterates records together with their ids, in corpus order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &LogRecord)> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| (RecordId(i), record))
    }

    /// Distinct field names across all records, in first-seen order.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for record in &self.records {
            for (name, _) in record.fields() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

fn record_from_json(index: usize, value: &Value) -> Result<LogRecord, CorpusError> {
    let obj = value
        .as_object()
        .ok_or(CorpusError::NotAnObject { record: index })?;
    let mut fields = Vec::with_capacity(obj.len());
    for (key, v) in obj {
        let field = match v {
            Value::String(s) => FieldValue::Str(s.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => {
                    return Err(CorpusError::UnsupportedValue {
                        record: index,
                        field: key.clone(),
                    })
                }
            },
            _ => {
                return Err(CorpusError::UnsupportedValue {
                    record: index,
                    field: key.clone(),
                })
            }
        };
        fields.push((key.clone(), field));
    }
    Ok(LogRecord::new(fields))
}

/// Training data: a day of authentication logs with a brute-force burst
/// from 10.0.50.99 followed by after-hours admin activity from the same host.
fn builtin_logs() -> Vec<Value> {
    vec![
        // normal morning activity
        json!({"timestamp": "2024-01-15 08:59:50", "level": "WARN", "user": "sarah", "action": "login", "status": "failed", "ip": "192.168.1.51", "hour": 8}),
        json!({"timestamp": "2024-01-15 09:00:15", "level": "INFO", "user": "sarah", "action": "login", "status": "success", "ip": "192.168.1.51", "hour": 9}),
        json!({"timestamp": "2024-01-15 09:15:00", "level": "INFO", "user": "sarah", "action": "file_access", "status": "success", "ip": "192.168.1.51", "hour": 9}),
        json!({"timestamp": "2024-01-15 09:30:00", "level": "INFO", "user": "mike", "action": "login", "status": "success", "ip": "192.168.1.52", "hour": 9}),
        // brute force against john
        json!({"timestamp": "2024-01-15 10:45:01", "level": "WARN", "user": "john", "action": "login", "status": "failed", "ip": "10.0.50.99", "hour": 10}),
        json!({"timestamp": "2024-01-15 10:45:05", "level": "WARN", "user": "john", "action": "login", "status": "failed", "ip": "10.0.50.99", "hour": 10}),
        json!({"timestamp": "2024-01-15 10:45:10", "level": "WARN", "user": "john", "action": "login", "status": "failed", "ip": "10.0.50.99", "hour": 10}),
        json!({"timestamp": "2024-01-15 10:45:15", "level": "WARN", "user": "john", "action": "login", "status": "failed", "ip": "10.0.50.99", "hour": 10}),
        json!({"timestamp": "2024-01-15 10:45:20", "level": "WARN", "user": "john", "action": "login", "status": "failed", "ip": "10.0.50.99", "hour": 10}),
        json!({"timestamp": "2024-01-15 10:45:25", "level": "WARN", "user": "john", "action": "login", "status": "success", "ip": "10.0.50.99", "hour": 10}),
        json!({"timestamp": "2024-01-15 11:00:00", "level": "INFO", "user": "sarah", "action": "logout", "status": "success", "ip": "192.168.1.51", "hour": 11}),
        json!({"timestamp": "2024-01-15 14:00:00", "level": "INFO", "user": "admin", "action": "config_change", "status": "success", "ip": "192.168.1.100", "hour": 14}),
        // after hours
        json!({"timestamp": "2024-01-15 23:15:00", "level": "INFO", "user": "admin", "action": "login", "status": "success", "ip": "10.0.50.99", "hour": 23, "path": "/admin/panel"}),
        json!({"timestamp": "2024-01-15 23:20:00", "level": "INFO", "user": "admin", "action": "file_access", "status": "success", "ip": "10.0.50.99", "hour": 23, "path": "/admin/users"}),
        json!({"timestamp": "2024-01-16 02:30:00", "level": "WARN", "user": "unknown", "action": "scan", "status": "blocked", "ip": "10.0.50.99", "hour": 2, "path": "/admin/config"}),
        json!({"timestamp": "2024-01-16 03:17:00", "level": "ERROR", "user": "svc_backup", "action": "database_access", "status": "success", "ip": "10.0.50.99", "hour": 3, "path": "/admin/db"}),
        // next morning
        json!({"timestamp": "2024-01-16 09:00:00", "level": "INFO", "user": "mike", "action": "login", "status": "success", "ip": "192.168.1.52", "hour": 9}),
        json!({"timestamp": "2024-01-16 09:30:00", "level": "INFO", "user": "sarah", "action": "login", "status": "success", "ip": "192.168.1.51", "hour": 9}),
    ]
}
