//! # Hunt engine
//!
//! Evaluates parsed queries against a [`Corpus`] and wraps the result into a
//! [`SearchOutcome`]. The engine only reads its corpus, so one instance can be
//! shared across threads without locking.

use crate::config::EngineConfig;
use crate::corpus::Corpus;
use crate::error::{CorpusError, QueryError};
use crate::judge::{self, EMPTY_QUERY_FEEDBACK};
use crate::query::{parse_query, Clause, Query};
use crate::types::{LogEntry, MatchSet, RecordId, SearchOutcome};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

/// Query evaluator bound to one corpus.
#[derive(Debug, Clone)]
pub struct HuntEngine {
    corpus: Arc<Corpus>,
    config: EngineConfig,
}

impl Default for HuntEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HuntEngine {
    /// Creates an engine over the built-in corpus with default limits.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an engine over the built-in corpus. `corpus_path` is ignored;
    /// use [`HuntEngine::from_config`] to honour it.
    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_corpus(Corpus::builtin(), config)
    }

    pub fn with_corpus(corpus: Arc<Corpus>, config: EngineConfig) -> Self {
        Self { corpus, config }
    }

    /// Creates an engine, loading `config.corpus_path` when it is set.
    pub fn from_config(config: EngineConfig) -> Result<Self, CorpusError> {
        let corpus = match &config.corpus_path {
            Some(path) => {
                tracing::info!("loading corpus from {}", path.display());
                let reader = BufReader::new(File::open(path)?);
                Arc::new(Corpus::ingest_from_reader(reader)?)
            }
            None => Corpus::builtin(),
        };
        Ok(Self::with_corpus(corpus, config))
    }

    /// Creates an engine from a JSON configuration file. Problems with the
    /// config file itself are reported as [`CorpusError::Config`].
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let config = EngineConfig::from_file(path).map_err(CorpusError::Config)?;
        Self::from_config(config)
    }

    pub fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs a search and judges it. Never fails: blank, oversized and
    /// malformed queries all come back as zero-match outcomes.
    pub fn search(&self, query: &str, mission_id: Option<&str>, max_results: usize) -> SearchOutcome {
        let query = query.trim();
        if query.is_empty() {
            return SearchOutcome::empty(query, EMPTY_QUERY_FEEDBACK);
        }

        let mut ids = match self.query_ids(query) {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!("rejected query: {}", e);
                return SearchOutcome::empty(query, judge::query_error_feedback(&e.to_string()));
            }
        };
        ids.truncate(self.config.clamp_max_results(max_results));

        let results = self.entries(&ids);
        let fields = self.corpus.field_names();
        let verdict = judge::assess(query, mission_id, &results, &fields);
        tracing::debug!(
            "query `{}` (mission {:?}) -> {} matches, correct={}",
            query,
            mission_id,
            results.len(),
            verdict.is_correct
        );

        SearchOutcome {
            query: query.to_string(),
            total_matches: results.len(),
            results,
            is_correct: verdict.is_correct,
            feedback: verdict.feedback,
        }
    }

    /// Parses and evaluates a query, returning every matching record id.
    pub fn query_ids(&self, query: &str) -> Result<MatchSet, QueryError> {
        let len = query.chars().count();
        if len > self.config.max_query_chars {
            return Err(QueryError::TooLong {
                len,
                max: self.config.max_query_chars,
            });
        }
        let ast = parse_query(query)?;
        Ok(self.execute(&ast))
    }

    /// Like [`HuntEngine::query_ids`] but projects the matches.
    pub fn query_entries(&self, query: &str) -> Result<Vec<LogEntry>, QueryError> {
        let ids = self.query_ids(query)?;
        Ok(self.entries(&ids))
    }

    /// Evaluates a parsed query.
    ///
    /// A single clause yields corpus order. `And` keeps the first fragment's
    /// order and drops ids missing from any later fragment. `Or` appends each
    /// fragment's new ids in the order they are first seen.
    pub fn execute(&self, query: &Query) -> MatchSet {
        match query {
            Query::Single(clause) => self.exec_clause(clause),

            Query::And(clauses) => {
                let mut iter = clauses.iter();
                let Some(first) = iter.next() else {
                    return MatchSet::new();
                };
                let mut result = self.exec_clause(first);
                for clause in iter {
                    if result.is_empty() {
                        break;
                    }
                    let other = self.exec_clause(clause);
                    result.retain(|id| other.contains(&*id));
                }
                result
            }

            Query::Or(clauses) => {
                let mut result = MatchSet::new();
                for clause in clauses {
                    for id in self.exec_clause(clause) {
                        if !result.contains(&id) {
                            result.push(id);
                        }
                    }
                }
                result
            }
        }
    }

    fn exec_clause(&self, clause: &Clause) -> MatchSet {
        self.corpus
            .iter()
            .filter(|(_, record)| clause.matches(record))
            .map(|(id, _)| id)
            .collect()
    }

    fn entries(&self, ids: &[RecordId]) -> Vec<LogEntry> {
        ids.iter()
            .filter_map(|id| self.corpus.get(*id))
            .map(LogEntry::from)
            .collect()
    }
}
