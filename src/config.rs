//! Engine configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Limits and data source for a [`crate::HuntEngine`].
///
/// Every field has a default, so a config file only needs the keys it wants
/// to change.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Hard upper bound on results returned by one search.
    pub max_results_ceiling: usize,
    /// Used when the caller does not ask for a specific result count.
    pub default_max_results: usize,
    /// Longer queries are rejected with a query error outcome.
    pub max_query_chars: usize,
    /// JSON Lines file to search instead of the built-in corpus.
    pub corpus_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_results_ceiling: 100,
            default_max_results: 100,
            max_query_chars: 1000,
            corpus_path: None,
        }
    }
}

impl EngineConfig {
    /// Reads a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> std::io::Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Clamps a requested result count into `[1, max_results_ceiling]`.
    pub fn clamp_max_results(&self, requested: usize) -> usize {
        requested.clamp(1, self.max_results_ceiling.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{"max_results_ceiling": 25}"#).unwrap();
        assert_eq!(config.max_results_ceiling, 25);
        assert_eq!(config.max_query_chars, 1000);
        assert_eq!(config.corpus_path, None);
    }

    #[test]
    fn clamps_requested_results() {
        let config = EngineConfig::default();
        assert_eq!(config.clamp_max_results(0), 1);
        assert_eq!(config.clamp_max_results(10), 10);
        assert_eq!(config.clamp_max_results(5000), 100);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_query_chars": 64, "corpus_path": "logs.jsonl"}}"#).unwrap();
        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_query_chars, 64);
        assert_eq!(config.corpus_path, Some(PathBuf::from("logs.jsonl")));
    }

    #[test]
    fn invalid_json_is_invalid_data() {
        let err = EngineConfig::from_json_str("{not json").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
