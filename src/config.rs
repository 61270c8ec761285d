use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, TmError};
use crate::store::Bm25Params;

/// Translation memory configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Directory holding the document log and pointer tables. `None` keeps
    /// everything in memory.
    pub data_dir: Option<PathBuf>,
    pub analyzer: AnalyzerConfig,
    pub bm25: Bm25Params,
    /// Lower bound on the number of candidates fetched before rescoring
    pub min_candidates: usize,
    /// Maximum number of distinct terms a query may carry
    pub max_query_terms: usize,
    pub rescorer: RescorerConfig,
    /// fsync the document log before publishing a commit
    pub sync_on_commit: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            analyzer: AnalyzerConfig::default(),
            bm25: Bm25Params::default(),
            min_candidates: 10,
            max_query_terms: 1024,
            rescorer: RescorerConfig::default(),
            sync_on_commit: true,
        }
    }
}

impl MemoryConfig {
    /// Create a configuration persisting under `data_dir`
    pub fn persistent(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(data_dir.into()),
            ..Default::default()
        }
    }

    /// Create a purely in-memory configuration
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        serde_json::from_slice(&data)
            .map_err(|e| TmError::InvalidRequest(format!("invalid config {:?}: {}", path, e)))
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }

    pub fn with_min_candidates(mut self, min_candidates: usize) -> Self {
        self.min_candidates = min_candidates;
        self
    }

    pub fn with_sync_on_commit(mut self, sync: bool) -> Self {
        self.sync_on_commit = sync;
        self
    }

    /// Number of candidates to over-fetch for a search returning `limit` entries
    pub fn candidate_count(&self, limit: usize) -> usize {
        self.min_candidates.max(limit.saturating_mul(2))
    }
}

/// Analyzer configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub lowercase: bool,
    pub min_token_length: usize,
    pub max_token_length: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            min_token_length: 1,
            max_token_length: 64,
        }
    }
}

/// Default rescorer configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RescorerConfig {
    /// Share of the final score taken from the context vector weight of the
    /// candidate's domain (0.0 disables context blending)
    pub context_weight: f32,
}

impl Default for RescorerConfig {
    fn default() -> Self {
        Self {
            context_weight: 0.25,
        }
    }
}
