use crate::error::{KnowledgeError, Result};
use crate::policy::DEFAULT_THRESHOLD;
use crate::ranker::RankingWeights;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_REMOTE_URL: &str = "http://localhost:3000";
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 10;

/// Which implementation answers `search(query, top_k)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Keyword and token-overlap ranking over the in-memory knowledge base
    Lexical,
    /// Delegate to a knowledge search service over HTTP
    Remote,
    /// Rank by embedding similarity with a local model
    Semantic,
}

impl BackendKind {
    /// Check if this backend needs network access at query time
    pub fn is_remote(&self) -> bool {
        matches!(self, BackendKind::Remote)
    }

    /// Check if this backend needs an embedding model
    pub fn needs_model(&self) -> bool {
        matches!(self, BackendKind::Semantic)
    }
}

impl Default for BackendKind {
    fn default() -> Self {
        Self::Lexical
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Lexical => write!(f, "lexical"),
            BackendKind::Remote => write!(f, "remote"),
            BackendKind::Semantic => write!(f, "semantic"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lexical" | "local" | "keyword" => Ok(BackendKind::Lexical),
            "remote" | "http" | "server" => Ok(BackendKind::Remote),
            "semantic" | "embedding" | "rag" => Ok(BackendKind::Semantic),
            _ => Err(format!(
                "Invalid search backend: '{s}'. Valid values are: lexical, remote, semantic"
            )),
        }
    }
}

/// Configuration for knowledge search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Minimum score for a match to be accepted (inclusive)
    pub threshold: f64,
    /// Number of candidates requested from the backend
    pub top_k: usize,
    /// Ranking weights for the lexical backend
    pub weights: RankingWeights,
    pub backend: BackendKind,
    /// Base URL of the remote knowledge service
    pub remote_url: String,
    pub remote_timeout_secs: u64,
    /// Embedding model for the semantic backend; `None` uses the embed crate's default
    pub embed_model: Option<String>,
    /// Directory for downloaded embedding models
    pub model_cache_dir: PathBuf,
    /// Knowledge base file (JSON or TOML); `None` uses the built-in sample
    pub knowledge_path: Option<PathBuf>,
    /// Free-text corpus chunked into passages for the semantic backend
    pub corpus_path: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            top_k: DEFAULT_TOP_K,
            weights: RankingWeights::default(),
            backend: BackendKind::default(),
            remote_url: DEFAULT_REMOTE_URL.to_string(),
            remote_timeout_secs: DEFAULT_REMOTE_TIMEOUT_SECS,
            embed_model: None,
            model_cache_dir: PathBuf::from("models"),
            knowledge_path: None,
            corpus_path: None,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_weights(mut self, weights: RankingWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_remote_url<S: Into<String>>(mut self, url: S) -> Self {
        self.remote_url = url.into();
        self
    }

    pub fn with_embed_model<S: Into<String>>(mut self, model: S) -> Self {
        self.embed_model = Some(model.into());
        self
    }

    pub fn with_knowledge_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.knowledge_path = Some(path.into());
        self
    }

    pub fn with_corpus_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.corpus_path = Some(path.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() {
            return Err(KnowledgeError::invalid_config("threshold must be a finite number"));
        }
        if self.top_k == 0 {
            return Err(KnowledgeError::invalid_config("top_k must be at least 1"));
        }
        self.weights.validate()?;

        if self.backend.is_remote() {
            if !(self.remote_url.starts_with("http://") || self.remote_url.starts_with("https://")) {
                return Err(KnowledgeError::invalid_config(format!(
                    "remote_url must be an http(s) URL, got '{}'",
                    self.remote_url
                )));
            }
            if self.remote_timeout_secs == 0 {
                return Err(KnowledgeError::invalid_config(
                    "remote_timeout_secs must be greater than 0",
                ));
            }
        }

        Ok(())
    }

    /// Load and validate a configuration file; missing keys take their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            KnowledgeError::invalid_config(format!("{}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }
}
