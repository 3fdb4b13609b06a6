//! Search backends behind a single `search(query, top_k)` contract.
//!
//! - [`LexicalSearch`]: hierarchical keyword and token-overlap ranking, no I/O
//! - [`RemoteSearch`]: a knowledge search service reached over HTTP
//! - [`SemanticSearch`]: embedding similarity with a local model
//!
//! Callers normally go through [`find_best_match`], which applies the
//! threshold and turns every backend failure into "no match".

pub mod lexical;
pub mod remote;
pub mod semantic;

pub use lexical::LexicalSearch;
pub use remote::RemoteSearch;
pub use semantic::SemanticSearch;

use crate::config::{BackendKind, SearchConfig};
use crate::error::{KnowledgeError, Result};
use crate::model::{KnowledgeBase, KnowledgeMatch, ScoredEntry};
use crate::policy::decide;
use async_trait::async_trait;
use miao_embed::{EmbedConfig, FastEmbedProvider};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A ranked search over knowledge entries.
#[async_trait]
pub trait KnowledgeSearch: Send + Sync {
    /// Up to `top_k` candidates, best first.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredEntry>>;

    /// Short identifier used in logs and CLI output.
    fn backend_name(&self) -> &str;
}

/// Best accepted match for `query`, or `None`.
///
/// Backend errors are logged and reported as `None`; callers proceed without
/// augmentation in that case.
pub async fn find_best_match(
    backend: &dyn KnowledgeSearch,
    query: &str,
    top_k: usize,
    threshold: f64,
) -> Option<KnowledgeMatch> {
    match backend.search(query, top_k.max(1)).await {
        Ok(results) => {
            let best = results.into_iter().next();
            debug!(
                "{} backend best score: {:?}",
                backend.backend_name(),
                best.as_ref().map(|b| b.score)
            );
            decide(best, threshold)
        }
        Err(e) => {
            warn!("{} knowledge search failed: {}", backend.backend_name(), e);
            None
        }
    }
}

/// Construct the backend selected by `config`.
///
/// The semantic backend loads its embedding model and embeds the knowledge
/// base (and optional corpus) up front, so this can take a while on first use.
pub async fn build_backend(
    config: &SearchConfig,
    kb: Arc<KnowledgeBase>,
) -> Result<Box<dyn KnowledgeSearch>> {
    config.validate()?;
    info!("Using {} knowledge search backend", config.backend);

    match config.backend {
        BackendKind::Lexical => Ok(Box::new(LexicalSearch::with_weights(kb, config.weights))),
        BackendKind::Remote => Ok(Box::new(RemoteSearch::new(
            &config.remote_url,
            Duration::from_secs(config.remote_timeout_secs),
        )?)),
        BackendKind::Semantic => {
            let mut embed_config = match &config.embed_model {
                Some(model) => EmbedConfig::new(model.clone()),
                None => EmbedConfig::default(),
            };
            embed_config = embed_config.with_cache_dir(&config.model_cache_dir);

            let provider = FastEmbedProvider::create(embed_config).await?;
            let mut backend = SemanticSearch::from_knowledge_base(provider, &kb).await?;
            if let Some(corpus_path) = &config.corpus_path {
                let corpus = read_corpus(corpus_path).await?;
                backend.add_corpus(&corpus).await?;
            }
            Ok(Box::new(backend))
        }
    }
}

async fn read_corpus(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| KnowledgeError::Io {
            path: path.to_path_buf(),
            source,
        })
}
