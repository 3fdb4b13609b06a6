use super::KnowledgeSearch;
use crate::error::Result;
use crate::model::{KnowledgeBase, ScoredEntry};
use crate::ranker::{Ranker, RankingWeights};
use async_trait::async_trait;
use std::sync::Arc;

/// In-memory hierarchical ranking. Never fails and never suspends.
#[derive(Debug, Clone)]
pub struct LexicalSearch {
    kb: Arc<KnowledgeBase>,
    ranker: Ranker,
}

impl LexicalSearch {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self::with_weights(kb, RankingWeights::default())
    }

    pub fn with_weights(kb: Arc<KnowledgeBase>, weights: RankingWeights) -> Self {
        Self {
            kb,
            ranker: Ranker::new(weights),
        }
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }
}

#[async_trait]
impl KnowledgeSearch for LexicalSearch {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredEntry>> {
        Ok(self.ranker.rank_top_k(query, &self.kb, top_k))
    }

    fn backend_name(&self) -> &str {
        "lexical"
    }
}
