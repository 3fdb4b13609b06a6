use super::KnowledgeSearch;
use crate::error::Result;
use crate::model::{KnowledgeBase, KnowledgeEntry, ScoredEntry};
use async_trait::async_trait;
use half::f16;
use miao_embed::{EmbeddingProvider, cosine_similarity};
use miao_text::{DEFAULT_PASSAGE_CHARS, chunk_paragraphs};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Tags attached to corpus passages.
pub const CORPUS_TAGS: [&str; 2] = ["RAG", "corpus"];

#[derive(Debug, Clone)]
struct Document {
    entry: KnowledgeEntry,
    tags: BTreeSet<String>,
    embedding: Vec<f16>,
}

/// Ranks entries and corpus passages by embedding similarity to the query.
///
/// Knowledge entries are embedded by their question. Corpus passages are
/// embedded by their text and returned with the passage as both question and
/// answer.
pub struct SemanticSearch<P: EmbeddingProvider> {
    provider: P,
    documents: Vec<Document>,
    passage_chars: usize,
}

impl<P: EmbeddingProvider> std::fmt::Debug for SemanticSearch<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticSearch")
            .field("provider", &self.provider.provider_name())
            .field("documents", &self.documents.len())
            .field("passage_chars", &self.passage_chars)
            .finish()
    }
}

impl<P: EmbeddingProvider> SemanticSearch<P> {
    /// An index with no documents yet.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            documents: Vec::new(),
            passage_chars: DEFAULT_PASSAGE_CHARS,
        }
    }

    /// Embed every matchable entry of `kb`.
    pub async fn from_knowledge_base(provider: P, kb: &KnowledgeBase) -> Result<Self> {
        let mut search = Self::new(provider);
        search.add_knowledge_base(kb).await?;
        Ok(search)
    }

    pub fn with_passage_chars(mut self, passage_chars: usize) -> Self {
        self.passage_chars = passage_chars;
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub async fn add_knowledge_base(&mut self, kb: &KnowledgeBase) -> Result<usize> {
        let tagged: Vec<(KnowledgeEntry, BTreeSet<String>)> = kb
            .tagged_entries()
            .into_iter()
            .filter(|(entry, _)| entry.is_matchable())
            .map(|(entry, tags)| (entry.clone(), tags))
            .collect();
        let texts: Vec<String> = tagged.iter().map(|(e, _)| e.question.clone()).collect();

        let added = self.add_documents(tagged, texts).await?;
        info!("Embedded {} knowledge entries", added);
        Ok(added)
    }

    /// Chunk `corpus` into passages and embed them.
    pub async fn add_corpus(&mut self, corpus: &str) -> Result<usize> {
        let tags: BTreeSet<String> = CORPUS_TAGS.iter().map(|t| t.to_string()).collect();
        let passages = chunk_paragraphs(corpus, self.passage_chars);
        let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
        let tagged = passages
            .into_iter()
            .map(|p| (KnowledgeEntry::new(p.text.clone(), p.text), tags.clone()))
            .collect();

        let added = self.add_documents(tagged, texts).await?;
        info!("Embedded {} corpus passages", added);
        Ok(added)
    }

    async fn add_documents(
        &mut self,
        tagged: Vec<(KnowledgeEntry, BTreeSet<String>)>,
        texts: Vec<String>,
    ) -> Result<usize> {
        if texts.is_empty() {
            return Ok(0);
        }

        let result = self.provider.embed_texts(&texts).await?;
        let added = tagged.len().min(result.embeddings.len());
        self.documents.extend(
            tagged
                .into_iter()
                .zip(result.embeddings)
                .map(|((entry, tags), embedding)| Document {
                    entry,
                    tags,
                    embedding,
                }),
        );
        Ok(added)
    }
}

#[async_trait]
impl<P: EmbeddingProvider> KnowledgeSearch for SemanticSearch<P> {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredEntry>> {
        if query.trim().is_empty() || self.documents.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.provider.embed_text(query).await?;
        let mut scored: Vec<ScoredEntry> = self
            .documents
            .iter()
            .map(|doc| {
                let score = f64::from(cosine_similarity(&query_embedding, &doc.embedding));
                ScoredEntry::new(&doc.entry, doc.tags.clone(), score)
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        debug!(
            "Semantic search over {} documents, best score {:?}",
            self.documents.len(),
            scored.first().map(|s| s.score)
        );
        Ok(scored)
    }

    fn backend_name(&self) -> &str {
        "semantic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::KnowledgeEntry;
    use crate::search::find_best_match;
    use miao_embed::{EmbeddingResult, Result as EmbedResult};

    /// Character-bigram hashing into a small fixed vector.
    struct BigramProvider;

    const DIM: usize = 64;

    fn embed(text: &str) -> Vec<f16> {
        let mut v = vec![0.0f32; DIM];
        for token in miao_text::tokenize(text) {
            let bucket = token.chars().map(|c| c as usize).sum::<usize>() % DIM;
            v[bucket] += 1.0;
        }
        v.into_iter().map(f16::from_f32).collect()
    }

    #[async_trait]
    impl EmbeddingProvider for BigramProvider {
        async fn embed_text(&self, text: &str) -> EmbedResult<Vec<f16>> {
            Ok(embed(text))
        }

        async fn embed_texts(&self, texts: &[String]) -> EmbedResult<EmbeddingResult> {
            Ok(EmbeddingResult::new(texts.iter().map(|t| embed(t)).collect()))
        }

        fn embedding_dimension(&self) -> usize {
            DIM
        }

        fn provider_name(&self) -> &str {
            "bigram"
        }
    }

    fn kb() -> KnowledgeBase {
        KnowledgeBase::flat(vec![
            KnowledgeEntry::new("什么是人工智能？", "AI 是计算机科学的分支"),
            KnowledgeEntry::new("如何使用本地知识库？", "编辑知识库文件"),
            KnowledgeEntry::new("", "skipped"),
        ])
    }

    #[tokio::test]
    async fn test_entries_are_embedded() {
        let search = SemanticSearch::from_knowledge_base(BigramProvider, &kb()).await.unwrap();
        assert_eq!(search.len(), 2);
        assert_eq!(search.backend_name(), "semantic");
    }

    #[tokio::test]
    async fn test_search_ranks_closest_question_first() {
        let search = SemanticSearch::from_knowledge_base(BigramProvider, &kb()).await.unwrap();
        let results = search.search("什么是人工智能", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].question, "什么是人工智能？");
        assert!((results[0].score - 1.0).abs() < 1e-3);
        assert!(results[0].score >= results[1].score);
        assert!(results[0].tags.contains("flat"));
    }

    #[tokio::test]
    async fn test_corpus_passages_are_searchable() {
        let mut search = SemanticSearch::new(BigramProvider).with_passage_chars(20);
        let corpus = "机器学习是人工智能的子领域\n\n向量数据库用于存储嵌入";
        assert_eq!(search.add_corpus(corpus).await.unwrap(), 2);

        let matched = find_best_match(&search, "向量数据库用于存储嵌入", 3, 0.9)
            .await
            .unwrap();
        assert_eq!(matched.answer, "向量数据库用于存储嵌入");
        assert!(matched.tags.contains("corpus"));
    }

    #[tokio::test]
    async fn test_empty_query_or_index_returns_nothing() {
        let search = SemanticSearch::new(BigramProvider);
        assert!(search.is_empty());
        assert!(search.search("anything", 3).await.unwrap().is_empty());

        let search = SemanticSearch::from_knowledge_base(BigramProvider, &kb()).await.unwrap();
        assert!(search.search("   ", 3).await.unwrap().is_empty());
    }
}
