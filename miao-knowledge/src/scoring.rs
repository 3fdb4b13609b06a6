//! Query-to-text similarity and keyword coverage scores.
//!
//! Both scores live in `[0, 1]`. [`similarity`] compares a query with a
//! candidate question; [`keyword_score`] measures how many of a category's
//! keywords appear in the query.
//!
//! Earlier versions of the scorer divided the token overlap by the target's
//! token count (precision against the target). That formula was asymmetric
//! and has been replaced by containment short-circuit plus Jaccard.

use miao_text::{normalize, token_set};
use std::collections::HashSet;

/// Similarity between `target` and `candidate`.
///
/// Returns 0 if either side normalizes to empty, 1 if one normalized string
/// contains the other, and otherwise the Jaccard index of their token sets.
///
/// ```
/// use miao_knowledge::scoring::similarity;
///
/// assert_eq!(similarity("什么是人工智能？", "什么是人工智能"), 1.0);
/// assert_eq!(similarity("rust book", "the rust book"), 1.0);
/// assert_eq!(similarity("", "anything"), 0.0);
/// assert!((similarity("rust async book", "rust sync book") - 0.5).abs() < 1e-9);
/// ```
pub fn similarity(target: &str, candidate: &str) -> f64 {
    NormalizedQuery::new(target).similarity(candidate)
}

/// Fraction of `keywords` contained in the normalized `query`.
///
/// An empty keyword list scores 0. Keywords are normalized the same way as
/// the query and matched by substring containment; a keyword that normalizes
/// to nothing still counts toward the total but never matches.
///
/// ```
/// use miao_knowledge::scoring::keyword_score;
///
/// assert_eq!(keyword_score("什么是人工智能", &["人工智能", "机器学习"]), 0.5);
/// assert_eq!(keyword_score("anything", &[] as &[&str]), 0.0);
/// ```
pub fn keyword_score<S: AsRef<str>>(query: &str, keywords: &[S]) -> f64 {
    NormalizedQuery::new(query).keyword_score(keywords)
}

/// A query normalized and tokenized once, reused across every candidate.
#[derive(Debug, Clone)]
pub struct NormalizedQuery {
    text: String,
    tokens: HashSet<String>,
}

impl NormalizedQuery {
    pub fn new(query: &str) -> Self {
        let text = normalize(query);
        let tokens = token_set(&text);
        Self { text, tokens }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn similarity(&self, candidate: &str) -> f64 {
        let other = normalize(candidate);
        if self.text.is_empty() || other.is_empty() {
            return 0.0;
        }

        if self.text.contains(other.as_str()) || other.contains(self.text.as_str()) {
            return 1.0;
        }

        jaccard(&self.tokens, &token_set(&other))
    }

    pub fn keyword_score<S: AsRef<str>>(&self, keywords: &[S]) -> f64 {
        if keywords.is_empty() {
            return 0.0;
        }

        let hits = keywords
            .iter()
            .map(|keyword| normalize(keyword.as_ref()))
            .filter(|keyword| !keyword.is_empty() && self.text.contains(keyword.as_str()))
            .count();

        hits as f64 / keywords.len() as f64
    }
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "什么是人工智能？",
        "如何使用本地知识库",
        "Hello, World!",
        "rust async runtime",
        "  机器 学习  ",
        "x",
        "深度学习和神经网络的关系",
    ];

    #[test]
    fn test_self_similarity_is_one() {
        for sample in SAMPLES {
            assert_eq!(similarity(sample, sample), 1.0, "sample: {sample}");
        }
    }

    #[test]
    fn test_similarity_is_symmetric() {
        for a in SAMPLES {
            for b in SAMPLES {
                assert_eq!(similarity(a, b), similarity(b, a), "pair: {a} / {b}");
            }
        }
    }

    #[test]
    fn test_similarity_empty_inputs() {
        assert_eq!(similarity("", "什么是人工智能"), 0.0);
        assert_eq!(similarity("什么是人工智能", ""), 0.0);
        assert_eq!(similarity("？！。", "hello"), 0.0);
        assert_eq!(similarity("   ", "   "), 0.0);
    }

    #[test]
    fn test_containment_short_circuit() {
        assert_eq!(similarity("请问什么是人工智能？", "什么是人工智能"), 1.0);
        assert_eq!(similarity("AI", "what is ai"), 1.0);
    }

    #[test]
    fn test_jaccard_on_bigrams() {
        // 人工智能 -> {人工, 工智, 智能}; 人工智慧 -> {人工, 工智, 智慧}
        let score = similarity("人工智能", "人工智慧");
        assert!((score - 0.5).abs() < 1e-9, "score = {score}");
    }

    #[test]
    fn test_no_overlap_scores_zero() {
        assert_eq!(similarity("你好", "什么是人工智能"), 0.0);
        assert_eq!(similarity("hello there", "goodbye now"), 0.0);
    }

    #[test]
    fn test_scores_stay_in_range() {
        for a in SAMPLES {
            for b in SAMPLES {
                let score = similarity(a, b);
                assert!((0.0..=1.0).contains(&score), "{a} / {b} -> {score}");
            }
        }
    }

    #[test]
    fn test_keyword_score_empty_list() {
        let none: [&str; 0] = [];
        assert_eq!(keyword_score("什么是人工智能", &none), 0.0);
        assert_eq!(keyword_score("", &none), 0.0);
    }

    #[test]
    fn test_keyword_score_fraction() {
        let keywords = ["人工智能", "AI", "机器学习", "深度学习"];
        assert_eq!(keyword_score("AI 和人工智能是一回事吗？", &keywords), 0.5);
        assert_eq!(keyword_score("你好", &keywords), 0.0);
    }

    #[test]
    fn test_keyword_normalization() {
        assert_eq!(keyword_score("what is RUST?", &["Rust!"]), 1.0);
    }

    #[test]
    fn test_blank_keyword_counts_but_never_matches() {
        assert_eq!(keyword_score("人工智能", &["人工智能", "？？"]), 0.5);
        assert_eq!(keyword_score("", &[""]), 0.0);
    }

    #[test]
    fn test_normalized_query_reuse() {
        let query = NormalizedQuery::new("  什么是 人工智能？ ");
        assert_eq!(query.as_str(), "什么是 人工智能");
        assert!(!query.is_empty());
        assert_eq!(query.similarity("人工智能"), 1.0);
        assert_eq!(query.keyword_score(&["人工智能", "区块链"]), 0.5);
        assert!(NormalizedQuery::new("！？").is_empty());
    }
}
