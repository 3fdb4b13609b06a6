//! Integration tests for end-to-end knowledge matching
//!
//! These tests verify the behaviours the chat pipeline relies on:
//! - Scoring properties (idempotent normalization, symmetric similarity)
//! - Hierarchical ranking with keyword bonuses
//! - Flat-mode fallback
//! - Threshold decisions and the no-match path
//! - Loading a knowledge base from disk and searching it

use anyhow::Result;
use miao_knowledge::{
    Category, KnowledgeBase, KnowledgeEntry, LexicalSearch, Ranker, RankingWeights, Subcategory,
    decide, find_best_match, keyword_score, loader, similarity,
};
use miao_text::normalize;
use std::sync::Arc;
use tempfile::tempdir;

fn keywords(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn ai_category(name: &str, category_keywords: &[&str], question: &str, answer: &str) -> Category {
    Category::new(
        name,
        keywords(category_keywords),
        vec![Subcategory::new(
            format!("{name}-基础"),
            Vec::new(),
            vec![KnowledgeEntry::new(question, answer)],
        )],
    )
}

/// Test that normalization is idempotent across scripts
#[test]
fn test_normalize_idempotent() {
    let inputs = [
        "什么是人工智能？",
        "  Hello,   WORLD!! ",
        "a - b — c",
        "机器学习（ML）与 深度学习",
        "",
        "   ",
        "ÄÖÜ straße",
    ];
    for input in inputs {
        let once = normalize(input);
        assert_eq!(normalize(&once), once, "input: {input:?}");
    }
}

/// Test similarity identity, symmetry and empty handling
#[test]
fn test_similarity_properties() {
    let texts = ["什么是人工智能", "如何使用本地知识库", "rust async", "你好"];
    for a in texts {
        assert_eq!(similarity(a, a), 1.0);
        assert_eq!(similarity(a, ""), 0.0);
        assert_eq!(similarity("？？", a), 0.0);
        for b in texts {
            assert_eq!(similarity(a, b), similarity(b, a));
        }
    }
}

/// Test that an empty keyword list never contributes
#[test]
fn test_keyword_score_empty_list() {
    let empty: Vec<String> = Vec::new();
    for query in ["什么是人工智能", "", "hello"] {
        assert_eq!(keyword_score(query, &empty), 0.0);
    }
}

/// Exact question plus full keyword coverage scores exactly 1
#[test]
fn test_exact_match_scores_one() {
    let kb = KnowledgeBase::hierarchical(vec![Category::new(
        "人工智能",
        keywords(&["人工智能"]),
        vec![Subcategory::new(
            "定义",
            keywords(&["什么是"]),
            vec![KnowledgeEntry::new("什么是人工智能", "AI")],
        )],
    )]);

    let best = Ranker::default().rank("什么是人工智能", &kb).unwrap();
    assert_eq!(best.score, 1.0);
    assert_eq!(best.answer, "AI");
}

/// Matching category keywords win over an identical question elsewhere
#[test]
fn test_matching_category_is_preferred() {
    let kb = KnowledgeBase::hierarchical(vec![
        ai_category("编程", &["rust", "代码"], "它有什么用", "编程答案"),
        ai_category("人工智能", &["人工智能"], "它有什么用", "AI 答案"),
    ]);

    // Keyword weight dominates: only the bonus separates the two entries.
    let ranker = Ranker::new(RankingWeights::default().with_score_split(0.2, 0.8));
    let best = ranker.rank("人工智能它有什么用", &kb).unwrap();
    assert_eq!(best.answer, "AI 答案");
    assert!(best.tags.contains("人工智能"));

    // Same result with the default weights.
    let best = Ranker::default().rank("人工智能它有什么用", &kb).unwrap();
    assert_eq!(best.answer, "AI 答案");
}

/// Decision is boundary inclusive
#[test]
fn test_decide_boundary() {
    let kb = KnowledgeBase::flat(vec![KnowledgeEntry::new("人工智能", "AI")]);
    let best = Ranker::default().rank("人工智慧", &kb);
    let score = best.as_ref().unwrap().score;

    assert!(decide(best.clone(), score).is_some());
    assert!(decide(best, score + 1e-9).is_none());
}

/// Strong containment fires for the sample question regardless of threshold
#[tokio::test]
async fn test_containment_scenario() -> Result<()> {
    let kb = Arc::new(KnowledgeBase::flat(vec![KnowledgeEntry::new(
        "什么是人工智能？",
        "人工智能是计算机科学的一个分支。",
    )]));
    let search = LexicalSearch::new(kb);

    assert_eq!(similarity("什么是人工智能？", "什么是人工智能？"), 1.0);
    for threshold in [0.0, 0.2, 0.45, 0.55, 1.0] {
        let matched = find_best_match(&search, "什么是人工智能？", 3, threshold).await;
        assert!(matched.is_some(), "threshold {threshold}");
    }
    Ok(())
}

/// Greeting with no overlap never matches the AI knowledge base
#[tokio::test]
async fn test_greeting_scenario() -> Result<()> {
    let kb = Arc::new(KnowledgeBase::hierarchical(vec![Category::new(
        "人工智能",
        keywords(&["人工智能", "机器学习"]),
        vec![Subcategory::new(
            "基础",
            keywords(&["定义"]),
            vec![
                KnowledgeEntry::new("什么是人工智能？", "AI"),
                KnowledgeEntry::new("人工智能有哪些应用？", "很多"),
            ],
        )],
    )]));
    let search = LexicalSearch::new(kb);

    for threshold in [0.1, 0.2, 0.55, 0.9] {
        assert!(find_best_match(&search, "你好", 3, threshold).await.is_none());
    }
    Ok(())
}

/// Flat mode ignores weights entirely
#[test]
fn test_flat_mode_fallback() {
    let kb = KnowledgeBase::flat(vec![
        KnowledgeEntry::new("什么是人工智能？", "AI"),
        KnowledgeEntry::new("如何使用本地知识库？", "编辑文件"),
    ]);

    let skewed = Ranker::new(
        RankingWeights::default()
            .with_keyword_split(1.0, 0.0)
            .with_score_split(0.1, 0.9),
    );
    for query in ["人工智能", "本地知识库怎么用", "你好"] {
        let default_best = Ranker::default().rank(query, &kb).unwrap();
        let skewed_best = skewed.rank(query, &kb).unwrap();
        assert_eq!(default_best, skewed_best);
        assert_eq!(
            default_best.score,
            kb.flat_entries()
                .iter()
                .map(|e| similarity(query, &e.question))
                .fold(0.0, f64::max)
        );
    }

    let best = Ranker::default().rank("什么是人工智能", &kb).unwrap();
    assert_eq!(best.score, 1.0);
    assert!(best.tags.contains("flat"));
}

/// Degenerate queries never match
#[tokio::test]
async fn test_empty_query_is_no_match() -> Result<()> {
    let search = LexicalSearch::new(Arc::new(KnowledgeBase::sample()));
    for query in ["", "   ", "？！。"] {
        assert!(find_best_match(&search, query, 3, 0.1).await.is_none());
    }
    Ok(())
}

/// Load a knowledge base from disk and search it end to end
#[tokio::test]
async fn test_load_and_search() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("kb.json");
    std::fs::write(
        &path,
        r#"{
            "categories": [{
                "name": "使用说明",
                "keywords": ["知识库"],
                "subcategories": [{
                    "name": "配置",
                    "keywords": ["加载", "文件"],
                    "items": [
                        {"question": "如何加载知识库文件？", "answer": "使用 --kb 参数。"},
                        {"question": "", "answer": "dropped"}
                    ]
                }]
            }]
        }"#,
    )?;

    let (kb, report) = loader::load(&path)?;
    assert_eq!(report.entries, 1);
    assert_eq!(report.dropped_entries, 1);

    let search = LexicalSearch::new(Arc::new(kb));
    let matched = find_best_match(&search, "怎么加载知识库文件", 3, 0.5)
        .await
        .expect("query shares keywords and bigrams with the entry");
    assert_eq!(matched.answer, "使用 --kb 参数。");
    assert!(matched.tags.contains("使用说明"));
    assert!(matched.tags.contains("配置"));

    // A broken file degrades to an empty knowledge base and no match.
    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "{ not json")?;
    let search = LexicalSearch::new(Arc::new(loader::load_or_empty(&broken)));
    assert!(find_best_match(&search, "怎么加载知识库文件", 3, 0.0).await.is_none());
    Ok(())
}
