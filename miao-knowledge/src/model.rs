//! Knowledge base data model
//!
//! A knowledge base is a tree: categories contain subcategories, which contain
//! question/answer entries. Categories and subcategories carry keyword lists
//! that boost every entry underneath them when the keywords appear in a query.
//!
//! ```text
//! KnowledgeBase
//! ├── Category "人工智能"  keywords: ["人工智能", "ai"]
//! │   └── Subcategory "基础概念"  keywords: ["定义", "是什么"]
//! │       ├── KnowledgeEntry { question, answer }
//! │       └── ...
//! └── ...
//! ```
//!
//! When there are no categories the knowledge base runs in flat mode: a plain
//! list of entries scored by question similarity alone.
//!
//! All types are immutable once loaded. Build them through
//! [`loader`](crate::loader) (which validates untrusted input) or the
//! constructors here, then share the [`KnowledgeBase`] behind an `Arc`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tags attached to matches from flat-mode entries.
pub const FLAT_TAGS: [&str; 2] = ["knowledge-base", "flat"];

/// A single question/answer fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub question: String,
    pub answer: String,
    /// Optional free-form tags; only meaningful for flat-mode entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl KnowledgeEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Entries with a blank question or answer never match.
    pub fn is_matchable(&self) -> bool {
        !self.question.trim().is_empty() && !self.answer.trim().is_empty()
    }
}

/// Second level of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub items: Vec<KnowledgeEntry>,
}

impl Subcategory {
    pub fn new(name: impl Into<String>, keywords: Vec<String>, items: Vec<KnowledgeEntry>) -> Self {
        Self {
            name: name.into(),
            keywords,
            items,
        }
    }
}

/// Top level of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

impl Category {
    pub fn new(
        name: impl Into<String>,
        keywords: Vec<String>,
        subcategories: Vec<Subcategory>,
    ) -> Self {
        Self {
            name: name.into(),
            keywords,
            subcategories,
        }
    }

    /// Number of entries across all subcategories.
    pub fn entry_count(&self) -> usize {
        self.subcategories.iter().map(|s| s.items.len()).sum()
    }
}

/// The full, immutable knowledge base.
///
/// Hierarchical mode is used whenever `categories` is non-empty; the flat
/// entries are only consulted when there are no categories at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default, rename = "items")]
    flat_entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    pub fn new(categories: Vec<Category>, flat_entries: Vec<KnowledgeEntry>) -> Self {
        Self {
            categories,
            flat_entries,
        }
    }

    pub fn hierarchical(categories: Vec<Category>) -> Self {
        Self::new(categories, Vec::new())
    }

    pub fn flat(entries: Vec<KnowledgeEntry>) -> Self {
        Self::new(Vec::new(), entries)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The small built-in knowledge base used when no source is configured.
    pub fn sample() -> Self {
        Self::flat(vec![
            KnowledgeEntry::new(
                "什么是人工智能？",
                "人工智能（AI）是计算机科学的一个分支，它企图了解智能的实质，并生产出一种新的能以人类智能相似的方式做出反应的智能机器。",
            )
            .with_tags(["人工智能", "定义"]),
            KnowledgeEntry::new(
                "如何使用本地知识库？",
                "准备一个 JSON 或 TOML 知识库文件，按照 question 和 answer 的键值对形式补充内容，并通过 --kb 参数加载即可。",
            )
            .with_tags(["使用说明"]),
        ])
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn flat_entries(&self) -> &[KnowledgeEntry] {
        &self.flat_entries
    }

    /// True when the category tree drives ranking.
    pub fn is_hierarchical(&self) -> bool {
        !self.categories.is_empty()
    }

    /// Number of entries that ranking will consider.
    pub fn entry_count(&self) -> usize {
        if self.is_hierarchical() {
            self.categories.iter().map(Category::entry_count).sum()
        } else {
            self.flat_entries.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    /// Every rankable entry with the tags a match on it would carry, in
    /// knowledge-base order.
    pub fn tagged_entries(&self) -> Vec<(&KnowledgeEntry, BTreeSet<String>)> {
        if self.is_hierarchical() {
            self.categories
                .iter()
                .flat_map(|category| {
                    category.subcategories.iter().flat_map(move |subcategory| {
                        subcategory.items.iter().map(move |entry| {
                            (entry, hierarchy_tags(&category.name, &subcategory.name))
                        })
                    })
                })
                .collect()
        } else {
            self.flat_entries
                .iter()
                .map(|entry| (entry, flat_tags(entry)))
                .collect()
        }
    }
}

/// Tags for an entry found under `category` / `subcategory`.
pub fn hierarchy_tags(category: &str, subcategory: &str) -> BTreeSet<String> {
    [category, subcategory]
        .into_iter()
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Tags for a flat-mode entry: the fixed flat marker plus the entry's own tags.
pub fn flat_tags(entry: &KnowledgeEntry) -> BTreeSet<String> {
    FLAT_TAGS
        .iter()
        .map(|tag| tag.to_string())
        .chain(entry.tags.iter().cloned())
        .collect()
}

/// A ranked candidate produced by a search backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEntry {
    pub question: String,
    pub answer: String,
    pub tags: BTreeSet<String>,
    pub score: f64,
}

impl ScoredEntry {
    pub fn new(entry: &KnowledgeEntry, tags: BTreeSet<String>, score: f64) -> Self {
        Self {
            question: entry.question.clone(),
            answer: entry.answer.clone(),
            tags,
            score,
        }
    }

    pub fn into_match(self) -> KnowledgeMatch {
        KnowledgeMatch {
            question: self.question,
            answer: self.answer,
            tags: self.tags,
        }
    }
}

/// An accepted match, handed to the chat pipeline for prompt augmentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeMatch {
    pub question: String,
    pub answer: String,
    pub tags: BTreeSet<String>,
}
