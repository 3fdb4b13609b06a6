//! miao-knowledge: knowledge base matching for the miao chat assistant
//!
//! Given a free-text question and a hand-authored knowledge base
//! (category → subcategory → question/answer), find the best entry and decide
//! whether it is good enough to inject into the LLM prompt.
//!
//! ## Key Modules
//!
//! - **[`model`]**: Knowledge base types and match results
//! - **[`loader`]**: JSON/TOML loading with validation into the strict model
//! - **[`scoring`]**: Similarity and keyword coverage scores
//! - **[`ranker`]**: Hierarchical ranking with injectable weights
//! - **[`policy`]**: Threshold decision
//! - **[`search`]**: Lexical, remote and semantic backends behind one trait
//! - **[`config`]**: Search configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use miao_knowledge::{KnowledgeBase, Ranker, decide};
//!
//! let kb = KnowledgeBase::sample();
//! let best = Ranker::default().rank("什么是人工智能？", &kb);
//! let matched = decide(best, 0.55).expect("sample entry matches");
//! assert!(matched.answer.starts_with("人工智能"));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! query → normalize/tokenize → per-entry scores → best-of → threshold → Option<KnowledgeMatch>
//!                                   ↑
//!              KnowledgeBase ← loader ← JSON / TOML
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod policy;
pub mod ranker;
pub mod scoring;
pub mod search;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::{BackendKind, SearchConfig};
pub use error::{KnowledgeError, Result};
pub use model::{Category, KnowledgeBase, KnowledgeEntry, KnowledgeMatch, ScoredEntry, Subcategory};
pub use policy::{DEFAULT_THRESHOLD, decide};
pub use ranker::{Ranker, RankingWeights};
pub use scoring::{keyword_score, similarity};
pub use search::{KnowledgeSearch, LexicalSearch, RemoteSearch, SemanticSearch, build_backend, find_best_match};
