//! Hierarchical ranking of knowledge entries against a query.
//!
//! For every entry under category `C` and subcategory `S`:
//!
//! ```text
//! category_bonus = keyword_score(q, C) * w.category + keyword_score(q, S) * w.subcategory
//! final_score    = similarity(q, question) * w.question + category_bonus * w.bonus
//! ```
//!
//! A knowledge base without categories is ranked in flat mode, where the score
//! is the question similarity alone and the weights are not used.
//!
//! The scan is exhaustive. Knowledge bases hold at most a few hundred entries,
//! so there is no index and no pruning.

use crate::error::{KnowledgeError, Result};
use crate::model::{KnowledgeBase, ScoredEntry, flat_tags, hierarchy_tags};
use crate::scoring::NormalizedQuery;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_CATEGORY_WEIGHT: f64 = 0.4;
pub const DEFAULT_SUBCATEGORY_WEIGHT: f64 = 0.6;
pub const DEFAULT_QUESTION_WEIGHT: f64 = 0.5;
pub const DEFAULT_BONUS_WEIGHT: f64 = 0.5;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weights used to combine keyword and question scores.
///
/// `category` + `subcategory` and `question` + `bonus` must each sum to 1 so
/// that the final score stays in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    pub category: f64,
    pub subcategory: f64,
    pub question: f64,
    pub bonus: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            category: DEFAULT_CATEGORY_WEIGHT,
            subcategory: DEFAULT_SUBCATEGORY_WEIGHT,
            question: DEFAULT_QUESTION_WEIGHT,
            bonus: DEFAULT_BONUS_WEIGHT,
        }
    }
}

impl RankingWeights {
    /// Set the category/subcategory split of the keyword bonus.
    pub fn with_keyword_split(mut self, category: f64, subcategory: f64) -> Self {
        self.category = category;
        self.subcategory = subcategory;
        self
    }

    /// Set the question/bonus split of the final score.
    pub fn with_score_split(mut self, question: f64, bonus: f64) -> Self {
        self.question = question;
        self.bonus = bonus;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("category", self.category),
            ("subcategory", self.subcategory),
            ("question", self.question),
            ("bonus", self.bonus),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(KnowledgeError::invalid_config(format!(
                    "{name} weight must be within [0, 1], got {value}"
                )));
            }
        }

        let keyword_sum = self.category + self.subcategory;
        if (keyword_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(KnowledgeError::invalid_config(format!(
                "category and subcategory weights must sum to 1, got {keyword_sum}"
            )));
        }

        let score_sum = self.question + self.bonus;
        if (score_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(KnowledgeError::invalid_config(format!(
                "question and bonus weights must sum to 1, got {score_sum}"
            )));
        }

        Ok(())
    }
}

/// Scores every entry of a knowledge base against a query.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ranker {
    weights: RankingWeights,
}

impl Ranker {
    pub fn new(weights: RankingWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &RankingWeights {
        &self.weights
    }

    /// The single best entry, or `None` when there is nothing to rank.
    ///
    /// Only a strictly greater score replaces the current best, so among
    /// equal scores the entry that comes first in the knowledge base wins.
    pub fn rank(&self, query: &str, kb: &KnowledgeBase) -> Option<ScoredEntry> {
        let mut best: Option<ScoredEntry> = None;
        for candidate in self.score_all(query, kb) {
            if best.as_ref().is_none_or(|b| candidate.score > b.score) {
                best = Some(candidate);
            }
        }

        if let Some(best) = &best {
            debug!("Best match '{}' scored {:.4}", best.question, best.score);
        }
        best
    }

    /// The `k` best entries by descending score; ties keep knowledge-base order.
    pub fn rank_top_k(&self, query: &str, kb: &KnowledgeBase, k: usize) -> Vec<ScoredEntry> {
        let mut scored = self.score_all(query, kb);
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        scored
    }

    /// Every matchable entry with its score, in knowledge-base order.
    pub fn score_all(&self, query: &str, kb: &KnowledgeBase) -> Vec<ScoredEntry> {
        let query = NormalizedQuery::new(query);
        if kb.is_hierarchical() {
            self.score_hierarchical(&query, kb)
        } else {
            score_flat(&query, kb)
        }
    }

    fn score_hierarchical(&self, query: &NormalizedQuery, kb: &KnowledgeBase) -> Vec<ScoredEntry> {
        let w = &self.weights;
        let mut scored = Vec::with_capacity(kb.entry_count());

        for category in kb.categories() {
            let category_score = query.keyword_score(&category.keywords);

            for subcategory in &category.subcategories {
                let subcategory_score = query.keyword_score(&subcategory.keywords);
                let category_bonus = category_score * w.category + subcategory_score * w.subcategory;

                for entry in subcategory.items.iter().filter(|e| e.is_matchable()) {
                    let question_score = query.similarity(&entry.question);
                    let final_score = question_score * w.question + category_bonus * w.bonus;
                    scored.push(ScoredEntry::new(
                        entry,
                        hierarchy_tags(&category.name, &subcategory.name),
                        final_score,
                    ));
                }
            }
        }

        scored
    }
}

fn score_flat(query: &NormalizedQuery, kb: &KnowledgeBase) -> Vec<ScoredEntry> {
    kb.flat_entries()
        .iter()
        .filter(|e| e.is_matchable())
        .map(|entry| ScoredEntry::new(entry, flat_tags(entry), query.similarity(&entry.question)))
        .collect()
}
