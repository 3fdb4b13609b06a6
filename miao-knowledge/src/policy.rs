//! Threshold gate between ranking and prompt augmentation.

use crate::model::{KnowledgeMatch, ScoredEntry};

/// Default acceptance threshold for CLI and config. Callers are expected to
/// tune it for their knowledge base.
pub const DEFAULT_THRESHOLD: f64 = 0.55;

/// Accept `best` when its score reaches `threshold` (inclusive).
///
/// A rejected or missing candidate means "no locally known answer"; it is
/// never an error.
pub fn decide(best: Option<ScoredEntry>, threshold: f64) -> Option<KnowledgeMatch> {
    best.filter(|candidate| candidate.score >= threshold)
        .map(ScoredEntry::into_match)
}
