//! Secondary ranking of retrieval candidates.

mod levenshtein;

pub use levenshtein::{word_edit_distance, LevenshteinRescorer};

use crate::models::{ContextVector, ScoreEntry, Sentence};

/// Reorders search candidates after retrieval.
///
/// Implementations may rewrite `score` on every candidate and must leave
/// `candidates` sorted best first. Identical inputs must yield identical
/// orderings.
pub trait Rescorer: Send + Sync {
    fn rescore(&self, query: &Sentence, candidates: &mut Vec<ScoreEntry>, context: Option<&ContextVector>);
}

impl<F> Rescorer for F
where
    F: Fn(&Sentence, &mut Vec<ScoreEntry>, Option<&ContextVector>) + Send + Sync,
{
    fn rescore(&self, query: &Sentence, candidates: &mut Vec<ScoreEntry>, context: Option<&ContextVector>) {
        self(query, candidates, context)
    }
}

/// Sort candidates by their current scores, best first
pub fn sort_by_score(candidates: &mut [ScoreEntry]) {
    candidates.sort_by(ScoreEntry::rank_cmp);
}
