use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::domain::DomainId;
use super::sentence::Sentence;
use super::unit::Alignment;
use crate::lang::LanguagePair;

/// A prior translation retrieved for a query sentence
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub direction: LanguagePair,
    pub domain: DomainId,
    pub source: Sentence,
    pub target: Sentence,
    pub alignment: Alignment,
    pub score: f32,
}

impl ScoreEntry {
    pub fn new(direction: LanguagePair, domain: DomainId, source: Sentence, target: Sentence) -> Self {
        Self {
            direction,
            domain,
            source,
            target,
            alignment: Vec::new(),
            score: 0.0,
        }
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// Total order: higher score first, then domain, source and target.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.domain.cmp(&other.domain))
            .then_with(|| self.source.words().cmp(other.source.words()))
            .then_with(|| self.target.words().cmp(other.target.words()))
    }
}

/// Per-domain weight
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub domain: DomainId,
    pub score: f32,
}

/// Topical weighting of domains for the sentence being translated
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextVector {
    entries: Vec<ContextEntry>,
}

impl ContextVector {
    /// Build a context vector; entries are kept sorted by descending weight
    /// and a repeated domain keeps its highest weight.
    pub fn new(entries: impl IntoIterator<Item = ContextEntry>) -> Self {
        let mut entries: Vec<ContextEntry> = entries.into_iter().collect();
        entries.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.domain.cmp(&b.domain)));
        let mut seen = Vec::with_capacity(entries.len());
        entries.retain(|e| {
            if seen.contains(&e.domain) {
                false
            } else {
                seen.push(e.domain);
                true
            }
        });
        Self { entries }
    }

    pub fn from_pairs(pairs: &[(DomainId, f32)]) -> Self {
        Self::new(pairs.iter().map(|&(domain, score)| ContextEntry { domain, score }))
    }

    pub fn weight_of(&self, domain: DomainId) -> Option<f32> {
        self.entries.iter().find(|e| e.domain == domain).map(|e| e.score)
    }

    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(domain: DomainId, source: &str, score: f32) -> ScoreEntry {
        ScoreEntry::new(
            "en:it".parse().unwrap(),
            domain,
            Sentence::from_text(source),
            Sentence::from_text("x"),
        )
        .with_score(score)
    }

    #[test]
    fn test_rank_order_is_total() {
        let mut entries = vec![
            entry(2, "b", 0.5),
            entry(1, "z", 0.9),
            entry(1, "a", 0.5),
            entry(2, "a", 0.5),
        ];
        entries.sort_by(ScoreEntry::rank_cmp);

        let order: Vec<(u64, String)> = entries
            .iter()
            .map(|e| (e.domain, e.source.to_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                (1, "z".to_string()),
                (1, "a".to_string()),
                (2, "a".to_string()),
                (2, "b".to_string()),
            ]
        );
    }

    #[test]
    fn test_context_vector_sorted_and_deduplicated() {
        let context = ContextVector::from_pairs(&[(1, 0.2), (2, 0.7), (1, 0.4)]);

        assert_eq!(context.entries().len(), 2);
        assert_eq!(context.entries()[0].domain, 2);
        assert_eq!(context.weight_of(1), Some(0.4));
        assert_eq!(context.weight_of(3), None);
        assert!(ContextVector::default().is_empty());
    }
}
