use crate::config::RescorerConfig;
use crate::models::{ContextVector, ScoreEntry, Sentence};
use crate::rescoring::{sort_by_score, Rescorer};

/// Default rescorer: word-level edit-distance similarity between the query
/// and each candidate source, blended with the candidate domain's weight
/// when the context vector has one.
#[derive(Clone, Debug)]
pub struct LevenshteinRescorer {
    context_weight: f32,
}

impl Default for LevenshteinRescorer {
    fn default() -> Self {
        Self::new(&RescorerConfig::default())
    }
}

impl LevenshteinRescorer {
    pub fn new(config: &RescorerConfig) -> Self {
        Self {
            context_weight: config.context_weight.clamp(0.0, 1.0),
        }
    }

    /// Similarity in [0, 1]; 1 for identical word sequences
    pub fn similarity(query: &[String], candidate: &[String]) -> f32 {
        let longest = query.len().max(candidate.len());
        if longest == 0 {
            return 1.0;
        }
        1.0 - word_edit_distance(query, candidate) as f32 / longest as f32
    }
}

impl Rescorer for LevenshteinRescorer {
    fn rescore(&self, query: &Sentence, candidates: &mut Vec<ScoreEntry>, context: Option<&ContextVector>) {
        let query_words = normalize(query);

        for candidate in candidates.iter_mut() {
            let similarity = Self::similarity(&query_words, &normalize(&candidate.source));
            candidate.score = match context.and_then(|c| c.weight_of(candidate.domain)) {
                Some(weight) => {
                    (1.0 - self.context_weight) * similarity + self.context_weight * weight
                }
                None => similarity,
            };
        }

        sort_by_score(candidates);
    }
}

fn normalize(sentence: &Sentence) -> Vec<String> {
    sentence.words().iter().map(|w| w.to_lowercase()).collect()
}

/// Levenshtein distance counted in whole words
pub fn word_edit_distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Use the shorter sequence for columns
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let mut prev_row: Vec<usize> = (0..=shorter.len()).collect();
    let mut curr_row = vec![0; shorter.len() + 1];

    for i in 1..=longer.len() {
        curr_row[0] = i;
        for j in 1..=shorter.len() {
            let cost = if longer[i - 1] == shorter[j - 1] { 0 } else { 1 };
            curr_row[j] = (prev_row[j] + 1)
                .min(curr_row[j - 1] + 1)
                .min(prev_row[j - 1] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[shorter.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DomainId;

    fn candidate(domain: DomainId, source: &str, score: f32) -> ScoreEntry {
        ScoreEntry::new(
            "en:it".parse().unwrap(),
            domain,
            Sentence::from_text(source),
            Sentence::from_text("-"),
        )
        .with_score(score)
    }

    fn sources(candidates: &[ScoreEntry]) -> Vec<String> {
        candidates.iter().map(|c| c.source.to_string()).collect()
    }

    fn words(s: &str) -> Vec<&str> {
        s.split_whitespace().collect()
    }

    #[test]
    fn test_word_edit_distance() {
        assert_eq!(word_edit_distance(&words("the cat sat"), &words("the cat sat")), 0);
        assert_eq!(word_edit_distance(&words("the cat sat"), &words("the dog sat")), 1);
        assert_eq!(word_edit_distance(&words("the cat"), &words("the cat sat down")), 2);
        assert_eq!(word_edit_distance(&words(""), &words("a b c")), 3);
        assert_eq!(word_edit_distance::<&str>(&[], &[]), 0);
    }

    #[test]
    fn test_exact_match_ranks_first() {
        let rescorer = LevenshteinRescorer::default();
        let mut candidates = vec![
            candidate(1, "hello there my world", 9.0),
            candidate(1, "Hello world", 1.0),
            candidate(1, "hello big world", 5.0),
        ];

        rescorer.rescore(&Sentence::from_text("hello world"), &mut candidates, None);

        assert_eq!(
            sources(&candidates),
            vec!["Hello world", "hello big world", "hello there my world"]
        );
        assert_eq!(candidates[0].score, 1.0);
    }

    #[test]
    fn test_context_weight_breaks_ties_between_domains() {
        let rescorer = LevenshteinRescorer::default();
        let mut candidates = vec![candidate(1, "good morning", 1.0), candidate(2, "good morning", 1.0)];
        let context = ContextVector::from_pairs(&[(2, 0.9), (1, 0.1)]);

        rescorer.rescore(&Sentence::from_text("good morning"), &mut candidates, Some(&context));

        assert_eq!(candidates[0].domain, 2);
        assert!(candidates[0].score > candidates[1].score);
    }

    #[test]
    fn test_context_without_overlap_is_ignored() {
        let rescorer = LevenshteinRescorer::default();
        let query = Sentence::from_text("good morning");
        let mut with_context = vec![candidate(1, "good evening", 1.0), candidate(2, "good morning", 1.0)];
        let mut without_context = with_context.clone();

        let context = ContextVector::from_pairs(&[(99, 1.0)]);
        rescorer.rescore(&query, &mut with_context, Some(&context));
        rescorer.rescore(&query, &mut without_context, None);

        assert_eq!(with_context, without_context);
    }

    #[test]
    fn test_rescoring_is_deterministic() {
        let rescorer = LevenshteinRescorer::default();
        let query = Sentence::from_text("a b c");
        let input = vec![
            candidate(3, "a b", 0.0),
            candidate(1, "b c", 0.0),
            candidate(2, "a c", 0.0),
        ];

        let mut first = input.clone();
        let mut second = input.into_iter().rev().collect::<Vec<_>>();
        rescorer.rescore(&query, &mut first, None);
        rescorer.rescore(&query, &mut second, None);

        assert_eq!(first, second);
    }

    #[test]
    fn test_closure_rescorer() {
        let reverse_alpha = |_: &Sentence, candidates: &mut Vec<ScoreEntry>, _: Option<&ContextVector>| {
            candidates.sort_by(|a, b| b.source.words().cmp(a.source.words()));
        };
        let mut candidates = vec![candidate(1, "a", 0.0), candidate(1, "b", 0.0)];

        reverse_alpha.rescore(&Sentence::from_text("x"), &mut candidates, None);
        assert_eq!(sources(&candidates), vec!["b", "a"]);
    }
}
