use std::collections::HashMap;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::AnalyzerConfig;
use crate::models::Sentence;

/// Turns sentences into index terms.
///
/// Words are split on Unicode word boundaries, so punctuation tokens coming
/// from the upstream pipeline produce no terms.
#[derive(Clone, Debug)]
pub struct Tokenizer {
    config: AnalyzerConfig,
}

impl Tokenizer {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Tokenize raw text into a vector of terms
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .map(|word| self.normalize(word))
            .filter(|token| self.accepts(token))
            .collect()
    }

    /// Terms of a pre-tokenized sentence, in order
    pub fn sentence_terms(&self, sentence: &Sentence) -> Vec<String> {
        sentence
            .words()
            .iter()
            .flat_map(|word| self.tokenize(word))
            .collect()
    }

    /// Compute term frequencies for a list of terms
    pub fn term_frequencies(terms: &[String]) -> HashMap<String, u32> {
        let mut freq = HashMap::new();
        for term in terms {
            *freq.entry(term.clone()).or_insert(0) += 1;
        }
        freq
    }

    fn normalize(&self, word: &str) -> String {
        if self.config.lowercase {
            word.to_lowercase()
        } else {
            word.to_string()
        }
    }

    fn accepts(&self, token: &str) -> bool {
        let len = token.chars().count();
        len >= self.config.min_token_length && len <= self.config.max_token_length
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(&AnalyzerConfig::default())
    }
}
