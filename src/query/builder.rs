use crate::codec::DocumentCodec;
use crate::error::{Result, TmError};
use crate::lang::LanguagePair;
use crate::models::Sentence;
use crate::store::{QueryClause, ScopedQuery};
use crate::tokenizer::Tokenizer;

/// Builds the store query for a sentence.
///
/// Every distinct term becomes one optional clause boosted by its number of
/// occurrences in the sentence. The query is scoped to the direction, so
/// documents of the reverse direction never match.
#[derive(Clone, Debug)]
pub struct QueryBuilder {
    tokenizer: Tokenizer,
    max_terms: usize,
}

impl QueryBuilder {
    pub fn new(tokenizer: Tokenizer, max_terms: usize) -> Self {
        Self {
            tokenizer,
            max_terms: max_terms.max(1),
        }
    }

    /// Fails with [`TmError::Query`] when the sentence yields no terms.
    pub fn build(&self, direction: &LanguagePair, sentence: &Sentence) -> Result<ScopedQuery> {
        let mut clauses: Vec<QueryClause> = Vec::new();

        for term in self.tokenizer.sentence_terms(sentence) {
            if let Some(clause) = clauses.iter_mut().find(|c| c.term == term) {
                clause.boost += 1.0;
            } else if clauses.len() < self.max_terms {
                clauses.push(QueryClause { term, boost: 1.0 });
            }
        }

        if clauses.is_empty() {
            return Err(TmError::Query(format!(
                "sentence '{}' produced no searchable terms",
                sentence
            )));
        }

        Ok(ScopedQuery {
            scope: DocumentCodec::scope(direction),
            clauses,
        })
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(Tokenizer::default(), 1024)
    }
}
