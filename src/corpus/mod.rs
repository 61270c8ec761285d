//! Bulk import sources of bilingual sentence pairs.

mod memory;
mod tsv;

pub use memory::MemoryCorpus;
pub use tsv::TsvCorpus;

use crate::error::Result;
use crate::lang::LanguagePair;
use crate::models::Sentence;

/// One sentence pair read from a corpus, tagged with its direction
#[derive(Clone, Debug, PartialEq)]
pub struct StringPair {
    pub language: LanguagePair,
    pub source: Sentence,
    pub target: Sentence,
}

impl StringPair {
    pub fn new(language: LanguagePair, source: impl Into<Sentence>, target: impl Into<Sentence>) -> Self {
        Self {
            language,
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Sequential reader over a corpus. `Ok(None)` marks the end.
pub trait CorpusReader {
    fn read(&mut self) -> Result<Option<StringPair>>;
}

/// A named, re-readable collection of sentence pairs
pub trait Corpus {
    fn name(&self) -> &str;

    fn reader(&self) -> Result<Box<dyn CorpusReader + '_>>;
}
