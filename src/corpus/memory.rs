use crate::corpus::{Corpus, CorpusReader, StringPair};
use crate::error::Result;

/// Corpus held in a vector
#[derive(Clone, Debug, Default)]
pub struct MemoryCorpus {
    name: String,
    pairs: Vec<StringPair>,
}

impl MemoryCorpus {
    pub fn new(name: impl Into<String>, pairs: Vec<StringPair>) -> Self {
        Self {
            name: name.into(),
            pairs,
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl Corpus for MemoryCorpus {
    fn name(&self) -> &str {
        &self.name
    }

    fn reader(&self) -> Result<Box<dyn CorpusReader + '_>> {
        Ok(Box::new(MemoryReader {
            pairs: self.pairs.iter(),
        }))
    }
}

struct MemoryReader<'a> {
    pairs: std::slice::Iter<'a, StringPair>,
}

impl CorpusReader for MemoryReader<'_> {
    fn read(&mut self) -> Result<Option<StringPair>> {
        Ok(self.pairs.next().cloned())
    }
}
