use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use crate::corpus::{Corpus, CorpusReader, StringPair};
use crate::error::{Result, TmError};
use crate::lang::{LanguagePair, Locale};

/// Tab-separated corpus file.
///
/// Each line reads `source-locale<TAB>target-locale<TAB>source<TAB>target`.
/// Blank lines are skipped.
#[derive(Clone, Debug)]
pub struct TsvCorpus {
    name: String,
    path: PathBuf,
}

impl TsvCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Corpus for TsvCorpus {
    fn name(&self) -> &str {
        &self.name
    }

    fn reader(&self) -> Result<Box<dyn CorpusReader + '_>> {
        let file = File::open(&self.path)?;
        Ok(Box::new(TsvReader {
            path: &self.path,
            lines: BufReader::new(file).lines(),
            line_no: 0,
        }))
    }
}

struct TsvReader<'a> {
    path: &'a Path,
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl TsvReader<'_> {
    fn malformed(&self, reason: impl std::fmt::Display) -> TmError {
        TmError::Corpus(format!("{:?} line {}: {}", self.path, self.line_no, reason))
    }

    fn parse(&self, line: &str) -> Result<StringPair> {
        let fields: Vec<&str> = line.split('\t').collect();
        let [source_locale, target_locale, source, target] = fields[..] else {
            return Err(self.malformed(format!("expected 4 fields, found {}", fields.len())));
        };

        let source_locale: Locale = source_locale.parse().map_err(|e| self.malformed(e))?;
        let target_locale: Locale = target_locale.parse().map_err(|e| self.malformed(e))?;

        Ok(StringPair::new(
            LanguagePair::new(source_locale, target_locale),
            source,
            target,
        ))
    }
}

impl CorpusReader for TsvReader<'_> {
    fn read(&mut self) -> Result<Option<StringPair>> {
        for line in self.lines.by_ref() {
            let line = line?;
            self.line_no += 1;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            return self.parse(line).map(Some);
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn corpus_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_read_pairs_and_skip_blank_lines() {
        let file = corpus_file("en\tit\tHello world\tCiao mondo\n\n  \nit-IT\ten\tGrazie\tThanks\r\n");
        let corpus = TsvCorpus::new(file.path());
        let mut reader = corpus.reader().unwrap();

        let first = reader.read().unwrap().unwrap();
        assert_eq!(first.language, "en:it".parse().unwrap());
        assert_eq!(first.source.to_string(), "Hello world");
        assert_eq!(first.target.to_string(), "Ciao mondo");

        let second = reader.read().unwrap().unwrap();
        assert_eq!(second.language, "it-IT:en".parse().unwrap());
        assert_eq!(second.target.to_string(), "Thanks");

        assert!(reader.read().unwrap().is_none());
    }

    #[test]
    fn test_malformed_line_is_a_corpus_error() {
        let file = corpus_file("en\tit\tHello\tCiao\nen\tit\tmissing target\n");
        let corpus = TsvCorpus::new(file.path());
        let mut reader = corpus.reader().unwrap();

        assert!(reader.read().unwrap().is_some());
        let err = reader.read().unwrap_err();
        assert!(matches!(err, TmError::Corpus(ref msg) if msg.contains("line 2")));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let corpus = TsvCorpus::new("/nonexistent/corpus.tsv");
        assert!(matches!(corpus.reader(), Err(TmError::Io(_))));
    }
}
