use std::time::Instant;
use tracing::debug;

use super::TranslationMemory;
use crate::codec::DocumentCodec;
use crate::error::{Result, TmError};
use crate::lang::LanguagePair;
use crate::models::{ContextVector, ScoreEntry, Sentence};
use crate::rescoring::Rescorer;

impl TranslationMemory {
    /// Best prior translations of `sentence` in `direction`, best first.
    ///
    /// Candidates are over-fetched from the index, decoded, passed through the
    /// configured rescorer and truncated to `limit`. Unsupported directions
    /// and sentences without searchable terms yield an empty result.
    pub fn search(
        &self,
        direction: &LanguagePair,
        sentence: &Sentence,
        context: Option<&ContextVector>,
        limit: usize,
    ) -> Result<Vec<ScoreEntry>> {
        self.search_with(direction, sentence, context, self.rescorer.as_deref(), limit)
    }

    /// Like [`TranslationMemory::search`] with an explicit rescorer; `None`
    /// keeps the index ranking.
    pub fn search_with(
        &self,
        direction: &LanguagePair,
        sentence: &Sentence,
        context: Option<&ContextVector>,
        rescorer: Option<&dyn Rescorer>,
        limit: usize,
    ) -> Result<Vec<ScoreEntry>> {
        self.ensure_open()?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let begin = Instant::now();
        let Some(direction) = self.languages.map(direction) else {
            debug!("Search in unsupported direction {}", direction);
            return Ok(Vec::new());
        };

        let query = match self.queries.build(direction, sentence) {
            Ok(query) => query,
            Err(TmError::Query(reason)) => {
                debug!("Empty search: {}", reason);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let snapshot = self.store.acquire_snapshot();
        let hits = snapshot.search(
            &query,
            self.config.candidate_count(limit),
            self.store.bm25(),
        );

        let mut entries = Vec::with_capacity(hits.len());
        for hit in hits {
            let Some(doc) = snapshot.get(hit.doc_id) else {
                continue;
            };
            entries.push(DocumentCodec::decode_body(doc.domain, &doc.body, hit.score)?);
        }

        if let Some(rescorer) = rescorer {
            rescorer.rescore(sentence, &mut entries, context);
        }
        entries.truncate(limit);

        self.metrics.record_search(begin.elapsed().as_secs_f64());
        Ok(entries)
    }
}
