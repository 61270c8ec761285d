//! Conversion between translation units and storable index documents.
//!
//! Unit documents are scoped by their direction key and indexed on the
//! source side only. The ledger is the single document of domain 0: no
//! scope, no terms, the channel positions as body.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, TmError};
use crate::lang::LanguagePair;
use crate::models::{
    Alignment, ChannelId, DomainId, Position, ScoreEntry, Sentence, TranslationUnit, LEDGER_DOMAIN,
};
use crate::store::IndexedDocument;
use crate::tokenizer::Tokenizer;

/// Body of a stored document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
enum StoredRecord {
    Unit {
        direction: LanguagePair,
        source: Sentence,
        target: Sentence,
        alignment: Alignment,
    },
    Ledger {
        positions: BTreeMap<ChannelId, Position>,
    },
}

#[derive(Clone, Debug, Default)]
pub struct DocumentCodec {
    tokenizer: Tokenizer,
}

impl DocumentCodec {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }

    /// Scope key shared by documents and queries of one direction
    pub fn scope(direction: &LanguagePair) -> String {
        direction.key()
    }

    pub fn encode_unit(&self, unit: &TranslationUnit) -> Result<IndexedDocument> {
        self.encode_pair(
            &unit.direction,
            unit.domain,
            &unit.source,
            &unit.target,
            &unit.alignment,
        )
    }

    pub fn encode_pair(
        &self,
        direction: &LanguagePair,
        domain: DomainId,
        source: &Sentence,
        target: &Sentence,
        alignment: &Alignment,
    ) -> Result<IndexedDocument> {
        if domain == LEDGER_DOMAIN {
            return Err(TmError::InvalidRequest(format!(
                "domain {} is reserved for the channel ledger",
                LEDGER_DOMAIN
            )));
        }

        let record = StoredRecord::Unit {
            direction: direction.clone(),
            source: source.clone(),
            target: target.clone(),
            alignment: alignment.clone(),
        };
        Ok(IndexedDocument::new(
            domain,
            Self::scope(direction),
            self.tokenizer.sentence_terms(source),
            Bytes::from(bincode::serialize(&record)?),
        ))
    }

    pub fn encode_ledger(positions: &BTreeMap<ChannelId, Position>) -> Result<IndexedDocument> {
        let record = StoredRecord::Ledger {
            positions: positions.clone(),
        };
        Ok(IndexedDocument::new(
            LEDGER_DOMAIN,
            String::new(),
            Vec::new(),
            Bytes::from(bincode::serialize(&record)?),
        ))
    }

    /// Decode a unit document into a search entry carrying `score`
    pub fn decode_entry(document: &IndexedDocument, score: f32) -> Result<ScoreEntry> {
        Self::decode_body(document.domain, &document.body, score)
    }

    /// Like [`DocumentCodec::decode_entry`], from a stored body
    pub fn decode_body(domain: DomainId, body: &[u8], score: f32) -> Result<ScoreEntry> {
        match bincode::deserialize::<StoredRecord>(body)? {
            StoredRecord::Unit {
                direction,
                source,
                target,
                alignment,
            } => Ok(ScoreEntry {
                direction,
                domain,
                source,
                target,
                alignment,
                score,
            }),
            StoredRecord::Ledger { .. } => Err(TmError::Corrupt(
                "expected a translation unit document, found the ledger".to_string(),
            )),
        }
    }

    pub fn decode_ledger(document: &IndexedDocument) -> Result<BTreeMap<ChannelId, Position>> {
        match bincode::deserialize::<StoredRecord>(&document.body)? {
            StoredRecord::Ledger { positions } => Ok(positions),
            StoredRecord::Unit { .. } => Err(TmError::Corrupt(
                "expected the ledger document, found a translation unit".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> TranslationUnit {
        TranslationUnit::new(
            1,
            42,
            3,
            "en:it".parse().unwrap(),
            Sentence::from_text("Hello , World"),
            Sentence::from_text("Ciao , Mondo"),
        )
        .with_alignment(vec![(0, 0), (2, 2)])
    }

    #[test]
    fn test_unit_document_layout() {
        let codec = DocumentCodec::default();
        let document = codec.encode_unit(&unit()).unwrap();

        assert_eq!(document.domain, 3);
        assert_eq!(document.scope, "en>it");
        assert_eq!(document.terms, vec!["hello", "world"]);

        let entry = DocumentCodec::decode_entry(&document, 1.5).unwrap();
        assert_eq!(entry.direction, "en:it".parse().unwrap());
        assert_eq!(entry.domain, 3);
        assert_eq!(entry.source, Sentence::from_text("Hello , World"));
        assert_eq!(entry.target, Sentence::from_text("Ciao , Mondo"));
        assert_eq!(entry.alignment, vec![(0, 0), (2, 2)]);
        assert_eq!(entry.score, 1.5);
    }

    #[test]
    fn test_ledger_document_layout() {
        let positions = BTreeMap::from([(1u16, 7u64), (4, 19)]);
        let document = DocumentCodec::encode_ledger(&positions).unwrap();

        assert_eq!(document.domain, LEDGER_DOMAIN);
        assert!(document.terms.is_empty());
        assert_eq!(DocumentCodec::decode_ledger(&document).unwrap(), positions);
    }

    #[test]
    fn test_record_kind_mismatch_is_corrupt() {
        let codec = DocumentCodec::default();
        let unit_doc = codec.encode_unit(&unit()).unwrap();
        let ledger_doc = DocumentCodec::encode_ledger(&BTreeMap::new()).unwrap();

        assert!(matches!(DocumentCodec::decode_ledger(&unit_doc), Err(TmError::Corrupt(_))));
        assert!(matches!(
            DocumentCodec::decode_entry(&ledger_doc, 0.0),
            Err(TmError::Corrupt(_))
        ));
    }

    #[test]
    fn test_ledger_domain_is_reserved() {
        let codec = DocumentCodec::default();
        let mut unit = unit();
        unit.domain = LEDGER_DOMAIN;

        assert!(matches!(codec.encode_unit(&unit), Err(TmError::InvalidRequest(_))));
    }
}
