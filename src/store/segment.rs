//! Immutable document segment sealed by one commit.

use bytes::Bytes;
use roaring::RoaringTreemap;
use std::collections::HashMap;
use std::sync::Arc;

use super::document::{DocId, IndexedDocument};
use crate::models::DomainId;
use crate::tokenizer::Tokenizer;

/// Per-document data kept by a segment
#[derive(Clone, Debug)]
pub struct SegmentDoc {
    pub domain: DomainId,
    pub scope: Arc<str>,
    pub terms: Vec<String>,
    pub body: Bytes,
}

impl SegmentDoc {
    /// Number of indexed terms, the BM25 document length
    pub fn term_count(&self) -> u32 {
        self.terms.len() as u32
    }

    pub fn to_document(&self) -> IndexedDocument {
        IndexedDocument::new(
            self.domain,
            self.scope.to_string(),
            self.terms.clone(),
            self.body.clone(),
        )
    }
}

/// A set of documents with ascending ids and their inverted index
#[derive(Debug, Default)]
pub struct Segment {
    docs: Vec<(DocId, SegmentDoc)>,
    /// term -> (doc id, term frequency), ascending doc id
    postings: HashMap<String, Vec<(DocId, u32)>>,
    domains: HashMap<DomainId, RoaringTreemap>,
    /// Documents with at least one term
    indexed_docs: u64,
    total_len: u64,
}

impl Segment {
    /// Seal documents into a segment. Ids must be ascending.
    pub fn build(documents: Vec<(DocId, IndexedDocument)>) -> Self {
        let mut segment = Segment {
            docs: Vec::with_capacity(documents.len()),
            ..Default::default()
        };
        let mut scopes: HashMap<String, Arc<str>> = HashMap::new();

        for (doc_id, doc) in documents {
            debug_assert!(segment.docs.last().map_or(true, |(last, _)| *last < doc_id));

            for (term, tf) in Tokenizer::term_frequencies(&doc.terms) {
                segment.postings.entry(term).or_default().push((doc_id, tf));
            }
            segment
                .domains
                .entry(doc.domain)
                .or_default()
                .insert(doc_id);

            if !doc.terms.is_empty() {
                segment.indexed_docs += 1;
                segment.total_len += doc.terms.len() as u64;
            }

            let scope = scopes
                .entry(doc.scope.clone())
                .or_insert_with(|| Arc::from(doc.scope.as_str()))
                .clone();
            segment.docs.push((
                doc_id,
                SegmentDoc {
                    domain: doc.domain,
                    scope,
                    terms: doc.terms,
                    body: doc.body,
                },
            ));
        }

        segment
    }

    pub fn last_id(&self) -> Option<DocId> {
        self.docs.last().map(|(id, _)| *id)
    }

    pub fn get(&self, doc_id: DocId) -> Option<&SegmentDoc> {
        self.docs
            .binary_search_by_key(&doc_id, |(id, _)| *id)
            .ok()
            .map(|pos| &self.docs[pos].1)
    }

    pub fn postings(&self, term: &str) -> &[(DocId, u32)] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn domain_docs(&self, domain: DomainId) -> Option<&RoaringTreemap> {
        self.domains.get(&domain)
    }

    pub fn doc_count(&self) -> usize {
        self.docs.len()
    }

    pub fn indexed_docs(&self) -> u64 {
        self.indexed_docs
    }

    pub fn total_len(&self) -> u64 {
        self.total_len
    }
}
