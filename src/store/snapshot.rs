//! Point-in-time committed view of the index.

use roaring::RoaringTreemap;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;

use super::document::{DocId, IndexedDocument, ScopedQuery, StoreHit};
use super::segment::{Segment, SegmentDoc};
use super::statistics::{bm25_plus, Bm25Params};
use crate::models::DomainId;

/// Immutable committed state. Readers hold an `Arc<IndexSnapshot>`; later
/// commits publish a new snapshot and never touch this one.
#[derive(Debug, Default)]
pub struct IndexSnapshot {
    generation: u64,
    segments: Vec<Arc<Segment>>,
    deleted: RoaringTreemap,
    indexed_docs: u64,
    total_len: u64,
}

impl IndexSnapshot {
    pub(crate) fn new(generation: u64, segments: Vec<Arc<Segment>>, deleted: RoaringTreemap) -> Self {
        let indexed_docs = segments.iter().map(|s| s.indexed_docs()).sum();
        let total_len = segments.iter().map(|s| s.total_len()).sum();
        Self {
            generation,
            segments,
            deleted,
            indexed_docs,
            total_len,
        }
    }

    /// Commit generation this snapshot was published at
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn segments(&self) -> &[Arc<Segment>] {
        &self.segments
    }

    pub(crate) fn deleted(&self) -> &RoaringTreemap {
        &self.deleted
    }

    pub fn is_deleted(&self, doc_id: DocId) -> bool {
        self.deleted.contains(doc_id)
    }

    /// Live document by id
    pub fn get(&self, doc_id: DocId) -> Option<&SegmentDoc> {
        if self.is_deleted(doc_id) {
            return None;
        }
        let pos = self
            .segments
            .partition_point(|s| s.last_id().map_or(true, |last| last < doc_id));
        self.segments.get(pos).and_then(|s| s.get(doc_id))
    }

    /// Live documents of a domain, ascending id
    pub fn find_by_domain(&self, domain: DomainId) -> Vec<(DocId, IndexedDocument)> {
        let mut out = Vec::new();
        for segment in &self.segments {
            let Some(ids) = segment.domain_docs(domain) else {
                continue;
            };
            for doc_id in ids.iter() {
                if self.is_deleted(doc_id) {
                    continue;
                }
                if let Some(doc) = segment.get(doc_id) {
                    out.push((doc_id, doc.to_document()));
                }
            }
        }
        out
    }

    /// Number of live documents
    pub fn live_doc_count(&self) -> u64 {
        let stored: u64 = self.segments.iter().map(|s| s.doc_count() as u64).sum();
        stored - self.deleted.len()
    }

    /// Rank live documents of the query scope by BM25+.
    ///
    /// Collection statistics count every sealed document, deleted ones
    /// included, until compaction drops them. Ties go to the lower doc id.
    pub fn search(&self, query: &ScopedQuery, top_k: usize, params: &Bm25Params) -> Vec<StoreHit> {
        if query.is_empty() || top_k == 0 || self.indexed_docs == 0 {
            return Vec::new();
        }

        let avgdl = self.total_len as f64 / self.indexed_docs as f64;
        let mut scores: HashMap<DocId, f32> = HashMap::new();

        for clause in &query.clauses {
            let df: u64 = self
                .segments
                .iter()
                .map(|s| s.postings(&clause.term).len() as u64)
                .sum();
            if df == 0 {
                continue;
            }

            for segment in &self.segments {
                for &(doc_id, tf) in segment.postings(&clause.term) {
                    if self.is_deleted(doc_id) {
                        continue;
                    }
                    let Some(doc) = segment.get(doc_id) else {
                        continue;
                    };
                    if doc.scope.as_ref() != query.scope.as_str() {
                        continue;
                    }
                    let score = bm25_plus(tf, df, self.indexed_docs, doc.term_count(), avgdl, params);
                    *scores.entry(doc_id).or_insert(0.0) += clause.boost * score;
                }
            }
        }

        // Max-heap on the hit order keeps the worst retained hit on top
        let mut heap: BinaryHeap<StoreHit> =
            BinaryHeap::with_capacity(top_k.min(scores.len()).saturating_add(1));
        for (doc_id, score) in scores {
            heap.push(StoreHit { doc_id, score });
            if heap.len() > top_k {
                heap.pop();
            }
        }

        heap.into_sorted_vec()
    }
}
