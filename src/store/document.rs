use bytes::Bytes;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::DomainId;

/// Internal document identifier, allocated by the store in commit order
pub type DocId = u64;

/// A storable record: indexed terms plus an opaque body.
///
/// Documents are never mutated; an update is a domain deletion followed by
/// a new document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub domain: DomainId,
    /// Only queries carrying the same scope can match this document
    pub scope: String,
    pub terms: Vec<String>,
    pub body: Bytes,
}

impl IndexedDocument {
    pub fn new(domain: DomainId, scope: impl Into<String>, terms: Vec<String>, body: Bytes) -> Self {
        Self {
            domain,
            scope: scope.into(),
            terms,
            body,
        }
    }
}

/// One weighted term of a query
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryClause {
    pub term: String,
    pub boost: f32,
}

/// Disjunctive term query restricted to one document scope
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScopedQuery {
    pub scope: String,
    pub clauses: Vec<QueryClause>,
}

impl ScopedQuery {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Search hit from a snapshot
#[derive(Clone, Debug)]
pub struct StoreHit {
    pub doc_id: DocId,
    pub score: f32,
}

impl PartialEq for StoreHit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for StoreHit {}

impl PartialOrd for StoreHit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StoreHit {
    /// Better hits sort first: higher score, then lower doc id.
    fn cmp(&self, other: &Self) -> Ordering {
        OrderedFloat(other.score)
            .cmp(&OrderedFloat(self.score))
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}
