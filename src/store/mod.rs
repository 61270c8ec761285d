//! Snapshot-isolated inverted index over translation-unit documents.
//!
//! # Architecture
//!
//! - `IndexStore`: single-writer transaction (pending adds and domain
//!   deletions) plus the published `IndexSnapshot`
//! - `IndexSnapshot`: immutable committed state, shared with readers through
//!   `ArcSwap`
//! - `Segment`: the documents sealed by one commit, with postings and domain
//!   bitmaps
//! - `DocStore` (in `persistence`): durable backing, optional

mod document;
mod index;
mod segment;
mod snapshot;
mod statistics;

pub use document::{DocId, IndexedDocument, QueryClause, ScopedQuery, StoreHit};
pub use index::IndexStore;
pub use segment::{Segment, SegmentDoc};
pub use snapshot::IndexSnapshot;
pub use statistics::{bm25_plus, Bm25Params};
