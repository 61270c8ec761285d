//! Single-writer transactional index with snapshot-isolated readers.

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use super::document::{DocId, IndexedDocument};
use super::segment::Segment;
use super::snapshot::IndexSnapshot;
use super::statistics::Bm25Params;
use crate::config::MemoryConfig;
use crate::error::{Result, TmError};
use crate::models::DomainId;
use crate::persistence::{CommitPoint, DocStore};

/// Uncommitted work of the single writer
struct WriterState {
    persistence: Option<DocStore>,
    pending: Vec<(DocId, IndexedDocument)>,
    /// Domain deletions staged in this transaction
    pending_cutoffs: BTreeMap<DomainId, DocId>,
    next_doc_id: DocId,
    committed: CommitPoint,
    /// A failed commit may have left records past the commit point
    dirty: bool,
    #[cfg(test)]
    faults: Faults,
}

#[cfg(test)]
#[derive(Default)]
struct Faults {
    adds_before_failure: Option<usize>,
    fail_next_commit: bool,
    fail_journal_flush: bool,
}

/// Persisted inverted index plus document store.
///
/// Writer operations stage work until [`IndexStore::commit`] publishes it
/// atomically or [`IndexStore::rollback`] discards it. Readers call
/// [`IndexStore::acquire_snapshot`] and keep a consistent view for as long as
/// they hold it. The store accepts one transaction at a time; callers
/// serialize writers.
pub struct IndexStore {
    published: ArcSwap<IndexSnapshot>,
    writer: Mutex<WriterState>,
    bm25: Bm25Params,
    sync_on_commit: bool,
    closed: AtomicBool,
}

impl IndexStore {
    /// Open the store described by `config`, recovering the last committed
    /// state when a data directory is configured.
    pub fn open(config: &MemoryConfig) -> Result<Self> {
        let Some(data_dir) = &config.data_dir else {
            return Ok(Self::in_memory(config));
        };

        let doc_store = DocStore::open(data_dir.clone())?;
        let committed = doc_store.load_commit_point()?.unwrap_or_default();
        doc_store.discard_uncommitted(committed.next_doc_id, committed.blob_len)?;

        let documents = doc_store.load_documents(&committed)?;
        info!(
            "Opened index at {:?}: generation {}, {} live documents",
            data_dir,
            committed.generation,
            documents.len()
        );

        let segments = if documents.is_empty() {
            Vec::new()
        } else {
            vec![Arc::new(Segment::build(documents))]
        };
        let snapshot = IndexSnapshot::new(committed.generation, segments, Default::default());

        Ok(Self::with_state(config, snapshot, committed, Some(doc_store)))
    }

    /// Create a store that keeps everything in memory
    pub fn in_memory(config: &MemoryConfig) -> Self {
        Self::with_state(config, IndexSnapshot::default(), CommitPoint::default(), None)
    }

    fn with_state(
        config: &MemoryConfig,
        snapshot: IndexSnapshot,
        committed: CommitPoint,
        persistence: Option<DocStore>,
    ) -> Self {
        Self {
            published: ArcSwap::from_pointee(snapshot),
            writer: Mutex::new(WriterState {
                persistence,
                pending: Vec::new(),
                pending_cutoffs: BTreeMap::new(),
                next_doc_id: committed.next_doc_id,
                committed,
                dirty: false,
                #[cfg(test)]
                faults: Faults::default(),
            }),
            bm25: config.bm25.clone(),
            sync_on_commit: config.sync_on_commit,
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(TmError::Closed)
        } else {
            Ok(())
        }
    }

    /// Stage a document; returns the id it will carry once committed
    pub fn add_document(&self, document: IndexedDocument) -> Result<DocId> {
        self.ensure_open()?;
        let mut writer = self.writer.lock();

        #[cfg(test)]
        if let Some(remaining) = writer.faults.adds_before_failure.as_mut() {
            if *remaining == 0 {
                return Err(TmError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "injected add failure",
                )));
            }
            *remaining -= 1;
        }

        let doc_id = writer.next_doc_id;
        writer.next_doc_id += 1;
        writer.pending.push((doc_id, document));
        Ok(doc_id)
    }

    /// Stage deletion of every document of `domain` added before this call
    pub fn delete_by_domain(&self, domain: DomainId) -> Result<()> {
        self.ensure_open()?;
        let mut writer = self.writer.lock();
        let cutoff = writer.next_doc_id;
        writer.pending_cutoffs.insert(domain, cutoff);
        Ok(())
    }

    /// Publish all staged work; returns the new generation.
    ///
    /// On error nothing is published and the staged work stays in place
    /// until [`IndexStore::rollback`].
    pub fn commit(&self) -> Result<u64> {
        self.ensure_open()?;
        let mut writer = self.writer.lock();
        let writer = &mut *writer;

        if writer.pending.is_empty() && writer.pending_cutoffs.is_empty() {
            return Ok(writer.committed.generation);
        }

        let mut cutoffs = writer.committed.domain_cutoffs.clone();
        for (&domain, &cutoff) in &writer.pending_cutoffs {
            let entry = cutoffs.entry(domain).or_insert(cutoff);
            *entry = (*entry).max(cutoff);
        }

        let mut commit_point = CommitPoint {
            generation: writer.committed.generation + 1,
            next_doc_id: writer.next_doc_id,
            blob_len: writer.committed.blob_len,
            domain_cutoffs: cutoffs,
        };

        #[cfg(test)]
        if std::mem::take(&mut writer.faults.fail_next_commit) {
            return Err(TmError::Storage("injected commit failure".to_string()));
        }

        if let Some(doc_store) = &writer.persistence {
            writer.dirty = true;
            for (doc_id, document) in &writer.pending {
                doc_store.put_document(*doc_id, document)?;
            }
            if self.sync_on_commit {
                doc_store.sync()?;
            }
            commit_point.blob_len = doc_store.blob_len()?;
            doc_store.write_commit_point(&commit_point)?;
            #[cfg(test)]
            if std::mem::take(&mut writer.faults.fail_journal_flush) {
                return Err(TmError::Storage("injected journal flush failure".to_string()));
            }
            if self.sync_on_commit {
                doc_store.persist()?;
            }
        }

        let current = self.published.load_full();
        let mut segments = current.segments().to_vec();
        let added = writer.pending.len();
        if !writer.pending.is_empty() {
            segments.push(Arc::new(Segment::build(std::mem::take(&mut writer.pending))));
        }

        let mut deleted = current.deleted().clone();
        for (&domain, &cutoff) in &writer.pending_cutoffs {
            for segment in &segments {
                if let Some(ids) = segment.domain_docs(domain) {
                    deleted.extend(ids.iter().take_while(|&id| id < cutoff));
                }
            }
        }

        let generation = commit_point.generation;
        self.published
            .store(Arc::new(IndexSnapshot::new(generation, segments, deleted)));

        debug!(
            "Committed generation {}: {} documents added, {} domains deleted",
            generation,
            added,
            writer.pending_cutoffs.len()
        );

        writer.pending_cutoffs.clear();
        writer.committed = commit_point;
        writer.dirty = false;
        Ok(generation)
    }

    /// Discard staged work and restore the last committed state
    pub fn rollback(&self) -> Result<()> {
        let mut writer = self.writer.lock();
        let discarded = writer.pending.len();
        writer.pending.clear();
        writer.pending_cutoffs.clear();
        writer.next_doc_id = writer.committed.next_doc_id;

        if writer.dirty {
            if let Some(doc_store) = &writer.persistence {
                // A failed journal flush can leave the new commit point behind
                doc_store.write_commit_point(&writer.committed)?;
                doc_store.discard_uncommitted(writer.committed.next_doc_id, writer.committed.blob_len)?;
            }
            writer.dirty = false;
        }

        debug!("Rolled back {} staged documents", discarded);
        Ok(())
    }

    /// Latest committed snapshot. Never blocks on the writer.
    pub fn acquire_snapshot(&self) -> Arc<IndexSnapshot> {
        self.published.load_full()
    }

    /// Whether staged work is waiting for commit or rollback
    pub fn has_uncommitted(&self) -> bool {
        let writer = self.writer.lock();
        !writer.pending.is_empty() || !writer.pending_cutoffs.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.published.load().generation()
    }

    /// Live committed documents, ledger included
    pub fn doc_count(&self) -> u64 {
        self.published.load().live_doc_count()
    }

    pub fn find_by_domain(&self, domain: DomainId) -> Vec<(DocId, IndexedDocument)> {
        self.published.load().find_by_domain(domain)
    }

    pub fn bm25(&self) -> &Bm25Params {
        &self.bm25
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Drop staged work and release storage handles. Idempotent.
    ///
    /// Snapshots already handed out stay readable.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut writer = self.writer.lock();
        writer.pending.clear();
        writer.pending_cutoffs.clear();
        if writer.dirty {
            if let Some(doc_store) = &writer.persistence {
                let (next, len) = (writer.committed.next_doc_id, writer.committed.blob_len);
                let restored = doc_store
                    .write_commit_point(&writer.committed)
                    .and_then(|_| doc_store.discard_uncommitted(next, len));
                if let Err(e) = restored {
                    tracing::warn!("Failed to discard uncommitted records on close: {}", e);
                }
            }
        }
        writer.persistence = None;
    }

    #[cfg(test)]
    pub(crate) fn fail_after_adds(&self, successful_adds: usize) {
        self.writer.lock().faults.adds_before_failure = Some(successful_adds);
    }

    #[cfg(test)]
    pub(crate) fn fail_next_commit(&self) {
        self.writer.lock().faults.fail_next_commit = true;
    }

    #[cfg(test)]
    pub(crate) fn fail_journal_flush(&self) {
        self.writer.lock().faults.fail_journal_flush = true;
    }
}
