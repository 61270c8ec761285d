//! The translation memory facade.
//!
//! Ties the language index, document codec, index store and channel ledger
//! together. Writers are serialized by the facade; searches run against the
//! latest committed snapshot and never wait for a writer.

mod ingest;
mod search;

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::codec::DocumentCodec;
use crate::config::MemoryConfig;
use crate::error::{Result, TmError};
use crate::lang::LanguageIndex;
use crate::ledger::{ChannelLedger, ChannelPositions};
use crate::metrics::TmMetrics;
use crate::models::LEDGER_DOMAIN;
use crate::query::QueryBuilder;
use crate::rescoring::{LevenshteinRescorer, Rescorer};
use crate::store::IndexStore;
use crate::tokenizer::Tokenizer;

pub struct TranslationMemory {
    languages: LanguageIndex,
    codec: DocumentCodec,
    queries: QueryBuilder,
    rescorer: Option<Box<dyn Rescorer>>,
    store: IndexStore,
    ledger: ChannelLedger,
    /// Serializes writers: the store holds one transaction at a time
    write_lock: Mutex<()>,
    metrics: TmMetrics,
    config: MemoryConfig,
    closed: AtomicBool,
}

impl TranslationMemory {
    /// Open the memory described by `config` for the given directions.
    ///
    /// Committed documents and channel positions are recovered when the
    /// configuration names a data directory. The default rescorer is a
    /// [`LevenshteinRescorer`].
    pub fn open(config: MemoryConfig, languages: LanguageIndex) -> Result<Self> {
        let tokenizer = Tokenizer::new(&config.analyzer);
        let store = IndexStore::open(&config)?;
        let ledger = ChannelLedger::from_positions(Self::load_positions(&store)?);
        let metrics = TmMetrics::new()?;
        metrics.live_documents.set(store.doc_count() as f64);

        info!(
            "Translation memory ready: {} directions, {} live documents, {} channels",
            languages.len(),
            store.doc_count(),
            ledger.latest_positions().len()
        );

        Ok(Self {
            languages,
            codec: DocumentCodec::new(tokenizer.clone()),
            queries: QueryBuilder::new(tokenizer, config.max_query_terms),
            rescorer: Some(Box::new(LevenshteinRescorer::new(&config.rescorer))),
            store,
            ledger,
            write_lock: Mutex::new(()),
            metrics,
            config,
            closed: AtomicBool::new(false),
        })
    }

    /// Open a memory that keeps everything in memory
    pub fn in_memory(languages: LanguageIndex) -> Result<Self> {
        Self::open(MemoryConfig::in_memory(), languages)
    }

    pub fn with_rescorer(mut self, rescorer: impl Rescorer + 'static) -> Self {
        self.rescorer = Some(Box::new(rescorer));
        self
    }

    /// Keep the index store's ranking as the final order
    pub fn without_rescorer(mut self) -> Self {
        self.rescorer = None;
        self
    }

    fn load_positions(store: &IndexStore) -> Result<ChannelPositions> {
        // One ledger document survives each commit; take the newest
        match store.find_by_domain(LEDGER_DOMAIN).last() {
            Some((_, document)) => DocumentCodec::decode_ledger(document),
            None => Ok(ChannelPositions::new()),
        }
    }

    /// Last applied position of every channel, as committed
    pub fn latest_positions(&self) -> Arc<ChannelPositions> {
        self.ledger.latest_positions()
    }

    pub fn language_index(&self) -> &LanguageIndex {
        &self.languages
    }

    pub fn metrics(&self) -> &TmMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Generation of the last commit
    pub fn generation(&self) -> u64 {
        self.store.generation()
    }

    /// Live translation units
    pub fn unit_count(&self) -> u64 {
        let ledger_docs = self.store.find_by_domain(LEDGER_DOMAIN).len() as u64;
        self.store.doc_count() - ledger_docs
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(TmError::Closed)
        } else {
            Ok(())
        }
    }

    /// Commit staged work, or roll it back when `staged` or the commit fails.
    ///
    /// `staged` returns the number of documents and domain deletions it
    /// staged, for metrics.
    fn transaction<F>(&self, staged: F) -> Result<u64>
    where
        F: FnOnce() -> Result<(usize, usize)>,
    {
        let outcome = staged().and_then(|counts| self.store.commit().map(|generation| (counts, generation)));

        match outcome {
            Ok(((added, deleted), generation)) => {
                self.metrics
                    .record_commit(added, deleted, self.store.doc_count());
                Ok(generation)
            }
            Err(e) => {
                warn!("Rolling back transaction: {}", e);
                self.metrics.record_rollback();
                if let Err(rollback_err) = self.store.rollback() {
                    warn!("Rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    /// Release storage handles. Idempotent; failures are logged, never
    /// returned. Snapshots held by in-flight searches stay valid.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let _writer = self.write_lock.lock();
        self.store.close();
        info!("Translation memory closed at generation {}", self.store.generation());
    }
}

impl Drop for TranslationMemory {
    fn drop(&mut self) {
        self.close();
    }
}
