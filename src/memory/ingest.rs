use std::time::Instant;
use tracing::{debug, info};

use super::TranslationMemory;
use crate::codec::DocumentCodec;
use crate::corpus::Corpus;
use crate::error::{Result, TmError};
use crate::lang::LanguagePair;
use crate::ledger::ChannelPositions;
use crate::models::{DataBatch, Deletion, Domain, Sentence, LEDGER_DOMAIN};

impl TranslationMemory {
    /// Import a whole corpus into `domain` with a single commit.
    ///
    /// Pairs whose language maps to no supported direction are skipped. Any
    /// read or storage failure discards the entire import.
    pub fn bulk_add(&self, domain: &Domain, corpus: &dyn Corpus) -> Result<u64> {
        self.bulk_add_all(&[(domain.clone(), corpus)])
    }

    /// Import several corpora, each into its domain, with a single commit
    pub fn bulk_add_all(&self, batch: &[(Domain, &dyn Corpus)]) -> Result<u64> {
        self.ensure_open()?;
        for (domain, _) in batch {
            ensure_content_domain(domain)?;
        }

        let _writer = self.write_lock.lock();
        self.transaction(|| {
            let mut added = 0;
            for (domain, corpus) in batch {
                added += self.import_corpus(domain, *corpus)?;
            }
            Ok((added, 0))
        })
    }

    fn import_corpus(&self, domain: &Domain, corpus: &dyn Corpus) -> Result<usize> {
        let begin = Instant::now();
        let mut reader = corpus.reader()?;
        let mut added = 0;
        let mut skipped = 0;

        while let Some(pair) = reader.read()? {
            let Some(direction) = self.languages.map(&pair.language) else {
                skipped += 1;
                continue;
            };
            let document =
                self.codec
                    .encode_pair(direction, domain.id, &pair.source, &pair.target, &Vec::new())?;
            self.store.add_document(document)?;
            added += 1;
        }

        if skipped > 0 {
            debug!(
                "Skipped {} pairs of corpus {} with unsupported directions",
                skipped,
                corpus.name()
            );
        }
        info!(
            "Domain {} imported in {:.1}s ({} pairs from {})",
            domain.id,
            begin.elapsed().as_secs_f64(),
            added,
            corpus.name()
        );
        Ok(added)
    }

    /// Add one pair and commit it immediately
    pub fn add(
        &self,
        direction: &LanguagePair,
        domain: &Domain,
        source: &Sentence,
        target: &Sentence,
    ) -> Result<u64> {
        self.ensure_open()?;
        ensure_content_domain(domain)?;
        let direction = self
            .languages
            .map(direction)
            .ok_or_else(|| TmError::UnsupportedDirection(direction.to_string()))?;
        let document = self
            .codec
            .encode_pair(direction, domain.id, source, target, &Vec::new())?;

        let _writer = self.write_lock.lock();
        self.transaction(|| {
            self.store.add_document(document)?;
            Ok((1, 0))
        })
    }

    /// Apply the translation units of a stream batch.
    ///
    /// Each unit is checked against the channel positions committed before
    /// the batch; stale units are skipped. Accepted units and the updated
    /// ledger are committed together. On failure nothing is applied and the
    /// ledger stays where it was. Returns the number of units added.
    pub fn on_data_received(&self, batch: &DataBatch) -> Result<usize> {
        self.ensure_open()?;
        let _writer = self.write_lock.lock();
        self.metrics.record_batch(batch.units.len());

        let mut draft = self.ledger.draft();
        let mut accepted = Vec::with_capacity(batch.units.len());
        let mut skipped = 0;

        for unit in &batch.units {
            if !draft.accept(unit.channel, unit.channel_position) {
                continue;
            }
            // The position is consumed even when the unit cannot be stored
            match self.languages.map(&unit.direction) {
                Some(direction) if unit.domain != LEDGER_DOMAIN => accepted.push((direction, unit)),
                _ => skipped += 1,
            }
        }

        let stale = batch.units.len() - accepted.len() - skipped;
        if stale > 0 {
            debug!("Skipped {} stale units", stale);
            self.metrics.record_stale(stale);
        }
        if skipped > 0 {
            debug!("Skipped {} units with unsupported direction or reserved domain", skipped);
        }
        if !draft.is_changed() {
            return Ok(0);
        }

        self.transaction(|| {
            for (direction, unit) in &accepted {
                let document = self.codec.encode_pair(
                    direction,
                    unit.domain,
                    &unit.source,
                    &unit.target,
                    &unit.alignment,
                )?;
                self.store.add_document(document)?;
            }
            self.stage_ledger(&draft.positions())?;
            Ok((accepted.len(), 0))
        })?;

        self.ledger.publish(draft);
        Ok(accepted.len())
    }

    /// Delete every unit of a domain, unless the event was already applied.
    ///
    /// Returns whether the deletion was applied. A deletion of the reserved
    /// ledger domain is never applied but still consumes its position.
    pub fn on_delete(&self, deletion: &Deletion) -> Result<bool> {
        self.ensure_open()?;

        let _writer = self.write_lock.lock();
        let mut draft = self.ledger.draft();
        if !draft.accept(deletion.channel, deletion.channel_position) {
            debug!(
                "Skipped stale deletion of domain {} at {}:{}",
                deletion.domain, deletion.channel, deletion.channel_position
            );
            self.metrics.record_stale(1);
            return Ok(false);
        }

        let applied = deletion.domain != LEDGER_DOMAIN;
        if !applied {
            debug!(
                "Skipped deletion of reserved domain {} at {}:{}",
                deletion.domain, deletion.channel, deletion.channel_position
            );
        }

        self.transaction(|| {
            if applied {
                self.store.delete_by_domain(deletion.domain)?;
            }
            self.stage_ledger(&draft.positions())?;
            Ok((0, usize::from(applied)))
        })?;

        self.ledger.publish(draft);
        Ok(applied)
    }

    /// Replace the ledger document in the current transaction
    fn stage_ledger(&self, positions: &ChannelPositions) -> Result<()> {
        self.store.delete_by_domain(LEDGER_DOMAIN)?;
        self.store.add_document(DocumentCodec::encode_ledger(positions)?)?;
        Ok(())
    }
}

fn ensure_content_domain(domain: &Domain) -> Result<()> {
    if domain.is_content_domain() {
        Ok(())
    } else {
        Err(TmError::InvalidRequest(format!(
            "domain {} is reserved for the channel ledger",
            domain.id
        )))
    }
}
