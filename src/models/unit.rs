use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::domain::DomainId;
use super::sentence::Sentence;
use crate::lang::LanguagePair;

/// Upstream stream partition identifier
pub type ChannelId = u16;

/// Offset of an event inside its channel
pub type Position = u64;

/// Sparse word alignment as (source word index, target word index) pairs
pub type Alignment = Vec<(u32, u32)>;

/// A translated sentence pair delivered by the upstream stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub channel: ChannelId,
    pub channel_position: Position,
    pub domain: DomainId,
    pub direction: LanguagePair,
    pub source: Sentence,
    pub target: Sentence,
    pub alignment: Alignment,
}

impl TranslationUnit {
    pub fn new(
        channel: ChannelId,
        channel_position: Position,
        domain: DomainId,
        direction: LanguagePair,
        source: Sentence,
        target: Sentence,
    ) -> Self {
        Self {
            channel,
            channel_position,
            domain,
            direction,
            source,
            target,
            alignment: Vec::new(),
        }
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// Removal of every translation unit of a domain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deletion {
    pub channel: ChannelId,
    pub channel_position: Position,
    pub domain: DomainId,
}

impl Deletion {
    pub fn new(channel: ChannelId, channel_position: Position, domain: DomainId) -> Self {
        Self {
            channel,
            channel_position,
            domain,
        }
    }
}

/// Units and deletions delivered together, plus the per-channel high-water
/// marks of the batch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DataBatch {
    pub units: Vec<TranslationUnit>,
    pub deletions: Vec<Deletion>,
    pub channel_positions: BTreeMap<ChannelId, Position>,
}

impl DataBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit, raising the channel high-water mark if needed
    pub fn push_unit(&mut self, unit: TranslationUnit) {
        self.observe(unit.channel, unit.channel_position);
        self.units.push(unit);
    }

    /// Append a deletion, raising the channel high-water mark if needed
    pub fn push_deletion(&mut self, deletion: Deletion) {
        self.observe(deletion.channel, deletion.channel_position);
        self.deletions.push(deletion);
    }

    pub fn with_unit(mut self, unit: TranslationUnit) -> Self {
        self.push_unit(unit);
        self
    }

    pub fn with_deletion(mut self, deletion: Deletion) -> Self {
        self.push_deletion(deletion);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty() && self.deletions.is_empty()
    }

    fn observe(&mut self, channel: ChannelId, position: Position) {
        let entry = self.channel_positions.entry(channel).or_insert(position);
        if *entry < position {
            *entry = position;
        }
    }
}
