//! Flat, single-direction projection of a [`DataBatch`] for decoders that
//! consume parallel columns instead of structured units.

use serde::{Deserialize, Serialize};

use super::domain::DomainId;
use super::unit::{ChannelId, DataBatch, Position};
use crate::lang::LanguagePair;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DecoderBatch {
    pub tu_channels: Vec<ChannelId>,
    pub tu_channel_positions: Vec<Position>,
    pub tu_domains: Vec<DomainId>,
    pub tu_sources: Vec<String>,
    pub tu_targets: Vec<String>,
    /// Alignment points flattened as `[s0, t0, s1, t1, ...]`
    pub tu_alignments: Vec<Vec<u32>>,

    pub del_channels: Vec<ChannelId>,
    pub del_channel_positions: Vec<Position>,
    pub del_domains: Vec<DomainId>,

    pub channels: Vec<ChannelId>,
    pub channel_positions: Vec<Position>,
}

impl DecoderBatch {
    /// Project `batch` onto `direction`. Units of other directions are
    /// dropped; deletions and channel positions are direction-free and kept.
    pub fn from_batch(batch: &DataBatch, direction: &LanguagePair) -> Self {
        let mut out = DecoderBatch::default();

        for unit in batch.units.iter().filter(|u| &u.direction == direction) {
            out.tu_channels.push(unit.channel);
            out.tu_channel_positions.push(unit.channel_position);
            out.tu_domains.push(unit.domain);
            out.tu_sources.push(unit.source.to_string());
            out.tu_targets.push(unit.target.to_string());
            out.tu_alignments.push(
                unit.alignment
                    .iter()
                    .flat_map(|&(s, t)| [s, t])
                    .collect(),
            );
        }

        for deletion in &batch.deletions {
            out.del_channels.push(deletion.channel);
            out.del_channel_positions.push(deletion.channel_position);
            out.del_domains.push(deletion.domain);
        }

        for (&channel, &position) in &batch.channel_positions {
            out.channels.push(channel);
            out.channel_positions.push(position);
        }

        out
    }

    pub fn unit_count(&self) -> usize {
        self.tu_channels.len()
    }

    pub fn deletion_count(&self) -> usize {
        self.del_channels.len()
    }
}
