//! Per-channel record of the last applied stream position.
//!
//! The ledger makes ingestion idempotent under at-least-once delivery: an
//! event is applied only when its position is strictly greater than the one
//! recorded for its channel. Changes are staged in a [`LedgerDraft`] and
//! become visible only when the draft is published, which the translation
//! memory does after the matching index commit succeeded.

use arc_swap::ArcSwap;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::{ChannelId, Position};

pub type ChannelPositions = BTreeMap<ChannelId, Position>;

#[derive(Debug)]
pub struct ChannelLedger {
    positions: ArcSwap<ChannelPositions>,
}

impl Default for ChannelLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelLedger {
    pub fn new() -> Self {
        Self::from_positions(ChannelPositions::new())
    }

    pub fn from_positions(positions: ChannelPositions) -> Self {
        Self {
            positions: ArcSwap::from_pointee(positions),
        }
    }

    pub fn position_of(&self, channel: ChannelId) -> Option<Position> {
        self.positions.load().get(&channel).copied()
    }

    /// Whether an event at `position` on `channel` has not been applied yet
    pub fn is_newer(&self, channel: ChannelId, position: Position) -> bool {
        is_newer(&self.positions.load(), channel, position)
    }

    /// Immutable view of every channel's position
    pub fn latest_positions(&self) -> Arc<ChannelPositions> {
        self.positions.load_full()
    }

    /// Apply events in order, each checked against the positions recorded so
    /// far (including earlier events of the same call). Returns the applied
    /// events; stale ones are skipped.
    pub fn apply(&self, events: &[(ChannelId, Position)]) -> Vec<(ChannelId, Position)> {
        let mut draft = self.draft();
        let applied = events
            .iter()
            .copied()
            .filter(|&(channel, position)| draft.advance(channel, position))
            .collect();
        self.publish(draft);
        applied
    }

    /// Start staging changes against the current positions
    pub fn draft(&self) -> LedgerDraft {
        LedgerDraft {
            base: self.positions.load_full(),
            updates: ChannelPositions::new(),
        }
    }

    /// Make a draft's positions visible. Positions never move backwards,
    /// even if the ledger advanced after the draft was taken.
    pub fn publish(&self, draft: LedgerDraft) {
        if draft.updates.is_empty() {
            return;
        }
        self.positions.rcu(|current| {
            let mut next = ChannelPositions::clone(current);
            for (&channel, &position) in &draft.updates {
                if is_newer(&next, channel, position) {
                    next.insert(channel, position);
                }
            }
            next
        });
    }
}

fn is_newer(positions: &ChannelPositions, channel: ChannelId, position: Position) -> bool {
    positions.get(&channel).map_or(true, |&current| current < position)
}

/// Staged ledger changes, based on the positions at draft time
#[derive(Clone, Debug)]
pub struct LedgerDraft {
    base: Arc<ChannelPositions>,
    updates: ChannelPositions,
}

impl LedgerDraft {
    /// Batch semantics: the event is checked against the positions the draft
    /// started from, so repeated positions within one batch are all
    /// accepted. The last accepted position of a channel wins.
    pub fn accept(&mut self, channel: ChannelId, position: Position) -> bool {
        if !is_newer(&self.base, channel, position) {
            return false;
        }
        self.updates.insert(channel, position);
        true
    }

    /// Running semantics: the event is checked against the base and every
    /// position recorded in this draft.
    pub fn advance(&mut self, channel: ChannelId, position: Position) -> bool {
        let current = self
            .updates
            .get(&channel)
            .or_else(|| self.base.get(&channel))
            .copied();
        if current.map_or(false, |current| current >= position) {
            return false;
        }
        self.updates.insert(channel, position);
        true
    }

    pub fn is_changed(&self) -> bool {
        !self.updates.is_empty()
    }

    /// Base positions with this draft's updates applied
    pub fn positions(&self) -> ChannelPositions {
        let mut positions = ChannelPositions::clone(&self.base);
        positions.extend(self.updates.iter().map(|(&c, &p)| (c, p)));
        positions
    }
}
