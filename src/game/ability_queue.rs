//! Pending triggered abilities waiting to resolve

use crate::core::{CardId, PlayerId};
use crate::game::GameEvent;
use serde::{Deserialize, Serialize};

/// A triggered ability that has been queued but not yet resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAbility {
    /// Queue-unique sequence number
    pub id: u64,
    pub source: CardId,
    /// Index into the source card's ability list
    pub ability_index: usize,
    pub name: String,
    /// Player who resolves it (the source's owner)
    pub player: PlayerId,
    /// The event that triggered it
    pub event: GameEvent,
}

/// Insertion-ordered queue; entries are removed exactly once via `take`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbilityQueue {
    entries: Vec<PendingAbility>,
    next_id: u64,
    #[serde(skip)]
    draining: bool,
}

impl AbilityQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        source: CardId,
        ability_index: usize,
        name: impl Into<String>,
        player: PlayerId,
        event: GameEvent,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(PendingAbility {
            id,
            source,
            ability_index,
            name: name.into(),
            player,
            event,
        });
        id
    }

    /// Snapshot of one player's pending abilities, oldest first
    pub fn pending_for(&self, player: PlayerId) -> Vec<PendingAbility> {
        self.entries
            .iter()
            .filter(|p| p.player == player)
            .cloned()
            .collect()
    }

    pub fn has_pending(&self, player: PlayerId) -> bool {
        self.entries.iter().any(|p| p.player == player)
    }

    /// Remove an entry by sequence id
    pub fn take(&mut self, id: u64) -> Option<PendingAbility> {
        let pos = self.entries.iter().position(|p| p.id == id)?;
        Some(self.entries.remove(pos))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Mark a drain as running; false if one already is
    pub fn begin_drain(&mut self) -> bool {
        !std::mem::replace(&mut self.draining, true)
    }

    pub fn end_drain(&mut self) {
        self.draining = false;
    }
}
