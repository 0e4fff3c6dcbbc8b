//! Player representation

use crate::core::{EntityId, PlayerName};
use serde::{Deserialize, Serialize};

pub type PlayerId = EntityId<Player>;

/// Default hand-size limit checked in the end phase
pub const DEFAULT_HAND_LIMIT: usize = 7;

/// Why a player lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    /// Needed to draw with an empty deck and empty waiting room
    DeckOut,
    /// Reached level 4
    LevelFour,
}

/// Represents a player in the game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: PlayerName,
    pub hand_limit: usize,
    /// Set once the player has lost; never cleared
    pub lost: Option<LossReason>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<PlayerName>) -> Self {
        Player {
            id,
            name: name.into(),
            hand_limit: DEFAULT_HAND_LIMIT,
            lost: None,
        }
    }

    pub fn has_lost(&self) -> bool {
        self.lost.is_some()
    }

    /// Record a loss, keeping the first reason if already lost
    pub fn mark_lost(&mut self, reason: LossReason) {
        if self.lost.is_none() {
            self.lost = Some(reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_creation() {
        let player = Player::new(PlayerId::new(1), "Alice");
        assert_eq!(player.name.as_str(), "Alice");
        assert_eq!(player.hand_limit, 7);
        assert!(!player.has_lost());
    }

    #[test]
    fn test_first_loss_reason_sticks() {
        let mut player = Player::new(PlayerId::new(1), "Bob");
        player.mark_lost(LossReason::LevelFour);
        player.mark_lost(LossReason::DeckOut);
        assert_eq!(player.lost, Some(LossReason::LevelFour));
    }
}
