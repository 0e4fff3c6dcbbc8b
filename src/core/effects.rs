//! Card effects and keyword abilities

use crate::core::costs::{CardFilter, Cost};
use crate::zones::ZoneKind;
use serde::{Deserialize, Serialize};

/// Which cards an effect applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectTarget {
    /// The card the ability belongs to
    Source,
    /// One of your characters, chosen on resolution
    ChosenCharacter,
    /// Every character on your stage
    AllYourCharacters,
    /// The character currently being attacked or defending (counter step)
    BattleOpponent,
}

/// Keyword abilities with engine-level meaning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keyword {
    /// Special encore: pay these costs instead of 3 stock
    Encore(Vec<Cost>),
    /// Counter from hand: +power to the defender, usable at `level` or above
    Backup { power: i32, level: u8 },
}

/// Basic card effects that can be executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Draw cards
    Draw { count: u8 },

    /// +power until end of turn (or while active, for continuous abilities)
    PowerBoost { target: EffectTarget, amount: i32 },

    /// +soul until end of turn (or while active, for continuous abilities)
    SoulBoost { target: EffectTarget, amount: i32 },

    /// Look at the top `count` cards, take up to one into hand, rest to waiting room
    LookTopAndTake { count: u8, filter: CardFilter },

    /// Search the deck for a matching card, put it into hand, then shuffle
    SearchDeck { filter: CardFilter },

    /// Return a matching card from the waiting room to hand
    ReturnFromWaitingRoom { filter: CardFilter },

    /// Move the target to another of its owner's zones
    MoveToZone { target: EffectTarget, zone: ZoneKind },

    /// Newest `count` clock cards to the waiting room
    Heal { count: u8 },

    /// Cancellable damage to the opponent
    DealDamage { amount: u8 },

    /// Reveal the top `reveal` cards into the waiting room; draw one per climax
    Brainstorm { reveal: u8 },

    /// Top `count` deck cards into stock
    StockCharge { count: u8 },

    /// Host-registered effect looked up by id at resolution time
    Custom { id: String },
}
