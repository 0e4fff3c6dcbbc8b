//! Game zones (Deck, Hand, Stock, Clock, Level, Stage, Climax, Waiting Room, ...)

use crate::core::{CardId, PlayerId};
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Board position of a stage slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StagePosition {
    FrontLeft,
    FrontCenter,
    FrontRight,
    BackLeft,
    BackRight,
}

impl StagePosition {
    pub const ALL: [StagePosition; 5] = [
        StagePosition::FrontLeft,
        StagePosition::FrontCenter,
        StagePosition::FrontRight,
        StagePosition::BackLeft,
        StagePosition::BackRight,
    ];

    pub const FRONT_ROW: [StagePosition; 3] = [
        StagePosition::FrontLeft,
        StagePosition::FrontCenter,
        StagePosition::FrontRight,
    ];

    pub fn is_front_row(&self) -> bool {
        matches!(
            self,
            StagePosition::FrontLeft | StagePosition::FrontCenter | StagePosition::FrontRight
        )
    }

    /// The opposing front-row slot this slot battles against
    ///
    /// Players face each other, so left maps to the opponent's right.
    pub fn opposing(&self) -> Option<StagePosition> {
        match self {
            StagePosition::FrontLeft => Some(StagePosition::FrontRight),
            StagePosition::FrontCenter => Some(StagePosition::FrontCenter),
            StagePosition::FrontRight => Some(StagePosition::FrontLeft),
            StagePosition::BackLeft | StagePosition::BackRight => None,
        }
    }
}

impl fmt::Display for StagePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StagePosition::FrontLeft => "front-left",
            StagePosition::FrontCenter => "front-center",
            StagePosition::FrontRight => "front-right",
            StagePosition::BackLeft => "back-left",
            StagePosition::BackRight => "back-right",
        };
        f.write_str(name)
    }
}

/// Every zone a card can be in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    Deck,
    Hand,
    WaitingRoom,
    Stock,
    Clock,
    Level,
    Climax,
    Memory,
    Resolution,
    Stage(StagePosition),
    Marker(StagePosition),
}

/// Whether the contents of a zone are known to both players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
}

impl ZoneKind {
    pub fn visibility(&self) -> Visibility {
        match self {
            ZoneKind::Deck | ZoneKind::Hand | ZoneKind::Stock | ZoneKind::Marker(_) => {
                Visibility::Private
            }
            ZoneKind::WaitingRoom
            | ZoneKind::Clock
            | ZoneKind::Level
            | ZoneKind::Climax
            | ZoneKind::Memory
            | ZoneKind::Resolution
            | ZoneKind::Stage(_) => Visibility::Public,
        }
    }

    /// Maximum number of cards the zone can hold
    pub fn capacity(&self) -> Option<usize> {
        match self {
            ZoneKind::Climax | ZoneKind::Stage(_) => Some(1),
            _ => None,
        }
    }

    pub fn is_stage(&self) -> bool {
        matches!(self, ZoneKind::Stage(_))
    }

    pub fn stage_position(&self) -> Option<StagePosition> {
        match self {
            ZoneKind::Stage(pos) => Some(*pos),
            _ => None,
        }
    }

    /// Every zone a player owns in a standard game
    pub fn standard_set() -> Vec<ZoneKind> {
        let mut kinds = vec![
            ZoneKind::Deck,
            ZoneKind::Hand,
            ZoneKind::WaitingRoom,
            ZoneKind::Stock,
            ZoneKind::Clock,
            ZoneKind::Level,
            ZoneKind::Climax,
            ZoneKind::Memory,
            ZoneKind::Resolution,
        ];
        for pos in StagePosition::ALL {
            kinds.push(ZoneKind::Stage(pos));
            kinds.push(ZoneKind::Marker(pos));
        }
        kinds
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneKind::Deck => f.write_str("deck"),
            ZoneKind::Hand => f.write_str("hand"),
            ZoneKind::WaitingRoom => f.write_str("waiting room"),
            ZoneKind::Stock => f.write_str("stock"),
            ZoneKind::Clock => f.write_str("clock"),
            ZoneKind::Level => f.write_str("level"),
            ZoneKind::Climax => f.write_str("climax"),
            ZoneKind::Memory => f.write_str("memory"),
            ZoneKind::Resolution => f.write_str("resolution"),
            ZoneKind::Stage(pos) => write!(f, "stage {pos}"),
            ZoneKind::Marker(pos) => write!(f, "markers under {pos}"),
        }
    }
}

/// An ordered zone of cards owned by one player
///
/// Ordering discipline: the last element is the "top" for the deck, stock and
/// waiting room; the clock and level zones keep insertion order so index 0 is
/// the oldest card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardZone {
    pub kind: ZoneKind,
    pub owner: PlayerId,
    pub cards: Vec<CardId>,
}

impl CardZone {
    pub fn new(kind: ZoneKind, owner: PlayerId) -> Self {
        CardZone {
            kind,
            owner,
            cards: Vec::new(),
        }
    }

    pub fn has_room(&self) -> bool {
        self.kind
            .capacity()
            .map(|cap| self.cards.len() < cap)
            .unwrap_or(true)
    }

    /// Add at the zone's natural insertion point (top, or newest end)
    pub fn add(&mut self, card_id: CardId) -> Result<()> {
        self.check_room(card_id)?;
        self.cards.push(card_id);
        Ok(())
    }

    /// Add to bottom (deck)
    pub fn add_to_bottom(&mut self, card_id: CardId) -> Result<()> {
        self.check_room(card_id)?;
        self.cards.insert(0, card_id);
        Ok(())
    }

    fn check_room(&self, card_id: CardId) -> Result<()> {
        if self.has_room() {
            return Ok(());
        }
        match self.kind {
            ZoneKind::Stage(pos) => Err(EngineError::SlotOccupied(pos.to_string())),
            kind => Err(EngineError::InvalidZoneInsert {
                card: card_id.as_u32(),
                zone: kind.to_string(),
                reason: "zone is full".to_string(),
            }),
        }
    }

    pub fn remove(&mut self, card_id: CardId) -> bool {
        if let Some(pos) = self.cards.iter().position(|&id| id == card_id) {
            // remove() rather than swap_remove(): iteration order must stay stable
            self.cards.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, card_id: CardId) -> bool {
        self.cards.contains(&card_id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Remove and return the top card
    pub fn draw_top(&mut self) -> Option<CardId> {
        self.cards.pop()
    }

    pub fn peek_top(&self) -> Option<CardId> {
        self.cards.last().copied()
    }

    /// Up to `n` cards from the top, topmost first
    pub fn peek(&self, n: usize) -> Vec<CardId> {
        self.cards.iter().rev().take(n).copied().collect()
    }

    /// Up to `n` cards from the bottom, oldest first
    pub fn bottom(&self, n: usize) -> Vec<CardId> {
        self.cards.iter().take(n).copied().collect()
    }

    /// Uniform Fisher–Yates shuffle
    pub fn shuffle(&mut self, rng: &mut impl rand::Rng) {
        use rand::seq::SliceRandom;
        self.cards.shuffle(rng);
    }
}

/// All zones of one player, keyed by kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerZones {
    pub owner: PlayerId,
    zones: BTreeMap<ZoneKind, CardZone>,
}

impl PlayerZones {
    /// A player with no zones registered
    pub fn empty(owner: PlayerId) -> Self {
        PlayerZones {
            owner,
            zones: BTreeMap::new(),
        }
    }

    /// A player with every standard zone registered
    pub fn new(owner: PlayerId) -> Self {
        let mut zones = PlayerZones::empty(owner);
        for kind in ZoneKind::standard_set() {
            zones.register(kind);
        }
        zones
    }

    pub fn register(&mut self, kind: ZoneKind) {
        let owner = self.owner;
        self.zones
            .entry(kind)
            .or_insert_with(|| CardZone::new(kind, owner));
    }

    pub fn zone(&self, kind: ZoneKind) -> Result<&CardZone> {
        self.zones.get(&kind).ok_or_else(|| self.missing(kind))
    }

    pub fn zone_mut(&mut self, kind: ZoneKind) -> Result<&mut CardZone> {
        let owner = self.owner;
        self.zones
            .get_mut(&kind)
            .ok_or_else(|| EngineError::MissingZone {
                player: owner.as_u32(),
                zone: kind.to_string(),
            })
    }

    fn missing(&self, kind: ZoneKind) -> EngineError {
        EngineError::MissingZone {
            player: self.owner.as_u32(),
            zone: kind.to_string(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardZone> {
        self.zones.values()
    }

    /// Cards in a zone, or an empty slice when the zone is not registered
    pub fn cards(&self, kind: ZoneKind) -> &[CardId] {
        self.zones
            .get(&kind)
            .map(|z| z.cards.as_slice())
            .unwrap_or(&[])
    }

    pub fn count(&self, kind: ZoneKind) -> usize {
        self.cards(kind).len()
    }

    pub fn character_at(&self, pos: StagePosition) -> Option<CardId> {
        self.zones
            .get(&ZoneKind::Stage(pos))
            .and_then(|z| z.cards.first().copied())
    }

    /// Occupied stage slots in board order
    pub fn stage_characters(&self) -> Vec<(StagePosition, CardId)> {
        StagePosition::ALL
            .iter()
            .filter_map(|&pos| self.character_at(pos).map(|id| (pos, id)))
            .collect()
    }

    pub fn first_empty_slot(&self) -> Option<StagePosition> {
        StagePosition::ALL.iter().copied().find(|&pos| {
            self.zones
                .get(&ZoneKind::Stage(pos))
                .map(|z| z.is_empty())
                .unwrap_or(false)
        })
    }
}
