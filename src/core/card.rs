//! Card definitions and card instances

use crate::core::{Ability, AbilityDefinition, CardCode, CardName, CardTrait, EntityId, Keyword, PlayerId};
use crate::zones::ZoneKind;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub type CardId = EntityId<Card>;

/// The three card types of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    Character,
    Event,
    Climax,
}

impl FromStr for CardKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "character" | "chara" => Ok(CardKind::Character),
            "event" => Ok(CardKind::Event),
            "climax" | "cx" => Ok(CardKind::Climax),
            other => Err(format!("unknown card kind '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardColor {
    Yellow,
    Green,
    Red,
    Blue,
    Purple,
}

/// Icon resolved during the trigger step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerIcon {
    /// +1 soul for the current attack
    Soul,
    /// Return a character from the waiting room to hand
    Comeback,
    /// Draw a card
    Draw,
}

impl FromStr for TriggerIcon {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "soul" => Ok(TriggerIcon::Soul),
            "comeback" | "door" => Ok(TriggerIcon::Comeback),
            "draw" | "book" => Ok(TriggerIcon::Draw),
            other => Err(format!("unknown trigger icon '{other}'")),
        }
    }
}

/// Immutable printed data for a card
///
/// One definition is shared by every physical copy built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub code: CardCode,
    pub name: CardName,
    pub kind: CardKind,
    pub color: CardColor,
    pub level: u8,
    /// Stock paid to play the card
    pub cost: u8,
    pub power: i32,
    pub soul: u8,
    #[serde(default)]
    pub triggers: SmallVec<[TriggerIcon; 2]>,
    #[serde(default)]
    pub traits: Vec<CardTrait>,
    /// Printed ability text, kept for display only
    #[serde(default)]
    pub ability_text: Vec<String>,
    /// Structured abilities the engine executes
    #[serde(default)]
    pub abilities: Vec<AbilityDefinition>,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    #[serde(default)]
    pub flavor: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl CardDefinition {
    /// Minimal definition, mostly for tests and demo pools
    pub fn new(code: impl Into<CardCode>, name: impl Into<CardName>, kind: CardKind) -> Self {
        CardDefinition {
            code: code.into(),
            name: name.into(),
            kind,
            color: CardColor::Yellow,
            level: 0,
            cost: 0,
            power: 0,
            soul: if kind == CardKind::Character { 1 } else { 0 },
            triggers: SmallVec::new(),
            traits: Vec::new(),
            ability_text: Vec::new(),
            abilities: Vec::new(),
            keywords: Vec::new(),
            flavor: String::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_stats(mut self, level: u8, cost: u8, power: i32, soul: u8) -> Self {
        self.level = level;
        self.cost = cost;
        self.power = power;
        self.soul = soul;
        self
    }

    pub fn with_color(mut self, color: CardColor) -> Self {
        self.color = color;
        self
    }

    pub fn with_trigger(mut self, icon: TriggerIcon) -> Self {
        self.triggers.push(icon);
        self
    }

    pub fn with_ability(mut self, ability: AbilityDefinition) -> Self {
        self.ability_text.push(ability.text.clone());
        self.abilities.push(ability);
        self
    }

    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keywords.push(keyword);
        self
    }

    pub fn with_trait(mut self, t: impl Into<CardTrait>) -> Self {
        self.traits.push(t.into());
        self
    }
}

/// Physical orientation of a card on the stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Standing,
    /// Turned sideways (tapped)
    Rested,
    /// Upside down after losing a battle
    Reversed,
}

/// A physical card during gameplay
///
/// Lives for the whole game and is always in exactly one zone. `zone` is only
/// written by `GameState::move_card`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub definition: Arc<CardDefinition>,
    pub owner: PlayerId,
    pub(crate) zone: ZoneKind,
    pub orientation: Orientation,
    pub face_up: bool,
    /// "Until end of turn" modifiers
    pub temp_power: i32,
    pub temp_soul: i32,
    pub abilities: Vec<Ability>,
}

impl Card {
    pub fn new(id: CardId, definition: Arc<CardDefinition>, owner: PlayerId, zone: ZoneKind) -> Self {
        let abilities = definition
            .abilities
            .iter()
            .enumerate()
            .map(|(index, def)| Ability::from_definition(def, id, index))
            .collect();
        Card {
            id,
            definition,
            owner,
            zone,
            orientation: Orientation::Standing,
            face_up: zone.visibility() == crate::zones::Visibility::Public,
            temp_power: 0,
            temp_soul: 0,
            abilities,
        }
    }

    pub fn zone(&self) -> ZoneKind {
        self.zone
    }

    pub fn name(&self) -> &str {
        self.definition.name.as_str()
    }

    pub fn code(&self) -> &CardCode {
        &self.definition.code
    }

    pub fn kind(&self) -> CardKind {
        self.definition.kind
    }

    pub fn is_character(&self) -> bool {
        self.kind() == CardKind::Character
    }

    pub fn is_climax(&self) -> bool {
        self.kind() == CardKind::Climax
    }

    pub fn is_event(&self) -> bool {
        self.kind() == CardKind::Event
    }

    pub fn level(&self) -> u8 {
        self.definition.level
    }

    pub fn is_standing(&self) -> bool {
        self.orientation == Orientation::Standing
    }

    pub fn is_rested(&self) -> bool {
        self.orientation == Orientation::Rested
    }

    pub fn is_reversed(&self) -> bool {
        self.orientation == Orientation::Reversed
    }

    pub fn rest(&mut self) {
        self.orientation = Orientation::Rested;
    }

    pub fn stand(&mut self) {
        self.orientation = Orientation::Standing;
    }

    pub fn reverse(&mut self) {
        self.orientation = Orientation::Reversed;
    }

    /// Drop every state that only exists while the card is on the stage
    pub fn clear_stage_state(&mut self) {
        self.orientation = Orientation::Standing;
        self.temp_power = 0;
        self.temp_soul = 0;
    }

    pub fn has_backup(&self) -> Option<(i32, u8)> {
        self.definition.keywords.iter().find_map(|k| match k {
            Keyword::Backup { power, level } => Some((*power, *level)),
            _ => None,
        })
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.id)
    }
}
