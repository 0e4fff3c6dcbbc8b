//! Core game types and entities

pub mod ability;
pub mod card;
pub mod costs;
pub mod effects;
pub mod entity;
pub mod player;
pub mod types;

pub use ability::{
    Ability, AbilityDefinition, AbilityKind, ActivationWindow, EventScope, TriggerCondition,
};
pub use card::{Card, CardColor, CardDefinition, CardId, CardKind, Orientation, TriggerIcon};
pub use costs::{CardFilter, Cost};
pub use effects::{Effect, EffectTarget, Keyword};
pub use entity::{EntityId, EntityStore};
pub use player::{LossReason, Player, PlayerId, DEFAULT_HAND_LIMIT};
pub use types::{CardCode, CardName, CardTrait, PlayerName};
