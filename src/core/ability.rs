//! Ability definitions and their per-card instances
//!
//! Abilities are data: an `AbilityDefinition` on the card definition is turned
//! into an `Ability` bound to each physical copy. There is no text parsing.

use crate::core::costs::{can_pay_all, Cost};
use crate::core::effects::Effect;
use crate::core::{Card, CardId, PlayerId};
use crate::game::{GameEvent, GameEventKind, GameState, PhaseId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Triggered by events, queued and resolved by the rule engine
    Auto,
    /// Used by its controller during an open activation window
    Activated,
    /// Always-on modifier while the source is in play
    Continuous,
}

/// Whose events a trigger listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventScope {
    /// The event's card is the ability's source
    Source,
    /// The event concerns the source's owner
    Owner,
    /// The event concerns the owner's opponent
    Opponent,
    Any,
}

/// One conjunct of an ability's trigger condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerCondition {
    OnEvent { kind: GameEventKind, scope: EventScope },
    /// This card was played from hand
    WhenPlayed,
    /// This card attacks
    WhenAttacks,
    /// This card becomes reversed
    WhenReversed,
    /// At the start of its owner's phase
    PhaseStart(PhaseId),
    SourceOnStage,
    SourceStanding,
    /// The owner has a climax in the climax zone
    ClimaxInPlay,
    DuringOwnersTurn,
}

impl TriggerCondition {
    /// Whether the condition names an event rather than a board state
    pub fn is_event_condition(&self) -> bool {
        matches!(
            self,
            TriggerCondition::OnEvent { .. }
                | TriggerCondition::WhenPlayed
                | TriggerCondition::WhenAttacks
                | TriggerCondition::WhenReversed
                | TriggerCondition::PhaseStart(_)
        )
    }

    pub fn is_satisfied(&self, event: Option<&GameEvent>, state: &GameState, source: &Card) -> bool {
        let event_card_is_source = || event.and_then(|e| e.card) == Some(source.id);
        match self {
            TriggerCondition::OnEvent { kind, scope } => {
                let Some(event) = event else { return false };
                if event.kind != *kind {
                    return false;
                }
                match scope {
                    EventScope::Source => event.card == Some(source.id),
                    EventScope::Owner => event.player == Some(source.owner),
                    EventScope::Opponent => {
                        event.player.is_some() && event.player != Some(source.owner)
                    }
                    EventScope::Any => true,
                }
            }
            TriggerCondition::WhenPlayed => {
                event.map(|e| e.kind) == Some(GameEventKind::CardPlayed) && event_card_is_source()
            }
            TriggerCondition::WhenAttacks => {
                event.map(|e| e.kind) == Some(GameEventKind::AttackDeclared)
                    && event_card_is_source()
            }
            TriggerCondition::WhenReversed => {
                event.map(|e| e.kind) == Some(GameEventKind::CharacterReversed)
                    && event_card_is_source()
            }
            TriggerCondition::PhaseStart(phase) => {
                event.map(|e| e.kind) == Some(GameEventKind::PhaseStarted)
                    && event.and_then(|e| e.phase) == Some(*phase)
                    && state.turn.active_player == source.owner
            }
            TriggerCondition::SourceOnStage => source.zone().is_stage(),
            TriggerCondition::SourceStanding => source.zone().is_stage() && source.is_standing(),
            TriggerCondition::ClimaxInPlay => state
                .zones(source.owner)
                .map(|z| z.count(crate::zones::ZoneKind::Climax) > 0)
                .unwrap_or(false),
            TriggerCondition::DuringOwnersTurn => state.turn.active_player == source.owner,
        }
    }
}

/// When an activated ability may be used
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActivationWindow {
    /// Empty means any phase
    #[serde(default)]
    pub phases: Vec<PhaseId>,
    /// Empty means no event restriction
    #[serde(default)]
    pub events: Vec<GameEventKind>,
}

impl ActivationWindow {
    pub fn main_phase() -> Self {
        ActivationWindow {
            phases: vec![PhaseId::Main],
            events: Vec::new(),
        }
    }

    pub fn is_open(&self, state: &GameState, event: Option<&GameEvent>) -> bool {
        let phase_ok = self.phases.is_empty()
            || state
                .current_phase
                .map(|p| self.phases.contains(&p))
                .unwrap_or(false);
        let event_ok = self.events.is_empty()
            || event.map(|e| self.events.contains(&e.kind)).unwrap_or(false);
        phase_ok && event_ok
    }
}

/// Structured ability data attached to a card definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityDefinition {
    pub name: String,
    pub kind: AbilityKind,
    /// Printed text, display only
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub triggers: Vec<TriggerCondition>,
    #[serde(default)]
    pub window: ActivationWindow,
    #[serde(default)]
    pub costs: Vec<Cost>,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

impl AbilityDefinition {
    pub fn new(name: impl Into<String>, kind: AbilityKind) -> Self {
        AbilityDefinition {
            name: name.into(),
            kind,
            text: String::new(),
            triggers: Vec::new(),
            window: if kind == AbilityKind::Activated {
                ActivationWindow::main_phase()
            } else {
                ActivationWindow::default()
            },
            costs: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn trigger(mut self, condition: TriggerCondition) -> Self {
        self.triggers.push(condition);
        self
    }

    pub fn cost(mut self, cost: Cost) -> Self {
        self.costs.push(cost);
        self
    }

    pub fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn window(mut self, window: ActivationWindow) -> Self {
        self.window = window;
        self
    }
}

/// An ability bound to one physical card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub source: CardId,
    /// Position in the card's ability list
    pub index: usize,
    pub name: String,
    pub kind: AbilityKind,
    pub triggers: Vec<TriggerCondition>,
    pub window: ActivationWindow,
    pub costs: Vec<Cost>,
    pub effects: Vec<Effect>,
}

impl Ability {
    pub fn from_definition(def: &AbilityDefinition, source: CardId, index: usize) -> Self {
        Ability {
            source,
            index,
            name: def.name.clone(),
            kind: def.kind,
            triggers: def.triggers.clone(),
            window: def.window.clone(),
            costs: def.costs.clone(),
            effects: def.effects.clone(),
        }
    }

    /// Vacuously true with no conditions, otherwise every condition must hold
    pub fn can_trigger(&self, event: Option<&GameEvent>, state: &GameState) -> bool {
        let Ok(source) = state.cards.get(self.source) else {
            return false;
        };
        self.triggers
            .iter()
            .all(|cond| cond.is_satisfied(event, state, source))
    }

    /// Auto abilities must name at least one event to be scanned at all
    pub fn listens_for_events(&self) -> bool {
        self.triggers.iter().any(|t| t.is_event_condition())
    }

    pub fn can_pay(&self, state: &GameState, player: PlayerId) -> bool {
        can_pay_all(&self.costs, state, player, self.source)
    }

    pub fn can_activate(&self, event: Option<&GameEvent>, state: &GameState, player: PlayerId) -> bool {
        self.window.is_open(state, event) && self.can_trigger(event, state) && self.can_pay(state, player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_builder() {
        let def = AbilityDefinition::new("Rally", AbilityKind::Activated)
            .cost(Cost::Stock(1))
            .effect(Effect::Draw { count: 1 });
        assert_eq!(def.window, ActivationWindow::main_phase());
        assert_eq!(def.costs, vec![Cost::Stock(1)]);

        let ability = Ability::from_definition(&def, CardId::new(4), 0);
        assert_eq!(ability.source, CardId::new(4));
        assert_eq!(ability.kind, AbilityKind::Activated);
        assert!(!ability.listens_for_events());
    }

    #[test]
    fn test_event_conditions() {
        assert!(TriggerCondition::WhenAttacks.is_event_condition());
        assert!(TriggerCondition::PhaseStart(PhaseId::Climax).is_event_condition());
        assert!(!TriggerCondition::ClimaxInPlay.is_event_condition());
    }
}
