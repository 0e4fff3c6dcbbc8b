//! Player controller trait and game state view
//!
//! The engine calls the controller whenever the rules need a decision and
//! blocks until it returns. Controllers only see a read-only `GameStateView`.
//! Every answer is checked against the options that were offered; a choice
//! outside them is `EngineError::InvalidChoice`.

use crate::core::{CardId, CardKind, Cost, PlayerId};
use crate::game::{GameState, PendingAbility, PhaseId};
use crate::zones::{StagePosition, ZoneKind};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Reference to one ability of one card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbilityRef {
    pub source: CardId,
    pub index: usize,
}

/// Something the active player may do in the main phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MainPhaseAction {
    /// Play a card from hand; characters go to `slot`, or the first empty one
    PlayCard {
        card: CardId,
        slot: Option<StagePosition>,
    },
    ActivateAbility(AbilityRef),
    EndPhase,
}

impl fmt::Display for MainPhaseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MainPhaseAction::PlayCard { card, slot: Some(slot) } => {
                write!(f, "play {card} to {slot}")
            }
            MainPhaseAction::PlayCard { card, slot: None } => write!(f, "play {card}"),
            MainPhaseAction::ActivateAbility(r) => {
                write!(f, "activate ability {} of {}", r.index, r.source)
            }
            MainPhaseAction::EndPhase => write!(f, "end main phase"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackType {
    /// Battle the opposing character
    Front,
    /// No battle; soul reduced by the defender's level
    Side,
    /// Empty opposing slot; +1 soul
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncoreChoice {
    Decline,
    /// Pay 3 stock
    Standard,
    /// Pay the card's own encore cost
    Special,
}

/// Why the engine asks for a card from hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandChoice {
    /// Clock phase: put a card into the clock for two draws
    Clock,
    /// End phase: discard down to the hand limit
    Discard,
}

/// Read-only view of game state for controllers
pub struct GameStateView<'a> {
    game: &'a GameState,
    player_id: PlayerId,
}

impl<'a> GameStateView<'a> {
    pub fn new(game: &'a GameState, player_id: PlayerId) -> Self {
        GameStateView { game, player_id }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn opponent_id(&self) -> Option<PlayerId> {
        self.game.opponent_of(self.player_id).ok()
    }

    pub fn turn_number(&self) -> u32 {
        self.game.turn.turn_number
    }

    pub fn is_my_turn(&self) -> bool {
        self.game.turn.active_player == self.player_id
    }

    pub fn current_phase(&self) -> Option<PhaseId> {
        self.game.current_phase
    }

    fn zone_cards(&self, player: PlayerId, kind: ZoneKind) -> &'a [CardId] {
        self.game
            .zones(player)
            .map(|z| z.cards(kind))
            .unwrap_or(&[])
    }

    pub fn hand(&self) -> &'a [CardId] {
        self.zone_cards(self.player_id, ZoneKind::Hand)
    }

    pub fn waiting_room(&self) -> &'a [CardId] {
        self.zone_cards(self.player_id, ZoneKind::WaitingRoom)
    }

    pub fn stock_count(&self) -> usize {
        self.zone_cards(self.player_id, ZoneKind::Stock).len()
    }

    pub fn clock_count(&self) -> usize {
        self.zone_cards(self.player_id, ZoneKind::Clock).len()
    }

    pub fn deck_count(&self) -> usize {
        self.zone_cards(self.player_id, ZoneKind::Deck).len()
    }

    pub fn level(&self) -> usize {
        self.game.level_of(self.player_id)
    }

    /// Occupied slots of a player's stage
    pub fn stage(&self, player: PlayerId) -> Vec<(StagePosition, CardId)> {
        self.game
            .zones(player)
            .map(|z| z.stage_characters())
            .unwrap_or_default()
    }

    pub fn card_name(&self, card_id: CardId) -> Option<&'a str> {
        self.game.cards.get(card_id).ok().map(|c| c.name())
    }

    pub fn card_kind(&self, card_id: CardId) -> Option<CardKind> {
        self.game.cards.get(card_id).ok().map(|c| c.kind())
    }

    pub fn card_level(&self, card_id: CardId) -> Option<u8> {
        self.game.cards.get(card_id).ok().map(|c| c.level())
    }

    pub fn card_cost(&self, card_id: CardId) -> Option<u8> {
        self.game.cards.get(card_id).ok().map(|c| c.definition.cost)
    }

    /// Power including every active modifier
    pub fn power(&self, card_id: CardId) -> Option<i32> {
        self.game.effective_power(card_id).ok()
    }

    pub fn soul(&self, card_id: CardId) -> Option<i32> {
        self.game.effective_soul(card_id).ok()
    }

    pub fn is_standing(&self, card_id: CardId) -> bool {
        self.game
            .cards
            .get(card_id)
            .map(|c| c.is_standing())
            .unwrap_or(false)
    }
}

/// Decision callbacks, one per kind of choice the rules require
///
/// Optional choices take `Option` and `None` means "decline". Slice arguments
/// are the complete set of legal answers.
pub trait PlayerController {
    fn player_id(&self) -> PlayerId;

    /// Cards to send to the waiting room from the opening hand (may be empty)
    fn choose_mulligan_cards(&mut self, view: &GameStateView, hand: &[CardId]) -> SmallVec<[CardId; 5]>;

    /// Pick one hand card. `optional` allows `None`.
    fn choose_card_from_hand(
        &mut self,
        view: &GameStateView,
        purpose: HandChoice,
        options: &[CardId],
        optional: bool,
    ) -> Option<CardId>;

    /// `options` always contains `MainPhaseAction::EndPhase`
    fn choose_main_phase_action(
        &mut self,
        view: &GameStateView,
        options: &[MainPhaseAction],
    ) -> MainPhaseAction;

    fn choose_climax(&mut self, view: &GameStateView, climaxes: &[CardId]) -> Option<CardId>;

    /// Return true to stop declaring attacks this turn
    fn choose_to_end_attack(&mut self, view: &GameStateView, attackers: &[CardId]) -> bool;

    fn choose_attacker(&mut self, view: &GameStateView, attackers: &[CardId]) -> CardId;

    fn choose_attack_type(
        &mut self,
        view: &GameStateView,
        attacker: CardId,
        options: &[AttackType],
    ) -> AttackType;

    /// Backup card to play in the counter step, if any
    fn choose_counter_card(&mut self, view: &GameStateView, counters: &[CardId]) -> Option<CardId>;

    fn choose_card_from_waiting_room(
        &mut self,
        view: &GameStateView,
        options: &[CardId],
        optional: bool,
    ) -> Option<CardId>;

    /// Pick which of several pending abilities resolves next; returns its sequence id
    fn choose_ability_to_resolve(&mut self, view: &GameStateView, pending: &[PendingAbility]) -> u64;

    /// Target for an effect; `None` skips the effect
    fn choose_target(&mut self, view: &GameStateView, candidates: &[CardId]) -> Option<CardId>;

    fn ask_yes_no(&mut self, view: &GameStateView, question: &str) -> bool;

    /// Exactly `count` distinct cards out of `candidates`
    fn select_cards_to_pay_cost(
        &mut self,
        view: &GameStateView,
        cost: &Cost,
        candidates: &[CardId],
        count: usize,
    ) -> SmallVec<[CardId; 4]>;

    fn choose_encore(
        &mut self,
        view: &GameStateView,
        character: CardId,
        options: &[EncoreChoice],
    ) -> EncoreChoice;

    /// Exactly one of the seven cards being cleared from the clock
    fn choose_level_up_card(&mut self, view: &GameStateView, candidates: &[CardId]) -> CardId;

    /// Called at the start of each of this player's turns
    fn reset_turn_state(&mut self) {}

    fn on_game_end(&mut self, _view: &GameStateView, _won: bool) {}
}
