//! Main game state structure

use crate::core::{
    AbilityKind, Card, CardDefinition, CardId, CardKind, Effect, EffectTarget, EntityStore,
    LossReason, Player, PlayerId, DEFAULT_HAND_LIMIT,
};
use crate::game::{AbilityQueue, AttackType, GameLogger, PhaseId};
use crate::zones::{PlayerZones, StagePosition, Visibility, ZoneKind};
use crate::{EngineError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::sync::Arc;

/// Tunable rules parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub opening_hand_size: usize,
    pub hand_limit: usize,
    /// Clock size that forces a level up
    pub level_up_threshold: usize,
    /// Level count that loses the game
    pub losing_level: usize,
    pub standard_encore_stock: u8,
    /// Turn cap for the game loop
    pub max_turns: u32,
    /// Seed for the game RNG
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            opening_hand_size: 5,
            hand_limit: DEFAULT_HAND_LIMIT,
            level_up_threshold: 7,
            losing_level: 4,
            standard_encore_stock: 3,
            max_turns: 200,
            seed: 0,
        }
    }
}

/// Turn counter and active player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnState {
    /// Current turn number (starts at 1)
    pub turn_number: u32,
    pub active_player: PlayerId,
    /// Active player's index in `GameState::players`
    pub active_player_idx: usize,
}

/// The attack currently being resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackState {
    pub attacker: CardId,
    pub attacker_slot: StagePosition,
    pub defender: Option<CardId>,
    pub attack_type: AttackType,
    pub soul_boost: i32,
}

/// Complete game state
///
/// Holds every card, zone and player. Mutation of card locations goes
/// through `move_card` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// All cards in the game
    pub cards: EntityStore<Card>,

    /// Players in turn order
    pub players: Vec<Player>,

    /// Zones for each player
    pub player_zones: Vec<(PlayerId, PlayerZones)>,

    pub turn: TurnState,

    /// Innermost phase being executed, used by activation windows
    pub current_phase: Option<PhaseId>,

    pub ability_queue: AbilityQueue,

    pub attack: Option<AttackState>,

    pub config: GameConfig,

    /// Game RNG (shuffles). RefCell so it can be drawn from through `&self`.
    pub rng: RefCell<ChaCha12Rng>,

    /// Unified entity ID generator
    next_entity_id: u32,

    /// Centralized logger for game events
    pub logger: GameLogger,
}

impl GameState {
    /// Create a new game with two players and standard zones
    pub fn new_two_player(player1_name: String, player2_name: String) -> Self {
        let p1_id = PlayerId::new(0);
        let p2_id = PlayerId::new(1);

        GameState {
            cards: EntityStore::new(),
            players: vec![Player::new(p1_id, player1_name), Player::new(p2_id, player2_name)],
            player_zones: vec![(p1_id, PlayerZones::new(p1_id)), (p2_id, PlayerZones::new(p2_id))],
            turn: TurnState {
                turn_number: 1,
                active_player: p1_id,
                active_player_idx: 0,
            },
            current_phase: None,
            ability_queue: AbilityQueue::new(),
            attack: None,
            config: GameConfig::default(),
            rng: RefCell::new(ChaCha12Rng::seed_from_u64(0)),
            next_entity_id: 2,
            logger: GameLogger::new(),
        }
    }

    pub fn with_config(mut self, config: GameConfig) -> Self {
        for player in &mut self.players {
            player.hand_limit = config.hand_limit;
        }
        self.seed_rng(config.seed);
        self.config = config;
        self
    }

    /// Set the RNG seed for deterministic shuffles
    pub fn seed_rng(&mut self, seed: u64) {
        *self.rng.borrow_mut() = ChaCha12Rng::seed_from_u64(seed);
    }

    pub fn next_card_id(&mut self) -> CardId {
        let id = CardId::new(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    /// Create one physical copy of a definition directly in a zone
    pub fn add_card(
        &mut self,
        definition: Arc<CardDefinition>,
        owner: PlayerId,
        zone: ZoneKind,
    ) -> Result<CardId> {
        if zone == ZoneKind::Climax && definition.kind != CardKind::Climax {
            return Err(EngineError::InvalidZoneInsert {
                card: self.next_entity_id,
                zone: zone.to_string(),
                reason: "only climax cards may enter the climax zone".to_string(),
            });
        }
        let id = self.next_card_id();
        self.zones_mut(owner)?.zone_mut(zone)?.add(id)?;
        self.cards.insert(id, Card::new(id, definition, owner, zone));
        Ok(id)
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or(EngineError::EntityNotFound(id.as_u32()))
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(EngineError::EntityNotFound(id.as_u32()))
    }

    pub fn player_idx(&self, id: PlayerId) -> Result<usize> {
        self.players
            .iter()
            .position(|p| p.id == id)
            .ok_or(EngineError::EntityNotFound(id.as_u32()))
    }

    pub fn opponent_of(&self, id: PlayerId) -> Result<PlayerId> {
        self.players
            .iter()
            .find(|p| p.id != id)
            .map(|p| p.id)
            .ok_or(EngineError::EntityNotFound(id.as_u32()))
    }

    pub fn active_player(&self) -> PlayerId {
        self.turn.active_player
    }

    /// Pass the turn to the next player in seat order
    pub fn advance_turn(&mut self) {
        let n = self.players.len().max(1);
        self.turn.active_player_idx = (self.turn.active_player_idx + 1) % n;
        if let Some(player) = self.players.get(self.turn.active_player_idx) {
            self.turn.active_player = player.id;
        }
        self.turn.turn_number += 1;
        self.current_phase = None;
    }

    /// Active player first, then the others in seat order
    pub fn players_from_active(&self) -> Vec<PlayerId> {
        let n = self.players.len();
        (0..n)
            .map(|i| self.players[(self.turn.active_player_idx + i) % n].id)
            .collect()
    }

    pub fn zones(&self, player_id: PlayerId) -> Result<&PlayerZones> {
        self.player_zones
            .iter()
            .find(|(id, _)| *id == player_id)
            .map(|(_, zones)| zones)
            .ok_or(EngineError::EntityNotFound(player_id.as_u32()))
    }

    pub fn zones_mut(&mut self, player_id: PlayerId) -> Result<&mut PlayerZones> {
        self.player_zones
            .iter_mut()
            .find(|(id, _)| *id == player_id)
            .map(|(_, zones)| zones)
            .ok_or(EngineError::EntityNotFound(player_id.as_u32()))
    }

    pub fn card(&self, id: CardId) -> Result<&Card> {
        self.cards.get(id)
    }

    pub fn card_mut(&mut self, id: CardId) -> Result<&mut Card> {
        self.cards.get_mut(id)
    }

    /// Move a card to the natural insertion point of another zone
    pub fn move_card(&mut self, card_id: CardId, to: ZoneKind) -> Result<()> {
        self.relocate(card_id, to, false)
    }

    /// Move a card to the bottom of a zone (deck)
    pub fn move_card_to_bottom(&mut self, card_id: CardId, to: ZoneKind) -> Result<()> {
        self.relocate(card_id, to, true)
    }

    /// The single atomic move: validate everything, then mutate
    fn relocate(&mut self, card_id: CardId, to: ZoneKind, bottom: bool) -> Result<()> {
        let (owner, from, kind) = {
            let card = self.cards.get(card_id)?;
            (card.owner, card.zone, card.kind())
        };

        if to == ZoneKind::Climax && kind != CardKind::Climax {
            return Err(EngineError::InvalidZoneInsert {
                card: card_id.as_u32(),
                zone: to.to_string(),
                reason: "only climax cards may enter the climax zone".to_string(),
            });
        }

        {
            let zones = self.zones(owner)?;
            if !zones.zone(from)?.contains(card_id) {
                return Err(EngineError::InvariantViolation(format!(
                    "card {card_id} records zone {from} but is not in it"
                )));
            }
            let dest = zones.zone(to)?;
            if from != to && !dest.has_room() {
                return Err(match to {
                    ZoneKind::Stage(pos) => EngineError::SlotOccupied(pos.to_string()),
                    _ => EngineError::InvalidZoneInsert {
                        card: card_id.as_u32(),
                        zone: to.to_string(),
                        reason: "zone is full".to_string(),
                    },
                });
            }
        }

        let zones = self.zones_mut(owner)?;
        zones.zone_mut(from)?.remove(card_id);
        let dest = zones.zone_mut(to)?;
        if bottom {
            dest.add_to_bottom(card_id)?;
        } else {
            dest.add(card_id)?;
        }

        let card = self.cards.get_mut(card_id)?;
        if from.is_stage() && !to.is_stage() {
            card.clear_stage_state();
        }
        card.zone = to;
        card.face_up = to.visibility() == Visibility::Public;

        log_if_verbose!(self.logger, "{} moves {} -> {}", card_id, from, to);
        Ok(())
    }

    /// Shuffle a player's deck using the game's RNG
    pub fn shuffle_deck(&mut self, player_id: PlayerId) -> Result<()> {
        let rng = &self.rng;
        let zones = self
            .player_zones
            .iter_mut()
            .find(|(id, _)| *id == player_id)
            .map(|(_, z)| z)
            .ok_or(EngineError::EntityNotFound(player_id.as_u32()))?;
        zones.zone_mut(ZoneKind::Deck)?.shuffle(&mut *rng.borrow_mut());
        Ok(())
    }

    pub fn count(&self, player_id: PlayerId, kind: ZoneKind) -> Result<usize> {
        Ok(self.zones(player_id)?.zone(kind)?.len())
    }

    pub fn level_of(&self, player_id: PlayerId) -> usize {
        self.zones(player_id)
            .map(|z| z.count(ZoneKind::Level))
            .unwrap_or(0)
    }

    pub fn stage_position_of(&self, card_id: CardId) -> Option<StagePosition> {
        self.cards
            .get(card_id)
            .ok()
            .and_then(|c| c.zone().stage_position())
    }

    /// Sum of every continuous modifier that currently applies to a card
    fn continuous_bonus(&self, card: &Card, pick: fn(&Effect) -> Option<(EffectTarget, i32)>) -> i32 {
        let Ok(zones) = self.zones(card.owner) else {
            return 0;
        };
        let on_stage = card.zone().is_stage();
        let mut sources: Vec<CardId> = zones.stage_characters().into_iter().map(|(_, id)| id).collect();
        sources.extend_from_slice(zones.cards(ZoneKind::Climax));

        let mut bonus = 0;
        for source_id in sources {
            let Ok(source) = self.cards.get(source_id) else {
                continue;
            };
            for ability in source.abilities.iter().filter(|a| a.kind == AbilityKind::Continuous) {
                if !ability.can_trigger(None, self) {
                    continue;
                }
                for (target, amount) in ability.effects.iter().filter_map(pick) {
                    let applies = match target {
                        EffectTarget::Source => source_id == card.id,
                        EffectTarget::AllYourCharacters => on_stage,
                        EffectTarget::ChosenCharacter | EffectTarget::BattleOpponent => false,
                    };
                    if applies {
                        bonus += amount;
                    }
                }
            }
        }
        bonus
    }

    /// Printed power plus temporary and continuous modifiers
    pub fn effective_power(&self, card_id: CardId) -> Result<i32> {
        let card = self.cards.get(card_id)?;
        let bonus = self.continuous_bonus(card, |e| match e {
            Effect::PowerBoost { target, amount } => Some((*target, *amount)),
            _ => None,
        });
        Ok(card.definition.power + card.temp_power + bonus)
    }

    /// Printed soul plus temporary and continuous modifiers, never negative
    pub fn effective_soul(&self, card_id: CardId) -> Result<i32> {
        let card = self.cards.get(card_id)?;
        let bonus = self.continuous_bonus(card, |e| match e {
            Effect::SoulBoost { target, amount } => Some((*target, *amount)),
            _ => None,
        });
        Ok((card.definition.soul as i32 + card.temp_soul + bonus).max(0))
    }

    /// Drop "until end of turn" modifiers on every card
    pub fn clear_temporary_modifiers(&mut self) {
        for id in self.cards.sorted_ids() {
            if let Ok(card) = self.cards.get_mut(id) {
                card.temp_power = 0;
                card.temp_soul = 0;
            }
        }
    }

    /// First player found to have lost, with the reason
    ///
    /// Covers recorded losses and the level-zone threshold.
    pub fn check_loss_conditions(&self) -> Option<(PlayerId, LossReason)> {
        for player in &self.players {
            if let Some(reason) = player.lost {
                return Some((player.id, reason));
            }
            if self.level_of(player.id) >= self.config.losing_level {
                return Some((player.id, LossReason::LevelFour));
            }
        }
        None
    }

    pub fn is_game_over(&self) -> bool {
        self.check_loss_conditions().is_some()
    }

    /// Every card is in exactly one zone and that zone matches `Card::zone`
    pub fn check_zone_invariants(&self) -> Result<()> {
        let mut seen = rustc_hash::FxHashMap::default();
        for (owner, zones) in &self.player_zones {
            for zone in zones.iter() {
                for &card_id in &zone.cards {
                    if let Some(previous) = seen.insert(card_id, zone.kind) {
                        return Err(EngineError::InvariantViolation(format!(
                            "card {card_id} is in both {previous} and {}",
                            zone.kind
                        )));
                    }
                    let card = self.cards.get(card_id)?;
                    if card.zone != zone.kind || card.owner != *owner {
                        return Err(EngineError::InvariantViolation(format!(
                            "card {card_id} is in {} of player {owner} but records {} of player {}",
                            zone.kind, card.zone, card.owner
                        )));
                    }
                }
            }
        }
        if seen.len() != self.cards.len() {
            return Err(EngineError::InvariantViolation(format!(
                "{} cards exist but {} are in zones",
                self.cards.len(),
                seen.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CardKind;

    fn def(code: &str, kind: CardKind) -> Arc<CardDefinition> {
        Arc::new(CardDefinition::new(code, code, kind).with_stats(0, 0, 3000, 1))
    }

    #[test]
    fn test_move_card_keeps_membership_consistent() {
        let mut game = GameState::new_two_player("Alice".to_string(), "Bob".to_string());
        let p1 = game.players[0].id;
        let card = game.add_card(def("A", CardKind::Character), p1, ZoneKind::Hand).unwrap();

        game.move_card(card, ZoneKind::Stage(StagePosition::FrontCenter)).unwrap();
        assert_eq!(game.card(card).unwrap().zone(), ZoneKind::Stage(StagePosition::FrontCenter));
        assert_eq!(game.count(p1, ZoneKind::Hand).unwrap(), 0);
        assert_eq!(game.stage_position_of(card), Some(StagePosition::FrontCenter));
        assert!(game.card(card).unwrap().face_up);
        game.check_zone_invariants().unwrap();
    }

    #[test]
    fn test_leaving_stage_clears_state() {
        let mut game = GameState::new_two_player("Alice".to_string(), "Bob".to_string());
        let p1 = game.players[0].id;
        let card = game
            .add_card(def("A", CardKind::Character), p1, ZoneKind::Stage(StagePosition::FrontLeft))
            .unwrap();
        game.card_mut(card).unwrap().reverse();
        game.card_mut(card).unwrap().temp_power = 500;

        game.move_card(card, ZoneKind::WaitingRoom).unwrap();
        let moved = game.card(card).unwrap();
        assert!(moved.is_standing());
        assert_eq!(moved.temp_power, 0);
    }

    #[test]
    fn test_climax_zone_rejects_other_kinds() {
        let mut game = GameState::new_two_player("Alice".to_string(), "Bob".to_string());
        let p1 = game.players[0].id;
        let chara = game.add_card(def("A", CardKind::Character), p1, ZoneKind::Hand).unwrap();
        let cx = game.add_card(def("CX", CardKind::Climax), p1, ZoneKind::Hand).unwrap();

        assert!(matches!(
            game.move_card(chara, ZoneKind::Climax),
            Err(EngineError::InvalidZoneInsert { .. })
        ));
        // Failed move left the card where it was
        assert_eq!(game.card(chara).unwrap().zone(), ZoneKind::Hand);

        game.move_card(cx, ZoneKind::Climax).unwrap();
        game.check_zone_invariants().unwrap();
    }

    #[test]
    fn test_occupied_slot_is_an_error() {
        let mut game = GameState::new_two_player("Alice".to_string(), "Bob".to_string());
        let p1 = game.players[0].id;
        let slot = ZoneKind::Stage(StagePosition::FrontRight);
        game.add_card(def("A", CardKind::Character), p1, slot).unwrap();
        let second = game.add_card(def("B", CardKind::Character), p1, ZoneKind::Hand).unwrap();

        assert!(matches!(
            game.move_card(second, slot),
            Err(EngineError::SlotOccupied(_))
        ));
        assert_eq!(game.card(second).unwrap().zone(), ZoneKind::Hand);
        game.check_zone_invariants().unwrap();
    }

    #[test]
    fn test_missing_zone_fails_fast() {
        let mut game = GameState::new_two_player("Alice".to_string(), "Bob".to_string());
        let p1 = game.players[0].id;
        game.player_zones[0].1 = PlayerZones::empty(p1);
        game.zones_mut(p1).unwrap().register(ZoneKind::Hand);
        let card = game.add_card(def("A", CardKind::Character), p1, ZoneKind::Hand).unwrap();

        assert!(matches!(
            game.move_card(card, ZoneKind::Stock),
            Err(EngineError::MissingZone { .. })
        ));
        assert_eq!(game.card(card).unwrap().zone(), ZoneKind::Hand);
    }

    #[test]
    fn test_level_four_is_a_loss() {
        let mut game = GameState::new_two_player("Alice".to_string(), "Bob".to_string());
        let p2 = game.players[1].id;
        for i in 0..3 {
            game.add_card(def(&format!("L{i}"), CardKind::Character), p2, ZoneKind::Level)
                .unwrap();
        }
        assert_eq!(game.check_loss_conditions(), None);

        game.add_card(def("L3", CardKind::Character), p2, ZoneKind::Level).unwrap();
        assert_eq!(game.check_loss_conditions(), Some((p2, LossReason::LevelFour)));
        assert!(game.is_game_over());
    }

    #[test]
    fn test_players_from_active() {
        let mut game = GameState::new_two_player("Alice".to_string(), "Bob".to_string());
        let (p1, p2) = (game.players[0].id, game.players[1].id);
        assert_eq!(game.players_from_active(), vec![p1, p2]);
        game.turn.active_player = p2;
        game.turn.active_player_idx = 1;
        assert_eq!(game.players_from_active(), vec![p2, p1]);
        assert_eq!(game.opponent_of(p2).unwrap(), p1);
    }
}
