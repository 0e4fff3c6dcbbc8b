//! Zero controller - always picks the first available option
//!
//! Deterministic and allocation-light, useful for tests and benchmarks:
//! - keeps the opening hand
//! - clocks the first hand card
//! - plays the first playable card, never activates abilities
//! - attacks with everything, front attack first
//! - encores whenever it can

use crate::core::{CardId, Cost, PlayerId};
use crate::game::controller::{
    AttackType, EncoreChoice, GameStateView, HandChoice, MainPhaseAction, PlayerController,
};
use crate::game::PendingAbility;
use smallvec::SmallVec;

pub struct ZeroController {
    player_id: PlayerId,
}

impl ZeroController {
    pub fn new(player_id: PlayerId) -> Self {
        ZeroController { player_id }
    }
}

impl PlayerController for ZeroController {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn choose_mulligan_cards(&mut self, _view: &GameStateView, _hand: &[CardId]) -> SmallVec<[CardId; 5]> {
        SmallVec::new()
    }

    fn choose_card_from_hand(
        &mut self,
        _view: &GameStateView,
        _purpose: HandChoice,
        options: &[CardId],
        _optional: bool,
    ) -> Option<CardId> {
        options.first().copied()
    }

    fn choose_main_phase_action(
        &mut self,
        _view: &GameStateView,
        options: &[MainPhaseAction],
    ) -> MainPhaseAction {
        options
            .iter()
            .copied()
            .find(|a| matches!(a, MainPhaseAction::PlayCard { .. }))
            .unwrap_or(MainPhaseAction::EndPhase)
    }

    fn choose_climax(&mut self, _view: &GameStateView, climaxes: &[CardId]) -> Option<CardId> {
        climaxes.first().copied()
    }

    fn choose_to_end_attack(&mut self, _view: &GameStateView, _attackers: &[CardId]) -> bool {
        false
    }

    fn choose_attacker(&mut self, _view: &GameStateView, attackers: &[CardId]) -> CardId {
        attackers[0]
    }

    fn choose_attack_type(
        &mut self,
        _view: &GameStateView,
        _attacker: CardId,
        options: &[AttackType],
    ) -> AttackType {
        options[0]
    }

    fn choose_counter_card(&mut self, _view: &GameStateView, counters: &[CardId]) -> Option<CardId> {
        counters.first().copied()
    }

    fn choose_card_from_waiting_room(
        &mut self,
        _view: &GameStateView,
        options: &[CardId],
        _optional: bool,
    ) -> Option<CardId> {
        options.first().copied()
    }

    fn choose_ability_to_resolve(&mut self, _view: &GameStateView, pending: &[PendingAbility]) -> u64 {
        pending[0].id
    }

    fn choose_target(&mut self, _view: &GameStateView, candidates: &[CardId]) -> Option<CardId> {
        candidates.first().copied()
    }

    fn ask_yes_no(&mut self, _view: &GameStateView, _question: &str) -> bool {
        true
    }

    fn select_cards_to_pay_cost(
        &mut self,
        _view: &GameStateView,
        _cost: &Cost,
        candidates: &[CardId],
        count: usize,
    ) -> SmallVec<[CardId; 4]> {
        candidates.iter().take(count).copied().collect()
    }

    fn choose_encore(
        &mut self,
        _view: &GameStateView,
        _character: CardId,
        options: &[EncoreChoice],
    ) -> EncoreChoice {
        options
            .iter()
            .copied()
            .find(|c| *c != EncoreChoice::Decline)
            .unwrap_or(EncoreChoice::Decline)
    }

    fn choose_level_up_card(&mut self, _view: &GameStateView, candidates: &[CardId]) -> CardId {
        candidates[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameState;

    #[test]
    fn test_zero_controller_prefers_first_choices() {
        let game = GameState::new_two_player("Alice".to_string(), "Bob".to_string());
        let p1 = game.players[0].id;
        let view = GameStateView::new(&game, p1);
        let mut controller = ZeroController::new(p1);

        let cards = [CardId::new(10), CardId::new(11)];
        assert_eq!(controller.player_id(), p1);
        assert_eq!(controller.choose_climax(&view, &cards), Some(CardId::new(10)));
        assert!(controller.choose_mulligan_cards(&view, &cards).is_empty());
        assert_eq!(
            controller.choose_main_phase_action(
                &view,
                &[
                    MainPhaseAction::EndPhase,
                    MainPhaseAction::PlayCard { card: cards[1], slot: None }
                ]
            ),
            MainPhaseAction::PlayCard { card: cards[1], slot: None }
        );
        assert_eq!(
            controller.choose_encore(
                &view,
                cards[0],
                &[EncoreChoice::Decline, EncoreChoice::Standard]
            ),
            EncoreChoice::Standard
        );
        let picked = controller.select_cards_to_pay_cost(&view, &Cost::Clock(1), &cards, 1);
        assert_eq!(picked.as_slice(), &[CardId::new(10)]);
    }
}
