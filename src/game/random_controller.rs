//! Random controller - uniformly random legal choices
//!
//! Seed it with `with_seed` for reproducible games.

use crate::core::{CardId, Cost, PlayerId};
use crate::game::controller::{
    AttackType, EncoreChoice, GameStateView, HandChoice, MainPhaseAction, PlayerController,
};
use crate::game::PendingAbility;
use rand::seq::SliceRandom;
use rand::Rng;
use smallvec::SmallVec;

pub struct RandomController {
    player_id: PlayerId,
    rng: Box<dyn rand::RngCore>,
}

impl RandomController {
    pub fn new(player_id: PlayerId) -> Self {
        RandomController {
            player_id,
            rng: Box::new(rand::thread_rng()),
        }
    }

    pub fn with_seed(player_id: PlayerId, seed: u64) -> Self {
        use rand::SeedableRng;
        RandomController {
            player_id,
            rng: Box::new(rand::rngs::StdRng::seed_from_u64(seed)),
        }
    }

    /// `None` with probability 1/(n+1) when optional
    fn pick_optional(&mut self, options: &[CardId], optional: bool) -> Option<CardId> {
        if options.is_empty() {
            return None;
        }
        if optional && self.rng.gen_range(0..=options.len()) == options.len() {
            return None;
        }
        options.choose(&mut self.rng).copied()
    }
}

impl PlayerController for RandomController {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn choose_mulligan_cards(&mut self, _view: &GameStateView, hand: &[CardId]) -> SmallVec<[CardId; 5]> {
        hand.iter()
            .copied()
            .filter(|_| self.rng.gen_bool(0.25))
            .collect()
    }

    fn choose_card_from_hand(
        &mut self,
        _view: &GameStateView,
        _purpose: HandChoice,
        options: &[CardId],
        optional: bool,
    ) -> Option<CardId> {
        self.pick_optional(options, optional)
    }

    fn choose_main_phase_action(
        &mut self,
        _view: &GameStateView,
        options: &[MainPhaseAction],
    ) -> MainPhaseAction {
        options
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(MainPhaseAction::EndPhase)
    }

    fn choose_climax(&mut self, _view: &GameStateView, climaxes: &[CardId]) -> Option<CardId> {
        self.pick_optional(climaxes, true)
    }

    fn choose_to_end_attack(&mut self, _view: &GameStateView, _attackers: &[CardId]) -> bool {
        self.rng.gen_bool(0.1)
    }

    fn choose_attacker(&mut self, _view: &GameStateView, attackers: &[CardId]) -> CardId {
        attackers[self.rng.gen_range(0..attackers.len())]
    }

    fn choose_attack_type(
        &mut self,
        _view: &GameStateView,
        _attacker: CardId,
        options: &[AttackType],
    ) -> AttackType {
        options[self.rng.gen_range(0..options.len())]
    }

    fn choose_counter_card(&mut self, _view: &GameStateView, counters: &[CardId]) -> Option<CardId> {
        self.pick_optional(counters, true)
    }

    fn choose_card_from_waiting_room(
        &mut self,
        _view: &GameStateView,
        options: &[CardId],
        optional: bool,
    ) -> Option<CardId> {
        self.pick_optional(options, optional)
    }

    fn choose_ability_to_resolve(&mut self, _view: &GameStateView, pending: &[PendingAbility]) -> u64 {
        pending[self.rng.gen_range(0..pending.len())].id
    }

    fn choose_target(&mut self, _view: &GameStateView, candidates: &[CardId]) -> Option<CardId> {
        candidates.choose(&mut self.rng).copied()
    }

    fn ask_yes_no(&mut self, _view: &GameStateView, _question: &str) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn select_cards_to_pay_cost(
        &mut self,
        _view: &GameStateView,
        _cost: &Cost,
        candidates: &[CardId],
        count: usize,
    ) -> SmallVec<[CardId; 4]> {
        candidates
            .choose_multiple(&mut self.rng, count)
            .copied()
            .collect()
    }

    fn choose_encore(
        &mut self,
        _view: &GameStateView,
        _character: CardId,
        options: &[EncoreChoice],
    ) -> EncoreChoice {
        options[self.rng.gen_range(0..options.len())]
    }

    fn choose_level_up_card(&mut self, _view: &GameStateView, candidates: &[CardId]) -> CardId {
        candidates[self.rng.gen_range(0..candidates.len())]
    }
}
