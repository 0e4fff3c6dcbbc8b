//! Scripted player controller for tests
//!
//! Answers come from per-decision queues. Once a queue runs dry the decision
//! falls back to `ZeroController`, except the main phase, which ends.

use crate::core::{CardId, Cost, PlayerId};
use crate::game::controller::{
    AttackType, EncoreChoice, GameStateView, HandChoice, MainPhaseAction, PlayerController,
};
use crate::game::{PendingAbility, ZeroController};
use smallvec::SmallVec;
use std::collections::VecDeque;

pub struct ScriptedController {
    fallback: ZeroController,
    main_actions: VecDeque<MainPhaseAction>,
    clock_picks: VecDeque<Option<CardId>>,
    level_up_picks: VecDeque<CardId>,
    /// Source cards, in the order their pending abilities should resolve
    resolve_order: VecDeque<CardId>,
    attack_types: VecDeque<AttackType>,
    answers: VecDeque<bool>,
    encores: VecDeque<EncoreChoice>,
    counters: VecDeque<Option<CardId>>,
    max_attacks: Option<usize>,
    attacks_this_turn: usize,
}

impl ScriptedController {
    pub fn new(player_id: PlayerId) -> Self {
        ScriptedController {
            fallback: ZeroController::new(player_id),
            main_actions: VecDeque::new(),
            clock_picks: VecDeque::new(),
            level_up_picks: VecDeque::new(),
            resolve_order: VecDeque::new(),
            attack_types: VecDeque::new(),
            answers: VecDeque::new(),
            encores: VecDeque::new(),
            counters: VecDeque::new(),
            max_attacks: None,
            attacks_this_turn: 0,
        }
    }

    pub fn with_main_actions(mut self, actions: impl IntoIterator<Item = MainPhaseAction>) -> Self {
        self.main_actions.extend(actions);
        self
    }

    pub fn with_clock_picks(mut self, picks: impl IntoIterator<Item = Option<CardId>>) -> Self {
        self.clock_picks.extend(picks);
        self
    }

    pub fn with_level_up_picks(mut self, picks: impl IntoIterator<Item = CardId>) -> Self {
        self.level_up_picks.extend(picks);
        self
    }

    pub fn with_resolve_order(mut self, sources: impl IntoIterator<Item = CardId>) -> Self {
        self.resolve_order.extend(sources);
        self
    }

    pub fn with_attack_types(mut self, types: impl IntoIterator<Item = AttackType>) -> Self {
        self.attack_types.extend(types);
        self
    }

    pub fn with_answers(mut self, answers: impl IntoIterator<Item = bool>) -> Self {
        self.answers.extend(answers);
        self
    }

    pub fn with_encores(mut self, encores: impl IntoIterator<Item = EncoreChoice>) -> Self {
        self.encores.extend(encores);
        self
    }

    pub fn with_counters(mut self, counters: impl IntoIterator<Item = Option<CardId>>) -> Self {
        self.counters.extend(counters);
        self
    }

    /// Stop attacking after `n` attacks each turn
    pub fn with_max_attacks(mut self, n: usize) -> Self {
        self.max_attacks = Some(n);
        self
    }
}

impl PlayerController for ScriptedController {
    fn player_id(&self) -> PlayerId {
        self.fallback.player_id()
    }

    fn choose_mulligan_cards(&mut self, view: &GameStateView, hand: &[CardId]) -> SmallVec<[CardId; 5]> {
        self.fallback.choose_mulligan_cards(view, hand)
    }

    fn choose_card_from_hand(
        &mut self,
        view: &GameStateView,
        purpose: HandChoice,
        options: &[CardId],
        optional: bool,
    ) -> Option<CardId> {
        if purpose == HandChoice::Clock {
            if let Some(pick) = self.clock_picks.pop_front() {
                return pick;
            }
        }
        self.fallback.choose_card_from_hand(view, purpose, options, optional)
    }

    fn choose_main_phase_action(
        &mut self,
        _view: &GameStateView,
        _options: &[MainPhaseAction],
    ) -> MainPhaseAction {
        self.main_actions.pop_front().unwrap_or(MainPhaseAction::EndPhase)
    }

    fn choose_climax(&mut self, view: &GameStateView, climaxes: &[CardId]) -> Option<CardId> {
        self.fallback.choose_climax(view, climaxes)
    }

    fn choose_to_end_attack(&mut self, _view: &GameStateView, _attackers: &[CardId]) -> bool {
        self.max_attacks
            .map(|max| self.attacks_this_turn >= max)
            .unwrap_or(false)
    }

    fn choose_attacker(&mut self, view: &GameStateView, attackers: &[CardId]) -> CardId {
        self.attacks_this_turn += 1;
        self.fallback.choose_attacker(view, attackers)
    }

    fn choose_attack_type(
        &mut self,
        view: &GameStateView,
        attacker: CardId,
        options: &[AttackType],
    ) -> AttackType {
        match self.attack_types.pop_front() {
            Some(t) => t,
            None => self.fallback.choose_attack_type(view, attacker, options),
        }
    }

    fn choose_counter_card(&mut self, view: &GameStateView, counters: &[CardId]) -> Option<CardId> {
        match self.counters.pop_front() {
            Some(pick) => pick,
            None => self.fallback.choose_counter_card(view, counters),
        }
    }

    fn choose_card_from_waiting_room(
        &mut self,
        view: &GameStateView,
        options: &[CardId],
        optional: bool,
    ) -> Option<CardId> {
        self.fallback.choose_card_from_waiting_room(view, options, optional)
    }

    fn choose_ability_to_resolve(&mut self, view: &GameStateView, pending: &[PendingAbility]) -> u64 {
        while let Some(source) = self.resolve_order.pop_front() {
            if let Some(p) = pending.iter().find(|p| p.source == source) {
                return p.id;
            }
        }
        self.fallback.choose_ability_to_resolve(view, pending)
    }

    fn choose_target(&mut self, view: &GameStateView, candidates: &[CardId]) -> Option<CardId> {
        self.fallback.choose_target(view, candidates)
    }

    fn ask_yes_no(&mut self, view: &GameStateView, question: &str) -> bool {
        match self.answers.pop_front() {
            Some(answer) => answer,
            None => self.fallback.ask_yes_no(view, question),
        }
    }

    fn select_cards_to_pay_cost(
        &mut self,
        view: &GameStateView,
        cost: &Cost,
        candidates: &[CardId],
        count: usize,
    ) -> SmallVec<[CardId; 4]> {
        self.fallback.select_cards_to_pay_cost(view, cost, candidates, count)
    }

    fn choose_encore(
        &mut self,
        view: &GameStateView,
        character: CardId,
        options: &[EncoreChoice],
    ) -> EncoreChoice {
        match self.encores.pop_front() {
            Some(choice) => choice,
            None => self.fallback.choose_encore(view, character, options),
        }
    }

    fn choose_level_up_card(&mut self, view: &GameStateView, candidates: &[CardId]) -> CardId {
        match self.level_up_picks.pop_front() {
            Some(pick) => pick,
            None => self.fallback.choose_level_up_card(view, candidates),
        }
    }

    fn reset_turn_state(&mut self) {
        self.attacks_this_turn = 0;
    }
}
