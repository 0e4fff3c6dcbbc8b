//! The explicit game context threaded through every rules operation
//!
//! `GameContext` owns the state, the event bus, both controllers and the
//! custom effect registry. Every controller call goes through a wrapper here
//! that validates the answer against the offered options and logs it.

use crate::core::{CardId, Cost, PlayerId};
use crate::game::controller::{
    AttackType, EncoreChoice, GameStateView, HandChoice, MainPhaseAction, PlayerController,
};
use crate::game::resolve::ResolveContext;
use crate::game::{rules, EventBus, GameEvent, GameState, PendingAbility};
use crate::{EngineError, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::fmt;
use std::rc::Rc;

/// Host-registered effect, looked up by `Effect::Custom { id }`
pub type CustomEffect = Rc<dyn Fn(&mut GameContext, &ResolveContext) -> Result<()>>;

pub struct GameContext {
    pub state: GameState,
    pub bus: EventBus,
    controllers: Vec<Box<dyn PlayerController>>,
    custom_effects: FxHashMap<String, CustomEffect>,
}

fn not_offered<T: fmt::Debug>(player: PlayerId, what: &str, choice: T) -> EngineError {
    EngineError::InvalidChoice(format!("player {player} {what}: {choice:?}"))
}

impl GameContext {
    /// Build a context and attach the rule engine to the catch-all channel
    pub fn new(state: GameState, controllers: Vec<Box<dyn PlayerController>>) -> Self {
        let mut bus = EventBus::new();
        bus.subscribe_all(rules::rule_engine);
        GameContext {
            state,
            bus,
            controllers,
            custom_effects: FxHashMap::default(),
        }
    }

    /// Dispatch an event synchronously to every matching handler
    ///
    /// The event is logged before any handler sees it, so the log follows
    /// raise order. Handlers run from a snapshot taken before dispatch. The
    /// first handler error stops the dispatch and is returned.
    pub fn raise(&mut self, event: GameEvent) -> Result<()> {
        self.state.logger.event(&event);
        let handlers = self.bus.snapshot(event.kind);
        self.bus.enter()?;
        let mut result = Ok(());
        for handler in handlers {
            result = handler(&event, self);
            if result.is_err() {
                break;
            }
        }
        self.bus.leave();
        result
    }

    pub fn register_effect<F>(&mut self, id: impl Into<String>, effect: F)
    where
        F: Fn(&mut GameContext, &ResolveContext) -> Result<()> + 'static,
    {
        self.custom_effects.insert(id.into(), Rc::new(effect));
    }

    pub fn custom_effect(&self, id: &str) -> Option<CustomEffect> {
        self.custom_effects.get(id).cloned()
    }

    /// Run `f` with a player's controller and a view of the current state
    pub fn with_controller<R>(
        &mut self,
        player: PlayerId,
        f: impl FnOnce(&mut dyn PlayerController, &GameStateView) -> R,
    ) -> Result<R> {
        let GameContext {
            state, controllers, ..
        } = self;
        let controller = controllers
            .iter_mut()
            .find(|c| c.player_id() == player)
            .ok_or(EngineError::EntityNotFound(player.as_u32()))?;
        let view = GameStateView::new(state, player);
        Ok(f(controller.as_mut(), &view))
    }

    fn log_choice(&self, player: PlayerId, choice: &str) {
        let name = self
            .state
            .player(player)
            .map(|p| p.name.as_str())
            .unwrap_or("?");
        self.state.logger.controller_choice(name, choice);
    }

    fn describe(&self, card: CardId) -> String {
        self.state
            .card(card)
            .map(|c| c.to_string())
            .unwrap_or_else(|_| card.to_string())
    }

    pub fn choose_mulligan_cards(&mut self, player: PlayerId, hand: &[CardId]) -> Result<Vec<CardId>> {
        let picked = self.with_controller(player, |c, v| c.choose_mulligan_cards(v, hand))?;
        let mut seen = FxHashSet::default();
        for &card in &picked {
            if !hand.contains(&card) || !seen.insert(card) {
                return Err(not_offered(player, "mulliganed", card));
            }
        }
        self.log_choice(player, &format!("to mulligan {} card(s)", picked.len()));
        Ok(picked.into_vec())
    }

    pub fn choose_card_from_hand(
        &mut self,
        player: PlayerId,
        purpose: HandChoice,
        options: &[CardId],
        optional: bool,
    ) -> Result<Option<CardId>> {
        if options.is_empty() {
            return Ok(None);
        }
        let choice =
            self.with_controller(player, |c, v| c.choose_card_from_hand(v, purpose, options, optional))?;
        match choice {
            Some(card) if !options.contains(&card) => Err(not_offered(player, "picked from hand", card)),
            None if !optional => Err(not_offered(player, "declined a required hand choice", purpose)),
            Some(card) => {
                let verb = match purpose {
                    HandChoice::Clock => "to clock",
                    HandChoice::Discard => "to discard",
                };
                self.log_choice(player, &format!("{verb} {}", self.describe(card)));
                Ok(Some(card))
            }
            None => {
                self.log_choice(player, &format!("no card ({purpose:?})"));
                Ok(None)
            }
        }
    }

    pub fn choose_main_phase_action(
        &mut self,
        player: PlayerId,
        options: &[MainPhaseAction],
    ) -> Result<MainPhaseAction> {
        let action = self.with_controller(player, |c, v| c.choose_main_phase_action(v, options))?;
        // A character may also be aimed at any empty slot, not just the suggested one
        let offered = options.iter().any(|o| match (o, &action) {
            (
                MainPhaseAction::PlayCard { card: a, .. },
                MainPhaseAction::PlayCard { card: b, .. },
            ) => a == b,
            (o, a) => o == a,
        });
        if !offered {
            return Err(not_offered(player, "took main phase action", action));
        }
        self.log_choice(player, &format!("to {action}"));
        Ok(action)
    }

    pub fn choose_climax(&mut self, player: PlayerId, climaxes: &[CardId]) -> Result<Option<CardId>> {
        if climaxes.is_empty() {
            return Ok(None);
        }
        let choice = self.with_controller(player, |c, v| c.choose_climax(v, climaxes))?;
        if let Some(card) = choice {
            if !climaxes.contains(&card) {
                return Err(not_offered(player, "played climax", card));
            }
            self.log_choice(player, &format!("to play climax {}", self.describe(card)));
        }
        Ok(choice)
    }

    pub fn choose_to_end_attack(&mut self, player: PlayerId, attackers: &[CardId]) -> Result<bool> {
        let end = self.with_controller(player, |c, v| c.choose_to_end_attack(v, attackers))?;
        if end {
            self.log_choice(player, "to end the attack phase");
        }
        Ok(end)
    }

    pub fn choose_attacker(&mut self, player: PlayerId, attackers: &[CardId]) -> Result<CardId> {
        let card = self.with_controller(player, |c, v| c.choose_attacker(v, attackers))?;
        if !attackers.contains(&card) {
            return Err(not_offered(player, "attacked with", card));
        }
        self.log_choice(player, &format!("to attack with {}", self.describe(card)));
        Ok(card)
    }

    pub fn choose_attack_type(
        &mut self,
        player: PlayerId,
        attacker: CardId,
        options: &[AttackType],
    ) -> Result<AttackType> {
        let choice = self.with_controller(player, |c, v| c.choose_attack_type(v, attacker, options))?;
        if !options.contains(&choice) {
            return Err(not_offered(player, "chose attack type", choice));
        }
        self.log_choice(player, &format!("a {choice:?} attack"));
        Ok(choice)
    }

    pub fn choose_counter_card(&mut self, player: PlayerId, counters: &[CardId]) -> Result<Option<CardId>> {
        if counters.is_empty() {
            return Ok(None);
        }
        let choice = self.with_controller(player, |c, v| c.choose_counter_card(v, counters))?;
        if let Some(card) = choice {
            if !counters.contains(&card) {
                return Err(not_offered(player, "countered with", card));
            }
            self.log_choice(player, &format!("to counter with {}", self.describe(card)));
        }
        Ok(choice)
    }

    pub fn choose_card_from_waiting_room(
        &mut self,
        player: PlayerId,
        options: &[CardId],
        optional: bool,
    ) -> Result<Option<CardId>> {
        if options.is_empty() {
            return Ok(None);
        }
        let choice =
            self.with_controller(player, |c, v| c.choose_card_from_waiting_room(v, options, optional))?;
        match choice {
            Some(card) if !options.contains(&card) => {
                Err(not_offered(player, "picked from waiting room", card))
            }
            None if !optional => Err(not_offered(player, "declined a required choice", "waiting room")),
            Some(card) => {
                self.log_choice(player, &format!("{} from the waiting room", self.describe(card)));
                Ok(Some(card))
            }
            None => Ok(None),
        }
    }

    pub fn choose_ability_to_resolve(&mut self, player: PlayerId, pending: &[PendingAbility]) -> Result<u64> {
        let id = self.with_controller(player, |c, v| c.choose_ability_to_resolve(v, pending))?;
        let Some(chosen) = pending.iter().find(|p| p.id == id) else {
            return Err(not_offered(player, "resolved pending ability", id));
        };
        self.log_choice(
            player,
            &format!("to resolve {} of {}", chosen.name, self.describe(chosen.source)),
        );
        Ok(id)
    }

    pub fn choose_target(&mut self, player: PlayerId, candidates: &[CardId]) -> Result<Option<CardId>> {
        if candidates.is_empty() {
            return Ok(None);
        }
        let choice = self.with_controller(player, |c, v| c.choose_target(v, candidates))?;
        if let Some(card) = choice {
            if !candidates.contains(&card) {
                return Err(not_offered(player, "targeted", card));
            }
            self.log_choice(player, &format!("target {}", self.describe(card)));
        }
        Ok(choice)
    }

    pub fn ask_yes_no(&mut self, player: PlayerId, question: &str) -> Result<bool> {
        let answer = self.with_controller(player, |c, v| c.ask_yes_no(v, question))?;
        self.log_choice(player, &format!("{} ({question})", if answer { "yes" } else { "no" }));
        Ok(answer)
    }

    /// Exactly `count` distinct cards from `candidates`
    pub fn select_cards_to_pay_cost(
        &mut self,
        player: PlayerId,
        cost: &Cost,
        candidates: &[CardId],
        count: usize,
    ) -> Result<Vec<CardId>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let picked: SmallVec<[CardId; 4]> =
            self.with_controller(player, |c, v| c.select_cards_to_pay_cost(v, cost, candidates, count))?;
        let mut seen = FxHashSet::default();
        if picked.len() != count
            || picked
                .iter()
                .any(|card| !candidates.contains(card) || !seen.insert(*card))
        {
            return Err(not_offered(player, "paid cost with", picked));
        }
        self.log_choice(player, &format!("{count} card(s) to pay {cost:?}"));
        Ok(picked.into_vec())
    }

    pub fn choose_encore(
        &mut self,
        player: PlayerId,
        character: CardId,
        options: &[EncoreChoice],
    ) -> Result<EncoreChoice> {
        let choice = self.with_controller(player, |c, v| c.choose_encore(v, character, options))?;
        if !options.contains(&choice) {
            return Err(not_offered(player, "encored", choice));
        }
        self.log_choice(player, &format!("{choice:?} encore for {}", self.describe(character)));
        Ok(choice)
    }

    pub fn choose_level_up_card(&mut self, player: PlayerId, candidates: &[CardId]) -> Result<CardId> {
        let card = self.with_controller(player, |c, v| c.choose_level_up_card(v, candidates))?;
        if !candidates.contains(&card) {
            return Err(not_offered(player, "leveled up with", card));
        }
        self.log_choice(player, &format!("to level up with {}", self.describe(card)));
        Ok(card)
    }

    pub fn reset_turn_state(&mut self, player: PlayerId) -> Result<()> {
        self.with_controller(player, |c, _| c.reset_turn_state())
    }

    /// Tell every controller the game is over
    pub fn notify_game_end(&mut self, winner: Option<PlayerId>) {
        let GameContext {
            state, controllers, ..
        } = self;
        for controller in controllers.iter_mut() {
            let player = controller.player_id();
            let view = GameStateView::new(state, player);
            controller.on_game_end(&view, winner == Some(player));
        }
    }
}

impl fmt::Debug for GameContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameContext")
            .field("state", &self.state)
            .field("bus", &self.bus)
            .field("controllers", &self.controllers.len())
            .field("custom_effects", &self.custom_effects.len())
            .finish()
    }
}
