//! Typed publish/subscribe event bus
//!
//! Dispatch is synchronous and reentrant: a handler receives the whole
//! `GameContext` and may raise further events before the outer `raise`
//! returns. Type-specific handlers run first in subscription order, then the
//! catch-all handlers. Handler errors propagate to the raiser.

use crate::core::{CardId, PlayerId};
use crate::game::{GameContext, PhaseId};
use crate::zones::ZoneKind;
use crate::Result;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Dispatch depth allowed in debug builds before a trigger loop is reported
pub const MAX_DISPATCH_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEventKind {
    TurnStarted,
    TurnEnded,
    PhaseStarted,
    PhaseEnded,
    MulliganCompleted,
    AllCharactersStood,
    CardDrawn,
    CardPlayed,
    CardMoved,
    CardClocked,
    CardDiscarded,
    ClimaxPlayed,
    ClimaxCleared,
    DeckRefresh,
    RefreshPenalty,
    DeckEmptyLose,
    AttackDeclared,
    TriggerReveal,
    CardAddedToStock,
    CounterStepStarted,
    CounterPlayed,
    DamageTaken,
    DamageCancelled,
    BattleStarted,
    CharacterReversed,
    AttackEnded,
    EncoreDeclared,
    LevelUp,
    PlayerLost,
    AbilityTriggered,
    AbilityActivated,
    AbilityResolved,
    AbilityCancelled,
}

/// Something that happened in the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub kind: GameEventKind,
    /// Player the event concerns
    pub player: Option<PlayerId>,
    pub card: Option<CardId>,
    /// Second card involved (defender in battle, destination slot holder, ...)
    pub other_card: Option<CardId>,
    pub amount: i32,
    pub phase: Option<PhaseId>,
    pub zone: Option<ZoneKind>,
}

impl GameEvent {
    pub fn new(kind: GameEventKind) -> Self {
        GameEvent {
            kind,
            player: None,
            card: None,
            other_card: None,
            amount: 0,
            phase: None,
            zone: None,
        }
    }

    pub fn for_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    pub fn with_card(mut self, card: CardId) -> Self {
        self.card = Some(card);
        self
    }

    pub fn with_other_card(mut self, card: CardId) -> Self {
        self.other_card = Some(card);
        self
    }

    pub fn with_amount(mut self, amount: i32) -> Self {
        self.amount = amount;
        self
    }

    pub fn in_phase(mut self, phase: PhaseId) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn to_zone(mut self, zone: ZoneKind) -> Self {
        self.zone = Some(zone);
        self
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(player) = self.player {
            write!(f, " player={player}")?;
        }
        if let Some(card) = self.card {
            write!(f, " card={card}")?;
        }
        if let Some(other) = self.other_card {
            write!(f, " other={other}")?;
        }
        if self.amount != 0 {
            write!(f, " amount={}", self.amount)?;
        }
        if let Some(phase) = self.phase {
            write!(f, " phase={}", phase.as_str())?;
        }
        if let Some(zone) = self.zone {
            write!(f, " zone={zone}")?;
        }
        Ok(())
    }
}

/// Event handler: gets the event and full mutable access to the game
pub type EventHandler = Rc<dyn Fn(&GameEvent, &mut GameContext) -> Result<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Subscription tables; `GameContext::raise` performs the dispatch
#[derive(Default)]
pub struct EventBus {
    typed: FxHashMap<GameEventKind, Vec<(SubscriptionId, EventHandler)>>,
    all: Vec<(SubscriptionId, EventHandler)>,
    next_id: u64,
    depth: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn subscribe<F>(&mut self, kind: GameEventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&GameEvent, &mut GameContext) -> Result<()> + 'static,
    {
        let id = self.allocate_id();
        self.typed
            .entry(kind)
            .or_default()
            .push((id, Rc::new(handler)));
        id
    }

    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: Fn(&GameEvent, &mut GameContext) -> Result<()> + 'static,
    {
        let id = self.allocate_id();
        self.all.push((id, Rc::new(handler)));
        id
    }

    /// Remove a subscription; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handler_count();
        for handlers in self.typed.values_mut() {
            handlers.retain(|(sub, _)| *sub != id);
        }
        self.all.retain(|(sub, _)| *sub != id);
        self.handler_count() != before
    }

    pub fn handler_count(&self) -> usize {
        self.typed.values().map(Vec::len).sum::<usize>() + self.all.len()
    }

    /// Handlers for one dispatch: typed first, then catch-all
    ///
    /// Returned as a snapshot so handlers may (un)subscribe during dispatch.
    pub(crate) fn snapshot(&self, kind: GameEventKind) -> Vec<EventHandler> {
        let typed = self.typed.get(&kind).into_iter().flatten();
        typed
            .chain(self.all.iter())
            .map(|(_, handler)| Rc::clone(handler))
            .collect()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        #[cfg(debug_assertions)]
        if self.depth > MAX_DISPATCH_DEPTH {
            self.depth -= 1;
            return Err(crate::EngineError::DispatchDepthExceeded(MAX_DISPATCH_DEPTH));
        }
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handler_count())
            .field("depth", &self.depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::test_support::bare_context;
    use std::cell::RefCell;

    #[test]
    fn test_typed_handlers_run_before_catch_all() {
        let mut ctx = bare_context();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = Rc::clone(&order);
        ctx.bus.subscribe_all(move |_, _| {
            o.borrow_mut().push("all");
            Ok(())
        });
        let o = Rc::clone(&order);
        ctx.bus.subscribe(GameEventKind::CardDrawn, move |_, _| {
            o.borrow_mut().push("typed-1");
            Ok(())
        });
        let o = Rc::clone(&order);
        ctx.bus.subscribe(GameEventKind::CardDrawn, move |_, _| {
            o.borrow_mut().push("typed-2");
            Ok(())
        });

        ctx.raise(GameEvent::new(GameEventKind::CardDrawn)).unwrap();
        assert_eq!(*order.borrow(), vec!["typed-1", "typed-2", "all"]);

        order.borrow_mut().clear();
        ctx.raise(GameEvent::new(GameEventKind::LevelUp)).unwrap();
        assert_eq!(*order.borrow(), vec!["all"]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut ctx = bare_context();
        let hits = Rc::new(RefCell::new(0));
        let h = Rc::clone(&hits);
        let id = ctx.bus.subscribe(GameEventKind::TurnStarted, move |_, _| {
            *h.borrow_mut() += 1;
            Ok(())
        });

        ctx.raise(GameEvent::new(GameEventKind::TurnStarted)).unwrap();
        assert!(ctx.bus.unsubscribe(id));
        assert!(!ctx.bus.unsubscribe(id));
        ctx.raise(GameEvent::new(GameEventKind::TurnStarted)).unwrap();
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn test_reentrant_dispatch() {
        let mut ctx = bare_context();
        let seen = Rc::new(RefCell::new(Vec::new()));

        ctx.bus.subscribe(GameEventKind::AttackDeclared, |_, ctx| {
            ctx.raise(GameEvent::new(GameEventKind::TriggerReveal))
        });
        let s = Rc::clone(&seen);
        ctx.bus.subscribe_all(move |event, _| {
            s.borrow_mut().push(event.kind);
            Ok(())
        });

        ctx.raise(GameEvent::new(GameEventKind::AttackDeclared)).unwrap();
        // The nested event finishes dispatching before the outer catch-all runs
        assert_eq!(
            *seen.borrow(),
            vec![GameEventKind::TriggerReveal, GameEventKind::AttackDeclared]
        );
        assert_eq!(ctx.bus.depth(), 0);
    }

    #[test]
    fn test_handler_error_propagates() {
        let mut ctx = bare_context();
        ctx.bus.subscribe(GameEventKind::LevelUp, |_, _| {
            Err(crate::EngineError::InvalidAction("boom".to_string()))
        });
        assert!(ctx.raise(GameEvent::new(GameEventKind::LevelUp)).is_err());
        assert_eq!(ctx.bus.depth(), 0);
    }

    #[cfg(debug_assertions)]
    #[test]
    fn test_runaway_trigger_loop_is_reported() {
        let mut ctx = bare_context();
        ctx.bus.subscribe(GameEventKind::CardMoved, |event, ctx| {
            ctx.raise(event.clone())
        });
        let result = ctx.raise(GameEvent::new(GameEventKind::CardMoved));
        assert!(matches!(
            result,
            Err(crate::EngineError::DispatchDepthExceeded(_))
        ));
        assert_eq!(ctx.bus.depth(), 0);
    }
}
