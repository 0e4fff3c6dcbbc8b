//! Shared fixtures for unit tests

use crate::core::{CardDefinition, CardId, CardKind, PlayerId};
use crate::game::{GameContext, GameEvent, GameState, PlayerController, ZeroController};
use crate::zones::ZoneKind;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// Two empty players ("Alice" and "Bob") driven by zero controllers
pub(crate) fn bare_context() -> GameContext {
    let state = GameState::new_two_player("Alice".to_string(), "Bob".to_string());
    let controllers: Vec<Box<dyn PlayerController>> = state
        .player_ids()
        .into_iter()
        .map(|id| Box::new(ZeroController::new(id)) as Box<dyn PlayerController>)
        .collect();
    GameContext::new(state, controllers)
}

/// Vanilla character whose name is its code
pub(crate) fn character(code: &str, level: u8, cost: u8, power: i32) -> Arc<CardDefinition> {
    Arc::new(CardDefinition::new(code, code, CardKind::Character).with_stats(level, cost, power, 1))
}

pub(crate) fn climax(code: &str) -> Arc<CardDefinition> {
    Arc::new(CardDefinition::new(code, code, CardKind::Climax))
}

pub(crate) fn put(
    ctx: &mut GameContext,
    player: PlayerId,
    definition: Arc<CardDefinition>,
    zone: ZoneKind,
) -> CardId {
    ctx.state
        .add_card(definition, player, zone)
        .expect("fixture card placement")
}

/// Every event raised from now on, in dispatch-completion order
pub(crate) fn record_events(ctx: &mut GameContext) -> Rc<RefCell<Vec<GameEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    ctx.bus.subscribe_all(move |event, _| {
        sink.borrow_mut().push(event.clone());
        Ok(())
    });
    seen
}
