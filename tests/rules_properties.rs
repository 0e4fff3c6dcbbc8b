//! Rule-level properties checked through the public API
//!
//! Deck exhaustion, damage cancellation, level-up boundaries and the loss
//! threshold, each over a range of sizes.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use ws_engine::core::{CardDefinition, CardKind, LossReason, PlayerId};
use ws_engine::game::{
    GameContext, GameEvent, GameEventKind, GameState, PlayerController, ZeroController,
};
use ws_engine::zones::ZoneKind;

fn new_context() -> GameContext {
    let state = GameState::new_two_player("Alice".to_string(), "Bob".to_string());
    let controllers: Vec<Box<dyn PlayerController>> = state
        .player_ids()
        .into_iter()
        .map(|id| Box::new(ZeroController::new(id)) as Box<dyn PlayerController>)
        .collect();
    GameContext::new(state, controllers)
}

fn vanilla(code: &str) -> Arc<CardDefinition> {
    Arc::new(CardDefinition::new(code, code, CardKind::Character).with_stats(0, 0, 1000, 1))
}

fn climax(code: &str) -> Arc<CardDefinition> {
    Arc::new(CardDefinition::new(code, code, CardKind::Climax))
}

fn fill(ctx: &mut GameContext, player: PlayerId, zone: ZoneKind, n: usize) {
    for i in 0..n {
        ctx.state
            .add_card(vanilla(&format!("{zone}-{i}")), player, zone)
            .unwrap();
    }
}

fn count_events(ctx: &mut GameContext, kind: GameEventKind) -> Rc<RefCell<Vec<GameEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    ctx.bus.subscribe(kind, move |event, _| {
        sink.borrow_mut().push(event.clone());
        Ok(())
    });
    seen
}

fn successful_draws(ctx: &mut GameContext, player: PlayerId) -> usize {
    let mut draws = 0;
    while ctx.draw_card(player).unwrap().is_some() {
        draws += 1;
        assert!(draws < 1000, "drawing never ran out");
    }
    draws
}

#[test]
fn deck_exhaustion_with_empty_waiting_room() {
    for n in [0, 1, 5, 20] {
        let mut ctx = new_context();
        let p1 = ctx.state.players[0].id;
        fill(&mut ctx, p1, ZoneKind::Deck, n);
        let lost = count_events(&mut ctx, GameEventKind::DeckEmptyLose);

        assert_eq!(successful_draws(&mut ctx, p1), n, "deck of {n}");
        assert_eq!(lost.borrow().len(), 1);
        assert_eq!(ctx.state.count(p1, ZoneKind::Clock).unwrap(), 0);
        ctx.state.check_zone_invariants().unwrap();
    }
}

#[test]
fn deck_exhaustion_pays_one_card_per_refresh() {
    for (n, m) in [(0, 1), (3, 1), (5, 4), (10, 6)] {
        let mut ctx = new_context();
        let p1 = ctx.state.players[0].id;
        fill(&mut ctx, p1, ZoneKind::Deck, n);
        fill(&mut ctx, p1, ZoneKind::WaitingRoom, m);
        let refreshes = count_events(&mut ctx, GameEventKind::DeckRefresh);

        // The refresh penalty takes one card, and the drawn cards sit in hand
        // so the second attempt to refresh finds an empty waiting room.
        assert_eq!(successful_draws(&mut ctx, p1), n + m - 1, "deck {n}, waiting room {m}");
        assert_eq!(refreshes.borrow().len(), 1);
        assert_eq!(ctx.state.count(p1, ZoneKind::Clock).unwrap(), 1);
        ctx.state.check_zone_invariants().unwrap();
    }
}

#[test]
fn climax_cancels_remaining_damage() {
    for (before_climax, amount) in [(0, 1), (0, 3), (2, 3), (1, 5)] {
        let mut ctx = new_context();
        let p2 = ctx.state.players[1].id;
        fill(&mut ctx, p2, ZoneKind::Deck, 5);
        let cx = ctx.state.add_card(climax("CX"), p2, ZoneKind::Deck).unwrap();
        fill(&mut ctx, p2, ZoneKind::Deck, before_climax);
        let cancelled = count_events(&mut ctx, GameEventKind::DamageCancelled);

        let dealt = ctx.apply_damage(p2, amount).unwrap();
        let expected = before_climax.min(amount as usize);
        assert_eq!(dealt as usize, expected);
        assert_eq!(ctx.state.count(p2, ZoneKind::Clock).unwrap(), expected);
        if (amount as usize) > before_climax {
            assert_eq!(ctx.state.card(cx).unwrap().zone(), ZoneKind::WaitingRoom);
            assert_eq!(cancelled.borrow().len(), 1);
        } else {
            assert_eq!(ctx.state.card(cx).unwrap().zone(), ZoneKind::Deck);
            assert!(cancelled.borrow().is_empty());
        }
    }
}

#[test]
fn level_up_needs_a_full_clock_row() {
    let mut ctx = new_context();
    let p1 = ctx.state.players[0].id;
    fill(&mut ctx, p1, ZoneKind::Deck, 10);
    let level_ups = count_events(&mut ctx, GameEventKind::LevelUp);

    assert_eq!(ctx.apply_damage(p1, 6).unwrap(), 6);
    assert!(level_ups.borrow().is_empty());
    assert_eq!(ctx.state.count(p1, ZoneKind::Clock).unwrap(), 6);

    assert_eq!(ctx.apply_damage(p1, 1).unwrap(), 1);
    assert_eq!(level_ups.borrow().len(), 1);
    assert_eq!(ctx.state.level_of(p1), 1);
    assert_eq!(ctx.state.count(p1, ZoneKind::Clock).unwrap(), 0);
    assert_eq!(ctx.state.count(p1, ZoneKind::WaitingRoom).unwrap(), 6);
    ctx.state.check_zone_invariants().unwrap();
}

#[test]
fn fourth_level_loses_but_third_does_not() {
    for (levels, loses) in [(2, false), (3, true)] {
        let mut ctx = new_context();
        let p1 = ctx.state.players[0].id;
        fill(&mut ctx, p1, ZoneKind::Level, levels);
        fill(&mut ctx, p1, ZoneKind::Clock, 6);
        fill(&mut ctx, p1, ZoneKind::Deck, 3);

        ctx.apply_damage(p1, 1).unwrap();
        assert_eq!(ctx.state.level_of(p1), levels + 1);
        let expected = loses.then_some(LossReason::LevelFour);
        assert_eq!(ctx.state.player(p1).unwrap().lost, expected);
        assert_eq!(ctx.state.is_game_over(), loses);
    }
}

#[test]
fn damage_stops_once_the_game_is_over() {
    let mut ctx = new_context();
    let p1 = ctx.state.players[0].id;
    fill(&mut ctx, p1, ZoneKind::Level, 3);
    fill(&mut ctx, p1, ZoneKind::Clock, 6);
    fill(&mut ctx, p1, ZoneKind::Deck, 5);

    assert_eq!(ctx.apply_damage(p1, 4).unwrap(), 1);
    assert_eq!(ctx.state.count(p1, ZoneKind::Deck).unwrap(), 4);
}

#[test]
fn climax_zone_only_accepts_climaxes() {
    let mut ctx = new_context();
    let p1 = ctx.state.players[0].id;
    assert!(ctx.state.add_card(vanilla("A"), p1, ZoneKind::Climax).is_err());
    let hand = ctx.state.add_card(vanilla("B"), p1, ZoneKind::Hand).unwrap();
    assert!(ctx.state.move_card(hand, ZoneKind::Climax).is_err());
    assert_eq!(ctx.state.card(hand).unwrap().zone(), ZoneKind::Hand);
    ctx.state.check_zone_invariants().unwrap();
}
