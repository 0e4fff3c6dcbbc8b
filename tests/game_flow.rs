//! Scenario tests for whole turns and whole games

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use ws_engine::core::{CardDefinition, CardKind, PlayerId};
use ws_engine::game::hand_setup::setup_opening_hands;
use ws_engine::game::{
    GameConfig, GameContext, GameEndReason, GameEvent, GameEventKind, GameLoop, GameState,
    HandSetup, PhaseId, PhaseNode, PlayerController, RandomController, VerbosityLevel,
    ZeroController,
};
use ws_engine::loader::{demo_card_pool, DeckList, DeckLoader, GameInitializer};
use ws_engine::zones::{StagePosition, ZoneKind};

fn zero_controllers(state: &GameState) -> Vec<Box<dyn PlayerController>> {
    state
        .player_ids()
        .into_iter()
        .map(|id| Box::new(ZeroController::new(id)) as Box<dyn PlayerController>)
        .collect()
}

fn vanilla(code: &str, power: i32) -> Arc<CardDefinition> {
    Arc::new(CardDefinition::new(code, code, CardKind::Character).with_stats(0, 0, power, 1))
}

fn demo_game(seed: u64, random: bool) -> GameContext {
    let pool = demo_card_pool();
    let deck = DeckList::fallback(&pool);
    let config = GameConfig {
        seed,
        max_turns: 80,
        ..GameConfig::default()
    };
    let state = GameInitializer::new(&pool)
        .init_game("Alice".into(), &deck, "Bob".into(), &deck, config)
        .unwrap();
    let controllers = if random {
        state
            .player_ids()
            .into_iter()
            .map(|id| {
                Box::new(RandomController::with_seed(id, seed ^ id.as_u32() as u64))
                    as Box<dyn PlayerController>
            })
            .collect()
    } else {
        zero_controllers(&state)
    };
    GameContext::new(state, controllers)
}

#[test]
fn opening_hand_then_draw_phase() {
    let mut state = GameState::new_two_player("Alice".to_string(), "Bob".to_string());
    let ids = state.player_ids();
    for &p in &ids {
        for i in 0..50 {
            state.add_card(vanilla(&format!("D{i}"), 1000), p, ZoneKind::Deck).unwrap();
        }
    }
    let controllers = zero_controllers(&state);
    let mut ctx = GameContext::new(state, controllers);

    setup_opening_hands(&mut ctx, [None, None]).unwrap();
    for &p in &ids {
        assert_eq!(ctx.state.count(p, ZoneKind::Hand).unwrap(), 5);
        assert_eq!(ctx.state.count(p, ZoneKind::Deck).unwrap(), 45);
    }

    PhaseNode::leaf(PhaseId::Draw).execute(&mut ctx).unwrap();
    let active = ctx.state.active_player();
    assert_eq!(ctx.state.count(active, ZoneKind::Hand).unwrap(), 6);
    assert_eq!(ctx.state.count(active, ZoneKind::Deck).unwrap(), 44);
    ctx.state.check_zone_invariants().unwrap();
}

#[test]
fn weaker_attacker_is_reversed_in_front_attack() {
    let mut state = GameState::new_two_player("Alice".to_string(), "Bob".to_string());
    let (p1, p2) = (state.players[0].id, state.players[1].id);
    for i in 0..5 {
        state.add_card(vanilla(&format!("A{i}"), 1000), p1, ZoneKind::Deck).unwrap();
        state.add_card(vanilla(&format!("B{i}"), 1000), p2, ZoneKind::Deck).unwrap();
    }
    let attacker = state
        .add_card(vanilla("ATK", 5000), p1, ZoneKind::Stage(StagePosition::FrontCenter))
        .unwrap();
    let defender = state
        .add_card(vanilla("DEF", 6000), p2, ZoneKind::Stage(StagePosition::FrontCenter))
        .unwrap();
    let controllers = zero_controllers(&state);
    let mut ctx = GameContext::new(state, controllers);

    let reversed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&reversed);
    ctx.bus.subscribe(GameEventKind::CharacterReversed, move |event, _| {
        sink.borrow_mut().extend(event.card);
        Ok(())
    });

    ctx.resolve_attack(p1, attacker).unwrap();

    assert!(ctx.state.card(attacker).unwrap().is_reversed());
    assert!(!ctx.state.card(defender).unwrap().is_reversed());
    assert_eq!(*reversed.borrow(), vec![attacker]);
    // Soul 1 with a non-climax on top of the defender's deck
    assert_eq!(ctx.state.count(p2, ZoneKind::Clock).unwrap(), 1);
    assert!(ctx.state.attack.is_none());
    ctx.state.check_zone_invariants().unwrap();
}

#[test]
fn turn_raises_phases_in_order() {
    let mut ctx = demo_game(7, false);
    let phases = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&phases);
    ctx.bus.subscribe(GameEventKind::PhaseStarted, move |event: &GameEvent, _| {
        sink.borrow_mut().extend(event.phase);
        Ok(())
    });
    let boundaries = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&boundaries);
    ctx.bus.subscribe_all(move |event: &GameEvent, _| {
        if matches!(event.kind, GameEventKind::PhaseStarted | GameEventKind::PhaseEnded) {
            sink.borrow_mut().push((event.kind, event.phase));
        }
        Ok(())
    });

    let result = GameLoop::new(&mut ctx)
        .with_verbosity(VerbosityLevel::Silent)
        .run_turns(1)
        .unwrap();
    assert!(result.is_none());
    assert_eq!(
        *phases.borrow(),
        vec![
            PhaseId::Turn,
            PhaseId::Stand,
            PhaseId::Draw,
            PhaseId::Clock,
            PhaseId::Main,
            PhaseId::Climax,
            PhaseId::Attack,
            PhaseId::End,
        ]
    );
    let boundaries = boundaries.borrow();
    for phase in PhaseId::TURN_ORDER {
        let started = boundaries
            .iter()
            .position(|b| *b == (GameEventKind::PhaseStarted, Some(phase)))
            .unwrap();
        let ended = boundaries
            .iter()
            .position(|b| *b == (GameEventKind::PhaseEnded, Some(phase)))
            .unwrap();
        assert!(started < ended, "{phase} ended before it started");
    }
    assert_eq!(ctx.state.turn.turn_number, 2);
}

#[test]
fn zero_controllers_finish_a_game() {
    let mut ctx = demo_game(1, false);
    let result = GameLoop::new(&mut ctx)
        .with_verbosity(VerbosityLevel::Silent)
        .run_game()
        .unwrap();

    assert!(result.turns_played > 0);
    match result.end_reason {
        GameEndReason::DeckOut(loser) | GameEndReason::LevelFour(loser) => {
            assert_ne!(Some(loser), result.winner);
            assert!(ctx.state.player(loser).unwrap().has_lost());
        }
        GameEndReason::TurnLimit => assert_eq!(result.winner, None),
    }
    assert_eq!(ctx.state.cards.len(), 100);
    ctx.state.check_zone_invariants().unwrap();
}

#[test]
fn random_games_keep_zone_invariants() {
    for seed in 0..8 {
        let mut ctx = demo_game(seed, true);
        let result = GameLoop::new(&mut ctx)
            .with_verbosity(VerbosityLevel::Silent)
            .run_game()
            .unwrap();
        assert!(result.turns_played <= 80, "seed {seed}");
        ctx.state.check_zone_invariants().unwrap();
        assert_eq!(ctx.state.cards.len(), 100);
    }
}

#[test]
fn pinned_hand_is_dealt_before_play() {
    let pool = demo_card_pool();
    let deck = DeckLoader::parse("DEMO/W01-004 20\nDEMO/W01-009 5\nDEMO/W01-001 25\n").unwrap();
    let state = GameInitializer::new(&pool)
        .init_game("Alice".into(), &deck, "Bob".into(), &deck, GameConfig::default())
        .unwrap();
    let controllers = zero_controllers(&state);
    let mut ctx = GameContext::new(state, controllers);
    let p2: PlayerId = ctx.state.players[1].id;

    let setup = HandSetup::parse("DEMO/W01-009;DEMO/W01-009;DEMO/W01-004").unwrap();
    setup_opening_hands(&mut ctx, [None, Some(&setup)]).unwrap();

    let hand = ctx.state.zones(p2).unwrap().cards(ZoneKind::Hand).to_vec();
    assert_eq!(hand.len(), 5);
    let climaxes = hand
        .iter()
        .filter(|&&c| ctx.state.card(c).unwrap().is_climax())
        .count();
    assert!(climaxes >= 2);
    ctx.state.check_zone_invariants().unwrap();
}
