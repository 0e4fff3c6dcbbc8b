//! End-to-end determinism tests
//!
//! Games with the same seed must produce identical logs. One test is generated
//! per `.deck` file in `test_decks/` by the `dir-test` macro.

use dir_test::{dir_test, Fixture};
use similar_asserts::assert_eq;
use ws_engine::game::{
    GameConfig, GameContext, GameLoop, GameResult, OutputMode, PlayerController,
    RandomController, VerbosityLevel,
};
use ws_engine::loader::{demo_card_pool, DeckList, DeckLoader, GameInitializer};

/// Play one random-vs-random game and return its captured log
fn play_logged(deck: &DeckList, seed: u64) -> (GameResult, String) {
    let pool = demo_card_pool();
    let config = GameConfig {
        seed,
        max_turns: 60,
        ..GameConfig::default()
    };
    let mut state = GameInitializer::new(&pool)
        .init_game("Alice".into(), deck, "Bob".into(), deck, config)
        .expect("deck loads");
    state.logger.set_output_mode(OutputMode::Memory);
    state.logger.enable_capture();

    let controllers: Vec<Box<dyn PlayerController>> = state
        .player_ids()
        .into_iter()
        .map(|id| {
            Box::new(RandomController::with_seed(id, seed.wrapping_mul(31) + id.as_u32() as u64))
                as Box<dyn PlayerController>
        })
        .collect();
    let mut ctx = GameContext::new(state, controllers);
    let result = GameLoop::new(&mut ctx)
        .with_verbosity(VerbosityLevel::Verbose)
        .run_game()
        .expect("game runs to completion");

    let log = ctx
        .state
        .logger
        .logs()
        .iter()
        .map(|entry| entry.message.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    (result, log)
}

#[dir_test(
    dir: "$CARGO_MANIFEST_DIR/test_decks",
    glob: "**/*.deck",
)]
fn test_deck_determinism(fixture: Fixture<&str>) {
    let deck = DeckLoader::parse(fixture.content()).expect("deck parses");
    assert_eq!(deck.total_cards(), 50, "{}", fixture.path());

    let (result1, run1) = play_logged(&deck, 42);
    let (result2, run2) = play_logged(&deck, 42);

    assert!(!run1.is_empty(), "Deck {} produced an empty log", fixture.path());
    assert_eq!(run1, run2);
    assert_eq!(result1, result2);
}

#[test]
fn test_different_seeds_diverge() {
    let deck = DeckList::fallback(&demo_card_pool());

    let (_, seed42) = play_logged(&deck, 42);
    let (_, seed100) = play_logged(&deck, 100);
    assert_ne!(seed42, seed100, "different seeds produced identical games");
}
