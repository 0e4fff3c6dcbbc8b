//! Game initialization from decks
//!
//! Creates games from deck lists and a card source

use crate::core::PlayerId;
use crate::game::{GameConfig, GameState};
use crate::loader::{CardSource, DeckList};
use crate::zones::ZoneKind;
use crate::Result;

/// Game builder for initializing games from decks
pub struct GameInitializer<'a> {
    cards: &'a dyn CardSource,
}

impl<'a> GameInitializer<'a> {
    pub fn new(cards: &'a dyn CardSource) -> Self {
        GameInitializer { cards }
    }

    /// Initialize a two-player game from two decks
    ///
    /// Decks are placed unshuffled; opening hands are dealt by the game loop.
    pub fn init_game(
        &self,
        player1_name: String,
        player1_deck: &DeckList,
        player2_name: String,
        player2_deck: &DeckList,
        config: GameConfig,
    ) -> Result<GameState> {
        let mut game = GameState::new_two_player(player1_name, player2_name).with_config(config);
        let ids = game.player_ids();

        self.load_deck_into_game(&mut game, ids[0], player1_deck)?;
        self.load_deck_into_game(&mut game, ids[1], player2_deck)?;

        Ok(game)
    }

    /// Load a deck into a player's deck zone
    fn load_deck_into_game(&self, game: &mut GameState, player_id: PlayerId, deck: &DeckList) -> Result<()> {
        for (definition, count) in deck.resolve(self.cards)? {
            for _ in 0..count {
                game.add_card(definition.clone(), player_id, ZoneKind::Deck)?;
            }
        }
        game.logger.normal(&format!(
            "Loaded {} cards for player {player_id}",
            deck.total_cards()
        ));
        Ok(())
    }
}
