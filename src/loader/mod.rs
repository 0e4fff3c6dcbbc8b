//! Card sources, deck lists and game setup

pub mod database;
pub mod deck;
pub mod demo;
pub mod game_init;

pub use database::{CardDatabase, CardSource};
pub use deck::{DeckEntry, DeckList, DeckLoader};
pub use demo::demo_card_pool;
pub use game_init::GameInitializer;
