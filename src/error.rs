//! Error types for the Weiß Schwarz engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Entity not found: {0}")]
    EntityNotFound(u32),

    #[error("Player {player} has no {zone} zone registered")]
    MissingZone { player: u32, zone: String },

    #[error("Stage slot {0} is already occupied")]
    SlotOccupied(String),

    #[error("Card {card} cannot be placed into {zone}: {reason}")]
    InvalidZoneInsert {
        card: u32,
        zone: String,
        reason: String,
    },

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Cost cannot be paid: {0}")]
    CostNotPayable(String),

    #[error("Controller returned a choice that was not offered: {0}")]
    InvalidChoice(String),

    #[error("Invalid game action: {0}")]
    InvalidAction(String),

    #[error("Event dispatch exceeded maximum depth of {0}")]
    DispatchDepthExceeded(usize),

    #[error("Invalid deck format: {0}")]
    InvalidDeckFormat(String),

    #[error("Unknown card code: {0}")]
    UnknownCard(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
