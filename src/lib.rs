//! Weiß Schwarz rules engine
//!
//! Deterministic two-player game simulation: zones, a synchronous event bus,
//! a rule engine that queues and resolves triggered abilities, and pluggable
//! player controllers.

pub mod core;
pub mod error;
pub mod game;
pub mod loader;
pub mod zones;

pub use error::{EngineError, Result};
