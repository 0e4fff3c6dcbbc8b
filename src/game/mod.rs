//! Game state, turn structure and the rule engine

/// Log at verbose level, compiled out without the `verbose-logging` feature
///
/// Keeps per-event `format!` calls off the hot path when logging is disabled.
macro_rules! log_if_verbose {
    ($logger:expr, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            $logger.verbose(&format!($($arg)*));
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$logger;
        }
    };
}

pub mod ability_queue;
pub mod attack;
pub mod context;
pub mod controller;
pub mod events;
pub mod game_loop;
pub mod hand_setup;
pub mod logger;
pub mod phase;
pub mod random_controller;
pub mod resolve;
mod rules;
pub mod scripted_controller;
pub mod state;
pub mod zero_controller;

#[cfg(test)]
pub(crate) mod test_support;

pub use ability_queue::{AbilityQueue, PendingAbility};
pub use context::{CustomEffect, GameContext};
pub use controller::{
    AbilityRef, AttackType, EncoreChoice, GameStateView, HandChoice, MainPhaseAction,
    PlayerController,
};
pub use events::{EventBus, EventHandler, GameEvent, GameEventKind, SubscriptionId, MAX_DISPATCH_DEPTH};
pub use game_loop::{GameEndReason, GameLoop, GameResult};
pub use hand_setup::HandSetup;
pub use logger::{GameLogger, LogEntry, OutputFormat, OutputMode, VerbosityLevel};
pub use phase::{PhaseId, PhaseNode};
pub use random_controller::RandomController;
pub use resolve::{Resolve, ResolveContext};
pub use scripted_controller::ScriptedController;
pub use state::{AttackState, GameConfig, GameState, TurnState};
pub use zero_controller::ZeroController;
