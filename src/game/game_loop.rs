//! Game loop: opening hands, turn progression and win detection

use crate::core::{LossReason, PlayerId};
use crate::game::hand_setup::{setup_opening_hands, HandSetup};
use crate::game::{
    GameContext, GameEvent, GameEventKind, PhaseNode, SubscriptionId, VerbosityLevel,
};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Result of running a game to completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// Winner of the game (None when the turn limit was reached)
    pub winner: Option<PlayerId>,
    /// Total number of turns played
    pub turns_played: u32,
    /// Reason the game ended
    pub end_reason: GameEndReason,
}

/// Reason the game ended; the player is the one who lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEndReason {
    /// Had to draw with an empty deck and waiting room
    DeckOut(PlayerId),
    /// Reached level four
    LevelFour(PlayerId),
    /// Game reached maximum turn limit
    TurnLimit,
}

/// Game loop manager
///
/// Borrows a prepared `GameContext` (decks built, controllers attached) and
/// runs turns until a player loses or the turn limit is hit. While the loop
/// exists it keeps the deck-out recorder subscribed on the bus.
pub struct GameLoop<'a> {
    pub ctx: &'a mut GameContext,
    max_turns: u32,
    turns_elapsed: u32,
    turn: PhaseNode,
    subscriptions: Vec<SubscriptionId>,
}

impl<'a> GameLoop<'a> {
    pub fn new(ctx: &'a mut GameContext) -> Self {
        let max_turns = ctx.state.config.max_turns;
        let subscriptions = vec![ctx.bus.subscribe(GameEventKind::DeckEmptyLose, record_deck_out)];
        GameLoop {
            ctx,
            max_turns,
            turns_elapsed: 0,
            turn: PhaseNode::turn(),
            subscriptions,
        }
    }

    /// Set maximum turns before the game is called
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_verbosity(self, verbosity: VerbosityLevel) -> Self {
        self.ctx.state.logger.set_verbosity(verbosity);
        self
    }

    pub fn turns_elapsed(&self) -> u32 {
        self.turns_elapsed
    }

    /// Deal opening hands, then play turns until the game ends
    pub fn run_game(&mut self) -> Result<GameResult> {
        self.run_game_with_hands([None, None])
    }

    /// Like `run_game`, with pinned opening hands
    pub fn run_game_with_hands(&mut self, setups: [Option<&HandSetup>; 2]) -> Result<GameResult> {
        setup_opening_hands(self.ctx, setups)?;
        loop {
            if let Some(result) = self.run_turn_once()? {
                self.finish(&result);
                return Ok(result);
            }
        }
    }

    /// Run up to `turns_to_run` turns without dealing hands first
    ///
    /// Returns `None` if the game is still going afterwards.
    pub fn run_turns(&mut self, turns_to_run: u32) -> Result<Option<GameResult>> {
        for _ in 0..turns_to_run {
            if let Some(result) = self.run_turn_once()? {
                self.finish(&result);
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    /// Play one full turn; `Some` once the game is over
    pub fn run_turn_once(&mut self) -> Result<Option<GameResult>> {
        if let Some(result) = self.check_win_condition() {
            return Ok(Some(result));
        }
        if self.turns_elapsed >= self.max_turns {
            return Ok(Some(GameResult {
                winner: None,
                turns_played: self.turns_elapsed,
                end_reason: GameEndReason::TurnLimit,
            }));
        }

        let active = self.ctx.state.active_player();
        let turn_number = self.ctx.state.turn.turn_number;
        for player in self.ctx.state.player_ids() {
            self.ctx.reset_turn_state(player)?;
        }
        let name = self.ctx.state.player(active)?.name.clone();
        self.ctx
            .state
            .logger
            .normal(&format!("=== Turn {turn_number} ({name}) ==="));

        self.ctx.raise(
            GameEvent::new(GameEventKind::TurnStarted)
                .for_player(active)
                .with_amount(turn_number as i32),
        )?;
        self.turn.execute(self.ctx)?;
        self.ctx.raise(
            GameEvent::new(GameEventKind::TurnEnded)
                .for_player(active)
                .with_amount(turn_number as i32),
        )?;
        self.turns_elapsed += 1;

        if let Some(result) = self.check_win_condition() {
            return Ok(Some(result));
        }
        self.ctx.state.advance_turn();
        Ok(None)
    }

    fn check_win_condition(&self) -> Option<GameResult> {
        let (loser, reason) = self.ctx.state.check_loss_conditions()?;
        let winner = self.ctx.state.opponent_of(loser).ok();
        let end_reason = match reason {
            LossReason::DeckOut => GameEndReason::DeckOut(loser),
            LossReason::LevelFour => GameEndReason::LevelFour(loser),
        };
        Some(GameResult {
            winner,
            turns_played: self.turns_elapsed,
            end_reason,
        })
    }

    fn finish(&mut self, result: &GameResult) {
        let state = &self.ctx.state;
        let summary = match result.winner.and_then(|w| state.player(w).ok()) {
            Some(winner) => format!(
                "Game over after {} turns: {} wins ({:?})",
                result.turns_played, winner.name, result.end_reason
            ),
            None => format!("Game over after {} turns: no winner", result.turns_played),
        };
        state.logger.minimal(&summary);
        self.ctx.notify_game_end(result.winner);
    }
}

impl Drop for GameLoop<'_> {
    fn drop(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.ctx.bus.unsubscribe(id);
        }
    }
}

/// Record a deck-out loss the first time a player cannot draw
fn record_deck_out(event: &GameEvent, ctx: &mut GameContext) -> Result<()> {
    let Some(player) = event.player else {
        return Ok(());
    };
    if ctx.state.player(player)?.has_lost() {
        return Ok(());
    }
    ctx.state.player_mut(player)?.mark_lost(LossReason::DeckOut);
    ctx.state
        .logger
        .normal(&format!("player {player} cannot draw and loses"));
    ctx.raise(GameEvent::new(GameEventKind::PlayerLost).for_player(player))
}
