//! Deck shuffling, opening hands and the mulligan
//!
//! A hand setup can pin specific cards (by code) into a player's opening
//! hand, which keeps scenario tests independent of the shuffle.

use crate::core::PlayerId;
use crate::game::{GameContext, GameEvent, GameEventKind};
use crate::zones::ZoneKind;
use crate::{EngineError, Result};

/// Cards to pull from the deck into a player's opening hand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandSetup {
    pub card_codes: Vec<String>,
}

impl HandSetup {
    /// Parse semicolon-separated card codes, e.g. `"W01-001;W01-002"`
    pub fn parse(input: &str) -> Result<Self> {
        let card_codes: Vec<String> = input
            .split(';')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if card_codes.is_empty() {
            return Err(EngineError::InvalidAction(
                "hand setup must name at least one card".to_string(),
            ));
        }
        Ok(HandSetup { card_codes })
    }
}

/// Shuffle both decks, deal opening hands and offer each player a mulligan
///
/// `setups` is indexed like `GameState::players`. Players with a pinned hand
/// skip the mulligan.
pub fn setup_opening_hands(ctx: &mut GameContext, setups: [Option<&HandSetup>; 2]) -> Result<()> {
    let players = ctx.state.player_ids();
    for &player in &players {
        ctx.state.shuffle_deck(player)?;
    }

    let hand_size = ctx.state.config.opening_hand_size;
    for (idx, &player) in players.iter().enumerate() {
        match setups.get(idx).copied().flatten() {
            Some(setup) => deal_pinned_hand(ctx, player, setup, hand_size)?,
            None => {
                for _ in 0..hand_size {
                    ctx.draw_card(player)?;
                }
            }
        }
    }

    for player in ctx.state.players_from_active() {
        let idx = ctx.state.player_idx(player)?;
        if setups.get(idx).copied().flatten().is_none() {
            mulligan(ctx, player)?;
        }
    }
    Ok(())
}

fn deal_pinned_hand(
    ctx: &mut GameContext,
    player: PlayerId,
    setup: &HandSetup,
    hand_size: usize,
) -> Result<()> {
    if setup.card_codes.len() > hand_size {
        return Err(EngineError::InvalidAction(format!(
            "hand setup names {} cards, the opening hand holds {hand_size}",
            setup.card_codes.len()
        )));
    }
    for code in &setup.card_codes {
        let found = ctx
            .state
            .zones(player)?
            .cards(ZoneKind::Deck)
            .iter()
            .rev()
            .copied()
            .find(|&id| {
                ctx.state
                    .card(id)
                    .map(|c| c.code().as_str() == code)
                    .unwrap_or(false)
            });
        let card = found.ok_or_else(|| EngineError::UnknownCard(format!("{code} is not in player {player}'s deck")))?;
        ctx.state.move_card(card, ZoneKind::Hand)?;
    }
    for _ in setup.card_codes.len()..hand_size {
        ctx.draw_card(player)?;
    }
    Ok(())
}

/// Send the chosen cards to the waiting room and draw as many
pub fn mulligan(ctx: &mut GameContext, player: PlayerId) -> Result<()> {
    let hand = ctx.state.zones(player)?.cards(ZoneKind::Hand).to_vec();
    let discarded = ctx.choose_mulligan_cards(player, &hand)?;
    for &card in &discarded {
        ctx.state.move_card(card, ZoneKind::WaitingRoom)?;
    }
    for _ in 0..discarded.len() {
        ctx.draw_card(player)?;
    }
    ctx.raise(
        GameEvent::new(GameEventKind::MulliganCompleted)
            .for_player(player)
            .with_amount(discarded.len() as i32),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::test_support::{bare_context, character, put};

    #[test]
    fn test_parse_hand_setup() {
        let setup = HandSetup::parse(" W01-001 ; W01-002 ").unwrap();
        assert_eq!(setup.card_codes, vec!["W01-001", "W01-002"]);
        assert!(HandSetup::parse(" ; ").is_err());
    }

    #[test]
    fn test_opening_hands_are_dealt() {
        let mut ctx = bare_context();
        let players = ctx.state.player_ids();
        for &p in &players {
            for i in 0..50 {
                put(&mut ctx, p, character(&format!("D{i}"), 0, 0, 1000), ZoneKind::Deck);
            }
        }

        setup_opening_hands(&mut ctx, [None, None]).unwrap();
        for &p in &players {
            assert_eq!(ctx.state.count(p, ZoneKind::Hand).unwrap(), 5);
            assert_eq!(ctx.state.count(p, ZoneKind::Deck).unwrap(), 45);
        }
    }

    #[test]
    fn test_pinned_hand() {
        let mut ctx = bare_context();
        let p1 = ctx.state.players[0].id;
        for i in 0..10 {
            put(&mut ctx, p1, character(&format!("D{i}"), 0, 0, 1000), ZoneKind::Deck);
        }
        let wanted = put(&mut ctx, p1, character("WANTED", 0, 0, 1000), ZoneKind::Deck);

        let setup = HandSetup::parse("WANTED").unwrap();
        setup_opening_hands(&mut ctx, [Some(&setup), None]).unwrap();
        assert_eq!(ctx.state.card(wanted).unwrap().zone(), ZoneKind::Hand);
        assert_eq!(ctx.state.count(p1, ZoneKind::Hand).unwrap(), 5);

        let missing = HandSetup::parse("NOPE").unwrap();
        let mut ctx = bare_context();
        assert!(matches!(
            setup_opening_hands(&mut ctx, [Some(&missing), None]),
            Err(EngineError::UnknownCard(_))
        ));
    }
}
