//! Turn phases as a tree of nodes
//!
//! The turn root runs its children in fixed order:
//! Stand, Draw, Clock, Main, Climax, Attack, End. Each node sets the current
//! phase, raises `PhaseStarted`, runs its own logic, runs its children and
//! raises `PhaseEnded`. Once a player has lost nothing else runs.

use crate::core::{AbilityKind, CardId, CardKind, Cost, PlayerId};
use crate::game::controller::{AbilityRef, HandChoice, MainPhaseAction};
use crate::game::resolve::ResolveContext;
use crate::game::{GameContext, GameEvent, GameEventKind};
use crate::zones::{StagePosition, ZoneKind};
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a node in the phase tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseId {
    Turn,
    Stand,
    Draw,
    Clock,
    Main,
    Climax,
    Attack,
    End,
}

impl PhaseId {
    /// Children of the turn root, in execution order
    pub const TURN_ORDER: [PhaseId; 7] = [
        PhaseId::Stand,
        PhaseId::Draw,
        PhaseId::Clock,
        PhaseId::Main,
        PhaseId::Climax,
        PhaseId::Attack,
        PhaseId::End,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseId::Turn => "turn",
            PhaseId::Stand => "turn.stand",
            PhaseId::Draw => "turn.draw",
            PhaseId::Clock => "turn.clock",
            PhaseId::Main => "turn.main",
            PhaseId::Climax => "turn.climax",
            PhaseId::Attack => "turn.attack",
            PhaseId::End => "turn.end",
        }
    }

    /// Human-readable name used in logs
    pub fn display_name(&self) -> &'static str {
        match self {
            PhaseId::Turn => "Turn",
            PhaseId::Stand => "Stand Phase",
            PhaseId::Draw => "Draw Phase",
            PhaseId::Clock => "Clock Phase",
            PhaseId::Main => "Main Phase",
            PhaseId::Climax => "Climax Phase",
            PhaseId::Attack => "Attack Phase",
            PhaseId::End => "End Phase",
        }
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct PhaseNode {
    pub id: PhaseId,
    pub name: String,
    pub children: Vec<PhaseNode>,
}

impl PhaseNode {
    pub fn leaf(id: PhaseId) -> Self {
        PhaseNode {
            id,
            name: id.display_name().to_string(),
            children: Vec::new(),
        }
    }

    /// The standard turn: a root with the seven phases as children
    pub fn turn() -> Self {
        PhaseNode {
            id: PhaseId::Turn,
            name: PhaseId::Turn.display_name().to_string(),
            children: PhaseId::TURN_ORDER.iter().map(|&id| PhaseNode::leaf(id)).collect(),
        }
    }

    /// Run this node and its subtree once
    pub fn execute(&self, ctx: &mut GameContext) -> Result<()> {
        let active = ctx.state.active_player();
        ctx.state.current_phase = Some(self.id);
        if self.id != PhaseId::Turn {
            ctx.state.logger.verbose(&format!("--- {} ---", self.name));
        }
        ctx.raise(
            GameEvent::new(GameEventKind::PhaseStarted)
                .for_player(active)
                .in_phase(self.id),
        )?;

        if !ctx.state.is_game_over() {
            run_phase_logic(self.id, ctx, active)?;
        }
        for child in &self.children {
            if ctx.state.is_game_over() {
                break;
            }
            child.execute(ctx)?;
        }

        ctx.state.current_phase = Some(self.id);
        ctx.raise(
            GameEvent::new(GameEventKind::PhaseEnded)
                .for_player(active)
                .in_phase(self.id),
        )
    }
}

fn run_phase_logic(id: PhaseId, ctx: &mut GameContext, active: PlayerId) -> Result<()> {
    match id {
        PhaseId::Turn => Ok(()),
        PhaseId::Stand => stand_phase(ctx, active),
        PhaseId::Draw => ctx.draw_card(active).map(|_| ()),
        PhaseId::Clock => clock_phase(ctx, active),
        PhaseId::Main => main_phase(ctx, active),
        PhaseId::Climax => climax_phase(ctx, active),
        PhaseId::Attack => ctx.attack_phase(active),
        PhaseId::End => end_phase(ctx, active),
    }
}

fn stand_phase(ctx: &mut GameContext, active: PlayerId) -> Result<()> {
    let stage = ctx.state.zones(active)?.stage_characters();
    let mut stood = 0;
    for (_, id) in stage {
        let card = ctx.state.card_mut(id)?;
        if !card.is_standing() {
            card.stand();
            stood += 1;
        }
    }
    ctx.raise(
        GameEvent::new(GameEventKind::AllCharactersStood)
            .for_player(active)
            .with_amount(stood),
    )
}

fn clock_phase(ctx: &mut GameContext, active: PlayerId) -> Result<()> {
    let hand = ctx.state.zones(active)?.cards(ZoneKind::Hand).to_vec();
    let Some(card) = ctx.choose_card_from_hand(active, HandChoice::Clock, &hand, true)? else {
        return Ok(());
    };
    ctx.state.move_card(card, ZoneKind::Clock)?;
    ctx.raise(
        GameEvent::new(GameEventKind::CardClocked)
            .for_player(active)
            .with_card(card),
    )?;
    ctx.check_level_up(active)?;
    for _ in 0..2 {
        if ctx.state.is_game_over() {
            break;
        }
        ctx.draw_card(active)?;
    }
    Ok(())
}

fn climax_phase(ctx: &mut GameContext, active: PlayerId) -> Result<()> {
    let zones = ctx.state.zones(active)?;
    if zones.count(ZoneKind::Climax) > 0 {
        return Ok(());
    }
    let climaxes: Vec<CardId> = zones
        .cards(ZoneKind::Hand)
        .iter()
        .copied()
        .filter(|&id| ctx.state.card(id).map(|c| c.is_climax()).unwrap_or(false))
        .collect();
    let Some(card) = ctx.choose_climax(active, &climaxes)? else {
        return Ok(());
    };
    ctx.state.move_card(card, ZoneKind::Climax)?;
    ctx.state
        .logger
        .normal(&format!("{} plays climax {}", player_name(ctx, active), ctx.state.card(card)?));
    ctx.raise(
        GameEvent::new(GameEventKind::ClimaxPlayed)
            .for_player(active)
            .with_card(card)
            .to_zone(ZoneKind::Climax),
    )
}

fn end_phase(ctx: &mut GameContext, active: PlayerId) -> Result<()> {
    let limit = ctx.state.player(active)?.hand_limit;
    loop {
        let hand = ctx.state.zones(active)?.cards(ZoneKind::Hand).to_vec();
        if hand.len() <= limit {
            break;
        }
        let Some(card) = ctx.choose_card_from_hand(active, HandChoice::Discard, &hand, false)? else {
            break;
        };
        ctx.state.move_card(card, ZoneKind::WaitingRoom)?;
        ctx.raise(
            GameEvent::new(GameEventKind::CardDiscarded)
                .for_player(active)
                .with_card(card),
        )?;
    }

    for player in ctx.state.players_from_active() {
        let climaxes = ctx.state.zones(player)?.cards(ZoneKind::Climax).to_vec();
        for card in climaxes {
            ctx.state.move_card(card, ZoneKind::WaitingRoom)?;
            ctx.raise(
                GameEvent::new(GameEventKind::ClimaxCleared)
                    .for_player(player)
                    .with_card(card),
            )?;
        }
    }

    ctx.state.clear_temporary_modifiers();
    Ok(())
}

fn player_name(ctx: &GameContext, player: PlayerId) -> String {
    ctx.state
        .player(player)
        .map(|p| p.name.to_string())
        .unwrap_or_else(|_| player.to_string())
}

fn main_phase(ctx: &mut GameContext, active: PlayerId) -> Result<()> {
    while !ctx.state.is_game_over() {
        let options = main_phase_options(ctx, active)?;
        match ctx.choose_main_phase_action(active, &options)? {
            MainPhaseAction::EndPhase => break,
            MainPhaseAction::PlayCard { card, slot } => play_card(ctx, active, card, slot)?,
            MainPhaseAction::ActivateAbility(ability) => activate_ability(ctx, active, ability)?,
        }
    }
    Ok(())
}

/// Every legal main phase action; `EndPhase` is always last
pub fn main_phase_options(ctx: &GameContext, player: PlayerId) -> Result<Vec<MainPhaseAction>> {
    let state = &ctx.state;
    let zones = state.zones(player)?;
    let level = state.level_of(player);
    let stock = zones.count(ZoneKind::Stock);
    let has_slot = zones.first_empty_slot().is_some();

    let mut options = Vec::new();
    for &id in zones.cards(ZoneKind::Hand) {
        let card = state.card(id)?;
        let affordable = card.level() as usize <= level && card.definition.cost as usize <= stock;
        let playable = match card.kind() {
            CardKind::Character => affordable && has_slot,
            CardKind::Event => affordable,
            CardKind::Climax => false,
        };
        if playable {
            options.push(MainPhaseAction::PlayCard { card: id, slot: None });
        }
    }

    for (_, id) in zones.stage_characters() {
        let card = state.card(id)?;
        if !card.is_standing() {
            continue;
        }
        for ability in &card.abilities {
            if ability.kind == AbilityKind::Activated && ability.can_activate(None, state, player) {
                options.push(MainPhaseAction::ActivateAbility(AbilityRef {
                    source: id,
                    index: ability.index,
                }));
            }
        }
    }

    options.push(MainPhaseAction::EndPhase);
    Ok(options)
}

/// Play a card from hand, paying its stock cost
fn play_card(
    ctx: &mut GameContext,
    player: PlayerId,
    card: CardId,
    slot: Option<StagePosition>,
) -> Result<()> {
    let (kind, cost) = {
        let c = ctx.state.card(card)?;
        if c.zone() != ZoneKind::Hand {
            return Err(EngineError::InvalidAction(format!("card {card} is not in hand")));
        }
        (c.kind(), c.definition.cost)
    };

    match kind {
        CardKind::Character => {
            let zones = ctx.state.zones(player)?;
            let slot = match slot {
                Some(slot) => slot,
                None => zones
                    .first_empty_slot()
                    .ok_or_else(|| EngineError::InvalidAction("no empty stage slot".to_string()))?,
            };
            if zones.character_at(slot).is_some() {
                return Err(EngineError::SlotOccupied(slot.to_string()));
            }
            pay_stock(ctx, player, card, cost)?;
            let to = ZoneKind::Stage(slot);
            ctx.state.move_card(card, to)?;
            ctx.state.logger.normal(&format!(
                "{} plays {} to {slot}",
                player_name(ctx, player),
                ctx.state.card(card)?
            ));
            ctx.raise(
                GameEvent::new(GameEventKind::CardPlayed)
                    .for_player(player)
                    .with_card(card)
                    .to_zone(to),
            )
        }
        CardKind::Event => {
            pay_stock(ctx, player, card, cost)?;
            ctx.state.move_card(card, ZoneKind::Resolution)?;
            ctx.state.logger.normal(&format!(
                "{} plays event {}",
                player_name(ctx, player),
                ctx.state.card(card)?
            ));
            ctx.raise(
                GameEvent::new(GameEventKind::CardPlayed)
                    .for_player(player)
                    .with_card(card)
                    .to_zone(ZoneKind::Resolution),
            )?;
            // An effect may already have moved it elsewhere
            if ctx.state.card(card)?.zone() == ZoneKind::Resolution {
                ctx.state.move_card(card, ZoneKind::WaitingRoom)?;
            }
            Ok(())
        }
        CardKind::Climax => Err(EngineError::InvalidAction(format!(
            "climax {card} can only be played in the climax phase"
        ))),
    }
}

fn pay_stock(ctx: &mut GameContext, player: PlayerId, card: CardId, cost: u8) -> Result<()> {
    if cost == 0 {
        return Ok(());
    }
    ctx.pay_costs(player, card, &[Cost::Stock(cost)])
}

fn activate_ability(ctx: &mut GameContext, player: PlayerId, r: AbilityRef) -> Result<()> {
    let ability = ctx
        .state
        .card(r.source)?
        .abilities
        .get(r.index)
        .cloned()
        .ok_or_else(|| EngineError::InvalidAction(format!("card {} has no ability {}", r.source, r.index)))?;
    let source = ctx.state.card(r.source)?;
    if ability.kind != AbilityKind::Activated
        || source.owner != player
        || !source.zone().is_stage()
        || !source.is_standing()
        || !ability.can_activate(None, &ctx.state, player)
    {
        return Err(EngineError::InvalidAction(format!("{} cannot be activated now", ability.name)));
    }

    ctx.pay_costs(player, r.source, &ability.costs)?;
    ctx.state
        .logger
        .normal(&format!("{} activates {}", player_name(ctx, player), ability.name));
    ctx.raise(
        GameEvent::new(GameEventKind::AbilityActivated)
            .for_player(player)
            .with_card(r.source)
            .with_amount(r.index as i32),
    )?;
    let rc = ResolveContext::new(r.source, player);
    ctx.resolve_effects(&ability.effects, &rc)?;
    ctx.raise(
        GameEvent::new(GameEventKind::AbilityResolved)
            .for_player(player)
            .with_card(r.source),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AbilityDefinition, CardDefinition, Effect, EffectTarget};
    use crate::game::test_support::{bare_context, character, climax, put, record_events};
    use crate::game::{GameState, PlayerController, ScriptedController, ZeroController};
    use std::sync::Arc;

    #[test]
    fn test_phase_ids() {
        assert_eq!(PhaseId::Main.as_str(), "turn.main");
        assert_eq!(PhaseNode::turn().children.len(), 7);
        assert_eq!(PhaseNode::turn().children[0].id, PhaseId::Stand);
    }

    #[test]
    fn test_turn_phase_ordering() {
        let mut ctx = bare_context();
        let p1 = ctx.state.players[0].id;
        for i in 0..10 {
            put(&mut ctx, p1, character(&format!("D{i}"), 0, 0, 1000), ZoneKind::Deck);
        }
        let events = record_events(&mut ctx);

        PhaseNode::turn().execute(&mut ctx).unwrap();

        let phases: Vec<(GameEventKind, PhaseId)> = events
            .borrow()
            .iter()
            .filter(|e| matches!(e.kind, GameEventKind::PhaseStarted | GameEventKind::PhaseEnded))
            .filter_map(|e| e.phase.map(|p| (e.kind, p)))
            .filter(|(_, p)| *p != PhaseId::Turn)
            .collect();
        let expected: Vec<(GameEventKind, PhaseId)> = PhaseId::TURN_ORDER
            .iter()
            .flat_map(|&p| [(GameEventKind::PhaseStarted, p), (GameEventKind::PhaseEnded, p)])
            .collect();
        assert_eq!(phases, expected);
    }

    #[test]
    fn test_stand_phase_stands_rested_characters() {
        let mut ctx = bare_context();
        let p1 = ctx.state.players[0].id;
        let a = put(&mut ctx, p1, character("A", 0, 0, 1000), ZoneKind::Stage(StagePosition::FrontLeft));
        let b = put(&mut ctx, p1, character("B", 0, 0, 1000), ZoneKind::Stage(StagePosition::BackLeft));
        ctx.state.card_mut(a).unwrap().rest();
        ctx.state.card_mut(b).unwrap().rest();

        PhaseNode::leaf(PhaseId::Stand).execute(&mut ctx).unwrap();
        assert!(ctx.state.card(a).unwrap().is_standing());
        assert!(ctx.state.card(b).unwrap().is_standing());
    }

    #[test]
    fn test_clock_phase_draws_two() {
        let mut ctx = bare_context();
        let p1 = ctx.state.players[0].id;
        let clocked = put(&mut ctx, p1, character("H", 0, 0, 1000), ZoneKind::Hand);
        for i in 0..3 {
            put(&mut ctx, p1, character(&format!("D{i}"), 0, 0, 1000), ZoneKind::Deck);
        }

        PhaseNode::leaf(PhaseId::Clock).execute(&mut ctx).unwrap();
        assert_eq!(ctx.state.card(clocked).unwrap().zone(), ZoneKind::Clock);
        assert_eq!(ctx.state.count(p1, ZoneKind::Hand).unwrap(), 2);
        assert_eq!(ctx.state.count(p1, ZoneKind::Deck).unwrap(), 1);
    }

    #[test]
    fn test_declining_clock_draws_nothing() {
        let state = GameState::new_two_player("Alice".to_string(), "Bob".to_string());
        let p1 = state.players[0].id;
        let p2 = state.players[1].id;
        let controllers: Vec<Box<dyn PlayerController>> = vec![
            Box::new(ScriptedController::new(p1).with_clock_picks([None])),
            Box::new(ZeroController::new(p2)),
        ];
        let mut ctx = GameContext::new(state, controllers);
        put(&mut ctx, p1, character("H", 0, 0, 1000), ZoneKind::Hand);
        put(&mut ctx, p1, character("D", 0, 0, 1000), ZoneKind::Deck);

        PhaseNode::leaf(PhaseId::Clock).execute(&mut ctx).unwrap();
        assert_eq!(ctx.state.count(p1, ZoneKind::Hand).unwrap(), 1);
        assert_eq!(ctx.state.count(p1, ZoneKind::Clock).unwrap(), 0);
    }

    #[test]
    fn test_main_phase_plays_affordable_character() {
        let mut ctx = bare_context();
        let p1 = ctx.state.players[0].id;
        let cheap = put(&mut ctx, p1, character("CHEAP", 0, 1, 3000), ZoneKind::Hand);
        let high = put(&mut ctx, p1, character("HIGH", 2, 0, 9000), ZoneKind::Hand);
        put(&mut ctx, p1, character("S", 0, 0, 1000), ZoneKind::Stock);

        let options = main_phase_options(&ctx, p1).unwrap();
        assert_eq!(
            options,
            vec![
                MainPhaseAction::PlayCard { card: cheap, slot: None },
                MainPhaseAction::EndPhase
            ]
        );

        PhaseNode::leaf(PhaseId::Main).execute(&mut ctx).unwrap();
        assert_eq!(
            ctx.state.card(cheap).unwrap().zone(),
            ZoneKind::Stage(StagePosition::FrontLeft)
        );
        assert_eq!(ctx.state.card(high).unwrap().zone(), ZoneKind::Hand);
        assert_eq!(ctx.state.count(p1, ZoneKind::Stock).unwrap(), 0);
        assert_eq!(ctx.state.count(p1, ZoneKind::WaitingRoom).unwrap(), 1);
    }

    #[test]
    fn test_event_card_resolves_then_leaves() {
        let mut ctx = bare_context();
        let p1 = ctx.state.players[0].id;
        let def = Arc::new(
            CardDefinition::new("EV", "Encouragement", CardKind::Event).with_ability(
                AbilityDefinition::new("draw", AbilityKind::Auto)
                    .trigger(crate::core::TriggerCondition::WhenPlayed)
                    .effect(Effect::Draw { count: 1 }),
            ),
        );
        let event = put(&mut ctx, p1, def, ZoneKind::Hand);
        let drawn = put(&mut ctx, p1, character("D", 0, 0, 1000), ZoneKind::Deck);

        PhaseNode::leaf(PhaseId::Main).execute(&mut ctx).unwrap();
        assert_eq!(ctx.state.card(event).unwrap().zone(), ZoneKind::WaitingRoom);
        // The drawn character is then played by the zero controller
        assert_ne!(ctx.state.card(drawn).unwrap().zone(), ZoneKind::Deck);
    }

    #[test]
    fn test_activated_ability_pays_and_resolves() {
        let state = GameState::new_two_player("Alice".to_string(), "Bob".to_string());
        let p1 = state.players[0].id;
        let p2 = state.players[1].id;
        let mut state = state;
        let def = Arc::new(
            CardDefinition::new("ACT", "Trainer", CardKind::Character).with_ability(
                AbilityDefinition::new("pump", AbilityKind::Activated)
                    .cost(Cost::RestSelf)
                    .effect(Effect::PowerBoost {
                        target: EffectTarget::Source,
                        amount: 1500,
                    }),
            ),
        );
        let source = state
            .add_card(def, p1, ZoneKind::Stage(StagePosition::FrontCenter))
            .unwrap();
        let ability = AbilityRef { source, index: 0 };
        let controllers: Vec<Box<dyn PlayerController>> = vec![
            Box::new(ScriptedController::new(p1).with_main_actions([MainPhaseAction::ActivateAbility(ability)])),
            Box::new(ZeroController::new(p2)),
        ];
        let mut ctx = GameContext::new(state, controllers);

        PhaseNode::leaf(PhaseId::Main).execute(&mut ctx).unwrap();
        let card = ctx.state.card(source).unwrap();
        assert!(card.is_rested());
        assert_eq!(card.temp_power, 1500);
        // Rested, so the ability is no longer offered
        let options = main_phase_options(&ctx, p1).unwrap();
        assert_eq!(options, vec![MainPhaseAction::EndPhase]);
    }

    #[test]
    fn test_climax_phase_places_climax() {
        let mut ctx = bare_context();
        let p1 = ctx.state.players[0].id;
        let cx = put(&mut ctx, p1, climax("CX"), ZoneKind::Hand);

        PhaseNode::leaf(PhaseId::Climax).execute(&mut ctx).unwrap();
        assert_eq!(ctx.state.card(cx).unwrap().zone(), ZoneKind::Climax);
    }

    #[test]
    fn test_end_phase_discards_and_clears() {
        let mut ctx = bare_context();
        let p1 = ctx.state.players[0].id;
        for i in 0..9 {
            put(&mut ctx, p1, character(&format!("H{i}"), 0, 0, 1000), ZoneKind::Hand);
        }
        let cx = put(&mut ctx, p1, climax("CX"), ZoneKind::Climax);
        let chara = put(&mut ctx, p1, character("S", 0, 0, 1000), ZoneKind::Stage(StagePosition::FrontLeft));
        ctx.state.card_mut(chara).unwrap().temp_power = 2000;

        PhaseNode::leaf(PhaseId::End).execute(&mut ctx).unwrap();
        assert_eq!(ctx.state.count(p1, ZoneKind::Hand).unwrap(), 7);
        assert_eq!(ctx.state.card(cx).unwrap().zone(), ZoneKind::WaitingRoom);
        assert_eq!(ctx.state.count(p1, ZoneKind::WaitingRoom).unwrap(), 3);
        assert_eq!(ctx.state.card(chara).unwrap().temp_power, 0);
    }
}
