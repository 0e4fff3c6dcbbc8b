//! Effect resolution and cost payment
//!
//! Costs are paid in two passes. `plan_costs` gathers every selection from the
//! controller and checks that the whole bill can be met without touching the
//! state; `commit` then applies it. A plan that fails leaves the game exactly
//! as it was.

use crate::core::{CardFilter, CardId, CardKind, Cost, Effect, EffectTarget, PlayerId};
use crate::game::{GameContext, GameEvent, GameEventKind};
use crate::zones::ZoneKind;
use crate::{EngineError, Result};
use rustc_hash::FxHashSet;

/// Who is resolving what, and in reaction to which event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveContext {
    pub source: CardId,
    pub player: PlayerId,
    pub event: Option<GameEvent>,
}

impl ResolveContext {
    pub fn new(source: CardId, player: PlayerId) -> Self {
        ResolveContext {
            source,
            player,
            event: None,
        }
    }

    pub fn with_event(mut self, event: GameEvent) -> Self {
        self.event = Some(event);
        self
    }
}

/// Effect capability: apply yourself to the game
pub trait Resolve {
    fn resolve(&self, ctx: &mut GameContext, rc: &ResolveContext) -> Result<()>;
}

impl Resolve for Effect {
    fn resolve(&self, ctx: &mut GameContext, rc: &ResolveContext) -> Result<()> {
        let player = rc.player;
        match self {
            Effect::Draw { count } => {
                for _ in 0..*count {
                    if ctx.draw_card(player)?.is_none() {
                        break;
                    }
                }
            }
            Effect::PowerBoost { target, amount } => {
                for card in ctx.resolve_targets(*target, rc)? {
                    ctx.state.card_mut(card)?.temp_power += amount;
                }
            }
            Effect::SoulBoost { target, amount } => {
                for card in ctx.resolve_targets(*target, rc)? {
                    ctx.state.card_mut(card)?.temp_soul += amount;
                }
            }
            Effect::LookTopAndTake { count, filter } => {
                let looked = ctx.state.zones(player)?.zone(ZoneKind::Deck)?.peek(*count as usize);
                let takeable = ctx.filter_cards(&looked, filter);
                let taken = ctx.choose_target(player, &takeable)?;
                for card in looked {
                    let to = if Some(card) == taken {
                        ZoneKind::Hand
                    } else {
                        ZoneKind::WaitingRoom
                    };
                    ctx.state.move_card(card, to)?;
                }
            }
            Effect::SearchDeck { filter } => {
                let deck = ctx.state.zones(player)?.cards(ZoneKind::Deck).to_vec();
                let matching = ctx.filter_cards(&deck, filter);
                if let Some(card) = ctx.choose_target(player, &matching)? {
                    ctx.state.move_card(card, ZoneKind::Hand)?;
                }
                ctx.state.shuffle_deck(player)?;
            }
            Effect::ReturnFromWaitingRoom { filter } => {
                let room = ctx.state.zones(player)?.cards(ZoneKind::WaitingRoom).to_vec();
                let matching = ctx.filter_cards(&room, filter);
                if let Some(card) = ctx.choose_card_from_waiting_room(player, &matching, true)? {
                    ctx.state.move_card(card, ZoneKind::Hand)?;
                }
            }
            Effect::MoveToZone { target, zone } => {
                for card in ctx.resolve_targets(*target, rc)? {
                    let owner = ctx.state.card(card)?.owner;
                    ctx.state.move_card(card, *zone)?;
                    ctx.raise(
                        GameEvent::new(GameEventKind::CardMoved)
                            .for_player(owner)
                            .with_card(card)
                            .to_zone(*zone),
                    )?;
                }
            }
            Effect::Heal { count } => {
                let newest = ctx.state.zones(player)?.zone(ZoneKind::Clock)?.peek(*count as usize);
                for card in newest {
                    ctx.state.move_card(card, ZoneKind::WaitingRoom)?;
                }
            }
            Effect::DealDamage { amount } => {
                let opponent = ctx.state.opponent_of(player)?;
                ctx.apply_damage(opponent, *amount as i32)?;
            }
            Effect::Brainstorm { reveal } => {
                let revealed = ctx.state.zones(player)?.zone(ZoneKind::Deck)?.peek(*reveal as usize);
                let mut climaxes = 0;
                for card in revealed {
                    if ctx.state.card(card)?.kind() == CardKind::Climax {
                        climaxes += 1;
                    }
                    ctx.state.move_card(card, ZoneKind::WaitingRoom)?;
                }
                for _ in 0..climaxes {
                    if ctx.draw_card(player)?.is_none() {
                        break;
                    }
                }
            }
            Effect::StockCharge { count } => {
                for _ in 0..*count {
                    let Some(card) = ctx.state.zones(player)?.zone(ZoneKind::Deck)?.peek_top() else {
                        break;
                    };
                    ctx.state.move_card(card, ZoneKind::Stock)?;
                    ctx.raise(
                        GameEvent::new(GameEventKind::CardAddedToStock)
                            .for_player(player)
                            .with_card(card),
                    )?;
                }
            }
            Effect::Custom { id } => {
                let effect = ctx.custom_effect(id).ok_or_else(|| {
                    EngineError::InvalidAction(format!("no custom effect registered as '{id}'"))
                })?;
                effect(ctx, rc)?;
            }
        }
        Ok(())
    }
}

/// Validated cost selections, applied by `commit`
#[derive(Debug, Default)]
struct PaymentPlan {
    rest: Vec<CardId>,
    moves: Vec<(CardId, ZoneKind)>,
}

impl GameContext {
    fn filter_cards(&self, cards: &[CardId], filter: &CardFilter) -> Vec<CardId> {
        cards
            .iter()
            .copied()
            .filter(|&id| {
                self.state
                    .card(id)
                    .map(|c| filter.matches(&c.definition))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Cards an effect target refers to right now
    pub fn resolve_targets(&mut self, target: EffectTarget, rc: &ResolveContext) -> Result<Vec<CardId>> {
        let stage: Vec<CardId> = self
            .state
            .zones(rc.player)?
            .stage_characters()
            .into_iter()
            .map(|(_, id)| id)
            .collect();
        Ok(match target {
            EffectTarget::Source => vec![rc.source],
            EffectTarget::AllYourCharacters => stage,
            EffectTarget::ChosenCharacter => self.choose_target(rc.player, &stage)?.into_iter().collect(),
            EffectTarget::BattleOpponent => match &self.state.attack {
                Some(attack) if attack.attacker == rc.source => attack.defender.into_iter().collect(),
                Some(attack) if attack.defender == Some(rc.source) => vec![attack.attacker],
                _ => Vec::new(),
            },
        })
    }

    /// Resolve effects in list order
    pub fn resolve_effects(&mut self, effects: &[Effect], rc: &ResolveContext) -> Result<()> {
        for effect in effects {
            effect.resolve(self, rc)?;
        }
        Ok(())
    }

    /// Pay a cost list atomically
    ///
    /// Returns `CostNotPayable` without changing anything when the plan
    /// cannot be met.
    pub fn pay_costs(&mut self, player: PlayerId, source: CardId, costs: &[Cost]) -> Result<()> {
        let plan = self.plan_costs(player, source, costs)?;
        self.commit(plan)
    }

    /// `pay_costs`, treating an unpayable plan as a refusal
    pub fn try_pay_costs(&mut self, player: PlayerId, source: CardId, costs: &[Cost]) -> Result<bool> {
        match self.pay_costs(player, source, costs) {
            Ok(()) => Ok(true),
            Err(EngineError::CostNotPayable(reason)) => {
                self.state.logger.normal(&format!("cost not paid: {reason}"));
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn plan_costs(&mut self, player: PlayerId, source: CardId, costs: &[Cost]) -> Result<PaymentPlan> {
        let mut plan = PaymentPlan::default();
        let mut used: FxHashSet<CardId> = FxHashSet::default();
        let source_zone = self.state.card(source)?.zone();

        {
            let zones = self.state.zones(player)?;
            for kind in [ZoneKind::WaitingRoom, ZoneKind::Clock, ZoneKind::Memory, ZoneKind::Stock] {
                zones.zone(kind)?;
            }
        }

        let leaves: Vec<Cost> = costs.iter().flat_map(|c| c.leaves()).cloned().collect();
        for cost in &leaves {
            match cost {
                Cost::Stock(n) => {
                    let stock = self.state.zones(player)?.cards(ZoneKind::Stock);
                    let available: Vec<CardId> =
                        stock.iter().rev().copied().filter(|c| !used.contains(c)).collect();
                    if available.len() < *n as usize {
                        return Err(EngineError::CostNotPayable(format!(
                            "needs {n} stock, has {}",
                            available.len()
                        )));
                    }
                    for &card in available.iter().take(*n as usize) {
                        used.insert(card);
                        plan.moves.push((card, ZoneKind::WaitingRoom));
                    }
                }
                Cost::Deck(n) => {
                    let deck = self.state.zones(player)?.cards(ZoneKind::Deck);
                    if deck.len() < *n as usize {
                        return Err(EngineError::CostNotPayable(format!("needs {n} deck cards")));
                    }
                    for &card in deck.iter().rev().take(*n as usize) {
                        used.insert(card);
                        plan.moves.push((card, ZoneKind::WaitingRoom));
                    }
                }
                Cost::Clock(n) => {
                    let candidates = self.hand_candidates(player, source, &CardFilter::Any, &used)?;
                    for card in self.select_for(player, cost, &candidates, *n as usize)? {
                        used.insert(card);
                        plan.moves.push((card, ZoneKind::Clock));
                    }
                }
                Cost::Discard { count, filter } => {
                    let candidates = self.hand_candidates(player, source, filter, &used)?;
                    for card in self.select_for(player, cost, &candidates, *count as usize)? {
                        used.insert(card);
                        plan.moves.push((card, ZoneKind::WaitingRoom));
                    }
                }
                Cost::RestSelf => {
                    let card = self.state.card(source)?;
                    if !source_zone.is_stage() || !card.is_standing() || plan.rest.contains(&source) {
                        return Err(EngineError::CostNotPayable(format!("{source} cannot rest")));
                    }
                    plan.rest.push(source);
                }
                Cost::Rest { count, filter } => {
                    let candidates: Vec<CardId> = self
                        .stage_others(player, source)?
                        .into_iter()
                        .filter(|id| !plan.rest.contains(id) && !used.contains(id))
                        .filter(|&id| {
                            self.state
                                .card(id)
                                .map(|c| c.is_standing() && filter.matches(&c.definition))
                                .unwrap_or(false)
                        })
                        .collect();
                    let picked = self.select_for(player, cost, &candidates, *count as usize)?;
                    plan.rest.extend(picked);
                }
                Cost::StageToWaitingRoom(n) => {
                    let candidates: Vec<CardId> = self
                        .stage_others(player, source)?
                        .into_iter()
                        .filter(|id| !used.contains(id) && !plan.rest.contains(id))
                        .collect();
                    for card in self.select_for(player, cost, &candidates, *n as usize)? {
                        used.insert(card);
                        plan.moves.push((card, ZoneKind::WaitingRoom));
                    }
                }
                Cost::SendSelfToMemory => {
                    if source_zone == ZoneKind::Memory || !used.insert(source) {
                        return Err(EngineError::CostNotPayable(format!(
                            "{source} cannot go to memory"
                        )));
                    }
                    plan.moves.push((source, ZoneKind::Memory));
                }
                Cost::DiscardSelf => {
                    if source_zone != ZoneKind::Hand || !used.insert(source) {
                        return Err(EngineError::CostNotPayable(format!(
                            "{source} is not in hand"
                        )));
                    }
                    plan.moves.push((source, ZoneKind::WaitingRoom));
                }
                // flattened by leaves()
                Cost::Composite(_) => {}
            }
        }
        Ok(plan)
    }

    fn hand_candidates(
        &self,
        player: PlayerId,
        source: CardId,
        filter: &CardFilter,
        used: &FxHashSet<CardId>,
    ) -> Result<Vec<CardId>> {
        let hand: Vec<CardId> = self
            .state
            .zones(player)?
            .cards(ZoneKind::Hand)
            .iter()
            .copied()
            .filter(|id| *id != source && !used.contains(id))
            .collect();
        Ok(self.filter_cards(&hand, filter))
    }

    fn stage_others(&self, player: PlayerId, source: CardId) -> Result<Vec<CardId>> {
        Ok(self
            .state
            .zones(player)?
            .stage_characters()
            .into_iter()
            .map(|(_, id)| id)
            .filter(|id| *id != source)
            .collect())
    }

    fn select_for(
        &mut self,
        player: PlayerId,
        cost: &Cost,
        candidates: &[CardId],
        count: usize,
    ) -> Result<Vec<CardId>> {
        if candidates.len() < count {
            return Err(EngineError::CostNotPayable(format!(
                "{cost:?} needs {count} card(s), {} available",
                candidates.len()
            )));
        }
        self.select_cards_to_pay_cost(player, cost, candidates, count)
    }

    fn commit(&mut self, plan: PaymentPlan) -> Result<()> {
        for card in plan.rest {
            self.state.card_mut(card)?.rest();
        }
        for (card, to) in plan.moves {
            self.state.move_card(card, to)?;
        }
        Ok(())
    }
}
