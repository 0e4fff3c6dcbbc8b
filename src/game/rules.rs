//! Core rules procedures and the rule engine
//!
//! The rule engine is a catch-all event handler. On every event it queues the
//! auto abilities whose triggers match, then drains the queue: the active
//! player's abilities first, then the other player's. With several pending
//! the owner picks the order.

use crate::core::{AbilityKind, CardId, CardKind, Cost, Keyword, LossReason, PlayerId, TriggerIcon};
use crate::core::costs::can_pay_all;
use crate::game::controller::EncoreChoice;
use crate::game::resolve::ResolveContext;
use crate::game::{GameContext, GameEvent, GameEventKind, PendingAbility};
use crate::zones::ZoneKind;
use crate::Result;

/// Catch-all handler installed by `GameContext::new`
pub(crate) fn rule_engine(event: &GameEvent, ctx: &mut GameContext) -> Result<()> {
    if ctx.state.is_game_over() {
        return Ok(());
    }
    let queued = ctx.collect_triggers(event)?;
    // Events raised while a drain runs only queue; the outermost drain resolves
    let owns_drain = ctx.state.ability_queue.begin_drain();
    let result = announce_then_drain(ctx, queued, owns_drain);
    if owns_drain {
        ctx.state.ability_queue.end_drain();
    }
    result
}

fn announce_then_drain(ctx: &mut GameContext, queued: Vec<PendingAbility>, drain: bool) -> Result<()> {
    for pending in queued {
        ctx.raise(
            GameEvent::new(GameEventKind::AbilityTriggered)
                .for_player(pending.player)
                .with_card(pending.source)
                .with_amount(pending.ability_index as i32),
        )?;
    }
    if drain {
        ctx.drain_pending()?;
    }
    Ok(())
}

impl GameContext {
    /// Queue every auto ability that triggers on `event`
    ///
    /// Scans stage, climax and resolution zones of the active player, then
    /// the non-active player. Everything is queued before anything resolves.
    fn collect_triggers(&mut self, event: &GameEvent) -> Result<Vec<PendingAbility>> {
        let mut matches = Vec::new();
        for player in self.state.players_from_active() {
            let zones = self.state.zones(player)?;
            let mut sources: Vec<CardId> =
                zones.stage_characters().into_iter().map(|(_, id)| id).collect();
            sources.extend_from_slice(zones.cards(ZoneKind::Climax));
            sources.extend_from_slice(zones.cards(ZoneKind::Resolution));

            for source in sources {
                let card = self.state.card(source)?;
                for ability in &card.abilities {
                    if ability.kind == AbilityKind::Auto
                        && ability.listens_for_events()
                        && ability.can_trigger(Some(event), &self.state)
                    {
                        matches.push((source, ability.index, ability.name.clone(), card.owner));
                    }
                }
            }
        }

        let mut queued = Vec::with_capacity(matches.len());
        for (source, index, name, owner) in matches {
            let id = self
                .state
                .ability_queue
                .push(source, index, name.clone(), owner, event.clone());
            log_if_verbose!(self.state.logger, "{} triggers on {:?}", name, event.kind);
            queued.push(PendingAbility {
                id,
                source,
                ability_index: index,
                name,
                player: owner,
                event: event.clone(),
            });
        }
        Ok(queued)
    }

    /// Resolve pending abilities until the queue is empty or the game ends
    ///
    /// The active player's abilities always go first, including ones queued
    /// while the other player's were resolving.
    pub fn drain_pending(&mut self) -> Result<()> {
        while !self.state.is_game_over() {
            let next = self
                .state
                .players_from_active()
                .into_iter()
                .find(|&p| self.state.ability_queue.has_pending(p));
            let Some(player) = next else {
                break;
            };
            let pending = self.state.ability_queue.pending_for(player);
            let id = if pending.len() == 1 {
                pending[0].id
            } else {
                self.choose_ability_to_resolve(player, &pending)?
            };
            if let Some(ability) = self.state.ability_queue.take(id) {
                self.resolve_pending(ability)?;
            }
        }
        Ok(())
    }

    fn resolve_pending(&mut self, pending: PendingAbility) -> Result<()> {
        let ability = self
            .state
            .card(pending.source)?
            .abilities
            .get(pending.ability_index)
            .cloned();
        let Some(ability) = ability else {
            return Ok(());
        };
        let cancelled = GameEvent::new(GameEventKind::AbilityCancelled)
            .for_player(pending.player)
            .with_card(pending.source);

        if !ability.costs.is_empty() {
            let question = format!("pay the cost of {}?", ability.name);
            if !ability.can_pay(&self.state, pending.player)
                || !self.ask_yes_no(pending.player, &question)?
                || !self.try_pay_costs(pending.player, pending.source, &ability.costs)?
            {
                return self.raise(cancelled);
            }
        }

        let rc = ResolveContext::new(pending.source, pending.player).with_event(pending.event);
        self.resolve_effects(&ability.effects, &rc)?;
        self.raise(
            GameEvent::new(GameEventKind::AbilityResolved)
                .for_player(pending.player)
                .with_card(pending.source),
        )
    }

    /// Draw one card, refreshing the deck once if it is empty
    ///
    /// Returns `None` and raises `DeckEmptyLose` when there is nothing left
    /// to draw even after a refresh.
    pub fn draw_card(&mut self, player: PlayerId) -> Result<Option<CardId>> {
        let Some(card) = self.top_of_deck(player)? else {
            self.raise(GameEvent::new(GameEventKind::DeckEmptyLose).for_player(player))?;
            return Ok(None);
        };
        self.state.move_card(card, ZoneKind::Hand)?;
        self.raise(
            GameEvent::new(GameEventKind::CardDrawn)
                .for_player(player)
                .with_card(card),
        )?;
        Ok(Some(card))
    }

    /// Top card of the deck, refreshing first when the deck is empty
    fn top_of_deck(&mut self, player: PlayerId) -> Result<Option<CardId>> {
        let top = self.state.zones(player)?.zone(ZoneKind::Deck)?.peek_top();
        if top.is_some() {
            return Ok(top);
        }
        self.refresh_deck(player)?;
        Ok(self.state.zones(player)?.zone(ZoneKind::Deck)?.peek_top())
    }

    /// Waiting room becomes the new deck, then one card is paid to the clock
    ///
    /// Returns false when the waiting room was empty.
    pub fn refresh_deck(&mut self, player: PlayerId) -> Result<bool> {
        let room = self.state.zones(player)?.cards(ZoneKind::WaitingRoom).to_vec();
        if room.is_empty() {
            return Ok(false);
        }
        for &card in &room {
            self.state.move_card(card, ZoneKind::Deck)?;
        }
        self.state.shuffle_deck(player)?;
        self.raise(
            GameEvent::new(GameEventKind::DeckRefresh)
                .for_player(player)
                .with_amount(room.len() as i32),
        )?;

        if let Some(penalty) = self.state.zones(player)?.zone(ZoneKind::Deck)?.peek_top() {
            self.state.move_card(penalty, ZoneKind::Clock)?;
            self.raise(
                GameEvent::new(GameEventKind::RefreshPenalty)
                    .for_player(player)
                    .with_card(penalty),
            )?;
            self.check_level_up(player)?;
        }
        Ok(true)
    }

    /// Deal `amount` damage, one card at a time
    ///
    /// A climax card cancels the rest of the damage. Returns the number of
    /// cards that reached the clock.
    pub fn apply_damage(&mut self, victim: PlayerId, amount: i32) -> Result<i32> {
        let mut dealt = 0;
        for point in 0..amount.max(0) {
            if self.state.is_game_over() {
                break;
            }
            let Some(card) = self.top_of_deck(victim)? else {
                self.raise(GameEvent::new(GameEventKind::DeckEmptyLose).for_player(victim))?;
                break;
            };
            if self.state.card(card)?.kind() == CardKind::Climax {
                self.state.move_card(card, ZoneKind::WaitingRoom)?;
                self.raise(
                    GameEvent::new(GameEventKind::DamageCancelled)
                        .for_player(victim)
                        .with_card(card)
                        .with_amount(amount - point),
                )?;
                break;
            }
            self.state.move_card(card, ZoneKind::Clock)?;
            dealt += 1;
            self.raise(
                GameEvent::new(GameEventKind::DamageTaken)
                    .for_player(victim)
                    .with_card(card)
                    .with_amount(1),
            )?;
            self.check_level_up(victim)?;
        }
        Ok(dealt)
    }

    /// Level up while the clock holds a full row
    pub fn check_level_up(&mut self, player: PlayerId) -> Result<()> {
        let threshold = self.state.config.level_up_threshold;
        loop {
            if self.state.player(player)?.has_lost() {
                return Ok(());
            }
            let clock = self.state.zones(player)?.zone(ZoneKind::Clock)?;
            if clock.len() < threshold {
                return Ok(());
            }
            let candidates = clock.bottom(threshold);
            let chosen = self.choose_level_up_card(player, &candidates)?;

            self.state.move_card(chosen, ZoneKind::Level)?;
            for &card in candidates.iter().filter(|&&c| c != chosen) {
                self.state.move_card(card, ZoneKind::WaitingRoom)?;
            }
            let level = self.state.level_of(player);
            self.state
                .logger
                .normal(&format!("player {player} reaches level {level}"));
            self.raise(
                GameEvent::new(GameEventKind::LevelUp)
                    .for_player(player)
                    .with_card(chosen)
                    .with_amount(level as i32),
            )?;

            if level >= self.state.config.losing_level {
                self.state.player_mut(player)?.mark_lost(LossReason::LevelFour);
                self.raise(
                    GameEvent::new(GameEventKind::PlayerLost)
                        .for_player(player)
                        .with_amount(level as i32),
                )?;
                return Ok(());
            }
        }
    }

    /// Reveal the top card for an attack and apply its trigger icons
    ///
    /// Returns the soul bonus for the attack.
    pub fn trigger_check(&mut self, player: PlayerId) -> Result<i32> {
        let Some(card) = self.top_of_deck(player)? else {
            self.raise(GameEvent::new(GameEventKind::DeckEmptyLose).for_player(player))?;
            return Ok(0);
        };
        self.state.move_card(card, ZoneKind::Resolution)?;
        self.raise(
            GameEvent::new(GameEventKind::TriggerReveal)
                .for_player(player)
                .with_card(card),
        )?;

        let icons = self.state.card(card)?.definition.triggers.clone();
        let mut soul_boost = 0;
        for icon in icons {
            match icon {
                TriggerIcon::Soul => soul_boost += 1,
                TriggerIcon::Comeback => {
                    let characters: Vec<CardId> = self
                        .state
                        .zones(player)?
                        .cards(ZoneKind::WaitingRoom)
                        .iter()
                        .copied()
                        .filter(|&id| {
                            self.state
                                .card(id)
                                .map(|c| c.is_character())
                                .unwrap_or(false)
                        })
                        .collect();
                    if let Some(back) = self.choose_card_from_waiting_room(player, &characters, true)? {
                        self.state.move_card(back, ZoneKind::Hand)?;
                    }
                }
                TriggerIcon::Draw => {
                    self.draw_card(player)?;
                }
            }
        }

        // Reveal handlers may already have moved it
        if self.state.card(card)?.zone() == ZoneKind::Resolution {
            self.state.move_card(card, ZoneKind::Stock)?;
            self.raise(
                GameEvent::new(GameEventKind::CardAddedToStock)
                    .for_player(player)
                    .with_card(card),
            )?;
        }
        Ok(soul_boost)
    }

    /// Offer encore to every reversed character of `player`
    pub fn encore_step(&mut self, player: PlayerId) -> Result<()> {
        let reversed: Vec<_> = self
            .state
            .zones(player)?
            .stage_characters()
            .into_iter()
            .filter(|&(_, id)| {
                self.state
                    .card(id)
                    .map(|c| c.is_reversed())
                    .unwrap_or(false)
            })
            .collect();

        for (slot, character) in reversed {
            if self.state.is_game_over() {
                return Ok(());
            }
            self.state.move_card(character, ZoneKind::WaitingRoom)?;
            self.raise(
                GameEvent::new(GameEventKind::CardMoved)
                    .for_player(player)
                    .with_card(character)
                    .to_zone(ZoneKind::WaitingRoom),
            )?;
            // Abilities resolved by the move may have taken it elsewhere
            if self.state.is_game_over()
                || self.state.card(character)?.zone() != ZoneKind::WaitingRoom
            {
                continue;
            }

            let standard = vec![Cost::Stock(self.state.config.standard_encore_stock)];
            let special = self
                .state
                .card(character)?
                .definition
                .keywords
                .iter()
                .find_map(|k| match k {
                    Keyword::Encore(costs) => Some(costs.clone()),
                    _ => None,
                });

            let mut options = vec![EncoreChoice::Decline];
            if can_pay_all(&standard, &self.state, player, character) {
                options.push(EncoreChoice::Standard);
            }
            if let Some(costs) = &special {
                if can_pay_all(costs, &self.state, player, character) {
                    options.push(EncoreChoice::Special);
                }
            }
            if options.len() == 1 {
                continue;
            }

            let paid = match self.choose_encore(player, character, &options)? {
                EncoreChoice::Decline => false,
                EncoreChoice::Standard => self.try_pay_costs(player, character, &standard)?,
                EncoreChoice::Special => {
                    let costs = special.unwrap_or_default();
                    self.try_pay_costs(player, character, &costs)?
                }
            };
            if !paid {
                continue;
            }

            let to = ZoneKind::Stage(slot);
            self.state.move_card(character, to)?;
            self.state.card_mut(character)?.rest();
            self.raise(
                GameEvent::new(GameEventKind::EncoreDeclared)
                    .for_player(player)
                    .with_card(character)
                    .to_zone(to),
            )?;
        }
        Ok(())
    }
}
