//! Attack phase: declaration, trigger, counter, damage and battle steps

use crate::core::costs::can_pay_all;
use crate::core::{CardId, Cost, PlayerId};
use crate::game::controller::AttackType;
use crate::game::state::AttackState;
use crate::game::{GameContext, GameEvent, GameEventKind};
use crate::zones::ZoneKind;
use crate::{EngineError, Result};

/// Cost of playing a backup card from hand during the counter step
fn backup_cost() -> [Cost; 2] {
    [Cost::Stock(1), Cost::DiscardSelf]
}

impl GameContext {
    /// Standing front-row characters of `player`
    pub fn attackable_characters(&self, player: PlayerId) -> Result<Vec<CardId>> {
        let zones = self.state.zones(player)?;
        let mut attackers = Vec::new();
        for (pos, id) in zones.stage_characters() {
            if pos.is_front_row() && self.state.card(id)?.is_standing() {
                attackers.push(id);
            }
        }
        Ok(attackers)
    }

    /// Declare attacks until the controller stops or nobody can attack,
    /// then run the encore step for both players
    pub fn attack_phase(&mut self, player: PlayerId) -> Result<()> {
        while !self.state.is_game_over() {
            let attackers = self.attackable_characters(player)?;
            if attackers.is_empty() || self.choose_to_end_attack(player, &attackers)? {
                break;
            }
            let attacker = self.choose_attacker(player, &attackers)?;
            self.resolve_attack(player, attacker)?;
        }
        self.state.attack = None;

        for p in self.state.players_from_active() {
            if self.state.is_game_over() {
                break;
            }
            self.encore_step(p)?;
        }
        Ok(())
    }

    /// Run one attack through all of its steps
    pub fn resolve_attack(&mut self, player: PlayerId, attacker: CardId) -> Result<()> {
        let opponent = self.state.opponent_of(player)?;
        let slot = self
            .state
            .stage_position_of(attacker)
            .filter(|pos| pos.is_front_row())
            .ok_or_else(|| EngineError::InvalidAction(format!("card {attacker} is not in the front row")))?;
        let defender = match slot.opposing() {
            Some(pos) => self.state.zones(opponent)?.character_at(pos),
            None => None,
        };
        let options: &[AttackType] = if defender.is_some() {
            &[AttackType::Front, AttackType::Side]
        } else {
            &[AttackType::Direct]
        };
        let attack_type = self.choose_attack_type(player, attacker, options)?;

        self.state.card_mut(attacker)?.rest();
        self.state.attack = Some(AttackState {
            attacker,
            attacker_slot: slot,
            defender,
            attack_type,
            soul_boost: 0,
        });
        self.state.logger.normal(&format!(
            "{} declares a {attack_type:?} attack from {slot}",
            self.state.card(attacker)?
        ));
        let mut declared = GameEvent::new(GameEventKind::AttackDeclared)
            .for_player(player)
            .with_card(attacker);
        if let Some(defender) = defender {
            declared = declared.with_other_card(defender);
        }
        self.raise(declared)?;

        if !self.state.is_game_over() {
            let boost = self.trigger_check(player)?;
            if let Some(attack) = self.state.attack.as_mut() {
                attack.soul_boost += boost;
            }
        }

        if let (AttackType::Front, Some(defender)) = (attack_type, defender) {
            if !self.state.is_game_over() {
                self.counter_step(opponent, defender)?;
            }
        }

        if !self.state.is_game_over() {
            let damage = self.attack_damage()?;
            let dealt = self.apply_damage(opponent, damage)?;
            self.state
                .logger
                .verbose(&format!("attack deals {dealt} of {damage} damage"));
        }

        if let (AttackType::Front, Some(defender)) = (attack_type, defender) {
            if !self.state.is_game_over() {
                self.battle_step(player, attacker, defender)?;
            }
        }

        self.raise(
            GameEvent::new(GameEventKind::AttackEnded)
                .for_player(player)
                .with_card(attacker),
        )?;
        self.state.attack = None;
        Ok(())
    }

    /// Soul damage of the current attack
    ///
    /// Direct attacks add one; side attacks lose the defender's level.
    pub fn attack_damage(&self) -> Result<i32> {
        let attack = self
            .state
            .attack
            .as_ref()
            .ok_or_else(|| EngineError::InvalidAction("no attack in progress".to_string()))?;
        let mut soul = self.state.effective_soul(attack.attacker)? + attack.soul_boost;
        match (attack.attack_type, attack.defender) {
            (AttackType::Direct, _) => soul += 1,
            (AttackType::Side, Some(defender)) => soul -= self.state.card(defender)?.level() as i32,
            _ => {}
        }
        Ok(soul.max(0))
    }

    /// Backup cards the defending player could play right now
    pub fn counter_candidates(&self, player: PlayerId) -> Result<Vec<CardId>> {
        let level = self.state.level_of(player);
        let cost = backup_cost();
        let mut counters = Vec::new();
        for &id in self.state.zones(player)?.cards(ZoneKind::Hand) {
            let Some((_, required)) = self.state.card(id)?.has_backup() else {
                continue;
            };
            if level >= required as usize && can_pay_all(&cost, &self.state, player, id) {
                counters.push(id);
            }
        }
        Ok(counters)
    }

    fn counter_step(&mut self, player: PlayerId, defender: CardId) -> Result<()> {
        self.raise(
            GameEvent::new(GameEventKind::CounterStepStarted)
                .for_player(player)
                .with_card(defender),
        )?;
        let counters = self.counter_candidates(player)?;
        let Some(card) = self.choose_counter_card(player, &counters)? else {
            return Ok(());
        };
        let Some((power, _)) = self.state.card(card)?.has_backup() else {
            return Ok(());
        };
        if !self.try_pay_costs(player, card, &backup_cost())? {
            return Ok(());
        }
        if !self.state.card(defender)?.zone().is_stage() {
            return Ok(());
        }
        self.state.card_mut(defender)?.temp_power += power;
        self.state.logger.normal(&format!(
            "{} backs up {} for +{power}",
            self.state.card(card)?,
            self.state.card(defender)?
        ));
        self.raise(
            GameEvent::new(GameEventKind::CounterPlayed)
                .for_player(player)
                .with_card(card)
                .with_other_card(defender)
                .with_amount(power),
        )
    }

    /// Compare power; the lower side is reversed, both on a tie
    fn battle_step(&mut self, player: PlayerId, attacker: CardId, defender: CardId) -> Result<()> {
        self.raise(
            GameEvent::new(GameEventKind::BattleStarted)
                .for_player(player)
                .with_card(attacker)
                .with_other_card(defender),
        )?;
        // Either side may have left the stage during the earlier steps
        let on_stage = |ctx: &GameContext, id: CardId| {
            ctx.state.card(id).map(|c| c.zone().is_stage()).unwrap_or(false)
        };
        if !on_stage(self, attacker) || !on_stage(self, defender) {
            return Ok(());
        }

        let attack_power = self.state.effective_power(attacker)?;
        let defense_power = self.state.effective_power(defender)?;
        let losers = if attack_power > defense_power {
            vec![defender]
        } else if attack_power < defense_power {
            vec![attacker]
        } else {
            vec![attacker, defender]
        };
        self.state
            .logger
            .verbose(&format!("battle: {attack_power} vs {defense_power}"));

        for loser in losers {
            let owner = {
                let card = self.state.card_mut(loser)?;
                card.reverse();
                card.owner
            };
            self.raise(
                GameEvent::new(GameEventKind::CharacterReversed)
                    .for_player(owner)
                    .with_card(loser),
            )?;
        }
        Ok(())
    }
}
