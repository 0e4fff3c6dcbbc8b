//! Built-in demo card pool
//!
//! A small set of hand-written definitions so the binary and the tests can
//! run without external card data. The first ten are what the fallback deck
//! is built from.

use crate::core::{
    AbilityDefinition, AbilityKind, CardDefinition, CardFilter, CardKind, Cost, Effect,
    EffectTarget, EventScope, Keyword, TriggerCondition, TriggerIcon,
};
use crate::game::GameEventKind;
use crate::loader::CardDatabase;

fn chara(code: &str, name: &str, level: u8, cost: u8, power: i32, soul: u8) -> CardDefinition {
    CardDefinition::new(code, name, CardKind::Character)
        .with_stats(level, cost, power, soul)
        .with_trait("Music")
}

pub fn demo_card_pool() -> CardDatabase {
    CardDatabase::from_definitions([
        chara("DEMO/W01-001", "Morning Rehearsal", 0, 0, 2500, 1).with_ability(
            AbilityDefinition::new("Warm Up", AbilityKind::Auto)
                .text("When this card is played, put the top card of your deck into your stock.")
                .trigger(TriggerCondition::WhenPlayed)
                .effect(Effect::StockCharge { count: 1 }),
        ),
        chara("DEMO/W01-002", "Backstage Helper", 0, 0, 3000, 1)
            .with_keyword(Keyword::Backup { power: 1500, level: 0 }),
        chara("DEMO/W01-003", "Stage Manager", 0, 0, 2000, 1).with_ability(
            AbilityDefinition::new("Cue", AbilityKind::Activated)
                .text("[(1) Rest this] All your characters get +500 power until end of turn.")
                .cost(Cost::Stock(1))
                .cost(Cost::RestSelf)
                .effect(Effect::PowerBoost {
                    target: EffectTarget::AllYourCharacters,
                    amount: 500,
                }),
        ),
        chara("DEMO/W01-004", "First Chair Violin", 1, 0, 5000, 1).with_trigger(TriggerIcon::Soul),
        chara("DEMO/W01-005", "Encore Singer", 1, 1, 6000, 1).with_keyword(Keyword::Encore(vec![
            Cost::Discard {
                count: 1,
                filter: CardFilter::Kind(CardKind::Character),
            },
        ])),
        chara("DEMO/W01-006", "Drummer", 1, 1, 5500, 1).with_ability(
            AbilityDefinition::new("Crescendo", AbilityKind::Auto)
                .text("When this card attacks, it gets +1 soul until end of turn.")
                .trigger(TriggerCondition::WhenAttacks)
                .effect(Effect::SoulBoost {
                    target: EffectTarget::Source,
                    amount: 1,
                }),
        ),
        chara("DEMO/W01-007", "Sheet Music Collector", 2, 1, 8000, 1)
            .with_trigger(TriggerIcon::Draw)
            .with_ability(
                AbilityDefinition::new("Scout", AbilityKind::Auto)
                    .text("When this card is played, look at the top 3 cards of your deck, take one character into hand.")
                    .trigger(TriggerCondition::WhenPlayed)
                    .effect(Effect::LookTopAndTake {
                        count: 3,
                        filter: CardFilter::Kind(CardKind::Character),
                    }),
            ),
        chara("DEMO/W01-008", "Concertmaster", 2, 2, 9000, 2)
            .with_trigger(TriggerIcon::Soul)
            .with_ability(
                AbilityDefinition::new("Rivalry", AbilityKind::Auto)
                    .text("When an opponent's character becomes reversed during your turn, draw a card.")
                    .trigger(TriggerCondition::OnEvent {
                        kind: GameEventKind::CharacterReversed,
                        scope: EventScope::Opponent,
                    })
                    .trigger(TriggerCondition::DuringOwnersTurn)
                    .trigger(TriggerCondition::SourceOnStage)
                    .effect(Effect::Draw { count: 1 }),
            ),
        CardDefinition::new("DEMO/W01-009", "Standing Ovation", CardKind::Climax)
            .with_trigger(TriggerIcon::Soul)
            .with_ability(
                AbilityDefinition::new("Ovation", AbilityKind::Continuous)
                    .text("All your characters get +1000 power and +1 soul.")
                    .effect(Effect::PowerBoost {
                        target: EffectTarget::AllYourCharacters,
                        amount: 1000,
                    })
                    .effect(Effect::SoulBoost {
                        target: EffectTarget::AllYourCharacters,
                        amount: 1,
                    }),
            ),
        CardDefinition::new("DEMO/W01-010", "Encore Call", CardKind::Event)
            .with_stats(1, 1, 0, 0)
            .with_ability(
                AbilityDefinition::new("Call", AbilityKind::Auto)
                    .text("Draw 2 cards.")
                    .trigger(TriggerCondition::WhenPlayed)
                    .effect(Effect::Draw { count: 2 }),
            ),
        chara("DEMO/W01-011", "Prima Donna", 3, 2, 10000, 2)
            .with_trigger(TriggerIcon::Soul)
            .with_trigger(TriggerIcon::Soul)
            .with_ability(
                AbilityDefinition::new("Grand Entrance", AbilityKind::Auto)
                    .text("When this card is played, heal 1.")
                    .trigger(TriggerCondition::WhenPlayed)
                    .effect(Effect::Heal { count: 1 }),
            ),
        CardDefinition::new("DEMO/W01-012", "Curtain Call", CardKind::Climax)
            .with_trigger(TriggerIcon::Comeback)
            .with_ability(
                AbilityDefinition::new("Spotlight", AbilityKind::Continuous)
                    .text("All your characters get +1000 power.")
                    .effect(Effect::PowerBoost {
                        target: EffectTarget::AllYourCharacters,
                        amount: 1000,
                    }),
            ),
        CardDefinition::new("DEMO/W01-013", "Rehearsal Notes", CardKind::Climax)
            .with_trigger(TriggerIcon::Draw)
            .with_ability(
                AbilityDefinition::new("Notes", AbilityKind::Continuous)
                    .text("All your characters get +2 soul.")
                    .effect(Effect::SoulBoost {
                        target: EffectTarget::AllYourCharacters,
                        amount: 2,
                    }),
            ),
    ])
}
