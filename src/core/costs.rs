//! Cost system for abilities, encores and backup
//!
//! Represents the various costs players pay: stock, cards from hand into the
//! clock, discards, resting characters, and so on.

use crate::core::{CardDefinition, CardId, CardKind, CardTrait, PlayerId};
use crate::game::GameState;
use crate::zones::ZoneKind;
use serde::{Deserialize, Serialize};

/// Restricts which cards may be selected to pay a cost
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CardFilter {
    #[default]
    Any,
    Kind(CardKind),
    Trait(CardTrait),
}

impl CardFilter {
    pub fn matches(&self, def: &CardDefinition) -> bool {
        match self {
            CardFilter::Any => true,
            CardFilter::Kind(kind) => def.kind == *kind,
            CardFilter::Trait(t) => def.traits.contains(t),
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "" | "Any" | "Card" => Some(CardFilter::Any),
            "Character" => Some(CardFilter::Kind(CardKind::Character)),
            "Event" => Some(CardFilter::Kind(CardKind::Event)),
            "Climax" => Some(CardFilter::Kind(CardKind::Climax)),
            other => other
                .strip_prefix("Trait:")
                .map(|t| CardFilter::Trait(CardTrait::new(t))),
        }
    }
}

/// A cost that must be paid to use an ability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cost {
    /// Top N stock cards to the waiting room
    Stock(u8),

    /// N cards from hand into the clock
    Clock(u8),

    /// Discard N matching cards from hand
    Discard { count: u8, filter: CardFilter },

    /// Rest the source character
    RestSelf,

    /// Rest N other standing characters
    Rest { count: u8, filter: CardFilter },

    /// Top N deck cards to the waiting room
    Deck(u8),

    /// N of your other characters from the stage to the waiting room
    StageToWaitingRoom(u8),

    /// The source card goes to memory
    SendSelfToMemory,

    /// The source card goes from hand to the waiting room
    DiscardSelf,

    /// Composite cost (multiple costs combined)
    Composite(Vec<Cost>),
}

impl Cost {
    /// Parse cost notation: `(2)`, `Clock<1>`, `Discard<1/Character>`,
    /// `RestSelf`, `Rest<2/Trait:Music>`, `Deck<1>`, `StageToWR<1>`, `Memory`,
    /// `DiscardSelf`. Whitespace-separated tokens form a composite.
    pub fn parse(cost_str: &str) -> Option<Self> {
        let tokens: Vec<&str> = cost_str.split_whitespace().collect();
        match tokens.len() {
            0 => None,
            1 => Self::parse_single(tokens[0]),
            _ => {
                let costs = tokens
                    .iter()
                    .map(|t| Self::parse_single(t))
                    .collect::<Option<Vec<_>>>()?;
                Some(Cost::Composite(costs))
            }
        }
    }

    fn parse_single(token: &str) -> Option<Self> {
        if let Some(n) = token.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
            return n.parse().ok().map(Cost::Stock);
        }
        match token {
            "RestSelf" => return Some(Cost::RestSelf),
            "Memory" => return Some(Cost::SendSelfToMemory),
            "DiscardSelf" => return Some(Cost::DiscardSelf),
            _ => {}
        }

        let (head, args) = token.split_once('<')?;
        let args = args.strip_suffix('>')?;
        let (count_str, filter_str) = match args.split_once('/') {
            Some((c, f)) => (c, f),
            None => (args, ""),
        };
        let count: u8 = count_str.parse().ok()?;

        match head {
            "Clock" => Some(Cost::Clock(count)),
            "Deck" => Some(Cost::Deck(count)),
            "StageToWR" => Some(Cost::StageToWaitingRoom(count)),
            "Discard" => Some(Cost::Discard {
                count,
                filter: CardFilter::parse(filter_str)?,
            }),
            "Rest" => Some(Cost::Rest {
                count,
                filter: CardFilter::parse(filter_str)?,
            }),
            _ => None,
        }
    }

    /// Flatten composite costs into their leaf components
    pub fn leaves(&self) -> Vec<&Cost> {
        match self {
            Cost::Composite(costs) => costs.iter().flat_map(|c| c.leaves()).collect(),
            other => vec![other],
        }
    }

    /// Total stock this cost consumes
    pub fn stock_total(&self) -> usize {
        self.leaves()
            .iter()
            .map(|c| match c {
                Cost::Stock(n) => *n as usize,
                _ => 0,
            })
            .sum()
    }

    /// Check whether the player could pay this cost right now
    ///
    /// Each component is checked on its own plus aggregate stock and deck
    /// totals; overlapping selections are rejected later by the payment plan.
    pub fn can_pay(&self, state: &GameState, player: PlayerId, source: CardId) -> bool {
        let Ok(zones) = state.zones(player) else {
            return false;
        };
        let leaves = self.leaves();

        let stock_needed = self.stock_total();
        let deck_needed: usize = leaves
            .iter()
            .map(|c| match c {
                Cost::Deck(n) => *n as usize,
                _ => 0,
            })
            .sum();
        if zones.count(ZoneKind::Stock) < stock_needed || zones.count(ZoneKind::Deck) < deck_needed {
            return false;
        }

        let source_card = state.cards.get(source).ok();
        let source_zone = source_card.map(|c| c.zone());

        leaves.iter().all(|cost| match cost {
            Cost::Stock(_) | Cost::Deck(_) | Cost::Composite(_) => true,
            Cost::Clock(n) => {
                let others = zones
                    .cards(ZoneKind::Hand)
                    .iter()
                    .filter(|&&id| id != source)
                    .count();
                others >= *n as usize
            }
            Cost::Discard { count, filter } => {
                let matching = zones
                    .cards(ZoneKind::Hand)
                    .iter()
                    .filter(|&&id| id != source)
                    .filter(|&&id| {
                        state
                            .cards
                            .get(id)
                            .map(|c| filter.matches(&c.definition))
                            .unwrap_or(false)
                    })
                    .count();
                matching >= *count as usize
            }
            Cost::RestSelf => {
                source_zone.map(|z| z.is_stage()).unwrap_or(false)
                    && source_card.map(|c| c.is_standing()).unwrap_or(false)
            }
            Cost::Rest { count, filter } => {
                let standing = zones
                    .stage_characters()
                    .into_iter()
                    .filter(|&(_, id)| id != source)
                    .filter(|&(_, id)| {
                        state
                            .cards
                            .get(id)
                            .map(|c| c.is_standing() && filter.matches(&c.definition))
                            .unwrap_or(false)
                    })
                    .count();
                standing >= *count as usize
            }
            Cost::StageToWaitingRoom(n) => {
                let others = zones
                    .stage_characters()
                    .into_iter()
                    .filter(|&(_, id)| id != source)
                    .count();
                others >= *n as usize
            }
            Cost::SendSelfToMemory => {
                source_zone.is_some() && source_zone != Some(ZoneKind::Memory)
            }
            Cost::DiscardSelf => source_zone == Some(ZoneKind::Hand),
        })
    }
}

/// Check every cost in a list
pub fn can_pay_all(costs: &[Cost], state: &GameState, player: PlayerId, source: CardId) -> bool {
    if costs.is_empty() {
        return true;
    }
    Cost::Composite(costs.to_vec()).can_pay(state, player, source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stock_cost() {
        assert_eq!(Cost::parse("(2)"), Some(Cost::Stock(2)));
        assert_eq!(Cost::parse("(x)"), None);
    }

    #[test]
    fn test_parse_simple_costs() {
        assert_eq!(Cost::parse("RestSelf"), Some(Cost::RestSelf));
        assert_eq!(Cost::parse("Memory"), Some(Cost::SendSelfToMemory));
        assert_eq!(Cost::parse("Clock<1>"), Some(Cost::Clock(1)));
        assert_eq!(Cost::parse("Deck<2>"), Some(Cost::Deck(2)));
        assert_eq!(Cost::parse("StageToWR<1>"), Some(Cost::StageToWaitingRoom(1)));
    }

    #[test]
    fn test_parse_filtered_costs() {
        assert_eq!(
            Cost::parse("Discard<1/Character>"),
            Some(Cost::Discard {
                count: 1,
                filter: CardFilter::Kind(CardKind::Character)
            })
        );
        assert_eq!(
            Cost::parse("Rest<2/Trait:Music>"),
            Some(Cost::Rest {
                count: 2,
                filter: CardFilter::Trait(CardTrait::new("Music"))
            })
        );
        assert_eq!(
            Cost::parse("Discard<1>"),
            Some(Cost::Discard {
                count: 1,
                filter: CardFilter::Any
            })
        );
        assert_eq!(Cost::parse("Discard<1/Land>"), None);
    }

    #[test]
    fn test_parse_composite() {
        let cost = Cost::parse("(1) DiscardSelf").unwrap();
        assert_eq!(
            cost,
            Cost::Composite(vec![Cost::Stock(1), Cost::DiscardSelf])
        );
        assert_eq!(cost.stock_total(), 1);
        assert_eq!(cost.leaves().len(), 2);

        // One unknown token poisons the whole composite
        assert_eq!(Cost::parse("(1) Sac<1/Land>"), None);
    }
}
