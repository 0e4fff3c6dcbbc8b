//! Card database for looking up card definitions
//!
//! The engine only needs two things from card data: enumerate every known
//! definition and look one up by code. `CardSource` is that seam; hosts that
//! keep cards in a file or database implement it themselves.

use crate::core::CardDefinition;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Read-only provider of card definitions
pub trait CardSource {
    /// Every definition, in a stable order
    fn definitions(&self) -> Vec<Arc<CardDefinition>>;

    /// Definition for a card code, if known
    fn lookup(&self, code: &str) -> Option<Arc<CardDefinition>>;
}

/// In-memory card database keyed by card code
///
/// Lookups ignore ASCII case. Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct CardDatabase {
    cards: FxHashMap<String, Arc<CardDefinition>>,
    order: Vec<String>,
}

impl CardDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(defs: impl IntoIterator<Item = CardDefinition>) -> Self {
        let mut db = CardDatabase::new();
        for def in defs {
            db.add_card(def);
        }
        db
    }

    /// Add or replace a definition
    pub fn add_card(&mut self, def: CardDefinition) {
        let key = def.code.as_str().to_ascii_lowercase();
        if self.cards.insert(key.clone(), Arc::new(def)).is_none() {
            self.order.push(key);
        }
    }

    pub fn get_card(&self, code: &str) -> Option<&Arc<CardDefinition>> {
        self.cards.get(&code.to_ascii_lowercase())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.cards.contains_key(&code.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl CardSource for CardDatabase {
    fn definitions(&self) -> Vec<Arc<CardDefinition>> {
        self.order
            .iter()
            .filter_map(|key| self.cards.get(key).cloned())
            .collect()
    }

    fn lookup(&self, code: &str) -> Option<Arc<CardDefinition>> {
        self.get_card(code).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CardKind;

    #[test]
    fn test_empty_database() {
        let db = CardDatabase::new();
        assert!(db.is_empty());
        assert!(db.lookup("W01-001").is_none());
    }

    #[test]
    fn test_lookup_ignores_case_and_keeps_order() {
        let db = CardDatabase::from_definitions([
            CardDefinition::new("W01-002", "Second", CardKind::Character),
            CardDefinition::new("W01-001", "First", CardKind::Character),
        ]);
        assert_eq!(db.len(), 2);
        assert!(db.contains("w01-001"));
        assert_eq!(db.lookup("W01-001").map(|d| d.name.to_string()), Some("First".to_string()));

        let codes: Vec<String> = db.definitions().iter().map(|d| d.code.to_string()).collect();
        assert_eq!(codes, vec!["W01-002", "W01-001"]);
    }

    #[test]
    fn test_re_adding_replaces_in_place() {
        let mut db = CardDatabase::new();
        db.add_card(CardDefinition::new("X", "Old", CardKind::Event));
        db.add_card(CardDefinition::new("Y", "Other", CardKind::Event));
        db.add_card(CardDefinition::new("X", "New", CardKind::Event));
        assert_eq!(db.len(), 2);
        assert_eq!(db.definitions()[0].name.as_str(), "New");
    }
}
