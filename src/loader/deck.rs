//! Deck list loader
//!
//! One entry per line: `CODE qty`. Blank lines and lines starting with `#`
//! are ignored.

use crate::core::CardDefinition;
use crate::loader::CardSource;
use crate::{EngineError, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Copies built for each of the first definitions in the fallback deck
const FALLBACK_COPIES: u8 = 5;
const FALLBACK_DISTINCT: usize = 10;

/// Deck loader for deck list files
pub struct DeckLoader;

impl DeckLoader {
    pub fn load_from_file(path: &Path) -> Result<DeckList> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a deck from its text content
    pub fn parse(content: &str) -> Result<DeckList> {
        let mut entries = Vec::new();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let (Some(code), Some(count_str), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(EngineError::InvalidDeckFormat(format!(
                    "line {}: expected `CODE qty`, got `{line}`",
                    line_no + 1
                )));
            };
            let count: u8 = count_str.parse().map_err(|_| {
                EngineError::InvalidDeckFormat(format!(
                    "line {}: `{count_str}` is not a card count",
                    line_no + 1
                ))
            })?;

            entries.push(DeckEntry {
                card_code: code.to_string(),
                count,
            });
        }

        if entries.is_empty() {
            return Err(EngineError::InvalidDeckFormat("Empty deck".to_string()));
        }
        Ok(DeckList { entries })
    }
}

/// Represents a deck entry (card code and count)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckEntry {
    pub card_code: String,
    pub count: u8,
}

/// Represents a complete deck list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckList {
    pub entries: Vec<DeckEntry>,
}

impl DeckList {
    pub fn total_cards(&self) -> usize {
        self.entries.iter().map(|e| e.count as usize).sum()
    }

    /// Five copies each of the first ten definitions the source knows
    pub fn fallback(source: &dyn CardSource) -> DeckList {
        let entries = source
            .definitions()
            .iter()
            .take(FALLBACK_DISTINCT)
            .map(|def| DeckEntry {
                card_code: def.code.to_string(),
                count: FALLBACK_COPIES,
            })
            .collect();
        DeckList { entries }
    }

    /// Look up every entry; an unknown code is an error
    pub fn resolve(&self, source: &dyn CardSource) -> Result<Vec<(Arc<CardDefinition>, u8)>> {
        self.entries
            .iter()
            .map(|entry| {
                source
                    .lookup(&entry.card_code)
                    .map(|def| (def, entry.count))
                    .ok_or_else(|| EngineError::UnknownCard(entry.card_code.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::demo::demo_card_pool;

    #[test]
    fn test_parse_simple_deck() {
        let content = r#"
# starter
DEMO/W01-001 4
DEMO/W01-002  3

DEMO/W01-015 8
"#;
        let deck = DeckLoader::parse(content).unwrap();
        assert_eq!(deck.entries.len(), 3);
        assert_eq!(deck.total_cards(), 15);
        assert_eq!(deck.entries[1].card_code, "DEMO/W01-002");
        assert_eq!(deck.entries[1].count, 3);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            DeckLoader::parse("# nothing\n"),
            Err(EngineError::InvalidDeckFormat(_))
        ));
        assert!(matches!(
            DeckLoader::parse("DEMO/W01-001 four"),
            Err(EngineError::InvalidDeckFormat(_))
        ));
        assert!(matches!(
            DeckLoader::parse("DEMO/W01-001 4 extra"),
            Err(EngineError::InvalidDeckFormat(_))
        ));
    }

    #[test]
    fn test_unknown_code_is_an_error() {
        let pool = demo_card_pool();
        let deck = DeckLoader::parse("NOT-A-CARD 2").unwrap();
        assert!(matches!(deck.resolve(&pool), Err(EngineError::UnknownCard(code)) if code == "NOT-A-CARD"));
    }

    #[test]
    fn test_fallback_deck() {
        let pool = demo_card_pool();
        let deck = DeckList::fallback(&pool);
        assert_eq!(deck.entries.len(), 10);
        assert_eq!(deck.total_cards(), 50);
        assert!(deck.resolve(&pool).is_ok());
    }
}
