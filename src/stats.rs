//! Character stat blocks keyed by character identifier.
//!
//! Playable characters differ only in their starting numbers, so they are
//! described by data rather than by separate types. A [`StatTable`] maps a
//! [`CharacterKey`] to the [`CharacterStats`] a new party member starts with.

use std::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Identifier used to look up a character's stats and sprite sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterKey(String);

impl CharacterKey {
    /// Creates a key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CharacterKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Stat block for one character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStats {
    /// Display name shown on the character sheet.
    pub name: String,
    /// Experience level.
    pub level: u32,
    /// Maximum hit points.
    pub max_hp: u32,
    /// Current hit points.
    pub hp: u32,
    /// Maximum magic points.
    pub max_mp: u32,
    /// Current magic points.
    pub mp: u32,
    /// Physical attack.
    pub strength: u32,
    /// Physical defence.
    pub defence: u32,
    /// Turn order and evasion.
    pub agility: u32,
    /// Magic attack and resistance.
    pub intellect: u32,
}

impl CharacterStats {
    /// Whether the character still has hit points left.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Removes up to `amount` hit points, stopping at zero.
    pub fn apply_damage(&mut self, amount: u32) {
        self.hp = self.hp.saturating_sub(amount);
    }

    /// Restores up to `amount` hit points, stopping at `max_hp`.
    pub fn heal(&mut self, amount: u32) {
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
    }
}

/// Lookup table of starting stats by character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatTable {
    entries: HashMap<CharacterKey, CharacterStats>,
}

impl StatTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The playable characters that ship with the game.
    #[must_use]
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.insert(
            CharacterKey::new("ardent"),
            CharacterStats {
                name: "Ardent".to_owned(),
                level: 1,
                max_hp: 120,
                hp: 120,
                max_mp: 20,
                mp: 20,
                strength: 14,
                defence: 12,
                agility: 8,
                intellect: 6,
            },
        );
        table.insert(
            CharacterKey::new("wren"),
            CharacterStats {
                name: "Wren".to_owned(),
                level: 1,
                max_hp: 85,
                hp: 85,
                max_mp: 40,
                mp: 40,
                strength: 9,
                defence: 8,
                agility: 15,
                intellect: 10,
            },
        );
        table.insert(
            CharacterKey::new("sable"),
            CharacterStats {
                name: "Sable".to_owned(),
                level: 1,
                max_hp: 70,
                hp: 70,
                max_mp: 90,
                mp: 90,
                strength: 5,
                defence: 6,
                agility: 10,
                intellect: 17,
            },
        );
        table
    }

    /// Parses a table from a JSON object of `key -> stats`.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the document is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Adds or replaces the stats for `key`.
    pub fn insert(&mut self, key: CharacterKey, stats: CharacterStats) -> Option<CharacterStats> {
        self.entries.insert(key, stats)
    }

    /// Stats for `key`, if the character is known.
    #[must_use]
    pub fn get(&self, key: &CharacterKey) -> Option<&CharacterStats> {
        self.entries.get(key)
    }

    /// All known keys in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<CharacterKey> {
        let mut keys: Vec<_> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of known characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ardent", "Ardent")]
    #[case("wren", "Wren")]
    #[case("sable", "Sable")]
    fn builtin_characters_resolve(#[case] key: &str, #[case] name: &str) {
        let table = StatTable::builtin();
        let stats = table.get(&CharacterKey::from(key)).expect("builtin character");
        assert_eq!(stats.name, name);
        assert_eq!(stats.hp, stats.max_hp);
    }

    #[test]
    fn keys_are_sorted() {
        let keys = StatTable::builtin().keys();
        let names: Vec<_> = keys.iter().map(CharacterKey::as_str).collect();
        assert_eq!(names, vec!["ardent", "sable", "wren"]);
    }

    #[test]
    fn table_parses_from_json() {
        let json = r#"{
            "moth": {
                "name": "Moth", "level": 3, "max_hp": 40, "hp": 12,
                "max_mp": 10, "mp": 10, "strength": 2, "defence": 2,
                "agility": 20, "intellect": 4
            }
        }"#;
        let table = StatTable::from_json_str(json).expect("valid table");
        let stats = table.get(&CharacterKey::from("moth")).expect("moth present");
        assert_eq!(stats.level, 3);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn damage_and_heal_are_clamped() {
        let mut stats = StatTable::builtin()
            .get(&CharacterKey::from("wren"))
            .cloned()
            .expect("wren present");
        stats.apply_damage(500);
        assert_eq!(stats.hp, 0);
        assert!(!stats.is_alive());
        stats.heal(1_000);
        assert_eq!(stats.hp, stats.max_hp);
    }
}
