//! Race/slot keyed recipe index

use crate::recipe::Recipe;
use crate::types::{RaceName, RecipeName, SlotName};
use hashbrown::HashMap;

/// Two-level race → slot → recipes container
///
/// Within one (race, slot) list recipe names are unique; inserting a name
/// that is already present replaces the entry in place, preserving its
/// position. Race keys exist once any recipe references them or once seeded
/// explicitly, even with zero recipes.
#[derive(Debug, Default)]
pub struct CategoryIndex {
    races: HashMap<RaceName, HashMap<SlotName, Vec<Recipe>>>,
}

impl CategoryIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every race key and entry
    pub fn clear(&mut self) {
        self.races.clear();
    }

    /// Idempotently seed an empty slot map for `race`
    pub fn ensure_race(&mut self, race: &str) {
        if !self.races.contains_key(race) {
            self.races.insert(race.to_string(), HashMap::new());
        }
    }

    /// Whether `race` has a key in the index
    pub fn contains_race(&self, race: &str) -> bool {
        self.races.contains_key(race)
    }

    /// Insert or replace `recipe` under (race, slot), creating either level
    /// as needed. Replacement matches by name and keeps the list position.
    pub fn upsert(&mut self, race: &str, slot: &str, recipe: &Recipe) {
        let slots = self.races.entry(race.to_string()).or_default();
        let list = slots.entry(slot.to_string()).or_default();
        match list.iter_mut().find(|r| r.name == recipe.name) {
            Some(existing) => *existing = recipe.clone(),
            None => list.push(recipe.clone()),
        }
    }

    /// Recipes indexed under (race, slot), in insertion order
    pub fn recipes(&self, race: &str, slot: &str) -> Option<&[Recipe]> {
        self.races.get(race).and_then(|slots| slots.get(slot)).map(|v| v.as_slice())
    }

    /// Recipe names indexed under (race, slot); empty when either key is absent
    pub fn names(&self, race: &str, slot: &str) -> Vec<RecipeName> {
        self.recipes(race, slot)
            .map(|list| list.iter().map(|r| r.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Race keys currently present
    pub fn races(&self) -> Vec<&str> {
        self.races.keys().map(|r| r.as_str()).collect()
    }

    /// Slot keys present under `race`
    pub fn slots(&self, race: &str) -> Vec<&str> {
        self.races
            .get(race)
            .map(|slots| slots.keys().map(|s| s.as_str()).collect())
            .unwrap_or_default()
    }

    /// Every recipe indexed under `race`, across its slots
    pub fn recipes_for_race(&self, race: &str) -> Vec<Recipe> {
        self.races
            .get(race)
            .map(|slots| slots.values().flatten().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of race keys
    pub fn race_count(&self) -> usize {
        self.races.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_recipe(name: &str, slot: &str) -> Recipe {
        Recipe::new(name.to_string(), slot.to_string(), vec!["Human".to_string()])
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut index = CategoryIndex::new();
        index.upsert("Human", "Head", &make_recipe("Hat1", "Head"));
        index.upsert("Human", "Head", &make_recipe("Hat2", "Head"));

        let replacement = make_recipe("Hat1", "Head").with_payload("v2".to_string());
        index.upsert("Human", "Head", &replacement);

        let recipes = index.recipes("Human", "Head").unwrap();
        assert_eq!(recipes.len(), 2);
        // position preserved, content replaced
        assert_eq!(recipes[0].name, "Hat1");
        assert_eq!(recipes[0].payload, "v2");
        assert_eq!(recipes[1].name, "Hat2");
    }

    #[test]
    fn test_ensure_race_is_idempotent() {
        let mut index = CategoryIndex::new();
        index.ensure_race("Human");
        index.upsert("Human", "Head", &make_recipe("Hat1", "Head"));
        index.ensure_race("Human");

        assert_eq!(index.race_count(), 1);
        assert_eq!(index.names("Human", "Head"), vec!["Hat1".to_string()]);
    }

    #[test]
    fn test_missing_keys_yield_empty() {
        let index = CategoryIndex::new();
        assert!(index.recipes("Human", "Head").is_none());
        assert!(index.names("Human", "Head").is_empty());
        assert!(index.slots("Human").is_empty());
        assert!(index.recipes_for_race("Human").is_empty());
    }

    #[test]
    fn test_recipes_for_race_spans_slots() {
        let mut index = CategoryIndex::new();
        index.upsert("Human", "Head", &make_recipe("Hat1", "Head"));
        index.upsert("Human", "Feet", &make_recipe("Boots1", "Feet"));

        let mut names: Vec<String> =
            index.recipes_for_race("Human").iter().map(|r| r.name.clone()).collect();
        names.sort();
        assert_eq!(names, vec!["Boots1".to_string(), "Hat1".to_string()]);
    }
}
