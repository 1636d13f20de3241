//! Central recipe registry

use crate::recipe::{CharacterText, Recipe};
use crate::types::RecipeName;
use hashbrown::HashMap;

/// Central name → recipe lookup
///
/// The single source of truth for whether a recipe with a given name exists.
/// Name collisions resolve last-write-wins: re-indexing a name replaces the
/// stored recipe. Character-definition texts live here too, with the same
/// upsert semantics.
#[derive(Debug, Default)]
pub struct RecipeRegistry {
    recipes: HashMap<RecipeName, Recipe>,
    character_texts: HashMap<String, String>,
}

impl RecipeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a recipe by name
    pub fn upsert(&mut self, recipe: Recipe) {
        self.recipes.insert(recipe.name.clone(), recipe);
    }

    /// Look up a recipe by name
    pub fn get(&self, name: &str) -> Option<&Recipe> {
        self.recipes.get(name)
    }

    /// Whether a recipe with `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.recipes.contains_key(name)
    }

    /// Number of registered recipes
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Whether no recipes are registered
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Registered recipe names
    pub fn recipe_names(&self) -> Vec<&str> {
        self.recipes.keys().map(|n| n.as_str()).collect()
    }

    /// Insert or replace a character-definition text by name
    pub fn upsert_character_text(&mut self, entry: CharacterText) {
        self.character_texts.insert(entry.name, entry.text);
    }

    /// Character-definition text registered under `name`
    pub fn character_text(&self, name: &str) -> Option<&str> {
        self.character_texts.get(name).map(|t| t.as_str())
    }

    /// Registered character names
    pub fn character_names(&self) -> Vec<&str> {
        self.character_texts.keys().map(|n| n.as_str()).collect()
    }
}
