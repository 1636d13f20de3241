//! Recipe asset representations

use crate::types::{RaceName, RecipeName, SlotName, COLLECTION_SLOT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of recipe asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecipeKind {
    /// A single wardrobe piece
    Standard,
    /// A bundle of outfit pieces, always indexed under the synthetic
    /// collection slot
    Collection,
}

impl Default for RecipeKind {
    fn default() -> Self {
        RecipeKind::Standard
    }
}

/// Recipe asset representation
///
/// Recipes are supplied by sources; the index only upserts and fans them
/// out, it never mutates their declared attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique recipe name
    pub name: RecipeName,
    /// Declared wardrobe slot (empty = not yet assigned)
    #[serde(default)]
    pub wardrobe_slot: SlotName,
    /// Races this recipe is compatible with, in declaration order
    #[serde(default)]
    pub compatible_races: Vec<RaceName>,
    /// Kind discriminator
    #[serde(default)]
    pub kind: RecipeKind,
    /// Opaque recipe payload; never interpreted by the index
    #[serde(default)]
    pub payload: String,
}

impl Recipe {
    /// Create a standard recipe
    pub fn new(name: RecipeName, wardrobe_slot: SlotName, compatible_races: Vec<RaceName>) -> Self {
        Self {
            name,
            wardrobe_slot,
            compatible_races,
            kind: RecipeKind::Standard,
            payload: String::new(),
        }
    }

    /// Create a wardrobe collection
    pub fn collection(name: RecipeName, compatible_races: Vec<RaceName>) -> Self {
        Self {
            name,
            wardrobe_slot: String::new(),
            compatible_races,
            kind: RecipeKind::Collection,
            payload: String::new(),
        }
    }

    /// Attach a payload
    pub fn with_payload(mut self, payload: String) -> Self {
        self.payload = payload;
        self
    }

    /// Slot this recipe is indexed under: collections are forced into the
    /// synthetic collection slot regardless of their declared slot
    pub fn effective_slot(&self) -> &str {
        match self.kind {
            RecipeKind::Collection => COLLECTION_SLOT,
            RecipeKind::Standard => &self.wardrobe_slot,
        }
    }

    /// Whether this recipe is a wardrobe collection
    pub fn is_collection(&self) -> bool {
        self.kind == RecipeKind::Collection
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Recipe({}, {}, {:?})", self.name, self.effective_slot(), self.kind)
    }
}

/// Named character-definition text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterText {
    /// Character name
    pub name: String,
    /// Definition text, opaque to the index
    pub text: String,
}

impl CharacterText {
    /// Create a character-definition text
    pub fn new(name: String, text: String) -> Self {
        Self { name, text }
    }
}
