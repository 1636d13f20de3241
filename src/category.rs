//! Race categories and the provider that supplies them

use crate::types::{RaceName, SlotName};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Race descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Race name
    pub name: RaceName,
    /// Wardrobe slots this race recognizes
    #[serde(default)]
    pub wardrobe_slots: Vec<SlotName>,
    /// Races whose recipes this race also accepts, subject to slot support
    #[serde(default)]
    pub backwards_compatible_with: Vec<RaceName>,
}

impl Category {
    /// Create a race descriptor
    pub fn new(name: RaceName, wardrobe_slots: Vec<SlotName>) -> Self {
        Self {
            name,
            wardrobe_slots,
            backwards_compatible_with: Vec::new(),
        }
    }

    /// Declare races this one accepts recipes from
    pub fn with_backwards_compatibility(mut self, races: Vec<RaceName>) -> Self {
        self.backwards_compatible_with = races;
        self
    }

    /// Whether this race recognizes `slot`
    pub fn recognizes_slot(&self, slot: &str) -> bool {
        self.wardrobe_slots.iter().any(|s| s == slot)
    }

    /// Whether this race accepts recipes targeted at `race`
    pub fn is_backwards_compatible_with(&self, race: &str) -> bool {
        self.backwards_compatible_with.iter().any(|r| r == race)
    }
}

/// Supplies race categories to the index
///
/// Entries in the returned lists may be `None` when a race is known but its
/// data has not been downloaded yet; callers skip those.
pub trait CategoryProvider {
    /// Races ready for use. Answering may trigger provider-side discovery
    /// of newly downloaded races, hence `&mut self`.
    fn all_categories(&mut self) -> Vec<Option<Category>>;

    /// All known races regardless of download state
    fn all_base_categories(&self) -> Vec<Option<Category>>;

    /// Descriptor lookup. With `trigger_fetch` false the provider must not
    /// start a download for a race it only knows by name.
    fn category(&self, name: &str, trigger_fetch: bool) -> Option<Category>;

    /// Reserved placeholder race excluded from indexing
    fn placeholder_name(&self) -> &str;
}

/// In-memory provider backed by a fixed set of races
///
/// The test workhorse, and a working provider for hosts that register their
/// race catalog up front instead of running a download pipeline. Races can
/// be registered as pending (known by name only) and promoted once their
/// data arrives.
#[derive(Debug)]
pub struct StaticCategoryProvider {
    ready: HashMap<RaceName, Category>,
    /// Known race names in registration order
    known: Vec<RaceName>,
    placeholder: String,
}

impl StaticCategoryProvider {
    /// Empty provider with the default placeholder name
    pub fn new() -> Self {
        Self {
            ready: HashMap::new(),
            known: Vec::new(),
            placeholder: "RacePlaceholder".to_string(),
        }
    }

    /// Empty provider with a custom placeholder name
    pub fn with_placeholder(placeholder: String) -> Self {
        Self {
            ready: HashMap::new(),
            known: Vec::new(),
            placeholder,
        }
    }

    /// Register a race whose data is available
    pub fn add_category(&mut self, category: Category) {
        self.track(&category.name);
        self.ready.insert(category.name.clone(), category);
    }

    /// Register a race known by name only (not yet downloaded)
    pub fn add_pending(&mut self, name: RaceName) {
        self.track(&name);
    }

    /// Promote a pending race once its data has arrived
    pub fn promote(&mut self, category: Category) {
        self.add_category(category);
    }

    fn track(&mut self, name: &str) {
        if !self.known.iter().any(|n| n == name) {
            self.known.push(name.to_string());
        }
    }
}

impl Default for StaticCategoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryProvider for StaticCategoryProvider {
    fn all_categories(&mut self) -> Vec<Option<Category>> {
        self.known.iter().map(|n| self.ready.get(n).cloned()).collect()
    }

    fn all_base_categories(&self) -> Vec<Option<Category>> {
        self.known
            .iter()
            .map(|n| {
                // pending races surface as name-only stubs so callers can
                // still seed keys for them
                Some(self.ready.get(n).cloned().unwrap_or_else(|| Category::new(n.clone(), Vec::new())))
            })
            .collect()
    }

    fn category(&self, name: &str, _trigger_fetch: bool) -> Option<Category> {
        self.ready.get(name).cloned()
    }

    fn placeholder_name(&self) -> &str {
        &self.placeholder
    }
}
