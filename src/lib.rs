//! # Wardrobe
//!
//! Runtime recipe/asset index for a character-customization system.
//!
//! The crate discovers, indexes, and serves recipe assets — text
//! descriptions of character appearance and wardrobe items — whether they
//! ship with the application or arrive later inside downloaded asset
//! packages. Recipes are kept in a race/slot keyed multi-map that is
//! incrementally populated as packages arrive, with idempotent re-indexing,
//! backwards-compatibility propagation across related races, and
//! per-container provenance tracking for cache and preload decisions.
//!
//! ## Example
//!
//! ```rust
//! use wardrobe::prelude::*;
//!
//! let mut provider = StaticCategoryProvider::new();
//! provider.add_category(Category::new("Human".to_string(), vec!["Head".to_string()]));
//!
//! let mut source = MemorySource::new();
//! source.add_bundle_recipe(
//!     "starter_pack",
//!     Recipe::new("Hat1".to_string(), "Head".to_string(), vec!["Human".to_string()]),
//! );
//!
//! let mut system = CharacterSystem::new(provider, source);
//! system.init();
//!
//! assert!(system.recipe("Hat1", false).is_some());
//! assert_eq!(system.originating_container("Hat1"), Some("starter_pack"));
//! ```

pub mod category;
pub mod error;
pub mod index;
pub mod recipe;
pub mod source;
pub mod system;
pub mod types;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::category::{Category, CategoryProvider, StaticCategoryProvider};
    pub use crate::error::{Result, WardrobeError};
    pub use crate::index::{CategoryIndex, RecipeRegistry};
    pub use crate::recipe::{CharacterText, Recipe, RecipeKind};
    pub use crate::source::{
        DiscoverRequest, FileSystemSource, MemorySource, ProvenanceMap, RecipeSource,
    };
    pub use crate::system::{CharacterSystem, SystemConfig};
    pub use crate::types::*;
}
