//! Registry and race/slot index containers

pub mod category_index;
pub mod registry;

pub use category_index::CategoryIndex;
pub use registry::RecipeRegistry;
