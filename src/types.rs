//! Core types and constants

/// Race name that recipes declare compatibility with
pub type RaceName = String;

/// Wardrobe slot label under a race
pub type SlotName = String;

/// Unique recipe name
pub type RecipeName = String;

/// Named source container (e.g. a downloadable asset package)
pub type ContainerName = String;

/// Synthetic slot that wardrobe collections are always indexed under,
/// regardless of their declared slot
pub const COLLECTION_SLOT: &str = "FullOutfit";
