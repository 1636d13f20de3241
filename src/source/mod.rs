//! Recipe sources: where discovered assets come from
//!
//! This module is the adapter seam between the index and the asset
//! storage/transport layer:
//! - [`MemorySource`]: container-keyed batches held in memory
//! - [`FileSystemSource`]: local resource folders and unpacked bundle directories
//!
//! Sources deliver results synchronously through a callback, possibly in
//! several batches (one per container), and record every produced name in
//! the shared [`ProvenanceMap`].

pub mod filesystem;
pub mod memory;

pub use filesystem::FileSystemSource;
pub use memory::MemorySource;

use crate::recipe::{CharacterText, Recipe, RecipeKind};
use crate::types::{ContainerName, RecipeName};
use hashbrown::HashMap;

/// Parameters for a single discovery pass
#[derive(Debug, Clone)]
pub struct DiscoverRequest {
    /// Scan local bundled resources
    pub use_local: bool,
    /// Scan downloaded containers
    pub use_bundles: bool,
    /// Allow the source to fetch containers it has not downloaded yet
    pub allow_remote_fetch: bool,
    /// Restrict the scan to these containers (comma separated, empty = all)
    pub container_filter: String,
    /// Folder scope(s) for the local resource scan (comma separated)
    pub default_scope: String,
    /// Restrict to one recipe kind
    pub kind_filter: Option<RecipeKind>,
    /// Restrict to an exact recipe name (empty = all)
    pub name_filter: String,
}

impl Default for DiscoverRequest {
    fn default() -> Self {
        Self {
            use_local: true,
            use_bundles: true,
            allow_remote_fetch: true,
            container_filter: String::new(),
            default_scope: String::new(),
            kind_filter: None,
            name_filter: String::new(),
        }
    }
}

/// Tracks which source container produced which recipe names
///
/// Append-only per discovery batch: a name may appear under several
/// containers, and repeatedly under one across refreshes. Lookups scan
/// containers in discovery order and return the first match.
#[derive(Debug, Clone, Default)]
pub struct ProvenanceMap {
    names_by_container: HashMap<ContainerName, Vec<RecipeName>>,
    container_order: Vec<ContainerName>,
}

impl ProvenanceMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `container` produced `name`
    pub fn record(&mut self, container: &str, name: &str) {
        if !self.names_by_container.contains_key(container) {
            self.container_order.push(container.to_string());
            self.names_by_container.insert(container.to_string(), Vec::new());
        }
        if let Some(names) = self.names_by_container.get_mut(container) {
            names.push(name.to_string());
        }
    }

    /// Names produced by `container`, in discovery order
    pub fn names_in(&self, container: &str) -> Option<&[RecipeName]> {
        self.names_by_container.get(container).map(|v| v.as_slice())
    }

    /// First container that produced `name`
    pub fn first_container_of(&self, name: &str) -> Option<&str> {
        self.container_order
            .iter()
            .find(|c| {
                self.names_by_container
                    .get(c.as_str())
                    .map_or(false, |names| names.iter().any(|n| n == name))
            })
            .map(|c| c.as_str())
    }

    /// Containers seen so far, in discovery order
    pub fn containers(&self) -> &[ContainerName] {
        &self.container_order
    }

    /// Number of containers seen so far
    pub fn container_count(&self) -> usize {
        self.container_order.len()
    }

    /// Whether no container has produced anything yet
    pub fn is_empty(&self) -> bool {
        self.container_order.is_empty()
    }
}

/// Adapter over the asset storage/transport layer
///
/// Implementations deliver results synchronously through the supplied
/// callback and record every produced name in `provenance` under its
/// originating container. The return value reports whether anything was
/// found.
pub trait RecipeSource {
    /// Whether remote fetching is possible yet (e.g. the bundle catalog has
    /// been downloaded). The system forces `allow_remote_fetch` off while
    /// this is false.
    fn is_ready(&self) -> bool;

    /// Discover recipe assets matching `request`
    fn discover_recipes(
        &mut self,
        request: &DiscoverRequest,
        provenance: &mut ProvenanceMap,
        on_batch: &mut dyn FnMut(Vec<Recipe>),
    ) -> bool;

    /// Discover character-definition texts matching `request`
    fn discover_character_texts(
        &mut self,
        request: &DiscoverRequest,
        provenance: &mut ProvenanceMap,
        on_batch: &mut dyn FnMut(Vec<CharacterText>),
    ) -> bool;
}

/// Split a comma-separated container/scope list into trimmed entries
pub(crate) fn split_scope_list(list: &str) -> Vec<&str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
}

/// Whether `container` passes `filter` (comma-separated list, empty = all)
pub(crate) fn container_matches(filter: &str, container: &str) -> bool {
    filter.trim().is_empty() || split_scope_list(filter).iter().any(|f| *f == container)
}

pub(crate) fn recipe_matches(recipe: &Recipe, request: &DiscoverRequest) -> bool {
    if let Some(kind) = request.kind_filter {
        if recipe.kind != kind {
            return false;
        }
    }
    request.name_filter.is_empty() || recipe.name == request.name_filter
}

pub(crate) fn text_matches(text: &CharacterText, request: &DiscoverRequest) -> bool {
    request.name_filter.is_empty() || text.name == request.name_filter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provenance_first_match_in_discovery_order() {
        let mut provenance = ProvenanceMap::new();
        provenance.record("pack_a", "Hat1");
        provenance.record("pack_b", "Hat1");
        provenance.record("pack_b", "Boots1");

        assert_eq!(provenance.first_container_of("Hat1"), Some("pack_a"));
        assert_eq!(provenance.first_container_of("Boots1"), Some("pack_b"));
        assert_eq!(provenance.first_container_of("Gloves1"), None);
        assert_eq!(provenance.container_count(), 2);
    }

    #[test]
    fn test_provenance_is_append_only() {
        let mut provenance = ProvenanceMap::new();
        provenance.record("pack_a", "Hat1");
        provenance.record("pack_a", "Hat1");

        assert_eq!(provenance.names_in("pack_a").unwrap().len(), 2);
    }

    #[test]
    fn test_scope_list_splitting() {
        assert_eq!(split_scope_list("a, b ,c"), vec!["a", "b", "c"]);
        assert!(split_scope_list("").is_empty());
        assert!(split_scope_list(" , ").is_empty());
    }

    #[test]
    fn test_container_filter() {
        assert!(container_matches("", "pack_a"));
        assert!(container_matches("pack_a,pack_b", "pack_b"));
        assert!(!container_matches("pack_a", "pack_b"));
    }
}
