//! In-memory recipe source

use super::{container_matches, recipe_matches, split_scope_list, text_matches};
use super::{DiscoverRequest, ProvenanceMap, RecipeSource};
use crate::recipe::{CharacterText, Recipe};
use crate::types::ContainerName;
use hashbrown::HashMap;

/// Container-keyed in-memory source
///
/// The test workhorse, and the adapter seam for hosts that manage asset
/// loading themselves: register batches under local scopes or container
/// names and let discovery filter them. Containers registered as remote are
/// only served once a discovery pass is allowed to fetch them, which models
/// the downloaded-on-demand path.
#[derive(Debug)]
pub struct MemorySource {
    local_recipes: HashMap<String, Vec<Recipe>>,
    local_texts: HashMap<String, Vec<CharacterText>>,
    bundle_recipes: HashMap<ContainerName, Vec<Recipe>>,
    bundle_texts: HashMap<ContainerName, Vec<CharacterText>>,
    /// Downloaded containers in arrival order
    bundle_order: Vec<ContainerName>,
    remote_recipes: HashMap<ContainerName, Vec<Recipe>>,
    remote_texts: HashMap<ContainerName, Vec<CharacterText>>,
    ready: bool,
}

impl MemorySource {
    /// Create an empty, ready source
    pub fn new() -> Self {
        Self {
            local_recipes: HashMap::new(),
            local_texts: HashMap::new(),
            bundle_recipes: HashMap::new(),
            bundle_texts: HashMap::new(),
            bundle_order: Vec::new(),
            remote_recipes: HashMap::new(),
            remote_texts: HashMap::new(),
            ready: true,
        }
    }

    /// Mark the source ready or not (e.g. bundle catalog not yet fetched)
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Register a recipe available from local resources under `scope`
    pub fn add_local_recipe(&mut self, scope: &str, recipe: Recipe) {
        self.local_recipes.entry(scope.to_string()).or_default().push(recipe);
    }

    /// Register a character text available from local resources under `scope`
    pub fn add_local_text(&mut self, scope: &str, text: CharacterText) {
        self.local_texts.entry(scope.to_string()).or_default().push(text);
    }

    /// Register a recipe in an already-downloaded container
    pub fn add_bundle_recipe(&mut self, container: &str, recipe: Recipe) {
        self.track_container(container);
        self.bundle_recipes.entry(container.to_string()).or_default().push(recipe);
    }

    /// Register a character text in an already-downloaded container
    pub fn add_bundle_text(&mut self, container: &str, text: CharacterText) {
        self.track_container(container);
        self.bundle_texts.entry(container.to_string()).or_default().push(text);
    }

    /// Register a recipe in a container that has not been downloaded yet
    pub fn add_remote_recipe(&mut self, container: &str, recipe: Recipe) {
        self.remote_recipes.entry(container.to_string()).or_default().push(recipe);
    }

    /// Register a character text in a container that has not been downloaded yet
    pub fn add_remote_text(&mut self, container: &str, text: CharacterText) {
        self.remote_texts.entry(container.to_string()).or_default().push(text);
    }

    /// Containers downloaded so far, in arrival order
    pub fn downloaded_containers(&self) -> &[ContainerName] {
        &self.bundle_order
    }

    fn track_container(&mut self, container: &str) {
        if !self.bundle_order.iter().any(|c| c == container) {
            self.bundle_order.push(container.to_string());
        }
    }

    /// Move matching remote containers into the downloaded set
    fn fetch_remote(&mut self, filter: &str) {
        if self.remote_recipes.is_empty() && self.remote_texts.is_empty() {
            return;
        }
        let mut wanted: Vec<ContainerName> = self
            .remote_recipes
            .keys()
            .chain(self.remote_texts.keys())
            .filter(|c| container_matches(filter, c.as_str()))
            .cloned()
            .collect();
        wanted.sort();
        wanted.dedup();

        for container in wanted {
            log::debug!("Fetching remote container {}", container);
            if let Some(items) = self.remote_recipes.remove(&container) {
                self.bundle_recipes.entry(container.clone()).or_default().extend(items);
            }
            if let Some(items) = self.remote_texts.remove(&container) {
                self.bundle_texts.entry(container.clone()).or_default().extend(items);
            }
            self.track_container(&container);
        }
    }
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipeSource for MemorySource {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn discover_recipes(
        &mut self,
        request: &DiscoverRequest,
        provenance: &mut ProvenanceMap,
        on_batch: &mut dyn FnMut(Vec<Recipe>),
    ) -> bool {
        let mut found = false;

        if request.use_local {
            for scope in split_scope_list(&request.default_scope) {
                if let Some(items) = self.local_recipes.get(scope) {
                    let batch: Vec<Recipe> =
                        items.iter().filter(|r| recipe_matches(r, request)).cloned().collect();
                    if !batch.is_empty() {
                        found = true;
                        on_batch(batch);
                    }
                }
            }
        }

        if request.use_bundles {
            if request.allow_remote_fetch {
                self.fetch_remote(&request.container_filter);
            }
            let containers: Vec<ContainerName> = self
                .bundle_order
                .iter()
                .filter(|c| container_matches(&request.container_filter, c.as_str()))
                .cloned()
                .collect();
            for container in containers {
                let Some(items) = self.bundle_recipes.get(&container) else {
                    continue;
                };
                let batch: Vec<Recipe> =
                    items.iter().filter(|r| recipe_matches(r, request)).cloned().collect();
                if batch.is_empty() {
                    continue;
                }
                for recipe in &batch {
                    provenance.record(&container, &recipe.name);
                }
                found = true;
                on_batch(batch);
            }
        }

        found
    }

    fn discover_character_texts(
        &mut self,
        request: &DiscoverRequest,
        provenance: &mut ProvenanceMap,
        on_batch: &mut dyn FnMut(Vec<CharacterText>),
    ) -> bool {
        let mut found = false;

        if request.use_local {
            for scope in split_scope_list(&request.default_scope) {
                if let Some(items) = self.local_texts.get(scope) {
                    let batch: Vec<CharacterText> =
                        items.iter().filter(|t| text_matches(t, request)).cloned().collect();
                    if !batch.is_empty() {
                        found = true;
                        on_batch(batch);
                    }
                }
            }
        }

        if request.use_bundles {
            if request.allow_remote_fetch {
                self.fetch_remote(&request.container_filter);
            }
            let containers: Vec<ContainerName> = self
                .bundle_order
                .iter()
                .filter(|c| container_matches(&request.container_filter, c.as_str()))
                .cloned()
                .collect();
            for container in containers {
                let Some(items) = self.bundle_texts.get(&container) else {
                    continue;
                };
                let batch: Vec<CharacterText> =
                    items.iter().filter(|t| text_matches(t, request)).cloned().collect();
                if batch.is_empty() {
                    continue;
                }
                for text in &batch {
                    provenance.record(&container, &text.name);
                }
                found = true;
                on_batch(batch);
            }
        }

        found
    }
}
