//! The character system: lifecycle, indexing engine, and query surface

use crate::category::CategoryProvider;
use crate::index::{CategoryIndex, RecipeRegistry};
use crate::recipe::{CharacterText, Recipe, RecipeKind};
use crate::source::{DiscoverRequest, ProvenanceMap, RecipeSource};
use crate::types::RecipeName;

/// Tunables for a [`CharacterSystem`]
#[derive(Debug, Clone)]
pub struct SystemConfig {
    /// Scan local bundled resources during discovery
    pub add_from_local: bool,
    /// Scan downloaded containers during discovery
    pub add_from_bundles: bool,
    /// Local folder scope(s) searched for character definitions (comma separated)
    pub local_characters_scope: String,
    /// Local folder scope(s) searched for recipes (comma separated)
    pub local_recipes_scope: String,
    /// Container(s) searched for character definitions (comma separated, empty = all)
    pub character_containers: String,
    /// Container(s) searched for recipes (comma separated, empty = all)
    pub recipe_containers: String,
    /// Index every recipe from every downloaded container on refresh
    pub add_all_from_downloaded_bundles: bool,
    /// Permit remote fetching once the source is ready
    pub download_enabled: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            add_from_local: true,
            add_from_bundles: true,
            local_characters_scope: "CharacterRecipes".to_string(),
            local_recipes_scope: "Recipes".to_string(),
            character_containers: String::new(),
            recipe_containers: String::new(),
            add_all_from_downloaded_bundles: true,
            download_enabled: true,
        }
    }
}

/// Runtime recipe index for a character-customization system
///
/// Owns the recipe registry, the race/slot index, and the provenance map,
/// and orchestrates discovery through the injected category provider and
/// recipe source. All mutation happens on the caller's thread through
/// synchronous discovery callbacks; `is_initializing` is the only
/// re-entrancy guard.
pub struct CharacterSystem<P, S> {
    config: SystemConfig,
    provider: P,
    source: S,
    registry: RecipeRegistry,
    index: CategoryIndex,
    provenance: ProvenanceMap,
    initialized: bool,
    is_initializing: bool,
}

impl<P: CategoryProvider, S: RecipeSource> CharacterSystem<P, S> {
    /// Create a system with the default configuration
    pub fn new(provider: P, source: S) -> Self {
        Self::with_config(SystemConfig::default(), provider, source)
    }

    /// Create a system with a custom configuration
    pub fn with_config(config: SystemConfig, provider: P, source: S) -> Self {
        Self {
            config,
            provider,
            source,
            registry: RecipeRegistry::new(),
            index: CategoryIndex::new(),
            provenance: ProvenanceMap::new(),
            initialized: false,
            is_initializing: false,
        }
    }

    /// One-time initialization: seed race keys from the provider and run a
    /// full discovery pass
    ///
    /// No-op when already initialized or while an earlier `init` is still
    /// running, so a re-entrant call from a discovery callback cannot clear
    /// the index mid-scan.
    pub fn init(&mut self) {
        if self.initialized || self.is_initializing {
            return;
        }
        self.is_initializing = true;
        self.index.clear();

        let placeholder = self.provider.placeholder_name().to_string();
        // a known race may not be downloaded yet, so entries can be None
        for category in self.provider.all_categories().into_iter().flatten() {
            if category.name == placeholder {
                continue;
            }
            self.index.ensure_race(&category.name);
        }

        self.gather_character_texts("", "");
        self.gather_recipes("", "");

        self.initialized = true;
        self.is_initializing = false;
        log::info!(
            "Character system initialized: {} races, {} recipes",
            self.index.race_count(),
            self.registry.len()
        );
    }

    /// Guarantee a race key exists in the index, for adding recipes before
    /// the race data itself has been downloaded
    pub fn ensure_race_key(&mut self, race: &str) {
        self.index.ensure_race(race);
    }

    /// Re-seed race keys from the provider's base catalog and make
    /// previously indexed recipes visible under any newly added race
    pub fn refresh_race_keys(&mut self) {
        if !self.initialized {
            self.init();
            return;
        }
        if self.config.add_all_from_downloaded_bundles {
            self.refresh(false, "");
            return;
        }

        let placeholder = self.provider.placeholder_name().to_string();
        for category in self.provider.all_base_categories().into_iter().flatten() {
            if category.name == placeholder || self.index.contains_race(&category.name) {
                continue;
            }
            self.index.ensure_race(&category.name);

            // re-run the fan-out for everything indexed elsewhere so
            // compatible recipes attach to the new race
            let race_keys: Vec<String> =
                self.index.races().iter().map(|r| r.to_string()).collect();
            let mut carried: Vec<Recipe> = Vec::new();
            for race in race_keys {
                if race != category.name {
                    carried.extend(self.index.recipes_for_race(&race));
                }
            }
            self.add_recipes(&carried, "");
        }
    }

    /// Re-scan sources and merge results into the index without discarding
    /// unaffected entries
    ///
    /// With `force_provider_rescan` the provider's ready catalog is polled:
    /// answering may surface new races (and newly gathered recipes may
    /// reference more), so the pass repeats until the race key set stops
    /// growing. Without it, missing base races are seeded and discovery runs
    /// scoped to `container_filter` (empty = unrestricted).
    pub fn refresh(&mut self, force_provider_rescan: bool, container_filter: &str) {
        if !self.initialized {
            self.init();
            return;
        }

        if force_provider_rescan {
            let placeholder = self.provider.placeholder_name().to_string();
            loop {
                let before = self.index.race_count();
                for category in self.provider.all_categories().into_iter().flatten() {
                    if category.name != placeholder {
                        self.index.ensure_race(&category.name);
                    }
                }
                self.refresh_from_base(container_filter);
                if self.index.race_count() == before {
                    break;
                }
                log::debug!("Refresh grew the race key set, repeating");
            }
            return;
        }

        self.refresh_from_base(container_filter);
    }

    fn refresh_from_base(&mut self, container_filter: &str) {
        let placeholder = self.provider.placeholder_name().to_string();
        // base entries may not be downloaded yet
        for category in self.provider.all_base_categories().into_iter().flatten() {
            if category.name != placeholder {
                self.index.ensure_race(&category.name);
            }
        }
        self.gather_character_texts("", container_filter);
        self.gather_recipes("", container_filter);
    }

    /// Index a batch of recipes
    ///
    /// With a non-empty `name_filter` only the recipe whose name matches the
    /// trimmed filter is admitted; everything else in the batch is skipped.
    /// Safe to call repeatedly with the same recipe: the registry and every
    /// (race, slot) list it qualifies for hold exactly one entry under its
    /// name.
    pub fn add_recipes(&mut self, recipes: &[Recipe], name_filter: &str) {
        for recipe in recipes {
            if !name_filter.is_empty() && name_filter.trim() != recipe.name {
                continue;
            }
            self.registry.upsert(recipe.clone());

            let slot = recipe.effective_slot().to_string();
            if recipe.is_collection() {
                log::debug!("{} is a wardrobe collection, indexing under {}", recipe.name, slot);
            }

            for race in &recipe.compatible_races {
                // compatibility is recorded even for races that have not
                // been downloaded yet
                self.index.ensure_race(race);
                self.index.upsert(race, &slot, recipe);
                self.fan_out_backwards(race, &slot, recipe);
            }
        }
    }

    /// Index a single recipe
    pub fn add_recipe(&mut self, recipe: &Recipe) {
        self.add_recipes(std::slice::from_ref(recipe), "");
    }

    /// Discovery-callback entry point: index a whole batch unfiltered
    pub fn add_recipes_from_source(&mut self, recipes: &[Recipe]) {
        self.add_recipes(recipes, "");
    }

    /// Attach `recipe` to every indexed race that declares itself
    /// backwards-compatible with `compatible_race` and recognizes `slot`
    fn fan_out_backwards(&mut self, compatible_race: &str, slot: &str, recipe: &Recipe) {
        let race_keys: Vec<String> = self.index.races().iter().map(|r| r.to_string()).collect();
        for key in race_keys {
            if key == compatible_race {
                continue;
            }
            // descriptor lookup must not trigger a download; the race may
            // simply not be here yet
            let Some(descriptor) = self.provider.category(&key, false) else {
                continue;
            };
            if descriptor.is_backwards_compatible_with(compatible_race)
                && descriptor.recognizes_slot(slot)
            {
                self.index.upsert(&key, slot, recipe);
            }
        }
    }

    fn gather_character_texts(&mut self, name_filter: &str, container_filter: &str) {
        let request = self.build_request(
            container_filter,
            self.config.character_containers.clone(),
            self.config.local_characters_scope.clone(),
            None,
            name_filter,
        );

        let mut batches: Vec<Vec<CharacterText>> = Vec::new();
        self.source
            .discover_character_texts(&request, &mut self.provenance, &mut |batch| {
                batches.push(batch)
            });
        for batch in batches {
            for text in batch {
                self.registry.upsert_character_text(text);
            }
        }
    }

    fn gather_recipes(&mut self, name_filter: &str, container_filter: &str) {
        let mut request = self.build_request(
            container_filter,
            self.config.recipe_containers.clone(),
            self.config.local_recipes_scope.clone(),
            Some(RecipeKind::Standard),
            name_filter,
        );

        let found = self.run_recipe_discovery(&request);
        // a requested name might be a collection rather than a plain recipe
        if !found || !name_filter.is_empty() {
            request.kind_filter = Some(RecipeKind::Collection);
            self.run_recipe_discovery(&request);
        }
    }

    fn run_recipe_discovery(&mut self, request: &DiscoverRequest) -> bool {
        let mut batches: Vec<Vec<Recipe>> = Vec::new();
        let found = self
            .source
            .discover_recipes(request, &mut self.provenance, &mut |batch| batches.push(batch));
        for batch in batches {
            self.add_recipes_from_source(&batch);
        }
        found
    }

    fn build_request(
        &self,
        container_filter: &str,
        default_containers: String,
        default_scope: String,
        kind_filter: Option<RecipeKind>,
        name_filter: &str,
    ) -> DiscoverRequest {
        let containers = if container_filter.is_empty() {
            default_containers
        } else {
            container_filter.to_string()
        };
        DiscoverRequest {
            // a bundle-scoped query must not mix in local defaults
            use_local: if container_filter.is_empty() {
                self.config.add_from_local
            } else {
                false
            },
            use_bundles: self.config.add_from_bundles,
            // remote fetch only once the source's bundle catalog has arrived
            allow_remote_fetch: self.source.is_ready() && self.config.download_enabled,
            container_filter: containers,
            default_scope,
            kind_filter,
            name_filter: name_filter.to_string(),
        }
    }

    /// Look up a recipe by name
    ///
    /// On a miss with `dynamically_add`, runs a name-scoped discovery pass
    /// and checks again. Absence is routine, not an error.
    pub fn recipe(&mut self, name: &str, dynamically_add: bool) -> Option<&Recipe> {
        if !self.registry.contains(name) && dynamically_add {
            self.gather_recipes(name, "");
        }
        self.registry.get(name)
    }

    /// Alias for [`CharacterSystem::recipe`], kept for recipe-editor style
    /// consumers
    pub fn base_recipe(&mut self, name: &str, dynamically_add: bool) -> Option<&Recipe> {
        self.recipe(name, dynamically_add)
    }

    /// Character-definition text registered under `name`
    pub fn character_text(&self, name: &str) -> Option<&str> {
        self.registry.character_text(name)
    }

    /// Registered character names
    pub fn character_names(&self) -> Vec<&str> {
        self.registry.character_names()
    }

    /// Ordered recipe names indexed under (race, slot)
    ///
    /// Runs a full refresh first so the answer reflects everything currently
    /// discoverable; empty when either key is absent.
    pub fn recipe_names_for_race_slot(&mut self, race: &str, slot: &str) -> Vec<RecipeName> {
        self.refresh(true, "");
        self.index.names(race, slot)
    }

    /// First source container that produced `recipe_name`
    pub fn originating_container(&self, recipe_name: &str) -> Option<&str> {
        match self.provenance.first_container_of(recipe_name) {
            Some(container) => {
                log::debug!("Originating container for {} was {}", recipe_name, container);
                Some(container)
            }
            None => {
                log::debug!("{} was not found in any discovered container", recipe_name);
                None
            }
        }
    }

    /// Whether `init` has completed
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of registered recipes
    pub fn recipe_count(&self) -> usize {
        self.registry.len()
    }

    /// Race keys currently present in the index
    pub fn races(&self) -> Vec<&str> {
        self.index.races()
    }

    /// Read access to the recipe registry
    pub fn registry(&self) -> &RecipeRegistry {
        &self.registry
    }

    /// Read access to the race/slot index
    pub fn index(&self) -> &CategoryIndex {
        &self.index
    }

    /// Read access to the provenance map
    pub fn provenance(&self) -> &ProvenanceMap {
        &self.provenance
    }

    /// Current configuration
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Mutable configuration access
    pub fn config_mut(&mut self) -> &mut SystemConfig {
        &mut self.config
    }

    /// The injected category provider
    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// The injected recipe source, e.g. to feed it newly arrived containers
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{Category, StaticCategoryProvider};
    use crate::source::MemorySource;

    fn make_category(name: &str, slots: &[&str]) -> Category {
        Category::new(name.to_string(), slots.iter().map(|s| s.to_string()).collect())
    }

    fn make_recipe(name: &str, slot: &str, races: &[&str]) -> Recipe {
        Recipe::new(
            name.to_string(),
            slot.to_string(),
            races.iter().map(|r| r.to_string()).collect(),
        )
    }

    fn human_system() -> CharacterSystem<StaticCategoryProvider, MemorySource> {
        let mut provider = StaticCategoryProvider::new();
        provider.add_category(make_category("Human", &["Head", "Feet"]));
        CharacterSystem::new(provider, MemorySource::new())
    }

    #[test]
    fn test_init_seeds_known_races() {
        let mut system = human_system();
        system.init();

        assert!(system.is_initialized());
        assert!(system.index().contains_race("Human"));
    }

    #[test]
    fn test_init_skips_placeholder_and_pending() {
        let mut provider = StaticCategoryProvider::new();
        provider.add_category(make_category("Human", &["Head"]));
        provider.add_category(make_category("RacePlaceholder", &[]));
        provider.add_pending("Elf".to_string());

        let mut system = CharacterSystem::new(provider, MemorySource::new());
        system.init();

        assert!(system.index().contains_race("Human"));
        assert!(!system.index().contains_race("RacePlaceholder"));
        assert!(!system.index().contains_race("Elf"));
    }

    #[test]
    fn test_init_guard_blocks_reentry() {
        let mut system = human_system();
        system.is_initializing = true;

        // a nested call while seeding must not clear or reseed anything
        system.init();
        assert!(!system.is_initialized());
        assert_eq!(system.index().race_count(), 0);

        system.is_initializing = false;
        system.init();
        assert!(system.is_initialized());
    }

    #[test]
    fn test_init_twice_does_not_reseed() {
        let mut system = human_system();
        system.init();
        system.ensure_race_key("Custom");

        system.init();
        assert!(system.index().contains_race("Custom"));
    }

    #[test]
    fn test_idempotent_upsert() {
        let mut system = human_system();
        system.init();

        let recipe = make_recipe("Hat1", "Head", &["Human"]);
        system.add_recipe(&recipe);
        system.add_recipe(&recipe);

        let updated = recipe.clone().with_payload("v2".to_string());
        system.add_recipe(&updated);

        assert_eq!(system.recipe_count(), 1);
        let indexed = system.index().recipes("Human", "Head").unwrap();
        assert_eq!(indexed.len(), 1);
        assert_eq!(indexed[0].payload, "v2");
    }

    #[test]
    fn test_fan_out_across_declared_races() {
        let mut provider = StaticCategoryProvider::new();
        provider.add_category(make_category("Human", &["Head"]));
        provider.add_category(make_category("Elf", &["Head"]));
        let mut system = CharacterSystem::new(provider, MemorySource::new());
        system.init();

        system.add_recipe(&make_recipe("Hat1", "Head", &["Human", "Elf"]));

        assert_eq!(system.index().names("Human", "Head"), vec!["Hat1".to_string()]);
        assert_eq!(system.index().names("Elf", "Head"), vec!["Hat1".to_string()]);
    }

    #[test]
    fn test_undeclared_race_key_created_on_demand() {
        let mut system = human_system();
        system.init();

        // Orc is not known to the provider at all, but compatibility must be
        // recorded for when it arrives
        system.add_recipe(&make_recipe("Axe1", "Head", &["Orc"]));

        assert!(system.index().contains_race("Orc"));
        assert_eq!(system.index().names("Orc", "Head"), vec!["Axe1".to_string()]);
    }

    #[test]
    fn test_backwards_compatibility_propagation() {
        let mut provider = StaticCategoryProvider::new();
        provider.add_category(make_category("Human", &["Head"]));
        provider.add_category(
            make_category("Elf", &["Head"]).with_backwards_compatibility(vec!["Human".to_string()]),
        );
        let mut system = CharacterSystem::new(provider, MemorySource::new());
        system.init();

        system.add_recipe(&make_recipe("Hat1", "Head", &["Human"]));

        assert_eq!(system.index().names("Elf", "Head"), vec!["Hat1".to_string()]);
    }

    #[test]
    fn test_backwards_compatibility_requires_slot_support() {
        let mut provider = StaticCategoryProvider::new();
        provider.add_category(make_category("Human", &["Head", "Feet"]));
        provider.add_category(
            // Elf accepts Human recipes but has no Feet slot
            make_category("Elf", &["Head"]).with_backwards_compatibility(vec!["Human".to_string()]),
        );
        let mut system = CharacterSystem::new(provider, MemorySource::new());
        system.init();

        system.add_recipe(&make_recipe("Boots1", "Feet", &["Human"]));

        assert!(system.index().names("Elf", "Feet").is_empty());
        assert_eq!(system.index().names("Human", "Feet"), vec!["Boots1".to_string()]);
    }

    #[test]
    fn test_fan_out_skips_races_without_metadata() {
        let mut provider = StaticCategoryProvider::new();
        provider.add_category(make_category("Human", &["Head"]));
        let mut system = CharacterSystem::new(provider, MemorySource::new());
        system.init();
        system.ensure_race_key("Undownloaded");

        // no descriptor for Undownloaded: skipped silently, never an error
        system.add_recipe(&make_recipe("Hat1", "Head", &["Human"]));

        assert!(system.index().names("Undownloaded", "Head").is_empty());
    }

    #[test]
    fn test_collection_indexed_under_synthetic_slot() {
        let mut system = human_system();
        system.init();

        let mut outfit = Recipe::collection("Outfit1".to_string(), vec!["Human".to_string()]);
        outfit.wardrobe_slot = "Head".to_string();
        system.add_recipe(&outfit);

        assert_eq!(
            system.index().names("Human", crate::types::COLLECTION_SLOT),
            vec!["Outfit1".to_string()]
        );
        assert!(system.index().names("Human", "Head").is_empty());
    }

    #[test]
    fn test_name_filtered_batch_insert() {
        let mut system = human_system();
        system.init();

        let batch = vec![
            make_recipe("Hat1", "Head", &["Human"]),
            make_recipe("Boots1", "Feet", &["Human"]),
        ];
        system.add_recipes(&batch, "Hat1");

        assert!(system.registry().contains("Hat1"));
        assert!(!system.registry().contains("Boots1"));
    }

    #[test]
    fn test_name_filter_is_trimmed() {
        let mut system = human_system();
        system.init();

        system.add_recipes(&[make_recipe("Hat1", "Head", &["Human"])], " Hat1 ");
        assert!(system.registry().contains("Hat1"));
    }

    #[test]
    fn test_recipe_names_for_race_slot_scenario() {
        let mut system = human_system();
        system.init();
        system.add_recipe(&make_recipe("Hat1", "Head", &["Human"]));

        assert_eq!(
            system.recipe_names_for_race_slot("Human", "Head"),
            vec!["Hat1".to_string()]
        );
        assert!(system.recipe_names_for_race_slot("Human", "Hands").is_empty());
        assert!(system.recipe_names_for_race_slot("Dwarf", "Head").is_empty());
    }

    #[test]
    fn test_refresh_race_keys_attaches_existing_recipes() {
        let mut provider = StaticCategoryProvider::new();
        provider.add_category(make_category("Human", &["Head"]));
        let mut source = MemorySource::new();
        source.add_bundle_recipe("pack_a", make_recipe("Hat1", "Head", &["Human"]));

        let mut config = SystemConfig::default();
        config.add_all_from_downloaded_bundles = false;
        let mut system = CharacterSystem::with_config(config, provider, source);
        system.init();
        assert_eq!(system.index().names("Human", "Head"), vec!["Hat1".to_string()]);

        // Elf arrives later, backwards compatible with Human
        system.provider.add_category(
            make_category("Elf", &["Head"]).with_backwards_compatibility(vec!["Human".to_string()]),
        );
        system.refresh_race_keys();

        assert_eq!(system.index().names("Elf", "Head"), vec!["Hat1".to_string()]);
    }

    #[test]
    fn test_uninitialized_refresh_delegates_to_init() {
        let mut system = human_system();
        system.refresh(true, "");

        assert!(system.is_initialized());
        assert!(system.index().contains_race("Human"));
    }
}
