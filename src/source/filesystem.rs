//! Directory-backed recipe source

use super::{container_matches, recipe_matches, split_scope_list, text_matches};
use super::{DiscoverRequest, ProvenanceMap, RecipeSource};
use crate::error::Result;
use crate::recipe::{CharacterText, Recipe};
use crate::types::ContainerName;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding unpacked asset packages, one subdirectory per container
const BUNDLES_DIR: &str = "bundles";

/// Directory-backed recipe source
///
/// `<root>/<scope>/` holds local resource files and `<root>/bundles/<container>/`
/// holds the contents of unpacked asset packages. Recipe assets are JSON
/// files; character definitions are plain `.txt` files named after the
/// character. Files that fail to read or parse are logged and skipped so one
/// bad file cannot poison a discovery pass.
#[derive(Debug)]
pub struct FileSystemSource {
    root: PathBuf,
}

impl FileSystemSource {
    /// Source rooted at `root`; missing folders simply yield nothing
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Root directory this source scans
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load a single recipe file
    pub fn load_recipe_file(path: &Path) -> Result<Recipe> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn files_with_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = match fs::read_dir(dir) {
            Ok(entries) => entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(extension))
                .collect(),
            // an absent scope or container directory is not an error
            Err(_) => Vec::new(),
        };
        files.sort();
        files
    }

    fn collect_recipes(dir: &Path, request: &DiscoverRequest) -> Vec<Recipe> {
        let mut out = Vec::new();
        for path in Self::files_with_extension(dir, "json") {
            match Self::load_recipe_file(&path) {
                Ok(recipe) => {
                    if recipe_matches(&recipe, request) {
                        out.push(recipe);
                    }
                }
                Err(e) => log::warn!("Skipping recipe file {}: {}", path.display(), e),
            }
        }
        out
    }

    fn collect_texts(dir: &Path, request: &DiscoverRequest) -> Vec<CharacterText> {
        let mut out = Vec::new();
        for path in Self::files_with_extension(dir, "txt") {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match fs::read_to_string(&path) {
                Ok(text) => {
                    let entry = CharacterText::new(name.to_string(), text);
                    if text_matches(&entry, request) {
                        out.push(entry);
                    }
                }
                Err(e) => log::warn!("Skipping character file {}: {}", path.display(), e),
            }
        }
        out
    }

    /// Unpacked container directories passing `filter`, sorted by name
    fn bundle_dirs(&self, filter: &str) -> Vec<(ContainerName, PathBuf)> {
        let mut dirs: Vec<(ContainerName, PathBuf)> = match fs::read_dir(self.root.join(BUNDLES_DIR)) {
            Ok(entries) => entries
                .flatten()
                .filter(|e| e.path().is_dir())
                .filter_map(|e| {
                    let name = e.file_name().to_str()?.to_string();
                    Some((name, e.path()))
                })
                .collect(),
            Err(_) => Vec::new(),
        };
        dirs.retain(|(name, _)| container_matches(filter, name));
        dirs.sort();
        dirs
    }
}

impl RecipeSource for FileSystemSource {
    fn is_ready(&self) -> bool {
        // everything this source can ever serve is already on disk
        true
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
                let batch = Self::collect_recipes(&self.root.join(scope), request);
                if !batch.is_empty() {
                    found = true;
                    on_batch(batch);
                }
            }
        }

        if request.use_bundles {
            for (container, dir) in self.bundle_dirs(&request.container_filter) {
                let batch = Self::collect_recipes(&dir, request);
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
                let batch = Self::collect_texts(&self.root.join(scope), request);
                if !batch.is_empty() {
                    found = true;
                    on_batch(batch);
                }
            }
        }

        if request.use_bundles {
            for (container, dir) in self.bundle_dirs(&request.container_filter) {
                let batch = Self::collect_texts(&dir, request);
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        fs::create_dir_all(dir).unwrap();
        let mut file = fs::File::create(dir.join(name)).unwrap();
        write!(file, "{}", contents).unwrap();
    }

    fn recipe_json(name: &str, slot: &str) -> String {
        format!(
            r#"{{"name": "{}", "wardrobe_slot": "{}", "compatible_races": ["Human"]}}"#,
            name, slot
        )
    }

    #[test]
    fn test_scans_local_scope_and_bundles() {
        let dir = TempDir::new().unwrap();
        write_file(&dir.path().join("Recipes"), "hat1.json", &recipe_json("Hat1", "Head"));
        write_file(
            &dir.path().join("bundles").join("pack_a"),
            "boots1.json",
            &recipe_json("Boots1", "Feet"),
        );

        let mut source = FileSystemSource::new(dir.path().to_path_buf());
        let request = DiscoverRequest {
            default_scope: "Recipes".to_string(),
            ..DiscoverRequest::default()
        };
        let mut provenance = ProvenanceMap::new();
        let mut all = Vec::new();
        let found = source.discover_recipes(&request, &mut provenance, &mut |batch| all.extend(batch));

        assert!(found);
        assert_eq!(all.len(), 2);
        assert_eq!(provenance.first_container_of("Boots1"), Some("pack_a"));
        // local resources are not a container
        assert_eq!(provenance.first_container_of("Hat1"), None);
    }

    #[test]
    fn test_malformed_recipe_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let scope = dir.path().join("Recipes");
        write_file(&scope, "good.json", &recipe_json("Hat1", "Head"));
        write_file(&scope, "bad.json", "{ not json");

        let mut source = FileSystemSource::new(dir.path().to_path_buf());
        let request = DiscoverRequest {
            default_scope: "Recipes".to_string(),
            use_bundles: false,
            ..DiscoverRequest::default()
        };
        let mut provenance = ProvenanceMap::new();
        let mut all = Vec::new();
        let found = source.discover_recipes(&request, &mut provenance, &mut |batch| all.extend(batch));

        assert!(found);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Hat1");
    }

    #[test]
    fn test_character_texts_named_after_files() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir.path().join("CharacterRecipes"),
            "Bob.txt",
            "bob definition",
        );

        let mut source = FileSystemSource::new(dir.path().to_path_buf());
        let request = DiscoverRequest {
            default_scope: "CharacterRecipes".to_string(),
            use_bundles: false,
            ..DiscoverRequest::default()
        };
        let mut provenance = ProvenanceMap::new();
        let mut all = Vec::new();
        let found =
            source.discover_character_texts(&request, &mut provenance, &mut |batch| all.extend(batch));

        assert!(found);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Bob");
        assert_eq!(all[0].text, "bob definition");
    }

    #[test]
    fn test_missing_directories_yield_nothing() {
        let dir = TempDir::new().unwrap();
        let mut source = FileSystemSource::new(dir.path().to_path_buf());
        let request = DiscoverRequest {
            default_scope: "Recipes".to_string(),
            ..DiscoverRequest::default()
        };
        let mut provenance = ProvenanceMap::new();
        let mut batches = 0;
        let found = source.discover_recipes(&request, &mut provenance, &mut |_| batches += 1);

        assert!(!found);
        assert_eq!(batches, 0);
        assert!(provenance.is_empty());
    }

    #[test]
    fn test_bundle_container_filter() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir.path().join("bundles").join("pack_a"),
            "hat1.json",
            &recipe_json("Hat1", "Head"),
        );
        write_file(
            &dir.path().join("bundles").join("pack_b"),
            "boots1.json",
            &recipe_json("Boots1", "Feet"),
        );

        let mut source = FileSystemSource::new(dir.path().to_path_buf());
        let request = DiscoverRequest {
            container_filter: "pack_a".to_string(),
            use_local: false,
            ..DiscoverRequest::default()
        };
        let mut provenance = ProvenanceMap::new();
        let mut all = Vec::new();
        source.discover_recipes(&request, &mut provenance, &mut |batch| all.extend(batch));

        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Hat1");
    }
}
