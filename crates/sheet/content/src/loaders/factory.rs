//! Content factory for resolving sheet data from a data directory.

use std::path::{Path, PathBuf};

use sheet_core::{EntityData, SheetSettings};
use tracing::debug;

use crate::loaders::{AttributeDefsLoader, CharacterLoader, ConfigLoader, LoadResult};

/// Content factory that loads sheet content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── settings.toml
/// ├── attributes.ron
/// └── characters/
///     ├── ilsa.ron
///     └── borin.ron
/// ```
///
/// Both `settings.toml` and `attributes.ron` are optional; without them the
/// standard settings and attribute set apply.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load sheet settings from `settings.toml`, with the attribute set from
    /// `attributes.ron` when present.
    pub fn load_settings(&self) -> LoadResult<SheetSettings> {
        let path = self.data_dir.join("settings.toml");
        let mut settings = if path.exists() {
            ConfigLoader::load(&path)?
        } else {
            debug!(path = %path.display(), "no settings file, using defaults");
            SheetSettings::default()
        };

        let attributes = self.data_dir.join("attributes.ron");
        if attributes.exists() {
            settings.attributes = AttributeDefsLoader::load(&attributes)?;
        }
        Ok(settings)
    }

    /// Load a character from `characters/{name}.ron`.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the character file (without `.ron` extension)
    pub fn load_character(&self, name: &str) -> LoadResult<EntityData> {
        CharacterLoader::load(&self.character_path(name))
    }

    /// Write a character to `characters/{name}.ron`.
    pub fn save_character(&self, name: &str, data: &EntityData) -> LoadResult<()> {
        let dir = self.data_dir.join("characters");
        std::fs::create_dir_all(&dir)
            .map_err(|e| anyhow::anyhow!("Failed to create directory {}: {}", dir.display(), e))?;
        CharacterLoader::save(&self.character_path(name), data)
    }

    /// Names of every character file, sorted.
    pub fn character_names(&self) -> LoadResult<Vec<String>> {
        let dir = self.data_dir.join("characters");
        let entries = std::fs::read_dir(&dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;
        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "ron")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                names.push(stem.to_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn character_path(&self, name: &str) -> PathBuf {
        self.data_dir.join("characters").join(format!("{}.ron", name))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheet_core::{DamageProgression, Entity, Fixed};
    use tempfile::TempDir;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
        assert_eq!(
            factory.character_path("ilsa"),
            Path::new("/tmp/data/characters/ilsa.ron")
        );
    }

    #[test]
    fn empty_directory_gives_default_settings() {
        let dir = TempDir::new().unwrap();
        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_settings().unwrap(), SheetSettings::default());
    }

    #[test]
    fn attribute_file_replaces_the_standard_set() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("settings.toml"),
            "damage_progression = \"reduced_swing\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("attributes.ron"),
            r#"(attributes: [(id: "st", name: "ST", base: "10", cost_per_point: 10)])"#,
        )
        .unwrap();

        let settings = ContentFactory::new(dir.path()).load_settings().unwrap();
        assert_eq!(settings.damage_progression, DamageProgression::ReducedSwing);
        assert_eq!(settings.attributes.len(), 1);
        assert!(settings.attributes.get("dx").is_none());
    }

    #[test]
    fn characters_resolve_under_loaded_settings() {
        let dir = TempDir::new().unwrap();
        let factory = ContentFactory::new(dir.path());
        let mut data = EntityData::default();
        data.profile.name = "Borin".into();
        factory.save_character("borin", &data).unwrap();
        std::fs::write(dir.path().join("characters").join("notes.txt"), "ignored").unwrap();

        assert_eq!(factory.character_names().unwrap(), ["borin"]);
        let loaded = factory.load_character("borin").unwrap();
        let entity = Entity::new(loaded, factory.load_settings().unwrap());
        assert_eq!(entity.profile.name, "Borin");
        assert_eq!(entity.attribute_current("st"), Some(Fixed::from(10)));
        assert!(factory.load_character("nobody").is_err());
    }
}
