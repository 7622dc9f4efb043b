//! Character loader.

use std::path::Path;

use sheet_core::EntityData;
use tracing::debug;

use crate::loaders::{LoadResult, read_file};

/// Loader for characters from RON files.
///
/// A character file holds the authored [`EntityData`]; anything computed
/// (levels, bonuses, unsatisfied reasons) is rebuilt on recalculation.
pub struct CharacterLoader;

impl CharacterLoader {
    /// Load a character from a RON file.
    pub fn load(path: &Path) -> LoadResult<EntityData> {
        let content = read_file(path)?;
        let data = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse character RON at {}: {}", path.display(), e))?;
        debug!(
            path = %path.display(),
            name = %data.profile.name,
            traits = data.traits.len(),
            skills = data.skills.len(),
            spells = data.spells.len(),
            "loaded character"
        );
        Ok(data)
    }

    /// Parse a character from RON text.
    pub fn parse(content: &str) -> LoadResult<EntityData> {
        Ok(ron::from_str(content)?)
    }

    /// Write a character as pretty-printed RON.
    pub fn save(path: &Path, data: &EntityData) -> LoadResult<()> {
        let content = ron::ser::to_string_pretty(data, ron::ser::PrettyConfig::default())
            .map_err(|e| anyhow::anyhow!("Failed to serialize character: {}", e))?;
        std::fs::write(path, content)
            .map_err(|e| anyhow::anyhow!("Failed to write file {}: {}", path.display(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheet_core::{Difficulty, Fixed, Trait};

    const ILSA: &str = r#"(
    profile: (name: "Ilsa", tech_level: "8"),
    total_points: 150,
    attributes: {
        "st": (attr_id: "st", adjustment: 1),
        "hp": (attr_id: "hp", damage: 4),
    },
    traits: [
        (name: "Fit", base_points: 5),
        (name: "Acute Vision", points_per_level: 2, levels: 3),
    ],
    skills: [
        (name: "Climbing", difficulty: (attribute: "dx", difficulty: average), points: 2),
    ],
    carried_equipment: [
        (name: "Backpack", quantity: 1, weight: "3 lb", equipped: true),
    ],
)"#;

    #[test]
    fn parses_a_character() {
        let data = CharacterLoader::parse(ILSA).unwrap();
        assert_eq!(data.profile.name, "Ilsa");
        assert_eq!(data.profile.tech_level, "8");
        assert_eq!(data.total_points, Fixed::from(150));
        assert_eq!(data.traits.len(), 2);
        assert_eq!(data.traits[1].levels, Fixed::from(3));
        assert_eq!(data.skills[0].difficulty.difficulty, Difficulty::Average);
        assert_eq!(data.carried_equipment[0].name, "Backpack");
        assert!(data.spells.is_empty());
    }

    #[test]
    fn save_then_load_keeps_authored_fields() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ilsa.ron");
        let mut data = EntityData::default();
        data.profile.name = "Ilsa".into();
        data.traits.push(Trait::new("Fit", 5));

        CharacterLoader::save(&path, &data).unwrap();
        let loaded = CharacterLoader::load(&path).unwrap();
        assert_eq!(loaded.profile.name, "Ilsa");
        assert_eq!(loaded.traits[0].name, "Fit");
        assert_eq!(loaded.traits[0].id, data.traits[0].id);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = CharacterLoader::load(Path::new("/nonexistent/nobody.ron")).unwrap_err();
        assert!(err.to_string().contains("nobody.ron"));
    }
}
