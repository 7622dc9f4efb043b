//! Sheet settings loader.

use std::path::Path;

use sheet_core::SheetSettings;

use crate::loaders::{LoadResult, read_file};

/// Loader for sheet settings from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from a TOML file.
    ///
    /// Missing keys keep their defaults, so an empty file yields
    /// [`SheetSettings::default`].
    pub fn load(path: &Path) -> LoadResult<SheetSettings> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse settings TOML at {}: {}", path.display(), e))
    }

    /// Parse settings from TOML text.
    pub fn parse(content: &str) -> LoadResult<SheetSettings> {
        let settings: SheetSettings = toml::from_str(content)?;
        if settings.max_recalc_iterations == 0 {
            anyhow::bail!("max_recalc_iterations must be at least 1");
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheet_core::{DamageProgression, WeightUnits};

    #[test]
    fn empty_settings_are_the_defaults() {
        let settings = ConfigLoader::parse("").unwrap();
        assert_eq!(settings, SheetSettings::default());
    }

    #[test]
    fn settings_override_selected_keys() {
        let settings = ConfigLoader::parse(
            r#"
damage_progression = "knowing_your_own_strength"
default_weight_units = "kg"
use_half_stat_defaults = true
max_recalc_iterations = 8
"#,
        )
        .unwrap();
        assert_eq!(
            settings.damage_progression,
            DamageProgression::KnowingYourOwnStrength
        );
        assert_eq!(settings.default_weight_units, WeightUnits::Kilogram);
        assert!(settings.use_half_stat_defaults);
        assert!(!settings.round_cost_down);
        assert_eq!(settings.max_recalc_iterations, 8);
        assert_eq!(settings.attributes, SheetSettings::default().attributes);
    }

    #[test]
    fn zero_iteration_cap_is_rejected() {
        assert!(ConfigLoader::parse("max_recalc_iterations = 0").is_err());
    }
}
