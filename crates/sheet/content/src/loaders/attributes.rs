//! Attribute definition set loader.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sheet_core::{AttributeDef, AttributeDefs};
use tracing::debug;

use crate::loaders::{LoadResult, read_file};

/// Attribute definition set structure for RON files.
///
/// Definitions without an explicit `order` are displayed in file order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeCatalog {
    pub attributes: Vec<AttributeDef>,
}

impl AttributeCatalog {
    /// Validates ids and builds the definition set.
    pub fn into_defs(self) -> LoadResult<AttributeDefs> {
        let mut seen = HashSet::new();
        let mut defs = AttributeDefs::new();
        for (position, mut def) in self.attributes.into_iter().enumerate() {
            if def.id.is_empty() {
                anyhow::bail!("Attribute #{} has no id", position + 1);
            }
            if !seen.insert(def.id.clone()) {
                anyhow::bail!("Duplicate attribute id '{}'", def.id);
            }
            if def.order == 0 {
                def.order = i32::try_from(position).unwrap_or(i32::MAX);
            }
            defs.insert(def);
        }
        Ok(defs)
    }
}

/// Loader for attribute definitions from RON files.
pub struct AttributeDefsLoader;

impl AttributeDefsLoader {
    /// Load an attribute definition set from a RON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file containing an AttributeCatalog
    pub fn load(path: &Path) -> LoadResult<AttributeDefs> {
        let content = read_file(path)?;
        let defs = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load attributes RON at {}: {}", path.display(), e))?;
        debug!(path = %path.display(), count = defs.len(), "loaded attribute definitions");
        Ok(defs)
    }

    /// Parse an attribute definition set from RON text.
    pub fn parse(content: &str) -> LoadResult<AttributeDefs> {
        let catalog: AttributeCatalog = ron::from_str(content)?;
        catalog.into_defs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheet_core::{AttributeType, Fixed, ThresholdOps};

    const CUSTOM: &str = r#"(
    attributes: [
        (id: "st", name: "ST", type: integer, base: "10", cost_per_point: 10),
        (id: "sanity", name: "San", full_name: "Sanity", type: pool, base: "$st", cost_per_point: 2,
            thresholds: [
                (state: "Broken", expression: "0", ops: "HALVE_DODGE"),
                (state: "Stable", expression: "$self"),
            ]),
    ],
)"#;

    #[test]
    fn catalog_keeps_file_order() {
        let defs = AttributeDefsLoader::parse(CUSTOM).unwrap();
        let ids: Vec<&str> = defs.list().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["st", "sanity"]);

        let sanity = defs.get("sanity").unwrap();
        assert_eq!(sanity.attr_type, AttributeType::Pool);
        assert_eq!(sanity.cost_per_point, Fixed::from(2));
        assert_eq!(sanity.display_name(), "Sanity");
        assert_eq!(sanity.thresholds.len(), 2);
        assert_eq!(sanity.thresholds[0].ops, ThresholdOps::HALVE_DODGE);
        assert!(sanity.thresholds[1].ops.is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let content = r#"(attributes: [(id: "st"), (id: "st")])"#;
        let err = AttributeDefsLoader::parse(content).unwrap_err();
        assert!(err.to_string().contains("Duplicate attribute id 'st'"));
    }

    #[test]
    fn load_reports_the_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("attributes.ron");
        std::fs::write(&path, "(attributes: [(id: ").unwrap();
        let err = AttributeDefsLoader::load(&path).unwrap_err();
        assert!(err.to_string().contains("attributes.ron"));
    }
}
