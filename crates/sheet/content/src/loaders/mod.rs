//! Content loaders for reading sheet data from files.
//!
//! Settings come from TOML, attribute definitions and characters from RON.

pub mod attributes;
pub mod character;
pub mod config;
pub mod factory;

pub use attributes::{AttributeCatalog, AttributeDefsLoader};
pub use character::CharacterLoader;
pub use config::ConfigLoader;
pub use factory::ContentFactory;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
