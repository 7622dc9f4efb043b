//! Data-driven sheet content and loaders.
//!
//! This crate reads character sheet data files into `sheet-core` values:
//! - Sheet settings (TOML)
//! - Attribute definition sets (RON)
//! - Characters (RON)
//!
//! Loaders use sheet-core types directly with serde for RON/TOML
//! deserialization. Nothing here is versioned; files are expected to match
//! the current shape of the core types.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    AttributeCatalog, AttributeDefsLoader, CharacterLoader, ConfigLoader, ContentFactory,
    LoadResult,
};
