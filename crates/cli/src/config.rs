//! CLI configuration.
use std::env;
use std::path::PathBuf;

/// Options read from the environment.
#[derive(Clone, Debug)]
pub struct CliConfig {
    /// Directory holding `settings.toml`, `attributes.ron`, and `characters/`.
    pub data_dir: PathBuf,
    /// Character to print; every character in the data directory when unset.
    pub character: Option<String>,
    /// Include tooltip lines (bonus sources) under skills and spells.
    pub show_tooltips: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            character: None,
            show_tooltips: false,
        }
    }
}

impl CliConfig {
    /// Construct CLI configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SHEET_DATA_DIR` - Data directory (default: `data`)
    /// - `SHEET_CHARACTER` - Character file name without extension
    /// - `SHEET_TOOLTIPS` - `true` to print bonus breakdowns (default: false)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("SHEET_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        config.character = env::var("SHEET_CHARACTER")
            .ok()
            .filter(|name| !name.trim().is_empty());
        if let Some(show) = read_env::<bool>("SHEET_TOOLTIPS") {
            config.show_tooltips = show;
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
