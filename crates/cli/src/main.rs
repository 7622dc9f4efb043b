//! Command-line entry point: resolves characters from a data directory and
//! prints their sheets.
mod config;
mod report;

use anyhow::Result;
use config::CliConfig;
use sheet_content::ContentFactory;
use sheet_core::Entity;
use tracing::info;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = CliConfig::from_env();
    let factory = ContentFactory::new(&config.data_dir);
    let settings = factory.load_settings()?;

    let names = match &config.character {
        Some(name) => vec![name.clone()],
        None => factory.character_names()?,
    };
    if names.is_empty() {
        info!(data_dir = %config.data_dir.display(), "no characters found");
        return Ok(());
    }

    for (i, name) in names.iter().enumerate() {
        let data = factory.load_character(name)?;
        let entity = Entity::new(data, settings.clone());
        if i > 0 {
            println!();
        }
        print!("{}", report::render(&entity, &config));
    }
    Ok(())
}
