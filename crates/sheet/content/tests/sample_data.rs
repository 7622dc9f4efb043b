//! The data directory shipped with the workspace loads and resolves.

use std::path::PathBuf;

use sheet_content::ContentFactory;
use sheet_core::node;
use sheet_core::{Entity, Fixed, SheetSettings};

fn sample_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../../data")
}

#[test]
fn sample_character_resolves() {
    let factory = ContentFactory::new(sample_dir());
    let settings = factory.load_settings().unwrap();
    assert_eq!(settings, SheetSettings::default());

    assert!(factory.character_names().unwrap().contains(&"ilsa".to_owned()));
    let entity = Entity::new(factory.load_character("ilsa").unwrap(), settings);

    assert_eq!(entity.profile.name, "Ilsa Varn");
    assert_eq!(entity.attribute_current("dx"), Some(Fixed::from(12)));
    assert_eq!(entity.attribute_current("hp"), Some(Fixed::from(8)));

    let climbing = node::leaves(&entity.skills)
        .find(|skill| skill.name == "Climbing")
        .unwrap();
    assert_eq!(climbing.level.level, Some(Fixed::from(12)));
    assert!(entity.unspent_points() < entity.total_points);
}
