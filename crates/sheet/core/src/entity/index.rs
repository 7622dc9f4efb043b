//! Id → item lookup rebuilt at the start of every recalculation.

use std::collections::BTreeMap;

use crate::equipment::Equipment;
use crate::node::{self, ItemId, Node};
use crate::skill::Skill;
use crate::spell::Spell;
use crate::traits::Trait;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ItemKind {
    Trait,
    Skill,
    Spell,
    Equipment,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedItem {
    pub kind: ItemKind,
    pub name: String,
}

#[derive(Clone, Debug, Default)]
pub struct ItemIndex {
    items: BTreeMap<ItemId, IndexedItem>,
}

impl ItemIndex {
    pub fn build(
        traits: &[Trait],
        skills: &[Skill],
        spells: &[Spell],
        equipment: [&[Equipment]; 2],
    ) -> Self {
        let mut index = Self::default();
        index.extend(traits, ItemKind::Trait, |t| t.name.clone());
        index.extend(skills, ItemKind::Skill, Skill::display_name);
        index.extend(spells, ItemKind::Spell, Spell::display_name);
        for list in equipment {
            index.extend(list, ItemKind::Equipment, |e| e.name.clone());
        }
        index
    }

    fn extend<T: Node>(&mut self, roots: &[T], kind: ItemKind, name: impl Fn(&T) -> String) {
        for item in node::walk(roots) {
            let entry = IndexedItem {
                kind,
                name: name(item),
            };
            if let Some(previous) = self.items.insert(item.id(), entry) {
                tracing::warn!(
                    id = %item.id(),
                    previous = %previous.name,
                    "duplicate item id; owner names and exclusions may be wrong"
                );
            }
        }
    }

    pub fn get(&self, id: ItemId) -> Option<&IndexedItem> {
        self.items.get(&id)
    }

    /// Display name of an item, or an empty string.
    pub fn name(&self, id: ItemId) -> &str {
        self.items.get(&id).map_or("", |item| item.name.as_str())
    }

    /// Description such as `trait Magery`.
    pub fn describe(&self, id: ItemId) -> Option<String> {
        self.items
            .get(&id)
            .map(|item| format!("{} {}", item.kind, item.name))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
