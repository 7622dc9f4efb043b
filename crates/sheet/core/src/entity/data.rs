//! Persistent shape of a character.

use crate::attribute::Attributes;
use crate::equipment::Equipment;
use crate::fixed::Fixed;
use crate::skill::Skill;
use crate::spell::Spell;
use crate::traits::Trait;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Profile {
    pub name: String,
    pub player: String,
    /// Tech level as written on the sheet, e.g. `3` or `TL8^`.
    pub tech_level: String,
    /// Size modifier entered by the user.
    pub size_modifier: i32,
    /// Size modifier granted by features; written by the recalculation loop.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub size_modifier_bonus: Fixed,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: String::new(),
            player: String::new(),
            tech_level: "3".to_owned(),
            size_modifier: 0,
            size_modifier_bonus: Fixed::ZERO,
        }
    }
}

impl Profile {
    pub fn adjusted_size_modifier(&self) -> i32 {
        self.size_modifier + self.size_modifier_bonus.as_i32()
    }
}

/// Everything about a character that is authored rather than computed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EntityData {
    pub profile: Profile,
    pub total_points: Fixed,
    pub attributes: Attributes,
    pub traits: Vec<Trait>,
    pub skills: Vec<Skill>,
    pub spells: Vec<Spell>,
    pub carried_equipment: Vec<Equipment>,
    pub other_equipment: Vec<Equipment>,
    pub notes: Vec<String>,
}
