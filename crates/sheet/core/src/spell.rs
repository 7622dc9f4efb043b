//! Spells and ritual-magic spells.

use crate::fixed::Fixed;
use crate::node::{ItemId, Node};
use crate::prereq::PrereqList;
use crate::skill::{AttributeDifficulty, Difficulty, SkillLevel};

/// Ritual magic: the spell is a technique of a college-specialized base
/// skill, penalized by the number of prerequisite spells.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RitualMagic {
    pub base_skill: String,
    pub prerequisite_count: i32,
}

impl Default for RitualMagic {
    fn default() -> Self {
        Self {
            base_skill: "Ritual Magic".to_owned(),
            prerequisite_count: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Spell {
    pub id: ItemId,
    pub name: String,
    pub tech_level: Option<String>,
    pub tags: Vec<String>,
    pub college: Vec<String>,
    pub power_source: String,
    pub spell_class: String,
    pub difficulty: AttributeDifficulty,
    pub points: Fixed,
    pub ritual: Option<RitualMagic>,
    pub prereqs: PrereqList,
    pub container: bool,
    pub children: Vec<Spell>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub level: SkillLevel,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub unsatisfied_reason: String,
}

impl Default for Spell {
    fn default() -> Self {
        Self {
            id: ItemId::new(),
            name: String::new(),
            tech_level: None,
            tags: Vec::new(),
            college: Vec::new(),
            power_source: "Arcane".to_owned(),
            spell_class: "Regular".to_owned(),
            difficulty: AttributeDifficulty::new(crate::attribute::ids::INTELLIGENCE, Difficulty::Hard),
            points: Fixed::ONE,
            ritual: None,
            prereqs: PrereqList::default(),
            container: false,
            children: Vec::new(),
            level: SkillLevel::default(),
            unsatisfied_reason: String::new(),
        }
    }
}

impl Spell {
    pub fn new(name: impl Into<String>, college: &[&str], points: i32) -> Self {
        Self {
            name: name.into(),
            college: college.iter().map(|c| (*c).to_owned()).collect(),
            points: Fixed::from(points),
            ..Self::default()
        }
    }

    pub fn group(name: impl Into<String>, children: Vec<Spell>) -> Self {
        Self {
            name: name.into(),
            points: Fixed::ZERO,
            container: true,
            children,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_ritual(mut self, ritual: RitualMagic) -> Self {
        self.ritual = Some(ritual);
        self
    }

    pub const fn is_ritual(&self) -> bool {
        self.ritual.is_some()
    }

    pub fn display_name(&self) -> String {
        match &self.tech_level {
            Some(tl) if !self.container => format!("{}/TL{tl}", self.name),
            _ => self.name.clone(),
        }
    }
}

impl Node for Spell {
    fn id(&self) -> ItemId {
        self.id
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [Self] {
        &mut self.children
    }

    fn is_container(&self) -> bool {
        self.container
    }
}
