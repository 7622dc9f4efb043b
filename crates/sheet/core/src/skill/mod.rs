//! Skills and techniques.
//!
//! A skill's level is computed from the controlling attribute, the points
//! spent, and the difficulty. Skills may instead (or additionally) lean on a
//! default. Techniques are skills whose level is measured relative to another
//! skill or default rather than to an attribute. The calculations need the
//! whole character and live on [`Entity`](crate::entity::Entity); this module
//! holds the data and the point ladder.

pub mod default;

pub use default::{DefaultType, ResolvedDefault, SkillDefault};

use crate::feature::Feature;
use crate::fixed::Fixed;
use crate::node::{ItemId, Node};
use crate::prereq::PrereqList;

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Difficulty {
    Easy,
    #[default]
    Average,
    Hard,
    VeryHard,
    Wildcard,
}

impl Difficulty {
    /// Relative level bought by the first point.
    pub fn base_relative_level(self) -> Fixed {
        Fixed::from(match self {
            Self::Easy => 0,
            Self::Average => -1,
            Self::Hard => -2,
            Self::VeryHard | Self::Wildcard => -3,
        })
    }
}

/// Controlling attribute and difficulty, e.g. `DX/A`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AttributeDifficulty {
    pub attribute: String,
    pub difficulty: Difficulty,
}

impl Default for AttributeDifficulty {
    fn default() -> Self {
        Self {
            attribute: crate::attribute::ids::DEXTERITY.to_owned(),
            difficulty: Difficulty::Average,
        }
    }
}

impl AttributeDifficulty {
    pub fn new(attribute: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            attribute: attribute.into(),
            difficulty,
        }
    }
}

/// Computed level of a skill or spell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SkillLevel {
    /// `None` when the skill cannot be used at all.
    pub level: Option<Fixed>,
    pub relative_level: Fixed,
    /// Explanation of the bonuses and penalties that went in.
    pub tooltip: String,
}

impl SkillLevel {
    pub fn unusable() -> Self {
        Self::default()
    }
}

/// Technique settings: what the technique is based on and how far above
/// that base it may be raised.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Technique {
    pub default: SkillDefault,
    pub limit: Option<Fixed>,
}

/// Relative level bought with whole points under the standard ladder: one
/// point buys the base, two or three buy +1, then +1 per four points.
///
/// Returns `None` for less than one point.
pub fn relative_level_for_points(points: Fixed, difficulty: Difficulty) -> Option<Fixed> {
    let base = difficulty.base_relative_level();
    if points < Fixed::ONE {
        None
    } else if points == Fixed::ONE {
        Some(base)
    } else if points < Fixed::from(4) {
        Some(base + Fixed::ONE)
    } else {
        Some(base + Fixed::ONE + (points / Fixed::from(4)).trunc())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Skill {
    pub id: ItemId,
    pub name: String,
    pub specialization: String,
    pub tech_level: Option<String>,
    pub tags: Vec<String>,
    pub difficulty: AttributeDifficulty,
    pub points: Fixed,
    /// Multiplies the encumbrance penalty applied to this skill.
    pub encumbrance_penalty_multiplier: Fixed,
    pub technique: Option<Technique>,
    pub defaults: Vec<SkillDefault>,
    pub features: Vec<Feature>,
    pub prereqs: PrereqList,
    pub container: bool,
    pub children: Vec<Skill>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub defaulted_from: Option<ResolvedDefault>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub level: SkillLevel,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub unsatisfied_reason: String,
}

impl Default for Skill {
    fn default() -> Self {
        Self {
            id: ItemId::new(),
            name: String::new(),
            specialization: String::new(),
            tech_level: None,
            tags: Vec::new(),
            difficulty: AttributeDifficulty::default(),
            points: Fixed::ONE,
            encumbrance_penalty_multiplier: Fixed::ZERO,
            technique: None,
            defaults: Vec::new(),
            features: Vec::new(),
            prereqs: PrereqList::default(),
            container: false,
            children: Vec::new(),
            defaulted_from: None,
            level: SkillLevel::default(),
            unsatisfied_reason: String::new(),
        }
    }
}

impl Skill {
    pub fn new(name: impl Into<String>, difficulty: AttributeDifficulty, points: i32) -> Self {
        Self {
            name: name.into(),
            difficulty,
            points: Fixed::from(points),
            ..Self::default()
        }
    }

    /// A technique based on `default`, optionally capped at `limit` above it.
    pub fn technique(
        name: impl Into<String>,
        difficulty: Difficulty,
        default: SkillDefault,
        limit: Option<i32>,
        points: i32,
    ) -> Self {
        Self {
            name: name.into(),
            difficulty: AttributeDifficulty::new("", difficulty),
            points: Fixed::from(points),
            technique: Some(Technique {
                default,
                limit: limit.map(Fixed::from),
            }),
            ..Self::default()
        }
    }

    pub fn group(name: impl Into<String>, children: Vec<Skill>) -> Self {
        Self {
            name: name.into(),
            points: Fixed::ZERO,
            container: true,
            children,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_specialization(mut self, specialization: impl Into<String>) -> Self {
        self.specialization = specialization.into();
        self
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: Vec<SkillDefault>) -> Self {
        self.defaults = defaults;
        self
    }

    pub const fn is_technique(&self) -> bool {
        self.technique.is_some()
    }

    /// Name with tech level and specialization, e.g. `Guns/TL8 (Pistol)`.
    pub fn display_name(&self) -> String {
        let mut name = self.name.clone();
        if !self.container {
            if let Some(tl) = &self.tech_level {
                name.push_str("/TL");
                name.push_str(tl);
            }
            if !self.specialization.is_empty() {
                name.push_str(" (");
                name.push_str(&self.specialization);
                name.push(')');
            }
        }
        name
    }

    /// Relative level as displayed: techniques include their default's
    /// modifier. `None` for containers and unusable skills.
    pub fn adjusted_relative_level(&self) -> Option<Fixed> {
        if self.container {
            return None;
        }
        let level = self.level.level?;
        if !level.is_positive() {
            return None;
        }
        Some(match &self.technique {
            Some(technique) => self.level.relative_level + technique.default.modifier,
            None => self.level.relative_level,
        })
    }
}

impl Node for Skill {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_ladder() {
        let average = Difficulty::Average;
        assert_eq!(relative_level_for_points(Fixed::ZERO, average), None);
        assert_eq!(relative_level_for_points(Fixed::ONE, average), Some(Fixed::from(-1)));
        assert_eq!(relative_level_for_points(Fixed::from(2), average), Some(Fixed::ZERO));
        assert_eq!(relative_level_for_points(Fixed::from(3), average), Some(Fixed::ZERO));
        // -1 + 1 + 4 / 4
        assert_eq!(relative_level_for_points(Fixed::from(4), average), Some(Fixed::ONE));
        // -1 + 1 + 12 / 4
        assert_eq!(relative_level_for_points(Fixed::from(12), average), Some(Fixed::from(3)));
    }

    #[test]
    fn display_name_includes_tech_level_and_specialization() {
        let mut guns = Skill::new("Guns", AttributeDifficulty::default(), 2).with_specialization("Pistol");
        guns.tech_level = Some("8".into());
        assert_eq!(guns.display_name(), "Guns/TL8 (Pistol)");
        let group = Skill::group("Combat", vec![guns]);
        assert_eq!(group.display_name(), "Combat");
    }

    #[test]
    fn technique_relative_level_includes_default_modifier() {
        let mut kick = Skill::technique(
            "Kicking",
            Difficulty::Hard,
            SkillDefault::skill("Karate", "", -2),
            Some(2),
            2,
        );
        kick.level = SkillLevel {
            level: Some(Fixed::from(12)),
            relative_level: Fixed::ONE,
            tooltip: String::new(),
        };
        assert_eq!(kick.adjusted_relative_level(), Some(Fixed::from(-1)));
    }
}
