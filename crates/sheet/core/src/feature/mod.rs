//! Features: bonuses and adjustments granted by traits, skills, and equipment.
//!
//! Features are authored on items and collected into a [`FeatureSet`] once per
//! recalculation pass. Each collected bonus carries the level of the item that
//! granted it and the identity of that item, so lookups can both sum amounts
//! and explain where they came from.

pub mod leveled;
pub mod set;

pub use leveled::LeveledAmount;
pub use set::{FeatureSet, Granted};

use crate::criteria::{NumericCriteria, StringCriteria};
use crate::fixed::Fixed;
use crate::measure::Weight;

/// Restricts an attribute bonus to one use of the attribute.
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
pub enum BonusLimitation {
    #[default]
    None,
    StrikingOnly,
    LiftingOnly,
    ThrowingOnly,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AttributeBonus {
    pub attribute: String,
    pub limitation: BonusLimitation,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub amount: LeveledAmount,
}

/// Damage resistance on a hit location. The location `all` covers every one.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DrBonus {
    pub location: String,
    pub specialization: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub amount: LeveledAmount,
}

impl Default for DrBonus {
    fn default() -> Self {
        Self {
            location: DR_ALL.to_owned(),
            specialization: DR_ALL.to_owned(),
            amount: LeveledAmount::default(),
        }
    }
}

/// Hit location and specialization that every DR bonus may target.
pub const DR_ALL: &str = "all";

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
pub enum SkillSelection {
    #[default]
    SkillsWithName,
    WeaponsWithName,
    ThisWeapon,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SkillBonus {
    pub selection: SkillSelection,
    pub name: StringCriteria,
    pub specialization: StringCriteria,
    pub tags: StringCriteria,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub amount: LeveledAmount,
}

impl Default for SkillBonus {
    fn default() -> Self {
        Self {
            selection: SkillSelection::default(),
            name: StringCriteria::is(""),
            specialization: StringCriteria::any(),
            tags: StringCriteria::any(),
            amount: LeveledAmount::default(),
        }
    }
}

impl SkillBonus {
    fn matches(&self, name: &str, specialization: &str, tags: &[String]) -> bool {
        self.name.matches(name)
            && self.specialization.matches(specialization)
            && self.tags.matches_list(tags)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SkillPointBonus {
    pub name: StringCriteria,
    pub specialization: StringCriteria,
    pub tags: StringCriteria,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub amount: LeveledAmount,
}

impl Default for SkillPointBonus {
    fn default() -> Self {
        Self {
            name: StringCriteria::is(""),
            specialization: StringCriteria::any(),
            tags: StringCriteria::any(),
            amount: LeveledAmount::default(),
        }
    }
}

/// What part of a spell a spell bonus keys on.
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
pub enum SpellMatch {
    #[default]
    AllColleges,
    CollegeName,
    PowerSourceName,
    SpellName,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpellBonus {
    #[cfg_attr(feature = "serde", serde(rename = "match"))]
    pub matching: SpellMatch,
    pub name: StringCriteria,
    pub tags: StringCriteria,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub amount: LeveledAmount,
}

/// Same selection rules as [`SpellBonus`], applied to points instead of levels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpellPointBonus {
    #[cfg_attr(feature = "serde", serde(rename = "match"))]
    pub matching: SpellMatch,
    pub name: StringCriteria,
    pub tags: StringCriteria,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub amount: LeveledAmount,
}

/// Which weapon statistic a weapon bonus changes.
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
pub enum WeaponBonusKind {
    /// Damage adds; a per-level amount scales with the weapon's dice.
    #[default]
    Damage,
    DrDivisor,
    MinSt,
    Accuracy,
    Range,
    Parry,
    Block,
    Bulk,
    Recoil,
    RateOfFire,
    Shots,
}

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
pub enum WeaponSelection {
    #[default]
    WithRequiredSkill,
    ThisWeapon,
    WithName,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WeaponBonus {
    pub kind: WeaponBonusKind,
    pub selection: WeaponSelection,
    pub name: StringCriteria,
    pub specialization: StringCriteria,
    pub relative_level: NumericCriteria,
    pub usage: StringCriteria,
    pub tags: StringCriteria,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub amount: LeveledAmount,
}

impl Default for WeaponBonus {
    fn default() -> Self {
        Self {
            kind: WeaponBonusKind::default(),
            selection: WeaponSelection::default(),
            name: StringCriteria::is(""),
            specialization: StringCriteria::any(),
            relative_level: NumericCriteria::any(),
            usage: StringCriteria::any(),
            tags: StringCriteria::any(),
            amount: LeveledAmount::default(),
        }
    }
}

/// A situational reaction modifier such as "+2 from clergy".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SituationalBonus {
    pub situation: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub amount: LeveledAmount,
}

/// Percentage off an attribute's point cost.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CostReduction {
    pub attribute: String,
    pub percentage: Fixed,
}

/// Reduces the weight of a container's contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WeightReduction {
    Percentage(Fixed),
    Weight(Weight),
}

/// Every feature an item may carry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Feature {
    AttributeBonus(AttributeBonus),
    DrBonus(DrBonus),
    SkillBonus(SkillBonus),
    SkillPointBonus(SkillPointBonus),
    SpellBonus(SpellBonus),
    SpellPointBonus(SpellPointBonus),
    WeaponBonus(WeaponBonus),
    ReactionBonus(SituationalBonus),
    ConditionalModifier(SituationalBonus),
    CostReduction(CostReduction),
    ContainedWeightReduction {
        reduction: WeightReduction,
    },
    /// A kind this build does not know. Skipped with a warning.
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

impl Feature {
    /// Short kind name used in log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AttributeBonus(_) => "attribute_bonus",
            Self::DrBonus(_) => "dr_bonus",
            Self::SkillBonus(_) => "skill_bonus",
            Self::SkillPointBonus(_) => "skill_point_bonus",
            Self::SpellBonus(_) => "spell_bonus",
            Self::SpellPointBonus(_) => "spell_point_bonus",
            Self::WeaponBonus(_) => "weapon_bonus",
            Self::ReactionBonus(_) => "reaction_bonus",
            Self::ConditionalModifier(_) => "conditional_modifier",
            Self::CostReduction(_) => "cost_reduction",
            Self::ContainedWeightReduction { .. } => "contained_weight_reduction",
            Self::Unknown => "unknown",
        }
    }

    pub fn attribute_bonus(attribute: impl Into<String>, amount: LeveledAmount) -> Self {
        Self::AttributeBonus(AttributeBonus {
            attribute: attribute.into(),
            limitation: BonusLimitation::None,
            amount,
        })
    }

    pub fn skill_bonus(name: impl Into<String>, amount: LeveledAmount) -> Self {
        Self::SkillBonus(SkillBonus {
            name: StringCriteria::is(name),
            amount,
            ..SkillBonus::default()
        })
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn deserializes_tagged_features() {
        let json = r#"[
            {"type": "attribute_bonus", "attribute": "st", "amount": 2, "per_level": true},
            {"type": "dr_bonus", "location": "torso", "amount": 3},
            {"type": "contained_weight_reduction", "reduction": {"percentage": 50}}
        ]"#;
        let features: Vec<Feature> = serde_json::from_str(json).unwrap();
        assert_eq!(
            features[0],
            Feature::attribute_bonus("st", LeveledAmount::per_level(Fixed::from(2)))
        );
        let Feature::DrBonus(dr) = &features[1] else {
            panic!("expected a DR bonus");
        };
        assert_eq!(dr.specialization, DR_ALL);
        assert_eq!(
            features[2],
            Feature::ContainedWeightReduction {
                reduction: WeightReduction::Percentage(Fixed::from(50)),
            }
        );
    }

    #[test]
    fn unknown_kinds_survive_deserialization() {
        let json = r#"[{"type": "spell_casting_speed", "amount": 1}]"#;
        let features: Vec<Feature> = serde_json::from_str(json).unwrap();
        assert_eq!(features, [Feature::Unknown]);
    }
}
