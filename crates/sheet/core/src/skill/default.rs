//! Skill defaults: "DX-5", "Broadsword-4", "Parry of Karate".

use core::fmt;

use crate::fixed::Fixed;

/// What a default is based on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub enum DefaultType {
    /// An attribute id such as `dx` or `per`.
    Attribute(String),
    #[default]
    Skill,
    Parry,
    Block,
    /// A flat 10.
    Ten,
}

impl DefaultType {
    pub const fn is_skill_based(&self) -> bool {
        matches!(self, Self::Skill | Self::Parry | Self::Block)
    }
}

impl From<String> for DefaultType {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "skill" => Self::Skill,
            "parry" => Self::Parry,
            "block" => Self::Block,
            "10" => Self::Ten,
            _ => Self::Attribute(value.to_ascii_lowercase()),
        }
    }
}

impl From<DefaultType> for String {
    fn from(value: DefaultType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DefaultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(id) => f.write_str(id),
            Self::Skill => f.write_str("skill"),
            Self::Parry => f.write_str("parry"),
            Self::Block => f.write_str("block"),
            Self::Ten => f.write_str("10"),
        }
    }
}

/// One way a skill may be used without points of its own.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SkillDefault {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub default_type: DefaultType,
    pub name: String,
    pub specialization: String,
    pub modifier: Fixed,
}

impl SkillDefault {
    pub fn attribute(attribute: impl Into<String>, modifier: i32) -> Self {
        Self {
            default_type: DefaultType::Attribute(attribute.into()),
            modifier: Fixed::from(modifier),
            ..Self::default()
        }
    }

    pub fn skill(name: impl Into<String>, specialization: impl Into<String>, modifier: i32) -> Self {
        Self {
            default_type: DefaultType::Skill,
            name: name.into(),
            specialization: specialization.into(),
            modifier: Fixed::from(modifier),
        }
    }

    pub const fn is_skill_based(&self) -> bool {
        self.default_type.is_skill_based()
    }

    /// Same target, ignoring the modifier.
    pub fn equivalent(&self, other: &Self) -> bool {
        self.default_type == other.default_type
            && self.name.eq_ignore_ascii_case(&other.name)
            && self.specialization.eq_ignore_ascii_case(&other.specialization)
    }

    /// Name as shown in explanations, e.g. `Thaumatology (Fire)`.
    pub fn full_name(&self) -> String {
        let mut name = match self.default_type {
            DefaultType::Parry => format!("Parrying {}", self.name),
            DefaultType::Block => format!("Blocking {}", self.name),
            DefaultType::Ten => "10".to_owned(),
            DefaultType::Attribute(ref id) => id.to_uppercase(),
            DefaultType::Skill => self.name.clone(),
        };
        if self.is_skill_based() && !self.specialization.is_empty() {
            name.push_str(&format!(" ({})", self.specialization));
        }
        name
    }
}

/// The default a skill currently leans on, with its level and the points it
/// is worth.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedDefault {
    pub default: SkillDefault,
    pub level: Fixed,
    /// Level truncated to a whole number.
    pub adjusted_level: Fixed,
    /// Points the default is worth. Negative when the default sits below the
    /// one-point level; the magnitude then is the default level itself.
    pub points: Fixed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_type_round_trips_through_text() {
        assert_eq!(DefaultType::from("DX".to_owned()), DefaultType::Attribute("dx".into()));
        assert_eq!(DefaultType::from("10".to_owned()), DefaultType::Ten);
        assert_eq!(String::from(DefaultType::Parry), "parry");
        assert!(DefaultType::Block.is_skill_based());
        assert!(!DefaultType::Ten.is_skill_based());
    }

    #[test]
    fn equivalence_ignores_modifier_and_case() {
        let a = SkillDefault::skill("Broadsword", "", -4);
        let b = SkillDefault::skill("broadsword", "", -2);
        assert!(a.equivalent(&b));
        assert!(!a.equivalent(&SkillDefault::attribute("dx", -4)));
    }

    #[test]
    fn full_names() {
        assert_eq!(SkillDefault::skill("Thaumatology", "Fire", 0).full_name(), "Thaumatology (Fire)");
        assert_eq!(SkillDefault::attribute("dx", -5).full_name(), "DX");
    }
}
