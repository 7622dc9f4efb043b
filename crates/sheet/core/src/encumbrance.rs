//! Encumbrance levels.

use crate::fixed::Fixed;

/// How heavily a character is loaded, from carried weight against basic lift.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Encumbrance {
    #[default]
    None,
    Light,
    Medium,
    Heavy,
    ExtraHeavy,
}

impl Encumbrance {
    /// Levels from lightest to heaviest.
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::Light,
        Self::Medium,
        Self::Heavy,
        Self::ExtraHeavy,
    ];

    /// Penalty to move, dodge, and encumbrance-sensitive skills.
    pub const fn penalty(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Light => -1,
            Self::Medium => -2,
            Self::Heavy => -3,
            Self::ExtraHeavy => -4,
        }
    }

    /// Basic lift multiple that may be carried at this level.
    pub const fn weight_multiplier(self) -> i64 {
        match self {
            Self::None => 1,
            Self::Light => 2,
            Self::Medium => 3,
            Self::Heavy => 6,
            Self::ExtraHeavy => 10,
        }
    }

    /// Applies the level's move penalty: `floor(move * (10 + 2 * penalty) / 10)`.
    pub fn adjust_move(self, basic_move: i32) -> i32 {
        let scale = Fixed::from(10 + 2 * self.penalty()) / Fixed::from(10);
        (Fixed::from(basic_move) * scale).floor().as_i32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered_by_weight() {
        let multipliers: Vec<i64> = Encumbrance::ALL.iter().map(|e| e.weight_multiplier()).collect();
        assert_eq!(multipliers, [1, 2, 3, 6, 10]);
        assert!(Encumbrance::Heavy > Encumbrance::Light);
        assert_eq!(Encumbrance::ExtraHeavy.penalty(), -4);
    }

    #[test]
    fn move_scales_by_twenty_percent_per_level() {
        assert_eq!(Encumbrance::None.adjust_move(5), 5);
        // 5 * 0.8 = 4
        assert_eq!(Encumbrance::Light.adjust_move(5), 4);
        // 5 * 0.6 = 3
        assert_eq!(Encumbrance::Medium.adjust_move(5), 3);
        // 7 * 0.2 = 1.4
        assert_eq!(Encumbrance::ExtraHeavy.adjust_move(7), 1);
    }

    #[test]
    fn parses_names() {
        assert_eq!("extra_heavy".parse::<Encumbrance>().unwrap(), Encumbrance::ExtraHeavy);
        assert_eq!(Encumbrance::Medium.to_string(), "medium");
    }
}
