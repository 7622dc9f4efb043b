//! Traits: advantages, disadvantages, perks, quirks, and their modifiers.
//!
//! A trait's cost is its base points plus levels times points-per-level,
//! adjusted by the enabled modifiers of the trait and of every enclosing
//! container. Percentage modifiers are summed separately for enhancements and
//! limitations and the net limitation never exceeds -80 %.

use crate::feature::Feature;
use crate::fixed::Fixed;
use crate::node::{ItemId, Node};
use crate::prereq::PrereqList;

/// Largest reduction the percentage modifiers of a trait may apply.
pub const MAX_LIMITATION_PERCENT: i32 = 80;

/// How a container trait combines its children.
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
pub enum ContainerKind {
    /// Organizational only; children are counted individually.
    #[default]
    Group,
    /// Children are bought as one package.
    MetaTrait,
    /// Racial template; counted apart from advantages and disadvantages.
    Ancestry,
    /// Only the most expensive child is paid in full, the rest at 1/5.
    AlternativeAbilities,
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
pub enum ModifierCostType {
    #[default]
    Percentage,
    Points,
    Multiplier,
}

/// Which part of the trait's cost a modifier adjusts.
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
pub enum ModifierAffects {
    #[default]
    Total,
    BaseOnly,
    LevelsOnly,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TraitModifier {
    pub id: ItemId,
    pub name: String,
    pub cost: Fixed,
    pub cost_type: ModifierCostType,
    pub affects: ModifierAffects,
    pub levels: Fixed,
    pub disabled: bool,
    pub features: Vec<Feature>,
}

impl Default for TraitModifier {
    fn default() -> Self {
        Self {
            id: ItemId::new(),
            name: String::new(),
            cost: Fixed::ZERO,
            cost_type: ModifierCostType::Percentage,
            affects: ModifierAffects::Total,
            levels: Fixed::ZERO,
            disabled: false,
            features: Vec::new(),
        }
    }
}

impl TraitModifier {
    pub fn percentage(name: impl Into<String>, percent: i32) -> Self {
        Self {
            name: name.into(),
            cost: Fixed::from(percent),
            ..Self::default()
        }
    }

    pub fn points(name: impl Into<String>, points: i32) -> Self {
        Self {
            name: name.into(),
            cost: Fixed::from(points),
            cost_type: ModifierCostType::Points,
            ..Self::default()
        }
    }

    pub const fn is_enabled(&self) -> bool {
        !self.disabled
    }

    /// Cost, multiplied out by levels when leveled.
    pub fn cost_modifier(&self) -> Fixed {
        if self.levels.is_positive() {
            self.cost * self.levels
        } else {
            self.cost
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Trait {
    pub id: ItemId,
    pub name: String,
    pub notes: String,
    pub tags: Vec<String>,
    pub base_points: Fixed,
    pub levels: Fixed,
    pub points_per_level: Fixed,
    pub round_cost_down: bool,
    pub disabled: bool,
    pub modifiers: Vec<TraitModifier>,
    pub features: Vec<Feature>,
    pub prereqs: PrereqList,
    pub container: bool,
    pub container_kind: ContainerKind,
    pub children: Vec<Trait>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub unsatisfied_reason: String,
}

impl Default for Trait {
    fn default() -> Self {
        Self {
            id: ItemId::new(),
            name: String::new(),
            notes: String::new(),
            tags: Vec::new(),
            base_points: Fixed::ZERO,
            levels: Fixed::ZERO,
            points_per_level: Fixed::ZERO,
            round_cost_down: false,
            disabled: false,
            modifiers: Vec::new(),
            features: Vec::new(),
            prereqs: PrereqList::default(),
            container: false,
            container_kind: ContainerKind::Group,
            children: Vec::new(),
            unsatisfied_reason: String::new(),
        }
    }
}

impl Trait {
    pub fn new(name: impl Into<String>, base_points: i32) -> Self {
        Self {
            name: name.into(),
            base_points: Fixed::from(base_points),
            ..Self::default()
        }
    }

    pub fn leveled(name: impl Into<String>, points_per_level: i32, levels: i32) -> Self {
        Self {
            name: name.into(),
            points_per_level: Fixed::from(points_per_level),
            levels: Fixed::from(levels),
            ..Self::default()
        }
    }

    pub fn container(name: impl Into<String>, kind: ContainerKind, children: Vec<Trait>) -> Self {
        Self {
            name: name.into(),
            container: true,
            container_kind: kind,
            children,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_features(mut self, features: Vec<Feature>) -> Self {
        self.features = features;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Vec<TraitModifier>) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_prereqs(mut self, prereqs: PrereqList) -> Self {
        self.prereqs = prereqs;
        self
    }

    pub fn is_leveled(&self) -> bool {
        !self.container && !self.points_per_level.is_zero()
    }

    /// Levels in effect, zero for unleveled or disabled traits.
    pub fn current_level(&self) -> Fixed {
        if !self.disabled && self.is_leveled() {
            self.levels
        } else {
            Fixed::ZERO
        }
    }

    /// Level handed to the trait's features: never negative.
    pub fn feature_level(&self) -> Fixed {
        if self.is_leveled() {
            self.levels.max(Fixed::ZERO)
        } else {
            Fixed::ZERO
        }
    }

    /// Total cost with levels and modifiers applied.
    pub fn adjusted_points(&self) -> Fixed {
        self.adjusted_points_with(&[])
    }

    fn adjusted_points_with(&self, inherited: &[&TraitModifier]) -> Fixed {
        if self.disabled {
            return Fixed::ZERO;
        }
        let mut modifiers: Vec<&TraitModifier> = inherited.to_vec();
        modifiers.extend(self.modifiers.iter());
        if !self.container {
            return modified_points(
                self.base_points,
                self.levels,
                self.points_per_level,
                &modifiers,
                self.round_cost_down,
            );
        }

        let values: Vec<Fixed> = self
            .children
            .iter()
            .map(|child| child.adjusted_points_with(&modifiers))
            .collect();
        if self.container_kind != ContainerKind::AlternativeAbilities {
            return values.into_iter().sum();
        }
        let best = values.iter().copied().fold(Fixed::ZERO, Fixed::max);
        let mut points = best;
        let mut paid_in_full = false;
        for value in values {
            if !paid_in_full && value == best {
                paid_in_full = true;
            } else {
                points += (value * Fixed::from(20) / Fixed::from(100)).apply_rounding(self.round_cost_down);
            }
        }
        points
    }
}

fn modify_points(points: Fixed, percent: Fixed) -> Fixed {
    points + points * percent / Fixed::from(100)
}

fn modified_points(
    mut base_points: Fixed,
    levels: Fixed,
    mut points_per_level: Fixed,
    modifiers: &[&TraitModifier],
    round_down: bool,
) -> Fixed {
    let mut base_enhancement = Fixed::ZERO;
    let mut base_limitation = Fixed::ZERO;
    let mut level_enhancement = Fixed::ZERO;
    let mut level_limitation = Fixed::ZERO;
    let mut multiplier = Fixed::ONE;
    for modifier in modifiers.iter().filter(|m| m.is_enabled()) {
        let amount = modifier.cost_modifier();
        match modifier.cost_type {
            ModifierCostType::Percentage => {
                let (base, level) = if amount.is_negative() {
                    (&mut base_limitation, &mut level_limitation)
                } else {
                    (&mut base_enhancement, &mut level_enhancement)
                };
                match modifier.affects {
                    ModifierAffects::Total => {
                        *base += amount;
                        *level += amount;
                    }
                    ModifierAffects::BaseOnly => *base += amount,
                    ModifierAffects::LevelsOnly => *level += amount,
                }
            }
            ModifierCostType::Points => {
                if modifier.affects == ModifierAffects::LevelsOnly {
                    points_per_level += amount;
                } else {
                    base_points += amount;
                }
            }
            ModifierCostType::Multiplier => multiplier = multiplier * amount,
        }
    }

    let leveled_points = points_per_level * levels;
    let floor = -Fixed::from(MAX_LIMITATION_PERCENT);
    let percentages = [
        base_enhancement,
        base_limitation,
        level_enhancement,
        level_limitation,
    ];
    let points = if percentages.iter().all(|p| p.is_zero()) {
        base_points + leveled_points
    } else {
        let base_percent = floor.max(base_enhancement + base_limitation);
        let level_percent = floor.max(level_enhancement + level_limitation);
        if base_percent == level_percent {
            modify_points(base_points + leveled_points, base_percent)
        } else {
            modify_points(base_points, base_percent) + modify_points(leveled_points, level_percent)
        }
    };
    (points * multiplier).apply_rounding(round_down)
}

impl Node for Trait {
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

    fn is_enabled(&self) -> bool {
        !self.disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leveled_cost() {
        let trait_ = Trait::leveled("Acute Vision", 2, 3);
        assert_eq!(trait_.adjusted_points(), Fixed::from(6));
        assert_eq!(trait_.current_level(), Fixed::from(3));
    }

    #[test]
    fn limitations_are_capped_at_eighty_percent() {
        let trait_ = Trait::new("Flight", 40).with_modifiers(vec![
            TraitModifier::percentage("Winged", -25),
            TraitModifier::percentage("Cannot Hover", -15),
            TraitModifier::percentage("Planetary", -50),
        ]);
        // -90 % clamps to -80 %
        assert_eq!(trait_.adjusted_points(), Fixed::from(8));
    }

    #[test]
    fn percentage_rounds_up_unless_asked_not_to() {
        let mut trait_ = Trait::new("Magery", 15).with_modifiers(vec![TraitModifier::percentage("Limited", -10)]);
        // 13.5
        assert_eq!(trait_.adjusted_points(), Fixed::from(14));
        trait_.round_cost_down = true;
        assert_eq!(trait_.adjusted_points(), Fixed::from(13));
    }

    #[test]
    fn point_modifiers_adjust_base_or_level() {
        let mut extra = TraitModifier::points("Extra", 2);
        extra.affects = ModifierAffects::LevelsOnly;
        let trait_ = Trait::leveled("Striking ST", 5, 2).with_modifiers(vec![extra]);
        assert_eq!(trait_.adjusted_points(), Fixed::from(14));
    }

    #[test]
    fn container_modifiers_reach_children() {
        let group = Trait::container(
            "Powers",
            ContainerKind::MetaTrait,
            vec![Trait::new("Blast", 20), Trait::new("Shield", 10)],
        )
        .with_modifiers(vec![TraitModifier::percentage("Magical", -10)]);
        assert_eq!(group.adjusted_points(), Fixed::from(18 + 9));
    }

    #[test]
    fn alternative_abilities_pay_one_fifth_for_the_rest() {
        let group = Trait::container(
            "Forms",
            ContainerKind::AlternativeAbilities,
            vec![Trait::new("Fire", 30), Trait::new("Ice", 12), Trait::new("Mist", 30)],
        );
        // 30 + ceil(2.4) + 6
        assert_eq!(group.adjusted_points(), Fixed::from(39));
    }

    #[test]
    fn disabled_traits_cost_nothing() {
        let mut trait_ = Trait::new("Wealth", 20);
        trait_.disabled = true;
        assert_eq!(trait_.adjusted_points(), Fixed::ZERO);
        assert_eq!(trait_.current_level(), Fixed::ZERO);
    }

    #[test]
    fn negative_levels_never_reach_features() {
        let trait_ = Trait::leveled("Weak", 5, -2);
        assert_eq!(trait_.feature_level(), Fixed::ZERO);
    }
}
