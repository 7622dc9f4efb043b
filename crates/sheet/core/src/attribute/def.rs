//! Attribute definitions: the per-ruleset schema for each statistic.

use std::collections::BTreeMap;

use super::ids;
use super::progression::DamageProgression;
use super::threshold::{PoolThreshold, ThresholdOps};
use crate::fixed::Fixed;
use crate::formula::{FormulaEvaluator, VariableResolver, evaluate_to_number};

/// Cost reductions never exceed this many percent.
pub const MAX_COST_REDUCTION: i32 = 80;

/// How an attribute's value is stored and shown.
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
pub enum AttributeType {
    #[default]
    Integer,
    Decimal,
    Pool,
    PrimarySeparator,
    SecondarySeparator,
    PoolSeparator,
}

impl AttributeType {
    pub const fn is_separator(self) -> bool {
        matches!(
            self,
            Self::PrimarySeparator | Self::SecondarySeparator | Self::PoolSeparator
        )
    }
}

/// Schema for one attribute.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AttributeDef {
    pub id: String,
    pub name: String,
    pub full_name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub attr_type: AttributeType,
    /// Formula for the base value, e.g. `$iq` or `floor($basic_speed)`.
    pub base: String,
    pub cost_per_point: Fixed,
    pub cost_adj_percent_per_sm: Fixed,
    pub thresholds: Vec<PoolThreshold>,
    pub order: i32,
}

impl AttributeDef {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        attr_type: AttributeType,
        base: impl Into<String>,
        cost_per_point: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            attr_type,
            base: base.into(),
            cost_per_point: Fixed::from(cost_per_point),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = full_name.into();
        self
    }

    #[must_use]
    pub fn with_sm_cost_adjustment(mut self, percent: i32) -> Self {
        self.cost_adj_percent_per_sm = Fixed::from(percent);
        self
    }

    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Vec<PoolThreshold>) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub const fn is_separator(&self) -> bool {
        self.attr_type.is_separator()
    }

    /// Full name when one is authored, otherwise the short name.
    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.name
        } else {
            &self.full_name
        }
    }

    /// Evaluates the base formula. Separators are always zero.
    pub fn base_value(
        &self,
        evaluator: &dyn FormulaEvaluator,
        resolver: &dyn VariableResolver,
    ) -> Fixed {
        if self.is_separator() {
            return Fixed::ZERO;
        }
        evaluate_to_number(evaluator, &self.base, resolver)
    }

    /// Point cost of `value` levels bought above the base.
    ///
    /// A positive size modifier adds `cost_adj_percent_per_sm` per step to the
    /// reduction, except for HP under Knowing Your Own Strength. The total
    /// reduction is capped at [`MAX_COST_REDUCTION`] percent.
    pub fn compute_cost(
        &self,
        value: Fixed,
        cost_reduction: Fixed,
        size_modifier: i32,
        progression: DamageProgression,
        round_down: bool,
    ) -> Fixed {
        if self.is_separator() {
            return Fixed::ZERO;
        }
        let mut cost = value * self.cost_per_point;
        let mut reduction = cost_reduction;
        if size_modifier > 0
            && self.cost_adj_percent_per_sm.is_positive()
            && !(self.id == ids::HIT_POINTS
                && progression == DamageProgression::KnowingYourOwnStrength)
        {
            reduction += Fixed::from(size_modifier) * self.cost_adj_percent_per_sm;
        }
        if reduction.is_positive() {
            let hundred = Fixed::from(100);
            let reduction = reduction.min(Fixed::from(MAX_COST_REDUCTION));
            cost = cost * (hundred - reduction) / hundred;
        }
        cost.apply_rounding(round_down)
    }
}

/// The attribute schema set carried by a character's settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AttributeDefs {
    set: BTreeMap<String, AttributeDef>,
}

impl AttributeDefs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a definition, keyed by its id.
    pub fn insert(&mut self, def: AttributeDef) {
        self.set.insert(def.id.clone(), def);
    }

    pub fn get(&self, id: &str) -> Option<&AttributeDef> {
        self.set.get(id)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Definitions in display order.
    pub fn list(&self) -> Vec<&AttributeDef> {
        let mut defs: Vec<&AttributeDef> = self.set.values().collect();
        defs.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        defs
    }

    /// The standard attribute set: primary attributes, secondary
    /// characteristics, senses, and the FP and HP pools.
    pub fn standard() -> Self {
        use AttributeType::{Decimal, Integer, Pool, PoolSeparator, PrimarySeparator};

        let halve_all = ThresholdOps::HALVE_MOVE | ThresholdOps::HALVE_DODGE | ThresholdOps::HALVE_ST;
        let halve_move_dodge = ThresholdOps::HALVE_MOVE | ThresholdOps::HALVE_DODGE;

        let fp_thresholds = vec![
            PoolThreshold::new("Unconscious", "-$self", ThresholdOps::empty()),
            PoolThreshold::new("Collapse", "0", halve_all)
                .with_explanation("Roll vs. Will to do anything besides talk or rest"),
            PoolThreshold::new("Tired", "round($self / 3)", halve_all)
                .with_explanation("Casting spells and using powers costs extra FP"),
            PoolThreshold::new("Tiring", "$self - 1", ThresholdOps::empty()),
            PoolThreshold::new("Rested", "$self", ThresholdOps::empty()),
        ];
        let mut hp_thresholds = vec![PoolThreshold::new(
            "Dead",
            "round(-$self * 5)",
            halve_move_dodge,
        )];
        for n in (1..=4).rev() {
            hp_thresholds.push(
                PoolThreshold::new(
                    format!("Dying #{n}"),
                    format!("round(-$self * {n})"),
                    halve_move_dodge,
                )
                .with_explanation("Roll vs. HT to avoid death"),
            );
        }
        hp_thresholds.extend([
            PoolThreshold::new("Collapse", "0", halve_move_dodge)
                .with_explanation("Roll vs. HT every turn to remain conscious"),
            PoolThreshold::new("Reeling", "round($self / 3)", halve_move_dodge),
            PoolThreshold::new("Wounded", "$self - 1", ThresholdOps::empty()),
            PoolThreshold::new("Healthy", "$self", ThresholdOps::empty()),
        ]);

        let defs = [
            AttributeDef::new("primary_separator", "Primary Attributes", PrimarySeparator, "", 0),
            AttributeDef::new(ids::STRENGTH, "ST", Integer, "10", 10)
                .with_full_name("Strength")
                .with_sm_cost_adjustment(10),
            AttributeDef::new(ids::DEXTERITY, "DX", Integer, "10", 20).with_full_name("Dexterity"),
            AttributeDef::new(ids::INTELLIGENCE, "IQ", Integer, "10", 20)
                .with_full_name("Intelligence"),
            AttributeDef::new(ids::HEALTH, "HT", Integer, "10", 10).with_full_name("Health"),
            AttributeDef::new(ids::WILL, "Will", Integer, "$iq", 5),
            AttributeDef::new("fright_check", "Fright Check", Integer, "$will", 2),
            AttributeDef::new(ids::PERCEPTION, "Per", Integer, "$iq", 5)
                .with_full_name("Perception"),
            AttributeDef::new("vision", "Vision", Integer, "$per", 2),
            AttributeDef::new("hearing", "Hearing", Integer, "$per", 2),
            AttributeDef::new("taste_smell", "Taste & Smell", Integer, "$per", 2),
            AttributeDef::new("touch", "Touch", Integer, "$per", 2),
            AttributeDef::new(ids::BASIC_SPEED, "Basic Speed", Decimal, "($dx + $ht) / 4", 20),
            AttributeDef::new(ids::BASIC_MOVE, "Basic Move", Integer, "floor($basic_speed)", 5),
            AttributeDef::new("pool_separator", "Pools", PoolSeparator, "", 0),
            AttributeDef::new(ids::FATIGUE_POINTS, "FP", Pool, "$ht", 3)
                .with_full_name("Fatigue Points")
                .with_thresholds(fp_thresholds),
            AttributeDef::new(ids::HIT_POINTS, "HP", Pool, "$st", 2)
                .with_full_name("Hit Points")
                .with_sm_cost_adjustment(10)
                .with_thresholds(hp_thresholds),
        ];
        let mut set = Self::new();
        for (order, mut def) in defs.into_iter().enumerate() {
            def.order = order as i32;
            set.insert(def);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(cost_per_point: i32) -> AttributeDef {
        AttributeDef::new("st", "ST", AttributeType::Integer, "10", cost_per_point)
            .with_sm_cost_adjustment(10)
    }

    #[test]
    fn cost_without_reduction_is_value_times_cost() {
        let cost = def(2).compute_cost(
            Fixed::from(3),
            Fixed::ZERO,
            0,
            DamageProgression::BasicSet,
            false,
        );
        assert_eq!(cost, Fixed::from(6));
    }

    #[test]
    fn reduction_is_capped_at_eighty_percent() {
        // 10 levels * 10 points = 100, an 85% reduction is applied as 80%
        let cost = def(10).compute_cost(
            Fixed::from(10),
            Fixed::from(85),
            0,
            DamageProgression::BasicSet,
            false,
        );
        assert_eq!(cost, Fixed::from(20));
    }

    #[test]
    fn size_modifier_adds_to_reduction_and_rounds_up() {
        // 3 levels * 10 = 30, SM +1 gives 10% off: 27
        let st = def(10);
        assert_eq!(
            st.compute_cost(Fixed::from(3), Fixed::ZERO, 1, DamageProgression::BasicSet, false),
            Fixed::from(27)
        );
        // 1 level * 10 with 15% off = 8.5, rounded up to 9 or down to 8
        assert_eq!(
            st.compute_cost(Fixed::ONE, Fixed::from(15), 0, DamageProgression::BasicSet, false),
            Fixed::from(9)
        );
        assert_eq!(
            st.compute_cost(Fixed::ONE, Fixed::from(15), 0, DamageProgression::BasicSet, true),
            Fixed::from(8)
        );
    }

    #[test]
    fn hit_points_ignore_size_under_knowing_your_own_strength() {
        let hp = AttributeDef::new(ids::HIT_POINTS, "HP", AttributeType::Pool, "$st", 2)
            .with_sm_cost_adjustment(10);
        let kyos = DamageProgression::KnowingYourOwnStrength;
        assert_eq!(
            hp.compute_cost(Fixed::from(5), Fixed::ZERO, 2, kyos, false),
            Fixed::from(10)
        );
        // 10 points with 20% off
        assert_eq!(
            hp.compute_cost(Fixed::from(5), Fixed::ZERO, 2, DamageProgression::BasicSet, false),
            Fixed::from(8)
        );
    }

    #[test]
    fn separators_cost_nothing() {
        let sep = AttributeDef::new("sep", "Pools", AttributeType::PoolSeparator, "5", 10);
        assert_eq!(
            sep.compute_cost(Fixed::from(4), Fixed::ZERO, 0, DamageProgression::BasicSet, false),
            Fixed::ZERO
        );
    }

    #[test]
    fn standard_set_is_ordered() {
        let defs = AttributeDefs::standard();
        let order: Vec<&str> = defs.list().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(order[1], "st");
        assert_eq!(order.last().copied(), Some("hp"));
        let hp = defs.get("hp").unwrap();
        let boundaries: Vec<&str> = hp.thresholds.iter().map(|t| t.state.as_str()).collect();
        assert_eq!(boundaries.first().copied(), Some("Dead"));
        assert_eq!(boundaries.last().copied(), Some("Healthy"));
    }
}
