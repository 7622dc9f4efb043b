//! Equipment and equipment modifiers.
//!
//! Weights and values are per unit; the `extended_*` forms multiply by the
//! quantity and fold in the contents of containers.

use crate::feature::{Feature, WeightReduction};
use crate::fixed::Fixed;
use crate::measure::Weight;
use crate::node::{ItemId, Node};
use crate::prereq::PrereqList;

/// Largest reduction cost factors may apply to an item's value.
const MIN_COST_FACTOR: Fixed = Fixed::from_raw(-8_000);

/// How a modifier adjusts the item's value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CostAdjustment {
    /// Flat amount added to the value.
    Addition(Fixed),
    /// Percentage of the unmodified value.
    Percentage(Fixed),
    Multiplier(Fixed),
    /// Cost factor; all factors are summed and the total never drops below
    /// -0.8.
    CostFactor(Fixed),
}

/// How a modifier adjusts the item's weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WeightAdjustment {
    Addition(Weight),
    /// Percentage of the unmodified weight.
    Percentage(Fixed),
    Multiplier(Fixed),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EquipmentModifier {
    pub id: ItemId,
    pub name: String,
    pub disabled: bool,
    pub cost: Option<CostAdjustment>,
    pub weight: Option<WeightAdjustment>,
    pub features: Vec<Feature>,
}

impl Default for EquipmentModifier {
    fn default() -> Self {
        Self {
            id: ItemId::new(),
            name: String::new(),
            disabled: false,
            cost: None,
            weight: None,
            features: Vec::new(),
        }
    }
}

impl EquipmentModifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_cost(mut self, cost: CostAdjustment) -> Self {
        self.cost = Some(cost);
        self
    }

    #[must_use]
    pub fn with_weight(mut self, weight: WeightAdjustment) -> Self {
        self.weight = Some(weight);
        self
    }

    pub const fn is_enabled(&self) -> bool {
        !self.disabled
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Equipment {
    pub id: ItemId,
    pub name: String,
    pub notes: String,
    pub tags: Vec<String>,
    pub tech_level: Option<String>,
    pub quantity: Fixed,
    pub value: Fixed,
    pub weight: Weight,
    /// The item's own weight does not count toward encumbrance for skills.
    pub weight_ignored_for_skills: bool,
    pub equipped: bool,
    pub modifiers: Vec<EquipmentModifier>,
    pub features: Vec<Feature>,
    pub prereqs: PrereqList,
    pub container: bool,
    pub children: Vec<Equipment>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub unsatisfied_reason: String,
}

impl Default for Equipment {
    fn default() -> Self {
        Self {
            id: ItemId::new(),
            name: String::new(),
            notes: String::new(),
            tags: Vec::new(),
            tech_level: None,
            quantity: Fixed::ONE,
            value: Fixed::ZERO,
            weight: Weight::ZERO,
            weight_ignored_for_skills: false,
            equipped: true,
            modifiers: Vec::new(),
            features: Vec::new(),
            prereqs: PrereqList::default(),
            container: false,
            children: Vec::new(),
            unsatisfied_reason: String::new(),
        }
    }
}

impl Equipment {
    pub fn new(name: impl Into<String>, quantity: i32, weight: Weight) -> Self {
        Self {
            name: name.into(),
            quantity: Fixed::from(quantity),
            weight,
            ..Self::default()
        }
    }

    pub fn container(name: impl Into<String>, weight: Weight, children: Vec<Equipment>) -> Self {
        Self {
            name: name.into(),
            weight,
            container: true,
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
    pub fn with_modifiers(mut self, modifiers: Vec<EquipmentModifier>) -> Self {
        self.modifiers = modifiers;
        self
    }

    fn enabled_modifiers(&self) -> impl Iterator<Item = &EquipmentModifier> {
        self.modifiers.iter().filter(|m| m.is_enabled())
    }

    /// Unit value after modifiers, excluding contents.
    pub fn adjusted_value(&self) -> Fixed {
        let base = self.value;
        let mut cost = base;
        let mut additions = Fixed::ZERO;
        let mut percentage = Fixed::ZERO;
        let mut cost_factor = Fixed::ZERO;
        for modifier in self.enabled_modifiers() {
            match modifier.cost {
                Some(CostAdjustment::Addition(amount)) => additions += amount,
                Some(CostAdjustment::Percentage(amount)) => percentage += amount,
                Some(CostAdjustment::Multiplier(amount)) => cost = cost * amount,
                Some(CostAdjustment::CostFactor(amount)) => cost_factor += amount,
                None => {}
            }
        }
        cost += additions + base * percentage / Fixed::from(100);
        if !cost_factor.is_zero() {
            cost = cost * (cost_factor.max(MIN_COST_FACTOR) + Fixed::ONE);
        }
        cost.max(Fixed::ZERO)
    }

    /// Value of the whole stack, contents included.
    pub fn extended_value(&self) -> Fixed {
        if !self.quantity.is_positive() {
            return Fixed::ZERO;
        }
        let mut value = self.adjusted_value();
        if self.container {
            value += self.children.iter().map(Equipment::extended_value).sum::<Fixed>();
        }
        value * self.quantity
    }

    /// Unit weight after modifiers, excluding contents.
    pub fn adjusted_weight(&self, for_skills: bool) -> Weight {
        if for_skills && self.weight_ignored_for_skills {
            return Weight::ZERO;
        }
        let base = self.weight.pounds();
        let mut pounds = base;
        let mut percentage = Fixed::ZERO;
        let mut multiplier = Fixed::ONE;
        for modifier in self.enabled_modifiers() {
            match modifier.weight {
                Some(WeightAdjustment::Addition(weight)) => pounds += weight.pounds(),
                Some(WeightAdjustment::Percentage(amount)) => percentage += amount,
                Some(WeightAdjustment::Multiplier(amount)) => multiplier = multiplier * amount,
                None => {}
            }
        }
        pounds += base * percentage / Fixed::from(100);
        Weight::from_pounds((pounds * multiplier).max(Fixed::ZERO))
    }

    /// Weight of the contents of one unit after any contained-weight
    /// reductions carried by the item or its modifiers.
    pub fn contained_weight(&self, for_skills: bool) -> Weight {
        if self.children.is_empty() {
            return Weight::ZERO;
        }
        let contained: Fixed = self
            .children
            .iter()
            .map(|child| child.extended_weight(for_skills).pounds())
            .sum();
        let mut percentage = Fixed::ZERO;
        let mut reduction = Fixed::ZERO;
        let features = self
            .features
            .iter()
            .chain(self.enabled_modifiers().flat_map(|m| m.features.iter()));
        for feature in features {
            if let Feature::ContainedWeightReduction { reduction: amount } = feature {
                match amount {
                    WeightReduction::Percentage(percent) => percentage += *percent,
                    WeightReduction::Weight(weight) => reduction += weight.pounds(),
                }
            }
        }
        let hundred = Fixed::from(100);
        let contained = if percentage >= hundred {
            Fixed::ZERO
        } else if percentage.is_positive() {
            contained - contained * percentage / hundred
        } else {
            contained
        };
        Weight::from_pounds((contained - reduction).max(Fixed::ZERO))
    }

    /// Weight of the whole stack, contents included.
    pub fn extended_weight(&self, for_skills: bool) -> Weight {
        if !self.quantity.is_positive() {
            return Weight::ZERO;
        }
        (self.adjusted_weight(for_skills) + self.contained_weight(for_skills)) * self.quantity
    }
}

impl Node for Equipment {
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

    fn lb(pounds: i32) -> Weight {
        Weight::from_pounds(Fixed::from(pounds))
    }

    #[test]
    fn extended_weight_multiplies_by_quantity() {
        let arrows = Equipment::new("Arrow", 20, Weight::from_pounds(Fixed::from_raw(1_000)));
        assert_eq!(arrows.extended_weight(false), lb(2));
        let mut none = arrows.clone();
        none.quantity = Fixed::ZERO;
        assert_eq!(none.extended_weight(false), Weight::ZERO);
    }

    #[test]
    fn contained_weight_reductions_apply_to_contents_only() {
        let bag = Equipment::container("Bag of Holding", lb(1), vec![Equipment::new("Rock", 4, lb(5))])
            .with_features(vec![Feature::ContainedWeightReduction {
                reduction: WeightReduction::Percentage(Fixed::from(50)),
            }]);
        assert_eq!(bag.contained_weight(false), lb(10));
        assert_eq!(bag.extended_weight(false), lb(11));

        let mut fixed = bag.clone();
        fixed.features = vec![Feature::ContainedWeightReduction {
            reduction: WeightReduction::Weight(lb(25)),
        }];
        assert_eq!(fixed.contained_weight(false), Weight::ZERO);
    }

    #[test]
    fn weight_ignored_for_skills() {
        let mut armor = Equipment::new("Armor", 1, lb(20));
        armor.weight_ignored_for_skills = true;
        assert_eq!(armor.extended_weight(false), lb(20));
        assert_eq!(armor.extended_weight(true), Weight::ZERO);
    }

    #[test]
    fn modifiers_adjust_value_and_weight() {
        let sword = Equipment {
            value: Fixed::from(500),
            ..Equipment::new("Sword", 1, lb(3))
        }
        .with_modifiers(vec![
            EquipmentModifier::new("Fine")
                .with_cost(CostAdjustment::CostFactor(Fixed::from(3)))
                .with_weight(WeightAdjustment::Multiplier(Fixed::from(2))),
            EquipmentModifier::new("Engraved").with_cost(CostAdjustment::Addition(Fixed::from(100))),
        ]);
        assert_eq!(sword.adjusted_value(), Fixed::from(2_400));
        assert_eq!(sword.adjusted_weight(false), lb(6));
    }

    #[test]
    fn extended_value_includes_contents() {
        let pack = Equipment {
            value: Fixed::from(60),
            ..Equipment::container("Backpack", lb(3), vec![Equipment {
                value: Fixed::from(5),
                ..Equipment::new("Torch", 4, lb(1))
            }])
        };
        assert_eq!(pack.extended_value(), Fixed::from(80));
    }
}
