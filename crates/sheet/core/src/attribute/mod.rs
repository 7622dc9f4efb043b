//! Attributes: definitions, per-character values, pools, and strength tables.
//!
//! An [`AttributeDef`] describes a statistic for a whole ruleset. An
//! [`Attribute`] is one character's purchase of it: the user-entered
//! adjustment plus the bonus and cost reduction written by the recalculation
//! loop. Values that need formula evaluation are read through the entity,
//! which acts as the variable resolver.

pub mod def;
pub mod progression;
pub mod threshold;

use std::collections::BTreeMap;

pub use def::{AttributeDef, AttributeDefs, AttributeType, MAX_COST_REDUCTION};
pub use progression::DamageProgression;
pub use threshold::{PoolThreshold, ThresholdOps};

use crate::fixed::Fixed;

/// Well-known attribute and variable ids.
pub mod ids {
    pub const STRENGTH: &str = "st";
    pub const DEXTERITY: &str = "dx";
    pub const INTELLIGENCE: &str = "iq";
    pub const HEALTH: &str = "ht";
    pub const WILL: &str = "will";
    pub const PERCEPTION: &str = "per";
    pub const BASIC_SPEED: &str = "basic_speed";
    pub const BASIC_MOVE: &str = "basic_move";
    pub const FATIGUE_POINTS: &str = "fp";
    pub const HIT_POINTS: &str = "hp";

    /// Pseudo-attributes that only bonuses target.
    pub const SIZE_MODIFIER: &str = "sm";
    pub const DODGE: &str = "dodge";
    pub const PARRY: &str = "parry";
    pub const BLOCK: &str = "block";
}

/// One character's value for an attribute.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Attribute {
    pub attr_id: String,
    /// Levels bought above or below the base value.
    pub adjustment: Fixed,
    /// Pool damage; ignored for non-pool attributes.
    pub damage: Fixed,
    pub order: i32,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub bonus: Fixed,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub cost_reduction: Fixed,
}

impl Attribute {
    pub fn new(attr_id: impl Into<String>, order: i32) -> Self {
        Self {
            attr_id: attr_id.into(),
            order,
            ..Self::default()
        }
    }

    /// Maximum given an already evaluated base value.
    ///
    /// Truncated unless the attribute is decimal. Separators are zero.
    pub fn maximum_from_base(&self, def: &AttributeDef, base: Fixed) -> Fixed {
        match def.attr_type {
            AttributeType::Decimal => base + self.adjustment + self.bonus,
            t if t.is_separator() => Fixed::ZERO,
            _ => (base + self.adjustment + self.bonus).trunc(),
        }
    }

    /// Current value: pools subtract damage from the maximum.
    pub fn current_from_maximum(&self, def: &AttributeDef, maximum: Fixed) -> Fixed {
        if def.attr_type == AttributeType::Pool {
            maximum - self.damage
        } else {
            maximum
        }
    }

    /// Points spent on the adjustment.
    pub fn point_cost(
        &self,
        def: &AttributeDef,
        size_modifier: i32,
        progression: DamageProgression,
        round_down: bool,
    ) -> Fixed {
        def.compute_cost(
            self.adjustment,
            self.cost_reduction,
            size_modifier,
            progression,
            round_down,
        )
    }
}

/// A character's attributes keyed by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Attributes {
    set: BTreeMap<String, Attribute>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// One fresh attribute per definition.
    pub fn from_defs(defs: &AttributeDefs) -> Self {
        let mut attributes = Self::new();
        attributes.sync_with(defs);
        attributes
    }

    /// Adds missing attributes, drops ones with no definition, and copies the
    /// display order from the definitions.
    pub fn sync_with(&mut self, defs: &AttributeDefs) {
        self.set.retain(|id, _| defs.get(id).is_some());
        for def in defs.list() {
            self.set
                .entry(def.id.clone())
                .or_insert_with(|| Attribute::new(def.id.clone(), def.order))
                .order = def.order;
        }
    }

    pub fn get(&self, id: &str) -> Option<&Attribute> {
        self.set.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Attribute> {
        self.set.get_mut(id)
    }

    pub fn insert(&mut self, attribute: Attribute) {
        self.set.insert(attribute.attr_id.clone(), attribute);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.set.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Attribute> {
        self.set.values_mut()
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Attributes in display order.
    pub fn list(&self) -> Vec<&Attribute> {
        let mut list: Vec<&Attribute> = self.set.values().collect();
        list.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.attr_id.cmp(&b.attr_id)));
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maximum_truncates_unless_decimal() {
        let mut attr = Attribute::new("basic_speed", 0);
        attr.adjustment = "0.25".parse().unwrap();
        let base: Fixed = "5.5".parse().unwrap();

        let decimal = AttributeDef::new("basic_speed", "Basic Speed", AttributeType::Decimal, "", 20);
        assert_eq!(attr.maximum_from_base(&decimal, base), "5.75".parse().unwrap());

        let integer = AttributeDef::new("basic_speed", "Basic Speed", AttributeType::Integer, "", 20);
        assert_eq!(attr.maximum_from_base(&integer, base), Fixed::from(5));
    }

    #[test]
    fn pools_subtract_damage() {
        let mut hp = Attribute::new("hp", 0);
        hp.damage = Fixed::from(4);
        let pool = AttributeDef::new("hp", "HP", AttributeType::Pool, "$st", 2);
        assert_eq!(hp.current_from_maximum(&pool, Fixed::from(12)), Fixed::from(8));

        let plain = AttributeDef::new("hp", "HP", AttributeType::Integer, "$st", 2);
        assert_eq!(hp.current_from_maximum(&plain, Fixed::from(12)), Fixed::from(12));
    }

    #[test]
    fn sync_follows_definitions() {
        let defs = AttributeDefs::standard();
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::new("retired", 99));
        attributes.sync_with(&defs);
        assert!(attributes.get("retired").is_none());
        assert_eq!(attributes.len(), defs.len());
        assert_eq!(attributes.list()[1].attr_id, "st");
    }
}
