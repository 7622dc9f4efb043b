//! Lifting, movement, dodge, encumbrance, and striking damage.

use super::Entity;
use crate::attribute::{ThresholdOps, ids};
use crate::dice::Dice;
use crate::encumbrance::Encumbrance;
use crate::fixed::Fixed;
use crate::measure::Weight;

impl Entity {
    fn strength_or_zero(&self) -> Fixed {
        self.attribute_current(ids::STRENGTH)
            .unwrap_or(Fixed::ZERO)
            .max(Fixed::ZERO)
    }

    /// Halving divisor from pools at a threshold carrying `op`: 2 for one
    /// such pool, 4 for two or more, none otherwise.
    fn halving_divisor(&self, op: ThresholdOps) -> Option<Fixed> {
        let count = self.count_threshold_op_met(op).min(2);
        (count > 0).then(|| Fixed::from(2 * count as i32))
    }

    pub fn basic_lift(&self) -> Weight {
        if let Some(lift) = self.caches.basic_lift.get() {
            return lift;
        }
        let mut st = (self.strength_or_zero() + self.bonuses.lifting_st).trunc();
        if self.is_threshold_op_met(ThresholdOps::HALVE_ST) {
            st = (st / Fixed::from(2)).ceil();
        }
        let lift = Weight::from_pounds(self.settings.damage_progression.basic_lift(st.as_i32()));
        self.caches.basic_lift.set(Some(lift));
        lift
    }

    /// Most that may be carried while staying within `encumbrance`.
    pub fn maximum_carry(&self, encumbrance: Encumbrance) -> Weight {
        self.basic_lift() * Fixed::from_i64(encumbrance.weight_multiplier())
    }

    pub fn one_handed_lift(&self) -> Weight {
        self.basic_lift() * Fixed::from(2)
    }

    pub fn two_handed_lift(&self) -> Weight {
        self.basic_lift() * Fixed::from(8)
    }

    pub fn shove_and_knock_over(&self) -> Weight {
        self.basic_lift() * Fixed::from(12)
    }

    pub fn running_shove_and_knock_over(&self) -> Weight {
        self.basic_lift() * Fixed::from(24)
    }

    pub fn carry_on_back(&self) -> Weight {
        self.basic_lift() * Fixed::from(15)
    }

    pub fn shift_slightly(&self) -> Weight {
        self.basic_lift() * Fixed::from(50)
    }

    /// Weight of all carried equipment. For skills, items flagged as ignored
    /// for skills do not count.
    pub fn weight_carried(&self, for_skills: bool) -> Weight {
        self.carried_equipment
            .iter()
            .map(|item| item.extended_weight(for_skills))
            .sum()
    }

    /// Lightest level whose maximum carry covers the carried weight.
    pub fn encumbrance_level(&self, for_skills: bool) -> Encumbrance {
        let cache = if for_skills {
            &self.caches.encumbrance_for_skills
        } else {
            &self.caches.encumbrance
        };
        if let Some(level) = cache.get() {
            return level;
        }
        let carried = self.weight_carried(for_skills);
        let level = Encumbrance::ALL
            .into_iter()
            .find(|level| carried <= self.maximum_carry(*level))
            .unwrap_or(Encumbrance::ExtraHeavy);
        cache.set(Some(level));
        level
    }

    /// Move at an encumbrance level. Never below 1 unless Basic Move is 0.
    pub fn move_at(&self, encumbrance: Encumbrance) -> i32 {
        let mut initial = self
            .attribute_current(ids::BASIC_MOVE)
            .unwrap_or(Fixed::ZERO)
            .max(Fixed::ZERO);
        if let Some(divisor) = self.halving_divisor(ThresholdOps::HALVE_MOVE) {
            initial = (initial / divisor).ceil();
        }
        let scale = Fixed::from(10 + 2 * encumbrance.penalty());
        let value = (initial * scale / Fixed::from(10)).trunc();
        if value < Fixed::ONE {
            return i32::from(initial.is_positive());
        }
        value.as_i32()
    }

    /// Dodge at an encumbrance level. Never below 1.
    pub fn dodge_at(&self, encumbrance: Encumbrance) -> i32 {
        let speed = self
            .attribute_current(ids::BASIC_SPEED)
            .unwrap_or(Fixed::ZERO)
            .max(Fixed::ZERO);
        let mut dodge = Fixed::from(3) + self.bonuses.dodge + speed;
        if let Some(divisor) = self.halving_divisor(ThresholdOps::HALVE_DODGE) {
            dodge = (dodge / divisor).ceil();
        }
        (dodge + Fixed::from(encumbrance.penalty()))
            .max(Fixed::ONE)
            .as_i32()
    }

    pub fn current_move(&self) -> i32 {
        self.move_at(self.encumbrance_level(false))
    }

    pub fn current_dodge(&self) -> i32 {
        self.dodge_at(self.encumbrance_level(false))
    }

    fn striking_strength(&self) -> i32 {
        (self.strength_or_zero() + self.bonuses.striking_st).as_i32()
    }

    pub fn thrust(&self) -> Dice {
        self.settings.damage_progression.thrust(self.striking_strength())
    }

    pub fn swing(&self) -> Dice {
        self.settings.damage_progression.swing(self.striking_strength())
    }

    /// Total value of carried equipment.
    pub fn wealth_carried(&self) -> Fixed {
        self.carried_equipment.iter().map(|e| e.extended_value()).sum()
    }

    pub fn wealth_not_carried(&self) -> Fixed {
        self.other_equipment.iter().map(|e| e.extended_value()).sum()
    }
}

#[cfg(test)]
mod tests {
    use crate::attribute::ids;
    use crate::config::SheetSettings;
    use crate::encumbrance::Encumbrance;
    use crate::entity::{Entity, EntityData};
    use crate::equipment::Equipment;
    use crate::fixed::Fixed;
    use crate::measure::Weight;

    fn lb(pounds: i32) -> Weight {
        Weight::from_pounds(Fixed::from(pounds))
    }

    fn with_strength(st: i32, equipment: Vec<Equipment>) -> Entity {
        let mut data = EntityData {
            carried_equipment: equipment,
            ..EntityData::default()
        };
        data.attributes = crate::attribute::Attributes::from_defs(&SheetSettings::default().attributes);
        if let Some(strength) = data.attributes.get_mut(ids::STRENGTH) {
            strength.adjustment = Fixed::from(st - 10);
        }
        Entity::new(data, SheetSettings::default())
    }

    #[test]
    fn basic_lift_boundaries() {
        assert_eq!(with_strength(10, vec![]).basic_lift(), lb(20));
        assert_eq!(with_strength(0, vec![]).basic_lift(), Weight::ZERO);
        let entity = with_strength(10, vec![]);
        assert_eq!(entity.two_handed_lift(), lb(160));
        assert_eq!(entity.shift_slightly(), lb(1_000));
    }

    #[test]
    fn encumbrance_follows_carried_weight() {
        let light = with_strength(10, vec![Equipment::new("Pack", 1, lb(20))]);
        assert_eq!(light.encumbrance_level(false), Encumbrance::None);
        let medium = with_strength(10, vec![Equipment::new("Gear", 1, lb(45))]);
        assert_eq!(medium.encumbrance_level(false), Encumbrance::Medium);
        let crushed = with_strength(10, vec![Equipment::new("Anvil", 1, lb(500))]);
        assert_eq!(crushed.encumbrance_level(false), Encumbrance::ExtraHeavy);
    }

    #[test]
    fn move_and_dodge_drop_with_encumbrance() {
        let entity = with_strength(10, vec![]);
        assert_eq!(entity.move_at(Encumbrance::None), 5);
        assert_eq!(entity.move_at(Encumbrance::Medium), 3);
        assert_eq!(entity.move_at(Encumbrance::ExtraHeavy), 1);
        assert_eq!(entity.dodge_at(Encumbrance::None), 8);
        assert_eq!(entity.dodge_at(Encumbrance::ExtraHeavy), 4);
    }

    #[test]
    fn reeling_halves_move_and_dodge() {
        let mut entity = with_strength(10, vec![]);
        if let Some(hp) = entity.attributes.get_mut(ids::HIT_POINTS) {
            hp.damage = Fixed::from(7);
        }
        entity.recalculate();
        assert_eq!(entity.move_at(Encumbrance::None), 3);
        assert_eq!(entity.dodge_at(Encumbrance::None), 4);
    }

    #[test]
    fn striking_damage_uses_strength() {
        let entity = with_strength(10, vec![]);
        assert_eq!(entity.thrust().to_string(), "1d-2");
        assert_eq!(entity.swing().to_string(), "1d");
    }
}
