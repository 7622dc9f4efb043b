//! Attribute values and `$variable` resolution.

use tracing::warn;

use super::Entity;
use crate::attribute::{Attribute, AttributeDef, AttributeType, PoolThreshold, ThresholdOps, ids};
use crate::fixed::Fixed;
use crate::formula::VariableResolver;

impl VariableResolver for Entity {
    /// `$sm` is the adjusted size modifier, `$id.current` the current value
    /// of a pool, and `$id` the maximum of any attribute.
    fn resolve_variable(&self, name: &str) -> Option<String> {
        if self.caches.resolving.borrow().contains(name) {
            warn!(variable = name, "variable resolves through itself");
            return None;
        }
        if let Some(value) = self.caches.variables.borrow().get(name) {
            return Some(value.clone());
        }

        self.caches.resolving.borrow_mut().insert(name.to_owned());
        let value = self.resolve_uncached(name);
        self.caches.resolving.borrow_mut().remove(name);

        if let Some(value) = &value {
            self.caches
                .variables
                .borrow_mut()
                .insert(name.to_owned(), value.clone());
        }
        value
    }
}

impl Entity {
    fn resolve_uncached(&self, name: &str) -> Option<String> {
        if name == ids::SIZE_MODIFIER {
            return Some(self.profile.adjusted_size_modifier().to_string());
        }
        let (id, part) = match name.split_once('.') {
            Some((id, part)) => (id, Some(part)),
            None => (name, None),
        };
        let Some((attribute, def)) = self.attribute_with_def(id) else {
            warn!(variable = name, "no such variable");
            return None;
        };
        let maximum = self.maximum_of(attribute, def);
        if def.attr_type == AttributeType::Pool && part == Some("current") {
            return Some(attribute.current_from_maximum(def, maximum).to_string());
        }
        Some(maximum.to_string())
    }

    fn attribute_with_def(&self, id: &str) -> Option<(&Attribute, &AttributeDef)> {
        let attribute = self.attributes.get(id)?;
        let def = self.settings.attributes.get(id)?;
        Some((attribute, def))
    }

    fn maximum_of(&self, attribute: &Attribute, def: &AttributeDef) -> Fixed {
        let base = def.base_value(self.evaluator(), self);
        attribute.maximum_from_base(def, base)
    }

    /// Base value plus adjustment and bonus. `None` for unknown ids.
    pub fn attribute_maximum(&self, id: &str) -> Option<Fixed> {
        let (attribute, def) = self.attribute_with_def(id)?;
        Some(self.maximum_of(attribute, def))
    }

    /// Maximum, less damage for pools. `None` for unknown ids.
    pub fn attribute_current(&self, id: &str) -> Option<Fixed> {
        let (attribute, def) = self.attribute_with_def(id)?;
        Some(attribute.current_from_maximum(def, self.maximum_of(attribute, def)))
    }

    /// Display name of an attribute; the upper-cased id when undefined.
    pub fn attribute_name(&self, id: &str) -> String {
        self.settings
            .attributes
            .get(id)
            .map_or_else(|| id.to_uppercase(), |def| def.display_name().to_owned())
    }

    /// Points spent on an attribute's adjustment.
    pub fn attribute_point_cost(&self, id: &str) -> Option<Fixed> {
        let (attribute, def) = self.attribute_with_def(id)?;
        Some(attribute.point_cost(
            def,
            self.profile.adjusted_size_modifier(),
            self.settings.damage_progression,
            self.settings.round_cost_down,
        ))
    }

    /// The first threshold, in authored order, whose boundary the pool's
    /// current value does not exceed.
    pub fn current_threshold(&self, id: &str) -> Option<&PoolThreshold> {
        let (attribute, def) = self.attribute_with_def(id)?;
        if def.attr_type != AttributeType::Pool {
            return None;
        }
        let maximum = self.maximum_of(attribute, def);
        let current = attribute.current_from_maximum(def, maximum);
        def.thresholds
            .iter()
            .find(|threshold| current <= threshold.threshold(maximum, self.evaluator(), self))
    }

    /// Number of pools whose current threshold carries `op`.
    pub fn count_threshold_op_met(&self, op: ThresholdOps) -> usize {
        self.attributes
            .iter()
            .filter_map(|attribute| self.current_threshold(&attribute.attr_id))
            .filter(|threshold| threshold.ops.contains(op))
            .count()
    }

    pub fn is_threshold_op_met(&self, op: ThresholdOps) -> bool {
        self.count_threshold_op_met(op) > 0
    }
}

#[cfg(test)]
mod tests {
    use crate::attribute::ids;
    use crate::config::SheetSettings;
    use crate::entity::{Entity, EntityData};
    use crate::fixed::Fixed;
    use crate::formula::VariableResolver;

    fn entity() -> Entity {
        Entity::new(EntityData::default(), SheetSettings::default())
    }

    #[test]
    fn pools_answer_current_only_when_asked() {
        let mut entity = entity();
        if let Some(hp) = entity.attributes.get_mut(ids::HIT_POINTS) {
            hp.damage = Fixed::from(4);
        }
        entity.discard_caches();
        assert_eq!(entity.resolve_variable("hp").as_deref(), Some("10"));
        assert_eq!(entity.resolve_variable("hp.current").as_deref(), Some("6"));
        assert_eq!(entity.resolve_variable("st.current").as_deref(), Some("10"));
    }

    #[test]
    fn unknown_variables_resolve_to_nothing() {
        let entity = entity();
        assert_eq!(entity.resolve_variable("luck"), None);
        assert_eq!(entity.resolve_variable("sm").as_deref(), Some("0"));
    }

    #[test]
    fn basic_speed_is_decimal() {
        let mut entity = entity();
        if let Some(dx) = entity.attributes.get_mut(ids::DEXTERITY) {
            dx.adjustment = Fixed::ONE;
        }
        entity.recalculate();
        // (11 + 10) / 4
        assert_eq!(
            entity.attribute_current(ids::BASIC_SPEED),
            Some(Fixed::from_raw(52_500))
        );
        assert_eq!(entity.attribute_current(ids::BASIC_MOVE), Some(Fixed::from(5)));
    }

    #[test]
    fn thresholds_follow_damage() {
        let mut entity = entity();
        assert_eq!(
            entity.current_threshold(ids::HIT_POINTS).map(|t| t.state.as_str()),
            Some("Healthy")
        );
        if let Some(hp) = entity.attributes.get_mut(ids::HIT_POINTS) {
            hp.damage = Fixed::from(7);
        }
        entity.discard_caches();
        assert_eq!(
            entity.current_threshold(ids::HIT_POINTS).map(|t| t.state.as_str()),
            Some("Reeling")
        );
        assert_eq!(entity.current_threshold(ids::STRENGTH), None);
    }
}
