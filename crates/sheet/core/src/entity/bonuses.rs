//! Feature collection and the bonus queries built on it.

use tracing::debug;

use super::{CombatBonuses, Entity};
use crate::attribute::{AttributeType, ids};
use crate::feature::{BonusLimitation, Feature, FeatureSet, SpellMatch};
use crate::fixed::Fixed;
use crate::node::{self, ItemId, Node};
use crate::skill::Skill;
use crate::spell::Spell;

impl Entity {
    /// Rebuilds the feature set from enabled traits, skills, and equipped
    /// equipment, then pushes the resulting bonuses onto attributes.
    pub(super) fn process_features(&mut self) {
        let mut set = FeatureSet::new();
        let mut grant = |features: &[Feature], owner: ItemId, level: Fixed| {
            for feature in features {
                set.grant(feature, owner, self.index.name(owner), level);
            }
        };

        for item in node::walk_enabled(&self.traits) {
            if !item.is_container() {
                grant(&item.features, item.id, item.feature_level());
            }
            for modifier in item.modifiers.iter().filter(|m| m.is_enabled()) {
                grant(&modifier.features, item.id, modifier.levels);
            }
        }
        for skill in node::leaves(&self.skills) {
            grant(
                &skill.features,
                skill.id,
                skill.level.level.unwrap_or(Fixed::ZERO),
            );
        }
        for item in node::walk(&self.carried_equipment) {
            if !item.equipped || !item.quantity.is_positive() {
                continue;
            }
            grant(&item.features, item.id, Fixed::ZERO);
            for modifier in item.modifiers.iter().filter(|m| m.is_enabled()) {
                grant(&modifier.features, item.id, Fixed::ZERO);
            }
        }
        debug!(bonuses = set.len(), "collected features");
        self.features = set;

        let bonus = |id: &str, limitation| {
            self.features
                .attribute_bonus_for(id, limitation, None)
                .trunc()
        };
        self.bonuses = CombatBonuses {
            lifting_st: bonus(ids::STRENGTH, BonusLimitation::LiftingOnly),
            striking_st: bonus(ids::STRENGTH, BonusLimitation::StrikingOnly),
            throwing_st: bonus(ids::STRENGTH, BonusLimitation::ThrowingOnly),
            dodge: bonus(ids::DODGE, BonusLimitation::None),
            parry: bonus(ids::PARRY, BonusLimitation::None),
            block: bonus(ids::BLOCK, BonusLimitation::None),
        };
        self.profile.size_modifier_bonus = bonus(ids::SIZE_MODIFIER, BonusLimitation::None);

        for attribute in self.attributes.iter_mut() {
            let def = self.settings.attributes.get(&attribute.attr_id);
            let mut amount = self.features.attribute_bonus_for(
                &attribute.attr_id,
                BonusLimitation::None,
                None,
            );
            if def.is_none_or(|def| def.attr_type != AttributeType::Decimal) {
                amount = amount.trunc();
            }
            attribute.bonus = amount;
            attribute.cost_reduction = match def {
                Some(_) => self.features.cost_reduction_for(&attribute.attr_id),
                None => Fixed::ZERO,
            };
        }
        self.discard_caches();
    }

    /// Bonus to an attribute with its explanation lines appended to `tooltip`.
    pub fn attribute_bonus_for(
        &self,
        id: &str,
        limitation: BonusLimitation,
        tooltip: Option<&mut String>,
    ) -> Fixed {
        self.features.attribute_bonus_for(id, limitation, tooltip)
    }

    pub fn skill_bonus_for(
        &self,
        name: &str,
        specialization: &str,
        tags: &[String],
        tooltip: Option<&mut String>,
    ) -> Fixed {
        self.features
            .skill_bonus_for(name, specialization, tags, tooltip)
    }

    /// Skill points plus point bonuses, never negative.
    pub fn skill_adjusted_points(&self, skill: &Skill, tooltip: Option<&mut String>) -> Fixed {
        let bonus = self.features.skill_point_bonus_for(
            &skill.name,
            &skill.specialization,
            &skill.tags,
            tooltip,
        );
        (skill.points + bonus).max(Fixed::ZERO)
    }

    /// Level bonus for a spell: its name, its power source, its best college,
    /// and every bonus to all colleges.
    pub fn spell_bonus_for(
        &self,
        spell: &Spell,
        mut tooltip: Option<&mut String>,
    ) -> Fixed {
        let features = &self.features;
        let by_name = features.spell_bonus_for(
            SpellMatch::SpellName,
            &spell.name,
            &spell.tags,
            tooltip.as_deref_mut(),
        );
        let by_source = features.spell_bonus_for(
            SpellMatch::PowerSourceName,
            &spell.power_source,
            &spell.tags,
            tooltip.as_deref_mut(),
        );
        let by_college = best_college(spell, tooltip.as_deref_mut(), |college, tooltip| {
            features.spell_bonus_for(SpellMatch::CollegeName, college, &spell.tags, tooltip)
        });
        let everywhere =
            features.spell_bonus_for(SpellMatch::AllColleges, "", &spell.tags, tooltip);
        by_name + by_source + by_college + everywhere
    }

    /// Spell points plus point bonuses, never negative.
    pub fn spell_adjusted_points(&self, spell: &Spell, mut tooltip: Option<&mut String>) -> Fixed {
        let features = &self.features;
        let by_name = features.spell_point_bonus_for(
            SpellMatch::SpellName,
            &spell.name,
            &spell.tags,
            tooltip.as_deref_mut(),
        );
        let by_source = features.spell_point_bonus_for(
            SpellMatch::PowerSourceName,
            &spell.power_source,
            &spell.tags,
            tooltip.as_deref_mut(),
        );
        let by_college = best_college(spell, tooltip.as_deref_mut(), |college, tooltip| {
            features.spell_point_bonus_for(SpellMatch::CollegeName, college, &spell.tags, tooltip)
        });
        let everywhere =
            features.spell_point_bonus_for(SpellMatch::AllColleges, "", &spell.tags, tooltip);
        (spell.points + by_name + by_source + by_college + everywhere).max(Fixed::ZERO)
    }
}

/// Largest per-college bonus. Only the winning college's explanation lands
/// in `tooltip`.
fn best_college(
    spell: &Spell,
    tooltip: Option<&mut String>,
    bonus_for: impl Fn(&str, Option<&mut String>) -> Fixed,
) -> Fixed {
    let mut best: Option<(Fixed, String)> = None;
    for college in &spell.college {
        let mut buffer = String::new();
        let amount = bonus_for(college, Some(&mut buffer));
        if best.as_ref().is_none_or(|(top, _)| amount > *top) {
            best = Some((amount, buffer));
        }
    }
    let Some((amount, explanation)) = best else {
        return Fixed::ZERO;
    };
    if let Some(tooltip) = tooltip {
        tooltip.push_str(&explanation);
    }
    amount
}
