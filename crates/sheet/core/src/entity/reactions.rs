//! Reaction and conditional modifiers, grouped by situation.

use std::collections::HashMap;

use super::Entity;
use crate::feature::{Feature, SituationalBonus};
use crate::fixed::Fixed;
use crate::node::{self, Node};

/// Every modifier that applies in one situation, with where each came from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConditionalModifier {
    pub situation: String,
    pub sources: Vec<String>,
    pub amounts: Vec<Fixed>,
}

impl ConditionalModifier {
    pub fn total(&self) -> Fixed {
        self.amounts.iter().copied().sum()
    }
}

type Select = fn(&Feature) -> Option<&SituationalBonus>;

fn reaction(feature: &Feature) -> Option<&SituationalBonus> {
    match feature {
        Feature::ReactionBonus(bonus) => Some(bonus),
        _ => None,
    }
}

fn conditional(feature: &Feature) -> Option<&SituationalBonus> {
    match feature {
        Feature::ConditionalModifier(bonus) => Some(bonus),
        _ => None,
    }
}

#[derive(Default)]
struct Collector {
    by_situation: HashMap<String, ConditionalModifier>,
}

impl Collector {
    fn add(&mut self, select: Select, source: &str, features: &[Feature], level: Fixed) {
        for bonus in features.iter().filter_map(select) {
            let amount = bonus.amount.at_level(level).adjusted_amount();
            let entry = self
                .by_situation
                .entry(bonus.situation.clone())
                .or_insert_with(|| ConditionalModifier {
                    situation: bonus.situation.clone(),
                    ..ConditionalModifier::default()
                });
            entry.sources.push(source.to_owned());
            entry.amounts.push(amount);
        }
    }

    fn finish(self) -> Vec<ConditionalModifier> {
        let mut list: Vec<_> = self.by_situation.into_values().collect();
        list.sort_by_cached_key(|modifier| modifier.situation.to_lowercase());
        list
    }
}

impl Entity {
    /// Reaction modifiers from enabled traits, equipped equipment, and skills.
    pub fn reactions(&self) -> Vec<ConditionalModifier> {
        self.situational(reaction)
    }

    /// Situational roll modifiers from the same sources as reactions.
    pub fn conditional_modifiers(&self) -> Vec<ConditionalModifier> {
        self.situational(conditional)
    }

    fn situational(&self, select: Select) -> Vec<ConditionalModifier> {
        let mut collector = Collector::default();
        for item in node::walk_enabled(&self.traits) {
            let source = format!("from trait {}", item.name);
            if !item.is_container() {
                collector.add(select, &source, &item.features, item.feature_level());
            }
            for modifier in item.modifiers.iter().filter(|m| m.is_enabled()) {
                collector.add(select, &source, &modifier.features, modifier.levels);
            }
        }
        for item in node::walk(&self.carried_equipment) {
            if !item.equipped || !item.quantity.is_positive() {
                continue;
            }
            let source = format!("from equipment {}", item.name);
            collector.add(select, &source, &item.features, Fixed::ZERO);
            for modifier in item.modifiers.iter().filter(|m| m.is_enabled()) {
                collector.add(select, &source, &modifier.features, Fixed::ZERO);
            }
        }
        for skill in node::leaves(&self.skills) {
            let source = format!("from skill {}", skill.display_name());
            let level = skill.level.level.unwrap_or(Fixed::ZERO);
            collector.add(select, &source, &skill.features, level);
        }
        collector.finish()
    }
}
