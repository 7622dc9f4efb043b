//! Spell levels, including ritual-magic spells.

use std::collections::HashSet;

use super::Entity;
use super::skills::TechniqueBase;
use crate::fixed::Fixed;
use crate::node::{self, ItemId, Node};
use crate::skill::{Difficulty, SkillDefault, SkillLevel, relative_level_for_points};
use crate::spell::{RitualMagic, Spell};

/// Extra penalty when a ritual spell falls back to the unspecialized base
/// skill.
const RITUAL_FALLBACK_PENALTY: i32 = 6;

impl Entity {
    /// Level of `spell` given the current state of every other item.
    pub fn calculate_spell_level(&self, spell: &Spell) -> SkillLevel {
        match &spell.ritual {
            Some(ritual) => self.ritual_spell_level(spell, ritual),
            None => self.regular_spell_level(spell),
        }
    }

    fn regular_spell_level(&self, spell: &Spell) -> SkillLevel {
        let mut tooltip = String::new();
        let Some(attribute) = self.attribute_current(&spell.difficulty.attribute) else {
            return SkillLevel::unusable();
        };
        let difficulty = spell.difficulty.difficulty;
        let mut points = self.spell_adjusted_points(spell, Some(&mut tooltip)).trunc();
        if difficulty == Difficulty::Wildcard {
            points = (points / Fixed::from(3)).trunc();
        }
        let Some(mut relative) = relative_level_for_points(points, difficulty) else {
            return SkillLevel {
                level: None,
                relative_level: Fixed::ZERO,
                tooltip,
            };
        };
        relative += self.spell_bonus_for(spell, Some(&mut tooltip));
        relative = relative.trunc();
        SkillLevel {
            level: Some(attribute + relative),
            relative_level: relative,
            tooltip,
        }
    }

    /// A ritual spell is a technique of its base skill specialized by
    /// college, penalized by its prerequisite count and capped at the base
    /// skill's level. The best college wins.
    fn ritual_spell_level(&self, spell: &Spell, ritual: &RitualMagic) -> SkillLevel {
        let mut best: Option<SkillLevel> = None;
        let colleges: Vec<&str> = if spell.college.is_empty() {
            vec![""]
        } else {
            spell.college.iter().map(String::as_str).collect()
        };
        for college in colleges {
            let candidate = self.ritual_level_for_college(spell, ritual, college);
            if best.as_ref().is_none_or(|top| candidate.level > top.level) {
                best = Some(candidate);
            }
        }
        let mut level = best.unwrap_or_default();
        if level.level.is_some() {
            let bonus = self.spell_bonus_for(spell, Some(&mut level.tooltip)).trunc();
            level.level = level.level.map(|l| l + bonus);
            level.relative_level += bonus;
        }
        level
    }

    fn ritual_level_for_college(&self, spell: &Spell, ritual: &RitualMagic, college: &str) -> SkillLevel {
        let base_skill = if college.is_empty() {
            ""
        } else {
            ritual.base_skill.as_str()
        };
        let mut default = SkillDefault::skill(base_skill, college, -ritual.prerequisite_count);
        let points = self.spell_adjusted_points(spell, None);
        let excludes = HashSet::new();
        let base = |default: &SkillDefault| {
            let mut level = self.technique_level(
                TechniqueBase {
                    owner: spell.id,
                    name: &spell.name,
                    specialization: college,
                    tags: &spell.tags,
                    default,
                    difficulty: spell.difficulty.difficulty,
                    points,
                    require_points: false,
                    limit: Some(Fixed::ZERO),
                },
                &excludes,
            );
            level.relative_level += default.modifier;
            level
        };

        let specialized = base(&default);
        default.specialization.clear();
        default.modifier -= Fixed::from(RITUAL_FALLBACK_PENALTY);
        let fallback = base(&default);
        if specialized.level >= fallback.level {
            specialized
        } else {
            fallback
        }
    }

    /// Re-derives each spell's level. Returns whether any level changed.
    pub(super) fn update_spells(&mut self) -> bool {
        let ids: Vec<ItemId> = node::leaves(&self.spells).map(Node::id).collect();
        let mut changed = false;
        for id in ids {
            let Some(spell) = node::find(&self.spells, id) else {
                continue;
            };
            let level = self.calculate_spell_level(spell);
            if let Some(spell) = node::find_mut(&mut self.spells, id) {
                changed |= spell.level.level != level.level
                    || spell.level.relative_level != level.relative_level;
                spell.level = level;
            }
        }
        changed
    }

    /// Ritual spells need a college and a base skill for one of them.
    pub(super) fn ritual_satisfied(&self, spell: &Spell, tooltip: &mut String, prefix: &str) -> bool {
        let Some(ritual) = &spell.ritual else {
            return true;
        };
        if spell.college.is_empty() {
            tooltip.push_str(prefix);
            tooltip.push_str("Must be assigned to a college");
            return false;
        }
        let none = HashSet::new();
        let has_base = |college: &str| {
            self.best_skill_named(&ritual.base_skill, college, false, &none)
                .is_some()
        };
        if spell.college.iter().any(|college| has_base(college.as_str())) || has_base("") {
            return true;
        }
        tooltip.push_str(prefix);
        tooltip.push_str("Requires a skill named ");
        let options: Vec<String> = spell
            .college
            .iter()
            .map(|college| format!("{} ({college})", ritual.base_skill))
            .collect();
        tooltip.push_str(&options.join(" or "));
        false
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SheetSettings;
    use crate::entity::{Entity, EntityData};
    use crate::feature::{Feature, LeveledAmount, SpellBonus};
    use crate::fixed::Fixed;
    use crate::node;
    use crate::skill::{AttributeDifficulty, Difficulty, Skill, SkillLevel};
    use crate::spell::{RitualMagic, Spell};
    use crate::traits::Trait;

    fn entity(traits: Vec<Trait>, skills: Vec<Skill>, spells: Vec<Spell>) -> Entity {
        Entity::new(
            EntityData {
                traits,
                skills,
                spells,
                ..EntityData::default()
            },
            SheetSettings::default(),
        )
    }

    fn level_of(entity: &Entity, name: &str) -> SkillLevel {
        node::leaves(&entity.spells)
            .find(|spell| spell.name == name)
            .map(|spell| spell.level.clone())
            .unwrap_or_default()
    }

    fn ritual(prerequisite_count: i32) -> RitualMagic {
        RitualMagic {
            prerequisite_count,
            ..RitualMagic::default()
        }
    }

    #[test]
    fn spells_follow_the_hard_ladder_plus_magery() {
        let magery = Trait::leveled("Magery", 10, 3).with_features(vec![Feature::SpellBonus(
            SpellBonus {
                amount: LeveledAmount::per_level(Fixed::ONE),
                ..SpellBonus::default()
            },
        )]);
        let entity = entity(
            vec![magery],
            vec![],
            vec![
                Spell::new("Ignite Fire", &["Fire"], 1),
                Spell::new("Fireball", &["Fire"], 4),
                Spell::new("Create Fire", &["Fire"], 0),
            ],
        );
        let ignite = level_of(&entity, "Ignite Fire");
        assert_eq!(ignite.level, Some(Fixed::from(11)));
        assert_eq!(ignite.relative_level, Fixed::ONE);
        assert_eq!(level_of(&entity, "Fireball").level, Some(Fixed::from(13)));
        assert_eq!(level_of(&entity, "Create Fire").level, None);
    }

    #[test]
    fn ritual_spells_are_techniques_of_the_college_skill() {
        let ritual_magic = Skill::new(
            "Ritual Magic",
            AttributeDifficulty::new("iq", Difficulty::VeryHard),
            8,
        )
        .with_specialization("Fire");
        let entity = entity(
            vec![],
            vec![ritual_magic],
            vec![
                Spell::new("Ignite Fire", &["Fire"], 1).with_ritual(ritual(2)),
                Spell::new("Fireball", &["Fire"], 12).with_ritual(ritual(2)),
            ],
        );
        let ignite = level_of(&entity, "Ignite Fire");
        assert_eq!(ignite.level, Some(Fixed::from(8)));
        assert_eq!(ignite.relative_level, Fixed::from(-2));
        // Capped at the base skill.
        assert_eq!(level_of(&entity, "Fireball").level, Some(Fixed::from(10)));
    }

    #[test]
    fn ritual_spells_need_a_college_and_a_base_skill() {
        let homeless = Spell::new("Lightning", &[], 1).with_ritual(ritual(0));
        let watery = Spell::new("Seek Water", &["Water", "Knowledge"], 1).with_ritual(ritual(0));
        let entity = entity(vec![], vec![], vec![homeless.clone(), watery.clone()]);

        let mut tooltip = String::new();
        assert!(!entity.ritual_satisfied(&homeless, &mut tooltip, "\n- "));
        assert_eq!(tooltip, "\n- Must be assigned to a college");

        let mut tooltip = String::new();
        assert!(!entity.ritual_satisfied(&watery, &mut tooltip, "\n- "));
        assert_eq!(
            tooltip,
            "\n- Requires a skill named Ritual Magic (Water) or Ritual Magic (Knowledge)"
        );
        assert_eq!(level_of(&entity, "Seek Water").level, None);
    }
}
