//! Prerequisite evaluation for every item tree.

use std::collections::HashMap;

use super::Entity;
use crate::criteria::StringCriteria;
use crate::feature::{LeveledAmount, SkillBonus, SpellBonus, SpellMatch};
use crate::fixed::Fixed;
use crate::node::{self, ItemId, Node};
use crate::prereq::{PrereqList, PrereqSubject};

const PREFIX: &str = "\n● ";
const NOT_MET: &str = "Prerequisites have not been met:";

/// Penalty for lacking required equipment: worse for tech-level items.
fn equipment_penalty(tech_level: Option<&str>) -> Fixed {
    match tech_level {
        Some(tl) if !tl.is_empty() => Fixed::from(-10),
        _ => Fixed::from(-5),
    }
}

impl Entity {
    fn check_prereqs(
        &self,
        prereqs: &PrereqList,
        subject: PrereqSubject<'_>,
        tooltip: &mut String,
        missing_equipment: &mut bool,
    ) -> bool {
        prereqs.satisfied(self, subject, Some(tooltip), PREFIX, missing_equipment)
    }

    /// Records an unsatisfied reason on every item whose prerequisites fail,
    /// and adds a skill or spell penalty for each one missing its equipment.
    pub(super) fn process_prereqs(&mut self) {
        let mut reasons: HashMap<ItemId, String> = HashMap::new();
        let mut skill_penalties = Vec::new();
        let mut spell_penalties = Vec::new();

        for item in node::walk_enabled(&self.traits).filter(|t| !t.is_container()) {
            let mut tooltip = String::new();
            let mut missing = false;
            if !self.check_prereqs(&item.prereqs, PrereqSubject::Trait(item), &mut tooltip, &mut missing) {
                reasons.insert(item.id, tooltip);
            }
        }

        for skill in node::leaves(&self.skills) {
            let mut tooltip = String::new();
            let mut missing = false;
            let mut satisfied =
                self.check_prereqs(&skill.prereqs, PrereqSubject::Skill(skill), &mut tooltip, &mut missing);
            if missing {
                let bonus = SkillBonus {
                    name: StringCriteria::is(skill.name.clone()),
                    specialization: StringCriteria::is(skill.specialization.clone()),
                    amount: LeveledAmount::flat(equipment_penalty(skill.tech_level.as_deref())),
                    ..SkillBonus::default()
                };
                skill_penalties.push((bonus, skill.id));
            }
            if satisfied && skill.is_technique() {
                satisfied = self.technique_satisfied(skill, &mut tooltip, PREFIX);
            }
            if !satisfied {
                reasons.insert(skill.id, tooltip);
            }
        }

        for spell in node::leaves(&self.spells) {
            let mut tooltip = String::new();
            let mut missing = false;
            let mut satisfied =
                self.check_prereqs(&spell.prereqs, PrereqSubject::Spell(spell), &mut tooltip, &mut missing);
            if missing {
                let bonus = SpellBonus {
                    matching: SpellMatch::SpellName,
                    name: StringCriteria::is(spell.name.clone()),
                    amount: LeveledAmount::flat(equipment_penalty(spell.tech_level.as_deref())),
                    ..SpellBonus::default()
                };
                spell_penalties.push((bonus, spell.id));
            }
            if satisfied && spell.is_ritual() {
                satisfied = self.ritual_satisfied(spell, &mut tooltip, PREFIX);
            }
            if !satisfied {
                reasons.insert(spell.id, tooltip);
            }
        }

        for list in [&self.carried_equipment, &self.other_equipment] {
            for item in node::walk(list) {
                let mut tooltip = String::new();
                let mut missing = false;
                if !self.check_prereqs(&item.prereqs, PrereqSubject::Equipment(item), &mut tooltip, &mut missing) {
                    reasons.insert(item.id, tooltip);
                }
            }
        }

        for (bonus, owner) in skill_penalties {
            self.features
                .push_skill_bonus(bonus, owner, self.index.name(owner));
        }
        for (bonus, owner) in spell_penalties {
            self.features
                .push_spell_bonus(bonus, owner, self.index.name(owner));
        }

        let reason_for = |id: ItemId| {
            reasons
                .get(&id)
                .map(|tooltip| format!("{NOT_MET}{tooltip}"))
                .unwrap_or_default()
        };
        node::walk_mut(&mut self.traits, &mut |item| item.unsatisfied_reason = reason_for(item.id));
        node::walk_mut(&mut self.skills, &mut |item| item.unsatisfied_reason = reason_for(item.id));
        node::walk_mut(&mut self.spells, &mut |item| item.unsatisfied_reason = reason_for(item.id));
        for list in [&mut self.carried_equipment, &mut self.other_equipment] {
            node::walk_mut(list, &mut |item| item.unsatisfied_reason = reason_for(item.id));
        }
    }
}
