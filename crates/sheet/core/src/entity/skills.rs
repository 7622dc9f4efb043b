//! Skill levels, defaults, and techniques.
//!
//! Levels lean on each other through defaults, so every query that walks
//! from one skill to another carries an exclusion set of item ids. A skill
//! never counts as its own default, and a technique never counts as its own
//! base.

use std::collections::HashSet;
use std::fmt::Write as _;

use tracing::debug;

use super::Entity;
use crate::fixed::Fixed;
use crate::node::{self, ItemId, Node};
use crate::skill::{
    DefaultType, Difficulty, ResolvedDefault, Skill, SkillDefault, SkillLevel, Technique,
    relative_level_for_points,
};

/// Inputs to a technique-style level: a level measured from a default rather
/// than from an attribute. Shared by techniques and ritual-magic spells.
#[derive(Clone, Copy, Debug)]
pub(super) struct TechniqueBase<'a> {
    pub owner: ItemId,
    pub name: &'a str,
    pub specialization: &'a str,
    pub tags: &'a [String],
    pub default: &'a SkillDefault,
    pub difficulty: Difficulty,
    pub points: Fixed,
    pub require_points: bool,
    pub limit: Option<Fixed>,
}

impl Entity {
    /// Non-container skills matching `name` and, when given, `specialization`
    /// (both case-insensitive). With `require_points`, skills without
    /// adjusted points are left out; techniques always qualify.
    pub fn skills_named(
        &self,
        name: &str,
        specialization: &str,
        require_points: bool,
        excludes: &HashSet<ItemId>,
    ) -> Vec<&Skill> {
        node::leaves(&self.skills)
            .filter(|skill| !excludes.contains(&skill.id))
            .filter(|skill| skill.name.eq_ignore_ascii_case(name))
            .filter(|skill| {
                specialization.is_empty() || skill.specialization.eq_ignore_ascii_case(specialization)
            })
            .filter(|skill| {
                !require_points
                    || skill.is_technique()
                    || self.skill_adjusted_points(skill, None).is_positive()
            })
            .collect()
    }

    /// The matching skill with the highest freshly calculated level.
    pub fn best_skill_named(
        &self,
        name: &str,
        specialization: &str,
        require_points: bool,
        excludes: &HashSet<ItemId>,
    ) -> Option<(&Skill, SkillLevel)> {
        let mut best: Option<(&Skill, SkillLevel)> = None;
        for skill in self.skills_named(name, specialization, require_points, excludes) {
            let level = self.calculate_skill_level(skill, excludes);
            if best.as_ref().is_none_or(|(_, top)| level.level > top.level) {
                best = Some((skill, level));
            }
        }
        best
    }

    /// Level of `skill` given the current state of every other item. The
    /// skill's stored default is used as is.
    pub fn calculate_skill_level(&self, skill: &Skill, excludes: &HashSet<ItemId>) -> SkillLevel {
        match &skill.technique {
            Some(technique) => self.technique_skill_level(skill, technique, excludes),
            None => self.regular_skill_level(skill),
        }
    }

    fn regular_skill_level(&self, skill: &Skill) -> SkillLevel {
        let mut tooltip = String::new();
        let Some(attribute) = self.attribute_current(&skill.difficulty.attribute) else {
            debug!(skill = %skill.display_name(), attribute = %skill.difficulty.attribute, "skill has an unknown attribute");
            return SkillLevel::unusable();
        };
        let difficulty = skill.difficulty.difficulty;
        let wildcard = difficulty == Difficulty::Wildcard;
        let default = skill.defaulted_from.as_ref();

        let mut points = self.skill_adjusted_points(skill, Some(&mut tooltip));
        if wildcard {
            points = points / Fixed::from(3);
        } else if let Some(default) = default.filter(|d| d.points.is_positive()) {
            points += default.points;
        }
        points = points.trunc();

        let mut relative = match (relative_level_for_points(points, difficulty), default) {
            (Some(relative), _) => relative,
            (None, Some(default)) if !wildcard && default.points.is_negative() => {
                default.adjusted_level - attribute
            }
            _ => {
                return SkillLevel {
                    level: None,
                    relative_level: Fixed::ZERO,
                    tooltip,
                };
            }
        };

        let mut level = attribute + relative;
        if let Some(default) = default.filter(|_| !wildcard) {
            level = level.max(default.adjusted_level);
        }
        let bonus = self.skill_bonus_for(
            &skill.name,
            &skill.specialization,
            &skill.tags,
            Some(&mut tooltip),
        );
        level += bonus;
        relative += bonus;

        let penalty = Fixed::from(self.encumbrance_level(true).penalty())
            * skill.encumbrance_penalty_multiplier;
        level += penalty;
        if !penalty.is_zero() {
            let _ = write!(tooltip, "\nEncumbrance [{}]", penalty.to_signed_string());
        }
        SkillLevel {
            level: Some(level),
            relative_level: relative,
            tooltip,
        }
    }

    fn technique_skill_level(
        &self,
        skill: &Skill,
        technique: &Technique,
        excludes: &HashSet<ItemId>,
    ) -> SkillLevel {
        self.technique_level(
            TechniqueBase {
                owner: skill.id,
                name: &skill.name,
                specialization: &skill.specialization,
                tags: &skill.tags,
                default: &technique.default,
                difficulty: skill.difficulty.difficulty,
                points: self.skill_adjusted_points(skill, None),
                require_points: true,
                limit: technique.limit,
            },
            excludes,
        )
    }

    /// Level measured from a default: every point above the first on a Hard
    /// technique, or every point on an Average one, adds a level. A limit
    /// caps the level at the base plus the limit.
    pub(super) fn technique_level(
        &self,
        base: TechniqueBase<'_>,
        excludes: &HashSet<ItemId>,
    ) -> SkillLevel {
        let mut tooltip = String::new();
        let default = base.default;
        let mut excludes = excludes.clone();
        excludes.insert(base.owner);

        let start = if default.default_type == DefaultType::Skill {
            self.best_skill_named(
                &default.name,
                &default.specialization,
                base.require_points,
                &excludes,
            )
            .and_then(|(_, level)| level.level)
        } else {
            self.default_level(default, true, &excludes, false, false)
                .map(|level| level - default.modifier)
        };
        let Some(start) = start else {
            return SkillLevel {
                level: None,
                relative_level: Fixed::ZERO,
                tooltip,
            };
        };

        let mut level = start + default.modifier;
        let mut points = base.points;
        if base.difficulty == Difficulty::Hard {
            points -= Fixed::ONE;
        }
        let mut relative = points.max(Fixed::ZERO);
        relative += self.skill_bonus_for(
            base.name,
            base.specialization,
            base.tags,
            Some(&mut tooltip),
        );
        level += relative;

        if let Some(limit) = base.limit {
            let max = start + limit;
            if level > max {
                relative -= level - max;
                level = max;
            }
        }
        SkillLevel {
            level: Some(level),
            relative_level: relative,
            tooltip,
        }
    }

    /// Level `default` grants, recalculating every candidate skill.
    pub fn default_skill_level(
        &self,
        default: &SkillDefault,
        require_points: bool,
        excludes: &HashSet<ItemId>,
        rule_of_20: bool,
    ) -> Option<Fixed> {
        self.default_level(default, require_points, excludes, rule_of_20, true)
    }

    /// Like [`Entity::default_skill_level`], reading candidates' levels from
    /// the last pass.
    pub fn default_skill_level_fast(
        &self,
        default: &SkillDefault,
        require_points: bool,
        excludes: &HashSet<ItemId>,
        rule_of_20: bool,
    ) -> Option<Fixed> {
        self.default_level(default, require_points, excludes, rule_of_20, false)
    }

    /// Level a default grants, modifier included. `full` recalculates the
    /// candidate skills instead of trusting their stored levels.
    fn default_level(
        &self,
        default: &SkillDefault,
        require_points: bool,
        excludes: &HashSet<ItemId>,
        rule_of_20: bool,
        full: bool,
    ) -> Option<Fixed> {
        let level = match &default.default_type {
            DefaultType::Skill => self.best_default_skill(default, require_points, excludes, full)?,
            DefaultType::Parry => {
                let best = self.best_default_skill(default, require_points, excludes, full)?;
                (best / Fixed::from(2)).trunc() + Fixed::from(3) + self.bonuses.parry
            }
            DefaultType::Block => {
                let best = self.best_default_skill(default, require_points, excludes, full)?;
                (best / Fixed::from(2)).trunc() + Fixed::from(3) + self.bonuses.block
            }
            DefaultType::Attribute(id) => {
                let mut level = self.attribute_current(id)?;
                if rule_of_20 {
                    level = level.min(Fixed::from(20));
                }
                if self.settings.use_half_stat_defaults {
                    level = (level / Fixed::from(2)).trunc() + Fixed::from(5);
                }
                level
            }
            DefaultType::Ten => Fixed::from(10),
        };
        Some(level + default.modifier)
    }

    fn best_default_skill(
        &self,
        default: &SkillDefault,
        require_points: bool,
        excludes: &HashSet<ItemId>,
        full: bool,
    ) -> Option<Fixed> {
        let mut best: Option<Fixed> = None;
        for skill in self.skills_named(&default.name, &default.specialization, require_points, excludes) {
            let level = if full {
                self.calculate_skill_level(skill, excludes).level
            } else {
                skill.level.level
            };
            best = best.max(level);
        }
        best
    }

    /// Defaults with skill-based entries expanded into one default per
    /// matching skill, each carrying that skill's specialization.
    fn specific_defaults(&self, skill: &Skill, excludes: &HashSet<ItemId>) -> Vec<SkillDefault> {
        let mut defaults = Vec::with_capacity(skill.defaults.len());
        for default in &skill.defaults {
            if !default.is_skill_based() {
                defaults.push(default.clone());
                continue;
            }
            for other in self.skills_named(&default.name, &default.specialization, true, excludes) {
                defaults.push(SkillDefault {
                    specialization: other.specialization.clone(),
                    ..default.clone()
                });
            }
        }
        defaults
    }

    /// Whether following `default` through other skills' chosen defaults
    /// leads back to `skill`.
    fn in_default_chain(
        &self,
        skill: ItemId,
        default: Option<&SkillDefault>,
        looked_at: &mut HashSet<ItemId>,
    ) -> bool {
        let Some(default) = default.filter(|d| d.is_skill_based()) else {
            return false;
        };
        for other in self.skills_named(&default.name, &default.specialization, true, &HashSet::new()) {
            if other.id == skill {
                return true;
            }
            if looked_at.insert(other.id)
                && self.in_default_chain(
                    skill,
                    other.defaulted_from.as_ref().map(|d| &d.default),
                    looked_at,
                )
            {
                return true;
            }
        }
        false
    }

    fn best_default(&self, skill: &Skill) -> Option<(SkillDefault, Fixed)> {
        if skill.is_technique() || skill.defaults.is_empty() {
            return None;
        }
        let excludes = HashSet::from([skill.id]);
        let mut best: Option<(SkillDefault, Fixed)> = None;
        for default in self.specific_defaults(skill, &excludes) {
            if self.in_default_chain(skill.id, Some(&default), &mut HashSet::new()) {
                continue;
            }
            let Some(mut level) = self.default_level(&default, true, &excludes, true, true) else {
                continue;
            };
            if default.default_type == DefaultType::Skill
                && self
                    .best_skill_named(&default.name, &default.specialization, true, &excludes)
                    .is_some()
            {
                level -= self.skill_bonus_for(&default.name, &default.specialization, &skill.tags, None);
            }
            if best.as_ref().is_none_or(|(_, top)| level > *top) {
                best = Some((default, level));
            }
        }
        best
    }

    /// The best default together with the points it is worth relative to
    /// buying the skill from its attribute.
    fn best_default_with_points(&self, skill: &Skill) -> Option<ResolvedDefault> {
        let (default, level) = self.best_default(skill)?;
        let attribute = self.attribute_current(&skill.difficulty.attribute)?;
        let baseline = (attribute + skill.difficulty.difficulty.base_relative_level()).trunc();
        let level = level.trunc();
        let points = if level == baseline {
            Fixed::ONE
        } else if level == baseline + Fixed::ONE {
            Fixed::from(2)
        } else if level > baseline + Fixed::ONE {
            Fixed::from(4) * (level - (baseline + Fixed::ONE))
        } else {
            -level.max(Fixed::ZERO)
        };
        Some(ResolvedDefault {
            default,
            level,
            adjusted_level: level,
            points,
        })
    }

    /// Re-derives each skill's default and level in tree order. Returns
    /// whether any level changed.
    pub(super) fn update_skills(&mut self) -> bool {
        let ids: Vec<ItemId> = node::leaves(&self.skills).map(Node::id).collect();
        let mut changed = false;
        for id in ids {
            let Some(skill) = node::find(&self.skills, id) else {
                continue;
            };
            let defaulted_from = self.best_default_with_points(skill);
            if let Some(skill) = node::find_mut(&mut self.skills, id) {
                skill.defaulted_from = defaulted_from;
            }
            let Some(skill) = node::find(&self.skills, id) else {
                continue;
            };
            let level = self.calculate_skill_level(skill, &HashSet::new());
            if let Some(skill) = node::find_mut(&mut self.skills, id) {
                changed |= skill.level.level != level.level
                    || skill.level.relative_level != level.relative_level;
                skill.level = level;
            }
        }
        changed
    }

    /// Techniques based on a skill need that skill, with points unless it is
    /// itself a technique.
    pub(super) fn technique_satisfied(&self, skill: &Skill, tooltip: &mut String, prefix: &str) -> bool {
        let Some(default) = skill
            .technique
            .as_ref()
            .map(|t| &t.default)
            .filter(|d| d.is_skill_based())
        else {
            return true;
        };
        let excludes = HashSet::from([skill.id]);
        let base = self.best_skill_named(&default.name, &default.specialization, false, &excludes);
        let satisfied = base
            .as_ref()
            .is_some_and(|(base, _)| base.is_technique() || base.points.is_positive());
        if !satisfied {
            tooltip.push_str(prefix);
            tooltip.push_str(if base.is_none() {
                "Requires a skill named "
            } else {
                "Requires at least 1 point in the skill named "
            });
            tooltip.push_str(&default.full_name());
        }
        satisfied
    }
}
