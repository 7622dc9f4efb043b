//! Pass-scoped collection of active bonuses.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use super::{
    AttributeBonus, BonusLimitation, CostReduction, DR_ALL, DrBonus, Feature, LeveledAmount,
    SkillBonus, SkillPointBonus, SkillSelection, SpellBonus, SpellMatch, SpellPointBonus,
    WeaponBonus, WeaponBonusKind, WeaponSelection,
};
use crate::attribute::MAX_COST_REDUCTION;
use crate::fixed::Fixed;
use crate::node::ItemId;

/// A bonus together with the item that granted it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Granted<T> {
    pub bonus: T,
    pub owner: ItemId,
}

/// Active bonuses grouped by kind, rebuilt from scratch every pass.
///
/// Reaction, conditional-modifier, and contained-weight features are not
/// collected here; the reports that need them walk the item trees directly.
#[derive(Clone, Debug, Default)]
pub struct FeatureSet {
    attribute: Vec<Granted<AttributeBonus>>,
    cost_reductions: Vec<Granted<CostReduction>>,
    dr: Vec<Granted<DrBonus>>,
    skill: Vec<Granted<SkillBonus>>,
    skill_point: Vec<Granted<SkillPointBonus>>,
    spell: Vec<Granted<SpellBonus>>,
    spell_point: Vec<Granted<SpellPointBonus>>,
    weapon: Vec<Granted<WeaponBonus>>,
    owners: BTreeMap<ItemId, String>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of collected bonuses of every kind.
    pub fn len(&self) -> usize {
        self.attribute.len()
            + self.cost_reductions.len()
            + self.dr.len()
            + self.skill.len()
            + self.skill_point.len()
            + self.spell.len()
            + self.spell_point.len()
            + self.weapon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Display name recorded for an owner, or an empty string.
    pub fn owner_name(&self, owner: ItemId) -> &str {
        self.owners.get(&owner).map_or("", String::as_str)
    }

    /// Collects one feature granted by `owner` at `level`.
    pub fn grant(&mut self, feature: &Feature, owner: ItemId, owner_name: &str, level: Fixed) {
        self.owners
            .entry(owner)
            .or_insert_with(|| owner_name.to_owned());
        match feature {
            Feature::AttributeBonus(bonus) => {
                let mut bonus = bonus.clone();
                bonus.amount.level = level;
                self.attribute.push(Granted { bonus, owner });
            }
            Feature::CostReduction(reduction) => self.cost_reductions.push(Granted {
                bonus: reduction.clone(),
                owner,
            }),
            Feature::DrBonus(bonus) => {
                let mut bonus = bonus.clone();
                bonus.amount.level = level;
                self.dr.push(Granted { bonus, owner });
            }
            Feature::SkillBonus(bonus) => {
                let mut bonus = bonus.clone();
                bonus.amount.level = level;
                self.skill.push(Granted { bonus, owner });
            }
            Feature::SkillPointBonus(bonus) => {
                let mut bonus = bonus.clone();
                bonus.amount.level = level;
                self.skill_point.push(Granted { bonus, owner });
            }
            Feature::SpellBonus(bonus) => {
                let mut bonus = bonus.clone();
                bonus.amount.level = level;
                self.spell.push(Granted { bonus, owner });
            }
            Feature::SpellPointBonus(bonus) => {
                let mut bonus = bonus.clone();
                bonus.amount.level = level;
                self.spell_point.push(Granted { bonus, owner });
            }
            Feature::WeaponBonus(bonus) => {
                let mut bonus = bonus.clone();
                bonus.amount.level = level;
                self.weapon.push(Granted { bonus, owner });
            }
            Feature::ReactionBonus(_)
            | Feature::ConditionalModifier(_)
            | Feature::ContainedWeightReduction { .. } => {}
            Feature::Unknown => {
                tracing::warn!(owner = owner_name, "skipping feature of unknown kind");
            }
        }
    }

    /// Adds a synthesized skill bonus, such as a missing-equipment penalty.
    pub fn push_skill_bonus(&mut self, bonus: SkillBonus, owner: ItemId, owner_name: &str) {
        self.owners
            .entry(owner)
            .or_insert_with(|| owner_name.to_owned());
        self.skill.push(Granted { bonus, owner });
    }

    /// Adds a synthesized spell bonus.
    pub fn push_spell_bonus(&mut self, bonus: SpellBonus, owner: ItemId, owner_name: &str) {
        self.owners
            .entry(owner)
            .or_insert_with(|| owner_name.to_owned());
        self.spell.push(Granted { bonus, owner });
    }

    fn note(&self, tooltip: Option<&mut String>, owner: ItemId, amount: &LeveledAmount, per: &str) {
        let Some(buffer) = tooltip else {
            return;
        };
        let adjusted = amount.adjusted_amount().to_signed_string();
        let name = self.owner_name(owner);
        if amount.per_level {
            let _ = write!(buffer, "\n{name} [{adjusted} ({})]", amount.format(per));
        } else {
            let _ = write!(buffer, "\n{name} [{adjusted}]");
        }
    }

    /// Total bonus to an attribute under one limitation.
    pub fn attribute_bonus_for(
        &self,
        attribute: &str,
        limitation: BonusLimitation,
        mut tooltip: Option<&mut String>,
    ) -> Fixed {
        let mut total = Fixed::ZERO;
        for granted in &self.attribute {
            let bonus = &granted.bonus;
            if bonus.limitation == limitation && bonus.attribute.eq_ignore_ascii_case(attribute) {
                total += bonus.amount.adjusted_amount();
                self.note(tooltip.as_deref_mut(), granted.owner, &bonus.amount, "level");
            }
        }
        total
    }

    /// Total cost reduction for an attribute, clamped to `0..=80` percent.
    pub fn cost_reduction_for(&self, attribute: &str) -> Fixed {
        let total: Fixed = self
            .cost_reductions
            .iter()
            .filter(|granted| granted.bonus.attribute.eq_ignore_ascii_case(attribute))
            .map(|granted| granted.bonus.percentage)
            .sum();
        total.clamp(Fixed::ZERO, Fixed::from(MAX_COST_REDUCTION))
    }

    /// Adds DR bonuses for a hit location into `dr`, keyed by lowercase
    /// specialization. Bonuses on the `all` location apply everywhere.
    pub fn dr_bonuses_for(
        &self,
        location: &str,
        mut tooltip: Option<&mut String>,
        dr: &mut BTreeMap<String, i32>,
    ) {
        for granted in &self.dr {
            let bonus = &granted.bonus;
            if bonus.location.eq_ignore_ascii_case(location)
                || bonus.location.eq_ignore_ascii_case(DR_ALL)
            {
                *dr.entry(bonus.specialization.to_lowercase()).or_default() +=
                    bonus.amount.adjusted_amount().as_i32();
                self.note(tooltip.as_deref_mut(), granted.owner, &bonus.amount, "level");
            }
        }
    }

    /// Total level bonus for skills selected by name.
    pub fn skill_bonus_for(
        &self,
        name: &str,
        specialization: &str,
        tags: &[String],
        mut tooltip: Option<&mut String>,
    ) -> Fixed {
        let mut total = Fixed::ZERO;
        for granted in &self.skill {
            let bonus = &granted.bonus;
            if bonus.selection == SkillSelection::SkillsWithName
                && bonus.matches(name, specialization, tags)
            {
                total += bonus.amount.adjusted_amount();
                self.note(tooltip.as_deref_mut(), granted.owner, &bonus.amount, "level");
            }
        }
        total
    }

    pub fn skill_point_bonus_for(
        &self,
        name: &str,
        specialization: &str,
        tags: &[String],
        mut tooltip: Option<&mut String>,
    ) -> Fixed {
        let mut total = Fixed::ZERO;
        for granted in &self.skill_point {
            let bonus = &granted.bonus;
            if bonus.name.matches(name)
                && bonus.specialization.matches(specialization)
                && bonus.tags.matches_list(tags)
            {
                total += bonus.amount.adjusted_amount();
                self.note(tooltip.as_deref_mut(), granted.owner, &bonus.amount, "level");
            }
        }
        total
    }

    /// Total spell level bonus of one match kind. `AllColleges` bonuses ignore
    /// the qualifier.
    pub fn spell_bonus_for(
        &self,
        matching: SpellMatch,
        qualifier: &str,
        tags: &[String],
        mut tooltip: Option<&mut String>,
    ) -> Fixed {
        let mut total = Fixed::ZERO;
        for granted in &self.spell {
            let bonus = &granted.bonus;
            if bonus.matching == matching
                && (matching == SpellMatch::AllColleges || bonus.name.matches(qualifier))
                && bonus.tags.matches_list(tags)
            {
                total += bonus.amount.adjusted_amount();
                self.note(tooltip.as_deref_mut(), granted.owner, &bonus.amount, "level");
            }
        }
        total
    }

    pub fn spell_point_bonus_for(
        &self,
        matching: SpellMatch,
        qualifier: &str,
        tags: &[String],
        mut tooltip: Option<&mut String>,
    ) -> Fixed {
        let mut total = Fixed::ZERO;
        for granted in &self.spell_point {
            let bonus = &granted.bonus;
            if bonus.matching == matching
                && (matching == SpellMatch::AllColleges || bonus.name.matches(qualifier))
                && bonus.tags.matches_list(tags)
            {
                total += bonus.amount.adjusted_amount();
                self.note(tooltip.as_deref_mut(), granted.owner, &bonus.amount, "level");
            }
        }
        total
    }

    /// Weapon bonuses for weapons using a skill at relative level `relative`.
    ///
    /// Returned copies are leveled: damage bonuses by `die_count`, every other
    /// kind by `levels`.
    #[allow(clippy::too_many_arguments)]
    pub fn weapon_bonuses_for_skill(
        &self,
        name: &str,
        specialization: &str,
        relative: Fixed,
        tags: &[String],
        die_count: i32,
        levels: Fixed,
        tooltip: Option<&mut String>,
    ) -> Vec<WeaponBonus> {
        self.leveled_weapon_bonuses(
            |bonus| {
                bonus.selection == WeaponSelection::WithRequiredSkill
                    && bonus.name.matches(name)
                    && bonus.specialization.matches(specialization)
                    && bonus.relative_level.matches(relative)
                    && bonus.tags.matches_list(tags)
            },
            die_count,
            levels,
            tooltip,
        )
    }

    /// Weapon bonuses for weapons selected by name and usage.
    pub fn named_weapon_bonuses_for(
        &self,
        name: &str,
        usage: &str,
        tags: &[String],
        die_count: i32,
        levels: Fixed,
        tooltip: Option<&mut String>,
    ) -> Vec<WeaponBonus> {
        self.leveled_weapon_bonuses(
            |bonus| {
                bonus.selection == WeaponSelection::WithName
                    && bonus.name.matches(name)
                    && bonus.usage.matches(usage)
                    && bonus.tags.matches_list(tags)
            },
            die_count,
            levels,
            tooltip,
        )
    }

    /// Skill bonuses that select weapons by name and usage.
    pub fn weapon_skill_bonuses_for(
        &self,
        name: &str,
        usage: &str,
        tags: &[String],
        mut tooltip: Option<&mut String>,
    ) -> Vec<SkillBonus> {
        let mut bonuses = Vec::new();
        for granted in &self.skill {
            let bonus = &granted.bonus;
            if bonus.selection == SkillSelection::WeaponsWithName
                && bonus.matches(name, usage, tags)
            {
                self.note(tooltip.as_deref_mut(), granted.owner, &bonus.amount, "level");
                bonuses.push(bonus.clone());
            }
        }
        bonuses
    }

    fn leveled_weapon_bonuses(
        &self,
        select: impl Fn(&WeaponBonus) -> bool,
        die_count: i32,
        levels: Fixed,
        mut tooltip: Option<&mut String>,
    ) -> Vec<WeaponBonus> {
        let mut bonuses = Vec::new();
        for granted in &self.weapon {
            if !select(&granted.bonus) {
                continue;
            }
            let mut bonus = granted.bonus.clone();
            let per = if bonus.kind == WeaponBonusKind::Damage {
                bonus.amount.level = Fixed::from(die_count);
                "die"
            } else {
                bonus.amount.level = levels;
                "level"
            };
            self.note(tooltip.as_deref_mut(), granted.owner, &bonus.amount, per);
            bonuses.push(bonus);
        }
        bonuses
    }
}
