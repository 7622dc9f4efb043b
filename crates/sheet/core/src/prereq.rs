//! Prerequisites: boolean trees tested against the whole character.
//!
//! A [`Prereq`] is either a [`PrereqList`] combining children with ALL/ANY, or
//! a leaf test. Every leaf carries `has`, which inverts its raw result. When a
//! tooltip buffer is supplied, unsatisfied tests append `prefix` followed by an
//! explanation; the buffer never changes the result.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::criteria::{NumericCompare, NumericCriteria, StringCriteria, WeightCriteria};
use crate::entity::Entity;
use crate::equipment::Equipment;
use crate::fixed::Fixed;
use crate::node::{self, ItemId, Node};
use crate::skill::Skill;
use crate::spell::Spell;
use crate::traits::Trait;

/// The item whose prerequisites are being tested.
#[derive(Clone, Copy, Debug)]
pub enum PrereqSubject<'a> {
    Trait(&'a Trait),
    Skill(&'a Skill),
    Spell(&'a Spell),
    Equipment(&'a Equipment),
}

impl PrereqSubject<'_> {
    pub fn id(&self) -> ItemId {
        match self {
            Self::Trait(t) => t.id,
            Self::Skill(s) => s.id,
            Self::Spell(s) => s.id,
            Self::Equipment(e) => e.id,
        }
    }

    /// Tech level of the subject, when it is tech-level dependent.
    pub fn tech_level(&self) -> Option<&str> {
        match self {
            Self::Skill(s) => s.tech_level.as_deref(),
            Self::Spell(s) => s.tech_level.as_deref(),
            Self::Trait(_) | Self::Equipment(_) => None,
        }
    }
}

fn has_text(has: bool) -> &'static str {
    if has { "Has" } else { "Does not have" }
}

#[cfg(feature = "serde")]
const fn default_has() -> bool {
    true
}

/// Children combined with ALL or ANY.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PrereqList {
    pub all: bool,
    /// The list only applies when the character's tech level matches.
    pub when_tl: NumericCriteria,
    pub prereqs: Vec<Prereq>,
}

impl Default for PrereqList {
    fn default() -> Self {
        Self {
            all: true,
            when_tl: NumericCriteria::any(),
            prereqs: Vec::new(),
        }
    }
}

impl PrereqList {
    pub fn all_of(prereqs: Vec<Prereq>) -> Self {
        Self {
            prereqs,
            ..Self::default()
        }
    }

    pub fn any_of(prereqs: Vec<Prereq>) -> Self {
        Self {
            all: false,
            prereqs,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.prereqs.is_empty()
    }

    pub fn satisfied(
        &self,
        entity: &Entity,
        subject: PrereqSubject<'_>,
        tooltip: Option<&mut String>,
        prefix: &str,
        equipment_penalty: &mut bool,
    ) -> bool {
        if self.when_tl.compare != NumericCompare::Any {
            let tl = leading_integer(&entity.profile.tech_level);
            if !self.when_tl.matches(Fixed::from(tl)) {
                return true;
            }
        }

        let nested_prefix = format!("\n  {}", prefix.trim_start_matches('\n'));
        let mut local = tooltip.is_some().then(String::new);
        let mut count = 0;
        for prereq in &self.prereqs {
            if prereq.satisfied(entity, subject, local.as_mut(), &nested_prefix, equipment_penalty) {
                count += 1;
            }
        }

        let total = self.prereqs.len();
        let satisfied = count == total || (!self.all && count > 0);
        if !satisfied && let (Some(buffer), Some(local)) = (tooltip, local) {
            buffer.push_str(prefix);
            buffer.push_str(if self.all {
                "Requires all of:"
            } else {
                "Requires at least one of:"
            });
            buffer.push_str(&local);
        }
        satisfied
    }
}

/// Reads the first run of digits, e.g. `3` from `TL3^`. Zero when absent.
fn leading_integer(text: &str) -> i64 {
    text.chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .try_fold(0_i64, |acc, c| {
            acc.checked_mul(10)?.checked_add(i64::from(c.to_digit(10)?))
        })
        .unwrap_or(0)
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TraitPrereq {
    #[cfg_attr(feature = "serde", serde(default = "default_has"))]
    pub has: bool,
    pub name: StringCriteria,
    pub level: NumericCriteria,
    pub notes: StringCriteria,
}

impl Default for TraitPrereq {
    fn default() -> Self {
        Self {
            has: true,
            name: StringCriteria::is(""),
            level: NumericCriteria::any(),
            notes: StringCriteria::any(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AttributePrereq {
    #[cfg_attr(feature = "serde", serde(default = "default_has"))]
    pub has: bool,
    pub which: String,
    pub combined_with: Option<String>,
    pub qualifier: NumericCriteria,
}

impl Default for AttributePrereq {
    fn default() -> Self {
        Self {
            has: true,
            which: crate::attribute::ids::STRENGTH.to_owned(),
            combined_with: None,
            qualifier: NumericCriteria::at_least(10),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContainedQuantityPrereq {
    #[cfg_attr(feature = "serde", serde(default = "default_has"))]
    pub has: bool,
    pub qualifier: NumericCriteria,
}

impl Default for ContainedQuantityPrereq {
    fn default() -> Self {
        Self {
            has: true,
            qualifier: NumericCriteria::new(NumericCompare::AtMost, 1),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContainedWeightPrereq {
    #[cfg_attr(feature = "serde", serde(default = "default_has"))]
    pub has: bool,
    pub qualifier: WeightCriteria,
}

impl Default for ContainedWeightPrereq {
    fn default() -> Self {
        Self {
            has: true,
            qualifier: WeightCriteria::new(
                NumericCompare::AtMost,
                crate::measure::Weight::from_pounds(Fixed::from(5)),
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EquippedEquipmentPrereq {
    pub name: StringCriteria,
    pub tags: StringCriteria,
}

impl Default for EquippedEquipmentPrereq {
    fn default() -> Self {
        Self {
            name: StringCriteria::is(""),
            tags: StringCriteria::any(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SkillPrereq {
    #[cfg_attr(feature = "serde", serde(default = "default_has"))]
    pub has: bool,
    pub name: StringCriteria,
    pub specialization: StringCriteria,
    pub level: NumericCriteria,
}

impl Default for SkillPrereq {
    fn default() -> Self {
        Self {
            has: true,
            name: StringCriteria::is(""),
            specialization: StringCriteria::any(),
            level: NumericCriteria::any(),
        }
    }
}

/// How a spell prerequisite counts spells.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SpellPrereqKind {
    #[default]
    Name,
    Tag,
    College,
    CollegeCount,
    Any,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpellPrereq {
    #[cfg_attr(feature = "serde", serde(default = "default_has"))]
    pub has: bool,
    pub sub_type: SpellPrereqKind,
    pub qualifier: StringCriteria,
    pub quantity: NumericCriteria,
}

impl Default for SpellPrereq {
    fn default() -> Self {
        Self {
            has: true,
            sub_type: SpellPrereqKind::Name,
            qualifier: StringCriteria::is(""),
            quantity: NumericCriteria::at_least(1),
        }
    }
}

/// A prerequisite node.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Prereq {
    List(PrereqList),
    Trait(TraitPrereq),
    Attribute(AttributePrereq),
    ContainedQuantity(ContainedQuantityPrereq),
    ContainedWeight(ContainedWeightPrereq),
    EquippedEquipment(EquippedEquipmentPrereq),
    Skill(SkillPrereq),
    Spell(SpellPrereq),
    /// A kind this build does not know. Treated as satisfied.
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

impl Prereq {
    pub fn satisfied(
        &self,
        entity: &Entity,
        subject: PrereqSubject<'_>,
        tooltip: Option<&mut String>,
        prefix: &str,
        equipment_penalty: &mut bool,
    ) -> bool {
        match self {
            Self::List(list) => list.satisfied(entity, subject, tooltip, prefix, equipment_penalty),
            Self::Trait(p) => p.satisfied(entity, subject, tooltip, prefix),
            Self::Attribute(p) => p.satisfied(entity, tooltip, prefix),
            Self::ContainedQuantity(p) => p.satisfied(subject, tooltip, prefix),
            Self::ContainedWeight(p) => p.satisfied(subject, tooltip, prefix),
            Self::EquippedEquipment(p) => {
                let satisfied = p.satisfied(entity, tooltip, prefix);
                if !satisfied {
                    *equipment_penalty = true;
                }
                satisfied
            }
            Self::Skill(p) => p.satisfied(entity, subject, tooltip, prefix),
            Self::Spell(p) => p.satisfied(entity, subject, tooltip, prefix),
            Self::Unknown => {
                tracing::warn!(subject = %subject.id(), "ignoring prerequisite of unknown kind");
                true
            }
        }
    }
}

impl TraitPrereq {
    fn satisfied(
        &self,
        entity: &Entity,
        subject: PrereqSubject<'_>,
        tooltip: Option<&mut String>,
        prefix: &str,
    ) -> bool {
        let exclude = subject.id();
        let found = node::walk_enabled(&entity.traits).any(|t| {
            t.id != exclude
                && self.name.matches(&t.name)
                && self.notes.matches(&t.notes)
                && self.level.matches(t.current_level())
        });
        let satisfied = found == self.has;
        if !satisfied && let Some(buffer) = tooltip {
            let _ = write!(
                buffer,
                "{prefix}{} a trait whose name {}",
                has_text(self.has),
                self.name.describe()
            );
            if self.notes.compare != crate::criteria::StringCompare::Any {
                let _ = write!(buffer, ", notes {}", self.notes.describe());
            }
            if self.level.compare != NumericCompare::Any {
                let _ = write!(buffer, ", and level {}", self.level.describe());
            }
        }
        satisfied
    }
}

impl AttributePrereq {
    fn satisfied(&self, entity: &Entity, tooltip: Option<&mut String>, prefix: &str) -> bool {
        let mut value = entity.attribute_current(&self.which).unwrap_or(Fixed::ZERO);
        if let Some(other) = &self.combined_with {
            value += entity.attribute_current(other).unwrap_or(Fixed::ZERO);
        }
        let satisfied = self.qualifier.matches(value) == self.has;
        if !satisfied && let Some(buffer) = tooltip {
            let _ = write!(
                buffer,
                "{prefix}{} {}",
                has_text(self.has),
                entity.attribute_name(&self.which)
            );
            if let Some(other) = &self.combined_with {
                let _ = write!(buffer, " combined with {}", entity.attribute_name(other));
            }
            let _ = write!(buffer, " which is {}", self.qualifier.describe());
        }
        satisfied
    }
}

impl ContainedQuantityPrereq {
    fn satisfied(&self, subject: PrereqSubject<'_>, tooltip: Option<&mut String>, prefix: &str) -> bool {
        let matches = match subject {
            PrereqSubject::Equipment(equipment) if equipment.is_container() => {
                let quantity: Fixed = node::leaves(&equipment.children)
                    .map(|child| child.quantity)
                    .sum();
                self.qualifier.matches(quantity)
            }
            PrereqSubject::Equipment(_) => true,
            _ => false,
        };
        let satisfied = matches == self.has;
        if !satisfied && let Some(buffer) = tooltip {
            let _ = write!(
                buffer,
                "{prefix}{} a contained quantity which is {}",
                has_text(self.has),
                self.qualifier.describe()
            );
        }
        satisfied
    }
}

impl ContainedWeightPrereq {
    fn satisfied(&self, subject: PrereqSubject<'_>, tooltip: Option<&mut String>, prefix: &str) -> bool {
        let matches = match subject {
            PrereqSubject::Equipment(equipment) if equipment.is_container() => {
                self.qualifier.matches(equipment.contained_weight(false))
            }
            PrereqSubject::Equipment(_) => true,
            _ => false,
        };
        let satisfied = matches == self.has;
        if !satisfied && let Some(buffer) = tooltip {
            let _ = write!(
                buffer,
                "{prefix}{} a contained weight which is {}",
                has_text(self.has),
                self.qualifier.describe()
            );
        }
        satisfied
    }
}

impl EquippedEquipmentPrereq {
    fn satisfied(&self, entity: &Entity, tooltip: Option<&mut String>, prefix: &str) -> bool {
        let satisfied = node::walk(&entity.carried_equipment).any(|item| {
            item.equipped
                && item.quantity.is_positive()
                && self.name.matches(&item.name)
                && self.tags.matches_list(&item.tags)
        });
        if !satisfied && let Some(buffer) = tooltip {
            let _ = write!(
                buffer,
                "{prefix}Has equipment which is equipped and whose name {}",
                self.name.describe()
            );
            if self.tags.compare != crate::criteria::StringCompare::Any {
                let _ = write!(buffer, ", and at least one tag {}", self.tags.describe());
            }
        }
        satisfied
    }
}

impl SkillPrereq {
    fn satisfied(
        &self,
        entity: &Entity,
        subject: PrereqSubject<'_>,
        tooltip: Option<&mut String>,
        prefix: &str,
    ) -> bool {
        let exclude = subject.id();
        let tech_level = subject.tech_level();
        let found = node::leaves(&entity.skills).any(|skill| {
            skill.id != exclude
                && self.name.matches(&skill.name)
                && self.specialization.matches(&skill.specialization)
                && self.level.matches(skill.level.level.unwrap_or(Fixed::MIN))
                && tech_level.is_none_or(|tl| skill.tech_level.as_deref().is_none_or(|own| own == tl))
        });
        let satisfied = found == self.has;
        if !satisfied && let Some(buffer) = tooltip {
            let _ = write!(
                buffer,
                "{prefix}{} a skill whose name {}",
                has_text(self.has),
                self.name.describe()
            );
            if self.specialization.compare != crate::criteria::StringCompare::Any {
                let _ = write!(buffer, ", specialization {}", self.specialization.describe());
            }
            if self.level.compare != NumericCompare::Any {
                let _ = write!(buffer, ", and level {}", self.level.describe());
            }
            if let Some(tl) = tech_level {
                let _ = write!(buffer, ", at tech level {tl}");
            }
        }
        satisfied
    }
}

impl SpellPrereq {
    fn satisfied(
        &self,
        entity: &Entity,
        subject: PrereqSubject<'_>,
        tooltip: Option<&mut String>,
        prefix: &str,
    ) -> bool {
        let exclude = subject.id();
        let tech_level = subject.tech_level();
        let mut count = 0_i64;
        let mut colleges = BTreeSet::new();
        for spell in node::leaves(&entity.spells) {
            if spell.id == exclude || !spell.points.is_positive() {
                continue;
            }
            if let Some(tl) = tech_level
                && spell.tech_level.as_deref().is_some_and(|own| own != tl)
            {
                continue;
            }
            match self.sub_type {
                SpellPrereqKind::Name => {
                    if self.qualifier.matches(&spell.name) {
                        count += 1;
                    }
                }
                SpellPrereqKind::Tag => {
                    if self.qualifier.matches_list(&spell.tags) {
                        count += 1;
                    }
                }
                SpellPrereqKind::College => {
                    if self.qualifier.matches_list(&spell.college) {
                        count += 1;
                    }
                }
                SpellPrereqKind::CollegeCount => {
                    colleges.extend(spell.college.iter().map(|c| c.to_lowercase()));
                }
                SpellPrereqKind::Any => count += 1,
            }
        }
        if self.sub_type == SpellPrereqKind::CollegeCount {
            count = colleges.len() as i64;
        }

        let satisfied = self.quantity.matches(Fixed::from_i64(count)) == self.has;
        if !satisfied && let Some(buffer) = tooltip {
            let has = has_text(self.has);
            let quantity = self.quantity.describe();
            let noun = if self.quantity.qualifier == Fixed::ONE { "spell" } else { "spells" };
            let qualifier = self.qualifier.describe();
            let _ = match self.sub_type {
                SpellPrereqKind::Name => {
                    write!(buffer, "{prefix}{has} {quantity} {noun} whose name {qualifier}")
                }
                SpellPrereqKind::Tag => {
                    write!(buffer, "{prefix}{has} {quantity} {noun} with a tag which {qualifier}")
                }
                SpellPrereqKind::College => {
                    write!(buffer, "{prefix}{has} {quantity} {noun} whose college {qualifier}")
                }
                SpellPrereqKind::CollegeCount => {
                    write!(buffer, "{prefix}{has} a college count which is {quantity}")
                }
                SpellPrereqKind::Any => write!(buffer, "{prefix}{has} {quantity} {noun} of any kind"),
            };
        }
        satisfied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_integer_skips_prefix() {
        assert_eq!(leading_integer("TL8"), 8);
        assert_eq!(leading_integer("3^"), 3);
        assert_eq!(leading_integer(""), 0);
    }

    #[test]
    fn contained_quantity_inverts_for_every_subject() {
        use crate::measure::Weight;

        let quiver = Equipment::container(
            "Quiver",
            Weight::ZERO,
            vec![Equipment::new("Arrow", 3, Weight::ZERO)],
        );
        let arrow = Equipment::new("Arrow", 1, Weight::ZERO);
        let skill = Skill::default();
        let at_most_one = ContainedQuantityPrereq::default();
        let lacks_at_most_one = ContainedQuantityPrereq {
            has: false,
            ..ContainedQuantityPrereq::default()
        };

        assert!(!at_most_one.satisfied(PrereqSubject::Equipment(&quiver), None, ""));
        assert!(lacks_at_most_one.satisfied(PrereqSubject::Equipment(&quiver), None, ""));
        assert!(at_most_one.satisfied(PrereqSubject::Equipment(&arrow), None, ""));
        assert!(!lacks_at_most_one.satisfied(PrereqSubject::Equipment(&arrow), None, ""));
        assert!(!at_most_one.satisfied(PrereqSubject::Skill(&skill), None, ""));
        assert!(lacks_at_most_one.satisfied(PrereqSubject::Skill(&skill), None, ""));

        let mut tooltip = String::new();
        lacks_at_most_one.satisfied(PrereqSubject::Equipment(&arrow), Some(&mut tooltip), "\n");
        assert_eq!(tooltip, "\nDoes not have a contained quantity which is at most 1");
    }

    #[test]
    fn contained_weight_on_a_plain_item_matches_trivially() {
        use crate::measure::Weight;

        let stone = Equipment::new("Stone", 1, Weight::from_pounds(Fixed::from(50)));
        let lacks = ContainedWeightPrereq {
            has: false,
            ..ContainedWeightPrereq::default()
        };
        assert!(ContainedWeightPrereq::default().satisfied(PrereqSubject::Equipment(&stone), None, ""));
        assert!(!lacks.satisfied(PrereqSubject::Equipment(&stone), None, ""));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn has_defaults_to_true_when_omitted() {
        let prereq: ContainedQuantityPrereq = serde_json::from_str("{}").expect("valid prereq");
        assert!(prereq.has);
    }
}
