//! The character sheet and its recalculation loop.
//!
//! [`Entity`] owns every item tree plus the settings it is resolved under.
//! [`Entity::recalculate`] brings all computed values (attribute bonuses,
//! skill and spell levels, unsatisfied prerequisites) to a fixed point:
//! features feed skill levels, skill levels feed features and prerequisites,
//! so the loop repeats until neither skills nor spells change or the
//! iteration cap in [`SheetSettings`] is reached.
//!
//! Everything else on `Entity` is a read-only query that is meaningful after
//! a recalculation. Queries memoize a few values (basic lift, encumbrance,
//! resolved variables) in interior caches, which is why an `Entity` is not
//! `Sync`.

mod bonuses;
pub mod data;
mod derived;
pub mod index;
mod points;
mod prereqs;
mod reactions;
mod resolver;
mod skills;
mod spells;

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

pub use data::{EntityData, Profile};
pub use index::{IndexedItem, ItemIndex, ItemKind};
pub use points::PointsBreakdown;
pub use reactions::ConditionalModifier;

use crate::attribute::Attributes;
use crate::config::SheetSettings;
use crate::encumbrance::Encumbrance;
use crate::equipment::Equipment;
use crate::feature::FeatureSet;
use crate::fixed::Fixed;
use crate::formula::{ExpressionEvaluator, FormulaEvaluator};
use crate::measure::Weight;
use crate::skill::Skill;
use crate::spell::Spell;
use crate::traits::Trait;

/// Scalar bonuses pulled out of the feature set once per pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CombatBonuses {
    pub lifting_st: Fixed,
    pub striking_st: Fixed,
    pub throwing_st: Fixed,
    pub dodge: Fixed,
    pub parry: Fixed,
    pub block: Fixed,
}

#[derive(Debug, Default)]
struct Caches {
    basic_lift: Cell<Option<Weight>>,
    encumbrance: Cell<Option<Encumbrance>>,
    encumbrance_for_skills: Cell<Option<Encumbrance>>,
    variables: RefCell<HashMap<String, String>>,
    /// Variables currently being resolved; guards against self-reference.
    resolving: RefCell<HashSet<String>>,
}

impl Caches {
    fn clear(&self) {
        self.basic_lift.set(None);
        self.encumbrance.set(None);
        self.encumbrance_for_skills.set(None);
        self.variables.borrow_mut().clear();
        self.resolving.borrow_mut().clear();
    }
}

#[derive(Debug)]
pub struct Entity {
    pub profile: Profile,
    pub settings: SheetSettings,
    pub total_points: Fixed,
    pub attributes: Attributes,
    pub traits: Vec<Trait>,
    pub skills: Vec<Skill>,
    pub spells: Vec<Spell>,
    pub carried_equipment: Vec<Equipment>,
    pub other_equipment: Vec<Equipment>,
    pub notes: Vec<String>,
    evaluator: Box<dyn FormulaEvaluator>,
    index: ItemIndex,
    features: FeatureSet,
    bonuses: CombatBonuses,
    caches: Caches,
}

impl Entity {
    /// Builds a character under `settings` and recalculates it.
    ///
    /// Attributes are synchronized with the settings' definitions: unknown
    /// ids are dropped, missing ones are added at their base value.
    pub fn new(data: EntityData, settings: SheetSettings) -> Self {
        Self::with_evaluator(data, settings, Box::new(ExpressionEvaluator))
    }

    /// Like [`Entity::new`] with a custom formula evaluator.
    pub fn with_evaluator(
        data: EntityData,
        settings: SheetSettings,
        evaluator: Box<dyn FormulaEvaluator>,
    ) -> Self {
        let EntityData {
            profile,
            total_points,
            mut attributes,
            traits,
            skills,
            spells,
            carried_equipment,
            other_equipment,
            notes,
        } = data;
        attributes.sync_with(&settings.attributes);
        let mut entity = Self {
            profile,
            settings,
            total_points,
            attributes,
            traits,
            skills,
            spells,
            carried_equipment,
            other_equipment,
            notes,
            evaluator,
            index: ItemIndex::default(),
            features: FeatureSet::new(),
            bonuses: CombatBonuses::default(),
            caches: Caches::default(),
        };
        entity.recalculate();
        entity
    }

    /// Authored data, without anything computed.
    pub fn to_data(&self) -> EntityData {
        EntityData {
            profile: self.profile.clone(),
            total_points: self.total_points,
            attributes: self.attributes.clone(),
            traits: self.traits.clone(),
            skills: self.skills.clone(),
            spells: self.spells.clone(),
            carried_equipment: self.carried_equipment.clone(),
            other_equipment: self.other_equipment.clone(),
            notes: self.notes.clone(),
        }
    }

    pub fn evaluator(&self) -> &dyn FormulaEvaluator {
        self.evaluator.as_ref()
    }

    /// Bonuses collected by the last pass.
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    pub fn combat_bonuses(&self) -> CombatBonuses {
        self.bonuses
    }

    pub fn index(&self) -> &ItemIndex {
        &self.index
    }

    /// Drops memoized basic lift, encumbrance, and variable values.
    pub fn discard_caches(&self) {
        self.caches.clear();
    }

    /// Brings every computed value up to date.
    pub fn recalculate(&mut self) {
        self.index = ItemIndex::build(
            &self.traits,
            &self.skills,
            &self.spells,
            [&self.carried_equipment, &self.other_equipment],
        );
        self.discard_caches();
        self.update_skills();
        self.update_spells();

        let cap = self.settings.max_recalc_iterations.max(1);
        for pass in 1..=cap {
            self.process_features();
            self.process_prereqs();
            let skills_changed = self.update_skills();
            let spells_changed = self.update_spells();
            if !skills_changed && !spells_changed {
                debug!(pass, items = self.index.len(), "recalculation converged");
                return;
            }
            debug!(pass, skills_changed, spells_changed, "recalculation pass changed levels");
        }
        warn!(cap, "recalculation stopped at the iteration cap without converging");
    }
}
