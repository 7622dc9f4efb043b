//! Attribute and feature resolution for point-buy character sheets.
//!
//! `sheet-core` turns authored character data (attributes, traits, skills,
//! spells, equipment) into resolved values: attribute maxima and pools,
//! skill and spell levels, encumbrance, lifting and striking figures, point
//! totals, and prerequisite explanations. It performs no I/O. Definitions
//! arrive as values (optionally deserialized with the `serde` feature) and
//! formulas are evaluated through the [`formula::FormulaEvaluator`] seam.
//!
//! All resolution flows through [`entity::Entity::recalculate`]; everything
//! else on an entity is a query over the last recalculation.
pub mod attribute;
pub mod config;
pub mod criteria;
pub mod dice;
pub mod encumbrance;
pub mod entity;
pub mod equipment;
pub mod error;
pub mod feature;
pub mod fixed;
pub mod formula;
pub mod measure;
pub mod node;
pub mod prereq;
pub mod skill;
pub mod spell;
pub mod traits;

pub use attribute::{
    Attribute, AttributeDef, AttributeDefs, AttributeType, Attributes, DamageProgression,
    PoolThreshold, ThresholdOps,
};
pub use config::SheetSettings;
pub use criteria::{NumericCompare, NumericCriteria, StringCompare, StringCriteria, WeightCriteria};
pub use dice::Dice;
pub use encumbrance::Encumbrance;
pub use entity::{
    CombatBonuses, ConditionalModifier, Entity, EntityData, ItemIndex, ItemKind, PointsBreakdown,
    Profile,
};
pub use equipment::{CostAdjustment, Equipment, EquipmentModifier, WeightAdjustment};
pub use error::{ErrorSeverity, FormulaError, SheetError};
pub use feature::{Feature, FeatureSet, LeveledAmount};
pub use fixed::Fixed;
pub use formula::{ExpressionEvaluator, FormulaEvaluator, NoVariables, VariableResolver};
pub use measure::{Weight, WeightUnits};
pub use node::{ItemId, Node};
pub use prereq::{Prereq, PrereqList, PrereqSubject};
pub use skill::{
    AttributeDifficulty, DefaultType, Difficulty, Skill, SkillDefault, SkillLevel, Technique,
};
pub use spell::{RitualMagic, Spell};
pub use traits::{ContainerKind, Trait, TraitModifier};
