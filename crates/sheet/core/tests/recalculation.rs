//! End-to-end recalculation behavior across attributes, features, skills,
//! and prerequisites.

use sheet_core::feature::CostReduction;
use sheet_core::node;
use sheet_core::{
    AttributeDef, AttributeDefs, AttributeDifficulty, AttributeType, Difficulty, Entity, EntityData,
    Feature, Fixed, FormulaError, FormulaEvaluator, LeveledAmount, PoolThreshold, SheetSettings, Skill,
    SkillDefault, SkillLevel, ThresholdOps, Trait, VariableResolver,
};

/// Understands only numeric literals and a single `$variable`.
#[derive(Debug)]
struct LiteralEvaluator;

impl FormulaEvaluator for LiteralEvaluator {
    fn evaluate(&self, formula: &str, resolver: &dyn VariableResolver) -> Result<Fixed, FormulaError> {
        let formula = formula.trim();
        let text = match formula.strip_prefix('$') {
            Some(name) => resolver
                .resolve_variable(name)
                .ok_or_else(|| FormulaError::UnresolvedVariable(name.to_owned()))?,
            None => formula.to_owned(),
        };
        text.parse()
            .map_err(|_| FormulaError::UnexpectedToken(formula.to_owned()))
    }
}

fn literal_defs() -> AttributeDefs {
    let mut defs = AttributeDefs::new();
    defs.insert(AttributeDef::new("st", "ST", AttributeType::Integer, "10", 10));
    defs.insert(AttributeDef::new("dx", "DX", AttributeType::Integer, "10", 20));
    defs.insert(AttributeDef::new("luck", "Luck", AttributeType::Integer, "1 +", 5));
    defs.insert(
        AttributeDef::new("hp", "HP", AttributeType::Pool, "$st", 2).with_thresholds(vec![
            PoolThreshold::new("Down", "0", ThresholdOps::HALVE_MOVE),
            PoolThreshold::new("Hurt", "5", ThresholdOps::empty()),
            PoolThreshold::new("Fine", "$self", ThresholdOps::empty()),
        ]),
    );
    defs
}

fn literal_entity(data: EntityData) -> Entity {
    let settings = SheetSettings::default().with_attributes(literal_defs());
    Entity::with_evaluator(data, settings, Box::new(LiteralEvaluator))
}

fn level_of(entity: &Entity, name: &str) -> SkillLevel {
    node::leaves(&entity.skills)
        .find(|skill| skill.name == name)
        .map(|skill| skill.level.clone())
        .unwrap_or_default()
}

#[test]
fn stub_evaluator_drives_attributes_and_thresholds() {
    let mut entity = literal_entity(EntityData::default());
    assert_eq!(entity.attribute_maximum("hp"), Some(Fixed::from(10)));
    assert_eq!(entity.current_threshold("hp").map(|t| t.state.as_str()), Some("Fine"));
    // Unparseable formulas read as zero.
    assert_eq!(entity.attribute_maximum("luck"), Some(Fixed::ZERO));

    let damaged = |damage: i32| {
        let mut data = EntityData::default();
        data.attributes = sheet_core::Attributes::from_defs(&literal_defs());
        if let Some(hp) = data.attributes.get_mut("hp") {
            hp.damage = Fixed::from(damage);
        }
        literal_entity(data)
    };
    let state = |entity: &Entity| entity.current_threshold("hp").map(|t| t.state.clone());
    assert_eq!(state(&damaged(1)).as_deref(), Some("Fine"));
    assert_eq!(state(&damaged(5)).as_deref(), Some("Hurt"));
    assert_eq!(state(&damaged(10)).as_deref(), Some("Down"));
    assert_eq!(state(&damaged(25)).as_deref(), Some("Down"));
    assert!(damaged(10).is_threshold_op_met(ThresholdOps::HALVE_MOVE));
    assert!(!damaged(5).is_threshold_op_met(ThresholdOps::HALVE_MOVE));

    entity.traits.push(Trait::new("Fit", 5));
    entity.recalculate();
    assert_eq!(entity.spent_points(), Fixed::from(5));
}

#[test]
fn standard_hp_thresholds_are_ordered() {
    let state = |damage: i32| {
        let mut data = EntityData::default();
        data.attributes = sheet_core::Attributes::from_defs(&AttributeDefs::standard());
        if let Some(hp) = data.attributes.get_mut("hp") {
            hp.damage = Fixed::from(damage);
        }
        let entity = Entity::new(data, SheetSettings::default());
        entity
            .current_threshold("hp")
            .map(|t| t.state.clone())
            .unwrap_or_default()
    };
    assert_eq!(state(0), "Healthy");
    assert_eq!(state(1), "Wounded");
    assert_eq!(state(7), "Reeling");
    assert_eq!(state(10), "Collapse");
    assert_eq!(state(20), "Dying #1");
    assert_eq!(state(45), "Dying #3");
    assert_eq!(state(50), "Dying #4");
    assert_eq!(state(60), "Dead");
}

#[test]
fn recalculation_is_idempotent() {
    let born_climber = Trait::leveled("Born Climber", 2, 1).with_features(vec![Feature::skill_bonus(
        "Climbing",
        LeveledAmount::per_level(Fixed::ONE),
    )]);
    let data = EntityData {
        traits: vec![born_climber, Trait::new("Fit", 5)],
        skills: vec![
            Skill::new("Climbing", AttributeDifficulty::default(), 2),
            Skill::new("Stealth", AttributeDifficulty::default(), 0)
                .with_defaults(vec![SkillDefault::attribute("dx", -5), SkillDefault::skill("Climbing", "", -3)]),
        ],
        ..EntityData::default()
    };
    let mut entity = Entity::new(data, SheetSettings::default());
    let snapshot = |entity: &Entity| {
        (
            node::leaves(&entity.skills)
                .map(|s| s.level.clone())
                .collect::<Vec<_>>(),
            entity.attribute_current("st"),
            entity.spent_points(),
            entity.basic_lift(),
        )
    };
    let first = snapshot(&entity);
    entity.recalculate();
    entity.recalculate();
    assert_eq!(snapshot(&entity), first);
    assert_eq!(level_of(&entity, "Climbing").level, Some(Fixed::from(11)));
    // Climbing-3, less the bonus Climbing already carries.
    assert_eq!(level_of(&entity, "Stealth").level, Some(Fixed::from(7)));
}

#[test]
fn attribute_costs_round_and_clamp() {
    let mut defs = AttributeDefs::new();
    defs.insert(AttributeDef::new("st", "ST", AttributeType::Integer, "10", 10).with_sm_cost_adjustment(10));
    defs.insert(AttributeDef::new("will", "Will", AttributeType::Integer, "10", 3));
    let settings = SheetSettings::default().with_attributes(defs.clone());

    let mut attributes = sheet_core::Attributes::from_defs(&defs);
    if let Some(will) = attributes.get_mut("will") {
        will.adjustment = Fixed::from(2);
    }
    if let Some(st) = attributes.get_mut("st") {
        st.adjustment = Fixed::from(10);
    }
    let cheap = Trait::new("Giant Blood", 0).with_features(vec![Feature::CostReduction(CostReduction {
        attribute: "st".into(),
        percentage: Fixed::from(85),
    })]);
    let entity = Entity::new(
        EntityData {
            attributes,
            traits: vec![cheap],
            ..EntityData::default()
        },
        settings,
    );
    assert_eq!(entity.attribute_point_cost("will"), Some(Fixed::from(6)));
    // 85% off is clamped to 80%.
    assert_eq!(entity.attribute_point_cost("st"), Some(Fixed::from(20)));
}

#[test]
fn default_cycles_resolve() {
    let data = EntityData {
        skills: vec![
            Skill::new("Axe/Mace", AttributeDifficulty::new("dx", Difficulty::Average), 0)
                .with_defaults(vec![SkillDefault::skill("Broadsword", "", -4)]),
            Skill::new("Broadsword", AttributeDifficulty::new("dx", Difficulty::Average), 4)
                .with_defaults(vec![
                    SkillDefault::skill("Axe/Mace", "", -4),
                    SkillDefault::attribute("dx", -5),
                ]),
        ],
        ..EntityData::default()
    };
    let entity = Entity::new(data, SheetSettings::default());
    assert_eq!(level_of(&entity, "Broadsword").level, Some(Fixed::from(11)));
    assert_eq!(level_of(&entity, "Axe/Mace").level, Some(Fixed::from(7)));
}

#[test]
fn single_pass_cap_still_resolves_direct_values() {
    let settings = SheetSettings {
        max_recalc_iterations: 1,
        ..SheetSettings::default()
    };
    let entity = Entity::new(
        EntityData {
            skills: vec![Skill::new("Climbing", AttributeDifficulty::default(), 1)],
            ..EntityData::default()
        },
        settings,
    );
    assert_eq!(level_of(&entity, "Climbing").level, Some(Fixed::from(9)));
}

#[test]
fn fractional_trait_levels_can_truncate() {
    let climbing_at = |amount: LeveledAmount| {
        let mut knack = Trait::leveled("Climbing Knack", 5, 1)
            .with_features(vec![Feature::skill_bonus("Climbing", amount)]);
        knack.levels = Fixed::from_f64(1.5);
        let entity = Entity::new(
            EntityData {
                traits: vec![knack],
                skills: vec![Skill::new("Climbing", AttributeDifficulty::new("dx", Difficulty::Average), 4)],
                ..EntityData::default()
            },
            SheetSettings::default(),
        );
        level_of(&entity, "Climbing").level
    };
    let per_level = LeveledAmount::per_level(Fixed::from(2));
    // 11 + 3
    assert_eq!(climbing_at(per_level), Some(Fixed::from(14)));
    // 11 + 2
    assert_eq!(climbing_at(per_level.truncated()), Some(Fixed::from(13)));
}
