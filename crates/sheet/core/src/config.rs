use crate::attribute::{AttributeDefs, DamageProgression};
use crate::measure::WeightUnits;

/// Ruleset options a character sheet is resolved under.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SheetSettings {
    pub damage_progression: DamageProgression,
    pub default_weight_units: WeightUnits,
    /// Attribute defaults use half the attribute plus five.
    pub use_half_stat_defaults: bool,
    /// Attribute costs round toward negative infinity instead of up.
    pub round_cost_down: bool,
    /// Upper bound on feature/prerequisite passes per recalculation.
    pub max_recalc_iterations: u32,
    /// Attribute definitions characters under these settings use.
    pub attributes: AttributeDefs,
}

impl SheetSettings {
    pub const DEFAULT_MAX_RECALC_ITERATIONS: u32 = 5;

    pub fn new() -> Self {
        Self {
            damage_progression: DamageProgression::BasicSet,
            default_weight_units: WeightUnits::Pound,
            use_half_stat_defaults: false,
            round_cost_down: false,
            max_recalc_iterations: Self::DEFAULT_MAX_RECALC_ITERATIONS,
            attributes: AttributeDefs::standard(),
        }
    }

    #[must_use]
    pub fn with_damage_progression(mut self, progression: DamageProgression) -> Self {
        self.damage_progression = progression;
        self
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: AttributeDefs) -> Self {
        self.attributes = attributes;
        self
    }
}

impl Default for SheetSettings {
    fn default() -> Self {
        Self::new()
    }
}
