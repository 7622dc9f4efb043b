//! Pool thresholds such as "Reeling" or "Tired".

use bitflags::bitflags;

use crate::fixed::Fixed;
use crate::formula::{FormulaEvaluator, SelfResolver, VariableResolver, evaluate_to_number};

bitflags! {
    /// Effects that switch on while a pool sits at or below a threshold.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct ThresholdOps: u8 {
        const HALVE_MOVE = 0b001;
        const HALVE_DODGE = 0b010;
        const HALVE_ST = 0b100;
    }
}

/// A named boundary on a pool's current value.
///
/// `expression` may use `$self` for the pool's maximum.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolThreshold {
    pub state: String,
    pub explanation: String,
    pub expression: String,
    pub ops: ThresholdOps,
}

impl PoolThreshold {
    pub fn new(state: impl Into<String>, expression: impl Into<String>, ops: ThresholdOps) -> Self {
        Self {
            state: state.into(),
            explanation: String::new(),
            expression: expression.into(),
            ops,
        }
    }

    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    /// Evaluates the boundary for a pool whose maximum is `maximum`.
    pub fn threshold(
        &self,
        maximum: Fixed,
        evaluator: &dyn FormulaEvaluator,
        resolver: &dyn VariableResolver,
    ) -> Fixed {
        let resolver = SelfResolver {
            value: maximum,
            inner: resolver,
        };
        evaluate_to_number(evaluator, &self.expression, &resolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{ExpressionEvaluator, NoVariables};

    #[test]
    fn threshold_is_relative_to_maximum() {
        let reeling = PoolThreshold::new(
            "Reeling",
            "round($self / 3)",
            ThresholdOps::HALVE_MOVE | ThresholdOps::HALVE_DODGE,
        );
        // round(11 / 3) = round(3.6666) = 4
        assert_eq!(
            reeling.threshold(Fixed::from(11), &ExpressionEvaluator, &NoVariables),
            Fixed::from(4)
        );
        assert!(reeling.ops.contains(ThresholdOps::HALVE_DODGE));
        assert!(!reeling.ops.contains(ThresholdOps::HALVE_ST));
    }
}
