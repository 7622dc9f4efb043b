//! Formula strings embedded in definitions.
//!
//! Attribute base values, pool thresholds, and a few amounts are authored as
//! small expressions such as `floor(($dx + $ht) / 4)`. Variables (`$name`) are
//! looked up through a [`VariableResolver`]; the character sheet itself is the
//! usual resolver.
//!
//! Evaluation sits behind the [`FormulaEvaluator`] trait so callers can swap
//! in a deterministic stub. [`evaluate_to_number`] is the total entry point
//! used by the engine: failures are logged and read as zero.

pub mod evaluate;
pub mod parse;

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{FormulaError, SheetError};
use crate::fixed::Fixed;

pub use parse::Expr;

/// Supplies values for `$name` references.
pub trait VariableResolver {
    /// Returns the textual value of a variable, or `None` when it is unknown.
    fn resolve_variable(&self, name: &str) -> Option<String>;
}

impl VariableResolver for BTreeMap<String, Fixed> {
    fn resolve_variable(&self, name: &str) -> Option<String> {
        self.get(name).map(Fixed::to_string)
    }
}

/// Resolver with no variables at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoVariables;

impl VariableResolver for NoVariables {
    fn resolve_variable(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Evaluates formula strings.
pub trait FormulaEvaluator: fmt::Debug {
    fn evaluate(
        &self,
        formula: &str,
        resolver: &dyn VariableResolver,
    ) -> Result<Fixed, FormulaError>;
}

/// The built-in expression language.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExpressionEvaluator;

impl FormulaEvaluator for ExpressionEvaluator {
    fn evaluate(
        &self,
        formula: &str,
        resolver: &dyn VariableResolver,
    ) -> Result<Fixed, FormulaError> {
        let expr = parse::parse(formula)?;
        evaluate::evaluate(&expr, resolver)
    }
}

/// Evaluates a formula, reading any failure as zero.
///
/// Blank formulas are zero without a warning.
pub fn evaluate_to_number(
    evaluator: &dyn FormulaEvaluator,
    formula: &str,
    resolver: &dyn VariableResolver,
) -> Fixed {
    if formula.trim().is_empty() {
        return Fixed::ZERO;
    }
    match evaluator.evaluate(formula, resolver) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(
                formula,
                code = error.error_code(),
                severity = error.severity().as_str(),
                %error,
                "formula evaluation failed; using 0"
            );
            Fixed::ZERO
        }
    }
}

/// Wraps a resolver and answers `$self` with a fixed value.
///
/// Pool thresholds are written relative to the attribute's maximum.
pub struct SelfResolver<'a> {
    pub value: Fixed,
    pub inner: &'a dyn VariableResolver,
}

impl VariableResolver for SelfResolver<'_> {
    fn resolve_variable(&self, name: &str) -> Option<String> {
        if name == "self" {
            Some(self.value.to_string())
        } else {
            self.inner.resolve_variable(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_formula_reads_as_zero() {
        let value = evaluate_to_number(&ExpressionEvaluator, "3 +* 4", &NoVariables);
        assert_eq!(value, Fixed::ZERO);
    }

    #[test]
    fn blank_formula_is_zero() {
        assert_eq!(
            evaluate_to_number(&ExpressionEvaluator, "  ", &NoVariables),
            Fixed::ZERO
        );
    }

    #[test]
    fn self_resolver_shadows_only_self() {
        let mut vars = BTreeMap::new();
        vars.insert("st".to_owned(), Fixed::from(10));
        let resolver = SelfResolver {
            value: Fixed::from(12),
            inner: &vars,
        };
        let value = evaluate_to_number(&ExpressionEvaluator, "round($self / 3) + $st", &resolver);
        assert_eq!(value, Fixed::from(14));
    }
}
