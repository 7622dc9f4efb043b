//! Formula evaluation over a parsed expression tree.

use super::VariableResolver;
use super::parse::{BinaryOp, Expr, UnaryOp};
use crate::error::FormulaError;
use crate::fixed::Fixed;

fn truth(value: bool) -> Fixed {
    if value { Fixed::ONE } else { Fixed::ZERO }
}

/// Evaluate an expression to a number.
///
/// ## Error Handling
/// - `UnresolvedVariable` when the resolver has no value for a `$name`
/// - `NonNumericVariable` when the resolved text is not a number
/// - `DivisionByZero` for `/` or `%` by zero
/// - `UnknownFunction` / `Arity` for bad calls
pub fn evaluate(expr: &Expr, resolver: &dyn VariableResolver) -> Result<Fixed, FormulaError> {
    match expr {
        Expr::Number(value) => Ok(*value),

        Expr::Variable(name) => {
            let text = resolver
                .resolve_variable(name)
                .ok_or_else(|| FormulaError::UnresolvedVariable(name.clone()))?;
            text.trim()
                .parse()
                .map_err(|_| FormulaError::NonNumericVariable {
                    name: name.clone(),
                    value: text,
                })
        }

        Expr::Unary(op, operand) => {
            let value = evaluate(operand, resolver)?;
            Ok(match op {
                UnaryOp::Negate => -value,
                UnaryOp::Not => truth(value.is_zero()),
            })
        }

        Expr::Binary(op, left, right) => {
            let lhs = evaluate(left, resolver)?;
            // Short-circuit before touching the right-hand side.
            match op {
                BinaryOp::And if lhs.is_zero() => return Ok(Fixed::ZERO),
                BinaryOp::Or if !lhs.is_zero() => return Ok(Fixed::ONE),
                _ => {}
            }
            let rhs = evaluate(right, resolver)?;
            Ok(match op {
                BinaryOp::Or | BinaryOp::And => truth(!rhs.is_zero()),
                BinaryOp::Equal => truth(lhs == rhs),
                BinaryOp::NotEqual => truth(lhs != rhs),
                BinaryOp::Less => truth(lhs < rhs),
                BinaryOp::LessEqual => truth(lhs <= rhs),
                BinaryOp::Greater => truth(lhs > rhs),
                BinaryOp::GreaterEqual => truth(lhs >= rhs),
                BinaryOp::Add => lhs + rhs,
                BinaryOp::Subtract => lhs - rhs,
                BinaryOp::Multiply => lhs * rhs,
                BinaryOp::Divide => lhs.checked_div(rhs).ok_or(FormulaError::DivisionByZero)?,
                BinaryOp::Remainder => {
                    if rhs.is_zero() {
                        return Err(FormulaError::DivisionByZero);
                    }
                    lhs % rhs
                }
                BinaryOp::Power => power(lhs, rhs),
            })
        }

        Expr::Call(name, args) => call(name, args, resolver),
    }
}

fn power(base: Fixed, exponent: Fixed) -> Fixed {
    if exponent.is_integer() && exponent.as_i64().unsigned_abs() <= 64 {
        let mut result = Fixed::ONE;
        for _ in 0..exponent.as_i64().unsigned_abs() {
            result = result * base;
        }
        return if exponent.is_negative() {
            Fixed::ONE / result
        } else {
            result
        };
    }
    Fixed::from_f64(base.as_f64().powf(exponent.as_f64()))
}

fn call(name: &str, args: &[Expr], resolver: &dyn VariableResolver) -> Result<Fixed, FormulaError> {
    let arity = |expected: &'static str| FormulaError::Arity {
        name: name.to_owned(),
        expected,
        got: args.len(),
    };
    let single = || -> Result<Fixed, FormulaError> {
        match args {
            [only] => evaluate(only, resolver),
            _ => Err(arity("1")),
        }
    };
    match name {
        "abs" => Ok(single()?.abs()),
        "ceil" => Ok(single()?.ceil()),
        "floor" => Ok(single()?.floor()),
        "round" => Ok(single()?.round()),
        "trunc" => Ok(single()?.trunc()),
        "sqrt" => {
            let value = single()?;
            Ok(Fixed::from_f64(value.as_f64().max(0.0).sqrt()))
        }
        "min" | "max" => {
            let mut values = args.iter().map(|arg| evaluate(arg, resolver));
            let first = values.next().ok_or_else(|| arity("1 or more"))??;
            values.try_fold(first, |best, next| {
                let next = next?;
                Ok(if name == "min" {
                    best.min(next)
                } else {
                    best.max(next)
                })
            })
        }
        "if" => match args {
            [condition, then, otherwise] => {
                if evaluate(condition, resolver)?.is_zero() {
                    evaluate(otherwise, resolver)
                } else {
                    evaluate(then, resolver)
                }
            }
            _ => Err(arity("3")),
        },
        _ => Err(FormulaError::UnknownFunction(name.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::formula::parse::parse;

    fn eval_with(formula: &str, vars: &[(&str, i32)]) -> Result<Fixed, FormulaError> {
        let resolver: BTreeMap<String, Fixed> = vars
            .iter()
            .map(|(name, value)| ((*name).to_owned(), Fixed::from(*value)))
            .collect();
        evaluate(&parse(formula)?, &resolver)
    }

    #[test]
    fn arithmetic_follows_precedence() {
        assert_eq!(eval_with("2 + 3 * 4", &[]), Ok(Fixed::from(14)));
        assert_eq!(eval_with("(2 + 3) * 4", &[]), Ok(Fixed::from(20)));
        assert_eq!(eval_with("2 ^ 3 ^ 2", &[]), Ok(Fixed::from(512)));
        assert_eq!(eval_with("-2 ^ 2", &[]), Ok(Fixed::from(4)));
    }

    #[test]
    fn basic_speed_formula() {
        // (12 + 11) / 4 = 5.75
        assert_eq!(
            eval_with("($dx + $ht) / 4", &[("dx", 12), ("ht", 11)]),
            Ok("5.75".parse().unwrap())
        );
        assert_eq!(
            eval_with("floor(($dx + $ht) / 4)", &[("dx", 12), ("ht", 11)]),
            Ok(Fixed::from(5))
        );
    }

    #[test]
    fn functions_and_conditionals() {
        assert_eq!(eval_with("max(1, 7, 3)", &[]), Ok(Fixed::from(7)));
        assert_eq!(eval_with("min(4)", &[]), Ok(Fixed::from(4)));
        assert_eq!(eval_with("if($st > 10, 1, 2)", &[("st", 12)]), Ok(Fixed::ONE));
        assert_eq!(eval_with("round(10 / 3)", &[]), Ok(Fixed::from(3)));
        assert_eq!(eval_with("sqrt(16)", &[]), Ok(Fixed::from(4)));
    }

    #[test]
    fn failures_are_errors_not_panics() {
        assert_eq!(
            eval_with("$missing + 1", &[]),
            Err(FormulaError::UnresolvedVariable("missing".into()))
        );
        assert_eq!(eval_with("1 / 0", &[]), Err(FormulaError::DivisionByZero));
        assert_eq!(eval_with("5 % 0", &[]), Err(FormulaError::DivisionByZero));
        assert!(matches!(eval_with("nope(1)", &[]), Err(FormulaError::UnknownFunction(_))));
        assert!(matches!(eval_with("if(1, 2)", &[]), Err(FormulaError::Arity { .. })));
        assert!(matches!(eval_with("max()", &[]), Err(FormulaError::Arity { .. })));
    }

    #[test]
    fn logical_operators_short_circuit() {
        // The right-hand side would fail to resolve if it were evaluated.
        assert_eq!(eval_with("0 && $missing", &[]), Ok(Fixed::ZERO));
        assert_eq!(eval_with("1 || $missing", &[]), Ok(Fixed::ONE));
        assert_eq!(eval_with("!0", &[]), Ok(Fixed::ONE));
    }
}
