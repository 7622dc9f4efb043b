//! Common error infrastructure for sheet-core.
//!
//! The resolution engine is total: data-driven failures degrade to a neutral
//! value (zero, "no match") and are logged instead of propagated. Errors still
//! exist at the seams where a caller may want to know *why* something
//! degraded, most notably formula evaluation.
//!
//! # Design Principles
//!
//! - **Type Safety**: Each concern has its own error enum
//! - **Severity Classification**: Errors are categorized for recovery strategies
//! - **Local Recovery**: Nothing in this crate panics on data-driven input

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: The caller substitutes a neutral value and continues
/// - **Validation**: Authored data is malformed and should be fixed at the source
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - resolution continues with a neutral value.
    ///
    /// Examples: a formula references an attribute that does not exist
    Recoverable,

    /// Validation error - the authored definition is malformed.
    ///
    /// Examples: unbalanced parentheses, unknown function name
    Validation,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all sheet-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait SheetError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors raised while parsing or evaluating a formula string.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormulaError {
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedCharacter { found: char, offset: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected token {0:?}")]
    UnexpectedToken(String),

    #[error("unknown function {0:?}")]
    UnknownFunction(String),

    #[error("function {name:?} expects {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: &'static str,
        got: usize,
    },

    #[error("variable ${0} could not be resolved")]
    UnresolvedVariable(String),

    #[error("variable ${name} resolved to non-numeric value {value:?}")]
    NonNumericVariable { name: String, value: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("expression nested too deeply")]
    TooDeep,
}

impl SheetError for FormulaError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnresolvedVariable(_) | Self::NonNumericVariable { .. } | Self::DivisionByZero => {
                ErrorSeverity::Recoverable
            }
            Self::UnexpectedCharacter { .. }
            | Self::UnexpectedEnd
            | Self::UnexpectedToken(_)
            | Self::UnknownFunction(_)
            | Self::Arity { .. }
            | Self::TooDeep => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnexpectedCharacter { .. } => "FORMULA_UNEXPECTED_CHARACTER",
            Self::UnexpectedEnd => "FORMULA_UNEXPECTED_END",
            Self::UnexpectedToken(_) => "FORMULA_UNEXPECTED_TOKEN",
            Self::UnknownFunction(_) => "FORMULA_UNKNOWN_FUNCTION",
            Self::Arity { .. } => "FORMULA_ARITY",
            Self::UnresolvedVariable(_) => "FORMULA_UNRESOLVED_VARIABLE",
            Self::NonNumericVariable { .. } => "FORMULA_NON_NUMERIC_VARIABLE",
            Self::DivisionByZero => "FORMULA_DIVISION_BY_ZERO",
            Self::TooDeep => "FORMULA_TOO_DEEP",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variables_are_recoverable() {
        let err = FormulaError::UnresolvedVariable("st".into());
        assert!(err.severity().is_recoverable());
        assert_eq!(err.to_string(), "variable $st could not be resolved");
    }

    #[test]
    fn syntax_errors_are_validation_failures() {
        let err = FormulaError::UnexpectedEnd;
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert_eq!(err.severity().as_str(), "validation");
        assert_eq!(err.error_code(), "FORMULA_UNEXPECTED_END");
    }
}
