//! Evaluation errors

use hisexpr_diagnostics::{E0200, E0201, E0202, E0203, E0204, E0205, E0206, ErrorCode, ExprError};
use hisexpr_types::CoercionError;
use thiserror::Error;

/// Result type for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors that can occur while evaluating an expression
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    /// A rule variable without a supplied value
    #[error("Unknown variable: '{name}'")]
    UnknownVariable { name: String },

    /// A value could not be converted to the type an operation needs
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    /// The function provider does not implement a function
    #[error("Unsupported function: {name}")]
    UnsupportedFunction { name: String },

    /// An argument outside the domain of a function
    #[error("Invalid argument for {function}: {message}")]
    InvalidArgument { function: String, message: String },

    /// Aggregation misuse, such as series of different lengths
    #[error("Invalid aggregation: {message}")]
    Aggregation { message: String },

    /// Data an operation needs is not in the snapshot
    #[error("Missing data: {message}")]
    MissingData { message: String },

    /// An operator used where it has no meaning
    #[error("Illegal operation: {message}")]
    IllegalOperation { message: String },

    /// Maximum recursion depth exceeded
    #[error("Maximum recursion depth exceeded")]
    RecursionLimit,

    /// A failure re-described with the sub-expression it happened in
    #[error("{source} in `{expression}`")]
    InExpression {
        expression: String,
        source: Box<EvalError>,
    },
}

impl EvalError {
    pub fn unknown_variable(name: impl Into<String>) -> Self {
        Self::UnknownVariable { name: name.into() }
    }

    pub fn unsupported_function(name: impl Into<String>) -> Self {
        Self::UnsupportedFunction { name: name.into() }
    }

    pub fn invalid_argument(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            function: function.into(),
            message: message.into(),
        }
    }

    pub fn aggregation(message: impl Into<String>) -> Self {
        Self::Aggregation {
            message: message.into(),
        }
    }

    pub fn missing_data(message: impl Into<String>) -> Self {
        Self::MissingData {
            message: message.into(),
        }
    }

    pub fn illegal_operation(message: impl Into<String>) -> Self {
        Self::IllegalOperation {
            message: message.into(),
        }
    }

    /// Attach the text of the failing sub-expression, once
    pub fn within(self, expression: impl FnOnce() -> String) -> Self {
        match self {
            Self::InExpression { .. } => self,
            other => Self::InExpression {
                expression: expression(),
                source: Box::new(other),
            },
        }
    }

    /// The error without the sub-expression wrapper
    pub fn root_cause(&self) -> &EvalError {
        match self {
            Self::InExpression { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self.root_cause() {
            Self::UnknownVariable { .. } => E0201,
            Self::Coercion(_) => E0202,
            Self::UnsupportedFunction { .. } => E0203,
            Self::Aggregation { .. } => E0204,
            Self::MissingData { .. } => E0205,
            Self::IllegalOperation { .. } | Self::InvalidArgument { .. } => E0206,
            Self::RecursionLimit | Self::InExpression { .. } => E0200,
        }
    }
}

impl From<EvalError> for ExprError {
    fn from(err: EvalError) -> Self {
        let expression = match &err {
            EvalError::InExpression { expression, .. } => Some(expression.clone()),
            _ => None,
        };
        ExprError::Evaluation {
            code: err.code(),
            message: err.to_string(),
            expression,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_is_attached_once() {
        let err = EvalError::unknown_variable("age")
            .within(|| "#{age}".to_string())
            .within(|| "#{age} > 3".to_string());
        assert_eq!(err.to_string(), "Unknown variable: 'age' in `#{age}`");
        assert_eq!(err.code(), E0201);
    }

    #[test]
    fn test_conversion_into_expr_error() {
        let err: ExprError = EvalError::aggregation("lengths differ")
            .within(|| "sum(#{a})".to_string())
            .into();
        match err {
            ExprError::Evaluation {
                code, expression, ..
            } => {
                assert_eq!(code, E0204);
                assert_eq!(expression.as_deref(), Some("sum(#{a})"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
