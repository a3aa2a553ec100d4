//! Expression error types

use crate::{ErrorCode, SourceExcerpt, Span};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Error - the expression cannot be used as written
    Error,
    /// Warning - a runtime conversion may fail for some inputs
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A validation finding attached to a region of the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Severity level
    pub severity: Severity,
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Where in the source the issue was found
    pub span: Option<Span>,
}

impl Issue {
    /// Create a new error issue
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            span: None,
        }
    }

    /// Create a new warning issue
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            span: None,
        }
    }

    /// Set the span
    pub fn with_span(mut self, span: Option<Span>) -> Self {
        self.span = span;
        self
    }

    /// Render the position against the source text.
    ///
    /// Only computed on demand since most callers only look at the message.
    pub fn position(&self, source: &str) -> Option<String> {
        self.span
            .map(|span| SourceExcerpt::new(source, span).to_string())
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)
    }
}

/// A fatal syntax error with the offending position
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}\n\t{excerpt}")]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    pub excerpt: SourceExcerpt,
}

impl ParseError {
    pub fn new(code: ErrorCode, message: impl Into<String>, source: &str, span: Span) -> Self {
        Self {
            code,
            message: message.into(),
            excerpt: SourceExcerpt::new(source, span),
        }
    }

    /// Line (1-based) of the error
    pub fn line(&self) -> usize {
        self.excerpt.location.line
    }

    /// Column (0-based) of the error
    pub fn column(&self) -> usize {
        self.excerpt.location.column
    }
}

/// Main expression error type
#[derive(Debug, Clone, Error)]
pub enum ExprError {
    /// Malformed syntax
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Type or resolution problems found by validation
    #[error("{}", render_issues(.errors, .warnings))]
    Validation {
        errors: Vec<Issue>,
        warnings: Vec<Issue>,
    },

    /// Evaluation failure
    #[error("{message}")]
    Evaluation {
        code: ErrorCode,
        message: String,
        /// Normalized text of the sub-expression that failed
        expression: Option<String>,
    },
}

impl ExprError {
    /// Create an evaluation error
    pub fn evaluation(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Evaluation {
            code,
            message: message.into(),
            expression: None,
        }
    }

    /// Create a validation error from accumulated issues.
    ///
    /// Returns `None` when nothing was found.
    pub fn from_issues(errors: Vec<Issue>, warnings: Vec<Issue>) -> Option<Self> {
        if errors.is_empty() && warnings.is_empty() {
            None
        } else {
            Some(Self::Validation { errors, warnings })
        }
    }

    /// Get the error code of the first underlying problem
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Parse(e) => e.code,
            Self::Validation { errors, warnings } => errors
                .first()
                .or(warnings.first())
                .map(|i| i.code)
                .unwrap_or(ErrorCode::new(0)),
            Self::Evaluation { code, .. } => *code,
        }
    }
}

fn render_issues(errors: &[Issue], warnings: &[Issue]) -> String {
    errors
        .iter()
        .chain(warnings)
        .map(|issue| issue.message.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{E0001, E0100, E0104, E0201};

    #[test]
    fn test_parse_error_format() {
        let err = ParseError::new(E0001, "Unexpected character `$`", "1 + $", Span::new(4, 5));
        assert_eq!(
            err.to_string(),
            "Unexpected character `$`\n\tat line:1 character:4\n\t1 + $\n\t    ^"
        );
        assert_eq!(err.line(), 1);
        assert_eq!(err.column(), 4);
    }

    #[test]
    fn test_validation_is_raised_only_when_non_empty() {
        assert!(ExprError::from_issues(Vec::new(), Vec::new()).is_none());

        let err = ExprError::from_issues(
            vec![Issue::error(E0100, "first")],
            vec![Issue::warning(E0104, "second")],
        )
        .unwrap();
        assert_eq!(err.code(), E0100);
        assert_eq!(err.to_string(), "first\nsecond");
    }

    #[test]
    fn test_issue_position_is_rendered_on_demand() {
        let issue = Issue::error(E0100, "bad").with_span(Some(Span::new(2, 6)));
        assert_eq!(
            issue.position("! 45.6").unwrap(),
            "at line:1 character:2\n\t! 45.6\n\t  ^--^"
        );
        assert!(Issue::error(E0100, "bad").position("x").is_none());
    }

    #[test]
    fn test_evaluation_error_code() {
        let err = ExprError::evaluation(E0201, "Unknown variable: 'x'");
        assert_eq!(err.code(), E0201);
        assert_eq!(err.to_string(), "Unknown variable: 'x'");
    }
}
