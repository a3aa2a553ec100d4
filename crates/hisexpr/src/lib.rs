//! Health-information-system expression engine
//!
//! This crate ties the engine together:
//! - Parsing expressions in one of the supported dialects
//! - Static type checking and dialect validation
//! - Evaluation against a snapshot of runtime data
//! - Normalising, describing and regenerating expression text
//!
//! # Example
//!
//! ```
//! use hisexpr::{Expression, ExpressionData, ExpressionMode, Value};
//!
//! let expression = Expression::parse("if(1 > 0, 2 * 21, 0)", ExpressionMode::IndicatorExpression)?;
//! expression.validate(&Default::default())?;
//! assert_eq!(expression.evaluate(&ExpressionData::default())?, Value::Number(42.0));
//! # Ok::<(), hisexpr::ExprError>(())
//! ```

mod expression;

// Re-export all public APIs from internal crates
pub use hisexpr_ast as ast;
pub use hisexpr_diagnostics as diagnostics;
pub use hisexpr_eval as eval;
pub use hisexpr_parser as parser;
pub use hisexpr_types as types;

// Convenience re-exports
pub use expression::Expression;
pub use hisexpr_ast::{DataItem, NamedFunction, Node, ProgramVariable, ValueType};
pub use hisexpr_diagnostics::{ExprError, Issue, Result, Severity};
pub use hisexpr_eval::{DefaultFunctions, ExpressionData, FunctionProvider};
pub use hisexpr_parser::ExpressionMode;
pub use hisexpr_types::{Validation, Value, VariableValue};
