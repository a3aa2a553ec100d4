//! Expression evaluation
//!
//! This crate evaluates parsed expression trees against an
//! [`ExpressionData`] snapshot:
//!
//! - **Arithmetic**: exact decimal evaluation returned as doubles, with IEEE
//!   semantics for non-finite operands and division by zero
//! - **Comparison**: relational operators over one type, value equality
//!   across types
//! - **Logic**: `and`, `or` and `not` with three-valued logic
//! - **Aggregates**: `sum`, `avg`, `median`, `percentileCont` and friends,
//!   re-evaluating their argument over bound value series
//! - **Functions**: routed through a [`FunctionProvider`] whose default
//!   methods cover the pure functions
//!
//! # Example
//!
//! ```
//! use hisexpr_ast::{BinaryOp, Node, NodeKind, NodeValue};
//! use hisexpr_eval::{DefaultFunctions, Evaluator, ExpressionData};
//! use hisexpr_types::Value;
//!
//! let number = |n: f64| Node::new(NodeKind::Number, n.to_string(), NodeValue::Number(n));
//! let sum = Node::new(NodeKind::BinaryOperator, "+", NodeValue::Binary(BinaryOp::Add))
//!     .with_children(vec![number(0.1), number(0.2)]);
//!
//! let data = ExpressionData::default();
//! let value = Evaluator::new(&data, &DefaultFunctions).evaluate(&sum).unwrap();
//! assert_eq!(value, Value::Number(0.3));
//! ```
//!
//! # Nulls
//!
//! - Missing data items, named values and program variables are null; an
//!   unknown rule variable is an error
//! - Arithmetic, relational operators and `not` propagate null
//! - `==` and `!=` always give a boolean, with null equal only to null
//! - A null `if` condition takes the else branch

pub mod context;
pub mod engine;
pub mod error;
pub mod operators;
pub mod provider;

pub use context::ExpressionData;
pub use engine::{Evaluator, StaticEvaluator};
pub use error::{EvalError, EvalResult};
pub use provider::{DefaultFunctions, FunctionProvider, call_function};

use hisexpr_ast::Node;
use hisexpr_types::Value;

/// Evaluate `root` against `data` in a fresh evaluator
pub fn evaluate(root: &Node, data: &ExpressionData, provider: &dyn FunctionProvider) -> EvalResult<Value> {
    Evaluator::new(data, provider).evaluate(root)
}
