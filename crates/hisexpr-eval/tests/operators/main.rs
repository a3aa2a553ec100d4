//! Evaluation tests over parsed expressions
//!
//! These tests verify:
//! - Operator precedence and exact decimal arithmetic
//! - Null propagation and three-valued logic
//! - Aggregation over bound value series
//! - Function dispatch and error descriptions

mod aggregate;
mod arithmetic;
mod functions;
mod logical;

use hisexpr_eval::{DefaultFunctions, EvalResult, ExpressionData, evaluate};
use hisexpr_parser::{ExpressionMode, parse};
use hisexpr_types::Value;

// ============================================================================
// Test Helpers
// ============================================================================

pub fn eval_in(mode: ExpressionMode, source: &str, data: &ExpressionData) -> EvalResult<Value> {
    let root = parse(source, mode, false).unwrap_or_else(|err| panic!("`{source}`: {err}"));
    evaluate(&root, data, &DefaultFunctions)
}

/// Evaluate an indicator expression without data
pub fn eval(source: &str) -> Value {
    eval_in(ExpressionMode::IndicatorExpression, source, &ExpressionData::default())
        .unwrap_or_else(|err| panic!("`{source}`: {err}"))
}

pub fn number(source: &str) -> f64 {
    match eval(source) {
        Value::Number(n) => n,
        other => panic!("`{source}` gave {other:?}"),
    }
}
