//! Logical and comparison operator tests

use super::{eval, eval_in};
use hisexpr_eval::{EvalError, ExpressionData};
use hisexpr_parser::ExpressionMode;
use hisexpr_types::Value;
use rstest::rstest;

#[rstest]
#[case("null || true", Value::Boolean(true))]
#[case("true || null", Value::Boolean(true))]
#[case("null || false", Value::Null)]
#[case("null || null", Value::Null)]
#[case("false or false", Value::Boolean(false))]
#[case("null && true", Value::Null)]
#[case("true and null", Value::Null)]
#[case("false and null", Value::Null)]
#[case("false && null", Value::Null)]
#[case("null and false", Value::Null)]
#[case("true && false", Value::Boolean(false))]
#[case("not null", Value::Null)]
#[case("!false", Value::Boolean(true))]
fn test_three_valued_logic(#[case] source: &str, #[case] expected: Value) {
    assert_eq!(eval(source), expected);
}

#[rstest]
#[case("1 < 2", Value::Boolean(true))]
#[case("'b' > 'a'", Value::Boolean(true))]
#[case("'2024-01-15' <= '2024-01-15'", Value::Boolean(true))]
#[case("2 >= '10'", Value::Boolean(false))]
#[case("null < 1", Value::Null)]
#[case("1 == true", Value::Boolean(true))]
#[case("1 == '1'", Value::Boolean(true))]
#[case("null == null", Value::Boolean(true))]
#[case("null != 0", Value::Boolean(true))]
#[case("'a' != 'a'", Value::Boolean(false))]
fn test_comparison(#[case] source: &str, #[case] expected: Value) {
    assert_eq!(eval(source), expected);
}

#[test]
fn test_conversion_failure_names_the_sub_expression() {
    let err = eval_in(
        ExpressionMode::IndicatorExpression,
        "1 + (!45.6)",
        &ExpressionData::default(),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Cannot convert `45.6` to type BOOLEAN in `!45.6`");
    assert!(matches!(err.root_cause(), EvalError::Coercion(_)));
}

#[test]
fn test_distinct_outside_aggregation() {
    let err = eval_in(
        ExpressionMode::PredictorGeneratorExpression,
        "distinct 1",
        &ExpressionData::default(),
    )
    .unwrap_err();
    assert!(matches!(err.root_cause(), EvalError::IllegalOperation { .. }));
}
