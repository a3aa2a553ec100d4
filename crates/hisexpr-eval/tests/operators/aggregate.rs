//! Aggregate function tests

use super::eval_in;
use hisexpr_ast::{DataItem, DataItemType};
use hisexpr_diagnostics::E0204;
use hisexpr_eval::{EvalError, EvalResult, ExpressionData};
use hisexpr_parser::ExpressionMode;
use hisexpr_types::Value;
use rstest::rstest;

const CASES: &str = "FTRrcoaog83";
const DEATHS: &str = "eY5ehpbEsB7";

fn item(uid: &str) -> DataItem {
    DataItem::of(DataItemType::DataElementOperand, &[uid])
}

fn series(values: &[f64]) -> ExpressionData {
    ExpressionData::new().with_series(item(CASES), values.iter().copied())
}

fn predict(source: &str, data: &ExpressionData) -> EvalResult<Value> {
    eval_in(ExpressionMode::PredictorGeneratorExpression, source, data)
}

#[rstest]
#[case("avg(#{FTRrcoaog83})", 5.0)]
#[case("sum(#{FTRrcoaog83})", 25.0)]
#[case("min(#{FTRrcoaog83})", 0.0)]
#[case("max(#{FTRrcoaog83})", 10.0)]
#[case("median(#{FTRrcoaog83})", 5.0)]
#[case("count(#{FTRrcoaog83})", 5.0)]
#[case("variance(#{FTRrcoaog83})", 14.5)]
#[case("percentileCont(0.25, #{FTRrcoaog83})", 3.0)]
#[case("sum(#{FTRrcoaog83} * 2) + 1", 51.0)]
fn test_aggregates(#[case] source: &str, #[case] expected: f64) {
    let data = series(&[0.0, 10.0, 5.0, 3.0, 7.0]);
    assert_eq!(predict(source, &data), Ok(Value::Number(expected)));
}

#[test]
fn test_parallel_series() {
    let data = series(&[1.0, 2.0, 3.0]).with_series(item(DEATHS), [10.0, 20.0, 30.0]);
    assert_eq!(
        predict("sum(#{FTRrcoaog83} * #{eY5ehpbEsB7})", &data),
        Ok(Value::Number(140.0))
    );
}

#[test]
fn test_scalars_repeat_across_the_series() {
    let data = series(&[1.0, 2.0, 3.0]).with_item(item(DEATHS), 10.0);
    assert_eq!(
        predict("sum(#{FTRrcoaog83} + #{eY5ehpbEsB7})", &data),
        Ok(Value::Number(36.0))
    );
}

#[test]
fn test_nulls_are_skipped() {
    let data = ExpressionData::new().with_series(
        item(CASES),
        [Value::Number(4.0), Value::Null, Value::Number(2.0)],
    );
    assert_eq!(predict("avg(#{FTRrcoaog83})", &data), Ok(Value::Number(3.0)));
    assert_eq!(predict("count(#{FTRrcoaog83})", &data), Ok(Value::Number(2.0)));
}

#[test]
fn test_distinct_values() {
    let data = series(&[1.0, 1.0, 2.0, 2.0, 5.0]);
    assert_eq!(predict("sum(distinct #{FTRrcoaog83})", &data), Ok(Value::Number(8.0)));
    assert_eq!(predict("count(distinct #{FTRrcoaog83})", &data), Ok(Value::Number(3.0)));
}

#[test]
fn test_empty_series() {
    let data = series(&[]);
    assert_eq!(predict("avg(#{FTRrcoaog83})", &data), Ok(Value::Null));
    assert_eq!(predict("count(#{FTRrcoaog83})", &data), Ok(Value::Number(0.0)));
}

#[test]
fn test_series_lengths_must_match() {
    let data = series(&[1.0, 2.0, 3.0]).with_series(item(DEATHS), [1.0]);
    let err = predict("sum(#{FTRrcoaog83} + #{eY5ehpbEsB7})", &data).unwrap_err();
    assert!(matches!(err.root_cause(), EvalError::Aggregation { .. }));
    assert_eq!(err.code(), E0204);
}

#[test]
fn test_nested_aggregates_fail() {
    let data = series(&[1.0, 2.0]);
    let err = predict("sum(avg(#{FTRrcoaog83}))", &data).unwrap_err();
    assert_eq!(err.code(), E0204);
}

#[test]
fn test_percentile_fraction_is_checked() {
    let data = series(&[1.0, 2.0]);
    let err = predict("percentileCont(1.5, #{FTRrcoaog83})", &data).unwrap_err();
    assert!(matches!(err.root_cause(), EvalError::InvalidArgument { .. }));
}
