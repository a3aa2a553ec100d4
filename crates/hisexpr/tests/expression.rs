//! End-to-end tests over the facade

use hisexpr::ast::DataItemType;
use hisexpr::diagnostics::{E0101, E0104, E0201};
use hisexpr::{
    DataItem, ExprError, Expression, ExpressionData, ExpressionMode, NamedFunction,
    ProgramVariable, Value, ValueType, VariableValue,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::HashMap;

fn parse(source: &str, mode: ExpressionMode) -> Expression {
    Expression::parse(source, mode).unwrap_or_else(|err| panic!("`{source}`: {err}"))
}

fn no_variables() -> HashMap<String, VariableValue> {
    HashMap::new()
}

#[test]
fn test_literal_that_cannot_convert_fails_validation() {
    let expr = parse("1 + (!45.6)", ExpressionMode::IndicatorExpression);
    let err = expr.validate(&no_variables()).unwrap_err();
    assert_eq!(err.code(), E0101);
    assert!(
        err.to_string().contains("cannot be converted to type BOOLEAN"),
        "{err}"
    );
}

#[rstest]
#[case("if(1, null, 42)", ExpressionMode::IndicatorExpression)]
#[case("#{FTRrcoaog83} / C{bWEgzTHB7Uv} * 100", ExpressionMode::IndicatorExpression)]
#[case("sum(#{FTRrcoaog83}) / [days]", ExpressionMode::PredictorGeneratorExpression)]
#[case("d2:daysBetween(V{enrollment_date}, V{current_date}) > 30", ExpressionMode::ProgramIndicatorFilter)]
fn test_valid_expressions(#[case] source: &str, #[case] mode: ExpressionMode) {
    let result = parse(source, mode).validate(&no_variables());
    assert!(result.is_ok(), "{result:?}");
}

#[test]
fn test_result_type_must_match_the_dialect() {
    let expr = parse("1 > 2", ExpressionMode::IndicatorExpression);
    assert!(expr.validate(&no_variables()).is_err());
    let expr = parse("1 > 2", ExpressionMode::PredictorSkipTest);
    assert!(expr.validate(&no_variables()).is_ok());
}

#[test]
fn test_unknown_variable_parses_but_fails_at_evaluation() {
    let expr = parse("2 > #{not_supported}", ExpressionMode::RuleEngineCondition);
    let err = expr.evaluate(&ExpressionData::default()).unwrap_err();
    assert_eq!(err.code(), E0201);
    assert!(err.to_string().contains("Unknown variable: 'not_supported'"), "{err}");
    match err {
        ExprError::Evaluation { expression, .. } => {
            assert_eq!(expression.as_deref(), Some("#{not_supported}"));
        }
        other => panic!("expected an evaluation error, got {other:?}"),
    }
}

#[test]
fn test_rule_variables_are_checked_by_the_dialect() {
    let expr = parse("#{age} >= 18", ExpressionMode::RuleEngineCondition);
    let err = expr.validate(&no_variables()).unwrap_err();
    assert_eq!(err.code(), E0104);

    let variables = HashMap::from([(
        "age".to_string(),
        VariableValue::new(ValueType::Number, 20.0),
    )]);
    assert!(expr.validate(&variables).is_ok());

    let data = ExpressionData {
        rule_variables: variables,
        ..Default::default()
    };
    assert_eq!(expr.evaluate(&data).unwrap(), Value::Boolean(true));
}

#[test]
fn test_variable_types_drive_the_checker() {
    let expr = parse("d2:left(#{name}, 2) == 'An'", ExpressionMode::RuleEngineCondition);
    let variables = HashMap::from([(
        "name".to_string(),
        VariableValue::new(ValueType::String, "Ana"),
    )]);
    assert!(expr.check(&variables).is_empty());
}

#[test]
fn test_parse_errors_surface_as_expr_errors() {
    let err = Expression::parse("1 +", ExpressionMode::IndicatorExpression).unwrap_err();
    assert!(matches!(err, ExprError::Parse(_)));
}

#[test]
fn test_modifier_offsets_accumulate() {
    let expr = parse(
        "#{A03MvHHogjR.a3kGcGDCuk6}.stageOffset(1).stageOffset(2)",
        ExpressionMode::ProgramIndicatorExpression,
    );
    let items = expr.data_items();
    assert_eq!(items.len(), 1);
    let mods = items[0].query_mods.as_ref().unwrap();
    assert_eq!(mods.stage_offset, 3);
}

#[test]
fn test_collect_operations() {
    let expr = parse(
        "d2:hasValue(#{weight}) && V{event_date} > V{enrollment_date} && #{height} > 0",
        ExpressionMode::RuleEngineCondition,
    );
    assert_eq!(expr.variable_names(), vec!["weight", "height"]);
    assert_eq!(
        expr.program_variables(),
        vec![ProgramVariable::EventDate, ProgramVariable::EnrollmentDate]
    );
    assert_eq!(expr.functions(), vec![NamedFunction::D2HasValue]);

    let expr = parse(
        "orgUnit.ancestor(ImspTQPwCqd, tQC7ymx8DHq)",
        ExpressionMode::ValidationRuleExpression,
    );
    assert_eq!(expr.org_unit_uids(), vec!["ImspTQPwCqd", "tQC7ymx8DHq"]);
}

#[test]
fn test_evaluate_indicator() {
    let item = DataItem::of(DataItemType::DataElementOperand, &["FTRrcoaog83"]);
    let data = ExpressionData::new().with_item(item, 30.0);
    let expr = parse("#{FTRrcoaog83} / 4 * 100", ExpressionMode::IndicatorExpression);
    assert_eq!(expr.evaluate(&data).unwrap(), Value::Number(750.0));
}

#[test]
fn test_describe_uses_display_names() {
    let expr = parse("#{FTRrcoaog83} + 1", ExpressionMode::IndicatorExpression);
    let names = HashMap::from([("FTRrcoaog83".to_string(), "ANC 1st visit".to_string())]);
    assert_eq!(expr.describe(&names), "#{ANC 1st visit} + 1");
}

#[test]
fn test_false_and_null_is_null() {
    let expr = parse("false and null", ExpressionMode::PredictorSkipTest);
    assert_eq!(expr.evaluate(&ExpressionData::default()).unwrap(), Value::Null);
}

#[test]
fn test_sum_over_hundreds_of_items() {
    let item = DataItem::of(DataItemType::DataElementOperand, &["FTRrcoaog83"]);
    let data = ExpressionData::new().with_item(item, 2.0);
    let expr = parse(
        &vec!["#{FTRrcoaog83}"; 300].join(" + "),
        ExpressionMode::IndicatorExpression,
    );
    assert_eq!(expr.evaluate(&data).unwrap(), Value::Number(600.0));
}

#[test]
fn test_deep_nesting_is_a_parse_error() {
    let source = format!("{}1{}", "(".repeat(2000), ")".repeat(2000));
    let err = Expression::parse(&source, ExpressionMode::IndicatorExpression).unwrap_err();
    assert!(matches!(err, ExprError::Parse(_)), "{err:?}");
    assert!(err.to_string().contains("nested too deeply"), "{err}");
}
