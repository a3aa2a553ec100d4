//! Function dispatch tests

use super::{eval, eval_in};
use chrono::NaiveDate;
use hisexpr_ast::{ProgramVariable, ValueType};
use hisexpr_diagnostics::{E0201, E0203};
use hisexpr_eval::{
    DefaultFunctions, EvalError, EvalResult, ExpressionData, FunctionProvider, evaluate,
};
use hisexpr_parser::{ExpressionMode, parse};
use hisexpr_types::{Value, VariableValue};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn rule_data() -> ExpressionData {
    ExpressionData::new()
        .with_variable("age", VariableValue::new(ValueType::Number, 42.0))
        .with_variable(
            "weight",
            VariableValue::new(ValueType::Number, 70.0)
                .with_candidates(["68", "70", "-1"])
                .with_event_date(date(2024, 3, 1)),
        )
        .with_variable("name", VariableValue::new(ValueType::String, "Ana Maria"))
        .with_variable("note", VariableValue::empty(ValueType::String))
        .with_program_variable(ProgramVariable::EnrollmentDate, date(2024, 1, 15))
        .with_program_variable(ProgramVariable::OrgUnit, "DiszpKrYNg8")
        .with_supplementary("USER", ["nurse"])
}

fn rule(source: &str) -> EvalResult<Value> {
    eval_in(ExpressionMode::RuleEngineAction, source, &rule_data())
}

#[rstest]
#[case("if(1, null, 42)", Value::Null)]
#[case("if(0, null, 42)", Value::Number(42.0))]
#[case("if(null, 1, 2)", Value::Number(2.0))]
#[case("isNull(null)", Value::Boolean(true))]
#[case("isNotNull(1)", Value::Boolean(true))]
#[case("firstNonNull(null, null, 3, 4)", Value::Number(3.0))]
#[case("firstNonNull(null)", Value::Null)]
#[case("greatest(1, 7, null, 3)", Value::Number(7.0))]
#[case("least(4, -2)", Value::Number(-2.0))]
#[case("log10(1000)", Value::Number(3.0))]
#[case("removeZeros(0)", Value::Null)]
#[case("contains('malaria case', 'mal', 'case')", Value::Boolean(true))]
#[case("containsItems('a,b,c', 'b', 'd')", Value::Boolean(false))]
fn test_common_functions(#[case] source: &str, #[case] expected: Value) {
    assert_eq!(eval(source), expected);
}

#[test]
fn test_if_evaluates_one_branch() {
    // The unused branch refers to a variable that does not exist
    assert_eq!(rule("if(true, 1, #{missing})"), Ok(Value::Number(1.0)));
}

#[rstest]
#[case("#{age} + 1", Value::Number(43.0))]
#[case("d2:hasValue(#{note})", Value::Boolean(false))]
#[case("d2:hasValue(#{name})", Value::Boolean(true))]
#[case("d2:count(#{weight})", Value::Number(3.0))]
#[case("d2:countIfZeroPos(#{weight})", Value::Number(2.0))]
#[case("d2:countIfValue(#{weight}, 70)", Value::Number(1.0))]
#[case("d2:maxValue(#{weight})", Value::Number(70.0))]
#[case("d2:lastEventDate(#{weight})", Value::Date(date(2024, 3, 1)))]
#[case("d2:left(#{name}, 3)", Value::string("Ana"))]
#[case("d2:right(#{name}, 5)", Value::string("Maria"))]
#[case("d2:substring(#{name}, 4, 9)", Value::string("Maria"))]
#[case("d2:split(#{name}, ' ', 1)", Value::string("Maria"))]
#[case("d2:length(#{name})", Value::Number(9.0))]
#[case("d2:concatenate(#{name}, '!')", Value::string("Ana Maria!"))]
#[case("d2:validatePattern(#{name}, '[A-Za-z ]+')", Value::Boolean(true))]
#[case("d2:daysBetween(V{enrollment_date}, '2024-02-15')", Value::Number(31.0))]
#[case("d2:monthsBetween(V{enrollment_date}, '2024-03-14')", Value::Number(1.0))]
#[case("d2:addDays(V{enrollment_date}, 20)", Value::Date(date(2024, 2, 4)))]
#[case("d2:round(2.345, 2)", Value::Number(2.35))]
#[case("d2:floor(#{age} / 10)", Value::Number(4.0))]
#[case("d2:modulus(#{age}, 5)", Value::Number(2.0))]
#[case("d2:hasUserRole('nurse')", Value::Boolean(true))]
#[case("d2:condition('#{age} > 18', 'adult', 'child')", Value::string("adult"))]
fn test_program_rule_functions(#[case] source: &str, #[case] expected: Value) {
    assert_eq!(rule(source), Ok(expected));
}

#[test]
fn test_unknown_variable_fails_at_evaluation() {
    let err = eval_in(
        ExpressionMode::RuleEngineCondition,
        "2 > #{not_supported}",
        &ExpressionData::default(),
    )
    .unwrap_err();
    assert_eq!(err.code(), E0201);
    assert!(err.to_string().contains("Unknown variable: 'not_supported'"));
}

#[test]
fn test_environment_functions_need_a_provider() {
    let err = eval_in(
        ExpressionMode::ValidationRuleExpression,
        "orgUnit.group(RpbiCJpIYEj)",
        &ExpressionData::default(),
    )
    .unwrap_err();
    assert_eq!(err.code(), E0203);
}

struct GroupProvider;

impl FunctionProvider for GroupProvider {
    fn org_unit_group(&self, uids: &[String], _data: &ExpressionData) -> EvalResult<Value> {
        Ok(Value::Boolean(uids.iter().any(|uid| uid == "RpbiCJpIYEj")))
    }
}

#[test]
fn test_custom_provider() {
    let root = parse(
        "orgUnit.group(RpbiCJpIYEj, tDZVQ1WtwpA)",
        ExpressionMode::ValidationRuleExpression,
        false,
    )
    .unwrap();
    let data = ExpressionData::default();
    assert_eq!(evaluate(&root, &data, &GroupProvider), Ok(Value::Boolean(true)));

    let err = evaluate(&root, &data, &DefaultFunctions).unwrap_err();
    assert!(matches!(err.root_cause(), EvalError::UnsupportedFunction { .. }));
}
