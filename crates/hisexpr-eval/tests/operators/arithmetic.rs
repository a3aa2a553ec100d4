//! Arithmetic operator tests

use super::{eval, number};
use hisexpr_types::Value;
use rstest::rstest;

#[test]
fn test_precedence() {
    assert_eq!(number("1+2*-3^9*4*5+6"), -787313.0);
}

#[test]
fn test_grouped_precedence() {
    let expected = -2.25141952945498701e18;
    let actual = number("(1+2)*-3^(9*4)*5+6");
    assert!(((actual - expected) / expected).abs() < 1e-15, "{actual}");
}

#[rstest]
#[case("0.1 + 0.2", 0.3)]
#[case("1.1 * 3", 3.3)]
#[case("10 / 4", 2.5)]
#[case("7 % 3", 1.0)]
#[case("2 ^ -1", 0.5)]
#[case("2 ^ 3 ^ 2", 512.0)]
#[case("1 - 2 - 3", -4.0)]
#[case("- -2", 2.0)]
#[case("+3", 3.0)]
#[case("true + 1", 2.0)]
#[case("'4' * 2", 8.0)]
fn test_arithmetic(#[case] source: &str, #[case] expected: f64) {
    assert_eq!(number(source), expected);
}

#[test]
fn test_division_by_zero_uses_double_semantics() {
    assert_eq!(number("1 / 0"), f64::INFINITY);
    assert!(number("0 / 0").is_nan());
    assert!(number("5 % 0").is_nan());
}

#[rstest]
#[case("1 + null")]
#[case("null * 2")]
#[case("-null")]
fn test_null_propagation(#[case] source: &str) {
    assert_eq!(eval(source), Value::Null);
}

#[test]
fn test_long_sum() {
    let source = vec!["1"; 400].join(" + ");
    assert_eq!(number(&source), 400.0);
}
