//! Comparison operators
//!
//! Relational operators compare two values of one type, converting the
//! right operand to the left one's type when they differ. Equality accepts
//! any pair of values and normalises booleans to numbers.

use crate::engine::Evaluator;
use crate::error::EvalResult;
use hisexpr_ast::{BinaryOp, Node};
use hisexpr_types::{Value, parse_date, to_boolean, to_date, to_number};
use std::cmp::Ordering;

impl Evaluator<'_> {
    /// Evaluate `<`, `>`, `<=` and `>=`. A null operand gives null.
    pub fn eval_relational(&mut self, op: BinaryOp, left: Value, right: &Node) -> EvalResult<Value> {
        let left = left.unwrap_variable();
        let right = self.eval(right)?.unwrap_variable();
        if left.is_null() || right.is_null() {
            return Ok(Value::Null);
        }
        let result = compare(&left, &right)?.is_some_and(|ordering| match op {
            BinaryOp::Lt => ordering.is_lt(),
            BinaryOp::Gt => ordering.is_gt(),
            BinaryOp::Le => ordering.is_le(),
            BinaryOp::Ge => ordering.is_ge(),
            _ => false,
        });
        Ok(Value::Boolean(result))
    }

    /// Evaluate `==` and `!=`, which never give null
    pub fn eval_equality(&mut self, op: BinaryOp, left: Value, right: &Node) -> EvalResult<Value> {
        let left = left.unwrap_variable();
        let right = self.eval(right)?.unwrap_variable();
        let equal = values_equal(&left, &right);
        Ok(Value::Boolean(if op == BinaryOp::Ne { !equal } else { equal }))
    }
}

/// Order two non-null values; `None` when a number is `NaN`
pub fn compare(left: &Value, right: &Value) -> EvalResult<Option<Ordering>> {
    Ok(match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
        (Value::Date(a), other) => Some(a.cmp(&to_date(other)?)),
        (other, Value::Date(b)) => Some(to_date(other)?.cmp(b)),
        (Value::Number(_), _) | (_, Value::Number(_)) => to_number(left)?.partial_cmp(&to_number(right)?),
        (Value::Boolean(a), other) => Some(a.cmp(&to_boolean(other)?)),
        (other, Value::Boolean(b)) => Some(to_boolean(other)?.cmp(b)),
        _ => Some(left.to_string().cmp(&right.to_string())),
    })
}

/// Value equality with booleans read as 1 and 0 and numeric text read as
/// numbers. Null equals only null.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Variable(_), _) | (_, Value::Variable(_)) => {
            values_equal(&left.clone().unwrap_variable(), &right.clone().unwrap_variable())
        }
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Boolean(b), Value::String(s)) | (Value::String(s), Value::Boolean(b)) => {
            to_boolean(&Value::String(s.clone())).is_ok_and(|t| t == *b)
        }
        (Value::Boolean(b), other) | (other, Value::Boolean(b)) => {
            values_equal(&Value::Number(if *b { 1.0 } else { 0.0 }), other)
        }
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            match s.trim().parse::<f64>() {
                Ok(parsed) => parsed == *n,
                Err(_) => Value::Number(*n).to_string() == *s,
            }
        }
        (Value::Date(a), Value::Date(b)) => a == b,
        (Value::Date(d), Value::String(s)) | (Value::String(s), Value::Date(d)) => {
            parse_date(s) == Some(*d)
        }
        (Value::String(a), Value::String(b)) => a == b,
        _ => left.to_string() == right.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    #[rstest]
    #[case(Value::Number(1.0), Value::Boolean(true), true)]
    #[case(Value::Number(0.0), Value::Boolean(false), true)]
    #[case(Value::Number(2.0), Value::string("2"), true)]
    #[case(Value::Number(2.0), Value::string("2.0"), true)]
    #[case(Value::string("a"), Value::string("a"), true)]
    #[case(Value::string("true"), Value::Boolean(true), true)]
    #[case(Value::Null, Value::Null, true)]
    #[case(Value::Null, Value::Number(0.0), false)]
    #[case(Value::Number(1.0), Value::string("one"), false)]
    fn test_equality(#[case] left: Value, #[case] right: Value, #[case] expected: bool) {
        assert_eq!(values_equal(&left, &right), expected);
        assert_eq!(values_equal(&right, &left), expected);
    }

    #[test]
    fn test_dates_compare_with_text() {
        let date = Value::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(compare(&date, &Value::string("2024-02-01")), Ok(Some(Ordering::Less)));
        assert!(values_equal(&date, &Value::string("2024-1-15")));
    }

    #[test]
    fn test_number_and_text_compare_numerically() {
        assert_eq!(
            compare(&Value::Number(10.0), &Value::string("9")),
            Ok(Some(Ordering::Greater))
        );
        assert!(compare(&Value::Number(1.0), &Value::string("x")).is_err());
        assert_eq!(compare(&Value::Number(f64::NAN), &Value::Number(1.0)), Ok(None));
    }
}
