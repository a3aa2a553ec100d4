//! Logical operators with three-valued logic

use crate::engine::Evaluator;
use crate::error::EvalResult;
use hisexpr_ast::{Node, ValueType};
use hisexpr_types::{Value, coerce};

impl Evaluator<'_> {
    /// Evaluate `and` / `&&`
    ///
    /// Truth table:
    /// | A     | B     | A and B |
    /// |-------|-------|---------|
    /// | true  | true  | true    |
    /// | true  | false | false   |
    /// | false | false | false   |
    /// | true  | null  | null    |
    /// | false | null  | null    |
    /// | null  | null  | null    |
    pub fn eval_and(&mut self, left: Value, right: &Node) -> EvalResult<Value> {
        let left = coerce(left, ValueType::Boolean)?;
        let right = self.eval_as(right, ValueType::Boolean)?;
        Ok(and(left.as_boolean(), right.as_boolean()).into())
    }

    /// Evaluate `or` / `||`
    ///
    /// Truth table:
    /// | A     | B     | A or B |
    /// |-------|-------|--------|
    /// | true  | true  | true   |
    /// | true  | false | true   |
    /// | false | false | false  |
    /// | true  | null  | true   |
    /// | false | null  | null   |
    /// | null  | null  | null   |
    pub fn eval_or(&mut self, left: Value, right: &Node) -> EvalResult<Value> {
        let left = coerce(left, ValueType::Boolean)?;
        let right = self.eval_as(right, ValueType::Boolean)?;
        Ok(or(left.as_boolean(), right.as_boolean()).into())
    }

    /// Evaluate `!` / `not`; null stays null
    pub fn eval_not(&mut self, operand: &Node) -> EvalResult<Value> {
        let operand = self.eval_as(operand, ValueType::Boolean)?;
        Ok(operand.as_boolean().map(|b| !b).into())
    }
}

pub fn and(left: Option<bool>, right: Option<bool>) -> Option<bool> {
    match (left, right) {
        (Some(a), Some(b)) => Some(a && b),
        _ => None,
    }
}

pub fn or(left: Option<bool>, right: Option<bool>) -> Option<bool> {
    match (left, right) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(true), Some(true), Some(true))]
    #[case(Some(true), Some(false), Some(false))]
    #[case(Some(true), None, None)]
    #[case(Some(false), None, None)]
    #[case(None, Some(false), None)]
    #[case(None, None, None)]
    fn test_and(#[case] a: Option<bool>, #[case] b: Option<bool>, #[case] expected: Option<bool>) {
        assert_eq!(and(a, b), expected);
    }

    #[rstest]
    #[case(Some(false), Some(false), Some(false))]
    #[case(Some(false), Some(true), Some(true))]
    #[case(None, Some(true), Some(true))]
    #[case(Some(true), None, Some(true))]
    #[case(None, Some(false), None)]
    #[case(None, None, None)]
    fn test_or(#[case] a: Option<bool>, #[case] b: Option<bool>, #[case] expected: Option<bool>) {
        assert_eq!(or(a, b), expected);
    }
}
