//! Arithmetic operators
//!
//! Finite operands are computed exactly in decimal and converted back to a
//! double, so `0.1 + 0.2` is `0.3`. Non-finite operands and division or
//! modulo by zero use IEEE double arithmetic, giving `Infinity` and `NaN`
//! instead of errors.

use crate::engine::Evaluator;
use crate::error::{EvalError, EvalResult};
use hisexpr_ast::{BinaryOp, Node, UnaryOp, ValueType};
use hisexpr_types::{Value, coerce};
use log::warn;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use std::str::FromStr;

impl Evaluator<'_> {
    /// Evaluate `^`, `*`, `/`, `%`, `+` and `-` on operands coerced to numbers
    pub fn eval_arithmetic(&mut self, op: BinaryOp, left: Value, right: &Node) -> EvalResult<Value> {
        let left = coerce(left, ValueType::Number)?;
        let right = self.eval_as(right, ValueType::Number)?;

        // Null propagation
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(arithmetic(op, a, b))),
            _ => Ok(Value::Null),
        }
    }

    /// Evaluate a prefix operator
    pub fn eval_unary(&mut self, op: UnaryOp, children: &[Node]) -> EvalResult<Value> {
        let [operand] = children else {
            return Err(EvalError::illegal_operation(format!(
                "`{}` needs one operand",
                op.symbol()
            )));
        };
        match op {
            UnaryOp::Plus => self.eval_as(operand, ValueType::Number),
            UnaryOp::Minus => Ok(match self.eval_as(operand, ValueType::Number)? {
                Value::Number(n) => Value::Number(-n),
                _ => Value::Null,
            }),
            UnaryOp::Not => self.eval_not(operand),
            UnaryOp::Distinct => Err(EvalError::illegal_operation(
                "`distinct` is only allowed on the input of an aggregate function",
            )),
        }
    }
}

/// Apply an arithmetic operator. Other operators yield `NaN`.
pub fn arithmetic(op: BinaryOp, left: f64, right: f64) -> f64 {
    let by_zero = matches!(op, BinaryOp::Div | BinaryOp::Mod) && right == 0.0;
    if !left.is_finite() || !right.is_finite() || by_zero {
        return double_arithmetic(op, left, right);
    }
    if op == BinaryOp::Pow && right.fract() != 0.0 {
        return left.powf(right);
    }
    match decimal_arithmetic(op, left, right) {
        Some(result) => result,
        None => {
            warn!(
                "Decimal arithmetic failed for {left} {} {right}, using double arithmetic",
                op.symbol()
            );
            double_arithmetic(op, left, right)
        }
    }
}

fn double_arithmetic(op: BinaryOp, left: f64, right: f64) -> f64 {
    match op {
        BinaryOp::Pow => left.powf(right),
        BinaryOp::Mul => left * right,
        BinaryOp::Div => left / right,
        BinaryOp::Mod => left % right,
        BinaryOp::Add => left + right,
        BinaryOp::Sub => left - right,
        _ => f64::NAN,
    }
}

fn decimal_arithmetic(op: BinaryOp, left: f64, right: f64) -> Option<f64> {
    let a = to_decimal(left)?;
    let b = to_decimal(right)?;
    let result = match op {
        BinaryOp::Pow => a.checked_powi(right as i64),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div => a.checked_div(b),
        BinaryOp::Mod => a.checked_rem(b),
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        _ => None,
    }?;
    from_decimal(result)
}

/// The decimal with the shortest text that reads back as `n`
fn to_decimal(n: f64) -> Option<Decimal> {
    Decimal::from_str(&n.to_string()).ok()
}

fn from_decimal(d: Decimal) -> Option<f64> {
    d.to_string().parse().ok()
}

/// Round half away from zero to `decimals` places
pub fn round_half_up(n: f64, decimals: u32) -> f64 {
    to_decimal(n)
        .map(|d| d.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero))
        .and_then(from_decimal)
        .unwrap_or_else(|| {
            let factor = 10f64.powi(decimals as i32);
            (n * factor).round() / factor
        })
}
