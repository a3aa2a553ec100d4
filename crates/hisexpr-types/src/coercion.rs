//! Type assignability and runtime coercions
//!
//! Two relations decide whether a value of one static type may be used where
//! another is expected:
//! - strict assignability, which needs no conversion at all
//! - maybe-assignability, which holds when a runtime conversion exists that
//!   may still fail on actual values

use crate::Value;
use chrono::NaiveDate;
use hisexpr_ast::ValueType;
use thiserror::Error;

/// Coercion errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    /// Cannot convert a value to the requested type
    #[error("Cannot convert `{value}` to type {to}")]
    CannotConvert { value: String, to: ValueType },
}

/// Type coercion result
pub type CoercionResult<T> = Result<T, CoercionError>;

fn cannot_convert(value: &Value, to: ValueType) -> CoercionError {
    CoercionError::CannotConvert {
        value: value.to_string(),
        to,
    }
}

/// Assignability rules over [`ValueType`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeCoercer;

impl TypeCoercer {
    pub fn new() -> Self {
        Self
    }

    /// Check if `from` can be used as `to` without conversion.
    ///
    /// Strings are pre-approved as dates since quoted text is the only date
    /// literal syntax. `Same` is never strictly assignable to anything.
    pub fn is_assignable(&self, from: ValueType, to: ValueType) -> bool {
        if from == ValueType::Same {
            return false;
        }
        from == to
            || from == ValueType::Mixed
            || to == ValueType::Mixed
            || to == ValueType::Same
            || (from == ValueType::String && to == ValueType::Date)
    }

    /// Check if `from` can be converted to `to` at runtime
    pub fn is_maybe_assignable(&self, from: ValueType, to: ValueType) -> bool {
        if self.is_assignable(from, to) {
            return true;
        }
        match (from, to) {
            (_, ValueType::String) => true,
            (ValueType::String | ValueType::Boolean, ValueType::Number) => true,
            (ValueType::String, ValueType::Date) => true,
            (ValueType::String | ValueType::Number, ValueType::Boolean) => true,
            _ => false,
        }
    }
}

/// Convert a value to the given type. Null stays null.
pub fn coerce(value: Value, to: ValueType) -> CoercionResult<Value> {
    if to == ValueType::Mixed || to == ValueType::Same {
        return Ok(value);
    }
    let value = value.unwrap_variable();
    if value.is_null() {
        return Ok(Value::Null);
    }
    Ok(match to {
        ValueType::Number => Value::Number(to_number(&value)?),
        ValueType::Boolean => Value::Boolean(to_boolean(&value)?),
        ValueType::Date => Value::Date(to_date(&value)?),
        ValueType::String => Value::String(to_string(&value)),
        ValueType::Mixed | ValueType::Same => value,
    })
}

/// Booleans become 1 or 0, numeric strings parse, everything else fails
pub fn to_number(value: &Value) -> CoercionResult<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| cannot_convert(value, ValueType::Number)),
        Value::Variable(var) => to_number(&var.value_or_default()),
        Value::Date(_) | Value::Null => Err(cannot_convert(value, ValueType::Number)),
    }
}

/// Numbers must be integral with 0 as false. Text that is not a number is
/// true only when it reads `true`.
pub fn to_boolean(value: &Value) -> CoercionResult<bool> {
    match value {
        Value::Boolean(b) => Ok(*b),
        Value::Number(n) => number_to_boolean(*n).ok_or_else(|| cannot_convert(value, ValueType::Boolean)),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(n) => number_to_boolean(n).ok_or_else(|| cannot_convert(value, ValueType::Boolean)),
            Err(_) => Ok(s.trim().eq_ignore_ascii_case("true")),
        },
        Value::Variable(var) => to_boolean(&var.value_or_default()),
        Value::Date(_) | Value::Null => Err(cannot_convert(value, ValueType::Boolean)),
    }
}

fn number_to_boolean(n: f64) -> Option<bool> {
    (n.is_finite() && n.fract() == 0.0).then_some(n != 0.0)
}

/// ISO dates, tolerating single-digit month and day
pub fn to_date(value: &Value) -> CoercionResult<NaiveDate> {
    match value {
        Value::Date(d) => Ok(*d),
        Value::String(s) => parse_date(s).ok_or_else(|| cannot_convert(value, ValueType::Date)),
        Value::Variable(var) => to_date(&var.value_or_default()),
        _ => Err(cannot_convert(value, ValueType::Date)),
    }
}

/// Parse `YYYY-M?M-D?D`
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.trim().splitn(3, '-');
    let year = parts.next()?;
    let month = parts.next()?;
    let day = parts.next()?;
    if year.len() != 4 || !(1..=2).contains(&month.len()) || !(1..=2).contains(&day.len()) {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

pub fn to_string(value: &Value) -> String {
    match value {
        Value::Variable(var) => to_string(&var.value_or_default()),
        other => other.to_string(),
    }
}

/// Integral numbers print without a fractional part
pub fn number_to_string(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}
