//! Runtime values

use chrono::NaiveDate;
use hisexpr_ast::ValueType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A runtime value produced by evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// Missing or unknown
    Null,
    Number(f64),
    Boolean(bool),
    String(String),
    Date(NaiveDate),
    /// A rule variable, unwrapped to its value or type default by coercions
    Variable(Box<VariableValue>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// Null, or a variable without a value
    pub fn is_null(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Variable(var) => var.value.is_none(),
            _ => false,
        }
    }

    /// The dynamic type of the value
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Null => ValueType::Mixed,
            Self::Number(_) => ValueType::Number,
            Self::Boolean(_) => ValueType::Boolean,
            Self::String(_) => ValueType::String,
            Self::Date(_) => ValueType::Date,
            Self::Variable(var) => var.value_type,
        }
    }

    /// Unwrap variables to their value or type default
    pub fn unwrap_variable(self) -> Value {
        match self {
            Self::Variable(var) => var.value_or_default(),
            other => other,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<VariableValue> for Value {
    fn from(var: VariableValue) -> Self {
        Self::Variable(Box::new(var))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Number(n) => f.write_str(&crate::number_to_string(*n)),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::String(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Variable(var) => write!(f, "{}", var.value_or_default()),
        }
    }
}

/// Value of a rule variable as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableValue {
    pub value_type: ValueType,
    /// Current value, `None` when the variable has no value
    pub value: Option<Box<Value>>,
    /// All values seen for the variable, newest last
    pub candidates: Vec<String>,
    /// Date of the event the value came from
    pub event_date: Option<NaiveDate>,
}

impl VariableValue {
    pub fn new(value_type: ValueType, value: impl Into<Value>) -> Self {
        let value = value.into();
        Self {
            value_type,
            value: (!value.is_null()).then(|| Box::new(value)),
            candidates: Vec::new(),
            event_date: None,
        }
    }

    /// A variable of the given type with no value
    pub fn empty(value_type: ValueType) -> Self {
        Self {
            value_type,
            value: None,
            candidates: Vec::new(),
            event_date: None,
        }
    }

    pub fn with_candidates(mut self, candidates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.candidates = candidates.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_event_date(mut self, date: NaiveDate) -> Self {
        self.event_date = Some(date);
        self
    }

    /// The value, or the default of the variable's type when missing
    pub fn value_or_default(&self) -> Value {
        match &self.value {
            Some(value) => (**value).clone(),
            None => match self.value_type {
                ValueType::Number => Value::Number(0.0),
                ValueType::Boolean => Value::Boolean(false),
                ValueType::String => Value::String(String::new()),
                _ => Value::Null,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_defaults() {
        let empty = VariableValue::empty(ValueType::Number);
        assert_eq!(empty.value_or_default(), Value::Number(0.0));
        assert!(Value::from(empty).is_null());

        let text = VariableValue::empty(ValueType::String);
        assert_eq!(Value::from(text).unwrap_variable(), Value::string(""));

        let date = VariableValue::empty(ValueType::Date);
        assert_eq!(date.value_or_default(), Value::Null);
    }

    #[test]
    fn test_null_value_is_not_stored() {
        let var = VariableValue::new(ValueType::Number, Value::Null);
        assert!(var.value.is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(Value::Date(date).to_string(), "2024-03-09");
        assert_eq!(Value::Null.to_string(), "null");
    }
}
