//! Command-line inputs turned into expression data

use anyhow::{Context, Result, anyhow, bail};
use hisexpr::types::parse_date;
use hisexpr::{
    DataItem, Expression, ExpressionData, ExpressionMode, ProgramVariable, Value, ValueType,
    VariableValue,
};
use std::collections::HashMap;

/// Split `name=value`
pub fn split_assignment(text: &str) -> Result<(&str, &str)> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected `name=value`, got `{text}`"))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("Missing name in `{text}`");
    }
    Ok((name, value.trim()))
}

/// Interpret a command-line value: `null`, a boolean, a number, a date or text
pub fn parse_value(text: &str) -> Value {
    match text {
        "" | "null" => Value::Null,
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        _ => {
            if let Ok(n) = text.parse::<f64>() {
                Value::Number(n)
            } else if let Some(date) = parse_date(text) {
                Value::Date(date)
            } else {
                Value::string(text)
            }
        }
    }
}

fn variable_value(text: &str) -> VariableValue {
    let value = parse_value(text);
    let value_type = match value.value_type() {
        ValueType::Mixed => ValueType::String,
        t => t,
    };
    VariableValue::new(value_type, value)
}

/// The data item named by `key`, written the way it appears in an
/// expression of `mode`
fn data_item(key: &str, mode: ExpressionMode) -> Result<DataItem> {
    let expr = Expression::parse(key, mode)
        .with_context(|| format!("Invalid data item `{key}`"))?;
    expr.data_items()
        .first()
        .map(DataItem::base)
        .ok_or_else(|| anyhow!("`{key}` is not a data item"))
}

/// Rule variables from `--var name=value` arguments
pub fn variables(assignments: &[String]) -> Result<HashMap<String, VariableValue>> {
    assignments
        .iter()
        .map(|assignment| {
            let (name, value) = split_assignment(assignment)?;
            Ok((name.to_string(), variable_value(value)))
        })
        .collect()
}

/// Display names from `--name id=label` arguments
pub fn names(assignments: &[String]) -> Result<HashMap<String, String>> {
    assignments
        .iter()
        .map(|assignment| {
            let (id, label) = split_assignment(assignment)?;
            Ok((id.to_string(), label.to_string()))
        })
        .collect()
}

/// Raw data as given on the command line
#[derive(Debug, Default)]
pub struct DataArgs<'a> {
    pub variables: &'a [String],
    pub program_variables: &'a [String],
    pub data_items: &'a [String],
}

impl DataArgs<'_> {
    /// Build the evaluation snapshot.
    ///
    /// A data item value with commas binds a series for aggregate functions.
    pub fn build(&self, mode: ExpressionMode) -> Result<ExpressionData> {
        let mut data = ExpressionData {
            rule_variables: variables(self.variables)?,
            ..Default::default()
        };
        for assignment in self.program_variables {
            let (name, value) = split_assignment(assignment)?;
            let variable = ProgramVariable::from_name(name)
                .ok_or_else(|| anyhow!("Unknown program variable `{name}`"))?;
            data = data.with_program_variable(variable, parse_value(value));
        }
        for assignment in self.data_items {
            let (key, value) = split_assignment(assignment)?;
            let item = data_item(key, mode)?;
            data = if value.contains(',') {
                data.with_series(item, value.split(',').map(|v| parse_value(v.trim())))
            } else {
                data.with_item(item, parse_value(value))
            };
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hisexpr::ast::DataItemType;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("12.5", Value::Number(12.5))]
    #[case("true", Value::Boolean(true))]
    #[case("null", Value::Null)]
    #[case("Ana", Value::string("Ana"))]
    fn test_parse_value(#[case] text: &str, #[case] expected: Value) {
        assert_eq!(parse_value(text), expected);
    }

    #[test]
    fn test_dates_are_recognised() {
        assert!(matches!(parse_value("2024-01-15"), Value::Date(_)));
    }

    #[test]
    fn test_split_assignment() {
        assert_eq!(split_assignment("age = 42").unwrap(), ("age", "42"));
        assert!(split_assignment("age").is_err());
        assert!(split_assignment("=1").is_err());
    }

    #[test]
    fn test_build_binds_items_and_series() {
        let items = [
            "#{FTRrcoaog83}=4".to_string(),
            "#{eY5ehpbEsB7}=1, 2, 3".to_string(),
        ];
        let args = DataArgs {
            data_items: &items,
            ..Default::default()
        };
        let data = args.build(ExpressionMode::PredictorGeneratorExpression).unwrap();

        let scalar = DataItem::of(DataItemType::DataElementOperand, &["FTRrcoaog83"]);
        assert_eq!(data.item(&scalar), Some(&Value::Number(4.0)));
        let series = DataItem::of(DataItemType::DataElementOperand, &["eY5ehpbEsB7"]);
        assert_eq!(data.series(&series).map(<[Value]>::len), Some(3));
    }

    #[test]
    fn test_variables_are_typed_by_value() {
        let vars = variables(&["age=42".to_string(), "name=Ana".to_string()]).unwrap();
        assert_eq!(vars["age"].value_type, ValueType::Number);
        assert_eq!(vars["name"].value_type, ValueType::String);
    }
}
