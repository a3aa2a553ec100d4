//! Data snapshot an expression is evaluated against

use hisexpr_ast::{DataItem, NamedValue, ProgramVariable};
use hisexpr_types::{Value, VariableValue};
use std::collections::HashMap;

/// Immutable per-call input to evaluation.
///
/// Data items are looked up with their resolved modifiers first, then
/// without, so a caller that ignores modifiers can key by the bare item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpressionData {
    /// Rule variables by name
    pub rule_variables: HashMap<String, VariableValue>,
    pub program_variables: HashMap<ProgramVariable, Value>,
    /// Keyed lists such as the current user's roles (`USER`) or the members
    /// of an organisation unit group (keyed by group)
    pub supplementary: HashMap<String, Vec<String>>,
    pub data_items: HashMap<DataItem, Value>,
    /// Value series bound to data items inside aggregating functions
    pub data_item_series: HashMap<DataItem, Vec<Value>>,
    pub named_values: HashMap<NamedValue, Value>,
}

impl ExpressionData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: VariableValue) -> Self {
        self.rule_variables.insert(name.into(), value);
        self
    }

    pub fn with_program_variable(mut self, variable: ProgramVariable, value: impl Into<Value>) -> Self {
        self.program_variables.insert(variable, value.into());
        self
    }

    pub fn with_supplementary(
        mut self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.supplementary
            .insert(key.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_item(mut self, item: DataItem, value: impl Into<Value>) -> Self {
        self.data_items.insert(item, value.into());
        self
    }

    pub fn with_series(mut self, item: DataItem, values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        self.data_item_series
            .insert(item, values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_named_value(mut self, name: NamedValue, value: impl Into<Value>) -> Self {
        self.named_values.insert(name, value.into());
        self
    }

    pub fn item(&self, item: &DataItem) -> Option<&Value> {
        self.data_items
            .get(item)
            .or_else(|| self.data_items.get(&item.base()))
    }

    pub fn series(&self, item: &DataItem) -> Option<&[Value]> {
        self.data_item_series
            .get(item)
            .or_else(|| self.data_item_series.get(&item.base()))
            .map(Vec::as_slice)
    }

    pub fn variable(&self, name: &str) -> Option<&VariableValue> {
        self.rule_variables.get(name)
    }

    pub fn program_variable(&self, variable: ProgramVariable) -> Option<&Value> {
        self.program_variables.get(&variable)
    }

    pub fn named_value(&self, name: NamedValue) -> Option<&Value> {
        self.named_values.get(&name)
    }

    pub fn supplementary(&self, key: &str) -> &[String] {
        self.supplementary.get(key).map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hisexpr_ast::{DataItemType, QueryMods};

    #[test]
    fn test_item_lookup_falls_back_to_base() {
        let item = DataItem::of(DataItemType::DataElementOperand, &["FTRrcoaog83"]);
        let data = ExpressionData::new().with_item(item.clone(), 4.0);
        let shifted = item.clone().with_query_mods(Some(QueryMods {
            period_offset: -1,
            ..QueryMods::default()
        }));
        assert_eq!(data.item(&shifted), Some(&Value::Number(4.0)));

        let data = data.with_item(shifted.clone(), 2.0);
        assert_eq!(data.item(&shifted), Some(&Value::Number(2.0)));
        assert_eq!(data.item(&item), Some(&Value::Number(4.0)));
    }

    #[test]
    fn test_missing_supplementary_is_empty() {
        let data = ExpressionData::new().with_supplementary("USER", ["admin"]);
        assert_eq!(data.supplementary("USER"), ["admin".to_string()]);
        assert!(data.supplementary("OTHER").is_empty());
    }
}
