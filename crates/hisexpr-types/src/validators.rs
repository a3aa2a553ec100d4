//! Dialect-specific semantic checks run after type checking

use crate::{Validation, VariableValue};
use hisexpr_ast::{Node, VariableRef, normalise};
use hisexpr_diagnostics::{E0104, E0105, Issue};
use std::collections::HashMap;

/// A semantic check a dialect may require
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Validator {
    /// Aggregating functions may not appear inside one another
    NoNestedAggregation,
    /// Every referenced rule variable must have a supplied value
    RuleVariablesDefined,
}

impl Validator {
    pub fn validate(
        &self,
        root: &Node,
        variables: &HashMap<String, VariableValue>,
        report: &mut Validation,
    ) {
        match self {
            Self::NoNestedAggregation => nested_aggregation(root, false, report),
            Self::RuleVariablesDefined => root.walk(&mut |node| {
                if let Some(VariableRef::Rule(name)) = node.variable() {
                    if !variables.contains_key(name) {
                        report.error(
                            Issue::error(E0104, format!("Unknown variable: '{name}'"))
                                .with_span(node.span),
                        );
                    }
                }
            }),
        }
    }
}

fn nested_aggregation(node: &Node, inside: bool, report: &mut Validation) {
    let aggregating = node.function().is_some_and(|f| f.is_aggregating());
    if aggregating && inside {
        report.error(
            Issue::error(
                E0105,
                format!(
                    "Aggregate function `{}` cannot be nested inside another aggregate",
                    normalise(node).trim()
                ),
            )
            .with_span(node.span),
        );
    }
    for child in &node.children {
        nested_aggregation(child, inside || aggregating, report);
    }
}
