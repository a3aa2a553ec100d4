//! A parsed expression and the operations over it

use hisexpr_ast::{
    DataItem, NamedFunction, Node, ProgramVariable, collect_data_items, collect_functions,
    collect_program_variables, collect_uids, collect_variable_names, describe, normalise,
    regenerate,
};
use hisexpr_diagnostics::{ExprError, Result};
use hisexpr_eval::{DefaultFunctions, ExpressionData, FunctionProvider, StaticEvaluator};
use hisexpr_parser::{ExpressionMode, parse};
use hisexpr_types::{TypeChecker, Validation, Value, VariableValue, annotate_variables};
use log::debug;
use std::collections::HashMap;
use std::fmt;

/// An expression parsed in one dialect.
///
/// The tree is immutable once parsed and can be validated and evaluated any
/// number of times, from any thread.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Expression {
    source: String,
    mode: ExpressionMode,
    root: Node,
}

impl Expression {
    /// Parse `source` in `mode`
    pub fn parse(source: &str, mode: ExpressionMode) -> Result<Self> {
        Self::parse_with(source, mode, false)
    }

    /// Parse `source` in `mode`, keeping whitespace and comments so that
    /// [`normalise`](Self::normalise) reproduces the source exactly
    pub fn parse_annotated(source: &str, mode: ExpressionMode) -> Result<Self> {
        Self::parse_with(source, mode, true)
    }

    fn parse_with(source: &str, mode: ExpressionMode, annotate: bool) -> Result<Self> {
        let root = parse(source, mode, annotate)?;
        Ok(Self {
            source: source.to_string(),
            mode,
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn mode(&self) -> ExpressionMode {
        self.mode
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Run the type checker and the dialect validators, returning every
    /// finding without failing.
    ///
    /// Rule variables found in `variables` have their node typed by the
    /// supplied value. The parsed tree itself is left untouched.
    pub fn check(&self, variables: &HashMap<String, VariableValue>) -> Validation {
        let dialect = self.mode.dialect();
        let root = annotate_variables(&self.root, variables);
        let mut report =
            TypeChecker::new(&StaticEvaluator).check_with_result(&root, &dialect.result_types);
        for validator in &dialect.validators {
            validator.validate(&root, variables, &mut report);
        }
        debug!(
            "Validated {} expression: {} error(s), {} warning(s)",
            self.mode,
            report.errors.len(),
            report.warnings.len()
        );
        report
    }

    /// Validate the expression; errors and warnings are both fatal
    pub fn validate(&self, variables: &HashMap<String, VariableValue>) -> Result<()> {
        let report = self.check(variables);
        match ExprError::from_issues(report.errors, report.warnings) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Evaluate with the built-in function implementations
    pub fn evaluate(&self, data: &ExpressionData) -> Result<Value> {
        self.evaluate_with(data, &DefaultFunctions)
    }

    /// Evaluate, dispatching function calls to `provider`
    pub fn evaluate_with(&self, data: &ExpressionData, provider: &dyn FunctionProvider) -> Result<Value> {
        Ok(hisexpr_eval::evaluate(&self.root, data, provider)?)
    }

    /// The expression text regenerated from the tree
    pub fn normalise(&self) -> String {
        normalise(&self.root)
    }

    /// The expression text with identifiers replaced by display names
    pub fn describe(&self, names: &HashMap<String, String>) -> String {
        describe(&self.root, names)
    }

    /// The expression text with data items replaced by known values
    pub fn regenerate(&self, values: &HashMap<DataItem, f64>) -> String {
        regenerate(&self.root, values)
    }

    pub fn data_items(&self) -> Vec<DataItem> {
        collect_data_items(&self.root)
    }

    /// Names of the rule variables referenced
    pub fn variable_names(&self) -> Vec<String> {
        collect_variable_names(&self.root)
    }

    pub fn program_variables(&self) -> Vec<ProgramVariable> {
        collect_program_variables(&self.root)
    }

    /// Organisation unit UIDs passed to `orgUnit.*` functions
    pub fn org_unit_uids(&self) -> Vec<String> {
        collect_uids(&self.root)
    }

    pub fn functions(&self) -> Vec<NamedFunction> {
        collect_functions(&self.root)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalise())
    }
}
