//! Expression dialects
//!
//! Each [`ExpressionMode`] selects an immutable [`Dialect`]: the fragments
//! its grammar accepts, the validators run after type checking and the
//! result types the whole expression may have. The tables are built once
//! per process.

use crate::fragment::{function_params, modifier_params};
use crate::Fragment;
use hisexpr_ast::{DataItemModifier, DataItemType, NamedFunction, ValueType};
use hisexpr_types::Validator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Where an expression is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExpressionMode {
    ValidationRuleExpression,
    PredictorGeneratorExpression,
    PredictorSkipTest,
    #[default]
    IndicatorExpression,
    ProgramIndicatorExpression,
    ProgramIndicatorFilter,
    RuleEngineCondition,
    RuleEngineAction,
}

impl ExpressionMode {
    pub const ALL: [ExpressionMode; 8] = [
        Self::ValidationRuleExpression,
        Self::PredictorGeneratorExpression,
        Self::PredictorSkipTest,
        Self::IndicatorExpression,
        Self::ProgramIndicatorExpression,
        Self::ProgramIndicatorFilter,
        Self::RuleEngineCondition,
        Self::RuleEngineAction,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::ValidationRuleExpression => "VALIDATION_RULE_EXPRESSION",
            Self::PredictorGeneratorExpression => "PREDICTOR_GENERATOR_EXPRESSION",
            Self::PredictorSkipTest => "PREDICTOR_SKIP_TEST",
            Self::IndicatorExpression => "INDICATOR_EXPRESSION",
            Self::ProgramIndicatorExpression => "PROGRAM_INDICATOR_EXPRESSION",
            Self::ProgramIndicatorFilter => "PROGRAM_INDICATOR_FILTER",
            Self::RuleEngineCondition => "RULE_ENGINE_CONDITION",
            Self::RuleEngineAction => "RULE_ENGINE_ACTION",
        }
    }

    pub fn dialect(&self) -> &'static Dialect {
        &DIALECTS[*self as usize]
    }
}

impl fmt::Display for ExpressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExpressionMode {
    type Err = String;

    /// Accepts `VALIDATION_RULE_EXPRESSION` as well as
    /// `validation-rule-expression`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == wanted)
            .ok_or_else(|| format!("Unknown expression mode `{s}`"))
    }
}

/// Immutable grammar and validation settings of one mode
#[derive(Debug)]
pub struct Dialect {
    pub mode: ExpressionMode,
    /// Introducer text and fragment, longest introducer first
    fragments: Vec<(String, Fragment)>,
    pub validators: Vec<Validator>,
    /// Types the top-level expression may have
    pub result_types: Vec<ValueType>,
}

impl Dialect {
    /// The fragment whose introducer starts `input`, preferring the longest
    pub fn lookup(&self, input: &str) -> Option<(&str, &Fragment)> {
        self.fragments
            .iter()
            .find(|(introducer, _)| input.starts_with(introducer.as_str()))
            .map(|(introducer, fragment)| (introducer.as_str(), fragment))
    }

    pub fn fragments(&self) -> impl Iterator<Item = (&str, &Fragment)> {
        self.fragments.iter().map(|(i, f)| (i.as_str(), f))
    }

    pub fn supports(&self, function: NamedFunction) -> bool {
        self.fragments
            .iter()
            .any(|(_, f)| matches!(f, Fragment::Function(g, _) if *g == function))
    }
}

struct DialectBuilder {
    fragments: Vec<(String, Fragment)>,
}

impl DialectBuilder {
    fn new() -> Self {
        Self {
            fragments: Vec::new(),
        }
    }

    fn named(mut self, introducer: impl Into<String>, fragment: Fragment) -> Self {
        self.fragments.push((introducer.into(), fragment));
        self
    }

    fn fragment(self, fragment: Fragment) -> Self {
        let introducer = fragment.introducer();
        self.named(introducer, fragment)
    }

    fn functions(self, filter: impl Fn(NamedFunction) -> bool) -> Self {
        NamedFunction::ALL
            .iter()
            .copied()
            .filter(|f| filter(*f))
            .fold(self, |builder, f| {
                builder.fragment(Fragment::Function(f, function_params(f)))
            })
    }

    fn data_items(self, item_types: &[DataItemType]) -> Self {
        item_types
            .iter()
            .fold(self, |builder, t| builder.fragment(Fragment::DataItem(*t)))
    }

    fn modifiers(self) -> Self {
        DataItemModifier::ALL
            .iter()
            .copied()
            .filter(|m| *m != DataItemModifier::PeriodAggregation)
            .fold(self, |builder, m| {
                builder.fragment(Fragment::Modifier(m, modifier_params(m)))
            })
    }

    fn build(
        mut self,
        mode: ExpressionMode,
        validators: &[Validator],
        result_types: &[ValueType],
    ) -> Dialect {
        self.fragments
            .sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));
        Dialect {
            mode,
            fragments: self.fragments,
            validators: validators.to_vec(),
            result_types: result_types.to_vec(),
        }
    }
}

fn is_common(f: NamedFunction) -> bool {
    !f.is_aggregating() && !f.takes_org_unit_uids() && !is_program_rule(f)
}

fn is_program_rule(f: NamedFunction) -> bool {
    f.name().starts_with("d2:")
}

fn common_or_org_unit(f: NamedFunction) -> bool {
    is_common(f) || f.takes_org_unit_uids()
}

fn common_or_aggregate(f: NamedFunction) -> bool {
    is_common(f) || f.is_aggregating()
}

fn predictor(mode: ExpressionMode, result_types: &[ValueType]) -> Dialect {
    DialectBuilder::new()
        .data_items(&[
            DataItemType::DataElementOperand,
            DataItemType::Constant,
            DataItemType::OrgUnitGroup,
            DataItemType::ProgramDataElement,
            DataItemType::ProgramAttribute,
            DataItemType::ProgramIndicator,
        ])
        .functions(common_or_aggregate)
        .fragment(Fragment::NamedValue)
        .modifiers()
        .build(mode, &[Validator::NoNestedAggregation], result_types)
}

fn program_indicator(mode: ExpressionMode, result_types: &[ValueType]) -> Dialect {
    DialectBuilder::new()
        .data_items(&[
            DataItemType::ProgramStageDataElement,
            DataItemType::ProgramAttribute,
            DataItemType::Constant,
            DataItemType::ProgramStageEventDate,
        ])
        .fragment(Fragment::ProgramVariable)
        .functions(|f| is_common(f) || is_program_rule(f) || f.is_aggregating())
        .modifiers()
        .build(mode, &[], result_types)
}

fn rule_engine(mode: ExpressionMode, result_types: &[ValueType]) -> Dialect {
    DialectBuilder::new()
        .named("#{", Fragment::RuleVariable)
        .named("A{", Fragment::RuleVariable)
        .fragment(Fragment::ProgramVariable)
        .data_items(&[DataItemType::Constant])
        .functions(|f| is_common(f) || is_program_rule(f))
        .build(mode, &[Validator::RuleVariablesDefined], result_types)
}

fn build(mode: ExpressionMode) -> Dialect {
    use ValueType::{Boolean as B, Date as D, Number as N, String as T};
    match mode {
        ExpressionMode::ValidationRuleExpression => DialectBuilder::new()
            .data_items(&[
                DataItemType::DataElementOperand,
                DataItemType::Constant,
                DataItemType::OrgUnitGroup,
                DataItemType::ReportingRate,
                DataItemType::Indicator,
            ])
            .functions(common_or_org_unit)
            .build(mode, &[], &[N]),
        ExpressionMode::PredictorGeneratorExpression => {
            predictor(mode, &[N, T, B])
        }
        ExpressionMode::PredictorSkipTest => predictor(mode, &[B]),
        ExpressionMode::IndicatorExpression => DialectBuilder::new()
            .data_items(&[
                DataItemType::DataElementOperand,
                DataItemType::Constant,
                DataItemType::ProgramDataElement,
                DataItemType::ProgramAttribute,
                DataItemType::ProgramIndicator,
                DataItemType::Indicator,
                DataItemType::OrgUnitGroup,
                DataItemType::ReportingRate,
                DataItemType::ProgramStageEventDate,
            ])
            .functions(common_or_org_unit)
            .fragment(Fragment::NamedValue)
            .modifiers()
            .build(mode, &[], &[N]),
        ExpressionMode::ProgramIndicatorExpression => {
            program_indicator(mode, &[N, D, T, B])
        }
        ExpressionMode::ProgramIndicatorFilter => program_indicator(mode, &[B]),
        ExpressionMode::RuleEngineCondition => rule_engine(mode, &[B]),
        ExpressionMode::RuleEngineAction => rule_engine(mode, &[N, B, T, D]),
    }
}

static DIALECTS: LazyLock<[Dialect; 8]> = LazyLock::new(|| ExpressionMode::ALL.map(build));

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_dialects_are_indexed_by_mode() {
        for mode in ExpressionMode::ALL {
            assert_eq!(mode.dialect().mode, mode);
        }
    }

    #[test]
    fn test_longest_introducer_wins() {
        let dialect = ExpressionMode::IndicatorExpression.dialect();
        let (introducer, _) = dialect.lookup("log10(100)").unwrap();
        assert_eq!(introducer, "log10(");
        let (introducer, _) = dialect.lookup("log(100)").unwrap();
        assert_eq!(introducer, "log(");
    }

    #[rstest]
    #[case(ExpressionMode::ValidationRuleExpression, NamedFunction::OrgUnitAncestor, true)]
    #[case(ExpressionMode::ValidationRuleExpression, NamedFunction::Sum, false)]
    #[case(ExpressionMode::PredictorGeneratorExpression, NamedFunction::Sum, true)]
    #[case(ExpressionMode::ProgramIndicatorExpression, NamedFunction::D2DaysBetween, true)]
    #[case(ExpressionMode::RuleEngineAction, NamedFunction::Avg, false)]
    #[case(ExpressionMode::RuleEngineCondition, NamedFunction::D2HasValue, true)]
    fn test_function_availability(
        #[case] mode: ExpressionMode,
        #[case] function: NamedFunction,
        #[case] expected: bool,
    ) {
        assert_eq!(mode.dialect().supports(function), expected);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(
            "program-indicator-filter".parse::<ExpressionMode>(),
            Ok(ExpressionMode::ProgramIndicatorFilter)
        );
        assert_eq!(
            ExpressionMode::RuleEngineAction.to_string(),
            "RULE_ENGINE_ACTION"
        );
        assert!("nope".parse::<ExpressionMode>().is_err());
    }
}
