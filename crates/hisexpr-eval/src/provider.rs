//! Function provider
//!
//! Every function call except the conditionals is routed through a
//! [`FunctionProvider`], with one method per function. Arguments arrive
//! already coerced to the declared parameter types. Pure functions have
//! default bodies; those bound to a host environment (organisation unit
//! hierarchy, barcode decoding, growth reference tables) default to
//! [`FunctionProvider::unsupported`].
//!
//! [`call_function`] does the routing. A null number or date argument makes
//! the result null without calling the provider, a null text argument is
//! passed as empty text and repeated arguments skip nulls.

use crate::context::ExpressionData;
use crate::error::{EvalError, EvalResult};
use crate::operators::{aggregate, arithmetic, datetime, round_half_up, string, values_equal};
use chrono::NaiveDate;
use hisexpr_ast::{BinaryOp, NamedFunction, ProgramVariable};
use hisexpr_types::{Value, VariableValue};

#[allow(unused_variables)]
pub trait FunctionProvider {
    /// Fallback for functions the provider cannot evaluate
    fn unsupported(&self, function: NamedFunction) -> EvalResult<Value> {
        Err(EvalError::unsupported_function(function.name()))
    }

    // =========================================================================
    // Common
    // =========================================================================

    fn greatest(&self, values: &[f64]) -> EvalResult<Value> {
        Ok(values.iter().copied().reduce(f64::max).into())
    }

    fn least(&self, values: &[f64]) -> EvalResult<Value> {
        Ok(values.iter().copied().reduce(f64::min).into())
    }

    /// Natural logarithm, or logarithm to `base`
    fn log(&self, x: f64, base: Option<f64>) -> EvalResult<Value> {
        Ok(Value::Number(match base {
            Some(base) => x.log(base),
            None => x.ln(),
        }))
    }

    fn log10(&self, x: f64) -> EvalResult<Value> {
        Ok(Value::Number(x.log10()))
    }

    fn remove_zeros(&self, x: f64) -> EvalResult<Value> {
        Ok(if x == 0.0 { Value::Null } else { Value::Number(x) })
    }

    fn contains(&self, text: &str, parts: &[String]) -> EvalResult<Value> {
        Ok(Value::Boolean(string::contains_all(text, parts)))
    }

    fn contains_items(&self, list: &str, items: &[String]) -> EvalResult<Value> {
        Ok(Value::Boolean(string::contains_items(list, items)))
    }

    // =========================================================================
    // Organisation units
    // =========================================================================

    fn org_unit_ancestor(&self, uids: &[String], data: &ExpressionData) -> EvalResult<Value> {
        self.unsupported(NamedFunction::OrgUnitAncestor)
    }

    fn org_unit_data_set(&self, uids: &[String], data: &ExpressionData) -> EvalResult<Value> {
        self.unsupported(NamedFunction::OrgUnitDataSet)
    }

    fn org_unit_group(&self, uids: &[String], data: &ExpressionData) -> EvalResult<Value> {
        self.unsupported(NamedFunction::OrgUnitGroup)
    }

    fn org_unit_program(&self, uids: &[String], data: &ExpressionData) -> EvalResult<Value> {
        self.unsupported(NamedFunction::OrgUnitProgram)
    }

    // =========================================================================
    // Aggregates
    // =========================================================================

    fn avg(&self, values: &[f64]) -> EvalResult<Value> {
        Ok(aggregate::mean(values).into())
    }

    /// Number of non-null values
    fn count(&self, values: &[Value]) -> EvalResult<Value> {
        Ok(Value::Number(values.iter().filter(|v| !v.is_null()).count() as f64))
    }

    fn max(&self, values: &[f64]) -> EvalResult<Value> {
        Ok(values.iter().copied().reduce(f64::max).into())
    }

    fn median(&self, values: &[f64]) -> EvalResult<Value> {
        Ok(aggregate::median(values).into())
    }

    fn min(&self, values: &[f64]) -> EvalResult<Value> {
        Ok(values.iter().copied().reduce(f64::min).into())
    }

    fn percentile_cont(&self, fraction: f64, values: &[f64]) -> EvalResult<Value> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(EvalError::invalid_argument(
                NamedFunction::PercentileCont.name(),
                format!("fraction {fraction} is outside 0 to 1"),
            ));
        }
        Ok(aggregate::percentile_cont(values, fraction).into())
    }

    /// Sample standard deviation
    fn stddev(&self, values: &[f64]) -> EvalResult<Value> {
        self.stddev_samp(values)
    }

    fn stddev_pop(&self, values: &[f64]) -> EvalResult<Value> {
        Ok(aggregate::population_variance(values).map(f64::sqrt).into())
    }

    fn stddev_samp(&self, values: &[f64]) -> EvalResult<Value> {
        Ok(aggregate::sample_variance(values).map(f64::sqrt).into())
    }

    fn sum(&self, values: &[f64]) -> EvalResult<Value> {
        Ok(aggregate::sum(values).into())
    }

    /// Sample variance
    fn variance(&self, values: &[f64]) -> EvalResult<Value> {
        Ok(aggregate::sample_variance(values).into())
    }

    // =========================================================================
    // Program rules
    // =========================================================================

    fn add_days(&self, date: NaiveDate, days: f64) -> EvalResult<Value> {
        Ok(datetime::add_days(date, days).into())
    }

    fn ceil(&self, x: f64) -> EvalResult<Value> {
        Ok(Value::Number(x.ceil()))
    }

    fn floor(&self, x: f64) -> EvalResult<Value> {
        Ok(Value::Number(x.floor()))
    }

    fn concatenate(&self, parts: &[String]) -> EvalResult<Value> {
        Ok(Value::String(parts.concat()))
    }

    /// Number of values seen for a rule variable
    fn count_values(&self, variable: &Value) -> EvalResult<Value> {
        Ok(Value::Number(candidates(variable).len() as f64))
    }

    fn count_if_value(&self, variable: &Value, value: &Value) -> EvalResult<Value> {
        let count = candidates(variable)
            .into_iter()
            .filter(|c| values_equal(&Value::String(c.clone()), value))
            .count();
        Ok(Value::Number(count as f64))
    }

    fn count_if_zero_pos(&self, variable: &Value) -> EvalResult<Value> {
        let count = numeric_candidates(variable).filter(|n| *n >= 0.0).count();
        Ok(Value::Number(count as f64))
    }

    fn days_between(&self, start: NaiveDate, end: NaiveDate) -> EvalResult<Value> {
        Ok(Value::Number(datetime::days_between(start, end) as f64))
    }

    fn extract_data_matrix_value(&self, key: &str, value: &str) -> EvalResult<Value> {
        self.unsupported(NamedFunction::D2ExtractDataMatrixValue)
    }

    /// Whether the current user has `role`, read from the `USER` list
    fn has_user_role(&self, role: &str, data: &ExpressionData) -> EvalResult<Value> {
        Ok(Value::Boolean(data.supplementary("USER").iter().any(|r| r == role)))
    }

    fn has_value(&self, variable: &Value) -> EvalResult<Value> {
        Ok(Value::Boolean(!variable.is_null()))
    }

    /// Whether the current organisation unit is listed under `group`
    fn in_org_unit_group(&self, group: &str, data: &ExpressionData) -> EvalResult<Value> {
        let Some(org_unit) = data.program_variable(ProgramVariable::OrgUnit) else {
            return Ok(Value::Boolean(false));
        };
        let org_unit = org_unit.to_string();
        Ok(Value::Boolean(
            data.supplementary(group).iter().any(|member| *member == org_unit),
        ))
    }

    fn last_event_date(&self, variable: &Value) -> EvalResult<Value> {
        Ok(rule_variable(variable).and_then(|v| v.event_date).into())
    }

    fn left(&self, text: &str, n: f64) -> EvalResult<Value> {
        Ok(Value::String(string::left(text, n)))
    }

    fn length(&self, text: &str) -> EvalResult<Value> {
        Ok(Value::Number(string::length(text) as f64))
    }

    fn max_value(&self, variable: &Value) -> EvalResult<Value> {
        Ok(numeric_candidates(variable).reduce(f64::max).into())
    }

    fn min_value(&self, variable: &Value) -> EvalResult<Value> {
        Ok(numeric_candidates(variable).reduce(f64::min).into())
    }

    fn minutes_between(&self, start: NaiveDate, end: NaiveDate) -> EvalResult<Value> {
        Ok(Value::Number(datetime::minutes_between(start, end) as f64))
    }

    fn modulus(&self, dividend: f64, divisor: f64) -> EvalResult<Value> {
        Ok(Value::Number(arithmetic(BinaryOp::Mod, dividend, divisor)))
    }

    fn months_between(&self, start: NaiveDate, end: NaiveDate) -> EvalResult<Value> {
        Ok(Value::Number(datetime::months_between(start, end) as f64))
    }

    /// One if zero or positive, else zero
    fn oizp(&self, x: f64) -> EvalResult<Value> {
        Ok(Value::Number(if x >= 0.0 { 1.0 } else { 0.0 }))
    }

    fn right(&self, text: &str, n: f64) -> EvalResult<Value> {
        Ok(Value::String(string::right(text, n)))
    }

    /// Round half away from zero, to whole numbers by default
    fn round(&self, x: f64, decimals: Option<f64>) -> EvalResult<Value> {
        let decimals = decimals.unwrap_or(0.0).clamp(0.0, 28.0) as u32;
        Ok(Value::Number(round_half_up(x, decimals)))
    }

    fn split(&self, text: &str, delimiter: &str, index: f64) -> EvalResult<Value> {
        Ok(Value::String(string::split(text, delimiter, index)))
    }

    fn substring(&self, text: &str, start: f64, end: f64) -> EvalResult<Value> {
        Ok(Value::String(string::substring(text, start, end)))
    }

    fn validate_pattern(&self, text: &str, pattern: &str) -> EvalResult<Value> {
        string::matches_pattern(text, pattern)
            .map(Value::Boolean)
            .map_err(|e| EvalError::invalid_argument(NamedFunction::D2ValidatePattern.name(), e.to_string()))
    }

    fn weeks_between(&self, start: NaiveDate, end: NaiveDate) -> EvalResult<Value> {
        Ok(Value::Number(datetime::weeks_between(start, end) as f64))
    }

    fn years_between(&self, start: NaiveDate, end: NaiveDate) -> EvalResult<Value> {
        Ok(Value::Number(datetime::years_between(start, end) as f64))
    }

    /// Zero if negative, else the value
    fn zing(&self, x: f64) -> EvalResult<Value> {
        Ok(Value::Number(x.max(0.0)))
    }

    /// Number of zero or positive values
    fn zpvc(&self, values: &[f64]) -> EvalResult<Value> {
        Ok(Value::Number(values.iter().filter(|v| **v >= 0.0).count() as f64))
    }

    fn z_score_hfa(&self, age: f64, height: f64, gender: &str) -> EvalResult<Value> {
        self.unsupported(NamedFunction::D2ZScoreHfa)
    }

    fn z_score_wfa(&self, age: f64, weight: f64, gender: &str) -> EvalResult<Value> {
        self.unsupported(NamedFunction::D2ZScoreWfa)
    }

    fn z_score_wfh(&self, height: f64, weight: f64, gender: &str) -> EvalResult<Value> {
        self.unsupported(NamedFunction::D2ZScoreWfh)
    }
}

/// Provider with only the default implementations
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFunctions;

impl FunctionProvider for DefaultFunctions {}

fn rule_variable(value: &Value) -> Option<&VariableValue> {
    match value {
        Value::Variable(var) => Some(var.as_ref()),
        _ => None,
    }
}

/// Every value seen for a variable, or the single value of anything else
fn candidates(value: &Value) -> Vec<String> {
    match value {
        Value::Variable(var) if !var.candidates.is_empty() => var.candidates.clone(),
        Value::Variable(var) => var.value.iter().map(|v| v.to_string()).collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

fn numeric_candidates(value: &Value) -> impl Iterator<Item = f64> {
    candidates(value)
        .into_iter()
        .filter_map(|c| c.trim().parse::<f64>().ok())
}

static NULL: Value = Value::Null;

/// Coerced arguments of one call
struct Args<'v>(&'v [Value]);

impl Args<'_> {
    fn value(&self, index: usize) -> &Value {
        self.0.get(index).unwrap_or(&NULL)
    }

    fn number(&self, index: usize) -> Option<f64> {
        self.value(index).as_number()
    }

    fn date(&self, index: usize) -> Option<NaiveDate> {
        match self.value(index) {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    fn text(&self, index: usize) -> String {
        match self.value(index) {
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// `None` when left out, `Some(None)` when given as null
    fn optional_number(&self, index: usize) -> Option<Option<f64>> {
        self.0.get(index).map(Value::as_number)
    }

    fn numbers(&self, from: usize) -> Vec<f64> {
        self.0.iter().skip(from).filter_map(Value::as_number).collect()
    }

    fn texts(&self, from: usize) -> Vec<String> {
        self.0
            .iter()
            .skip(from)
            .filter(|v| !v.is_null())
            .map(ToString::to_string)
            .collect()
    }

    fn dates(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.date(0)?, self.date(1)?))
    }
}

/// Route a non-aggregating, eagerly evaluated call to the provider
pub fn call_function(
    provider: &dyn FunctionProvider,
    function: NamedFunction,
    args: &[Value],
    data: &ExpressionData,
) -> EvalResult<Value> {
    use NamedFunction as F;

    let args = Args(args);
    let null = || Ok(Value::Null);
    match function {
        F::Greatest => provider.greatest(&args.numbers(0)),
        F::Least => provider.least(&args.numbers(0)),
        F::Log => match (args.number(0), args.optional_number(1)) {
            (Some(x), None) => provider.log(x, None),
            (Some(x), Some(Some(base))) => provider.log(x, Some(base)),
            _ => null(),
        },
        F::Log10 => args.number(0).map_or_else(null, |x| provider.log10(x)),
        F::RemoveZeros => args.number(0).map_or_else(null, |x| provider.remove_zeros(x)),
        F::Contains => provider.contains(&args.text(0), &args.texts(1)),
        F::ContainsItems => provider.contains_items(&args.text(0), &args.texts(1)),

        F::OrgUnitAncestor => provider.org_unit_ancestor(&args.texts(0), data),
        F::OrgUnitDataSet => provider.org_unit_data_set(&args.texts(0), data),
        F::OrgUnitGroup => provider.org_unit_group(&args.texts(0), data),
        F::OrgUnitProgram => provider.org_unit_program(&args.texts(0), data),

        F::D2AddDays => match (args.date(0), args.number(1)) {
            (Some(date), Some(days)) => provider.add_days(date, days),
            _ => null(),
        },
        F::D2Ceil => args.number(0).map_or_else(null, |x| provider.ceil(x)),
        F::D2Floor => args.number(0).map_or_else(null, |x| provider.floor(x)),
        F::D2Concatenate => provider.concatenate(&args.texts(0)),
        F::D2Count => provider.count_values(args.value(0)),
        F::D2CountIfValue => {
            provider.count_if_value(args.value(0), &args.value(1).clone().unwrap_variable())
        }
        F::D2CountIfZeroPos => provider.count_if_zero_pos(args.value(0)),
        F::D2DaysBetween => args.dates().map_or_else(null, |(s, e)| provider.days_between(s, e)),
        F::D2ExtractDataMatrixValue => {
            provider.extract_data_matrix_value(&args.text(0), &args.text(1))
        }
        F::D2HasUserRole => provider.has_user_role(&args.text(0), data),
        F::D2HasValue => provider.has_value(args.value(0)),
        F::D2InOrgUnitGroup => provider.in_org_unit_group(&args.text(0), data),
        F::D2LastEventDate => provider.last_event_date(args.value(0)),
        F::D2Left => args.number(1).map_or_else(null, |n| provider.left(&args.text(0), n)),
        F::D2Length => provider.length(&args.text(0)),
        F::D2MaxValue => provider.max_value(args.value(0)),
        F::D2MinValue => provider.min_value(args.value(0)),
        F::D2MinutesBetween => {
            args.dates().map_or_else(null, |(s, e)| provider.minutes_between(s, e))
        }
        F::D2Modulus => match (args.number(0), args.number(1)) {
            (Some(a), Some(b)) => provider.modulus(a, b),
            _ => null(),
        },
        F::D2MonthsBetween => {
            args.dates().map_or_else(null, |(s, e)| provider.months_between(s, e))
        }
        F::D2Oizp => args.number(0).map_or_else(null, |x| provider.oizp(x)),
        F::D2Right => args.number(1).map_or_else(null, |n| provider.right(&args.text(0), n)),
        F::D2Round => match (args.number(0), args.optional_number(1)) {
            (Some(x), None) => provider.round(x, None),
            (Some(x), Some(Some(decimals))) => provider.round(x, Some(decimals)),
            _ => null(),
        },
        F::D2Split => args
            .number(2)
            .map_or_else(null, |i| provider.split(&args.text(0), &args.text(1), i)),
        F::D2Substring => match (args.number(1), args.number(2)) {
            (Some(start), Some(end)) => provider.substring(&args.text(0), start, end),
            _ => null(),
        },
        F::D2ValidatePattern => provider.validate_pattern(&args.text(0), &args.text(1)),
        F::D2WeeksBetween => args.dates().map_or_else(null, |(s, e)| provider.weeks_between(s, e)),
        F::D2YearsBetween => args.dates().map_or_else(null, |(s, e)| provider.years_between(s, e)),
        F::D2Zing => args.number(0).map_or_else(null, |x| provider.zing(x)),
        F::D2Zpvc => provider.zpvc(&args.numbers(0)),
        F::D2ZScoreHfa => match (args.number(0), args.number(1)) {
            (Some(age), Some(height)) => provider.z_score_hfa(age, height, &args.text(2)),
            _ => null(),
        },
        F::D2ZScoreWfa => match (args.number(0), args.number(1)) {
            (Some(age), Some(weight)) => provider.z_score_wfa(age, weight, &args.text(2)),
            _ => null(),
        },
        F::D2ZScoreWfh => match (args.number(0), args.number(1)) {
            (Some(height), Some(weight)) => provider.z_score_wfh(height, weight, &args.text(2)),
            _ => null(),
        },

        // Evaluated by the evaluator itself
        F::FirstNonNull
        | F::If
        | F::IsNotNull
        | F::IsNull
        | F::D2Condition
        | F::Avg
        | F::Count
        | F::Max
        | F::Median
        | F::Min
        | F::PercentileCont
        | F::Stddev
        | F::StddevPop
        | F::StddevSamp
        | F::Sum
        | F::Variance => provider.unsupported(function),
    }
}
