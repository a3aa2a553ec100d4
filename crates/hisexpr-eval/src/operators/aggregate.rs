//! Aggregate functions
//!
//! An aggregate re-evaluates its aggregated argument once per index of the
//! value series bound to the data items inside it. Every bound series must
//! have the same length; items without a series keep their scalar value.

use super::arithmetic::arithmetic;
use crate::engine::Evaluator;
use crate::error::{EvalError, EvalResult};
use crate::provider::FunctionProvider;
use hisexpr_ast::{BinaryOp, NamedFunction, Node, ValueType, collect_data_items, strip_distinct};
use hisexpr_types::{Value, to_number};
use log::trace;

impl Evaluator<'_> {
    pub fn eval_aggregate(&mut self, function: NamedFunction, args: &[Node]) -> EvalResult<Value> {
        if self.cursor.is_some() {
            return Err(EvalError::aggregation(format!(
                "`{}` cannot be used inside another aggregate function",
                function.name()
            )));
        }
        let arg = args
            .get(function.aggregated_arg())
            .ok_or_else(|| EvalError::invalid_argument(function.name(), "missing argument"))?;
        let (input, distinct) = match strip_distinct(arg) {
            Some(inner) => (inner, true),
            None => (arg, false),
        };

        let mut values = self.series_values(input)?;
        if distinct {
            values = distinct_values(values);
        }
        trace!("Aggregating {} values with {}", values.len(), function.name());

        let fraction = match function {
            NamedFunction::PercentileCont => match args.first() {
                Some(arg) => self.eval_as(arg, ValueType::Number)?.as_number(),
                None => None,
            },
            _ => None,
        };
        call_aggregate(self.provider, function, &values, fraction)
    }

    fn series_values(&mut self, input: &Node) -> EvalResult<Vec<Value>> {
        let mut length = None;
        for item in collect_data_items(input) {
            let Some(series) = self.data.series(&item) else {
                continue;
            };
            match length {
                None => length = Some(series.len()),
                Some(expected) if expected != series.len() => {
                    return Err(EvalError::aggregation(format!(
                        "`{item}` has {} values where {expected} were expected",
                        series.len()
                    )));
                }
                Some(_) => {}
            }
        }

        let length = length.unwrap_or(1);
        let mut values = Vec::with_capacity(length);
        for index in 0..length {
            self.cursor = Some(index);
            let value = self.eval(input);
            self.cursor = None;
            values.push(value?.unwrap_variable());
        }
        Ok(values)
    }
}

fn distinct_values(values: Vec<Value>) -> Vec<Value> {
    let mut unique: Vec<Value> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

/// Route the collected values of an aggregate to the provider.
///
/// `count` sees every value, the others only the non-null ones as numbers.
pub fn call_aggregate(
    provider: &dyn FunctionProvider,
    function: NamedFunction,
    values: &[Value],
    fraction: Option<f64>,
) -> EvalResult<Value> {
    if function == NamedFunction::Count {
        return provider.count(values);
    }
    let numbers = values
        .iter()
        .filter(|v| !v.is_null())
        .map(to_number)
        .collect::<Result<Vec<_>, _>>()?;
    match function {
        NamedFunction::Avg => provider.avg(&numbers),
        NamedFunction::Max => provider.max(&numbers),
        NamedFunction::Median => provider.median(&numbers),
        NamedFunction::Min => provider.min(&numbers),
        NamedFunction::PercentileCont => match fraction {
            Some(fraction) => provider.percentile_cont(fraction, &numbers),
            None => Ok(Value::Null),
        },
        NamedFunction::Stddev => provider.stddev(&numbers),
        NamedFunction::StddevPop => provider.stddev_pop(&numbers),
        NamedFunction::StddevSamp => provider.stddev_samp(&numbers),
        NamedFunction::Sum => provider.sum(&numbers),
        NamedFunction::Variance => provider.variance(&numbers),
        other => provider.unsupported(other),
    }
}

/// Exact decimal sum
pub fn sum(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .reduce(|a, b| arithmetic(BinaryOp::Add, a, b))
}

pub fn mean(values: &[f64]) -> Option<f64> {
    Some(arithmetic(BinaryOp::Div, sum(values)?, values.len() as f64))
}

/// Continuous percentile with linear interpolation between neighbours
pub fn percentile_cont(values: &[f64], fraction: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let position = fraction.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = *sorted.get(position.floor() as usize)?;
    let upper = *sorted.get(position.ceil() as usize)?;
    Some(lower + (upper - lower) * position.fract())
}

pub fn median(values: &[f64]) -> Option<f64> {
    percentile_cont(values, 0.5)
}

/// Variance over `n - ddof` degrees of freedom
fn variance_with(values: &[f64], ddof: usize) -> Option<f64> {
    let n = values.len();
    if n <= ddof {
        return None;
    }
    let mean = mean(values)?;
    let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some(squares / (n - ddof) as f64)
}

pub fn sample_variance(values: &[f64]) -> Option<f64> {
    variance_with(values, 1)
}

pub fn population_variance(values: &[f64]) -> Option<f64> {
    variance_with(values, 0)
}
