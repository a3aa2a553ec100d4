//! Subcommand implementations

use crate::input::{DataArgs, names, variables};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use hisexpr::{Expression, ExpressionMode};
use serde_json::json;

/// What every subcommand needs to parse its expression
pub struct Source<'a> {
    pub expression: &'a str,
    pub mode: ExpressionMode,
    pub annotate: bool,
    pub format: OutputFormat,
}

impl Source<'_> {
    fn parse(&self) -> Result<Expression> {
        let expr = if self.annotate {
            Expression::parse_annotated(self.expression, self.mode)?
        } else {
            Expression::parse(self.expression, self.mode)?
        };
        Ok(expr)
    }
}

/// Evaluate and print the result
pub fn eval(source: &Source<'_>, data: &DataArgs<'_>) -> Result<()> {
    let expr = source.parse()?;
    let data = data.build(source.mode)?;
    let value = expr.evaluate(&data)?;
    match source.format {
        OutputFormat::Text => println!("{}", output::format_value(&value)),
        OutputFormat::Json => output::print_json(&json!({
            "expression": expr.normalise(),
            "mode": expr.mode(),
            "value": value,
        }))?,
    }
    Ok(())
}

/// Validate and print every finding.
///
/// Returns whether the expression is valid.
pub fn check(source: &Source<'_>, assignments: &[String]) -> Result<bool> {
    let expr = source.parse()?;
    let report = expr.check(&variables(assignments)?);
    match source.format {
        OutputFormat::Text => {
            for issue in report.errors.iter().chain(&report.warnings) {
                println!("{}", output::format_issue(issue, expr.source()));
            }
            if report.is_empty() {
                println!("{}", output::format_success(&format!("valid {}", expr.mode())));
            }
        }
        OutputFormat::Json => output::print_json(&json!({
            "mode": expr.mode(),
            "errors": &report.errors,
            "warnings": &report.warnings,
            "dataItems": expr.data_items().iter().map(ToString::to_string).collect::<Vec<_>>(),
            "variables": expr.variable_names(),
            "programVariables": expr.program_variables(),
            "functions": expr.functions().iter().map(|f| f.name()).collect::<Vec<_>>(),
        }))?,
    }
    Ok(report.is_empty())
}

/// Print the normalised text
pub fn normalise(source: &Source<'_>) -> Result<()> {
    let expr = source.parse()?;
    print_text(source.format, &expr.normalise())
}

/// Print the text with display names substituted
pub fn describe(source: &Source<'_>, assignments: &[String]) -> Result<()> {
    let expr = source.parse()?;
    print_text(source.format, &expr.describe(&names(assignments)?))
}

fn print_text(format: OutputFormat, text: &str) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{text}");
            Ok(())
        }
        OutputFormat::Json => output::print_json(&json!({ "text": text })),
    }
}
