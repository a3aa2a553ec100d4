//! Output formatting utilities

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use hisexpr::{Issue, Severity, Value};
use std::io::IsTerminal;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Set up color output based on user preference
pub fn setup_colors(mode: &str) {
    match mode.to_lowercase().as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::set_override(std::io::stdout().is_terminal()),
    }
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {error:#}", "Error:".red().bold())
}

pub fn format_success(message: &str) -> String {
    format!("{} {message}", "Success:".green().bold())
}

/// A value as text, dates in ISO form and null spelled out
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{s}'"),
        other => other.to_string(),
    }
}

/// One validation finding with its position in `source`
pub fn format_issue(issue: &Issue, source: &str) -> String {
    let level = match issue.severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow().bold(),
    };
    let mut out = format!("{level}[{}]: {}", issue.code, issue.message);
    if let Some(position) = issue.position(source) {
        out.push_str(&format!("\n\t{}", position.cyan()));
    }
    out
}

pub fn print_json(value: &serde_json::Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hisexpr::diagnostics::{E0100, Span};

    #[test]
    fn test_format_value() {
        colored::control::set_override(false);
        assert_eq!(format_value(&Value::Number(0.5)), "0.5");
        assert_eq!(format_value(&Value::string("a")), "'a'");
        assert_eq!(format_value(&Value::Null), "null");
    }

    #[test]
    fn test_format_issue_includes_position() {
        colored::control::set_override(false);
        let issue = Issue::error(E0100, "bad operand").with_span(Some(Span::new(4, 5)));
        let text = format_issue(&issue, "1 + x");
        assert!(text.starts_with("error[E0100]: bad operand"), "{text}");
        assert!(text.contains("line:1"), "{text}");
    }
}
