//! Expression command-line interface

mod commands;
mod input;
mod output;

use clap::{Args, Parser, Subcommand};
use hisexpr::ExpressionMode;
use input::DataArgs;
use output::OutputFormat;

/// Expression command-line tool
#[derive(Parser)]
#[command(name = "hisexpr")]
#[command(author, version, about = "Health-information-system expression tools", long_about = None)]
struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ExpressionArgs {
    /// Expression text
    expression: String,

    /// Dialect to parse in, e.g. INDICATOR_EXPRESSION or rule-engine-condition
    #[arg(short, long, default_value_t = ExpressionMode::IndicatorExpression)]
    mode: ExpressionMode,

    /// Keep whitespace and comments when printing
    #[arg(short, long)]
    annotate: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression
    Eval {
        #[command(flatten)]
        source: ExpressionArgs,

        /// Rule variable (name=value)
        #[arg(long = "var")]
        vars: Vec<String>,

        /// Program variable (name=value)
        #[arg(long = "program-var")]
        program_vars: Vec<String>,

        /// Data item value (item=value, or item=v1,v2,... for a series)
        #[arg(short, long = "data-item")]
        data_items: Vec<String>,
    },

    /// Type check an expression against its dialect
    Check {
        #[command(flatten)]
        source: ExpressionArgs,

        /// Rule variable (name=value)
        #[arg(long = "var")]
        vars: Vec<String>,
    },

    /// Print the normalised expression
    Normalise {
        #[command(flatten)]
        source: ExpressionArgs,
    },

    /// Print the expression with display names
    Describe {
        #[command(flatten)]
        source: ExpressionArgs,

        /// Display name (id=label)
        #[arg(short, long = "name")]
        names: Vec<String>,
    },
}

impl ExpressionArgs {
    fn source(&self, format: OutputFormat) -> commands::Source<'_> {
        commands::Source {
            expression: &self.expression,
            mode: self.mode,
            annotate: self.annotate,
            format,
        }
    }
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();
    output::setup_colors(&cli.color);

    let result = match &cli.command {
        Commands::Eval {
            source,
            vars,
            program_vars,
            data_items,
        } => {
            let data = DataArgs {
                variables: vars,
                program_variables: program_vars,
                data_items,
            };
            commands::eval(&source.source(cli.format), &data).map(|()| true)
        }
        Commands::Check { source, vars } => commands::check(&source.source(cli.format), vars),
        Commands::Normalise { source } => {
            commands::normalise(&source.source(cli.format)).map(|()| true)
        }
        Commands::Describe { source, names } => {
            commands::describe(&source.source(cli.format), names).map(|()| true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", output::format_error(&e));
            std::process::exit(1);
        }
    }
}
