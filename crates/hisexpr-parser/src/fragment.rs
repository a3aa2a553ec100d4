//! Grammar fragments registered in a dialect
//!
//! A dialect maps introducer text (`if(`, `#{`, `.periodOffset(`) to the
//! fragment that parses what follows. Blocks are described by an ordered
//! parameter list in which only the last entry may be optional or
//! repeating.

use crate::{Decoder, Terminal};
use hisexpr_ast::{DataItemModifier, DataItemType, NamedFunction};

/// One parameter of a function or modifier block
#[derive(Debug, Clone)]
pub enum Param {
    /// Any sub-expression
    Expr,
    /// A sub-expression, optionally wrapped in `'` or `"`
    QuotedExpr,
    /// A terminal value, optionally decoded by something other than the
    /// default factory for its kind
    Terminal {
        terminal: Terminal,
        quoted: bool,
        decoder: Option<Decoder>,
    },
    /// May be left out when the block closes right away
    Optional(Box<Param>),
    /// Separator-delimited repetitions, at least one
    OneOrMore(Box<Param>),
}

impl Param {
    pub fn terminal(terminal: Terminal) -> Self {
        Self::Terminal {
            terminal,
            quoted: false,
            decoder: None,
        }
    }

    /// A terminal that may be written with or without quotes
    pub fn quoted(terminal: Terminal) -> Self {
        Self::Terminal {
            terminal,
            quoted: true,
            decoder: None,
        }
    }

    pub fn decoded_with(self, decoder: Decoder) -> Self {
        match self {
            Self::Terminal {
                terminal, quoted, ..
            } => Self::Terminal {
                terminal,
                quoted,
                decoder: Some(decoder),
            },
            other => other,
        }
    }

    pub fn optional(param: Param) -> Self {
        Self::Optional(Box::new(param))
    }

    pub fn one_or_more(param: Param) -> Self {
        Self::OneOrMore(Box::new(param))
    }
}

/// What an introducer starts
#[derive(Debug, Clone)]
pub enum Fragment {
    /// `name(params)`
    Function(NamedFunction, Vec<Param>),
    /// `.name(params)` following a term
    Modifier(DataItemModifier, Vec<Param>),
    /// A structured data item; `#{` and `A{` bodies that are not identifier
    /// paths fall back to rule variables
    DataItem(DataItemType),
    /// `#{name}` or `A{name}` always naming a rule variable
    RuleVariable,
    /// `V{name}`
    ProgramVariable,
    /// `[name]`
    NamedValue,
}

impl Fragment {
    /// The text that introduces this fragment
    pub fn introducer(&self) -> String {
        match self {
            Self::Function(function, _) => format!("{}(", function.name()),
            Self::Modifier(modifier, _) => format!(".{}(", modifier.name()),
            Self::DataItem(item_type) => item_type.prefix().to_string(),
            Self::RuleVariable => "#{".to_string(),
            Self::ProgramVariable => "V{".to_string(),
            Self::NamedValue => "[".to_string(),
        }
    }
}

/// Parameters of a function block, derived from its signature
pub fn function_params(function: NamedFunction) -> Vec<Param> {
    match function {
        NamedFunction::Log | NamedFunction::D2Round => {
            vec![Param::Expr, Param::optional(Param::Expr)]
        }
        NamedFunction::D2Condition => vec![Param::QuotedExpr, Param::Expr, Param::Expr],
        f if f.takes_org_unit_uids() => vec![Param::one_or_more(Param::quoted(Terminal::Uid))],
        f => {
            let signature = f.signature();
            let mut params: Vec<Param> = signature.params.iter().map(|_| Param::Expr).collect();
            if signature.varargs {
                if let Some(last) = params.pop() {
                    params.push(Param::one_or_more(last));
                }
            }
            params
        }
    }
}

/// Parameters of a modifier block
pub fn modifier_params(modifier: DataItemModifier) -> Vec<Param> {
    match modifier {
        DataItemModifier::AggregationType => vec![
            Param::terminal(Terminal::Identifier)
                .decoded_with(crate::factory::decode_aggregation_type),
        ],
        DataItemModifier::MaxDate | DataItemModifier::MinDate => {
            vec![Param::quoted(Terminal::Date)]
        }
        DataItemModifier::PeriodOffset | DataItemModifier::StageOffset => {
            vec![Param::terminal(Terminal::Integer)]
        }
        DataItemModifier::YearToDate | DataItemModifier::PeriodAggregation => Vec::new(),
    }
}
