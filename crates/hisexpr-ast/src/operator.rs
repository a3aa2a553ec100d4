//! Operators with precedence and type information

use crate::ValueType;
use serde::{Deserialize, Serialize};

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Precedence 7 (highest) - right-associative
    /// Exponentiation
    Pow,

    // Precedence 6
    Mul,
    Div,
    Mod,

    // Precedence 5
    Add,
    Sub,

    // Precedence 4
    Lt,
    Gt,
    Le,
    Ge,

    // Precedence 3
    Eq,
    Ne,

    // Precedence 2
    /// Logical and (`&&` or `and`)
    And,

    // Precedence 1 (lowest)
    /// Logical or (`||` or `or`)
    Or,
}

impl BinaryOp {
    /// Operator families in grouping order, highest precedence first
    pub const GROUPS: &'static [&'static [BinaryOp]] = &[
        &[Self::Pow],
        &[Self::Mul, Self::Div, Self::Mod],
        &[Self::Add, Self::Sub],
        &[Self::Lt, Self::Gt, Self::Le, Self::Ge],
        &[Self::Eq, Self::Ne],
        &[Self::And],
        &[Self::Or],
    ];

    /// Parse an operator from its source text
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "^" => Self::Pow,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Mod,
            "+" => Self::Add,
            "-" => Self::Sub,
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::Le,
            ">=" => Self::Ge,
            "==" => Self::Eq,
            "!=" => Self::Ne,
            "&&" | "and" => Self::And,
            "||" | "or" => Self::Or,
            _ => return None,
        })
    }

    /// Get the canonical operator symbol
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Pow => "^",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }

    /// Get the precedence level (1-7, higher binds tighter)
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Pow => 7,
            Self::Mul | Self::Div | Self::Mod => 6,
            Self::Add | Self::Sub => 5,
            Self::Lt | Self::Gt | Self::Le | Self::Ge => 4,
            Self::Eq | Self::Ne => 3,
            Self::And => 2,
            Self::Or => 1,
        }
    }

    /// Check if operator is right-associative
    pub const fn is_right_associative(&self) -> bool {
        matches!(self, Self::Pow)
    }

    /// Check if this is an arithmetic operator
    pub const fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Self::Pow | Self::Mul | Self::Div | Self::Mod | Self::Add | Self::Sub
        )
    }

    /// Check if this is a relational operator
    pub const fn is_relational(&self) -> bool {
        matches!(self, Self::Lt | Self::Gt | Self::Le | Self::Ge)
    }

    /// Check if this is a logical operator
    pub const fn is_logical(&self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// The type both operands are expected to have.
    ///
    /// Equality compares dynamically mixed values, relational operators
    /// require both sides to agree.
    pub const fn operand_type(&self) -> ValueType {
        match self {
            Self::Eq | Self::Ne => ValueType::Mixed,
            Self::Lt | Self::Gt | Self::Le | Self::Ge => ValueType::Same,
            Self::And | Self::Or => ValueType::Boolean,
            _ => ValueType::Number,
        }
    }

    /// The declared result type
    pub const fn return_type(&self) -> ValueType {
        if self.is_arithmetic() {
            ValueType::Number
        } else {
            ValueType::Boolean
        }
    }
}

/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Plus,
    Minus,
    /// Logical not (`!` or `not`)
    Not,
    /// Only meaningful on the input of an aggregation
    Distinct,
}

impl UnaryOp {
    /// Parse an operator from its source text
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+" => Self::Plus,
            "-" => Self::Minus,
            "!" | "not" => Self::Not,
            "distinct" => Self::Distinct,
            _ => return None,
        })
    }

    /// Get the canonical operator symbol
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Not => "!",
            Self::Distinct => "distinct",
        }
    }

    /// Sign operators are absorbed by the right operand of `^`
    pub const fn is_sign(&self) -> bool {
        matches!(self, Self::Plus | Self::Minus)
    }

    pub const fn operand_type(&self) -> ValueType {
        match self {
            Self::Plus | Self::Minus => ValueType::Number,
            Self::Not => ValueType::Boolean,
            Self::Distinct => ValueType::Mixed,
        }
    }

    /// The declared result type; `Same` means the operand's type
    pub const fn return_type(&self) -> ValueType {
        match self {
            Self::Plus | Self::Minus => ValueType::Number,
            Self::Not => ValueType::Boolean,
            Self::Distinct => ValueType::Same,
        }
    }
}

/// Whether an operator spelling is a word (`and`, `not`) rather than a symbol
pub fn is_word_operator(raw: &str) -> bool {
    raw.chars().next().is_some_and(char::is_alphabetic)
}
