//! Static value types

use serde::{Deserialize, Serialize};
use std::fmt;

/// The value type lattice used for declared and resolved types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Any type, resolved at runtime
    Mixed,
    Number,
    Boolean,
    Date,
    String,
    /// Placeholder for "whatever the other `Same` operand resolves to".
    /// Never a final resolved type.
    Same,
}

impl ValueType {
    /// Get the type name as used in messages
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mixed => "MIXED",
            Self::Number => "NUMBER",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
            Self::String => "STRING",
            Self::Same => "SAME",
        }
    }

    /// True for `Mixed` and `Same`, which say nothing about the concrete type
    pub const fn is_unresolved(&self) -> bool {
        matches!(self, Self::Mixed | Self::Same)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
