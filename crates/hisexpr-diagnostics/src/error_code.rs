//! Expression error codes following a structured numbering system
//!
//! Error code ranges:
//! - E0001-E0099: Parse errors (syntax)
//! - E0100-E0199: Validation errors (type checking, resolution)
//! - E0200-E0299: Evaluation errors (runtime)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is a parse error (0001-0099)
    pub const fn is_parse_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is a validation error (0100-0199)
    pub const fn is_validation_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is an evaluation error (0200-0299)
    pub const fn is_evaluation_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Parse errors (0001-0099)
    map.insert(1, ErrorInfo::new("Unexpected character"));
    map.insert(2, ErrorInfo::new("Unexpected end of input"));
    map.insert(3, ErrorInfo::new("Invalid literal"));
    map.insert(4, ErrorInfo::new("Unclosed literal"));
    map.insert(5, ErrorInfo::new("Unknown function")
        .with_help("The function is not part of the selected expression mode"));
    map.insert(6, ErrorInfo::new("Unknown constant or named value"));
    map.insert(7, ErrorInfo::new("Unknown modifier"));
    map.insert(8, ErrorInfo::new("Invalid data item"));
    map.insert(9, ErrorInfo::new("Invalid argument list"));
    map.insert(10, ErrorInfo::new("Expression nested too deeply")
        .with_help("Split the expression or remove redundant parentheses"));

    // Validation errors (0100-0199)
    map.insert(100, ErrorInfo::new("Type mismatch"));
    map.insert(101, ErrorInfo::new("Literal cannot be converted"));
    map.insert(102, ErrorInfo::new("Inconsistent argument types"));
    map.insert(103, ErrorInfo::new("Unexpected result type"));
    map.insert(104, ErrorInfo::new("Unknown variable")
        .with_help("Supply a value for every rule variable the expression references"));
    map.insert(105, ErrorInfo::new("Nested aggregation"));

    // Evaluation errors (0200-0299)
    map.insert(200, ErrorInfo::new("Evaluation failed"));
    map.insert(201, ErrorInfo::new("Unknown variable"));
    map.insert(202, ErrorInfo::new("Invalid conversion"));
    map.insert(203, ErrorInfo::new("Unsupported function"));
    map.insert(204, ErrorInfo::new("Invalid aggregation"));
    map.insert(205, ErrorInfo::new("Missing data"));
    map.insert(206, ErrorInfo::new("Illegal operation"));

    map
});

// Parse errors
pub const E0001: ErrorCode = ErrorCode::new(1);
pub const E0002: ErrorCode = ErrorCode::new(2);
pub const E0003: ErrorCode = ErrorCode::new(3);
pub const E0004: ErrorCode = ErrorCode::new(4);
pub const E0005: ErrorCode = ErrorCode::new(5);
pub const E0006: ErrorCode = ErrorCode::new(6);
pub const E0007: ErrorCode = ErrorCode::new(7);
pub const E0008: ErrorCode = ErrorCode::new(8);
pub const E0009: ErrorCode = ErrorCode::new(9);
pub const E0010: ErrorCode = ErrorCode::new(10);

// Validation errors
pub const E0100: ErrorCode = ErrorCode::new(100);
pub const E0101: ErrorCode = ErrorCode::new(101);
pub const E0102: ErrorCode = ErrorCode::new(102);
pub const E0103: ErrorCode = ErrorCode::new(103);
pub const E0104: ErrorCode = ErrorCode::new(104);
pub const E0105: ErrorCode = ErrorCode::new(105);

// Evaluation errors
pub const E0200: ErrorCode = ErrorCode::new(200);
pub const E0201: ErrorCode = ErrorCode::new(201);
pub const E0202: ErrorCode = ErrorCode::new(202);
pub const E0203: ErrorCode = ErrorCode::new(203);
pub const E0204: ErrorCode = ErrorCode::new(204);
pub const E0205: ErrorCode = ErrorCode::new(205);
pub const E0206: ErrorCode = ErrorCode::new(206);
