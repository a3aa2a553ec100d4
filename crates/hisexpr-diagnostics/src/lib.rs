//! Expression diagnostics and error handling
//!
//! This crate provides the error handling infrastructure shared by the parser,
//! type checker and evaluator: error codes, source locations, positioned parse
//! errors and accumulated validation issues.

mod error;
mod error_code;
mod span;

pub use error::*;
pub use error_code::*;
pub use span::*;

/// Result type for expression operations
pub type Result<T> = std::result::Result<T, ExprError>;
