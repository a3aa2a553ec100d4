//! Operator and function implementations
//!
//! Organised by category:
//! - Arithmetic operators with exact decimal evaluation, plus rounding
//! - Comparison operators and value equality
//! - Logical operators with three-valued logic
//! - Aggregation over value series and the statistics behind it
//! - Text and date functions used by the default function provider

pub mod aggregate;
pub mod arithmetic;
pub mod comparison;
pub mod datetime;
pub mod logical;
pub mod string;

pub use aggregate::call_aggregate;
pub use arithmetic::{arithmetic, round_half_up};
pub use comparison::{compare, values_equal};
