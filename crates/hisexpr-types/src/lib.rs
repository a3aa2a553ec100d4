//! Type system for health-information-system expressions
//!
//! This crate defines:
//! - Runtime values and rule variable values
//! - Assignability between static types and the runtime coercions
//! - The static type checker and dialect validators

mod checker;
mod coercion;
mod validators;
mod value;

pub use checker::*;
pub use coercion::*;
pub use validators::*;
pub use value::*;
