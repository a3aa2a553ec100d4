//! Syntax tree for health-information-system expressions
//!
//! This crate defines the tree produced by the parser, the catalogs of
//! functions, data items, variables and modifiers it refers to, the two
//! rewrite passes applied after parsing, and the describer that turns a tree
//! back into text.

mod collect;
mod describe;
mod function;
mod item;
mod node;
mod operator;
mod rewrite;
mod types;

pub use collect::*;
pub use describe::*;
pub use function::*;
pub use item::*;
pub use node::*;
pub use operator::*;
pub use rewrite::*;
pub use types::*;
