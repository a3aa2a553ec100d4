//! Expression parser
//!
//! A hand-written recursive descent parser over a character [`Cursor`].
//! Terminals are recognised with winnow; function, data item and modifier
//! syntax is looked up in the [`Dialect`] of the chosen [`ExpressionMode`].
//!
//! The grammar produces a flat tree that is restructured by the
//! [`attach_modifiers`] and [`group_operators`] passes before it is
//! returned. In annotate mode the whitespace and comments between tokens are
//! kept on the nodes so the source text can be reproduced exactly.
//!
//! Input nested deeper than [`MAX_NESTING`] groups, or that would build a
//! tree taller than [`hisexpr_ast::MAX_DEPTH`], is rejected with `E0010`.
//!
//! # Example
//!
//! ```
//! use hisexpr_parser::{ExpressionMode, parse};
//! use hisexpr_ast::normalise;
//!
//! let root = parse("1 + 2*3", ExpressionMode::IndicatorExpression, false).unwrap();
//! assert_eq!(normalise(&root), "1 + 2 * 3");
//! ```

mod builder;
mod cursor;
mod dialect;
mod factory;
mod fragment;
mod grammar;
mod terminal;

pub use builder::*;
pub use cursor::*;
pub use dialect::*;
pub use factory::*;
pub use fragment::*;
pub use terminal::{Matcher, Terminal};

use hisexpr_ast::{Node, attach_modifiers, group_operators};
use hisexpr_diagnostics::ParseError;
use log::debug;

/// Parentheses, unary operators, calls and arguments open inside one another
pub const MAX_NESTING: usize = 100;

/// Parse `source` in `mode` with the default node factories
pub fn parse(source: &str, mode: ExpressionMode, annotate: bool) -> Result<Node, ParseError> {
    parse_with_factories(source, mode, annotate, &NodeFactories::default())
}

/// Parse `source` decoding node values with `factories`
pub fn parse_with_factories(
    source: &str,
    mode: ExpressionMode,
    annotate: bool,
    factories: &NodeFactories,
) -> Result<Node, ParseError> {
    let mut cursor = Cursor::new(source, annotate);
    let mut builder = AstBuilder::new(source, factories);
    grammar::Grammar::new(&mut cursor, &mut builder, mode.dialect()).root()?;

    let mut root = builder.finish(cursor.mark());
    let tokens = cursor.finish()?;
    if annotate {
        distribute_whitespace(&mut root, &tokens);
    }
    let root = group_operators(attach_modifiers(root));
    debug!("Parsed {mode} expression of {} characters", source.chars().count());
    Ok(root)
}
