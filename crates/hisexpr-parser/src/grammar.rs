//! Recursive descent over a dialect's fragments
//!
//! The grammar does not nest operators. Operands, operators and
//! dot-modifiers are added as siblings under the enclosing group and the
//! rewrite passes restructure those flat lists afterwards. The height of the
//! tree the rewrites will build is tracked per open level so oversized input
//! fails here, before any pass recurses into it.

use crate::factory::{data_item_decoder, parse_item_body};
use crate::terminal::{self, Terminal, braced, is_variable_name};
use crate::{AstBuilder, Cursor, Decoder, Dialect, Fragment, MAX_NESTING, Mark, Param};
use hisexpr_ast::{DataItemType, MAX_DEPTH, NodeKind};
use hisexpr_diagnostics::{E0004, E0005, E0006, E0007, E0008, E0010, ParseError, Span};
use log::trace;

/// `#{...}` and `A{...}` bodies that are not identifier paths name rule
/// variables
fn allows_rule_variable(item_type: DataItemType) -> bool {
    matches!(
        item_type,
        DataItemType::DataElementOperand
            | DataItemType::ProgramStageDataElement
            | DataItemType::ProgramAttribute
    )
}

pub struct Grammar<'g, 'a> {
    cursor: &'g mut Cursor<'a>,
    builder: &'g mut AstBuilder<'a>,
    dialect: &'static Dialect,
    /// Height of the content of each open level, the root first
    levels: Vec<usize>,
}

impl<'g, 'a> Grammar<'g, 'a> {
    pub fn new(
        cursor: &'g mut Cursor<'a>,
        builder: &'g mut AstBuilder<'a>,
        dialect: &'static Dialect,
    ) -> Self {
        Self {
            cursor,
            builder,
            dialect,
            levels: vec![0],
        }
    }

    /// The whole input as one expression
    pub fn root(&mut self) -> Result<(), ParseError> {
        self.expression()?;
        self.cursor.skip_whitespace_and_comments()?;
        match self.cursor.peek(0) {
            None => Ok(()),
            Some(c) => Err(self.cursor.error(format!("Unexpected character `{c}`"))),
        }
    }

    /// Operands separated by binary operators. Each operator can add a tree
    /// level above the operands once operators are grouped.
    fn expression(&mut self) -> Result<(), ParseError> {
        let mut operators = 0;
        loop {
            self.term()?;
            self.modifiers()?;
            match self.binary_operator()? {
                Some(span) => {
                    operators += 1;
                    self.check_height(operators, span)?;
                }
                None => break,
            }
        }
        self.check_height(operators, Span::point(self.cursor.pos()))?;
        let height = self.chain_height(operators);
        if let Some(level) = self.levels.last_mut() {
            *level = height;
        }
        Ok(())
    }

    fn binary_operator(&mut self) -> Result<Option<Span>, ParseError> {
        self.cursor.skip_whitespace_and_comments()?;
        let start = self.cursor.mark();
        match self.cursor.raw_match(terminal::binary_operator)? {
            Some(symbol) => {
                let end = self.cursor.mark();
                self.builder
                    .add_node(NodeKind::BinaryOperator, symbol, start, end, None)?;
                Ok(Some(Span::new(start.pos, end.pos)))
            }
            None => Ok(None),
        }
    }

    fn too_deep(&self, span: Span) -> ParseError {
        self.cursor
            .error_at(E0010, "Expression is nested too deeply", span)
    }

    /// Open a nested level at `start`
    fn enter(&mut self, start: Mark) -> Result<(), ParseError> {
        if self.levels.len() > MAX_NESTING {
            return Err(self.too_deep(Span::new(start.pos, start.pos + 1)));
        }
        self.levels.push(0);
        Ok(())
    }

    /// Close the innermost level; its node sits one level above its content
    fn leave(&mut self) {
        let height = self.levels.pop().unwrap_or(0).max(1) + 1;
        if let Some(level) = self.levels.last_mut() {
            *level = (*level).max(height);
        }
    }

    /// Height of a chain of `operators` over the operands seen so far at the
    /// current level
    fn chain_height(&self, operators: usize) -> usize {
        self.levels.last().copied().unwrap_or(0).max(1) + operators
    }

    fn check_height(&self, operators: usize, span: Span) -> Result<(), ParseError> {
        if self.chain_height(operators) + self.levels.len() > MAX_DEPTH {
            return Err(self.too_deep(span));
        }
        Ok(())
    }

    fn term(&mut self) -> Result<(), ParseError> {
        self.cursor.skip_whitespace_and_comments()?;
        let start = self.cursor.mark();
        if let Some(symbol) = self.cursor.raw_match(terminal::unary_operator)? {
            let end = self.cursor.mark();
            self.builder
                .add_node(NodeKind::UnaryOperator, symbol, start, end, None)?;
            self.enter(start)?;
            self.term()?;
            self.leave();
            return Ok(());
        }

        match self.cursor.peek(0) {
            Some('(') => {
                self.enter(start)?;
                self.builder.begin_node(NodeKind::Par, "", start, None)?;
                self.cursor.expect('(')?;
                self.expression()?;
                self.cursor.expect(')')?;
                self.builder.end_node(self.cursor.mark());
                self.leave();
                Ok(())
            }
            Some('\'' | '"') => self.literal(Terminal::String, start),
            Some(c)
                if c.is_ascii_digit()
                    || (c == '.' && self.cursor.peek(1).is_some_and(|d| d.is_ascii_digit())) =>
            {
                self.literal(Terminal::Number, start)
            }
            _ => self.keyword_or_fragment(start),
        }
    }

    fn literal(&mut self, expected: Terminal, start: Mark) -> Result<(), ParseError> {
        match self.cursor.raw_match(expected.matcher())? {
            Some(raw) => {
                let end = self.cursor.mark();
                self.builder.add_node(expected.kind(), raw, start, end, None)
            }
            None if expected == Terminal::String => Err(self.cursor.error_at(
                E0004,
                "Unclosed string literal",
                Span::new(start.pos, start.pos + 1),
            )),
            None => Err(self
                .cursor
                .error(format!("Expected {}", expected.description()))),
        }
    }

    fn keyword_or_fragment(&mut self, start: Mark) -> Result<(), ParseError> {
        for (keyword, kind) in [
            ("true", NodeKind::Boolean),
            ("false", NodeKind::Boolean),
            ("null", NodeKind::Null),
        ] {
            if let Some(raw) = self.cursor.raw_match(terminal::word(keyword))? {
                let end = self.cursor.mark();
                return self.builder.add_node(kind, raw, start, end, None);
            }
        }

        let dialect = self.dialect;
        match dialect.lookup(self.cursor.rest()) {
            Some((introducer, fragment)) => self.fragment(introducer, fragment, start),
            None => Err(self.unknown_term()),
        }
    }

    fn fragment(
        &mut self,
        introducer: &'static str,
        fragment: &'static Fragment,
        start: Mark,
    ) -> Result<(), ParseError> {
        trace!("`{introducer}` at {}", start.pos);
        match fragment {
            Fragment::Function(function, params) => {
                self.enter(start)?;
                self.builder
                    .begin_node(NodeKind::Function, function.name(), start, None)?;
                self.cursor.accept(introducer)?;
                self.block(params)?;
                self.builder.end_node(self.cursor.mark());
                self.leave();
                Ok(())
            }
            Fragment::Modifier(..) => Err(self.cursor.error("Unexpected character `.`")),
            Fragment::DataItem(item_type) => self.data_item(*item_type, start),
            Fragment::RuleVariable => self.rule_variable(introducer, start),
            Fragment::ProgramVariable => {
                match self.cursor.raw_match(braced(introducer))? {
                    Some(raw) => {
                        let end = self.cursor.mark();
                        self.builder
                            .add_node(NodeKind::Variable, raw, start, end, None)
                    }
                    None => Err(self.unclosed(introducer, start)),
                }
            }
            Fragment::NamedValue => {
                match self.cursor.raw_match(('[', terminal::identifier, ']'))? {
                    Some(raw) => {
                        let end = self.cursor.mark();
                        self.builder
                            .add_node(NodeKind::NamedValue, raw, start, end, None)
                    }
                    None => Err(self.cursor.error_at(
                        E0006,
                        "Invalid named value",
                        Span::new(start.pos, start.pos + 1),
                    )),
                }
            }
        }
    }

    fn unclosed(&self, introducer: &str, start: Mark) -> ParseError {
        self.cursor.error_at(
            E0004,
            format!("Unclosed `{introducer}`"),
            Span::new(start.pos, start.pos + introducer.chars().count()),
        )
    }

    fn data_item(&mut self, item_type: DataItemType, start: Mark) -> Result<(), ParseError> {
        let prefix = item_type.prefix();
        let matched = match item_type {
            DataItemType::ProgramStageEventDate => {
                self.cursor.raw_match((prefix, terminal::uid))?
            }
            _ => self.cursor.raw_match(braced(prefix))?,
        };
        let Some(raw) = matched else {
            return Err(match item_type {
                DataItemType::ProgramStageEventDate => self.cursor.error_at(
                    E0008,
                    format!("Expected a program stage UID after `{prefix}`"),
                    Span::new(start.pos, start.pos + prefix.chars().count()),
                ),
                _ => self.unclosed(prefix, start),
            });
        };
        let end = self.cursor.mark();
        let body = &raw[prefix.len()..raw.len() - item_type.suffix().len()];

        match parse_item_body(item_type, body) {
            Ok(_) => self.builder.add_node(
                NodeKind::DataItem,
                raw,
                start,
                end,
                Some(data_item_decoder(item_type)),
            ),
            Err(_) if allows_rule_variable(item_type) && is_variable_name(body) => self
                .builder
                .add_node(NodeKind::Variable, raw, start, end, None),
            Err(reason) => Err(self.cursor.error_at(
                E0008,
                format!("Invalid data item `{raw}`: {reason}"),
                Span::new(start.pos, end.pos),
            )),
        }
    }

    fn rule_variable(&mut self, introducer: &'static str, start: Mark) -> Result<(), ParseError> {
        let Some(raw) = self.cursor.raw_match(braced(introducer))? else {
            return Err(self.unclosed(introducer, start));
        };
        let end = self.cursor.mark();
        let name = &raw[introducer.len()..raw.len() - 1];
        if !is_variable_name(name) {
            return Err(self.cursor.error_at(
                E0008,
                format!("Invalid variable name `{name}`"),
                Span::new(start.pos, end.pos),
            ));
        }
        self.builder
            .add_node(NodeKind::Variable, raw, start, end, None)
    }

    /// Dot-modifiers following a term
    fn modifiers(&mut self) -> Result<(), ParseError> {
        loop {
            self.cursor.skip_whitespace_and_comments()?;
            if self.cursor.peek(0) != Some('.') {
                return Ok(());
            }
            let start = self.cursor.mark();
            let dialect = self.dialect;
            match dialect.lookup(self.cursor.rest()) {
                Some((introducer, Fragment::Modifier(modifier, params))) => {
                    self.enter(start)?;
                    self.builder
                        .begin_node(NodeKind::Modifier, modifier.name(), start, None)?;
                    self.cursor.accept(introducer)?;
                    self.block(params)?;
                    self.builder.end_node(self.cursor.mark());
                    self.leave();
                }
                _ => {
                    let name = self
                        .cursor
                        .lookahead(('.', terminal::identifier))
                        .unwrap_or(".");
                    return Err(self.cursor.error_at(
                        E0007,
                        format!("Unknown modifier `{name}`"),
                        Span::new(start.pos, start.pos + name.chars().count()),
                    ));
                }
            }
        }
    }

    /// Parameters up to and including the closing `)`
    fn block(&mut self, params: &[Param]) -> Result<(), ParseError> {
        for (i, param) in params.iter().enumerate() {
            if matches!(param, Param::Optional(_)) {
                self.cursor.skip_whitespace_and_comments()?;
                if self.cursor.peek(0) == Some(')') {
                    break;
                }
            }
            if i > 0 {
                self.cursor.expect(',')?;
            }
            self.param(param)?;
        }
        self.cursor.expect(')')
    }

    fn param(&mut self, param: &Param) -> Result<(), ParseError> {
        match param {
            Param::Optional(inner) => self.param(inner),
            Param::OneOrMore(inner) => {
                self.param(inner)?;
                loop {
                    self.cursor.skip_whitespace_and_comments()?;
                    if self.cursor.peek(0) != Some(',') {
                        return Ok(());
                    }
                    self.cursor.expect(',')?;
                    self.param(inner)?;
                }
            }
            Param::Expr => self.argument(None, Self::expression),
            Param::QuotedExpr => {
                self.cursor.skip_whitespace_and_comments()?;
                let quote = self.cursor.peek(0).filter(|c| matches!(c, '\'' | '"'));
                self.argument(quote, Self::expression)
            }
            Param::Terminal {
                terminal: expected,
                quoted,
                decoder,
            } => {
                let (expected, quoted, decoder) = (*expected, *quoted, *decoder);
                self.argument(None, |grammar| {
                    grammar.terminal_param(expected, quoted, decoder)
                })
            }
        }
    }

    /// Wrap whatever `content` adds in an argument node, inside `quote`
    /// when given
    fn argument(
        &mut self,
        quote: Option<char>,
        content: impl FnOnce(&mut Self) -> Result<(), ParseError>,
    ) -> Result<(), ParseError> {
        self.cursor.skip_whitespace_and_comments()?;
        let start = self.cursor.mark();
        let raw = quote.map(String::from).unwrap_or_default();
        self.enter(start)?;
        self.builder
            .begin_node(NodeKind::Argument, &raw, start, None)?;
        if let Some(q) = quote {
            self.cursor.expect(q)?;
        }
        content(self)?;
        if let Some(q) = quote {
            self.cursor.expect(q)?;
        }
        self.builder.end_node(self.cursor.mark());
        self.leave();
        Ok(())
    }

    fn terminal_param(
        &mut self,
        expected: Terminal,
        quoted: bool,
        decoder: Option<Decoder>,
    ) -> Result<(), ParseError> {
        self.cursor.skip_whitespace_and_comments()?;
        let start = self.cursor.mark();
        let matched = if quoted {
            self.cursor.raw_match(terminal::quoted(expected.matcher()))?
        } else {
            self.cursor.raw_match(expected.matcher())?
        };
        match matched {
            Some(raw) => {
                let end = self.cursor.mark();
                self.builder
                    .add_node(expected.kind(), raw, start, end, decoder)
            }
            None => Err(self
                .cursor
                .error(format!("Expected {}", expected.description()))),
        }
    }

    /// Explain why nothing matched at a term position
    fn unknown_term(&self) -> ParseError {
        let pos = self.cursor.pos();
        let span = |text: &str| Span::new(pos, pos + text.chars().count());

        if let Some(call) = self.cursor.lookahead(terminal::call_name) {
            let name = call.trim_end_matches('(');
            return self.cursor.error_at(
                E0005,
                format!("Unknown function `{name}`"),
                span(name),
            );
        }
        if let Some(prefix) = self.cursor.lookahead(terminal::item_prefix) {
            return self.cursor.error_at(
                E0008,
                format!("Unknown data item `{prefix}`"),
                span(prefix),
            );
        }
        if self.cursor.peek(0) == Some('[') {
            return self.cursor.error_at(
                E0006,
                "Named values are not supported in this expression",
                span("["),
            );
        }
        if let Some(word) = self.cursor.lookahead(terminal::identifier) {
            return self.cursor.error_at(
                hisexpr_diagnostics::E0001,
                format!("Unknown identifier `{word}`"),
                span(word),
            );
        }
        match self.cursor.peek(0) {
            Some(c) => self.cursor.error(format!("Unexpected character `{c}`")),
            None => self.cursor.unexpected(None, "an expression"),
        }
    }
}
