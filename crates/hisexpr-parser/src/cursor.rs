//! Character cursor over the source text
//!
//! The cursor tracks a byte offset for slicing and a character offset for
//! spans. Every consumption of syntax ("gobble") first skips whitespace and
//! comments; in annotate mode the skipped text since the previous gobble is
//! flushed into a token list so it can be restored onto nodes afterwards.

use hisexpr_diagnostics::{E0001, E0002, E0004, ErrorCode, ParseError, Span};
use winnow::Parser;
use winnow::error::ContextError;

/// Position snapshot used to open and close nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    /// Character offset
    pub pos: usize,
    /// Number of whitespace tokens flushed so far
    pub token: usize,
}

#[derive(Debug)]
pub struct Cursor<'a> {
    source: &'a str,
    byte: usize,
    pos: usize,
    annotate: bool,
    /// Byte offset where the previous gobble ended
    flushed: usize,
    tokens: Vec<String>,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str, annotate: bool) -> Self {
        Self {
            source,
            byte: 0,
            pos: 0,
            annotate,
            flushed: 0,
            tokens: Vec::new(),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Unconsumed input
    pub fn rest(&self) -> &'a str {
        &self.source[self.byte..]
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.byte >= self.source.len()
    }

    pub fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            token: self.tokens.len(),
        }
    }

    pub fn peek(&self, offset: usize) -> Option<char> {
        self.rest().chars().nth(offset)
    }

    fn advance(&mut self, text: &str) {
        self.byte += text.len();
        self.pos += text.chars().count();
    }

    /// Skip whitespace and `/* ... */` comments. A comment is consumed whole
    /// or not at all.
    pub fn skip_whitespace_and_comments(&mut self) -> Result<(), ParseError> {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.advance(&rest[..rest.len() - trimmed.len()]);

            if !trimmed.starts_with("/*") {
                return Ok(());
            }
            match trimmed[2..].find("*/") {
                Some(end) => self.advance(&trimmed[..end + 4]),
                None => {
                    return Err(self.error_at(
                        E0004,
                        "Unclosed comment",
                        Span::new(self.pos, self.pos + 2),
                    ));
                }
            }
        }
    }

    fn flush(&mut self) {
        if self.annotate {
            self.tokens
                .push(self.source[self.flushed..self.byte].to_string());
        }
    }

    /// Consume `text`, which must be next in the input, as one gobble
    fn gobble(&mut self, text: &str) {
        self.flush();
        self.advance(text);
        self.flushed = self.byte;
    }

    /// Consume `expected` or fail
    pub fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        self.expect_with(|c| c == expected, &format!("`{expected}`"))
            .map(|_| ())
    }

    /// Consume the next character if it satisfies `predicate`
    pub fn expect_with(
        &mut self,
        predicate: impl Fn(char) -> bool,
        expected: &str,
    ) -> Result<char, ParseError> {
        self.skip_whitespace_and_comments()?;
        match self.peek(0) {
            Some(c) if predicate(c) => {
                let mut buf = [0u8; 4];
                self.gobble(c.encode_utf8(&mut buf));
                Ok(c)
            }
            found => Err(self.unexpected(found, expected)),
        }
    }

    /// Consume `text` if the input continues with it
    pub fn accept(&mut self, text: &str) -> Result<bool, ParseError> {
        self.skip_whitespace_and_comments()?;
        if self.rest().starts_with(text) {
            self.gobble(text);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Run a sub-grammar and consume whatever it matched as one gobble.
    ///
    /// Returns `None` without consuming anything when it does not match.
    pub fn raw_match<O>(
        &mut self,
        parser: impl Parser<&'a str, O, ContextError>,
    ) -> Result<Option<&'a str>, ParseError> {
        self.skip_whitespace_and_comments()?;
        let matched = self.lookahead(parser);
        if let Some(text) = matched {
            self.gobble(text);
        }
        Ok(matched)
    }

    /// Run a sub-grammar against the unconsumed input without consuming it
    pub fn lookahead<O>(&self, mut parser: impl Parser<&'a str, O, ContextError>) -> Option<&'a str> {
        let rest = self.rest();
        let mut input = rest;
        match parser.parse_next(&mut input) {
            Ok(_) => Some(&rest[..rest.len() - input.len()]),
            Err(_) => None,
        }
    }

    /// Positioned syntax error at the current character
    pub fn error(&self, message: impl Into<String>) -> ParseError {
        let span = match self.peek(0) {
            Some(_) => Span::new(self.pos, self.pos + 1),
            None => Span::point(self.pos),
        };
        self.error_at(E0001, message, span)
    }

    pub fn error_at(&self, code: ErrorCode, message: impl Into<String>, span: Span) -> ParseError {
        ParseError::new(code, message, self.source, span)
    }

    /// Error for finding `found` where `expected` was required
    pub fn unexpected(&self, found: Option<char>, expected: &str) -> ParseError {
        match found {
            Some(c) => self.error(format!("Expected {expected} but found `{c}`")),
            None => self.error_at(
                E0002,
                format!("Unexpected end of input, expected {expected}"),
                Span::point(self.pos),
            ),
        }
    }

    /// Flush trailing whitespace and hand back the recorded tokens
    pub fn finish(mut self) -> Result<Vec<String>, ParseError> {
        self.skip_whitespace_and_comments()?;
        self.flush();
        Ok(self.tokens)
    }
}
