//! Terminal grammars matched with winnow
//!
//! Each matcher only recognises text; decoding into node values happens in
//! the node factories.

use hisexpr_ast::NodeKind;
use winnow::Result;
use winnow::ascii::{digit0, digit1};
use winnow::combinator::{alt, not, opt, terminated};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::{any, one_of, take_till, take_while};

/// Recogniser over the unconsumed input
pub type Matcher = fn(&mut &str) -> Result<()>;

/// Terminal value kinds usable as block parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terminal {
    Number,
    /// Optionally signed integer
    Integer,
    String,
    Uid,
    Identifier,
    Date,
}

impl Terminal {
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Number => NodeKind::Number,
            Self::Integer => NodeKind::Integer,
            Self::String => NodeKind::String,
            Self::Uid => NodeKind::Uid,
            Self::Identifier => NodeKind::Identifier,
            Self::Date => NodeKind::Date,
        }
    }

    pub const fn matcher(&self) -> Matcher {
        match self {
            Self::Number => number,
            Self::Integer => integer,
            Self::String => string_literal,
            Self::Uid => uid,
            Self::Identifier => identifier,
            Self::Date => date,
        }
    }

    /// What the terminal is called in error messages
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Number => "a number",
            Self::Integer => "an integer",
            Self::String => "a string",
            Self::Uid => "a UID",
            Self::Identifier => "an identifier",
            Self::Date => "a date",
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `1`, `1.5`, `.5`, `2e-3`
pub fn number(input: &mut &str) -> Result<()> {
    alt(((digit1, opt(('.', digit0))).void(), ('.', digit1).void())).parse_next(input)?;
    opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)).parse_next(input)?;
    Ok(())
}

pub fn integer(input: &mut &str) -> Result<()> {
    (opt(one_of(['+', '-'])), digit1).void().parse_next(input)
}

/// Single or double quoted text; escapes are skipped over, not decoded
pub fn string_literal(input: &mut &str) -> Result<()> {
    let quote = one_of(['\'', '"']).parse_next(input)?;
    loop {
        match any.parse_next(input)? {
            '\\' => {
                any.parse_next(input)?;
            }
            c if c == quote => return Ok(()),
            _ => {}
        }
    }
}

/// Eleven alphanumerics starting with a letter, or the `*` wildcard
pub fn uid(input: &mut &str) -> Result<()> {
    alt((
        '*'.void(),
        (
            one_of(|c: char| c.is_ascii_alphabetic()),
            take_while(10, |c: char| c.is_ascii_alphanumeric()),
            not(one_of(|c: char| c.is_ascii_alphanumeric())),
        )
            .void(),
    ))
    .parse_next(input)
}

pub fn identifier(input: &mut &str) -> Result<()> {
    (
        one_of(|c: char| c.is_alphabetic() || c == '_'),
        take_while(0.., is_ident_char),
    )
        .void()
        .parse_next(input)
}

/// `YYYY-M?M-D?D`
pub fn date(input: &mut &str) -> Result<()> {
    (
        take_while(4, |c: char| c.is_ascii_digit()),
        '-',
        take_while(1..=2, |c: char| c.is_ascii_digit()),
        '-',
        take_while(1..=2, |c: char| c.is_ascii_digit()),
        not(one_of(|c: char| c.is_ascii_digit())),
    )
        .void()
        .parse_next(input)
}

/// A keyword that is not the start of a longer identifier
pub fn word<'i>(keyword: &'static str) -> impl Parser<&'i str, &'i str, ContextError> {
    terminated(keyword, not(one_of(is_ident_char)))
}

/// Rule variable names as written inside `#{...}` or `A{...}`
pub fn variable_name(input: &mut &str) -> Result<()> {
    (
        one_of(is_ident_char),
        take_while(0.., |c: char| is_ident_char(c) || matches!(c, ' ' | '-' | '.')),
    )
        .void()
        .parse_next(input)
}

/// Unary operator spellings at the start of a term
pub fn unary_operator<'i>(input: &mut &'i str) -> Result<&'i str> {
    alt(("+", "-", "!", word("not"), word("distinct"))).parse_next(input)
}

/// Binary operator spellings, longest first
pub fn binary_operator<'i>(input: &mut &'i str) -> Result<&'i str> {
    alt((
        "&&",
        "||",
        "==",
        "!=",
        "<=",
        ">=",
        "<",
        ">",
        "+",
        "-",
        "*",
        "/",
        "%",
        "^",
        word("and"),
        word("or"),
    ))
    .parse_next(input)
}

/// A terminal optionally wrapped in matching quotes
pub fn quoted<'i>(inner: Matcher) -> impl Parser<&'i str, (), ContextError> {
    move |input: &mut &'i str| {
        alt((('\'', inner, '\'').void(), ('"', inner, '"').void(), inner)).parse_next(input)
    }
}

/// `prefix` up to and including the next `}`
pub fn braced<'i>(prefix: &'static str) -> impl Parser<&'i str, (), ContextError> {
    (prefix, take_till(0.., '}'), '}').void()
}

/// Something that looks like a function call name, for error reporting
pub fn call_name<'i>(input: &mut &'i str) -> Result<&'i str> {
    terminated(
        take_while(1.., |c: char| is_ident_char(c) || c == ':' || c == '.'),
        '(',
    )
    .parse_next(input)
}

/// Something that looks like a data item prefix, for error reporting
pub fn item_prefix<'i>(input: &mut &'i str) -> Result<&'i str> {
    (take_while(1.., |c: char| c.is_ascii_uppercase() || c == '#'), '{')
        .take()
        .parse_next(input)
}

/// Whole-text checks
pub fn is_uid(text: &str) -> bool {
    uid.parse(text).is_ok()
}

pub fn is_identifier(text: &str) -> bool {
    identifier.parse(text).is_ok()
}

pub fn is_variable_name(text: &str) -> bool {
    variable_name.parse(text).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn matched(matcher: Matcher, text: &str) -> Option<&str> {
        let mut input = text;
        matcher(&mut input)
            .ok()
            .map(|()| &text[..text.len() - input.len()])
    }

    #[rstest]
    #[case("12", Some("12"))]
    #[case("1.5+", Some("1.5"))]
    #[case(".5", Some(".5"))]
    #[case("2e-3", Some("2e-3"))]
    #[case("3.", Some("3."))]
    #[case("e5", None)]
    fn test_number(#[case] text: &str, #[case] expected: Option<&str>) {
        assert_eq!(matched(number, text), expected);
    }

    #[rstest]
    #[case("FTRrcoaog83", true)]
    #[case("*", true)]
    #[case("1TRrcoaog83", false)]
    #[case("FTRrcoaog8", false)]
    #[case("FTRrcoaog833", false)]
    fn test_uid(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(is_uid(text), expected);
    }

    #[test]
    fn test_string_literal_skips_escapes() {
        assert_eq!(matched(string_literal, r"'it\'s' + 1"), Some(r"'it\'s'"));
        assert_eq!(matched(string_literal, "\"a'b\""), Some("\"a'b\""));
        assert_eq!(matched(string_literal, "'open"), None);
    }

    #[test]
    fn test_date() {
        assert_eq!(matched(date, "2020-1-05)"), Some("2020-1-05"));
        assert_eq!(matched(date, "20-01-01"), None);
    }

    #[test]
    fn test_word_boundaries() {
        let mut input = "android";
        assert!(binary_operator(&mut input).is_err());
        let mut input = "and(";
        assert_eq!(binary_operator(&mut input).ok(), Some("and"));
        let mut input = "notes";
        assert!(unary_operator(&mut input).is_err());
    }

    #[test]
    fn test_variable_names() {
        assert!(is_variable_name("not_supported"));
        assert!(is_variable_name("age in years"));
        assert!(!is_variable_name(""));
        assert!(!is_variable_name(" leading"));
    }

    #[test]
    fn test_quoted_terminal() {
        let mut parser = quoted(uid);
        let mut input = "'FTRrcoaog83',";
        assert!(parser.parse_next(&mut input).is_ok());
        assert_eq!(input, ",");
    }
}
