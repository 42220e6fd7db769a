//! Recursive-descent parser producing a [`RequirementNode`].
//!
//! The parser is predictive: every alternative it checks at the current
//! position is recorded in an expected set, which is cleared whenever a
//! token is consumed. A failure therefore reports every token kind that
//! would have been accepted at that position.
//!
//! Expressions may nest at most [`MAX_NESTING_DEPTH`] levels. Each group,
//! `not`, and chained `and`/`or` operand is one level; deeper input is
//! rejected with a [`ParseError`] carrying the limit.

use crate::error::ParseError;
use crate::lexer::{Span, Token, TokenKind, TokenValue};
use crate::syntax::RequirementNode;
use std::collections::BTreeSet;

mod expressions;
mod requirement;

/// Deepest expression nesting accepted on one line.
pub const MAX_NESTING_DEPTH: usize = 64;

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    expected: BTreeSet<TokenKind>,
    depth: usize,
    /// Returned once the slice is exhausted, so the stream need not end in `Eof`.
    eof: Token,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        let end = tokens.last().map_or(0, |t| t.span.end);
        Parser {
            tokens,
            pos: 0,
            expected: BTreeSet::new(),
            depth: 0,
            eof: Token {
                kind: TokenKind::Eof,
                text: String::new(),
                value: TokenValue::None,
                span: Span::new(end, end),
            },
        }
    }

    fn cur(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn bump(&mut self) -> Token {
        let t = self.cur().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        self.expected.clear();
        t
    }

    /// Is the current token of `kind`? Records `kind` as expected if not.
    fn at(&mut self, kind: TokenKind) -> bool {
        if self.cur().kind == kind {
            true
        } else {
            self.expected.insert(kind);
            false
        }
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) {
            Some(self.bump())
        } else {
            None
        }
    }

    /// Try each kind in order; the first match wins.
    fn eat_any(&mut self, kinds: &[TokenKind]) -> Option<Token> {
        for &kind in kinds {
            if self.at(kind) {
                return Some(self.bump());
            }
        }
        None
    }

    fn expect_any(&mut self, kinds: &[TokenKind]) -> Result<Token, ParseError> {
        match self.eat_any(kinds) {
            Some(t) => Ok(t),
            None => Err(self.unexpected()),
        }
    }

    /// Consume a token of `kind` whose lexeme decodes with `decode`.
    fn eat_decoded<T>(
        &mut self,
        kind: TokenKind,
        decode: impl Fn(&str) -> Option<T>,
    ) -> Option<(Token, T)> {
        if self.at(kind) {
            if let Some(value) = decode(&self.cur().text) {
                return Some((self.bump(), value));
            }
            self.expected.insert(kind);
        }
        None
    }

    fn unexpected(&mut self) -> ParseError {
        ParseError {
            position: self.cur().span.start,
            expected: std::mem::take(&mut self.expected),
            found: self.cur().clone(),
            nesting_limit: None,
        }
    }

    /// Run `rule` one nesting level deeper.
    fn nested<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError {
                position: self.cur().span.start,
                expected: BTreeSet::new(),
                found: self.cur().clone(),
                nesting_limit: Some(MAX_NESTING_DEPTH),
            });
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }
}

/// Parse one requirement from its token stream.
///
/// An empty stream (blank line) is rejected like any other input that does
/// not start with a subject; callers filter blank lines beforehand.
pub fn parse(tokens: &[Token]) -> Result<RequirementNode, ParseError> {
    let mut p = Parser::new(tokens);
    p.parse_requirement()
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
