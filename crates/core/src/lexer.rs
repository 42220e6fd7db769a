//! Lexer for single-line requirement sentences.
//!
//! Words are classified against fixed, case-sensitive vocabularies; every
//! vocabulary word is reserved and never lexes as a plain identifier.
//! Offsets are byte offsets into the input line.

use crate::ast::ComparisonOp;
use crate::error::LexError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open byte range `[start, end)` into the source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Identifier,
    StringLiteral,
    NumberLiteral,
    BooleanLiteral,
    SubjectKeyword,
    ModalVerb,
    VerbKeyword,
    Preposition,
    If,
    Where,
    And,
    Or,
    Not,
    ComparisonOperator,
    ArithmeticOperator,
    LParen,
    RParen,
    Newline,
    Eof,
}

/// Coarse lexical class of a token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenCategory {
    Identifier,
    StringLiteral,
    NumberLiteral,
    Keyword,
    Operator,
    Punctuation,
}

impl TokenKind {
    pub fn category(self) -> TokenCategory {
        match self {
            TokenKind::Identifier => TokenCategory::Identifier,
            TokenKind::StringLiteral => TokenCategory::StringLiteral,
            TokenKind::NumberLiteral => TokenCategory::NumberLiteral,
            TokenKind::BooleanLiteral
            | TokenKind::SubjectKeyword
            | TokenKind::ModalVerb
            | TokenKind::VerbKeyword
            | TokenKind::Preposition
            | TokenKind::If
            | TokenKind::Where
            | TokenKind::And
            | TokenKind::Or
            | TokenKind::Not => TokenCategory::Keyword,
            TokenKind::ComparisonOperator | TokenKind::ArithmeticOperator => {
                TokenCategory::Operator
            }
            TokenKind::LParen | TokenKind::RParen | TokenKind::Newline | TokenKind::Eof => {
                TokenCategory::Punctuation
            }
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::StringLiteral => "string literal",
            TokenKind::NumberLiteral => "number literal",
            TokenKind::BooleanLiteral => "boolean literal",
            TokenKind::SubjectKeyword => "subject keyword",
            TokenKind::ModalVerb => "modal verb",
            TokenKind::VerbKeyword => "verb keyword",
            TokenKind::Preposition => "preposition",
            TokenKind::If => "'if'",
            TokenKind::Where => "'where'",
            TokenKind::And => "'and'",
            TokenKind::Or => "'or'",
            TokenKind::Not => "'not'",
            TokenKind::ComparisonOperator => "comparison operator",
            TokenKind::ArithmeticOperator => "arithmetic operator",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Newline => "end of line",
            TokenKind::Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Decoded payload of a literal token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TokenValue {
    None,
    Int(i64),
    /// String content with quotes stripped and escapes resolved
    Str(String),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw lexeme as it appears in the source
    pub text: String,
    pub value: TokenValue,
    pub span: Span,
}

impl Token {
    fn new(kind: TokenKind, text: &str, value: TokenValue, span: Span) -> Self {
        Token {
            kind,
            text: text.to_owned(),
            value,
            span,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof | TokenKind::Newline => f.write_str(self.kind.describe()),
            _ => write!(f, "'{}'", self.text),
        }
    }
}

pub const SUBJECT_KEYWORDS: &[&str] = &["User", "System", "Admin", "Application", "Service", "API"];

pub const MODAL_VERBS: &[&str] = &["can", "must", "should", "shall", "will", "may"];

pub const VERB_KEYWORDS: &[&str] = &[
    "create",
    "read",
    "update",
    "delete",
    "validate",
    "verify",
    "authenticate",
    "authorize",
    "encrypt",
    "decrypt",
    "send",
    "receive",
    "store",
    "retrieve",
    "process",
    "calculate",
    "generate",
    "export",
    "import",
    "withdraw",
    "deposit",
    "transfer",
    "login",
    "logout",
    "register",
];

pub const PREPOSITIONS: &[&str] = &[
    "from", "to", "into", "in", "on", "with", "for", "by", "at", "via",
];

/// Classify a word lexeme. Vocabulary lookup comes first; anything left
/// over is an identifier.
fn classify_word(word: &str) -> (TokenKind, TokenValue) {
    let kind = match word {
        "if" => TokenKind::If,
        "where" => TokenKind::Where,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "true" => return (TokenKind::BooleanLiteral, TokenValue::Bool(true)),
        "false" => return (TokenKind::BooleanLiteral, TokenValue::Bool(false)),
        w if SUBJECT_KEYWORDS.contains(&w) => TokenKind::SubjectKeyword,
        w if MODAL_VERBS.contains(&w) => TokenKind::ModalVerb,
        w if VERB_KEYWORDS.contains(&w) => TokenKind::VerbKeyword,
        w if PREPOSITIONS.contains(&w) => TokenKind::Preposition,
        w if ComparisonOp::from_lexeme(w).is_some() => TokenKind::ComparisonOperator,
        _ => TokenKind::Identifier,
    };
    (kind, TokenValue::None)
}

/// Split one requirement line into tokens. The stream always ends with an
/// `Eof` token positioned at the end of the input.
pub fn tokenize(src: &str) -> Result<Vec<Token>, LexError> {
    let chars: Vec<(usize, char)> = src.char_indices().collect();
    let offset_of = |i: usize| chars.get(i).map_or(src.len(), |&(o, _)| o);
    let mut tokens = Vec::new();
    let mut pos = 0usize;

    while pos < chars.len() {
        let (start, c) = chars[pos];

        // Line comment
        if c == '/' && matches!(chars.get(pos + 1), Some(&(_, '/'))) {
            while pos < chars.len() && chars[pos].1 != '\n' {
                pos += 1;
            }
            continue;
        }

        if c == '\n' {
            tokens.push(Token::new(
                TokenKind::Newline,
                "\n",
                TokenValue::None,
                Span::new(start, start + 1),
            ));
            pos += 1;
            continue;
        }

        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        // String literal
        if c == '"' {
            pos += 1;
            let mut s = String::new();
            loop {
                let Some(&(at, sc)) = chars.get(pos) else {
                    return Err(LexError::UnterminatedString { position: start });
                };
                match sc {
                    '"' => {
                        pos += 1;
                        break;
                    }
                    '\n' => return Err(LexError::UnterminatedString { position: start }),
                    '\\' => {
                        let resolved = match chars.get(pos + 1) {
                            None | Some(&(_, '\n')) => {
                                return Err(LexError::UnterminatedString { position: start })
                            }
                            Some(&(_, 'n')) => '\n',
                            Some(&(_, 't')) => '\t',
                            Some(&(_, '"')) => '"',
                            Some(&(_, '\\')) => '\\',
                            Some(&(_, '/')) => '/',
                            Some(&(_, other)) => {
                                return Err(LexError::InvalidEscape {
                                    position: at,
                                    escape: other,
                                })
                            }
                        };
                        s.push(resolved);
                        pos += 2;
                    }
                    other => {
                        s.push(other);
                        pos += 1;
                    }
                }
            }
            let end = offset_of(pos);
            tokens.push(Token::new(
                TokenKind::StringLiteral,
                &src[start..end],
                TokenValue::Str(s),
                Span::new(start, end),
            ));
            continue;
        }

        // Number
        if c.is_ascii_digit() {
            while pos < chars.len() && chars[pos].1.is_ascii_digit() {
                pos += 1;
            }
            let end = offset_of(pos);
            let text = &src[start..end];
            let n: i64 = text.parse().map_err(|_| LexError::IntegerOverflow {
                position: start,
                literal: text.to_owned(),
            })?;
            tokens.push(Token::new(
                TokenKind::NumberLiteral,
                text,
                TokenValue::Int(n),
                Span::new(start, end),
            ));
            continue;
        }

        // Identifier / keyword. ASCII only: a non-ASCII letter stops the
        // word and is then rejected below as an unexpected character.
        if c.is_ascii_alphabetic() || c == '_' {
            while pos < chars.len() && (chars[pos].1.is_ascii_alphanumeric() || chars[pos].1 == '_')
            {
                pos += 1;
            }
            let end = offset_of(pos);
            let word = &src[start..end];
            let (kind, value) = classify_word(word);
            tokens.push(Token::new(kind, word, value, Span::new(start, end)));
            continue;
        }

        // Operators and punctuation
        let next = chars.get(pos + 1).map(|&(_, n)| n);
        let (kind, len) = match (c, next) {
            ('=', Some('=')) | ('!', Some('=')) | ('>', Some('=')) | ('<', Some('=')) => {
                (TokenKind::ComparisonOperator, 2)
            }
            ('>', _) | ('<', _) => (TokenKind::ComparisonOperator, 1),
            ('+', _) | ('-', _) | ('*', _) | ('/', _) | ('%', _) => {
                (TokenKind::ArithmeticOperator, 1)
            }
            ('(', _) => (TokenKind::LParen, 1),
            (')', _) => (TokenKind::RParen, 1),
            _ => {
                return Err(LexError::UnexpectedCharacter {
                    position: start,
                    found: c,
                })
            }
        };
        let end = start + len;
        tokens.push(Token::new(
            kind,
            &src[start..end],
            TokenValue::None,
            Span::new(start, end),
        ));
        pos += len;
    }

    tokens.push(Token::new(
        TokenKind::Eof,
        "",
        TokenValue::None,
        Span::new(src.len(), src.len()),
    ));
    Ok(tokens)
}
