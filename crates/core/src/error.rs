use crate::constraint::{SourcePosition, VarType};
use crate::lexer::{Token, TokenKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A lexical error. Always fatal to the line being tokenized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LexError {
    #[error("unexpected character {found:?} at offset {position}")]
    UnexpectedCharacter { position: usize, found: char },

    #[error("unterminated string literal starting at offset {position}")]
    UnterminatedString { position: usize },

    #[error("invalid escape sequence '\\{escape}' at offset {position}")]
    InvalidEscape { position: usize, escape: char },

    #[error("integer literal '{literal}' at offset {position} does not fit in 64 bits")]
    IntegerOverflow { position: usize, literal: String },
}

impl LexError {
    pub fn position(&self) -> usize {
        match self {
            LexError::UnexpectedCharacter { position, .. }
            | LexError::UnterminatedString { position }
            | LexError::InvalidEscape { position, .. }
            | LexError::IntegerOverflow { position, .. } => *position,
        }
    }
}

/// The token stream does not match the grammar at `position`.
///
/// `expected` holds every token kind that would have been accepted there,
/// not only the first alternative the parser tried. When the expression
/// nests too deeply, `nesting_limit` is set and `expected` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{}", describe_parse_error(.expected, .found, .position, .nesting_limit))]
pub struct ParseError {
    pub position: usize,
    pub expected: BTreeSet<TokenKind>,
    pub found: Token,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nesting_limit: Option<usize>,
}

fn describe_parse_error(
    expected: &BTreeSet<TokenKind>,
    found: &Token,
    position: &usize,
    nesting_limit: &Option<usize>,
) -> String {
    match nesting_limit {
        Some(limit) => format!(
            "expression nests deeper than {} levels at {} at offset {}",
            limit, found, position
        ),
        None => format!(
            "expected {}, found {} at offset {}",
            describe_expected(expected),
            found,
            position
        ),
    }
}

fn describe_expected(expected: &BTreeSet<TokenKind>) -> String {
    let names: Vec<&str> = expected.iter().map(|k| k.describe()).collect();
    match names.as_slice() {
        [] => "nothing".to_owned(),
        [one] => (*one).to_owned(),
        [init @ .., last] => format!("one of {} or {}", init.join(", "), last),
    }
}

/// A batch of intent records could not be lowered to a constraint set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranslationError {
    #[error(
        "type conflict on '{variable}': first used as {first_type}, then as {conflicting_type} ({conflicting_position})"
    )]
    TypeConflict {
        variable: String,
        first_type: VarType,
        conflicting_type: VarType,
        conflicting_position: SourcePosition,
    },

    /// An operator/operand combination the grammar never produces. Seeing
    /// this means the record was built by hand or deserialized from bad
    /// input, not parsed from a sentence.
    #[error("operator '{operator}' cannot be used this way ({position}): {reason}")]
    UnmappedOperator {
        operator: String,
        reason: String,
        position: SourcePosition,
    },
}

impl TranslationError {
    pub fn position(&self) -> SourcePosition {
        match self {
            TranslationError::TypeConflict {
                conflicting_position,
                ..
            } => *conflicting_position,
            TranslationError::UnmappedOperator { position, .. } => *position,
        }
    }
}

/// Any failure of the requirement pipeline, tagged with the stage that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("translation error: {0}")]
    Translation(#[from] TranslationError),
}

impl Error {
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Lex(_) => "lex",
            Error::Parse(_) => "parse",
            Error::Translation(_) => "translation",
        }
    }

    /// Byte offset of the offending text within its line.
    pub fn offset(&self) -> usize {
        match self {
            Error::Lex(e) => e.position(),
            Error::Parse(e) => e.position,
            Error::Translation(e) => e.position().offset,
        }
    }

    /// Serialize with a `stage` discriminator so consumers can tell the
    /// stages apart without matching on message text.
    pub fn to_json_value(&self) -> serde_json::Value {
        let detail = match self {
            Error::Lex(e) => serde_json::to_value(e),
            Error::Parse(e) => serde_json::to_value(e),
            Error::Translation(e) => serde_json::to_value(e),
        };
        serde_json::json!({
            "stage":   self.stage(),
            "offset":  self.offset(),
            "message": self.to_string(),
            "detail":  detail.unwrap_or(serde_json::Value::Null),
        })
    }

    /// Render a caret diagnostic pointing into `line`.
    ///
    /// ```text
    /// error[parse]: expected ..., found 'money' at offset 9
    ///   | withdraw money if balance >= amount
    ///   |          ^
    /// ```
    pub fn render(&self, line: &str) -> String {
        let line = line.trim_end_matches(['\n', '\r']);
        let offset = self.offset().min(line.len());
        let column = line
            .get(..offset)
            .map_or(offset, |prefix| prefix.chars().count());
        let message = match self {
            Error::Lex(e) => e.to_string(),
            Error::Parse(e) => e.to_string(),
            Error::Translation(e) => e.to_string(),
        };
        format!(
            "error[{}]: {}\n  | {}\n  | {}^",
            self.stage(),
            message,
            line,
            " ".repeat(column)
        )
    }
}
