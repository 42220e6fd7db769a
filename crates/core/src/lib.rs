#![allow(clippy::result_large_err)]
//! crucible-core: requirement sentence parser and constraint translator.
//!
//! Turns constrained-English requirement sentences such as
//! `User can withdraw money if balance >= amount` into structured intent
//! records, then lowers batches of records into typed constraint sets for
//! an external satisfiability engine.
//!
//! # Pipeline
//!
//! - [`tokenize()`] -- one line of text to a token stream
//! - [`parse()`] -- token stream to a concrete syntax tree
//! - [`elaborate()`] -- syntax tree to an [`IntentRecord`]
//! - [`translate()`] -- a batch of records to a [`ConstraintSet`], whose
//!   `Display` is an SMT-LIB v2 script (see [`smt`])
//!
//! [`parse_one()`] runs the first three stages for a single line and
//! [`parse_document()`] does the same for every line of a document.
//! Every stage is a pure function of its input; nothing is shared between
//! calls.

pub mod ast;
pub mod constraint;
pub mod document;
pub mod elaborate;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod smt;
pub mod syntax;
pub mod translate;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{
    Action, ArithOp, ComparisonOp, ConstraintExpr, IntentRecord, ModalKind, Operand,
    PrepositionPhrase, Variable,
};
pub use constraint::{
    Clause, ClauseRole, ComparisonKind, Constraint, ConstraintSet, PredicateKind, SourcePosition,
    Term, VarType,
};
pub use document::{Document, LineError, ParsedRequirement, DEFAULT_MAX_ERRORS};
pub use error::{Error, LexError, ParseError, TranslationError};
pub use lexer::{Span, Token, TokenCategory, TokenKind, TokenValue};
pub use syntax::RequirementNode;

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use document::{parse_document, parse_document_recovering};
pub use elaborate::elaborate;
pub use lexer::tokenize;
pub use parser::{parse, MAX_NESTING_DEPTH};
pub use translate::{map_operator, translate, OperatorMapping};

/// Tokenize, parse and elaborate one requirement line.
pub fn parse_one(text: &str) -> Result<IntentRecord, Error> {
    let tokens = tokenize(text)?;
    let tree = parse(&tokens)?;
    Ok(elaborate(&tree))
}

/// Parse a single line and translate it on its own.
pub fn translate_one(text: &str) -> Result<ConstraintSet, Error> {
    let record = parse_one(text)?;
    Ok(translate(std::slice::from_ref(&record))?)
}
