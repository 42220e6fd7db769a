//! Constraint sets: the translator's output and the hand-off shape for an
//! external satisfiability engine.
//!
//! A set is only ever built whole. Every variable referenced by a clause is
//! declared exactly once with a single reconciled type.

use crate::ast::ArithOp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Inferred type of a constraint variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarType {
    Integer,
    String,
    Boolean,
    /// Never compared against a literal, directly or through other variables
    Unconstrained,
}

impl VarType {
    /// SMT-LIB sort the variable is declared with. Unconstrained variables
    /// default to `Int`.
    pub fn sort_name(self) -> &'static str {
        match self {
            VarType::Integer | VarType::Unconstrained => "Int",
            VarType::String => "String",
            VarType::Boolean => "Bool",
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VarType::Integer => "integer",
            VarType::String => "string",
            VarType::Boolean => "boolean",
            VarType::Unconstrained => "unconstrained",
        };
        f.write_str(name)
    }
}

/// Where in a translation batch something occurred: the index of the
/// record within the batch and a byte offset within that record's line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    pub record: usize,
    pub offset: usize,
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record {}, offset {}", self.record, self.offset)
    }
}

/// Semantic comparison kinds. Symbol and English operator spellings both
/// land here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonKind {
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
}

impl ComparisonKind {
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonKind::Equal => "=",
            ComparisonKind::NotEqual => "distinct",
            ComparisonKind::GreaterThan => ">",
            ComparisonKind::LessThan => "<",
            ComparisonKind::GreaterOrEqual => ">=",
            ComparisonKind::LessOrEqual => "<=",
        }
    }
}

/// String and presence predicates, kept apart from the arithmetic six.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateKind {
    Contains,
    DoesNotContain,
    IsSet,
    IsNotSet,
}

impl PredicateKind {
    pub fn name(self) -> &'static str {
        match self {
            PredicateKind::Contains => "contains",
            PredicateKind::DoesNotContain => "does_not_contain",
            PredicateKind::IsSet => "is_set",
            PredicateKind::IsNotSet => "is_not_set",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Term {
    Variable(String),
    Integer(i64),
    String(String),
    Boolean(bool),
}

/// A translated constraint node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    Compare {
        relation: ComparisonKind,
        left: String,
        right: Term,
    },
    Predicate {
        predicate: PredicateKind,
        subject: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        argument: Option<Term>,
    },
    And {
        left: Box<Constraint>,
        right: Box<Constraint>,
    },
    Or {
        left: Box<Constraint>,
        right: Box<Constraint>,
    },
    Not {
        operand: Box<Constraint>,
    },
    /// Kept verbatim; only its variables' types are checked.
    Arithmetic {
        op: ArithOp,
        left: String,
        right: Term,
    },
}

/// Which clause of a requirement a constraint came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseRole {
    Condition,
    Constraint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    /// Index of the originating record within the batch
    pub record: usize,
    pub role: ClauseRole,
    pub constraint: Constraint,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstraintSet {
    /// One entry per present condition/constraint, in batch order.
    pub clauses: Vec<Clause>,
    pub variables: BTreeMap<String, VarType>,
}

impl ConstraintSet {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn variable_type(&self, name: &str) -> Option<VarType> {
        self.variables.get(name).copied()
    }
}
