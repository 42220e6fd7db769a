//! Intent records: the elaborated form of one requirement sentence.
//!
//! These types are produced by elaboration and consumed by the constraint
//! translator. They serialize to JSON so reporting layers can read them
//! without linking this crate.

use crate::lexer::Span;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

// ──────────────────────────────────────────────
// Modal obligation
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalKind {
    Can,
    Must,
    Should,
    Shall,
    Will,
    May,
}

impl ModalKind {
    pub fn from_lexeme(word: &str) -> Option<Self> {
        Some(match word {
            "can" => ModalKind::Can,
            "must" => ModalKind::Must,
            "should" => ModalKind::Should,
            "shall" => ModalKind::Shall,
            "will" => ModalKind::Will,
            "may" => ModalKind::May,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModalKind::Can => "can",
            ModalKind::Must => "must",
            ModalKind::Should => "should",
            ModalKind::Shall => "shall",
            ModalKind::Will => "will",
            ModalKind::May => "may",
        }
    }

    /// Obligation strength: may < can < should < will < must = shall.
    pub fn strength(self) -> u8 {
        match self {
            ModalKind::May => 0,
            ModalKind::Can => 1,
            ModalKind::Should => 2,
            ModalKind::Will => 3,
            ModalKind::Must | ModalKind::Shall => 4,
        }
    }

    /// Compare by obligation strength. `Must` and `Shall` compare equal here
    /// even though they are distinct values.
    pub fn cmp_strength(self, other: ModalKind) -> Ordering {
        self.strength().cmp(&other.strength())
    }
}

impl fmt::Display for ModalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ──────────────────────────────────────────────
// Operators
// ──────────────────────────────────────────────

/// A comparison operator exactly as written. Symbol and English forms are
/// kept apart here; the translator folds them onto semantic kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Neq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "equals")]
    Equals,
    #[serde(rename = "not_equals")]
    NotEquals,
    #[serde(rename = "greater_than")]
    GreaterThan,
    #[serde(rename = "less_than")]
    LessThan,
    #[serde(rename = "at_least")]
    AtLeast,
    #[serde(rename = "at_most")]
    AtMost,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "does_not_contain")]
    DoesNotContain,
    #[serde(rename = "is_set")]
    IsSet,
    #[serde(rename = "is_not_set")]
    IsNotSet,
}

impl ComparisonOp {
    pub const ALL: [ComparisonOp; 16] = [
        ComparisonOp::Eq,
        ComparisonOp::Neq,
        ComparisonOp::Gt,
        ComparisonOp::Lt,
        ComparisonOp::Gte,
        ComparisonOp::Lte,
        ComparisonOp::Equals,
        ComparisonOp::NotEquals,
        ComparisonOp::GreaterThan,
        ComparisonOp::LessThan,
        ComparisonOp::AtLeast,
        ComparisonOp::AtMost,
        ComparisonOp::Contains,
        ComparisonOp::DoesNotContain,
        ComparisonOp::IsSet,
        ComparisonOp::IsNotSet,
    ];

    pub fn from_lexeme(s: &str) -> Option<Self> {
        ComparisonOp::ALL.into_iter().find(|op| op.lexeme() == s)
    }

    pub fn lexeme(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "==",
            ComparisonOp::Neq => "!=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Lt => "<",
            ComparisonOp::Gte => ">=",
            ComparisonOp::Lte => "<=",
            ComparisonOp::Equals => "equals",
            ComparisonOp::NotEquals => "not_equals",
            ComparisonOp::GreaterThan => "greater_than",
            ComparisonOp::LessThan => "less_than",
            ComparisonOp::AtLeast => "at_least",
            ComparisonOp::AtMost => "at_most",
            ComparisonOp::Contains => "contains",
            ComparisonOp::DoesNotContain => "does_not_contain",
            ComparisonOp::IsSet => "is_set",
            ComparisonOp::IsNotSet => "is_not_set",
        }
    }

    /// Presence tests take no right-hand operand.
    pub fn is_unary(self) -> bool {
        matches!(self, ComparisonOp::IsSet | ComparisonOp::IsNotSet)
    }

    /// Substring tests only accept a string literal or a variable on the right.
    pub fn is_textual(self) -> bool {
        matches!(self, ComparisonOp::Contains | ComparisonOp::DoesNotContain)
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lexeme())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Rem,
}

impl ArithOp {
    pub fn from_lexeme(s: &str) -> Option<Self> {
        Some(match s {
            "+" => ArithOp::Add,
            "-" => ArithOp::Sub,
            "*" => ArithOp::Mul,
            "/" => ArithOp::Div,
            "%" => ArithOp::Rem,
            _ => return None,
        })
    }

    pub fn lexeme(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Rem => "%",
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lexeme())
    }
}

// ──────────────────────────────────────────────
// Constraint expressions
// ──────────────────────────────────────────────

/// A named variable occurrence. `span` is the byte range within the
/// requirement line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(default)]
    pub span: Span,
}

impl Variable {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Variable {
            name: name.into(),
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Operand {
    Variable(Variable),
    Number(i64),
    String(String),
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintExpr {
    /// `left op right`; `right` is `None` only for `is_set` / `is_not_set`
    Comparison {
        left: Variable,
        op: ComparisonOp,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<Operand>,
    },
    LogicalAnd {
        left: Box<ConstraintExpr>,
        right: Box<ConstraintExpr>,
    },
    LogicalOr {
        left: Box<ConstraintExpr>,
        right: Box<ConstraintExpr>,
    },
    LogicalNot {
        operand: Box<ConstraintExpr>,
    },
    /// `left op right`; right is a variable or number literal
    Arithmetic {
        left: Variable,
        op: ArithOp,
        right: Operand,
    },
}

impl ConstraintExpr {
    pub fn and(left: ConstraintExpr, right: ConstraintExpr) -> Self {
        ConstraintExpr::LogicalAnd {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: ConstraintExpr, right: ConstraintExpr) -> Self {
        ConstraintExpr::LogicalOr {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(operand: ConstraintExpr) -> Self {
        ConstraintExpr::LogicalNot {
            operand: Box::new(operand),
        }
    }

    /// Number of comparison and arithmetic leaves.
    pub fn leaf_count(&self) -> usize {
        match self {
            ConstraintExpr::Comparison { .. } | ConstraintExpr::Arithmetic { .. } => 1,
            ConstraintExpr::LogicalAnd { left, right } | ConstraintExpr::LogicalOr { left, right } => {
                left.leaf_count() + right.leaf_count()
            }
            ConstraintExpr::LogicalNot { operand } => operand.leaf_count(),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Variable(v) => f.write_str(&v.name),
            Operand::Number(n) => write!(f, "{}", n),
            Operand::String(s) => write_string_literal(f, s),
            Operand::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Quote `s` using only the escapes the lexer understands. Other control
/// characters are written raw; the lexer keeps them as they are.
fn write_string_literal(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            _ => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

/// Infix form that parses back to the same expression. Parentheses are
/// only written where precedence or right-nesting requires them.
impl fmt::Display for ConstraintExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintExpr::Comparison {
                left,
                op,
                right: Some(right),
            } => write!(f, "{} {} {}", left.name, op, right),
            ConstraintExpr::Comparison {
                left,
                op,
                right: None,
            } => write!(f, "{} {}", left.name, op),
            ConstraintExpr::Arithmetic { left, op, right } => {
                write!(f, "{} {} {}", left.name, op, right)
            }
            ConstraintExpr::LogicalAnd { left, right } => {
                let left_parens = matches!(
                    **left,
                    ConstraintExpr::LogicalAnd { .. } | ConstraintExpr::LogicalOr { .. }
                );
                let right_parens = matches!(**right, ConstraintExpr::LogicalOr { .. });
                write_operand(f, left, left_parens)?;
                f.write_str(" and ")?;
                write_operand(f, right, right_parens)
            }
            ConstraintExpr::LogicalOr { left, right } => {
                let left_parens = matches!(**left, ConstraintExpr::LogicalOr { .. });
                write_operand(f, left, left_parens)?;
                f.write_str(" or ")?;
                write_operand(f, right, false)
            }
            ConstraintExpr::LogicalNot { operand } => {
                let parens = matches!(
                    **operand,
                    ConstraintExpr::LogicalAnd { .. } | ConstraintExpr::LogicalOr { .. }
                );
                f.write_str("not ")?;
                write_operand(f, operand, parens)
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &ConstraintExpr, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

// ──────────────────────────────────────────────
// Intent record
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepositionPhrase {
    pub preposition: String,
    pub noun_phrase: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub verb: String,
    /// Absent for intransitive sentences such as `User must authenticate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preposition_phrase: Option<PrepositionPhrase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentRecord {
    pub subject: String,
    pub modal: ModalKind,
    pub action: Action,
    /// The `if ...` clause
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConstraintExpr>,
    /// The `where ...` clause
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<ConstraintExpr>,
}

impl IntentRecord {
    /// Condition and constraint clauses that are present, in that order.
    pub fn clauses(&self) -> impl Iterator<Item = &ConstraintExpr> {
        self.condition.iter().chain(self.constraint.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modal_strength_orders_obligations() {
        let ordered = [
            ModalKind::May,
            ModalKind::Can,
            ModalKind::Should,
            ModalKind::Will,
            ModalKind::Must,
        ];
        for pair in ordered.windows(2) {
            assert_eq!(pair[0].cmp_strength(pair[1]), Ordering::Less);
        }
        assert_eq!(
            ModalKind::Must.cmp_strength(ModalKind::Shall),
            Ordering::Equal
        );
        assert_ne!(ModalKind::Must, ModalKind::Shall);
    }

    #[test]
    fn comparison_lexemes_round_trip() {
        for op in ComparisonOp::ALL {
            assert_eq!(ComparisonOp::from_lexeme(op.lexeme()), Some(op));
        }
        assert_eq!(ComparisonOp::from_lexeme("=~"), None);
    }

    #[test]
    fn operators_serialize_as_lexemes() {
        assert_eq!(
            serde_json::to_value(ComparisonOp::AtLeast).unwrap(),
            serde_json::json!("at_least")
        );
        assert_eq!(
            serde_json::to_value(ArithOp::Rem).unwrap(),
            serde_json::json!("%")
        );
    }

    #[test]
    fn record_json_omits_absent_clauses() {
        let record = IntentRecord {
            subject: "User".into(),
            modal: ModalKind::Can,
            action: Action {
                verb: "login".into(),
                object: None,
                preposition_phrase: None,
            },
            condition: None,
            constraint: None,
        };
        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "subject": "User",
                "modal": "can",
                "action": { "verb": "login" }
            })
        );
        let back: IntentRecord = serde_json::from_value(v).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn infix_rendering_keeps_needed_parentheses() {
        let gt = |name: &str, n| ConstraintExpr::Comparison {
            left: Variable::new(name, Span::default()),
            op: ComparisonOp::Gt,
            right: Some(Operand::Number(n)),
        };
        let expr = ConstraintExpr::and(
            ConstraintExpr::or(gt("a", 1), gt("b", 2)),
            ConstraintExpr::not(ConstraintExpr::and(gt("c", 3), gt("d", 4))),
        );
        assert_eq!(expr.to_string(), "(a > 1 or b > 2) and not (c > 3 and d > 4)");

        let flat = ConstraintExpr::or(gt("a", 1), ConstraintExpr::and(gt("b", 2), gt("c", 3)));
        assert_eq!(flat.to_string(), "a > 1 or b > 2 and c > 3");
    }

    #[test]
    fn string_operands_render_as_lexable_literals() {
        let raw = "a\"b\\c\nd\te\u{1}f\rg\0";
        let rendered = Operand::String(raw.into()).to_string();
        assert_eq!(rendered, "\"a\\\"b\\\\c\\nd\\te\u{1}f\rg\0\"");

        let tokens = crate::lexer::tokenize(&rendered).unwrap();
        assert_eq!(tokens[0].value, crate::lexer::TokenValue::Str(raw.into()));
    }

    #[test]
    fn leaf_count_walks_nested_logic() {
        let cmp = |name: &str| ConstraintExpr::Comparison {
            left: Variable::new(name, Span::default()),
            op: ComparisonOp::IsSet,
            right: None,
        };
        let expr = ConstraintExpr::or(ConstraintExpr::and(cmp("a"), cmp("b")), ConstraintExpr::not(cmp("c")));
        assert_eq!(expr.leaf_count(), 3);
    }
}
