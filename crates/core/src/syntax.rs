//! Concrete syntax tree for one requirement sentence.
//!
//! Every node keeps the tokens it was built from, so the tree covers the
//! source text exactly. Operator nodes also carry the decoded operator so
//! elaboration never re-reads lexemes.

use crate::ast::{ArithOp, ComparisonOp, ModalKind};
use crate::lexer::{Span, Token, TokenKind};
use serde::Serialize;

/// Grammar rule a node was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxKind {
    Requirement,
    Subject,
    ModalVerb,
    Action,
    Verb,
    Object,
    PrepositionPhrase,
    Condition,
    Constraint,
    Comparison,
    LogicalExpression,
    ArithmeticExpression,
    Group,
    Variable,
    NumberLiteral,
    StringLiteral,
    BooleanLiteral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequirementNode {
    pub subject: Token,
    pub modal_verb: Token,
    pub modal: ModalKind,
    pub action: ActionNode,
    pub condition: Option<ClauseNode>,
    pub constraint: Option<ClauseNode>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionNode {
    pub verb: Token,
    pub object: Option<Token>,
    pub preposition_phrase: Option<PrepositionNode>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrepositionNode {
    pub preposition: Token,
    pub noun_phrase: Token,
    pub span: Span,
}

/// `if <expr>` or `where <expr>`
#[derive(Debug, Clone, PartialEq)]
pub struct ClauseNode {
    pub keyword: Token,
    pub expression: ExpressionNode,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    Comparison {
        left: Token,
        operator: Token,
        op: ComparisonOp,
        right: Option<Token>,
        span: Span,
    },
    Arithmetic {
        left: Token,
        operator: Token,
        op: ArithOp,
        right: Token,
        span: Span,
    },
    Logical {
        left: Box<ExpressionNode>,
        operator: Token,
        op: LogicalOp,
        right: Box<ExpressionNode>,
        span: Span,
    },
    Not {
        operator: Token,
        operand: Box<ExpressionNode>,
        span: Span,
    },
    Group {
        open: Token,
        inner: Box<ExpressionNode>,
        close: Token,
        span: Span,
    },
}

impl ExpressionNode {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            ExpressionNode::Comparison { .. } => SyntaxKind::Comparison,
            ExpressionNode::Arithmetic { .. } => SyntaxKind::ArithmeticExpression,
            ExpressionNode::Logical { .. } | ExpressionNode::Not { .. } => {
                SyntaxKind::LogicalExpression
            }
            ExpressionNode::Group { .. } => SyntaxKind::Group,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ExpressionNode::Comparison { span, .. }
            | ExpressionNode::Arithmetic { span, .. }
            | ExpressionNode::Logical { span, .. }
            | ExpressionNode::Not { span, .. }
            | ExpressionNode::Group { span, .. } => *span,
        }
    }

    /// Nesting depth of logical operators and groups.
    pub fn depth(&self) -> usize {
        match self {
            ExpressionNode::Comparison { .. } | ExpressionNode::Arithmetic { .. } => 1,
            ExpressionNode::Logical { left, right, .. } => 1 + left.depth().max(right.depth()),
            ExpressionNode::Not { operand, .. } => 1 + operand.depth(),
            ExpressionNode::Group { inner, .. } => 1 + inner.depth(),
        }
    }
}

impl ClauseNode {
    pub fn kind(&self) -> SyntaxKind {
        if self.keyword.kind == TokenKind::If {
            SyntaxKind::Condition
        } else {
            SyntaxKind::Constraint
        }
    }
}

/// One line of a pre-order listing of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    pub depth: usize,
    pub kind: SyntaxKind,
    pub span: Span,
}

impl RequirementNode {
    pub fn kind(&self) -> SyntaxKind {
        SyntaxKind::Requirement
    }

    /// Pre-order listing of every node with its nesting depth.
    pub fn outline(&self) -> Vec<OutlineEntry> {
        let mut out = Vec::new();
        let mut push = |depth, kind, span| out.push(OutlineEntry { depth, kind, span });
        push(0, SyntaxKind::Requirement, self.span);
        push(1, SyntaxKind::Subject, self.subject.span);
        push(1, SyntaxKind::ModalVerb, self.modal_verb.span);
        push(1, SyntaxKind::Action, self.action.span);
        push(2, SyntaxKind::Verb, self.action.verb.span);
        if let Some(object) = &self.action.object {
            push(2, SyntaxKind::Object, object.span);
        }
        if let Some(pp) = &self.action.preposition_phrase {
            push(2, SyntaxKind::PrepositionPhrase, pp.span);
        }
        for clause in self.condition.iter().chain(self.constraint.iter()) {
            out.push(OutlineEntry {
                depth: 1,
                kind: clause.kind(),
                span: clause.span,
            });
            outline_expr(&clause.expression, 2, &mut out);
        }
        out
    }
}

fn operand_kind(token: &Token) -> SyntaxKind {
    match token.kind {
        TokenKind::NumberLiteral => SyntaxKind::NumberLiteral,
        TokenKind::StringLiteral => SyntaxKind::StringLiteral,
        TokenKind::BooleanLiteral => SyntaxKind::BooleanLiteral,
        _ => SyntaxKind::Variable,
    }
}

fn outline_expr(expr: &ExpressionNode, depth: usize, out: &mut Vec<OutlineEntry>) {
    out.push(OutlineEntry {
        depth,
        kind: expr.kind(),
        span: expr.span(),
    });
    let leaf = |token: &Token| OutlineEntry {
        depth: depth + 1,
        kind: operand_kind(token),
        span: token.span,
    };
    match expr {
        ExpressionNode::Comparison { left, right, .. } => {
            out.push(leaf(left));
            if let Some(right) = right {
                out.push(leaf(right));
            }
        }
        ExpressionNode::Arithmetic { left, right, .. } => {
            out.push(leaf(left));
            out.push(leaf(right));
        }
        ExpressionNode::Logical { left, right, .. } => {
            outline_expr(left, depth + 1, out);
            outline_expr(right, depth + 1, out);
        }
        ExpressionNode::Not { operand, .. } => outline_expr(operand, depth + 1, out),
        ExpressionNode::Group { inner, .. } => outline_expr(inner, depth + 1, out),
    }
}
