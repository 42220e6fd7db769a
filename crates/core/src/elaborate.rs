//! Elaboration: concrete syntax tree -> [`IntentRecord`].
//!
//! The tree is already fully typed by the parser, so this step cannot fail.
//! It drops surface detail (groups, keyword tokens, spans of everything but
//! variables) and resolves literal tokens to their values.

use crate::ast::{
    Action, ConstraintExpr, IntentRecord, Operand, PrepositionPhrase, Variable,
};
use crate::lexer::{Token, TokenValue};
use crate::syntax::{ClauseNode, ExpressionNode, LogicalOp, RequirementNode};

/// Lower a parsed requirement to its intent record.
pub fn elaborate(tree: &RequirementNode) -> IntentRecord {
    let action = &tree.action;
    IntentRecord {
        subject: tree.subject.text.clone(),
        modal: tree.modal,
        action: Action {
            verb: action.verb.text.clone(),
            object: action.object.as_ref().map(word),
            preposition_phrase: action.preposition_phrase.as_ref().map(|pp| PrepositionPhrase {
                preposition: pp.preposition.text.clone(),
                noun_phrase: word(&pp.noun_phrase),
            }),
        },
        condition: tree.condition.as_ref().map(clause),
        constraint: tree.constraint.as_ref().map(clause),
    }
}

/// Identifier text, or the decoded content of a string literal.
fn word(token: &Token) -> String {
    match &token.value {
        TokenValue::Str(s) => s.clone(),
        _ => token.text.clone(),
    }
}

fn clause(node: &ClauseNode) -> ConstraintExpr {
    expr(&node.expression)
}

fn expr(node: &ExpressionNode) -> ConstraintExpr {
    match node {
        ExpressionNode::Comparison {
            left, op, right, ..
        } => ConstraintExpr::Comparison {
            left: variable(left),
            op: *op,
            right: right.as_ref().map(operand),
        },
        ExpressionNode::Arithmetic {
            left, op, right, ..
        } => ConstraintExpr::Arithmetic {
            left: variable(left),
            op: *op,
            right: operand(right),
        },
        ExpressionNode::Logical {
            left,
            op: LogicalOp::And,
            right,
            ..
        } => ConstraintExpr::and(expr(left), expr(right)),
        ExpressionNode::Logical {
            left,
            op: LogicalOp::Or,
            right,
            ..
        } => ConstraintExpr::or(expr(left), expr(right)),
        ExpressionNode::Not { operand, .. } => ConstraintExpr::not(expr(operand)),
        // Parentheses only shape the tree; they leave no node behind.
        ExpressionNode::Group { inner, .. } => expr(inner),
    }
}

fn variable(token: &Token) -> Variable {
    Variable::new(token.text.clone(), token.span)
}

fn operand(token: &Token) -> Operand {
    match &token.value {
        TokenValue::Int(n) => Operand::Number(*n),
        TokenValue::Str(s) => Operand::String(s.clone()),
        TokenValue::Bool(b) => Operand::Boolean(*b),
        TokenValue::None => Operand::Variable(variable(token)),
    }
}
