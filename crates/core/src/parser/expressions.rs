use super::Parser;
use crate::ast::{ArithOp, ComparisonOp};
use crate::error::ParseError;
use crate::lexer::TokenKind;
use crate::syntax::{ExpressionNode, LogicalOp};

const OPERAND_KINDS: &[TokenKind] = &[
    TokenKind::Identifier,
    TokenKind::NumberLiteral,
    TokenKind::StringLiteral,
    TokenKind::BooleanLiteral,
];

const TEXT_OPERAND_KINDS: &[TokenKind] = &[TokenKind::StringLiteral, TokenKind::Identifier];

const ARITH_OPERAND_KINDS: &[TokenKind] = &[TokenKind::Identifier, TokenKind::NumberLiteral];

impl<'a> Parser<'a> {
    // -- Logical structure --------------------------------------

    /// expression := and_expr ('or' expression)?
    pub(super) fn parse_expression(&mut self) -> Result<ExpressionNode, ParseError> {
        let left = self.parse_and_expr()?;
        match self.eat(TokenKind::Or) {
            Some(operator) => {
                let right = self.nested(Self::parse_expression)?;
                Ok(logical(left, operator, LogicalOp::Or, right))
            }
            None => Ok(left),
        }
    }

    /// and_expr := unary ('and' and_expr)?
    fn parse_and_expr(&mut self) -> Result<ExpressionNode, ParseError> {
        let left = self.parse_unary_expr()?;
        match self.eat(TokenKind::And) {
            Some(operator) => {
                let right = self.nested(Self::parse_and_expr)?;
                Ok(logical(left, operator, LogicalOp::And, right))
            }
            None => Ok(left),
        }
    }

    fn parse_unary_expr(&mut self) -> Result<ExpressionNode, ParseError> {
        if let Some(operator) = self.eat(TokenKind::Not) {
            let operand = self.nested(Self::parse_unary_expr)?;
            return Ok(ExpressionNode::Not {
                span: operator.span.to(operand.span()),
                operator,
                operand: Box::new(operand),
            });
        }
        self.parse_primary_expr()
    }

    fn parse_primary_expr(&mut self) -> Result<ExpressionNode, ParseError> {
        if let Some(open) = self.eat(TokenKind::LParen) {
            let inner = self.nested(Self::parse_expression)?;
            let close = self.expect_any(&[TokenKind::RParen])?;
            return Ok(ExpressionNode::Group {
                span: open.span.to(close.span),
                open,
                inner: Box::new(inner),
                close,
            });
        }

        let left = self.expect_any(&[TokenKind::Identifier])?;

        if let Some((operator, op)) =
            self.eat_decoded(TokenKind::ComparisonOperator, ComparisonOp::from_lexeme)
        {
            let right = if op.is_unary() {
                None
            } else if op.is_textual() {
                Some(self.expect_any(TEXT_OPERAND_KINDS)?)
            } else {
                Some(self.expect_any(OPERAND_KINDS)?)
            };
            let end = right.as_ref().map_or(operator.span, |r| r.span);
            return Ok(ExpressionNode::Comparison {
                span: left.span.to(end),
                left,
                operator,
                op,
                right,
            });
        }

        if let Some((operator, op)) =
            self.eat_decoded(TokenKind::ArithmeticOperator, ArithOp::from_lexeme)
        {
            let right = self.expect_any(ARITH_OPERAND_KINDS)?;
            return Ok(ExpressionNode::Arithmetic {
                span: left.span.to(right.span),
                left,
                operator,
                op,
                right,
            });
        }

        Err(self.unexpected())
    }
}

fn logical(
    left: ExpressionNode,
    operator: crate::lexer::Token,
    op: LogicalOp,
    right: ExpressionNode,
) -> ExpressionNode {
    ExpressionNode::Logical {
        span: left.span().to(right.span()),
        left: Box::new(left),
        operator,
        op,
        right: Box::new(right),
    }
}
