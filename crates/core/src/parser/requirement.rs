use super::Parser;
use crate::ast::ModalKind;
use crate::error::ParseError;
use crate::lexer::TokenKind;
use crate::syntax::{ActionNode, ClauseNode, PrepositionNode, RequirementNode};

impl<'a> Parser<'a> {
    // requirement := subject modal_verb action condition? constraint? NEWLINE? EOF
    pub(super) fn parse_requirement(&mut self) -> Result<RequirementNode, ParseError> {
        // Keyword lookup first, identifier as the fallback.
        let subject = self.expect_any(&[TokenKind::SubjectKeyword, TokenKind::Identifier])?;

        let Some((modal_verb, modal)) = self.eat_decoded(TokenKind::ModalVerb, ModalKind::from_lexeme)
        else {
            return Err(self.unexpected());
        };

        let action = self.parse_action()?;
        let condition = self.parse_clause(TokenKind::If)?;
        let constraint = self.parse_clause(TokenKind::Where)?;

        let mut end = constraint
            .as_ref()
            .or(condition.as_ref())
            .map_or(action.span, |c| c.span);
        if let Some(newline) = self.eat(TokenKind::Newline) {
            end = end.to(newline.span);
        }
        self.expect_any(&[TokenKind::Eof])?;

        Ok(RequirementNode {
            span: subject.span.to(end),
            subject,
            modal_verb,
            modal,
            action,
            condition,
            constraint,
        })
    }

    // action := verb object? preposition_phrase?
    fn parse_action(&mut self) -> Result<ActionNode, ParseError> {
        let verb = self.expect_any(&[TokenKind::VerbKeyword, TokenKind::Identifier])?;
        let object = self.eat_any(&[TokenKind::Identifier, TokenKind::StringLiteral]);

        let preposition_phrase = match self.eat(TokenKind::Preposition) {
            Some(preposition) => {
                let noun_phrase =
                    self.expect_any(&[TokenKind::Identifier, TokenKind::StringLiteral])?;
                Some(PrepositionNode {
                    span: preposition.span.to(noun_phrase.span),
                    preposition,
                    noun_phrase,
                })
            }
            None => None,
        };

        let mut span = verb.span;
        if let Some(object) = &object {
            span = span.to(object.span);
        }
        if let Some(pp) = &preposition_phrase {
            span = span.to(pp.span);
        }
        Ok(ActionNode {
            verb,
            object,
            preposition_phrase,
            span,
        })
    }

    // condition := 'if' expression
    // constraint := 'where' expression
    fn parse_clause(&mut self, keyword: TokenKind) -> Result<Option<ClauseNode>, ParseError> {
        let Some(keyword) = self.eat(keyword) else {
            return Ok(None);
        };
        let expression = self.parse_expression()?;
        Ok(Some(ClauseNode {
            span: keyword.span.to(expression.span()),
            keyword,
            expression,
        }))
    }
}
