#![deny(unsafe_code)]
//! Parser for the signature policy language used by endorsement and
//! collection policies:
//!
//! ```text
//! expr       := call
//! call       := ("OR" | "AND") "(" operand ("," operand)* ")"
//!             | "OUTOF" "(" int "," operand ("," operand)* ")"
//! operand    := call | principal
//! principal  := "'" org_id "." role "'"
//! ```
//!
//! Keywords are case-insensitive. `OR` becomes a 1-of-n threshold, `AND` an
//! n-of-n threshold and `OutOf(k, ...)` a k-of-n threshold.

pub mod lexer;

use lexer::{lex, Spanned, Token};
use peerctl_types::{IdentityPrincipal, PolicyNode, PrincipalError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyParseError {
    #[error("syntax error at offset {offset} near '{fragment}': {message}")]
    Syntax { message: String, fragment: String, offset: usize },

    #[error("unknown principal '{principal}': role '{role}' is not one of member, admin, peer, client")]
    UnknownPrincipal { principal: String, role: String },
}

impl PolicyParseError {
    pub(crate) fn syntax(src: &str, start: usize, end: usize, message: impl Into<String>) -> Self {
        PolicyParseError::Syntax {
            message: message.into(),
            fragment: src[start..end].to_string(),
            offset: start,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Or,
    And,
    OutOf,
}

impl Operator {
    fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "OR" => Some(Operator::Or),
            "AND" => Some(Operator::And),
            "OUTOF" => Some(Operator::OutOf),
            _ => None,
        }
    }
}

/// Deepest nesting of AND/OR/OutOf calls a policy may use.
pub const MAX_DEPTH: usize = 128;

/// Parses a policy expression such as `OR('Org1MSP.member', AND('Org2MSP.peer', 'Org3MSP.peer'))`.
pub fn parse_policy(expression: &str) -> Result<PolicyNode, PolicyParseError> {
    let tokens = lex(expression)?;
    let mut parser = Parser { src: expression, tokens, pos: 0, depth: 0 };

    let first = parser.peek().clone();
    match first.token {
        Token::Eof => return Err(parser.error_at(&first, "empty policy expression")),
        Token::Principal(_) => {
            return Err(parser.error_at(
                &first,
                "a policy must be an AND, OR or OutOf call; wrap single principals, e.g. OR('Org1.member')",
            ))
        }
        _ => {}
    }

    let node = parser.parse_call()?;

    let trailing = parser.advance();
    if trailing.token != Token::Eof {
        return Err(parser.error_at(&trailing, "unexpected input after the end of the policy"));
    }

    log::debug!("parsed policy '{}' into a tree of depth {}", expression, node.depth());
    Ok(node)
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Spanned {
        // lex() always terminates the stream with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Spanned {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn error_at(&self, tok: &Spanned, message: &str) -> PolicyParseError {
        let message = if tok.token == Token::Eof {
            format!("{} (reached end of expression)", message)
        } else {
            message.to_string()
        };
        PolicyParseError::syntax(self.src, tok.start, tok.end, message)
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), PolicyParseError> {
        let tok = self.advance();
        if tok.token == expected {
            Ok(())
        } else {
            Err(self.error_at(&tok, &format!("expected {}", what)))
        }
    }

    fn parse_call(&mut self) -> Result<PolicyNode, PolicyParseError> {
        let head = self.advance();
        let op = match &head.token {
            Token::Word(word) => Operator::from_keyword(word)
                .ok_or_else(|| self.error_at(&head, "expected AND, OR or OutOf"))?,
            _ => return Err(self.error_at(&head, "expected AND, OR or OutOf")),
        };
        if self.depth >= MAX_DEPTH {
            return Err(self.error_at(
                &head,
                &format!("policy nests deeper than {} AND/OR/OutOf calls", MAX_DEPTH),
            ));
        }
        self.depth += 1;
        let node = self.parse_call_body(op);
        self.depth -= 1;
        node
    }

    fn parse_call_body(&mut self, op: Operator) -> Result<PolicyNode, PolicyParseError> {
        self.expect(Token::LParen, "'('")?;

        let count = if op == Operator::OutOf {
            let tok = self.advance();
            let k = match tok.token {
                Token::Int(k) => k,
                _ => return Err(self.error_at(&tok, "expected a threshold count")),
            };
            self.expect(Token::Comma, "',' after the threshold count")?;
            Some((k, tok))
        } else {
            None
        };

        let mut children = vec![self.parse_operand()?];
        loop {
            let tok = self.advance();
            match tok.token {
                Token::Comma => children.push(self.parse_operand()?),
                Token::RParen => break,
                _ => return Err(self.error_at(&tok, "expected ',' or ')'")),
            }
        }

        match (op, count) {
            (Operator::OutOf, Some((k, tok))) => {
                PolicyNode::threshold(k, children).map_err(|e| self.error_at(&tok, &e.to_string()))
            }
            (Operator::And, _) => Ok(PolicyNode::all_of(children)),
            _ => Ok(PolicyNode::any_of(children)),
        }
    }

    fn parse_operand(&mut self) -> Result<PolicyNode, PolicyParseError> {
        let tok = self.peek().clone();
        match &tok.token {
            Token::Principal(text) => {
                self.advance();
                self.parse_principal(text, &tok)
            }
            Token::Word(_) => self.parse_call(),
            _ => Err(self.error_at(&tok, "expected a quoted principal or a nested AND/OR/OutOf")),
        }
    }

    fn parse_principal(&self, text: &str, tok: &Spanned) -> Result<PolicyNode, PolicyParseError> {
        match text.parse::<IdentityPrincipal>() {
            Ok(principal) => Ok(PolicyNode::leaf(principal)),
            Err(PrincipalError::UnknownRole(role)) => Err(PolicyParseError::UnknownPrincipal {
                principal: text.to_string(),
                role,
            }),
            Err(e) => Err(self.error_at(tok, &e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outof_count_above_operands_is_a_syntax_error() {
        match parse_policy("OutOf(3, 'A.member', 'B.member')").unwrap_err() {
            PolicyParseError::Syntax { fragment, message, .. } => {
                assert_eq!(fragment, "3");
                assert!(message.contains("exceeds"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_expression_is_rejected() {
        assert!(matches!(parse_policy("   "), Err(PolicyParseError::Syntax { .. })));
    }

    #[test]
    fn missing_close_paren_reports_end_of_input() {
        match parse_policy("AND('A.member', 'B.member'").unwrap_err() {
            PolicyParseError::Syntax { message, offset, .. } => {
                assert!(message.contains("end of expression"));
                assert_eq!(offset, 26);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
