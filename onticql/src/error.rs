use crate::grammar::Rule;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("syntax error: {0}")]
    SyntaxError(String),
    #[error("empty expression")]
    EmptyExpression,
    #[error("expected {expected}, got {got:?}")]
    UnexpectedRule { expected: &'static str, got: Rule },
    #[error("missing {0} operand")]
    MissingOperand(&'static str),
    #[error("invalid literal: {0}")]
    InvalidLiteral(String),
    #[error("invalid condition: {0}")]
    InvalidCondition(String),
}
