use std::fmt::{Display, Error, Formatter};

use crate::{domain::ExecutionError, lexer::Token};

pub type CadenceResult<T> = Result<T, CadenceError>;

#[derive(Debug, PartialEq, Clone)]
pub enum CadenceError {
    Parser(ParserError),
    Execution(ExecutionError),
}

#[derive(Debug, PartialEq, Clone)]
pub enum LexerError {
    UnexpectedCharacter(char),
    InternalError(String),
}

#[derive(Debug, PartialEq, Clone)]
pub enum ParserError {
    ExpectedToken(Token, Token),
    UnexpectedToken(Token),
    SyntaxError,
}

impl Display for CadenceError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        match self {
            CadenceError::Parser(e) => write!(f, "Parser error: {e}"),
            CadenceError::Execution(e) => write!(f, "{e}"),
        }
    }
}

impl Display for LexerError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        match self {
            LexerError::UnexpectedCharacter(c) => write!(f, "Unexpected character: {c}"),
            LexerError::InternalError(msg) => write!(f, "Internal Error: {msg}"),
        }
    }
}

impl Display for ParserError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        match self {
            ParserError::ExpectedToken(expected, found) => {
                write!(f, "Expected token {expected:?}, found {found:?}")
            }
            ParserError::UnexpectedToken(token) => {
                write!(f, "Unexpected token \"{token:?}\"")
            }
            ParserError::SyntaxError => {
                write!(f, "SyntaxError")
            }
        }
    }
}
