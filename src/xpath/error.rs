//! Error taxonomy for the query lexer, query parser, and evaluator (spec §7).

use crate::position::Position;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum QueryLexError {
    #[error("malformed number at {0}")]
    MalformedNumber(Position),
    #[error("unclosed string starting at {0}")]
    UnclosedString(Position),
    #[error("unclosed comment starting at {0}")]
    UnclosedComment(Position),
    #[error("unexpected character {ch:?} at {position}")]
    UnknownCharacter { position: Position, ch: char },
}

#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum QueryParseError {
    #[error("unexpected token {found:?} at {position} (expected {expected})")]
    UnexpectedToken {
        position: Position,
        found: String,
        expected: String,
    },
    #[error("trailing comma in argument list at {0}")]
    TrailingComma(Position),
    #[error("missing closing {bracket:?} at {position}")]
    MissingClosingBracket { position: Position, bracket: char },
}

#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("{function}() expects {expected} arguments, got {found}")]
    ArgumentCount {
        function: String,
        expected: String,
        found: usize,
    },
    #[error("union operator requires two node-sets")]
    UnionOfNonNodeSets,
    #[error("a predicate's left expression must evaluate to a node-set")]
    PredicateNonNodeSet,
    #[error("{0}")]
    TypeError(String),
    #[error("unknown function {0:?}")]
    UnknownFunction(String),
}

/// Aggregates the three XPath-phase error kinds for [`crate::query`] (mirrors [`crate::error::Error`]).
#[derive(ThisError, Debug, Clone)]
pub enum QueryError {
    #[error("query lex error: {0}")]
    Lex(#[from] QueryLexError),
    #[error("query parse error: {0}")]
    Parse(#[from] QueryParseError),
    #[error("query evaluation error: {0}")]
    Eval(#[from] EvalError),
}
