//! Error taxonomy for the markup parser and the XPath engine (spec §7).
//!
//! Each phase gets its own `thiserror` enum — mirroring the teacher's one-enum-per-phase
//! `ParserError` shape — rather than one flat enum, so that e.g. a `LexError` can't be
//! constructed where only a `ParseError` makes sense. [`Error`] aggregates all of them for the
//! two public entry points, [`crate::parse`] and [`crate::query`].

use crate::position::{Diagnostic, Position};
use thiserror::Error as ThisError;

/// Lexer-level failures in the markup tokenizer (§4.1).
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated comment starting at {0}")]
    UnterminatedComment(Position),
    #[error("unterminated string starting at {0}")]
    UnterminatedString(Position),
    #[error("unterminated CDATA section starting at {0}")]
    UnterminatedCdata(Position),
    #[error("unterminated or malformed DTD markup starting at {0}")]
    MalformedDtd(Position),
    #[error("unexpected character {ch:?} at {position}")]
    UnknownCharacter { position: Position, ch: char },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnterminatedComment(p)
            | LexError::UnterminatedString(p)
            | LexError::UnterminatedCdata(p)
            | LexError::MalformedDtd(p) => *p,
            LexError::UnknownCharacter { position, .. } => *position,
        }
    }
}

/// Parser-level failures building the tree from tokens (§4.2).
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{0}")]
    Lex(#[from] LexError),
    #[error("namespace constraint violated at {position}: {message}")]
    NamespaceConstraint { position: Position, message: String },
    #[error("duplicate expanded attribute name {name:?} at {position}")]
    DuplicateAttribute { position: Position, name: String },
    #[error("closing tag {found:?} does not match open element {expected:?} at {position}")]
    MismatchedClose {
        position: Position,
        expected: String,
        found: String,
    },
    #[error("multiple root elements; second root element at {0}")]
    MultipleRoots(Position),
    #[error("unexpected end of input while parsing (expected {expected}) at {position}")]
    UnexpectedEof { position: Position, expected: String },
    #[error("malformed prolog or processing instruction at {position}: {message}")]
    MalformedProlog { position: Position, message: String },
    #[error("unresolved namespace prefix {prefix:?} at {position}")]
    UnresolvedNamespace { position: Position, prefix: String },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lex(e) => e.position(),
            ParseError::NamespaceConstraint { position, .. }
            | ParseError::DuplicateAttribute { position, .. }
            | ParseError::MismatchedClose { position, .. }
            | ParseError::UnexpectedEof { position, .. }
            | ParseError::MalformedProlog { position, .. }
            | ParseError::UnresolvedNamespace { position, .. } => *position,
            ParseError::MultipleRoots(p) => *p,
        }
    }

    pub fn to_diagnostic(&self, lexeme: impl Into<String>) -> Diagnostic {
        Diagnostic::new(self.position(), lexeme, self.to_string())
    }
}

/// Non-fatal markup-phase findings (§7). Collected on `Root`, never thrown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    ReservedPrefix { position: Position, name: String },
    UnexpectedNonWhitespaceText { position: Position },
    TolerableHtmlRecovery { position: Position, message: String },
}

impl Warning {
    pub fn position(&self) -> Position {
        match self {
            Warning::ReservedPrefix { position, .. }
            | Warning::UnexpectedNonWhitespaceText { position }
            | Warning::TolerableHtmlRecovery { position, .. } => *position,
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::ReservedPrefix { position, name } => write!(
                f,
                "{position}: reserved prefix/name {name:?} begins with 'xml'"
            ),
            Warning::UnexpectedNonWhitespaceText { position } => {
                write!(f, "{position}: non-whitespace text where only whitespace was expected")
            }
            Warning::TolerableHtmlRecovery { position, message } => {
                write!(f, "{position}: {message}")
            }
        }
    }
}

/// Top-level error returned by [`crate::parse`] and [`crate::query`].
#[derive(ThisError, Debug, Clone)]
pub enum Error {
    #[error("markup error: {0}")]
    Markup(#[from] ParseError),
    #[error("query error: {0}")]
    Query(#[from] crate::xpath::error::QueryError),
}
