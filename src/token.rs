//! Markup token kinds and the token envelope the lexer hands to the parser (§4.1).

use crate::error::LexError;
use crate::position::Position;

/// One recognized lexeme.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Lt,
    Gt,
    Slash,
    Question,
    Equals,
    Colon,
    Name(String),
    Number(String),
    QuotedString(String),
    /// A run of raw text between markup. `is_cdata` / `has_entity` mirror the flags stored on
    /// the eventual `Text` tree node (§3.1) so the parser does not need to re-scan the lexeme.
    /// `has_stray_lt` is set when the run swallowed a `<` that did not open recognized markup
    /// (HTML tolerance) so the parser can raise a `TolerableHtmlRecovery` warning for it.
    Text {
        value: String,
        is_cdata: bool,
        has_entity: bool,
        has_stray_lt: bool,
    },
    CommentBody(String),
    /// `<!DOCTYPE ...>`. `full` is populated only when `preserveDtdStructure` is on; otherwise
    /// it carries just the name (§4.1).
    Doctype { name: String, full: Option<String> },
    Eof,
}

/// A token plus its starting position, or a carried error (§4.1: `nextToken()` is cumulative —
/// once an error token is produced, repeat calls return the same one).
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, position: Position) -> Self {
        Token { kind, position }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

/// The result a lexer step can produce: a token, or a sticky error.
pub type LexResult = Result<Token, LexError>;
