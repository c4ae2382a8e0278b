//! Markup lexer: a character cursor that turns markup text into [`Token`]s (§4.1).
//!
//! One [`Lexer`] instance is built for exactly one dialect ([`Dialect::Xml`] or
//! [`Dialect::Html`]) and is driven by repeated calls to [`Lexer::next_token`]. Internally the
//! lexer tracks a single boolean, `in_tag`, that stands in for the spec's `vFlag` — whether the
//! last delimiter seen was `<` (we are scanning inside an element/PI, i.e. markup mode) or `>`
//! (we are scanning element content, i.e. text mode). Once an error is produced, the same error
//! is returned on every subsequent call so parser loops cannot recursively escalate.

use crate::error::LexError;
use crate::position::Position;
use crate::token::{LexResult, Token, TokenKind};
use crate::tree::Mode as Dialect;
use log::trace;

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    position: Position,
    dialect: Dialect,
    preserve_space: bool,
    preserve_dtd_structure: bool,
    in_tag: bool,
    sticky_error: Option<LexError>,
}

fn is_name_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_name_continue(ch: char, dialect: Dialect) -> bool {
    if ch.is_alphanumeric() || ch == '.' || ch == '-' || ch == '_' {
        return true;
    }
    matches!(dialect, Dialect::Html) && ch == ':'
}

impl Lexer {
    pub fn new(input: &str, dialect: Dialect, preserve_space: bool, preserve_dtd_structure: bool) -> Self {
        Lexer {
            chars: input.chars().collect(),
            pos: 0,
            position: Position::START,
            dialect,
            preserve_space,
            preserve_dtd_structure,
            in_tag: false,
            sticky_error: None,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        self.position.advance(ch);
        Some(ch)
    }

    fn skip_bytes(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    /// Entry point: returns the next token, or the sticky error from a previous call.
    pub fn next_token(&mut self) -> LexResult {
        if let Some(e) = &self.sticky_error {
            return Err(e.clone());
        }
        let result = if self.in_tag {
            self.scan_tag_mode()
        } else {
            self.scan_text_mode()
        };
        match &result {
            Ok(token) => trace!("{:?} lexed {:?} at {}", self.dialect, token.kind, token.position),
            Err(e) => {
                trace!("{:?} lex error at {}: {e}", self.dialect, self.position);
                self.sticky_error = Some(e.clone());
            }
        }
        result
    }

    // --- text mode -------------------------------------------------------

    fn html_markup_starts_here(&self) -> bool {
        if self.peek() != Some('<') {
            return false;
        }
        match self.peek_at(1) {
            Some(c) if c.is_alphabetic() || c == '/' || c == '?' => true,
            _ => self.starts_with("<!--") || self.starts_with("<![CDATA["),
        }
    }

    fn xml_markup_starts_here(&self) -> bool {
        self.peek() == Some('<')
    }

    fn scan_text_mode(&mut self) -> LexResult {
        let start = self.position;
        let mut buf = String::new();
        let mut has_entity = false;
        let mut has_stray_lt = false;
        loop {
            match self.peek() {
                None => break,
                Some('<') => {
                    let markup_here = match self.dialect {
                        Dialect::Xml => self.xml_markup_starts_here(),
                        Dialect::Html => self.html_markup_starts_here(),
                    };
                    if markup_here {
                        break;
                    }
                    // HTML tolerance: a stray '<' not starting recognized markup is literal text.
                    has_stray_lt = true;
                    buf.push(self.advance().unwrap());
                }
                Some(ch) => {
                    if ch == '&' {
                        has_entity = true;
                    }
                    buf.push(ch);
                    self.advance();
                }
            }
        }

        if buf.is_empty() {
            if self.peek().is_none() {
                return Ok(Token::new(TokenKind::Eof, start));
            }
            return self.scan_markup_start();
        }

        if !self.preserve_space && buf.trim().is_empty() {
            // Whitespace-only run and preserveSpace is off: skip it and continue.
            return self.next_token_uncached();
        }

        Ok(Token::new(
            TokenKind::Text {
                value: buf,
                is_cdata: false,
                has_entity,
                has_stray_lt,
            },
            start,
        ))
    }

    /// Like `next_token` but bypasses the sticky-error short circuit; used internally when a
    /// whitespace-only run was dropped and we need to keep scanning for the real next token.
    fn next_token_uncached(&mut self) -> LexResult {
        if self.in_tag {
            self.scan_tag_mode()
        } else {
            self.scan_text_mode()
        }
    }

    /// Called with the cursor sitting on `<`; decides whether this opens a comment, CDATA,
    /// doctype, or an element/PI/closing tag.
    fn scan_markup_start(&mut self) -> LexResult {
        let start = self.position;
        if self.starts_with("<!--") {
            return self.scan_comment(start);
        }
        if self.starts_with("<![CDATA[") {
            return self.scan_cdata(start);
        }
        if self.starts_with("<!DOCTYPE") {
            return self.scan_doctype(start);
        }
        if self.starts_with("<!") {
            return Err(LexError::MalformedDtd(start));
        }
        // Otherwise: element open/close or PI. Emit `<` and switch to tag mode.
        self.advance();
        self.in_tag = true;
        Ok(Token::new(TokenKind::Lt, start))
    }

    fn scan_comment(&mut self, start: Position) -> LexResult {
        self.skip_bytes(4); // "<!--"
        let mut buf = String::new();
        loop {
            if self.starts_with("-->") {
                self.skip_bytes(3);
                return Ok(Token::new(TokenKind::CommentBody(buf), start));
            }
            match self.advance() {
                Some(ch) => buf.push(ch),
                None => return Err(LexError::UnterminatedComment(start)),
            }
        }
    }

    fn scan_cdata(&mut self, start: Position) -> LexResult {
        self.skip_bytes(9); // "<![CDATA["
        let mut buf = String::new();
        loop {
            if self.starts_with("]]>") {
                self.skip_bytes(3);
                return Ok(Token::new(
                    TokenKind::Text {
                        value: buf,
                        is_cdata: true,
                        has_entity: false,
                        has_stray_lt: false,
                    },
                    start,
                ));
            }
            match self.advance() {
                Some(ch) => buf.push(ch),
                None => return Err(LexError::UnterminatedCdata(start)),
            }
        }
    }

    fn scan_doctype(&mut self, start: Position) -> LexResult {
        self.skip_bytes(2); // "<!"
        let mut full = String::from("!");
        // consume "DOCTYPE"
        for _ in 0.."DOCTYPE".len() {
            match self.advance() {
                Some(ch) => full.push(ch),
                None => return Err(LexError::MalformedDtd(start)),
            }
        }
        self.skip_ws_into(&mut full);
        let name = self.scan_raw_name(&mut full)?;
        if name.is_empty() {
            return Err(LexError::MalformedDtd(start));
        }
        // Scan the rest: external id / internal subset, up to the closing '>'.
        loop {
            match self.peek() {
                None => return Err(LexError::MalformedDtd(start)),
                Some('>') => {
                    self.advance();
                    break;
                }
                Some('[') => {
                    full.push(self.advance().unwrap());
                    self.scan_int_subset(&mut full, start)?;
                }
                Some('"') | Some('\'') => self.scan_quoted_raw(&mut full, start)?,
                Some(_) => full.push(self.advance().unwrap()),
            }
        }
        Ok(Token::new(
            TokenKind::Doctype {
                name,
                full: if self.preserve_dtd_structure {
                    Some(full)
                } else {
                    None
                },
            },
            start,
        ))
    }

    /// Copies a quoted literal (including its quotes) verbatim into `buf`, used while scanning
    /// doctype tails so an embedded `>` inside a quoted default value doesn't end the doctype.
    fn scan_quoted_raw(&mut self, buf: &mut String, start: Position) -> Result<(), LexError> {
        let quote = self.advance().unwrap();
        buf.push(quote);
        loop {
            match self.advance() {
                None => return Err(LexError::MalformedDtd(start)),
                Some(ch) if ch == quote => {
                    buf.push(ch);
                    return Ok(());
                }
                Some(ch) => buf.push(ch),
            }
        }
    }

    /// Scans the internal DTD subset after the opening `[`, structurally balancing nested `[`/`]`
    /// and quoted literals. This is not a full declaration grammar — it treats `<!ELEMENT`,
    /// `<!ATTLIST`, `<!ENTITY`, `<!NOTATION`, PIs, comments, and `%name;` parameter-entity
    /// references all as opaque characters — but it is enough to find the matching `]` even when
    /// a declaration's content model contains nested parentheses or a default value contains `>`.
    fn scan_int_subset(&mut self, buf: &mut String, start: Position) -> Result<(), LexError> {
        let mut depth = 1i32;
        while depth > 0 {
            match self.peek() {
                None => return Err(LexError::MalformedDtd(start)),
                Some('[') => {
                    depth += 1;
                    buf.push(self.advance().unwrap());
                }
                Some(']') => {
                    depth -= 1;
                    buf.push(self.advance().unwrap());
                }
                Some('"') | Some('\'') => self.scan_quoted_raw(buf, start)?,
                Some(_) => {
                    buf.push(self.advance().unwrap());
                }
            }
        }
        Ok(())
    }

    fn skip_ws_into(&mut self, buf: &mut String) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            buf.push(self.advance().unwrap());
        }
    }

    fn scan_raw_name(&mut self, buf: &mut String) -> Result<String, LexError> {
        let mut name = String::new();
        while matches!(self.peek(), Some(c) if is_name_start(c) || is_name_continue(c, self.dialect))
        {
            let ch = self.advance().unwrap();
            buf.push(ch);
            name.push(ch);
        }
        Ok(name)
    }

    // --- tag mode ----------------------------------------------------------

    fn scan_tag_mode(&mut self) -> LexResult {
        self.skip_whitespace();
        let start = self.position;
        match self.peek() {
            None => Ok(Token::new(TokenKind::Eof, start)),
            Some('>') => {
                self.advance();
                self.in_tag = false;
                Ok(Token::new(TokenKind::Gt, start))
            }
            Some('/') => {
                self.advance();
                Ok(Token::new(TokenKind::Slash, start))
            }
            Some('?') => {
                self.advance();
                Ok(Token::new(TokenKind::Question, start))
            }
            Some('=') => {
                self.advance();
                Ok(Token::new(TokenKind::Equals, start))
            }
            Some(':') => {
                self.advance();
                Ok(Token::new(TokenKind::Colon, start))
            }
            Some('"') | Some('\'') => self.scan_quoted_string(start),
            Some(c) if c.is_ascii_digit() => self.scan_number(start),
            Some(c) if is_name_start(c) => self.scan_name(start),
            Some(ch) => Err(LexError::UnknownCharacter {
                position: start,
                ch,
            }),
        }
    }

    fn scan_quoted_string(&mut self, start: Position) -> LexResult {
        let quote = self.advance().unwrap();
        let mut buf = String::new();
        loop {
            match self.advance() {
                None => return Err(LexError::UnterminatedString(start)),
                Some(ch) if ch == quote => {
                    return Ok(Token::new(TokenKind::QuotedString(buf), start));
                }
                Some(ch) => buf.push(ch),
            }
        }
    }

    fn scan_number(&mut self, start: Position) -> LexResult {
        let mut buf = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            buf.push(self.advance().unwrap());
        }
        if self.peek() == Some('.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
            buf.push(self.advance().unwrap());
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                buf.push(self.advance().unwrap());
            }
        }
        Ok(Token::new(TokenKind::Number(buf), start))
    }

    fn scan_name(&mut self, start: Position) -> LexResult {
        let mut buf = String::new();
        while matches!(self.peek(), Some(c) if is_name_start(c) || is_name_continue(c, self.dialect))
        {
            buf.push(self.advance().unwrap());
        }
        Ok(Token::new(TokenKind::Name(buf), start))
    }

    // --- script body (HTML only) --------------------------------------------

    /// Scans raw content until the literal sequence `</` is found, without consuming it, and
    /// returns it as a single text lexeme. Used by the HTML parser after `<script ...>` to
    /// capture the element body opaquely (§4.2). Matches the observed non-HTML5-conformant
    /// behavior of stopping at the first `</` even inside a script string literal (§9.2).
    pub fn create_synthetic_token(&mut self, delimiter: &str) -> LexResult {
        debug_assert!(!self.in_tag);
        let start = self.position;
        let mut buf = String::new();
        loop {
            if self.starts_with(delimiter) || self.peek().is_none() {
                break;
            }
            buf.push(self.advance().unwrap());
        }
        Ok(Token::new(
            TokenKind::Text {
                value: buf,
                is_cdata: false,
                has_entity: false,
                has_stray_lt: false,
            },
            start,
        ))
    }

    /// Scans a processing instruction's free-form data up to (and consuming) `?>`. Unlike
    /// comments/CDATA/doctype this is driven explicitly by the parser once it has already
    /// consumed `<?` and the target name, since only the *target* is a structured lexeme — the
    /// data that follows is arbitrary text (§4.1, §3.1 "ProcessingInstruction (target + value)").
    pub fn scan_pi_data(&mut self) -> LexResult {
        let start = self.position;
        let mut buf = String::new();
        loop {
            if self.starts_with("?>") {
                self.skip_bytes(2);
                self.in_tag = false;
                break;
            }
            match self.advance() {
                Some(ch) => buf.push(ch),
                None => {
                    self.in_tag = false;
                    break;
                }
            }
        }
        Ok(Token::new(
            TokenKind::Text {
                value: buf,
                is_cdata: false,
                has_entity: false,
                has_stray_lt: false,
            },
            start,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tokenize(input: &str, dialect: Dialect) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(input, dialect, true, false);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().expect("unexpected lex error");
            let done = matches!(tok.kind, TokenKind::Eof);
            out.push(tok.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn xml_prefixed_name_splits_into_colon_token() {
        let tokens = tokenize("<a:b/>", Dialect::Xml);
        assert_eq!(
            tokens,
            vec![
                TokenKind::Lt,
                TokenKind::Name("a".into()),
                TokenKind::Colon,
                TokenKind::Name("b".into()),
                TokenKind::Slash,
                TokenKind::Gt,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn html_embedded_colon_stays_one_name() {
        let tokens = tokenize("<svg:rect/>", Dialect::Html);
        assert!(matches!(&tokens[1], TokenKind::Name(n) if n == "svg:rect"));
    }

    #[rstest]
    #[case("<!--hi-->", "hi")]
    #[case("<!---->", "")]
    fn comments_are_captured_verbatim(#[case] input: &str, #[case] expected: &str) {
        let tokens = tokenize(input, Dialect::Xml);
        assert_eq!(tokens[0], TokenKind::CommentBody(expected.to_string()));
    }

    #[test]
    fn unterminated_comment_is_sticky() {
        let mut lexer = Lexer::new("<!-- never closed", Dialect::Xml, true, false);
        let first = lexer.next_token();
        let second = lexer.next_token();
        assert!(first.is_err());
        assert_eq!(first.unwrap_err(), second.unwrap_err());
    }

    #[test]
    fn doctype_default_drops_full_text() {
        let tokens = tokenize("<!DOCTYPE html>", Dialect::Xml);
        match &tokens[0] {
            TokenKind::Doctype { name, full } => {
                assert_eq!(name, "html");
                assert!(full.is_none());
            }
            other => panic!("expected a Doctype token, got {other:?}"),
        }
    }
}
