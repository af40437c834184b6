//! The preprocessor's lexical scanner.
//!
//! Classification follows a small trivial-character table plus a handful of
//! multi-character productions (identifiers, numbers, strings, comments,
//! directive lines). It does not know about C keywords, operators, or
//! expression grammar — those live above the lexer, in the define table and
//! expression evaluator, which classify identifier text themselves.

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

/// Scans `source` into a flat token stream.
///
/// Whitespace and comment tokens are never returned: they exist only as
/// intermediate productions inside the scanner, matching the source
/// material's own `Lex()`, which discards them before handing tokens to the
/// rest of the pipeline. Block comments that span multiple lines still
/// contribute one `Newline` token per embedded line break, so line counts
/// downstream are unaffected by comment stripping.
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

struct Lexer<'a> {
    cursor: Cursor<'a>,
    pending: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self { cursor: Cursor::new(source), pending: Vec::new() }
    }

    fn tokenize(mut self) -> Vec<Token> {
        let mut out = Vec::new();
        while let Some(tok) = self.next_token() {
            if matches!(tok.kind, TokenKind::Whitespace | TokenKind::Comment) {
                continue;
            }
            out.push(tok);
        }
        out
    }

    fn next_token(&mut self) -> Option<Token> {
        if let Some(tok) = self.pending.pop() {
            return Some(tok);
        }
        if self.cursor.is_at_end() {
            return None;
        }
        Some(self.scan_one())
    }

    fn scan_one(&mut self) -> Token {
        let c = self.cursor.current_char();
        match c {
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semicolon),
            '(' | '[' | '{' => self.single(TokenKind::Open),
            ')' | ']' | '}' => self.single(TokenKind::Close),
            '\n' => self.single(TokenKind::Newline),
            '\\' => self.single(TokenKind::Backslash),
            ' ' | '\t' | '\r' => self.scan_whitespace(),
            '#' => self.scan_preprocessor(),
            '"' | '\'' => self.scan_string(c),
            '/' => self.scan_slash(),
            _ if is_identifier_start(c) => self.scan_identifier(),
            _ if c.is_ascii_digit() => self.scan_number(),
            _ => self.single(TokenKind::Ignored),
        }
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.cursor.position();
        self.cursor.advance();
        Token::new(kind, self.cursor.slice_from(start))
    }

    fn scan_whitespace(&mut self) -> Token {
        let start = self.cursor.position();
        while matches!(self.cursor.current_char(), ' ' | '\t' | '\r') {
            self.cursor.advance();
        }
        Token::new(TokenKind::Whitespace, self.cursor.slice_from(start))
    }

    /// `#` starts a directive line; `##` is the token-paste marker, lexed as
    /// a standalone `Ignored` token carrying the literal text `"##"` so the
    /// macro expander can recognize and drop it. Anything else starting with
    /// `#` skips following spaces/tabs and folds an optional identifier into
    /// the same token, so `#   define` and `#define` both lex to a single
    /// `Preprocessor` token with text `"#define"`.
    fn scan_preprocessor(&mut self) -> Token {
        let start = self.cursor.position();
        self.cursor.advance();
        if self.cursor.current_char() == '#' {
            self.cursor.advance();
            return Token::new(TokenKind::Ignored, self.cursor.slice_from(start));
        }
        while matches!(self.cursor.current_char(), ' ' | '\t') {
            self.cursor.advance();
        }
        let hash_text = &self.cursor.slice_from(start)[..1];
        if is_identifier_start(self.cursor.current_char()) {
            let word_start = self.cursor.position();
            self.cursor.advance();
            while is_identifier_body(self.cursor.current_char()) {
                self.cursor.advance();
            }
            let text = format!("{hash_text}{}", self.cursor.slice_from(word_start));
            return Token::new(TokenKind::Preprocessor, text);
        }
        Token::new(TokenKind::Preprocessor, hash_text.to_string())
    }

    /// String and character literals are lexed identically: both quote kinds
    /// produce a `String` token, backslash escapes are passed through
    /// verbatim without interpretation, and an unterminated literal simply
    /// runs to end of input.
    fn scan_string(&mut self, quote: char) -> Token {
        let start = self.cursor.position();
        self.cursor.advance();
        loop {
            match self.cursor.current_char() {
                '\0' => break,
                '\\' => {
                    self.cursor.advance();
                    if self.cursor.current_char() != '\0' {
                        self.cursor.advance();
                    }
                }
                c if c == quote => {
                    self.cursor.advance();
                    break;
                }
                _ => {
                    self.cursor.advance();
                }
            }
        }
        Token::new(TokenKind::String, self.cursor.slice_from(start))
    }

    fn scan_slash(&mut self) -> Token {
        match self.cursor.peek_char(1) {
            '*' => self.scan_block_comment(),
            '/' => self.scan_line_comment(),
            _ => self.single(TokenKind::Ignored),
        }
    }

    fn scan_line_comment(&mut self) -> Token {
        let start = self.cursor.position();
        self.cursor.advance();
        self.cursor.advance();
        while self.cursor.current_char() != '\n' && !self.cursor.is_at_end() {
            self.cursor.advance();
        }
        Token::new(TokenKind::Comment, self.cursor.slice_from(start))
    }

    /// Internal newlines are preserved: each one is queued as a synthetic
    /// `Newline` token to be emitted right after the comment is dropped, so
    /// a multi-line block comment costs nothing in output line count.
    fn scan_block_comment(&mut self) -> Token {
        let start = self.cursor.position();
        self.cursor.advance();
        self.cursor.advance();
        let mut newlines = 0usize;
        loop {
            if self.cursor.is_at_end() {
                break;
            }
            if self.cursor.current_char() == '*' && self.cursor.peek_char(1) == '/' {
                self.cursor.advance();
                self.cursor.advance();
                break;
            }
            if self.cursor.current_char() == '\n' {
                newlines += 1;
            }
            self.cursor.advance();
        }
        for _ in 0..newlines {
            self.pending.push(Token::newline());
        }
        Token::new(TokenKind::Comment, self.cursor.slice_from(start))
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.cursor.position();
        self.cursor.advance();
        while is_identifier_body(self.cursor.current_char()) {
            self.cursor.advance();
        }
        Token::new(TokenKind::Identifier, self.cursor.slice_from(start))
    }

    /// `123`, `3.14`, `3.14f` and `0x1F` are all recognized: a `.` switches
    /// to floating-point continuation, an `x`/`X` right after a leading `0`
    /// switches to hex digits.
    fn scan_number(&mut self) -> Token {
        let start = self.cursor.position();
        self.cursor.advance();
        if self.cursor.current_char().eq_ignore_ascii_case(&'x') {
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_hexdigit() {
                self.cursor.advance();
            }
            return Token::new(TokenKind::Number, self.cursor.slice_from(start));
        }
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }
        if self.cursor.current_char() == '.' {
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
            if matches!(self.cursor.current_char(), 'f' | 'F') {
                self.cursor.advance();
            }
        }
        Token::new(TokenKind::Number, self.cursor.slice_from(start))
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_identifier_body(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}
