//! Token kinds produced by the lexer.

use std::fmt;

/// The classification of a single lexical unit.
///
/// Variants deliberately stay coarse: the directive processor and macro
/// expander re-derive anything finer (keyword-ness, operator identity) from
/// the token's text on demand, the same way the source material this crate
/// is modeled on keeps its trivial-character table separate from the token
/// enum itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    Comma,
    Semicolon,
    Open,
    Close,
    Preprocessor,
    Newline,
    Whitespace,
    Comment,
    Backslash,
    Ignored,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Comma => "comma",
            TokenKind::Semicolon => "semicolon",
            TokenKind::Open => "open",
            TokenKind::Close => "close",
            TokenKind::Preprocessor => "preprocessor",
            TokenKind::Newline => "newline",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Comment => "comment",
            TokenKind::Backslash => "backslash",
            TokenKind::Ignored => "ignored",
        };
        f.write_str(name)
    }
}

/// A single lexical unit: a kind plus the literal text it was built from.
///
/// Text is the token's full value as it should appear in output — for a
/// string literal this includes the surrounding quotes, for a number its
/// full digit sequence, for an identifier its spelling. `#define`/`#if`/etc
/// directive keyword tokens carry their text with the leading `#` included.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into() }
    }

    pub fn newline() -> Self {
        Token::new(TokenKind::Newline, "\n")
    }

    pub fn is_kind(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
