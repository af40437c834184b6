//! Pure token-level parsing for directive bodies, plus the end-of-directive
//! and conditional-skip scanners that need to mutate the token stream to
//! keep line counts intact. None of these know about file I/O or recursion
//! — that lives in [`crate::processor`], which calls these and drives the
//! per-file walk.

use crate::define::{DefineEntry, DefineTable};
use crate::expand::expand_all;
use preproc_lex::{Token, TokenKind, TokenStream};
use preproc_util::{Diagnostic, Handler};
use rustc_hash::FxHashMap;

/// Scans forward from `start` (the position of a `Preprocessor` token) to
/// the end of its logical line, rewriting `Backslash Newline` continuation
/// pairs into a single `Whitespace` token as it goes. Returns the directive
/// tokens (keyword included, terminating newline excluded) and the cursor
/// position to resume scanning from.
///
/// The original span is erased; one `Newline` token is reinserted right
/// after the resume position for every continuation consumed, so a
/// directive spanning N physical lines still costs the output N newlines.
pub fn collect_directive(stream: &mut TokenStream, start: usize) -> (Vec<Token>, usize, usize) {
    let mut i = start;
    let mut continuations = Vec::new();
    while i < stream.len() {
        if stream.get(i).unwrap().kind == TokenKind::Newline {
            let prev_is_backslash =
                i > start && stream.get(i - 1).map(|t| t.kind) == Some(TokenKind::Backslash);
            if !prev_is_backslash {
                break;
            }
            continuations.push(i);
        }
        i += 1;
    }
    let terminus = i.min(stream.len());
    for &idx in &continuations {
        stream.set(idx, Token::new(TokenKind::Whitespace, " "));
    }
    let directive_tokens = stream.as_slice()[start..terminus].to_vec();
    (directive_tokens, terminus, continuations.len())
}

/// Erases `[start, terminus)` and reinserts one `Newline` per continuation
/// consumed by [`collect_directive`], returning the resume cursor.
pub fn erase_directive(stream: &mut TokenStream, start: usize, terminus: usize, continuations: usize) -> usize {
    let resume = stream.erase_range(start..terminus);
    for _ in 0..continuations {
        stream.insert(resume, Token::newline());
    }
    resume
}

/// `#define name …`: the name, an optional parameter list, and a
/// definition-time-expanded replacement body.
pub fn parse_define(body: &[Token], table: &mut DefineTable, diags: &mut Handler, file: &str, line: u32) {
    if body.is_empty() {
        let _ = diags.report(Diagnostic::error(file, line, "Define directive without arguments."));
        return;
    }
    if body[0].kind != TokenKind::Identifier {
        let _ = diags.report(Diagnostic::error(file, line, "Define's name was not an identifier."));
        return;
    }
    let name = body[0].text.clone();
    let mut i = 1;
    while i < body.len() && matches!(body[i].kind, TokenKind::Backslash | TokenKind::Newline | TokenKind::Whitespace) {
        i += 1;
    }

    let mut params: FxHashMap<String, usize> = FxHashMap::default();
    let mut is_function_like = false;
    if i < body.len() && body[i].kind == TokenKind::Open && body[i].text == "(" {
        is_function_like = true;
        i += 1;
        let mut index = 0usize;
        while i < body.len() && body[i].text != ")" {
            if body[i].kind != TokenKind::Identifier {
                let _ = diags.report(Diagnostic::error(file, line, "Expected identifier."));
                return;
            }
            params.insert(body[i].text.clone(), index);
            i += 1;
            index += 1;
            if i < body.len() && body[i].text == "," {
                i += 1;
            }
        }
        if i < body.len() && body[i].text == ")" {
            i += 1;
        } else {
            let _ = diags.report(Diagnostic::error(file, line, "Unexpected end of line."));
            return;
        }
    }

    let mut replacement: Vec<Token> = body[i..].to_vec();
    for tok in replacement.iter_mut() {
        if tok.kind == TokenKind::Ignored && tok.text == "##" {
            tok.text.clear();
        }
    }
    let mut stream = TokenStream::from_vec(replacement);
    expand_all(&mut stream, table, diags, file, line);
    let body_tokens = stream.into_vec();

    let entry = if is_function_like {
        DefineEntry::function_like(params, body_tokens)
    } else {
        DefineEntry::object_like(body_tokens)
    };
    table.define(name, entry);
}

/// `#undef name`.
pub fn parse_undef(body: &[Token], table: &mut DefineTable, diags: &mut Handler, file: &str, line: u32) {
    if body.is_empty() {
        let _ = diags.report(Diagnostic::error(file, line, "Undef directive without arguments."));
        return;
    }
    if body.len() > 1 {
        let _ = diags.report(Diagnostic::error(file, line, "Undef directive with multiple arguments."));
    }
    table.undef(&body[0].text);
}

/// `#ifdef name` / `#ifnotdef name` / `#if`'s leading name-form argument:
/// a single token's text, erroring (but still returning it) if more follow.
pub fn parse_single_name(body: &[Token], diags: &mut Handler, file: &str, line: u32) -> Option<String> {
    if body.is_empty() {
        let _ = diags.report(Diagnostic::error(file, line, "Expected argument."));
        return None;
    }
    if body.len() > 1 {
        let _ = diags.report(Diagnostic::error(file, line, "Too many arguments."));
    }
    Some(body[0].text.clone())
}

/// `#include "file"` / `#include <file>`: reconstructs the literal argument
/// text by concatenating token texts, then strips the delimiting quote or
/// angle-bracket pair.
pub fn parse_include_target(body: &[Token], diags: &mut Handler, file: &str, line: u32) -> Option<String> {
    if body.is_empty() {
        let _ = diags.report(Diagnostic::error(file, line, "Expected argument."));
        return None;
    }
    let joined: String = body.iter().map(|t| t.text.as_str()).collect();
    if joined.len() < 2 {
        let _ = diags.report(Diagnostic::error(file, line, "Expected argument."));
        return None;
    }
    Some(joined[1..joined.len() - 1].to_string())
}

/// `#pragma name "text"`: the pragma name and its unquoted text (empty if
/// no text argument was given).
pub fn parse_pragma(body: &[Token], diags: &mut Handler, file: &str, line: u32) -> Option<(String, String)> {
    if body.is_empty() {
        let _ = diags.report(Diagnostic::error(file, line, "Pragmas need arguments."));
        return None;
    }
    let name = body[0].text.clone();
    let mut text = String::new();
    let mut i = 1;
    if i < body.len() {
        if body[i].kind != TokenKind::String {
            let _ = diags.report(Diagnostic::error(file, line, "Pragma parameter should be a string literal."));
        }
        let raw = &body[i].text;
        text = if raw.len() >= 2 { raw[1..raw.len() - 1].to_string() } else { String::new() };
        i += 1;
    }
    if i < body.len() {
        let _ = diags.report(Diagnostic::error(file, line, "Too many parameters to pragma."));
    }
    Some((name, text))
}

/// `#message`/`#warning`/`#error`: the remaining tokens' text, space-joined.
pub fn parse_text_line(body: &[Token]) -> String {
    body.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" ")
}

/// Scans from `start` (just past a removed `#if`/`#ifdef`/`#ifnotdef`
/// directive) to the matching `#endif`, respecting nesting. Returns the
/// number of `Newline` tokens spanned and the index just past the matched
/// `#endif`, or `None` if end of stream was reached first.
pub fn find_conditional_end(stream: &TokenStream, start: usize) -> Option<(u32, usize)> {
    let mut i = start;
    let mut depth = 0i32;
    let mut newlines = 0u32;
    while i < stream.len() {
        let tok = stream.get(i).unwrap();
        match tok.kind {
            TokenKind::Newline => newlines += 1,
            TokenKind::Preprocessor => match tok.text.as_str() {
                "#endif" if depth == 0 => return Some((newlines, i + 1)),
                "#ifdef" | "#ifndef" | "#if" => depth += 1,
                "#endif" => depth -= 1,
                _ => {}
            },
            _ => {}
        }
        i += 1;
    }
    None
}
