//! Macro expansion (object-like and function-like) over a [`TokenStream`].

use crate::define::DefineTable;
use preproc_lex::{Token, TokenKind, TokenStream};
use preproc_util::{Diagnostic, Handler};

/// Locates the `Close` matching the `Open` at `open_pos`, tracking nested
/// depth across any bracket kind (the lexer does not distinguish `(`, `[`,
/// `{`). Returns `Err` with a diagnostic message if the stream runs out
/// before depth returns to zero.
pub(crate) fn find_matching_close(tokens: &[Token], open_pos: usize) -> Result<usize, String> {
    let mut depth = 0i32;
    let mut i = open_pos;
    while i < tokens.len() {
        match tokens[i].kind {
            TokenKind::Open => depth += 1,
            TokenKind::Close => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err("Mismatched braces while parsing statement.".to_string())
}

/// Splits a token slice on top-level commas (commas inside nested
/// brackets do not separate arguments). An empty slice yields zero
/// arguments, not one empty argument.
pub(crate) fn split_top_level_commas(tokens: &[Token]) -> Vec<Vec<Token>> {
    if tokens.is_empty() {
        return Vec::new();
    }
    let mut args = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0i32;
    for tok in tokens {
        match tok.kind {
            TokenKind::Open => {
                depth += 1;
                current.push(tok.clone());
            }
            TokenKind::Close => {
                depth -= 1;
                current.push(tok.clone());
            }
            TokenKind::Comma if depth == 0 => {
                args.push(std::mem::take(&mut current));
            }
            _ => current.push(tok.clone()),
        }
    }
    args.push(current);
    args
}

fn substitute_params(body: &[Token], params: &rustc_hash::FxHashMap<String, usize>, args: &[Vec<Token>]) -> Vec<Token> {
    let mut out = Vec::new();
    for tok in body {
        if let Some(&idx) = params.get(&tok.text) {
            out.extend(args[idx].iter().cloned());
        } else {
            out.push(tok.clone());
        }
    }
    out
}

/// Expands the identifier token at `at`, if it names a macro.
///
/// Returns the position the caller should resume walking from. On a
/// non-macro identifier this is simply `at + 1`. On a successful expansion
/// it is the position just before the inserted replacement text (or `0` if
/// the macro call was the very first token in the stream) — the walker's
/// next tick lands on that anchor and then advances onto the replacement,
/// so nested macro references in the replacement get a chance to expand
/// too (rescanning).
pub fn expand_at(
    stream: &mut TokenStream,
    at: usize,
    table: &DefineTable,
    diags: &mut Handler,
    file: &str,
    line: u32,
) -> usize {
    let name = stream.get(at).expect("caller checked bounds").text.clone();
    let Some(entry) = table.get(&name).cloned() else {
        return at + 1;
    };

    let pos = stream.erase(at);
    let anchor = pos.saturating_sub(1);

    if !entry.is_function_like() {
        stream.insert_many(pos, entry.body.iter().cloned());
        return anchor;
    }

    if stream.get(pos).map(|t| t.kind) != Some(TokenKind::Open) {
        let _ = diags.report(Diagnostic::error(
            file,
            line,
            format!("Expected argument list for macro '{name}'."),
        ));
        return anchor;
    }

    let close = match find_matching_close(stream.as_slice(), pos) {
        Ok(c) => c,
        Err(msg) => {
            let _ = diags.report(Diagnostic::error(file, line, msg));
            return anchor;
        }
    };

    let inner = stream.as_slice()[pos + 1..close].to_vec();
    let args = split_top_level_commas(&inner);

    if args.len() != entry.params.len() {
        let _ = diags.report(Diagnostic::error(
            file,
            line,
            format!(
                "Macro '{name}' expects {} argument(s), got {}.",
                entry.params.len(),
                args.len()
            ),
        ));
        stream.erase_range(pos..close + 1);
        return stream.len();
    }

    stream.erase_range(pos..close + 1);
    let substituted = substitute_params(&entry.body, &entry.params, &args);
    stream.insert_many(pos, substituted);
    anchor
}

/// Walks every identifier in `stream` to a fixed point, expanding macro
/// references (including ones revealed by a previous expansion). Used to
/// pre-resolve nested macro references inside a `#define` body at
/// definition time.
pub fn expand_all(stream: &mut TokenStream, table: &DefineTable, diags: &mut Handler, file: &str, line: u32) {
    let mut pos = 0usize;
    while pos < stream.len() {
        if stream.get(pos).map(|t| t.kind) == Some(TokenKind::Identifier) {
            pos = expand_at(stream, pos, table, diags, file, line);
        } else {
            pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::define::DefineEntry;

    fn tok(kind: TokenKind, text: &str) -> Token {
        Token::new(kind, text)
    }

    #[test]
    fn object_like_expansion_inserts_body() {
        let mut table = DefineTable::new();
        table.define("FOO", DefineEntry::object_like(vec![tok(TokenKind::Number, "7")]));
        let mut stream = TokenStream::from_vec(vec![tok(TokenKind::Identifier, "FOO")]);
        let mut buf = Vec::new();
        let mut diags = Handler::new(&mut buf);
        expand_at(&mut stream, 0, &table, &mut diags, "a.c", 1);
        assert_eq!(stream.as_slice(), &[tok(TokenKind::Number, "7")]);
    }

    #[test]
    fn function_like_substitutes_raw_arguments() {
        let mut table = DefineTable::new();
        let mut params = rustc_hash::FxHashMap::default();
        params.insert("x".to_string(), 0);
        table.define(
            "DOUBLE",
            DefineEntry::function_like(
                params,
                vec![tok(TokenKind::Identifier, "x"), tok(TokenKind::Identifier, "x")],
            ),
        );
        let mut stream = TokenStream::from_vec(vec![
            tok(TokenKind::Identifier, "DOUBLE"),
            tok(TokenKind::Open, "("),
            tok(TokenKind::Number, "3"),
            tok(TokenKind::Close, ")"),
        ]);
        let mut buf = Vec::new();
        let mut diags = Handler::new(&mut buf);
        expand_at(&mut stream, 0, &table, &mut diags, "a.c", 1);
        assert_eq!(
            stream.as_slice(),
            &[tok(TokenKind::Number, "3"), tok(TokenKind::Number, "3")]
        );
    }

    #[test]
    fn undefined_identifier_is_left_alone() {
        let table = DefineTable::new();
        let mut stream = TokenStream::from_vec(vec![tok(TokenKind::Identifier, "BAR")]);
        let mut buf = Vec::new();
        let mut diags = Handler::new(&mut buf);
        let next = expand_at(&mut stream, 0, &table, &mut diags, "a.c", 1);
        assert_eq!(next, 1);
        assert_eq!(stream.as_slice(), &[tok(TokenKind::Identifier, "BAR")]);
    }

    #[test]
    fn argument_count_mismatch_reports_error_and_stops() {
        let mut table = DefineTable::new();
        let mut params = rustc_hash::FxHashMap::default();
        params.insert("x".to_string(), 0);
        table.define("F", DefineEntry::function_like(params, vec![tok(TokenKind::Identifier, "x")]));
        let mut stream = TokenStream::from_vec(vec![
            tok(TokenKind::Identifier, "F"),
            tok(TokenKind::Open, "("),
            tok(TokenKind::Close, ")"),
        ]);
        let mut buf = Vec::new();
        let mut diags = Handler::new(&mut buf);
        let next = expand_at(&mut stream, 0, &table, &mut diags, "a.c", 1);
        assert_eq!(diags.error_count(), 1);
        assert_eq!(next, stream.len());
    }
}
