//! The `#if` constant-expression evaluator: infix tokens to RPN, then RPN
//! to a signed 32-bit integer, with C-like two's-complement semantics.
//!
//! Floating-point constant expressions are out of scope; `Number` tokens
//! are parsed as decimal or (with a `0x`/`0X` prefix) hexadecimal integers.

use crate::define::DefineTable;
use crate::expand::expand_at;
use preproc_lex::{Token, TokenKind, TokenStream};
use preproc_util::{Diagnostic, Handler};

const OPERATORS: &[&str] =
    &["+", "-", "/", "*", "!", "%", "==", "!=", ">", "<", ">=", "<=", "||", "&&"];

fn is_operator_text(text: &str) -> bool {
    OPERATORS.contains(&text)
}

fn is_operand(tok: &Token) -> bool {
    (!is_operator_text(&tok.text) && tok.kind == TokenKind::Identifier) || tok.kind == TokenKind::Number
}

fn is_left_paren(tok: &Token) -> bool {
    tok.kind == TokenKind::Open && tok.text == "("
}

fn is_right_paren(tok: &Token) -> bool {
    tok.kind == TokenKind::Close && tok.text == ")"
}

fn precedence(op: &str) -> i32 {
    match op {
        "!" => 7,
        "*" | "/" | "%" => 6,
        "+" | "-" => 5,
        "<" | "<=" | ">" | ">=" => 4,
        "==" | "!=" => 3,
        "&&" => 2,
        "||" => 1,
        _ => 0,
    }
}

fn is_left_assoc(op: &str) -> bool {
    op != "!"
}

/// Merges adjacent single-character tokens into two-character operators
/// (`=` `=` -> `==`, `&` `&` -> `&&`, ...). A pair that doesn't form a known
/// operator is left alone; the lexer never produces two-character operator
/// tokens itself since `!`, `<`, `=`, `&`, `|` etc. all fall through to
/// `Ignored` single-char tokens.
fn merge_operators(tokens: &[Token]) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if i + 1 < tokens.len() {
            let combined = format!("{}{}", tokens[i].text, tokens[i + 1].text);
            if is_operator_text(&combined) {
                out.push(Token::new(tokens[i].kind, combined));
                i += 2;
                continue;
            }
        }
        out.push(tokens[i].clone());
        i += 1;
    }
    out
}

/// Shunting-yard: infix token sequence to an RPN token sequence. Returns
/// `None` on mismatched parentheses or an unrecognized token (an error has
/// already been reported at that point).
fn to_rpn(tokens: &[Token], diags: &mut Handler, file: &str, line: u32) -> Option<Vec<Token>> {
    if tokens.is_empty() {
        let _ = diags.report(Diagnostic::message(file, line, "Empty expression."));
        return Some(Vec::new());
    }

    let merged = merge_operators(tokens);
    let mut output = Vec::new();
    let mut stack: Vec<Token> = Vec::new();

    for tok in &merged {
        if is_operand(tok) {
            output.push(tok.clone());
        } else if is_operator_text(&tok.text) {
            while let Some(top) = stack.last() {
                if !is_operator_text(&top.text) {
                    break;
                }
                let keep_popping = (is_left_assoc(&tok.text) && precedence(&tok.text) <= precedence(&top.text))
                    || (precedence(&tok.text) < precedence(&top.text));
                if !keep_popping {
                    break;
                }
                output.push(stack.pop().unwrap());
            }
            stack.push(tok.clone());
        } else if is_left_paren(tok) {
            stack.push(tok.clone());
        } else if is_right_paren(tok) {
            let mut found_left = false;
            while let Some(top) = stack.last() {
                if is_left_paren(top) {
                    found_left = true;
                    break;
                }
                output.push(stack.pop().unwrap());
            }
            if !found_left {
                let _ = diags.report(Diagnostic::error(file, line, "Mismatched parentheses."));
                return None;
            }
            stack.pop();
        } else {
            let _ = diags.report(Diagnostic::error(file, line, format!("Unknown token: {}", tok.text)));
            return None;
        }
    }

    while let Some(top) = stack.pop() {
        if is_left_paren(&top) || is_right_paren(&top) {
            let _ = diags.report(Diagnostic::error(file, line, "Mismatched parentheses."));
            return None;
        }
        output.push(top);
    }
    Some(output)
}

fn parse_int(text: &str) -> i32 {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return i32::from_str_radix(hex, 16).unwrap_or(0);
    }
    text.parse::<i32>().unwrap_or(0)
}

/// Evaluates a single identifier operand by expanding it once through the
/// define table, re-converting the result to RPN, and recursing. An
/// identifier with no entry in the table — or one whose body expands to
/// nothing — yields an "Empty expression" message and the value `0`,
/// matching the evaluator's handling of a vacuous sub-expression rather
/// than looping forever trying to re-expand an unchanged token.
fn eval_identifier(tok: &Token, table: &DefineTable, diags: &mut Handler, file: &str, line: u32) -> i32 {
    if !table.is_defined(&tok.text) {
        let _ = diags.report(Diagnostic::message(file, line, "Empty expression."));
        return 0;
    }
    let mut stream = TokenStream::from_vec(vec![tok.clone()]);
    expand_at(&mut stream, 0, table, diags, file, line);
    let expanded = stream.into_vec();
    if expanded.is_empty() {
        let _ = diags.report(Diagnostic::message(file, line, "Empty expression."));
        return 0;
    }
    let Some(rpn) = to_rpn(&expanded, diags, file, line) else {
        let _ = diags.report(Diagnostic::error(file, line, "Error while expanding macros."));
        return 0;
    };
    eval_rpn(rpn, table, diags, file, line)
}

/// Evaluates an RPN token sequence to a signed 32-bit integer, using
/// wrapping arithmetic to mirror C's two's-complement overflow behavior.
/// Division by zero is not guarded against — it panics, same as the
/// source material leaves it to the caller.
fn eval_rpn(mut rpn: Vec<Token>, table: &DefineTable, diags: &mut Handler, file: &str, line: u32) -> i32 {
    let mut stack: Vec<i32> = Vec::new();
    rpn.reverse();
    while let Some(tok) = rpn.pop() {
        if is_operand(&tok) {
            if tok.kind == TokenKind::Number {
                stack.push(parse_int(&tok.text));
            } else {
                stack.push(eval_identifier(&tok, table, diags, file, line));
            }
        } else if is_operator_text(&tok.text) {
            if tok.text == "!" {
                let Some(v) = stack.pop() else {
                    let _ = diags.report(Diagnostic::error(
                        file,
                        line,
                        "Syntax error in #if: no argument for ! operator.",
                    ));
                    return 0;
                };
                stack.push(if v == 0 { 1 } else { 0 });
            } else {
                if stack.len() < 2 {
                    let _ = diags.report(Diagnostic::error(
                        file,
                        line,
                        format!("Syntax error in #if: not enough arguments for {} operator.", tok.text),
                    ));
                    return 0;
                }
                let rhs = stack.pop().unwrap();
                let lhs = stack.pop().unwrap();
                let result = match tok.text.as_str() {
                    "*" => lhs.wrapping_mul(rhs),
                    "/" => lhs / rhs,
                    "%" => lhs % rhs,
                    "+" => lhs.wrapping_add(rhs),
                    "-" => lhs.wrapping_sub(rhs),
                    "<" => (lhs < rhs) as i32,
                    "<=" => (lhs <= rhs) as i32,
                    ">" => (lhs > rhs) as i32,
                    ">=" => (lhs >= rhs) as i32,
                    "==" => (lhs == rhs) as i32,
                    "!=" => (lhs != rhs) as i32,
                    "&&" => ((lhs != 0) && (rhs != 0)) as i32,
                    "||" => ((lhs != 0) || (rhs != 0)) as i32,
                    _ => unreachable!("exhaustive over OPERATORS"),
                };
                stack.push(result);
            }
        } else {
            let _ = diags.report(Diagnostic::error(file, line, format!("Internal error on token {}.", tok.text)));
            return 0;
        }
    }
    if stack.len() == 1 {
        stack[0]
    } else {
        let _ = diags.report(Diagnostic::error(file, line, "Invalid #if expression."));
        0
    }
}

/// Evaluates a `#if` condition's token sequence (the directive keyword
/// already stripped). Returns `true` iff the integer result is nonzero.
pub fn evaluate_if(tokens: &[Token], table: &DefineTable, diags: &mut Handler, file: &str, line: u32) -> bool {
    let Some(rpn) = to_rpn(tokens, diags, file, line) else {
        return false;
    };
    eval_rpn(rpn, table, diags, file, line) != 0
}
