//! A mutable, indexable run of tokens.
//!
//! The directive processor and macro expander repeatedly erase a directive
//! or macro invocation and splice in replacement tokens while walking the
//! stream left to right with a single cursor. A `Vec<Token>` plus a `usize`
//! index satisfies that access pattern directly: every mutation this crate
//! performs happens at or after the walker's current position, so earlier
//! indices — including any anchor position saved before a mutation — stay
//! valid across it. This is the "array with gap-buffer semantics" substitute
//! for a doubly linked list.

use crate::token::Token;
use std::ops::Range;

#[derive(Clone, Debug, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    pub fn from_vec(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn into_vec(self) -> Vec<Token> {
        self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, at: usize) -> Option<&Token> {
        self.tokens.get(at)
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    /// Inserts a single token before position `at`.
    pub fn insert(&mut self, at: usize, token: Token) {
        self.tokens.insert(at, token);
    }

    /// Inserts a run of tokens before position `at`, preserving their order.
    pub fn insert_many(&mut self, at: usize, tokens: impl IntoIterator<Item = Token>) {
        let rest = self.tokens.split_off(at);
        self.tokens.extend(tokens);
        self.tokens.extend(rest);
    }

    /// Overwrites the token at `at` in place, without shifting anything.
    pub fn set(&mut self, at: usize, token: Token) {
        self.tokens[at] = token;
    }

    /// Removes the token at `at`. Returns `at` (the index now holding
    /// whatever followed the removed token, or `len()` if it was the last).
    pub fn erase(&mut self, at: usize) -> usize {
        self.tokens.remove(at);
        at
    }

    /// Removes `range`. Returns `range.start` (the index now holding
    /// whatever followed the erased span).
    pub fn erase_range(&mut self, range: Range<usize>) -> usize {
        self.tokens.drain(range.clone());
        range.start
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }
}
