//! Lexical scanning and token-stream storage for the textual preprocessor.
//!
//! This crate owns the boundary between raw source text and the token
//! representation the rest of the pipeline operates on: [`lexer::lex`] turns
//! a source string into a flat `Vec<Token>`, and [`stream::TokenStream`]
//! gives the directive processor and macro expander a mutable, cursor-walked
//! view over that vector.

pub mod cursor;
pub mod lexer;
pub mod stream;
pub mod token;

pub use lexer::lex;
pub use stream::TokenStream;
pub use token::{Token, TokenKind};
