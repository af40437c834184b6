//! The macro definition table (one entry per `#define`d name).

use preproc_lex::{Token, TokenKind};
use rustc_hash::FxHashMap;

/// A single macro definition.
///
/// `params` maps a parameter name to its zero-based position among the
/// macro's arguments. An empty `params` map means the macro is object-like;
/// a function-like macro defined with zero parameters (`#define F() ...`)
/// collapses to the same object-like behavior, matching the rest of this
/// crate's treatment of whitespace as insignificant once tokens are lexed.
#[derive(Clone, Debug, Default)]
pub struct DefineEntry {
    pub params: FxHashMap<String, usize>,
    pub body: Vec<Token>,
}

impl DefineEntry {
    pub fn object_like(body: Vec<Token>) -> Self {
        Self { params: FxHashMap::default(), body }
    }

    pub fn function_like(params: FxHashMap<String, usize>, body: Vec<Token>) -> Self {
        Self { params, body }
    }

    pub fn is_function_like(&self) -> bool {
        !self.params.is_empty()
    }
}

/// Mapping from macro name to [`DefineEntry`].
///
/// `__LINE__` and `__FILE__` live in here like any other object-like macro;
/// [`DefineTable::set_line_macro`]/[`DefineTable::set_file_macro`] just
/// re-`define` them whenever the directive processor's notion of current
/// line or file changes.
#[derive(Clone, Debug, Default)]
pub struct DefineTable {
    entries: FxHashMap<String, DefineEntry>,
}

impl DefineTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: impl Into<String>, entry: DefineEntry) {
        self.entries.insert(name.into(), entry);
    }

    pub fn undef(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    pub fn undef_all(&mut self) {
        self.entries.clear();
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&DefineEntry> {
        self.entries.get(name)
    }

    pub fn set_line_macro(&mut self, line: u32) {
        self.define(
            "__LINE__",
            DefineEntry::object_like(vec![Token::new(TokenKind::Number, line.to_string())]),
        );
    }

    pub fn set_file_macro(&mut self, file: &str) {
        self.define(
            "__FILE__",
            DefineEntry::object_like(vec![Token::new(TokenKind::String, format!("\"{file}\""))]),
        );
    }
}
