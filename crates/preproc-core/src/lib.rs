//! Macro table, expansion, constant-expression evaluation, directive
//! parsing, line-number translation, and the orchestrator that ties them
//! into a working textual preprocessor over token streams from
//! `preproc-lex`.

pub mod capability;
pub mod define;
pub mod directive;
pub mod eval;
pub mod expand;
pub mod processor;
pub mod translator;

pub use capability::{FileLoader, FsFileLoader, IdentityIncludeTranslator, IncludeTranslator, PragmaCallback, PragmaInstance};
pub use define::{DefineEntry, DefineTable};
pub use eval::evaluate_if;
pub use processor::{PreprocessReport, Preprocessor};
pub use translator::{LineNumberTranslator, TranslatorEntry};
