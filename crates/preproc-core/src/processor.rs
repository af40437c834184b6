//! The orchestrator (C8/C6): lexes a root file, walks its token stream
//! dispatching every directive kind, recurses into `#include`s, and hands
//! the survivors back as finished output. Everything else in this crate is
//! a pure helper the walk below calls into.

use crate::capability::{FileLoader, FsFileLoader, IdentityIncludeTranslator, IncludeTranslator, PragmaCallback, PragmaInstance};
use crate::define::{DefineEntry, DefineTable};
use crate::directive::{
    collect_directive, erase_directive, find_conditional_end, parse_define, parse_include_target, parse_pragma,
    parse_single_name, parse_text_line, parse_undef,
};
use crate::expand::expand_at;
use crate::translator::LineNumberTranslator;
use indexmap::IndexSet;
use preproc_lex::{Token, TokenKind, TokenStream};
use preproc_util::{Diagnostic, Handler};
use std::io::{self, Write};

/// Splits a path into its directory (including the trailing separator, or
/// `"./"` if there was none) and its file name.
fn split_root(path: &str) -> (String, String) {
    match path.rfind(['/', '\\']) {
        Some(pos) => (path[..=pos].to_string(), path[pos + 1..].to_string()),
        None => ("./".to_string(), path.to_string()),
    }
}

/// Joins an `#include` target against the directory of the file that
/// contains it. A target found at the start of `base` (`pos == 0`, i.e. an
/// absolute-looking path) or with no separator at all is returned verbatim.
fn join_relative(base: &str, target: &str) -> String {
    if let Some(pos) = base.rfind('/') {
        if pos > 0 {
            return format!("{}{}", &base[..=pos], target);
        }
    }
    target.to_string()
}

/// Renders a finished token run back to text. Consecutive `Identifier`/
/// `Number` tokens get a separating space (`int` `x` must not fuse into
/// `intx`); every other token kind is written with no padding, since
/// punctuation and string literals are unambiguous butted up against
/// their neighbors.
fn write_tokens(tokens: &[Token], out: &mut dyn Write) -> io::Result<()> {
    let mut need_space = false;
    for tok in tokens {
        if matches!(tok.kind, TokenKind::Identifier | TokenKind::Number) {
            if need_space {
                write!(out, " ")?;
            }
            need_space = true;
        } else {
            need_space = false;
        }
        write!(out, "{}", tok.text)?;
    }
    Ok(())
}

/// The subset of a [`Preprocess`](Preprocessor::preprocess) call's state
/// that only makes sense while a run is in flight: the working define
/// table, the output-line counters, and everything a `#include` needs to
/// recurse into a child file and come back.
struct Context<'a> {
    table: DefineTable,
    translator: LineNumberTranslator,
    root_file: String,
    root_path: String,
    current_file: String,
    current_line: u32,
    lines_this_file: u32,
    file_dependencies: IndexSet<String>,
    files_preprocessed: IndexSet<String>,
    pragmas: Vec<(String, String)>,
    skip_pragmas: bool,
    loader: &'a dyn FileLoader,
    include_translator: &'a dyn IncludeTranslator,
    pragma_callback: Option<&'a mut dyn PragmaCallback>,
    diags: Handler<'a>,
}

impl<'a> Context<'a> {
    /// The line-number translator spells the root file's own name bare
    /// (no directory prefix) but every other file, including an `#include`
    /// target, with `root_path` prepended.
    fn prepend_root_path(&self, filename: &str) -> String {
        if filename == self.root_file {
            self.root_file.clone()
        } else {
            format!("{}{}", self.root_path, filename)
        }
    }

    /// `files_preprocessed` records every file's path with `root_path`
    /// prepended unconditionally, root file included — unlike
    /// [`prepend_root_path`](Self::prepend_root_path), which leaves the
    /// root file's name bare.
    fn current_file_root(&self) -> String {
        format!("{}{}", self.root_path, self.current_file)
    }

    /// Lexes `filename` and walks its tokens to completion, recursing into
    /// any `#include` it contains. Returns the surviving tokens (directives
    /// erased, macros expanded) ready to be spliced into a parent or
    /// written out at the top level.
    fn process_file(&mut self, filename: String) -> Vec<Token> {
        log::debug!("entering file {}{}", self.root_path, filename);

        let saved_file = std::mem::replace(&mut self.current_file, filename.clone());
        let saved_lines_this_file = self.lines_this_file;
        self.lines_this_file = 0;
        self.table.set_file_macro(&self.current_file);
        self.table.set_line_macro(self.lines_this_file);
        self.files_preprocessed.insert(self.current_file_root());

        let mut block_start_line = self.current_line;

        let bytes = match self.loader.load(&self.root_path, &filename) {
            Ok(bytes) => bytes,
            Err(err) => {
                let _ = self.diags.report(Diagnostic::error(
                    &self.current_file.clone(),
                    self.lines_this_file,
                    err.to_string(),
                ));
                self.current_file = saved_file;
                self.lines_this_file = saved_lines_this_file;
                return Vec::new();
            }
        };

        if bytes.is_empty() {
            self.current_file = saved_file;
            self.lines_this_file = saved_lines_this_file;
            return Vec::new();
        }

        let source = String::from_utf8_lossy(&bytes).into_owned();
        let mut stream = TokenStream::from_vec(preproc_lex::lex(&source));

        let mut pos = 0usize;
        let mut last_counted_newline: Option<usize> = None;
        while pos < stream.len() {
            let kind = stream.get(pos).unwrap().kind;
            pos = match kind {
                TokenKind::Newline => {
                    // A macro expansion's anchor can walk the cursor back onto a
                    // newline already counted (§4.4: "if the previous token
                    // processed was not the same newline, increment"). Only
                    // count each newline index once.
                    if last_counted_newline != Some(pos) {
                        self.current_line += 1;
                        self.lines_this_file += 1;
                        self.table.set_line_macro(self.lines_this_file);
                        last_counted_newline = Some(pos);
                    }
                    pos + 1
                }
                TokenKind::Preprocessor => self.dispatch_directive(&mut stream, pos, &mut block_start_line, &filename),
                TokenKind::Identifier => {
                    let file = self.current_file.clone();
                    let line = self.lines_this_file;
                    expand_at(&mut stream, pos, &self.table, &mut self.diags, &file, line)
                }
                _ => pos + 1,
            };
        }

        self.translator.add_line_range(self.prepend_root_path(&filename), block_start_line, self.current_line - self.lines_this_file);

        self.current_file = saved_file;
        self.lines_this_file = saved_lines_this_file;
        self.table.set_file_macro(&self.current_file);
        self.table.set_line_macro(self.lines_this_file);
        stream.into_vec()
    }

    /// Handles the `Preprocessor` token at `pos`: pulls the directive's full
    /// token span, then dispatches on its keyword. Returns the cursor to
    /// resume the walk from.
    fn dispatch_directive(&mut self, stream: &mut TokenStream, pos: usize, block_start_line: &mut u32, filename: &str) -> usize {
        let (directive_tokens, terminus, continuations) = collect_directive(stream, pos);
        let keyword = directive_tokens[0].text.clone();

        if self.skip_pragmas && keyword == "#pragma" {
            return terminus;
        }

        let body = directive_tokens[1..].to_vec();
        let resume = erase_directive(stream, pos, terminus, continuations);
        let file = self.current_file.clone();
        let line = self.lines_this_file;

        match keyword.as_str() {
            "#define" => parse_define(&body, &mut self.table, &mut self.diags, &file, line),
            "#undef" => parse_undef(&body, &mut self.table, &mut self.diags, &file, line),
            "#ifdef" => {
                if let Some(name) = parse_single_name(&body, &mut self.diags, &file, line) {
                    if !self.table.is_defined(&name) {
                        return self.skip_conditional(stream, resume, &file, line);
                    }
                }
            }
            "#ifndef" => {
                if let Some(name) = parse_single_name(&body, &mut self.diags, &file, line) {
                    if self.table.is_defined(&name) {
                        return self.skip_conditional(stream, resume, &file, line);
                    }
                }
            }
            "#if" => {
                let satisfied = crate::eval::evaluate_if(&body, &self.table, &mut self.diags, &file, line);
                if !satisfied {
                    return self.skip_conditional(stream, resume, &file, line);
                }
            }
            "#endif" => {}
            "#include" => return self.process_include(stream, resume, block_start_line, &body, filename),
            "#pragma" => {
                if let Some((name, text)) = parse_pragma(&body, &mut self.diags, &file, line) {
                    self.record_pragma(name, text, &file, line);
                }
            }
            "#message" => {
                let _ = self.diags.report(Diagnostic::message(&file, line, parse_text_line(&body)));
            }
            "#warning" => {
                let _ = self.diags.report(Diagnostic::warning(&file, line, parse_text_line(&body)));
            }
            "#error" => {
                let _ = self.diags.report(Diagnostic::error(&file, line, parse_text_line(&body)));
            }
            other => {
                let _ = self.diags.report(Diagnostic::error(&file, line, format!("Unknown directive '{other}'.")));
            }
        }
        resume
    }

    /// Skips from just past a false `#if`/`#ifdef`/`#ifndef` to its matching
    /// `#endif`, preserving the newlines the skipped block spanned.
    fn skip_conditional(&mut self, stream: &mut TokenStream, start: usize, file: &str, line: u32) -> usize {
        match find_conditional_end(stream, start) {
            Some((newlines, end)) => erase_directive(stream, start, end, newlines as usize),
            None => {
                let _ = self.diags.report(Diagnostic::error(file, line, "Unexpected end of file."));
                stream.len()
            }
        }
    }

    /// `#include`: records the dependency, recurses into the target file,
    /// and splices its resolved tokens in at the include site. The parent
    /// walk resumes right after the spliced block rather than re-walking
    /// it, so `current_line` is never advanced twice for the same source
    /// line — once during the child's own recursive walk, once if the
    /// parent re-scanned the tokens it just inserted.
    fn process_include(
        &mut self,
        stream: &mut TokenStream,
        resume: usize,
        block_start_line: &mut u32,
        body: &[Token],
        filename: &str,
    ) -> usize {
        let file = self.current_file.clone();
        let line = self.lines_this_file;
        self.translator.add_line_range(self.prepend_root_path(filename), *block_start_line, self.current_line - self.lines_this_file);

        let Some(target) = parse_include_target(body, &mut self.diags, &file, line) else {
            *block_start_line = self.current_line;
            return resume;
        };

        let mut dependency = target;
        self.include_translator.rewrite(&mut dependency);
        self.file_dependencies.insert(dependency.clone());

        let child_path = join_relative(filename, &dependency);
        log::trace!("including {} from {}", child_path, file);
        let child_tokens = self.process_file(child_path);
        let inserted = child_tokens.len();
        stream.insert_many(resume, child_tokens);

        *block_start_line = self.current_line;
        resume + inserted
    }

    fn record_pragma(&mut self, name: String, text: String, file: &str, line: u32) {
        self.pragmas.push((name.clone(), text.clone()));
        let instance =
            PragmaInstance { text, current_file: file.to_string(), current_file_line: line, root_file: self.root_file.clone(), global_line: self.current_line };
        if let Some(callback) = self.pragma_callback.as_mut() {
            callback.call_pragma(&name, &instance);
        }
    }
}

/// The result of a single [`Preprocessor::preprocess`] call: how many
/// `Error`-level diagnostics were reported. Zero does not guarantee the
/// output is semantically correct — only that nothing fatal was hit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PreprocessReport {
    pub error_count: u32,
}

/// A reusable preprocessing engine.
///
/// Custom `#define`s and the pragma callback persist across calls to
/// [`preprocess`](Preprocessor::preprocess), mirroring a compiler driver
/// that configures a preprocessor once (`-D` flags, a pragma sink) and
/// reuses it for every translation unit. Per-run state — the line-number
/// translator, dependency sets, captured pragmas — is rebuilt fresh on
/// every call and queryable afterward through the accessors below.
#[derive(Default)]
pub struct Preprocessor {
    custom_defines: DefineTable,
    pragma_callback: Option<Box<dyn PragmaCallback>>,
    translator: LineNumberTranslator,
    file_dependencies: IndexSet<String>,
    files_preprocessed: IndexSet<String>,
    pragmas: Vec<(String, String)>,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a `#define`, parsed exactly as a `#define` line in
    /// source would be (so `"FOO 1"`, `"SQ(x) ((x)*(x))"`, and a bare
    /// `"FOO"` are all accepted).
    pub fn define(&mut self, text: &str) {
        let body: Vec<Token> = preproc_lex::lex(text).into_iter().filter(|t| t.kind != TokenKind::Newline).collect();
        let mut sink = io::sink();
        let mut diags = Handler::new(&mut sink);
        parse_define(&body, &mut self.custom_defines, &mut diags, "<define>", 0);
    }

    pub fn define_value(&mut self, name: &str, value: &str) {
        self.custom_defines.define(name, DefineEntry::object_like(preproc_lex::lex(value)));
    }

    pub fn undef(&mut self, name: &str) -> bool {
        self.custom_defines.undef(name)
    }

    pub fn undef_all(&mut self) {
        self.custom_defines.undef_all();
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.custom_defines.is_defined(name)
    }

    pub fn set_pragma_callback(&mut self, callback: Box<dyn PragmaCallback>) {
        self.pragma_callback = Some(callback);
    }

    pub fn clear_pragma_callback(&mut self) {
        self.pragma_callback = None;
    }

    pub fn line_number_translator(&self) -> &LineNumberTranslator {
        &self.translator
    }

    pub fn file_dependencies(&self) -> impl Iterator<Item = &str> {
        self.file_dependencies.iter().map(String::as_str)
    }

    pub fn files_preprocessed(&self) -> impl Iterator<Item = &str> {
        self.files_preprocessed.iter().map(String::as_str)
    }

    /// The pragmas captured during the last run, as `(name, text)` pairs in
    /// file order.
    pub fn captured_pragmas(&self) -> &[(String, String)] {
        &self.pragmas
    }

    /// Preprocesses `path`, writing the expanded token text to `result` and
    /// any diagnostics to `errors` (discarded if `None`). `loader` defaults
    /// to reading plain files off disk; `skip_pragmas`, when set, leaves
    /// every `#pragma` line untouched in the output instead of capturing
    /// and erasing it.
    pub fn preprocess(
        &mut self,
        path: &str,
        result: &mut dyn Write,
        errors: Option<&mut dyn Write>,
        loader: Option<&dyn FileLoader>,
        skip_pragmas: bool,
    ) -> io::Result<PreprocessReport> {
        let (root_path, root_file) = split_root(path);
        let default_loader = FsFileLoader;
        let default_translator = IdentityIncludeTranslator;
        let mut sink = io::sink();
        let errors_sink: &mut dyn Write = match errors {
            Some(e) => e,
            None => &mut sink,
        };

        let mut ctx = Context {
            table: self.custom_defines.clone(),
            translator: LineNumberTranslator::new(),
            root_file: root_file.clone(),
            root_path,
            current_file: root_file.clone(),
            current_line: 0,
            lines_this_file: 0,
            file_dependencies: IndexSet::new(),
            files_preprocessed: IndexSet::new(),
            pragmas: Vec::new(),
            skip_pragmas,
            loader: loader.unwrap_or(&default_loader),
            include_translator: &default_translator,
            pragma_callback: self.pragma_callback.as_deref_mut(),
            diags: Handler::new(errors_sink),
        };

        let tokens = ctx.process_file(root_file);
        let error_count = ctx.diags.error_count();
        write_tokens(&tokens, result)?;

        self.translator = ctx.translator;
        self.file_dependencies = ctx.file_dependencies;
        self.files_preprocessed = ctx.files_preprocessed;
        self.pragmas = ctx.pragmas;

        Ok(PreprocessReport { error_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use preproc_util::LoadResult;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct MapLoader(HashMap<&'static str, &'static str>);

    impl FileLoader for MapLoader {
        fn load(&self, _dir: &str, filename: &str) -> LoadResult<Vec<u8>> {
            self.0
                .get(filename)
                .map(|s| s.as_bytes().to_vec())
                .ok_or_else(|| preproc_util::LoadError::NotFound(filename.to_string()))
        }
    }

    #[test]
    fn object_like_macro_is_substituted() {
        let mut pp = Preprocessor::new();
        let mut files = HashMap::new();
        files.insert("main.c", "#define MAX 100\nint x = MAX;\n");
        let loader = MapLoader(files);
        let mut out = Vec::new();
        let report = pp.preprocess("main.c", &mut out, None, Some(&loader), false).unwrap();
        assert_eq!(report.error_count, 0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("int x=100;"));
        assert!(!text.contains("MAX"));
    }

    #[test]
    fn function_like_macro_substitutes_arguments() {
        let mut pp = Preprocessor::new();
        let mut files = HashMap::new();
        files.insert("main.c", "#define SQ(x) ((x)*(x))\nint y = SQ(5);\n");
        let loader = MapLoader(files);
        let mut out = Vec::new();
        pp.preprocess("main.c", &mut out, None, Some(&loader), false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("((5)*(5))"));
    }

    #[test]
    fn false_if_branch_is_skipped() {
        let mut pp = Preprocessor::new();
        let mut files = HashMap::new();
        files.insert("main.c", "#if 0\nshould_not_appear();\n#endif\nint z;\n");
        let loader = MapLoader(files);
        let mut out = Vec::new();
        pp.preprocess("main.c", &mut out, None, Some(&loader), false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("should_not_appear"));
        assert!(text.contains("int z;"));
    }

    #[test]
    fn ifdef_true_branch_survives() {
        let mut pp = Preprocessor::new();
        pp.define("FEATURE");
        let mut files = HashMap::new();
        files.insert("main.c", "#ifdef FEATURE\nint on;\n#endif\n");
        let loader = MapLoader(files);
        let mut out = Vec::new();
        pp.preprocess("main.c", &mut out, None, Some(&loader), false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("int on;"));
    }

    #[test]
    fn include_splices_child_tokens_and_tracks_dependency() {
        let mut pp = Preprocessor::new();
        let mut files = HashMap::new();
        files.insert("main.c", "#include \"dep.h\"\nint x;\n");
        files.insert("dep.h", "int dep;\n");
        let loader = MapLoader(files);
        let mut out = Vec::new();
        pp.preprocess("main.c", &mut out, None, Some(&loader), false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("int dep;"));
        assert!(text.contains("int x;"));
        assert_eq!(pp.file_dependencies().collect::<Vec<_>>(), vec!["dep.h"]);
    }

    #[test]
    fn pragma_is_captured_and_erased_by_default() {
        struct RecordingCallback(RefCell<Vec<String>>);
        impl PragmaCallback for RecordingCallback {
            fn call_pragma(&mut self, name: &str, instance: &PragmaInstance) {
                self.0.borrow_mut().push(format!("{name}:{}", instance.text));
            }
        }

        let mut pp = Preprocessor::new();
        pp.set_pragma_callback(Box::new(RecordingCallback(RefCell::new(Vec::new()))));
        let mut files = HashMap::new();
        files.insert("main.c", "#pragma once \"yes\"\nint x;\n");
        let loader = MapLoader(files);
        let mut out = Vec::new();
        pp.preprocess("main.c", &mut out, None, Some(&loader), false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("pragma"));
        assert_eq!(pp.captured_pragmas(), &[("once".to_string(), "yes".to_string())]);
    }

    #[test]
    fn skip_pragmas_leaves_directive_verbatim() {
        let mut pp = Preprocessor::new();
        let mut files = HashMap::new();
        files.insert("main.c", "#pragma once \"yes\"\nint x;\n");
        let loader = MapLoader(files);
        let mut out = Vec::new();
        pp.preprocess("main.c", &mut out, None, Some(&loader), true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("#pragma"));
    }

    #[test]
    fn unknown_directive_reports_error() {
        let mut pp = Preprocessor::new();
        let mut files = HashMap::new();
        files.insert("main.c", "#bogus\nint x;\n");
        let loader = MapLoader(files);
        let mut out = Vec::new();
        let mut err = Vec::new();
        let report = pp.preprocess("main.c", &mut out, Some(&mut err), Some(&loader), false).unwrap();
        assert_eq!(report.error_count, 1);
    }

    /// A macro occupying a whole line expands with its anchor landing back on
    /// the newline that precedes it, which must not be counted twice: the file
    /// has exactly two newline bytes, so the line after the macro is line 2,
    /// not line 3.
    #[test]
    fn line_initial_macro_does_not_double_count_its_preceding_newline() {
        let mut pp = Preprocessor::new();
        let mut files = HashMap::new();
        files.insert("main.c", "#define X 5\nX\n#error boom\n");
        let loader = MapLoader(files);
        let mut out = Vec::new();
        let mut err = Vec::new();
        pp.preprocess("main.c", &mut out, Some(&mut err), Some(&loader), false).unwrap();
        let err_text = String::from_utf8(err).unwrap();
        assert!(err_text.contains("main.c (2) Error: boom"), "unexpected diagnostic: {err_text}");
    }

    #[test]
    fn line_and_file_translate_back_through_include() {
        let mut pp = Preprocessor::new();
        let mut files = HashMap::new();
        files.insert("main.c", "first\n#include \"dep.h\"\nlast\n");
        files.insert("dep.h", "dep_line\n");
        let loader = MapLoader(files);
        let mut out = Vec::new();
        pp.preprocess("main.c", &mut out, None, Some(&loader), false).unwrap();

        let translator = pp.line_number_translator();
        assert_eq!(translator.resolve_original_file(0), Some("main.c"));
        assert_eq!(translator.resolve_original_file(1), Some("./dep.h"));
        assert_eq!(translator.resolve_original_file(2), Some("main.c"));
    }
}
