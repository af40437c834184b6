//! The small set of host-provided capabilities the processor calls out to:
//! reading an included file's bytes, rewriting an include name before it is
//! recorded as a dependency, and observing `#pragma` directives as they are
//! reached. Each has a sane default so a caller that only wants ordinary
//! filesystem includes and no pragma handling needs to wire up nothing.

use preproc_util::{LoadError, LoadResult};
use std::fs;
use std::path::Path;

/// Reads the bytes of an included (or root) file.
///
/// `dir` is the processor's `root_path`; `filename` is the path already
/// joined against the including file's directory. [`FsFileLoader`] is the
/// default, reading `dir` and `filename` joined together off disk.
pub trait FileLoader {
    fn load(&self, dir: &str, filename: &str) -> LoadResult<Vec<u8>>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FsFileLoader;

impl FileLoader for FsFileLoader {
    fn load(&self, dir: &str, filename: &str) -> LoadResult<Vec<u8>> {
        let path = Path::new(dir).join(filename);
        fs::read(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LoadError::NotFound(path.display().to_string())
            } else {
                LoadError::Io { path: path.display().to_string(), source }
            }
        })
    }
}

/// Rewrites an `#include` target before it is recorded as a dependency and
/// joined into a path. Identity by default.
pub trait IncludeTranslator {
    fn rewrite(&self, filename: &mut String);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityIncludeTranslator;

impl IncludeTranslator for IdentityIncludeTranslator {
    fn rewrite(&self, _filename: &mut String) {}
}

/// Context handed to a [`PragmaCallback`] alongside the pragma's name: the
/// unquoted pragma text, the file and local line the pragma directive sits
/// on, and the invocation's root file and global output line.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PragmaInstance {
    pub text: String,
    pub current_file: String,
    pub current_file_line: u32,
    pub root_file: String,
    pub global_line: u32,
}

/// Observes `#pragma` directives as the directive processor reaches them,
/// in file order. Must not re-enter the processor instance that invoked it.
pub trait PragmaCallback {
    fn call_pragma(&mut self, name: &str, instance: &PragmaInstance);
}
