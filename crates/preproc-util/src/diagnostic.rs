//! Diagnostic reporting.
//!
//! Preprocessing errors are not fatal: a malformed `#if` or an unresolved
//! argument count gets reported and processing continues on a best-effort
//! basis. [`Handler`] is the sink every phase reports through; it formats
//! each [`Diagnostic`] the way the rest of the toolchain expects to read it
//! and keeps a running error count for the caller's exit status.
use std::fmt;
use std::io::{self, Write};

/// Severity of a reported diagnostic.
///
/// `Message` is the bare informational case (`#message`, or the evaluator's
/// "Empty expression" note) — it carries no severity word in output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
    Message,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "Error"),
            Level::Warning => write!(f, "Warning"),
            Level::Message => Ok(()),
        }
    }
}

/// A single reported diagnostic, tied to the file and line it was raised
/// against.
///
/// # Examples
///
/// ```
/// use preproc_util::diagnostic::{Diagnostic, Level};
///
/// let d = Diagnostic::error("main.c", 12, "Unknown directive 'foo'.");
/// assert_eq!(d.to_string(), "main.c (12) Error: Unknown directive 'foo'.\n");
/// ```
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub file: String,
    pub line: u32,
    pub message: Option<String>,
}

impl Diagnostic {
    pub fn new(level: Level, file: impl Into<String>, line: u32) -> Self {
        Self { level, file: file.into(), line, message: None }
    }

    pub fn error(file: impl Into<String>, line: u32, message: impl Into<String>) -> Self {
        let mut d = Self::new(Level::Error, file, line);
        d.message = Some(message.into());
        d
    }

    pub fn warning(file: impl Into<String>, line: u32, message: impl Into<String>) -> Self {
        let mut d = Self::new(Level::Warning, file, line);
        d.message = Some(message.into());
        d
    }

    pub fn message(file: impl Into<String>, line: u32, message: impl Into<String>) -> Self {
        let mut d = Self::new(Level::Message, file, line);
        d.message = Some(message.into());
        d
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.file, self.line)?;
        match self.level {
            Level::Message => {}
            level => write!(f, " {level}")?,
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        writeln!(f)
    }
}

/// Formats diagnostics to an output sink and counts errors.
///
/// Only [`Level::Error`] diagnostics increment the count that callers use
/// to decide whether preprocessing "succeeded" — warnings and informational
/// messages are reported but never fail the run.
pub struct Handler<'a> {
    sink: &'a mut dyn Write,
    error_count: u32,
}

impl<'a> Handler<'a> {
    pub fn new(sink: &'a mut dyn Write) -> Self {
        Self { sink, error_count: 0 }
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn report(&mut self, diagnostic: Diagnostic) -> io::Result<()> {
        if diagnostic.level == Level::Error {
            self.error_count += 1;
        }
        write!(self.sink, "{diagnostic}")
    }
}
