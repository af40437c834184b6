//! Foundation types shared across the preprocessor crates: diagnostic
//! reporting and a couple of error enums used at the capability boundary.

pub mod diagnostic;
pub mod error;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use error::{LoadError, LoadResult};
