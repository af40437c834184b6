//! Error types shared across the preprocessor crates.

use thiserror::Error;

/// Failure to load a file requested by `#include` or the root `Preprocess`
/// call.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not open file {0}")]
    NotFound(String),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;
