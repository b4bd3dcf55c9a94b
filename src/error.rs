//! Error types for the route fixer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for route fixer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the route fixer
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File is not valid UTF-8 text: {path}")]
    NonUtf8Text { path: PathBuf },
}
