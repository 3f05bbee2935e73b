//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the session store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store file exists but could not be decoded.
    #[error("corrupt store file {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// The configured backend is missing required settings.
    #[error("invalid store configuration: {0}")]
    InvalidConfig(String),

    /// Answer id space exhausted.
    #[error("answer id counter overflowed")]
    IdOverflow,
}
