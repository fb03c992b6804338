//! Error types for updraft-fetch.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("incomplete download: expected {expected} bytes, got {actual}")]
    Incomplete { expected: u64, actual: u64 },

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("invalid SHA-256 checksum: {0}")]
    InvalidChecksum(String),

    #[error("file I/O error at '{path}': {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Store(#[from] updraft_store::StoreError),

    #[error(transparent)]
    State(#[from] updraft_resume::Error),
}

impl FetchError {
    pub(crate) fn transport<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
        FetchError::Transport(Box::new(e))
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| FetchError::Io { path, source }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
