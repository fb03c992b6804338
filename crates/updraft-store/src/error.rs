//! Error types for updraft-store.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access '{path}': {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("database error: {0}")]
    Database(#[from] sled::Error),

    #[error(transparent)]
    Codec(#[from] updraft_resume::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
