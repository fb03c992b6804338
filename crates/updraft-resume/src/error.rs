//! Error types for updraft-resume.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("malformed resume state: {0}")]
    MalformedState(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self { Error::MalformedState(e.to_string()) }
}

pub type Result<T> = std::result::Result<T, Error>;
