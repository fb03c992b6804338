//! HTTP downloads that resume from a persisted partial file.
//!
//! # Architecture
//!
//! This crate follows the layering of its siblings:
//! - [`data`] - Immutable configuration and progress types
//! - [`effects`] - I/O operations with trait abstraction
//!
//! The resume-or-restart decisions themselves live in `updraft-resume`;
//! records are persisted through an `updraft-store` [`StateStore`](updraft_store::StateStore).
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use updraft_fetch::{ReqwestClient, ResumableFetcher};
//! use updraft_store::DirStore;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = ResumableFetcher::new(ReqwestClient::new()?, DirStore::new("/var/cache/updraft"));
//! fetcher
//!     .fetch("https://example.com/update.zip", Path::new("update.zip"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod effects;
mod error;

pub use data::{FetchPhase, Progress, ProgressCallback, ResumeOptions};
pub use effects::{BoxStream, HttpClient, HttpResponse, ResumableFetcher};
pub use error::{BoxError, FetchError, Result};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;
