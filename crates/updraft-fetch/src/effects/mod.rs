//! Effects layer: network and file-system I/O behind trait seams.

mod http;
mod resumable;

pub use http::{BoxStream, HttpClient, HttpResponse};
pub use resumable::ResumableFetcher;

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
