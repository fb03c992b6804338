//! State required to resume an interrupted download, and the protocol that
//! decides between resuming with a byte range and restarting from zero.
//!
//! # Architecture
//!
//! - [`data`] - The immutable [`ResumableDownload`] record and the values it carries
//! - [`core`] - Pure decision functions over those values
//! - [`codec`] - Versioned persisted form
//!
//! Nothing here touches the network or the disk. Transport, file I/O and the
//! store holding the encoded record are the caller's collaborators.
//!
//! # Example
//!
//! ```
//! use updraft_resume::{RequestPlan, ResponseMeta, ResumableDownload, ValidatorPolicy, plan_request};
//!
//! let response = ResponseMeta::new(200, "http://x/file").header("ETag", "\"abc\"");
//! let state = ResumableDownload::new(Some(response), "/tmp/file.part").unwrap();
//!
//! let plan = plan_request(Some(&state), 4096, &ValidatorPolicy::default());
//! assert!(matches!(plan, RequestPlan::Ranged { offset: 4096, .. }));
//! ```

pub mod codec;
pub mod core;
pub mod data;
mod error;

pub use self::codec::{JsonCodec, StateCodec, decode, encode};
pub use self::core::{
    Reconciliation, RequestPlan, RestartReason, Resumability, plan_request, range_header,
    reconcile, resumability,
};
pub use self::data::{
    ContentRange, ResponseMeta, ResumableDownload, Validator, ValidatorKind, ValidatorPolicy,
};
pub use self::error::{Error, Result};
