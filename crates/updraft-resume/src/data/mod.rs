//! Data layer: the persisted record and the values the protocol compares.

mod policy;
mod response;
mod state;

pub use policy::{Validator, ValidatorKind, ValidatorPolicy};
pub use response::{ContentRange, ResponseMeta, header, status};
pub use state::ResumableDownload;
