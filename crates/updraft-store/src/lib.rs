//! Keyed persistence for resumable download records.
//!
//! [`StateStore`] is the opaque blob contract: get, replace, delete. Three
//! backends are provided:
//!
//! - [`MemoryStore`] - in-process map
//! - [`DirStore`] - one file per key, replaced via temp file and rename
//! - [`SledStore`] - embedded sled database
//!
//! [`Records`] layers the codec from `updraft-resume` on top of any store.

mod backend;
mod error;
mod records;

pub use backend::{DirStore, MemoryStore, SledStore, StateStore};
pub use error::{Result, StoreError};
pub use records::Records;
