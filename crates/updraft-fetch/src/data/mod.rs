//! Data layer: immutable configuration and progress types.

mod options;
mod progress;

pub use options::{ProgressCallback, ResumeOptions};
pub use progress::{FetchPhase, Progress};
