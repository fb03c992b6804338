use std::fmt;
use std::sync::Arc;

use updraft_resume::ValidatorPolicy;

use super::progress::Progress;
use crate::error::{FetchError, Result};

pub type ProgressCallback = Arc<dyn Fn(&Progress) + Send + Sync>;

/// Configuration for [`ResumableFetcher`](crate::ResumableFetcher).
///
/// # Examples
///
/// ```
/// use updraft_fetch::ResumeOptions;
/// use updraft_resume::{ValidatorKind, ValidatorPolicy};
///
/// let options = ResumeOptions::default()
///     .policy(ValidatorPolicy::default().with(ValidatorKind::ContentLength))
///     .header("User-Agent", "updraft/0.1");
/// ```
#[derive(Clone, Default)]
pub struct ResumeOptions {
    /// Expected SHA-256 of the finished file. A mismatch discards the file
    /// and its resume record.
    pub checksum: Option<[u8; 32]>,

    /// Validator order used to decide between resuming and restarting.
    pub policy: ValidatorPolicy,

    /// Extra headers sent with every request, before `Range`/`If-Range`.
    pub headers: Arc<[(String, String)]>,

    /// Invoked on phase changes and after each written chunk.
    pub on_progress: Option<ProgressCallback>,
}

impl fmt::Debug for ResumeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResumeOptions")
            .field("checksum", &self.checksum.map(hex::encode))
            .field("policy", &self.policy)
            .field("headers", &self.headers)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl ResumeOptions {
    pub fn checksum(mut self, checksum: [u8; 32]) -> Self {
        self.checksum = Some(checksum);
        self
    }

    /// Sets the expected checksum from a 64 character hex string.
    pub fn checksum_hex(self, hex_digest: &str) -> Result<Self> {
        let hex_digest = hex_digest.trim();
        let mut checksum = [0u8; 32];
        hex::decode_to_slice(hex_digest, &mut checksum)
            .map_err(|_| FetchError::InvalidChecksum(hex_digest.to_string()))?;
        Ok(self.checksum(checksum))
    }

    pub fn policy(mut self, policy: ValidatorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut headers = self.headers.to_vec();
        headers.push((name.into(), value.into()));
        self.headers = headers.into();
        self
    }

    pub fn on_progress(mut self, callback: impl Fn(&Progress) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(callback));
        self
    }
}
