use tracing::debug;
use updraft_resume::{JsonCodec, ResumableDownload, StateCodec};

use crate::backend::StateStore;
use crate::error::Result;

/// Typed view over a [`StateStore`] holding encoded [`ResumableDownload`]s,
/// keyed by resource identity (normally the source URL).
#[derive(Debug, Clone)]
pub struct Records<S, C = JsonCodec> {
    store: S,
    codec: C,
}

impl<S: StateStore> Records<S> {
    pub fn new(store: S) -> Self { Self::with_codec(store, JsonCodec) }
}

impl<S: StateStore, C: StateCodec> Records<S, C> {
    pub fn with_codec(store: S, codec: C) -> Self { Self { store, codec } }

    pub fn store(&self) -> &S { &self.store }

    /// Reads the record for `key`.
    ///
    /// # Errors
    ///
    /// A stored blob that cannot be decoded is reported as
    /// [`StoreError::Codec`](crate::StoreError::Codec); the blob is left in
    /// place for the caller to inspect or discard.
    pub fn load(&self, key: &str) -> Result<Option<ResumableDownload>> {
        match self.store.get(key)? {
            Some(bytes) => Ok(Some(self.codec.decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Replaces the record for `key` with `state`.
    pub fn save(&self, key: &str, state: &ResumableDownload) -> Result<()> {
        let bytes = self.codec.encode(state)?;
        self.store.set(key, &bytes)?;
        debug!(key, location = %state.file_location().display(), "saved resume record");
        Ok(())
    }

    pub fn discard(&self, key: &str) -> Result<()> { self.store.delete(key) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, StoreError};
    use updraft_resume::ResponseMeta;

    #[test]
    fn save_load_discard() {
        let records = Records::new(MemoryStore::new());
        let state = ResumableDownload::new(
            Some(ResponseMeta::new(200, "http://x/file").header("ETag", "\"abc\"")),
            "/tmp/file.part",
        )
        .unwrap();

        assert_eq!(records.load("http://x/file").unwrap(), None);
        records.save("http://x/file", &state).unwrap();
        assert_eq!(records.load("http://x/file").unwrap(), Some(state));

        records.discard("http://x/file").unwrap();
        assert_eq!(records.load("http://x/file").unwrap(), None);
    }

    #[test]
    fn corrupt_record_is_a_codec_error() {
        let records = Records::new(MemoryStore::new());
        records.store().set("http://x/file", b"{oops").unwrap();

        let err = records.load("http://x/file").unwrap_err();
        assert!(matches!(
            err,
            StoreError::Codec(updraft_resume::Error::MalformedState(_))
        ));
    }
}
