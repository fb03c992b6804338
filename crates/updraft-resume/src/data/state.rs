use std::path::{Path, PathBuf};

use url::Url;

use super::response::ResponseMeta;
use crate::error::{Error, Result};

/// State required to resume a download from where it left off.
///
/// The record is immutable. Any change produces a new value which the owning
/// store persists in place of the old one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumableDownload {
    response:      Option<ResponseMeta>,
    file_location: PathBuf,
}

impl ResumableDownload {
    /// Creates a record for bytes being written to `file_location`.
    ///
    /// `response` may be `None` when the attempt is registered before any
    /// response headers arrived.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `file_location` is empty.
    pub fn new(response: Option<ResponseMeta>, file_location: impl Into<PathBuf>) -> Result<Self> {
        let file_location = file_location.into();
        if file_location.as_os_str().is_empty() {
            return Err(Error::InvalidArgument(
                "file location must not be empty".to_string(),
            ));
        }
        Ok(Self {
            response,
            file_location,
        })
    }

    /// Creates a record from a `file://` URL.
    pub fn from_file_url(response: Option<ResponseMeta>, file_url: &Url) -> Result<Self> {
        let path = file_url
            .to_file_path()
            .map_err(|_| Error::InvalidArgument(format!("not a file URL: {file_url}")))?;
        Self::new(response, path)
    }

    pub fn response(&self) -> Option<&ResponseMeta> { self.response.as_ref() }

    pub fn file_location(&self) -> &Path { &self.file_location }

    /// Returns a new record for the same file carrying `response`.
    pub fn with_response(&self, response: ResponseMeta) -> Self {
        Self {
            response:      Some(response),
            file_location: self.file_location.clone(),
        }
    }

    pub fn file_url(&self) -> Option<Url> { Url::from_file_path(&self.file_location).ok() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_location_is_rejected() {
        let err = ResumableDownload::new(None, "").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = ResumableDownload::new(Some(ResponseMeta::new(200, "http://x")), PathBuf::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn response_is_optional() {
        let state = ResumableDownload::new(None, "/tmp/file.part").unwrap();
        assert!(state.response().is_none());
        assert_eq!(state.file_location(), Path::new("/tmp/file.part"));
    }

    #[test]
    fn with_response_leaves_original_untouched() {
        let state = ResumableDownload::new(None, "/tmp/file.part").unwrap();
        let next = state.with_response(ResponseMeta::new(200, "http://x/file"));

        assert!(state.response().is_none());
        assert_eq!(next.response().map(ResponseMeta::status), Some(200));
        assert_eq!(next.file_location(), state.file_location());
    }

    #[cfg(unix)]
    #[test]
    fn file_url_round_trip() {
        let url = Url::parse("file:///tmp/update.zip.part").unwrap();
        let state = ResumableDownload::from_file_url(None, &url).unwrap();
        assert_eq!(state.file_location(), Path::new("/tmp/update.zip.part"));
        assert_eq!(state.file_url(), Some(url));
    }

    #[test]
    fn non_file_url_is_rejected() {
        let url = Url::parse("https://example.com/file").unwrap();
        let err = ResumableDownload::from_file_url(None, &url).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
