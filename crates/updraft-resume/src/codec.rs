//! Persisted form of [`ResumableDownload`].
//!
//! The baseline adapter is JSON with a versioned envelope:
//!
//! ```json
//! {"version":1,"file_location":"/tmp/file.part",
//!  "response":{"status":200,"url":"http://x/file","headers":[["ETag","\"abc\""]]}}
//! ```
//!
//! A missing or `null` response, or one without status or URL, decodes as
//! "no response recorded" so records written by older clients still load.
//!
//! File locations that are not valid UTF-8 are written as an array of the
//! raw path bytes (unix only).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::{ResponseMeta, ResumableDownload};
use crate::error::{Error, Result};

/// Envelope version written by [`encode`].
pub const CURRENT_VERSION: u32 = 1;

/// Serialization backend contract for resume records.
pub trait StateCodec: Send + Sync {
    fn encode(&self, state: &ResumableDownload) -> Result<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> Result<ResumableDownload>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[derive(Serialize, Deserialize)]
struct Envelope {
    #[serde(default = "legacy_version")]
    version:       u32,
    #[serde(default)]
    file_location: Option<WireLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    response:      Option<WireResponse>,
}

#[derive(Serialize, Deserialize)]
struct WireResponse {
    #[serde(default)]
    status:  Option<u16>,
    #[serde(default)]
    url:     Option<String>,
    #[serde(default)]
    headers: Vec<(String, String)>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WireLocation {
    Utf8(String),
    Bytes(Vec<u8>),
}

impl WireLocation {
    fn is_empty(&self) -> bool {
        match self {
            WireLocation::Utf8(path) => path.is_empty(),
            WireLocation::Bytes(bytes) => bytes.is_empty(),
        }
    }
}

fn legacy_version() -> u32 { 1 }

fn location_to_wire(path: &Path) -> Result<WireLocation> {
    if let Some(path) = path.to_str() {
        return Ok(WireLocation::Utf8(path.to_string()));
    }

    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        Ok(WireLocation::Bytes(path.as_os_str().as_bytes().to_vec()))
    }

    #[cfg(not(unix))]
    {
        Err(Error::InvalidArgument("file location is not valid Unicode".to_string()))
    }
}

fn location_from_wire(wire: WireLocation) -> Result<PathBuf> {
    match wire {
        WireLocation::Utf8(path) => Ok(PathBuf::from(path)),
        #[cfg(unix)]
        WireLocation::Bytes(bytes) => {
            use std::os::unix::ffi::OsStringExt;
            Ok(PathBuf::from(std::ffi::OsString::from_vec(bytes)))
        }
        #[cfg(not(unix))]
        WireLocation::Bytes(_) => Err(Error::MalformedState(
            "byte-encoded file location is not supported on this platform".to_string(),
        )),
    }
}

impl StateCodec for JsonCodec {
    fn encode(&self, state: &ResumableDownload) -> Result<Vec<u8>> {
        let envelope = Envelope {
            version: CURRENT_VERSION,
            file_location: Some(location_to_wire(state.file_location())?),
            response: state.response().map(|response| WireResponse {
                status:  Some(response.status()),
                url:     Some(response.url().to_string()),
                headers: response.headers().to_vec(),
            }),
        };

        Ok(serde_json::to_vec(&envelope)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<ResumableDownload> {
        let envelope: Envelope = serde_json::from_slice(bytes)?;

        if envelope.version > CURRENT_VERSION {
            return Err(Error::MalformedState(format!(
                "unsupported version {}",
                envelope.version
            )));
        }

        let file_location = envelope
            .file_location
            .filter(|location| !location.is_empty())
            .ok_or_else(|| Error::MalformedState("missing file location".to_string()))
            .and_then(location_from_wire)?;

        let response = envelope.response.and_then(|wire| match (wire.status, wire.url) {
            (Some(status), Some(url)) => Some(ResponseMeta::new(status, url).with_headers(wire.headers)),
            _ => None,
        });

        ResumableDownload::new(response, file_location)
    }
}

/// Encodes `state` with [`JsonCodec`].
pub fn encode(state: &ResumableDownload) -> Result<Vec<u8>> { JsonCodec.encode(state) }

/// Decodes a record written by [`encode`] or by an older client.
pub fn decode(bytes: &[u8]) -> Result<ResumableDownload> { JsonCodec.decode(bytes) }

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResumableDownload {
        let response = ResponseMeta::new(200, "http://x/file")
            .header("ETag", "\"abc\"")
            .header("Set-Cookie", "a=1")
            .header("Set-Cookie", "b=2");
        ResumableDownload::new(Some(response), "/tmp/file.part").unwrap()
    }

    #[test]
    fn round_trip() {
        let state = sample();
        let decoded = decode(&encode(&state).unwrap()).unwrap();
        assert_eq!(decoded, state);
        assert_eq!(decoded.response().unwrap().headers().len(), 3);
    }

    #[test]
    fn round_trip_without_response() {
        let state = ResumableDownload::new(None, "/tmp/file.part").unwrap();
        let bytes = encode(&state).unwrap();
        assert!(!String::from_utf8_lossy(&bytes).contains("response"));
        assert_eq!(decode(&bytes).unwrap(), state);
    }

    #[test]
    fn empty_headers_are_not_absent_response() {
        let state =
            ResumableDownload::new(Some(ResponseMeta::new(204, "http://x/file")), "/tmp/f").unwrap();
        let decoded = decode(&encode(&state).unwrap()).unwrap();
        assert_eq!(decoded.response().map(ResponseMeta::status), Some(204));
        assert!(decoded.response().unwrap().headers().is_empty());
    }

    #[test]
    fn missing_response_portion_is_tolerated() {
        let legacy = br#"{"file_location":"/tmp/file.part"}"#;
        let decoded = decode(legacy).unwrap();
        assert!(decoded.response().is_none());
        assert_eq!(decoded.file_location().to_str(), Some("/tmp/file.part"));

        let null = br#"{"version":1,"file_location":"/tmp/file.part","response":null}"#;
        assert!(decode(null).unwrap().response().is_none());

        let partial = br#"{"version":1,"file_location":"/tmp/file.part","response":{"headers":[]}}"#;
        assert!(decode(partial).unwrap().response().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_location_round_trips() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let location = Path::new(OsStr::from_bytes(b"/tmp/upd\xffate.part"));
        let state = ResumableDownload::new(
            Some(ResponseMeta::new(200, "http://x/file").header("ETag", "\"abc\"")),
            location,
        )
        .unwrap();

        let bytes = encode(&state).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, state);
        assert_eq!(decoded.file_location(), location);
    }

    #[test]
    fn structurally_invalid_forms_are_malformed() {
        let cases: [&[u8]; 7] = [
            b"not json",
            b"[1,2,3]",
            br#"{"version":1}"#,
            br#"{"version":1,"file_location":""}"#,
            br#"{"version":1,"file_location":[]}"#,
            br#"{"version":1,"file_location":"/tmp/f","response":{"status":"ok","url":"u"}}"#,
            br#"{"version":99,"file_location":"/tmp/f"}"#,
        ];
        for case in cases {
            let err = decode(case).unwrap_err();
            assert!(
                matches!(err, Error::MalformedState(_)),
                "expected malformed state for {}",
                String::from_utf8_lossy(case)
            );
        }
    }
}
