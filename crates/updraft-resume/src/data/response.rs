use std::fmt;

/// Header names the resume protocol reads.
pub mod header {
    pub const ETAG: &str = "ETag";
    pub const LAST_MODIFIED: &str = "Last-Modified";
    pub const CONTENT_LENGTH: &str = "Content-Length";
    pub const CONTENT_RANGE: &str = "Content-Range";
    pub const ACCEPT_RANGES: &str = "Accept-Ranges";
    pub const RANGE: &str = "Range";
    pub const IF_RANGE: &str = "If-Range";
}

/// HTTP status codes the resume protocol distinguishes.
pub mod status {
    pub const OK: u16 = 200;
    pub const PARTIAL_CONTENT: u16 = 206;
    pub const RANGE_NOT_SATISFIABLE: u16 = 416;
}

/// Metadata of an HTTP response whose body is being downloaded.
///
/// Headers keep their original order and duplicates. Lookups are ASCII
/// case-insensitive and return the first match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    status:  u16,
    url:     String,
    headers: Vec<(String, String)>,
}

impl ResponseMeta {
    pub fn new(status: u16, url: impl Into<String>) -> Self {
        Self {
            status,
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn status(&self) -> u16 { self.status }

    /// Final URL after redirects.
    pub fn url(&self) -> &str { &self.url }

    pub fn headers(&self) -> &[(String, String)] { &self.headers }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }

    /// Strong entity tag, if any. Weak tags cannot validate byte ranges and
    /// are reported as absent.
    pub fn etag(&self) -> Option<&str> {
        self.get(header::ETAG)
            .map(str::trim)
            .filter(|tag| !tag.is_empty() && !tag.starts_with("W/"))
    }

    pub fn last_modified(&self) -> Option<&str> {
        self.get(header::LAST_MODIFIED)
            .map(str::trim)
            .filter(|date| !date.is_empty())
    }

    pub fn content_length(&self) -> Option<u64> {
        self.get(header::CONTENT_LENGTH)
            .and_then(|v| v.trim().parse().ok())
    }

    pub fn content_range(&self) -> Option<ContentRange> {
        self.get(header::CONTENT_RANGE).and_then(ContentRange::parse)
    }

    /// Length of the whole entity: the `Content-Range` total for partial
    /// responses, `Content-Length` otherwise.
    pub fn entity_length(&self) -> Option<u64> {
        if self.status == status::PARTIAL_CONTENT {
            return self.content_range().and_then(|range| range.total);
        }
        self.content_length()
    }

    /// `false` only for an explicit `Accept-Ranges: none`; servers that omit
    /// the header may still honour a range.
    pub fn accepts_ranges(&self) -> bool {
        !self
            .get(header::ACCEPT_RANGES)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("none"))
    }
}

/// Parsed `Content-Range: bytes start-end/total` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    pub start: u64,
    pub end:   u64,
    /// `None` when the server sent `*` for an unknown length.
    pub total: Option<u64>,
}

impl ContentRange {
    pub fn parse(value: &str) -> Option<Self> {
        let rest = value.trim().strip_prefix("bytes")?.trim_start();
        let (range, total) = rest.split_once('/')?;
        let (start, end) = range.trim().split_once('-')?;
        let start = start.trim().parse().ok()?;
        let end = end.trim().parse().ok()?;
        if end < start {
            return None;
        }
        let total = match total.trim() {
            "*" => None,
            n => Some(n.parse().ok()?),
        };
        Some(Self { start, end, total })
    }
}

impl fmt::Display for ContentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.total {
            Some(total) => write!(f, "bytes {}-{}/{}", self.start, self.end, total),
            None => write!(f, "bytes {}-{}/*", self.start, self.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let meta = ResponseMeta::new(200, "http://x/file")
            .header("etag", "\"abc\"")
            .header("CONTENT-LENGTH", "42");
        assert_eq!(meta.etag(), Some("\"abc\""));
        assert_eq!(meta.content_length(), Some(42));
    }

    #[test]
    fn first_duplicate_header_wins() {
        let meta = ResponseMeta::new(200, "http://x/file")
            .header("ETag", "\"one\"")
            .header("ETag", "\"two\"");
        assert_eq!(meta.etag(), Some("\"one\""));
        assert_eq!(meta.headers().len(), 2);
    }

    #[test]
    fn weak_etag_is_ignored() {
        let meta = ResponseMeta::new(200, "http://x/file").header("ETag", "W/\"abc\"");
        assert_eq!(meta.etag(), None);
    }

    #[test]
    fn parse_content_range() {
        let range = ContentRange::parse("bytes 100-199/1000").unwrap();
        assert_eq!(range, ContentRange { start: 100, end: 199, total: Some(1000) });
        assert_eq!(range.to_string(), "bytes 100-199/1000");

        let unknown = ContentRange::parse("bytes 0-9/*").unwrap();
        assert_eq!(unknown.total, None);

        assert!(ContentRange::parse("bytes */1000").is_none());
        assert!(ContentRange::parse("items 0-9/10").is_none());
        assert!(ContentRange::parse("bytes 9-0/10").is_none());
    }

    #[test]
    fn entity_length_of_partial_response() {
        let partial = ResponseMeta::new(206, "http://x/file")
            .header("Content-Length", "100")
            .header("Content-Range", "bytes 900-999/1000");
        assert_eq!(partial.entity_length(), Some(1000));

        let full = ResponseMeta::new(200, "http://x/file").header("Content-Length", "1000");
        assert_eq!(full.entity_length(), Some(1000));
    }

    #[test]
    fn accepts_ranges() {
        let meta = ResponseMeta::new(200, "http://x").header("Accept-Ranges", "bytes");
        assert!(meta.accepts_ranges());
        let none = ResponseMeta::new(200, "http://x").header("Accept-Ranges", "None");
        assert!(!none.accepts_ranges());
        assert!(ResponseMeta::new(200, "http://x").accepts_ranges());
    }
}
