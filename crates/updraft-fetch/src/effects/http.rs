use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;
use updraft_resume::ResponseMeta;

/// A boxed stream of response body chunks.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Response headers plus the body still to be read.
pub struct HttpResponse<E> {
    pub meta: ResponseMeta,
    pub body: BoxStream<'static, Result<Bytes, E>>,
}

/// Asynchronous HTTP client abstraction.
///
/// Implementations follow redirects themselves and report the final URL in
/// [`ResponseMeta::url`]. Error statuses are returned as responses, not as
/// errors: the resume protocol needs to see `416` and friends.
///
/// # Implementations
///
/// - [`ReqwestClient`]: production implementation using `reqwest`
/// - Mock implementations for testing
pub trait HttpClient: Send + Sync {
    /// Error type for transport failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Issues a GET for `url` with the given extra headers.
    ///
    /// # Errors
    ///
    /// Returns an error if no response could be obtained (DNS failure,
    /// connection error, timeout). Errors while reading the body surface
    /// through the body stream.
    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<Output = Result<HttpResponse<Self::Error>, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_client {
    use super::*;
    use futures_util::TryStreamExt;
    use reqwest::Client;

    /// Production HTTP client implementation using reqwest.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: Client,
    }

    impl ReqwestClient {
        pub fn new() -> Result<Self, reqwest::Error> {
            let client = Client::builder()
                .user_agent(concat!("updraft/", env!("CARGO_PKG_VERSION")))
                .build()?;
            Ok(Self::from_client(client))
        }

        /// Wraps a preconfigured client (proxies, timeouts, TLS roots).
        pub fn from_client(client: Client) -> Self { Self { client } }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn get(
            &self,
            url: &str,
            headers: &[(String, String)],
        ) -> Result<HttpResponse<Self::Error>, Self::Error> {
            let mut request = self.client.get(url);
            for (key, value) in headers {
                request = request.header(key, value);
            }

            let response = request.send().await?;
            let meta = ResponseMeta::new(response.status().as_u16(), response.url().as_str())
                .with_headers(response.headers().iter().map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                }));
            let body = response.bytes_stream().map_ok(Bytes::from);

            Ok(HttpResponse {
                meta,
                body: Box::pin(body),
            })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_client::ReqwestClient;
