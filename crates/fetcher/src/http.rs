//! HTTP fetcher backed by reqwest
//!
//! Performs a plain GET and hands the response body back as a chunk stream.
//! The status code is not inspected: an error page is a body like any other.

use std::error::Error as StdError;

use bytes::Bytes;
use contracts::{FetchBody, FetchError, Fetcher};
use reqwest::{Client, Response, Url};
use tracing::{debug, instrument};

use crate::error::{FetcherError, Result};

/// HTTP fetcher configuration
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("fetch-timer/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Fetcher performing HTTP(S) GET requests
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(&HttpFetcherConfig::default())
    }

    /// Create a fetcher with custom configuration
    pub fn with_config(config: &HttpFetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| FetcherError::client_build(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    type Body = HttpBody;

    #[instrument(name = "http_fetcher_open", skip(self))]
    async fn open(&self, target: &str) -> std::result::Result<HttpBody, FetchError> {
        let url =
            Url::parse(target).map_err(|e| FetchError::invalid_target(target, e.to_string()))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::request(target, error_chain(&e)))?;

        debug!(status = response.status().as_u16(), "Response headers received");

        Ok(HttpBody {
            target: target.to_string(),
            response,
        })
    }
}

/// Streaming body of an HTTP response
pub struct HttpBody {
    target: String,
    response: Response,
}

impl FetchBody for HttpBody {
    async fn next_chunk(&mut self) -> std::result::Result<Option<Bytes>, FetchError> {
        self.response
            .chunk()
            .await
            .map_err(|e| FetchError::body(&self.target, error_chain(&e)))
    }
}

/// Render an error with all of its sources, innermost last
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn drain(mut body: HttpBody) -> std::result::Result<u64, FetchError> {
        let mut total = 0u64;
        while let Some(chunk) = body.next_chunk().await? {
            total += chunk.len() as u64;
        }
        Ok(total)
    }

    #[tokio::test]
    async fn test_fetch_counts_body_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(4096)))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let body = fetcher
            .open(&format!("{}/page", server.uri()))
            .await
            .unwrap();
        assert_eq!(drain(body).await.unwrap(), 4096);
    }

    #[tokio::test]
    async fn test_error_status_still_counts_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let body = fetcher.open(&server.uri()).await.unwrap();
        assert_eq!(drain(body).await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_invalid_target() {
        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher.open("not a url").await.err().unwrap();
        assert!(matches!(err, FetchError::InvalidTarget { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_target() {
        // Bind then drop a listener to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher
            .open(&format!("http://{addr}/"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, FetchError::Request { .. }));
    }
}
