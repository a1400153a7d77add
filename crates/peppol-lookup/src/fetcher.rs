#![forbid(unsafe_code)]

//! HTTP retrieval of SMP documents.

use crate::model::FetcherResponse;
use peppol_common::LookupError;
use std::time::Duration;

/// Default per-request timeout for [`UrlFetcher`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Retrieves the raw bytes behind a lookup address. The seam for tests
/// and for callers with their own transport.
pub trait MetadataFetcher {
    /// One attempt per call; retry policy belongs to the caller.
    fn fetch(&self, address: &str) -> Result<FetcherResponse, LookupError>;
}

/// [`MetadataFetcher`] over a blocking HTTP client.
pub struct UrlFetcher {
    client: reqwest::blocking::Client,
}

impl UrlFetcher {
    pub fn new() -> Result<Self, LookupError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, LookupError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(std::io::Error::other)?;
        Ok(Self { client })
    }

    /// Use a pre-configured client, e.g. one with proxy settings.
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl MetadataFetcher for UrlFetcher {
    fn fetch(&self, address: &str) -> Result<FetcherResponse, LookupError> {
        log::debug!("fetching SMP document from {address}");
        let wrap = |source: reqwest::Error| LookupError::Fetch {
            address: address.to_owned(),
            source: Box::new(source),
        };

        let response = self.client.get(address).send().map_err(wrap)?;
        let response = response.error_for_status().map_err(wrap)?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().map_err(wrap)?.to_vec();
        Ok(FetcherResponse::new(body, content_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_buffers_body_and_content_type() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/smp/group")
            .with_status(200)
            .with_header("content-type", "text/xml")
            .with_body("<ServiceGroup/>")
            .create();

        let fetcher = UrlFetcher::new().unwrap();
        let response = fetcher.fetch(&format!("{}/smp/group", server.url())).unwrap();
        assert_eq!(response.body(), b"<ServiceGroup/>");
        assert_eq!(response.content_type(), Some("text/xml"));
    }

    #[test]
    fn non_success_status_is_a_fetch_error() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("GET", "/missing").with_status(404).create();

        let fetcher = UrlFetcher::new().unwrap();
        let err = fetcher
            .fetch(&format!("{}/missing", server.url()))
            .unwrap_err();
        match err {
            LookupError::Fetch { address, .. } => assert!(address.ends_with("/missing")),
            other => panic!("expected fetch error, got {other}"),
        }
    }

    #[test]
    fn transport_failure_retains_cause() {
        use std::error::Error as _;
        // Nothing listens on this port.
        let fetcher = UrlFetcher::with_timeout(Duration::from_secs(2)).unwrap();
        let err = fetcher.fetch("http://127.0.0.1:9/smp").unwrap_err();
        match &err {
            LookupError::Fetch { source, .. } => assert!(source.source().is_some() || !source.to_string().is_empty()),
            other => panic!("expected fetch error, got {other}"),
        }
    }
}
