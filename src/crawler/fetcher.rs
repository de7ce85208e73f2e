//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the archiver, including:
//! - Building the shared HTTP client with the identifying user agent
//! - GET requests for pages and images
//! - Streamed GET requests for release downloads
//! - Error classification
//!
//! Every request is a single attempt. There is no retry logic.

use crate::config::HttpConfig;
use crate::FetchError;
use reqwest::{Certificate, Client, ClientBuilder, Response};
use std::future::Future;
use std::time::Duration;

/// A fetched HTML page and the URL it came from
#[derive(Debug, Clone)]
pub struct PageDocument {
    /// URL the page was requested from
    pub url: String,
    /// Raw HTML body
    pub html: String,
}

/// A fetched binary resource (images)
#[derive(Debug, Clone)]
pub struct FetchedResource {
    /// Content-Type header value, if any
    pub content_type: Option<String>,
    /// Response body
    pub body: Vec<u8>,
}

/// Shared HTTP fetcher
///
/// Cloning is cheap; clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    /// Client without a whole-request deadline, for streamed downloads
    download_client: Client,
    /// Deadline for each read of a streamed download
    download_timeout: Duration,
}

/// Builds an HTTP client with proper configuration
///
/// The client trusts the bundled webpki roots plus the optional PEM
/// certificate named by `ca-bundle`.
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(ArchiverError)` - The CA file could not be read or the client could not be built
pub fn build_http_client(config: &HttpConfig) -> Result<Client, crate::ArchiverError> {
    let builder = client_builder(config)?.timeout(Duration::from_secs(config.timeout_secs));
    Ok(builder.build()?)
}

/// Builds the download client
///
/// It carries no whole-request timeout: a large file may stream for longer
/// than any fixed deadline, so each read is bounded instead.
fn build_download_client(config: &HttpConfig) -> Result<Client, crate::ArchiverError> {
    Ok(client_builder(config)?.build()?)
}

fn client_builder(config: &HttpConfig) -> Result<ClientBuilder, crate::ArchiverError> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(Duration::from_secs(10))
        .https_only(config.https_only)
        .gzip(true)
        .brotli(true);

    if let Some(path) = &config.ca_bundle {
        let pem = std::fs::read(path)?;
        builder = builder.add_root_certificate(Certificate::from_pem(&pem)?);
    }

    Ok(builder)
}

impl Fetcher {
    /// Creates a fetcher from HTTP configuration
    pub fn new(config: &HttpConfig) -> Result<Self, crate::ArchiverError> {
        Ok(Self {
            client: build_http_client(config)?,
            download_client: build_download_client(config)?,
            download_timeout: Duration::from_secs(config.download_timeout_secs),
        })
    }

    /// Wraps an existing client, used for pages and downloads alike
    pub fn with_client(client: Client, download_timeout: Duration) -> Self {
        Self {
            download_client: client.clone(),
            client,
            download_timeout,
        }
    }

    /// Fetches an HTML page
    ///
    /// A response whose Content-Type is present but is neither HTML nor text
    /// is reported as `FetchError::NotHtml`.
    pub async fn get_page(&self, url: &str) -> Result<PageDocument, FetchError> {
        let response = self.send(url).await?;

        let content_type = header_content_type(&response);
        if let Some(content_type) = content_type.filter(|ct| !is_html_like(ct)) {
            return Err(FetchError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }

        let html = response.text().await.map_err(|e| classify(url, e))?;
        Ok(PageDocument {
            url: url.to_string(),
            html,
        })
    }

    /// Fetches a resource body in full
    pub async fn get_bytes(&self, url: &str) -> Result<FetchedResource, FetchError> {
        let response = self.send(url).await?;
        let content_type = header_content_type(&response);
        let body = response.bytes().await.map_err(|e| classify(url, e))?;

        Ok(FetchedResource {
            content_type,
            body: body.to_vec(),
        })
    }

    /// Starts a streamed download
    ///
    /// The response headers must arrive within the download timeout. The
    /// caller reads the body with [`Fetcher::next_chunk`], which applies the
    /// same deadline to every read rather than to the whole transfer.
    pub async fn open_download(&self, url: &str) -> Result<Response, FetchError> {
        let response = self
            .within_download_timeout(url, self.download_client.get(url).send())
            .await?
            .map_err(|e| classify(url, e))?;
        check_status(url, response)
    }

    /// Reads the next chunk of a streamed download
    ///
    /// Returns `Ok(None)` once the body is complete.
    pub async fn next_chunk(
        &self,
        url: &str,
        response: &mut Response,
    ) -> Result<Option<Vec<u8>>, FetchError> {
        let chunk = self
            .within_download_timeout(url, response.chunk())
            .await?
            .map_err(|e| classify(url, e))?;
        Ok(chunk.map(|bytes| bytes.to_vec()))
    }

    async fn within_download_timeout<F: Future>(
        &self,
        url: &str,
        future: F,
    ) -> Result<F::Output, FetchError> {
        tokio::time::timeout(self.download_timeout, future)
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
            })
    }

    /// Sends one GET request and rejects non-2xx answers
    async fn send(&self, url: &str) -> Result<Response, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;
        check_status(url, response)
    }
}

/// Rejects non-2xx answers
fn check_status(url: &str, response: Response) -> Result<Response, FetchError> {
    let status = response.status();

    if !status.is_success() {
        tracing::debug!("GET {} answered {}", url, status);
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response)
}

/// Maps a reqwest error onto the fetch error taxonomy
pub fn classify(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}

fn header_content_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Returns true if a Content-Type can be archived as a page
fn is_html_like(content_type: &str) -> bool {
    let ct = content_type.to_ascii_lowercase();
    ct.contains("html") || ct.starts_with("text/")
}
