//! HTTP transport used by the flight data client
//!
//! The client only needs two shapes of request: an authenticated GET with a
//! query string and an unauthenticated form POST for the token exchange.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tracing::debug;

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new<S: Into<String>>(status: u16, body: S) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Blocking HTTP transport.
///
/// An `Err` means no response was received at all (connection refused,
/// timeout, ...). Any status code, including errors, is an `Ok`.
pub trait HttpTransport: Send + Sync {
    /// GET `url` with `query` appended and a bearer `Authorization` header
    fn get(&self, url: &str, query: &[(&str, String)], bearer_token: &str) -> Result<HttpResponse>;

    /// POST `form` as `application/x-www-form-urlencoded`
    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<HttpResponse>;
}

/// Transport backed by the reqwest blocking client
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("MeetPoint/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;
        Ok(Self { client })
    }

    fn read(response: reqwest::blocking::Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .with_context(|| format!("Failed to read response body (status {status})"))?;
        debug!("HTTP response received: {} ({} bytes)", status, body.len());
        Ok(HttpResponse { status, body })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str, query: &[(&str, String)], bearer_token: &str) -> Result<HttpResponse> {
        debug!("GET {} {:?}", url, query);
        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(bearer_token)
            .send()
            .with_context(|| format!("GET {url} failed"))?;
        Self::read(response)
    }

    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<HttpResponse> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .with_context(|| format!("POST {url} failed"))?;
        Self::read(response)
    }
}
