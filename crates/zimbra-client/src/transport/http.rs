//! `reqwest`-backed transport.

use super::{HttpRequest, HttpResponse, Method, Transport};
use crate::error::TransportError;
use reqwest::Client;
use std::time::Duration;

/// Default transport over a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    http_client: Client,
}

impl HttpTransport {
    /// Creates a transport with default client settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport from a preconfigured client.
    #[must_use]
    pub const fn from_client(http_client: Client) -> Self {
        Self { http_client }
    }

    /// Creates a transport with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self { http_client })
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = match method {
            Method::Get => self.http_client.get(url),
            Method::Post => self.http_client.post(url).body(body),
        };
        for (name, value) in headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { status, body })
    }
}
