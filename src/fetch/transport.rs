//! HTTP transport for provider requests
//!
//! The orchestrator talks to the network only through [`Transport`], so
//! tests can script responses without a server.

use super::error::FetchError;
use super::provider::{HttpMethod, RequestDescriptor};
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use reqwest::Client;

/// Maximum length of response body to log
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sends a provider request and returns the raw response body.
///
/// Implementations must not apply their own retry or fallback; a returned
/// future is dropped when the attempt times out or is cancelled, and that
/// drop must abort the underlying request.
pub trait Transport: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: &'a RequestDescriptor,
    ) -> BoxFuture<'a, Result<String, FetchError>>;
}

/// Truncate long bodies and strip control characters before logging
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("fetchboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    async fn send(&self, request: &RequestDescriptor) -> Result<String, FetchError> {
        tracing::debug!("{} {}", request.method.as_str(), request.url);

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(request.url.clone()),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            tracing::warn!(
                "Provider error: {} {} - {}",
                status,
                request.url,
                sanitize_for_log(&body)
            );
            return Err(FetchError::Status(status.as_u16()));
        }

        tracing::trace!("Response from {}: {}", request.url, sanitize_for_log(&body));
        Ok(body)
    }
}

impl Transport for HttpTransport {
    fn execute<'a>(
        &'a self,
        request: &'a RequestDescriptor,
    ) -> BoxFuture<'a, Result<String, FetchError>> {
        Box::pin(self.send(request))
    }
}
