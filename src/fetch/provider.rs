//! Providers
//!
//! A provider is one concrete data source for a resource: where to send the
//! request and how to turn the response body into a normalized value.

use super::error::FetchError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Identifier of a provider, reported as the source of a resolved value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProviderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// HTTP methods a provider may use. Only GET is needed today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
        }
    }
}

/// Rejected provider URL
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidUrl {
    #[error("invalid provider url '{url}': {reason}")]
    Malformed { url: String, reason: String },
    #[error("unsupported scheme '{scheme}' in provider url '{url}'")]
    UnsupportedScheme { url: String, scheme: String },
}

/// Where and how to send a provider's request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub url: Url,
    pub method: HttpMethod,
    pub headers: BTreeMap<String, String>,
    /// Overrides the fetch options' per-attempt timeout for this provider
    pub timeout: Option<Duration>,
}

impl RequestDescriptor {
    /// Build a GET descriptor, validating the URL up front
    pub fn get(url: &str) -> Result<Self, InvalidUrl> {
        let parsed = Url::parse(url).map_err(|e| InvalidUrl::Malformed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(InvalidUrl::UnsupportedScheme {
                    url: url.to_string(),
                    scheme: other.to_string(),
                })
            }
        }

        Ok(Self {
            url: parsed,
            method: HttpMethod::Get,
            headers: BTreeMap::new(),
            timeout: None,
        })
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

type ParseFn<T> = Arc<dyn Fn(&str) -> Result<T, FetchError> + Send + Sync>;

/// One data source for a resource producing values of type `T`
pub struct Provider<T> {
    id: ProviderId,
    request: RequestDescriptor,
    rank: Option<u32>,
    parser: ParseFn<T>,
}

impl<T> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            request: self.request.clone(),
            rank: self.rank,
            parser: Arc::clone(&self.parser),
        }
    }
}

impl<T> fmt::Debug for Provider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("id", &self.id)
            .field("url", &self.request.url.as_str())
            .field("rank", &self.rank)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Provider<T> {
    /// Provider whose body is JSON.
    ///
    /// A body that does not decode as JSON is a parse failure. The parser
    /// returns `None` when the document is well formed but carries no usable
    /// value; that is treated the same as any other provider failure.
    pub fn json<F>(id: impl Into<ProviderId>, request: RequestDescriptor, parser: F) -> Self
    where
        F: Fn(&Value) -> Option<T> + Send + Sync + 'static,
    {
        let parser: ParseFn<T> = Arc::new(move |body: &str| {
            let document: Value = serde_json::from_str(body)
                .map_err(|e| FetchError::Parse(format!("invalid JSON: {}", e)))?;
            parser(&document).ok_or_else(|| FetchError::Parse("no value in response".to_string()))
        });

        Self {
            id: id.into(),
            request,
            rank: None,
            parser,
        }
    }

    /// Provider whose body is plain text
    pub fn text<F>(id: impl Into<ProviderId>, request: RequestDescriptor, parser: F) -> Self
    where
        F: Fn(&str) -> Option<T> + Send + Sync + 'static,
    {
        let parser: ParseFn<T> = Arc::new(move |body: &str| {
            parser(body).ok_or_else(|| FetchError::Parse("no value in response".to_string()))
        });

        Self {
            id: id.into(),
            request,
            rank: None,
            parser,
        }
    }
}

impl<T> Provider<T> {
    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn id(&self) -> &ProviderId {
        &self.id
    }

    pub fn request(&self) -> &RequestDescriptor {
        &self.request
    }

    pub fn rank(&self) -> Option<u32> {
        self.rank
    }

    /// Run the parser over a raw response body
    pub fn parse(&self, body: &str) -> Result<T, FetchError> {
        (self.parser)(body)
    }
}

/// Non-empty trimmed string from a JSON field
pub(crate) fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
