//! Fetch error taxonomy
//!
//! Per-attempt failures are recovered by moving on to the next provider.
//! Only total exhaustion is recorded on the resource state, and it always
//! travels alongside a usable fallback value.

use super::provider::ProviderId;
use std::fmt;
use thiserror::Error;

/// Why a single provider attempt did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, TLS, body read)
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with a non-success HTTP status
    #[error("provider returned HTTP {0}")]
    Status(u16),

    /// The per-attempt deadline elapsed before a response arrived
    #[error("timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// The body was malformed, or the parser found no usable value in it
    #[error("parse error: {0}")]
    Parse(String),

    /// Superseded by a newer fetch or torn down by the caller's scope
    #[error("cancelled")]
    Cancelled,
}

impl FetchError {
    /// Whether this failure moves the cycle on to the next provider.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// One provider's failure within a fetch cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub provider: ProviderId,
    pub error: FetchError,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.error)
    }
}

/// Every provider for a resource failed; the fallback value was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExhaustedError {
    pub resource: String,
    pub failures: Vec<ProviderFailure>,
}

impl ExhaustedError {
    /// Short description for display next to a fallback value
    pub fn summary(&self) -> String {
        match self.failures.len() {
            0 => format!("no providers configured for '{}'", self.resource),
            1 => format!("provider for '{}' failed", self.resource),
            n => format!("all {} providers for '{}' failed", n, self.resource),
        }
    }
}

impl fmt::Display for ExhaustedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())?;
        for failure in &self.failures {
            write!(f, "; {}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExhaustedError {}

/// Misuse of the orchestrator API. Never produced by provider behavior.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error("fetch timeout must be greater than zero")]
    ZeroTimeout,
    #[error("resource '{resource}' is already registered with a different value type")]
    TypeMismatch { resource: String },
}
