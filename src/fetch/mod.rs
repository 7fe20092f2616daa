//! Resilient multi-provider fetching
//!
//! A [`Resource`] is a logical data need ("activity", "dog image") backed by
//! an ordered list of [`Provider`]s and a static fallback value. The
//! [`Orchestrator`] resolves resources into a [`ResourceState`] that always
//! holds something renderable.
//!
//! # Architecture
//!
//! - [`provider`] - Provider identity, request descriptors, response parsers
//! - [`resource`] - Resources and the observable per-resource state
//! - [`transport`] - The network seam, with a reqwest implementation
//! - [`orchestrator`] - Ordering, deadlines, supersession, fallback
//! - [`error`] - Failure taxonomy
//!
//! # Example
//!
//! ```ignore
//! use fetchboard::fetch::{FetchOptions, Orchestrator};
//! use fetchboard::widgets;
//!
//! async fn show_activity() -> anyhow::Result<()> {
//!     let orchestrator = Orchestrator::with_http(FetchOptions::default())?;
//!     let activity = widgets::activity::resource()?;
//!     let mut subscription = orchestrator.subscribe(&activity)?;
//!     orchestrator.refresh(&activity)?;
//!     if let Some(state) = subscription.settled().await {
//!         println!("{} (from {})", state.value, state.source);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod orchestrator;
pub mod provider;
pub mod resource;
pub mod transport;

pub use error::{ExhaustedError, FetchError, OrchestratorError, ProviderFailure};
pub use orchestrator::{FetchOptions, FetchOutcome, Orchestrator, Subscription, DEFAULT_TIMEOUT};
pub use provider::{HttpMethod, InvalidUrl, Provider, ProviderId, RequestDescriptor};
pub use resource::{Resource, ResourceState, ValueSource};
pub use transport::{HttpTransport, Transport};
