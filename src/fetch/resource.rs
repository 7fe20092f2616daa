//! Resources and their observable state

use super::error::ExhaustedError;
use super::provider::{Provider, ProviderId};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// A named data need, resolved by trying providers in rank order
pub struct Resource<T> {
    name: String,
    providers: Arc<[Provider<T>]>,
    fallback: T,
}

impl<T: Clone> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            providers: Arc::clone(&self.providers),
            fallback: self.fallback.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Resource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("providers", &self.providers)
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl<T> Resource<T> {
    /// Create a resource. Providers are stored in attempt order: ascending
    /// rank, unranked providers last, declaration order kept on ties.
    pub fn new(name: impl Into<String>, providers: Vec<Provider<T>>, fallback: T) -> Self {
        let mut providers = providers;
        providers.sort_by_key(|p| (p.rank().is_none(), p.rank()));

        Self {
            name: name.into(),
            providers: providers.into(),
            fallback,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Providers in the order they are attempted
    pub fn providers(&self) -> &[Provider<T>] {
        &self.providers
    }

    pub fn fallback(&self) -> &T {
        &self.fallback
    }
}

/// Where the current value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    Provider(ProviderId),
    Fallback,
}

impl ValueSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Provider(id) => id.as_str(),
            Self::Fallback => "fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest known result for a resource
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    /// Always renderable: live data or the fallback
    pub value: T,
    pub loading: bool,
    /// Set when the last completed cycle exhausted every provider
    pub error: Option<ExhaustedError>,
    pub source: ValueSource,
    /// Time of the last terminal write
    pub updated_at: Option<DateTime<Utc>>,
    /// Number of terminal writes so far
    pub revision: u64,
}

impl<T: Clone> ResourceState<T> {
    /// Initial state: fallback pre-populated, loading until the first cycle ends
    pub fn initial(resource: &Resource<T>) -> Self {
        Self {
            value: resource.fallback().clone(),
            loading: true,
            error: None,
            source: ValueSource::Fallback,
            updated_at: None,
            revision: 0,
        }
    }
}

impl<T> ResourceState<T> {
    pub(crate) fn begin_cycle(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub(crate) fn succeed(&mut self, value: T, provider: ProviderId) {
        self.value = value;
        self.loading = false;
        self.error = None;
        self.source = ValueSource::Provider(provider);
        self.mark_written();
    }

    pub(crate) fn fall_back(&mut self, fallback: T, error: ExhaustedError) {
        self.value = fallback;
        self.loading = false;
        self.error = Some(error);
        self.source = ValueSource::Fallback;
        self.mark_written();
    }

    fn mark_written(&mut self) {
        self.updated_at = Some(Utc::now());
        self.revision += 1;
    }

    /// Whether a fetch cycle has finished at least once
    pub fn is_settled(&self) -> bool {
        !self.loading && self.revision > 0
    }
}
