//! Resilient Fetch Orchestrator
//!
//! Resolves a [`Resource`] by trying its providers one after another, each
//! under its own deadline, and settles on the fallback value when every
//! provider fails.
//!
//! Every resource has one state slot. Starting a fetch cycle bumps the slot's
//! generation and cancels the previous cycle's token; a cycle may only write
//! its terminal state while its generation is still current, and the check
//! and the write happen under the same lock. A superseded or torn-down cycle
//! therefore never overwrites newer state.

use super::error::{ExhaustedError, FetchError, OrchestratorError, ProviderFailure};
use super::provider::{Provider, ProviderId};
use super::resource::{Resource, ResourceState};
use super::transport::{HttpTransport, Transport};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Per-attempt timeout used when neither the options nor the provider set one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Options for one fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    timeout: Duration,
}

impl FetchOptions {
    pub fn with_timeout(timeout: Duration) -> Result<Self, OrchestratorError> {
        if timeout.is_zero() {
            return Err(OrchestratorError::ZeroTimeout);
        }
        Ok(Self { timeout })
    }

    pub fn from_millis(timeout_ms: u64) -> Result<Self, OrchestratorError> {
        Self::with_timeout(Duration::from_millis(timeout_ms))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// How a fetch cycle ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A provider produced a value
    Succeeded(ProviderId),
    /// Every provider failed; the fallback value was written
    FallbackUsed,
    /// Superseded or torn down; nothing was written
    Cancelled,
}

#[derive(Default)]
struct Cycle {
    generation: u64,
    token: Option<CancellationToken>,
}

struct Slot<T> {
    state: watch::Sender<ResourceState<T>>,
    cycle: Mutex<Cycle>,
}

impl<T> Slot<T> {
    fn new(initial: ResourceState<T>) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            state,
            cycle: Mutex::new(Cycle::default()),
        }
    }

    /// Start a new cycle, cancelling whichever one is outstanding
    fn begin(&self, scope: &CancellationToken) -> (u64, CancellationToken) {
        let mut cycle = lock(&self.cycle);
        if let Some(previous) = cycle.token.take() {
            previous.cancel();
        }
        cycle.generation += 1;

        let token = scope.child_token();
        cycle.token = Some(token.clone());
        self.state.send_modify(ResourceState::begin_cycle);

        (cycle.generation, token)
    }

    /// Apply a terminal write if `generation` is still the current cycle.
    /// Returns false when the cycle was superseded or cancelled.
    fn finish<F>(&self, generation: u64, token: &CancellationToken, write: F) -> bool
    where
        F: FnOnce(&mut ResourceState<T>),
    {
        let mut cycle = lock(&self.cycle);
        if cycle.generation != generation || token.is_cancelled() {
            return false;
        }

        self.state.send_modify(write);
        cycle.token = None;
        true
    }
}

/// Type-erased view of a slot, so slots of different value types share a map
trait ErasedSlot: Send + Sync {
    /// Cancel the outstanding cycle and refuse its late writes
    fn invalidate(&self);

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Send + Sync + 'static> ErasedSlot for Slot<T> {
    fn invalidate(&self) {
        let mut cycle = lock(&self.cycle);
        cycle.generation += 1;
        if let Some(token) = cycle.token.take() {
            token.cancel();
        }
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn millis(duration: Duration) -> u64 {
    duration.as_millis().min(u128::from(u64::MAX)) as u64
}

/// Read handle on a resource's state
pub struct Subscription<T> {
    receiver: watch::Receiver<ResourceState<T>>,
}

impl<T: Clone> Subscription<T> {
    /// Latest snapshot
    pub fn current(&self) -> ResourceState<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change. `None` once the resource has been released
    /// and no cycle holds it anymore.
    pub async fn changed(&mut self) -> Option<ResourceState<T>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Wait until no cycle is loading
    pub async fn settled(&mut self) -> Option<ResourceState<T>> {
        let state = self.receiver.wait_for(|state| !state.loading).await.ok()?;
        Some(state.clone())
    }
}

struct Inner {
    transport: Arc<dyn Transport>,
    options: FetchOptions,
    slots: Mutex<HashMap<String, Arc<dyn ErasedSlot>>>,
    root: CancellationToken,
}

/// Owns the state of every resource it has been asked about.
///
/// Cloning is cheap; clones share slots and the root cancellation scope.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl Orchestrator {
    pub fn new(transport: Arc<dyn Transport>, options: FetchOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                options,
                slots: Mutex::new(HashMap::new()),
                root: CancellationToken::new(),
            }),
        }
    }

    /// Orchestrator on the default reqwest transport
    pub fn with_http(options: FetchOptions) -> anyhow::Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new()?), options))
    }

    pub fn options(&self) -> FetchOptions {
        self.inner.options
    }

    fn slot<T>(&self, resource: &Resource<T>) -> Result<Arc<Slot<T>>, OrchestratorError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let mut slots = lock(&self.inner.slots);
        if let Some(existing) = slots.get(resource.name()) {
            return Arc::clone(existing)
                .into_any()
                .downcast::<Slot<T>>()
                .map_err(|_| OrchestratorError::TypeMismatch {
                    resource: resource.name().to_string(),
                });
        }

        let slot = Arc::new(Slot::new(ResourceState::initial(resource)));
        slots.insert(
            resource.name().to_string(),
            Arc::clone(&slot) as Arc<dyn ErasedSlot>,
        );
        Ok(slot)
    }

    /// Current snapshot plus change notifications
    pub fn subscribe<T>(&self, resource: &Resource<T>) -> Result<Subscription<T>, OrchestratorError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let slot = self.slot(resource)?;
        Ok(Subscription {
            receiver: slot.state.subscribe(),
        })
    }

    /// Latest state without keeping a subscription
    pub fn snapshot<T>(&self, resource: &Resource<T>) -> Result<ResourceState<T>, OrchestratorError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let slot = self.slot(resource)?;
        let state = slot.state.borrow().clone();
        Ok(state)
    }

    /// Run one fetch cycle to completion under the caller's cancellation
    /// scope. Supersedes any cycle already running for this resource.
    pub async fn fetch_resource<T>(
        &self,
        resource: &Resource<T>,
        options: FetchOptions,
        cancel: &CancellationToken,
    ) -> Result<FetchOutcome, OrchestratorError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let slot = self.slot(resource)?;
        let (generation, token) = slot.begin(cancel);
        Ok(self
            .run_cycle(&slot, resource, options, generation, &token)
            .await)
    }

    /// Start a new cycle in the background under the orchestrator's own
    /// scope. The cycle is registered before this returns, so of two
    /// back-to-back refreshes the later one always wins.
    pub fn refresh<T>(
        &self,
        resource: &Resource<T>,
    ) -> Result<JoinHandle<FetchOutcome>, OrchestratorError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let slot = self.slot(resource)?;
        let (generation, token) = slot.begin(&self.inner.root);

        let orchestrator = self.clone();
        let resource = resource.clone();
        let options = self.inner.options;
        Ok(tokio::spawn(async move {
            orchestrator
                .run_cycle(&slot, &resource, options, generation, &token)
                .await
        }))
    }

    /// Drop a resource's state. An outstanding cycle is cancelled and can no
    /// longer write. Returns false if the resource was never registered.
    pub fn release(&self, name: &str) -> bool {
        let removed = lock(&self.inner.slots).remove(name);
        match removed {
            Some(slot) => {
                slot.invalidate();
                tracing::debug!("Released resource '{}'", name);
                true
            }
            None => false,
        }
    }

    /// Cancel every outstanding cycle and drop all resource state. Open
    /// subscriptions end once their last cycle has unwound. Refreshes started
    /// afterwards end as cancelled immediately.
    pub fn shutdown(&self) {
        self.inner.root.cancel();
        let slots: Vec<_> = lock(&self.inner.slots).drain().collect();
        for (_, slot) in &slots {
            slot.invalidate();
        }
        tracing::info!("Orchestrator shut down, released {} resource(s)", slots.len());
    }

    async fn run_cycle<T>(
        &self,
        slot: &Slot<T>,
        resource: &Resource<T>,
        options: FetchOptions,
        generation: u64,
        token: &CancellationToken,
    ) -> FetchOutcome
    where
        T: Clone,
    {
        let mut failures = Vec::new();

        for (index, provider) in resource.providers().iter().enumerate() {
            let timeout = provider.request().timeout.unwrap_or(options.timeout());
            tracing::debug!(
                "Fetching '{}' via {} (attempt {}/{}, timeout {} ms)",
                resource.name(),
                provider.id(),
                index + 1,
                resource.providers().len(),
                millis(timeout)
            );

            match self.attempt(provider, timeout, token).await {
                Ok(value) => {
                    let id = provider.id().clone();
                    let source = id.clone();
                    if !slot.finish(generation, token, move |state| state.succeed(value, source)) {
                        return cancelled(resource.name());
                    }
                    tracing::info!("Resolved '{}' from {}", resource.name(), id);
                    return FetchOutcome::Succeeded(id);
                }
                Err(error) if !error.is_recoverable() => return cancelled(resource.name()),
                Err(error) => {
                    tracing::warn!(
                        "Provider {} failed for '{}': {}",
                        provider.id(),
                        resource.name(),
                        error
                    );
                    failures.push(ProviderFailure {
                        provider: provider.id().clone(),
                        error,
                    });
                }
            }
        }

        let error = ExhaustedError {
            resource: resource.name().to_string(),
            failures,
        };
        let summary = error.to_string();

        let fallback = resource.fallback().clone();
        if slot.finish(generation, token, move |state| state.fall_back(fallback, error)) {
            tracing::info!("Using fallback for '{}': {}", resource.name(), summary);
            FetchOutcome::FallbackUsed
        } else {
            cancelled(resource.name())
        }
    }

    async fn attempt<T>(
        &self,
        provider: &Provider<T>,
        timeout: Duration,
        token: &CancellationToken,
    ) -> Result<T, FetchError> {
        if token.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let request = self.inner.transport.execute(provider.request());
        let body = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(FetchError::Cancelled),
            result = tokio::time::timeout(timeout, request) => match result {
                Ok(body) => body?,
                Err(_) => {
                    return Err(FetchError::Timeout {
                        timeout_ms: millis(timeout),
                    })
                }
            },
        };

        provider.parse(&body)
    }
}

fn cancelled(resource: &str) -> FetchOutcome {
    tracing::debug!("Fetch cycle for '{}' cancelled", resource);
    FetchOutcome::Cancelled
}
