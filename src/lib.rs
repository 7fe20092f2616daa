//! fetchboard
//!
//! Dashboard widgets that never leave the user without something to look
//! at. Each widget's data comes from a list of public APIs tried in order,
//! each attempt under a deadline; if every one fails the widget shows a
//! static fallback. Next to the widgets lives a small persisted task list.
//!
//! # Module Structure
//!
//! - [`fetch`] - Resources, providers and the fetch orchestrator
//! - [`widgets`] - Catalog of ready-made widget resources
//! - [`tasks`] - Task list and its stores
//! - [`config`] - Persistent user configuration

pub mod config;
pub mod fetch;
pub mod tasks;
pub mod widgets;

pub use config::Config;
pub use fetch::{
    ExhaustedError, FetchError, FetchOptions, FetchOutcome, Orchestrator, Provider, ProviderId,
    RequestDescriptor, Resource, ResourceState, Subscription, ValueSource,
};
pub use tasks::{JsonFileStore, MemoryStore, Task, TaskList, TaskStore};
pub use widgets::{WidgetKind, WidgetReport};
