//! Widget catalog
//!
//! Ready-made resources for the dashboard widgets. Each widget has two
//! providers, tried in order, and a static fallback so there is always
//! something to show.
//!
//! - [`activity`] - Bored API activity suggestions
//! - [`cat_fact`] - catfact.ninja, meowfacts
//! - [`dog_image`] - dog.ceo, random.dog
//! - [`bitcoin`] - CoinGecko, CoinDesk
//! - [`weather`] - Open-Meteo, wttr.in
//! - [`anime_quote`] - Animechan

pub mod activity;
pub mod anime_quote;
pub mod bitcoin;
pub mod cat_fact;
pub mod dog_image;
pub mod weather;

use crate::fetch::{FetchOptions, Orchestrator, Resource, ResourceState};
use anyhow::{Context, Result};
use clap::ValueEnum;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// The widgets the catalog knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum WidgetKind {
    Activity,
    CatFact,
    DogImage,
    Bitcoin,
    Weather,
    AnimeQuote,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 6] = [
        Self::Activity,
        Self::CatFact,
        Self::DogImage,
        Self::Bitcoin,
        Self::Weather,
        Self::AnimeQuote,
    ];

    /// Resource name used as the orchestrator key
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activity => activity::NAME,
            Self::CatFact => cat_fact::NAME,
            Self::DogImage => dog_image::NAME,
            Self::Bitcoin => bitcoin::NAME,
            Self::Weather => weather::NAME,
            Self::AnimeQuote => anime_quote::NAME,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Activity => "What to do?",
            Self::CatFact => "Cat fact",
            Self::DogImage => "Dog of the moment",
            Self::Bitcoin => "Bitcoin",
            Self::Weather => "Weather",
            Self::AnimeQuote => "Anime quote",
        }
    }
}

/// A resolved widget flattened for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetReport {
    pub title: String,
    pub value: String,
    pub source: String,
    /// Failure summary when the fallback is shown
    pub error: Option<String>,
}

impl WidgetReport {
    fn from_state<T: fmt::Display>(title: &str, state: &ResourceState<T>) -> Self {
        Self {
            title: title.to_string(),
            value: state.value.to_string(),
            source: state.source.to_string(),
            error: state.error.as_ref().map(|e| e.summary()),
        }
    }
}

impl fmt::Display for WidgetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (via {})", self.title, self.value, self.source)?;
        if let Some(error) = &self.error {
            write!(f, " [{}]", error)?;
        }
        Ok(())
    }
}

/// Run one fetch cycle for `resource` and report the terminal state
pub async fn resolve<T>(
    orchestrator: &Orchestrator,
    title: &str,
    resource: &Resource<T>,
    options: FetchOptions,
    cancel: &CancellationToken,
) -> Result<WidgetReport>
where
    T: Clone + fmt::Display + Send + Sync + 'static,
{
    orchestrator.fetch_resource(resource, options, cancel).await?;
    let state = orchestrator.snapshot(resource)?;
    Ok(WidgetReport::from_state(title, &state))
}

/// Resolve a catalog widget by kind
pub async fn resolve_widget(
    orchestrator: &Orchestrator,
    kind: WidgetKind,
    location: weather::Location,
    cancel: &CancellationToken,
) -> Result<WidgetReport> {
    let options = orchestrator.options();
    let title = kind.title();
    let context = || format!("Invalid provider configuration for {}", kind.as_str());

    match kind {
        WidgetKind::Activity => {
            let resource = activity::resource().with_context(context)?;
            resolve(orchestrator, title, &resource, options, cancel).await
        }
        WidgetKind::CatFact => {
            let resource = cat_fact::resource().with_context(context)?;
            resolve(orchestrator, title, &resource, options, cancel).await
        }
        WidgetKind::DogImage => {
            let resource = dog_image::resource().with_context(context)?;
            resolve(orchestrator, title, &resource, options, cancel).await
        }
        WidgetKind::Bitcoin => {
            let resource = bitcoin::resource().with_context(context)?;
            resolve(orchestrator, title, &resource, options, cancel).await
        }
        WidgetKind::Weather => {
            let resource = weather::resource(location).with_context(context)?;
            resolve(orchestrator, title, &resource, options, cancel).await
        }
        WidgetKind::AnimeQuote => {
            let resource = anime_quote::resource().with_context(context)?;
            resolve(orchestrator, title, &resource, options, cancel).await
        }
    }
}
