//! Property-based tests using proptest
//!
//! These tests check provider ordering, the outcome of a fetch cycle for
//! arbitrary provider behavior, and task list bookkeeping against randomized
//! inputs.

mod common;

use common::{text_provider, Reply, ScriptedTransport};
use fetchboard::fetch::{
    FetchOptions, FetchOutcome, Orchestrator, ProviderId, Resource, ValueSource,
};
use fetchboard::tasks::{MemoryStore, TaskList};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How a scripted provider behaves on its single attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Behavior {
    Succeeds,
    ServerError,
    NetworkError,
    Unparseable,
    TooSlow,
}

impl Behavior {
    fn reply(self, id: &str) -> Reply {
        match self {
            Behavior::Succeeds => Reply::ok(&format!("value from {}", id)),
            Behavior::ServerError => Reply::status(500),
            Behavior::NetworkError => Reply::network(),
            Behavior::Unparseable => Reply::ok("  "),
            Behavior::TooSlow => Reply::ok("late").after(Duration::from_secs(5)),
        }
    }
}

fn arb_behavior() -> impl Strategy<Value = Behavior> {
    prop_oneof![
        Just(Behavior::Succeeds),
        Just(Behavior::ServerError),
        Just(Behavior::NetworkError),
        Just(Behavior::Unparseable),
        Just(Behavior::TooSlow),
    ]
}

/// Providers as (rank, behavior) in declaration order
fn arb_providers() -> impl Strategy<Value = Vec<(Option<u32>, Behavior)>> {
    let rank = prop_oneof![0u32..4, Just(u32::MAX)];
    prop::collection::vec((prop::option::of(rank), arb_behavior()), 0..7)
}

fn provider_id(index: usize) -> String {
    format!("p{}", index)
}

/// Declaration indices in the order providers should be tried
fn expected_order(providers: &[(Option<u32>, Behavior)]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..providers.len()).collect();
    order.sort_by_key(|&i| (providers[i].0.is_none(), providers[i].0));
    order
}

fn build_resource(providers: &[(Option<u32>, Behavior)]) -> Resource<String> {
    Resource::new(
        "prop",
        providers
            .iter()
            .enumerate()
            .map(|(i, (rank, _))| {
                let provider = text_provider(&provider_id(i));
                match rank {
                    Some(rank) => provider.with_rank(*rank),
                    None => provider,
                }
            })
            .collect(),
        "fallback".to_string(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Ranked providers come first in ascending rank; ties and unranked
    /// providers keep declaration order
    #[test]
    fn resource_orders_by_rank(providers in arb_providers()) {
        let resource = build_resource(&providers);
        let actual: Vec<String> = resource
            .providers()
            .iter()
            .map(|p| p.id().to_string())
            .collect();
        let expected: Vec<String> = expected_order(&providers)
            .into_iter()
            .map(provider_id)
            .collect();

        prop_assert_eq!(actual, expected);
    }

    /// The value is the first succeeding provider's in order, or the
    /// fallback; providers after the winner are never contacted
    #[test]
    fn outcome_is_first_success_or_fallback(providers in arb_providers()) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .start_paused(true)
            .build()
            .unwrap();

        let transport = Arc::new(ScriptedTransport::new());
        for (i, (_, behavior)) in providers.iter().enumerate() {
            let id = provider_id(i);
            transport.script(&id, vec![behavior.reply(&id)]);
        }
        let orchestrator = Orchestrator::new(
            transport.clone(),
            FetchOptions::from_millis(1_000).unwrap(),
        );
        let resource = build_resource(&providers);

        let outcome = runtime.block_on(orchestrator.fetch_resource(
            &resource,
            orchestrator.options(),
            &CancellationToken::new(),
        )).unwrap();
        let state = orchestrator.snapshot(&resource).unwrap();

        let order = expected_order(&providers);
        let winner = order
            .iter()
            .position(|&i| providers[i].1 == Behavior::Succeeds);

        prop_assert!(!state.loading);
        prop_assert_eq!(state.revision, 1);
        match winner {
            Some(position) => {
                let id = provider_id(order[position]);
                prop_assert_eq!(outcome, FetchOutcome::Succeeded(ProviderId::new(id.clone())));
                prop_assert_eq!(&state.value, &format!("value from {}", id));
                prop_assert!(state.error.is_none());
                let contacted: Vec<String> =
                    order[..=position].iter().map(|&i| provider_id(i)).collect();
                prop_assert_eq!(transport.calls(), contacted);
            }
            None => {
                prop_assert_eq!(outcome, FetchOutcome::FallbackUsed);
                prop_assert_eq!(&state.value, "fallback");
                prop_assert_eq!(&state.source, &ValueSource::Fallback);
                let error = state.error.unwrap();
                prop_assert_eq!(error.failures.len(), providers.len());
                let failed: Vec<String> =
                    error.failures.iter().map(|f| f.provider.to_string()).collect();
                let all: Vec<String> = order.iter().map(|&i| provider_id(i)).collect();
                prop_assert_eq!(failed, all);
            }
        }
    }

    /// Adding keeps every non-blank text in order, ids stay unique
    #[test]
    fn add_task_keeps_non_blank_text(texts in prop::collection::vec("[ a-z]{0,12}", 0..20)) {
        let store = Arc::new(MemoryStore::new());
        let mut list = TaskList::load(store.clone(), "tasks").unwrap();

        for text in &texts {
            let added = list.add_task(text).unwrap();
            prop_assert_eq!(added.is_some(), !text.trim().is_empty());
        }

        let expected: Vec<&str> = texts
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        let actual: Vec<&str> = list.tasks().iter().map(|t| t.text.as_str()).collect();
        prop_assert_eq!(&actual, &expected);

        let mut ids: Vec<&str> = list.tasks().iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), expected.len());
        prop_assert!(list.tasks().iter().all(|t| !t.complete));

        let reloaded = TaskList::load(store, "tasks").unwrap();
        prop_assert_eq!(reloaded.tasks(), list.tasks());
    }

    /// Toggling twice is a no-op; removing drops exactly one task
    #[test]
    fn toggle_and_remove_touch_only_their_task(
        count in 1usize..10,
        pick in any::<prop::sample::Index>(),
    ) {
        let mut list = TaskList::load(Arc::new(MemoryStore::new()), "tasks").unwrap();
        for i in 0..count {
            list.add_task(&format!("task {}", i)).unwrap();
        }
        let before = list.tasks().to_vec();
        let target = before[pick.index(count)].id.clone();

        prop_assert!(list.toggle_task(&target).unwrap());
        prop_assert!(list.get(&target).unwrap().complete);
        prop_assert!(list.toggle_task(&target).unwrap());
        prop_assert_eq!(list.tasks(), before.as_slice());

        prop_assert!(!list.toggle_task("no-such-id").unwrap());
        prop_assert!(list.remove_task(&target).unwrap());
        prop_assert!(!list.remove_task(&target).unwrap());
        prop_assert_eq!(list.tasks().len(), count - 1);
        prop_assert!(list.get(&target).is_none());
    }
}
