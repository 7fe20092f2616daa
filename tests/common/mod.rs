//! Shared helpers for integration tests
//!
//! `ScriptedTransport` answers provider requests from a per-URL queue of
//! canned replies, optionally after a delay, and records every request it
//! was asked to send.

#![allow(dead_code)]

use fetchboard::fetch::{FetchError, Provider, RequestDescriptor, Transport};
use futures::future::BoxFuture;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Reply {
    delay: Duration,
    result: Result<String, FetchError>,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(body.to_string()),
        }
    }

    pub fn status(code: u16) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(FetchError::Status(code)),
        }
    }

    pub fn network() -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(FetchError::Network("connection refused".to_string())),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies for a provider. The last queued reply repeats.
    pub fn script(&self, provider_id: &str, replies: Vec<Reply>) {
        self.replies
            .lock()
            .unwrap()
            .insert(url_for(provider_id), replies.into());
    }

    /// Provider ids in the order their requests were issued
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|url| {
                url.trim_start_matches("https://")
                    .trim_end_matches(".test/")
                    .to_string()
            })
            .collect()
    }

    fn next_reply(&self, url: &str) -> Reply {
        let mut replies = self.replies.lock().unwrap();
        match replies.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if queue.len() == 1 => queue[0].clone(),
            _ => Reply::status(404),
        }
    }
}

impl Transport for ScriptedTransport {
    fn execute<'a>(
        &'a self,
        request: &'a RequestDescriptor,
    ) -> BoxFuture<'a, Result<String, FetchError>> {
        let url = request.url.to_string();
        let reply = self.next_reply(&url);
        self.calls.lock().unwrap().push(url);

        Box::pin(async move {
            if !reply.delay.is_zero() {
                tokio::time::sleep(reply.delay).await;
            }
            reply.result
        })
    }
}

pub fn url_for(provider_id: &str) -> String {
    format!("https://{}.test/", provider_id)
}

/// Text provider at `https://<id>.test/` that accepts any non-blank body
pub fn text_provider(id: &str) -> Provider<String> {
    Provider::text(id, RequestDescriptor::get(&url_for(id)).unwrap(), |body| {
        let body = body.trim();
        (!body.is_empty()).then(|| body.to_string())
    })
}
