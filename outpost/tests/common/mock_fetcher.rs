//! Scripted fetcher for integration tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use http::StatusCode;
use outpost::{FetchError, FetchResult, Fetcher, RequestDescriptor, Response};
use tokio::sync::Notify;
use url::Url;

#[derive(Clone)]
enum Behavior {
    Respond(Response),
    Fail,
    Gated(Arc<Notify>, Response),
}

/// Fetcher whose answers can be changed while a worker uses it.
///
/// Clones share the script and the call log. URLs without a script fail like
/// an unreachable network.
#[derive(Clone, Default)]
pub struct MockFetcher {
    script: Arc<DashMap<Url, Behavior>>,
    calls: Arc<DashMap<Url, usize>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &Url, status: StatusCode, body: &'static str) {
        self.respond_with(url, Response::new(status, body));
    }

    pub fn respond_with(&self, url: &Url, response: Response) {
        self.script.insert(url.clone(), Behavior::Respond(response));
    }

    pub fn fail(&self, url: &Url) {
        self.script.insert(url.clone(), Behavior::Fail);
    }

    /// Holds the response for `url` until the returned gate is opened.
    pub fn gate(&self, url: &Url, status: StatusCode, body: &'static str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.script.insert(
            url.clone(),
            Behavior::Gated(gate.clone(), Response::new(status, body)),
        );
        gate
    }

    /// Makes every URL fail.
    pub fn go_offline(&self) {
        self.script.clear();
    }

    pub fn calls(&self, url: &Url) -> usize {
        self.calls.get(url).map(|c| *c).unwrap_or(0)
    }

    pub fn call_log(&self) -> HashMap<Url, usize> {
        self.calls
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, request: &RequestDescriptor) -> FetchResult<Response> {
        *self.calls.entry(request.url().clone()).or_insert(0) += 1;
        // Clone out of the map before awaiting so no shard lock is held.
        let behavior = self.script.get(request.url()).map(|b| b.value().clone());
        match behavior {
            Some(Behavior::Respond(response)) => Ok(response),
            Some(Behavior::Gated(gate, response)) => {
                gate.notified().await;
                Ok(response)
            }
            Some(Behavior::Fail) | None => Err(FetchError::network(
                request.url(),
                std::io::Error::other("network unreachable"),
            )),
        }
    }
}
