//! Simple in-memory test store implementation using DashMap.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use http::StatusCode;
use outpost_core::{
    CacheEntry, CacheKey, FetchError, FetchResult, Fetcher, RequestDescriptor, Response,
    ResponseType,
};
use outpost_store::{CacheGeneration, CacheStore, DeleteStatus, StoreResult};
use smol_str::SmolStr;
use url::Url;

/// In-memory generation for testing.
#[derive(Clone)]
pub struct TestGeneration {
    name: SmolStr,
    entries: Arc<DashMap<CacheKey, CacheEntry>>,
}

#[async_trait]
impl CacheGeneration for TestGeneration {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, key: &CacheKey) -> StoreResult<Option<CacheEntry>> {
        Ok(self.entries.get(key).map(|v| v.clone()))
    }

    async fn put(&self, key: &CacheKey, entry: CacheEntry) -> StoreResult<()> {
        self.entries.insert(key.clone(), entry);
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> StoreResult<DeleteStatus> {
        Ok(match self.entries.remove(key) {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }

    async fn keys(&self) -> StoreResult<Vec<CacheKey>> {
        Ok(self.entries.iter().map(|e| e.key().clone()).collect())
    }
}

/// In-memory store for testing; generations are ordered by creation.
#[derive(Clone, Default)]
pub struct TestStore {
    generations: Arc<DashMap<SmolStr, (usize, TestGeneration)>>,
    counter: Arc<AtomicUsize>,
}

impl TestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for TestStore {
    type Generation = TestGeneration;

    async fn open(&self, name: &str) -> StoreResult<TestGeneration> {
        let entry = self.generations.entry(SmolStr::new(name)).or_insert_with(|| {
            let order = self.counter.fetch_add(1, Ordering::Relaxed);
            (
                order,
                TestGeneration {
                    name: SmolStr::new(name),
                    entries: Arc::new(DashMap::new()),
                },
            )
        });
        Ok(entry.1.clone())
    }

    async fn generation(&self, name: &str) -> StoreResult<Option<TestGeneration>> {
        Ok(self.generations.get(name).map(|e| e.1.clone()))
    }

    async fn generations(&self) -> StoreResult<Vec<SmolStr>> {
        let mut names: Vec<_> = self
            .generations
            .iter()
            .map(|e| (e.0, e.key().clone()))
            .collect();
        names.sort();
        Ok(names.into_iter().map(|(_, name)| name).collect())
    }

    async fn delete(&self, name: &str) -> StoreResult<bool> {
        Ok(self.generations.remove(name).is_some())
    }
}

/// What the scripted fetcher answers for a URL.
#[derive(Clone)]
pub enum Script {
    Respond(StatusCode, &'static str),
    Opaque(&'static str),
    Fail,
}

/// Fetcher answering from a fixed script; unknown URLs fail.
#[derive(Clone, Default)]
pub struct ScriptedFetcher {
    script: HashMap<Url, Script>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &Url, status: StatusCode, body: &'static str) -> Self {
        self.script.insert(url.clone(), Script::Respond(status, body));
        self
    }

    pub fn respond_opaque(mut self, url: &Url, body: &'static str) -> Self {
        self.script.insert(url.clone(), Script::Opaque(body));
        self
    }

    pub fn fail(mut self, url: &Url) -> Self {
        self.script.insert(url.clone(), Script::Fail);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &RequestDescriptor) -> FetchResult<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.get(request.url()) {
            Some(Script::Respond(status, body)) => Ok(Response::new(*status, *body)),
            Some(Script::Opaque(body)) => {
                Ok(Response::ok(*body).with_kind(ResponseType::Opaque))
            }
            Some(Script::Fail) | None => Err(FetchError::network(
                request.url(),
                std::io::Error::other("connection refused"),
            )),
        }
    }
}
