//! Serving strategies.
//!
//! Each strategy turns one intercepted `GET` into a [`Served`] response or a
//! [`FetchError`]. Lookups never fail a request: a store error is logged and
//! treated as a miss. Writes are spawned on the [`OffloadManager`] and never
//! awaited by the request.

mod cache_first;
mod network_first;
mod network_only;
mod stale_while_revalidate;

use std::sync::Arc;

use outpost_core::{CacheEntry, CacheKey, FetchResult, Fetcher, RequestDescriptor, Response, Served};
use outpost_store::{CacheGeneration, CacheStore};
use tracing::{debug, warn};
use url::Url;

use crate::offload::OffloadManager;
use crate::route::Strategy;

/// Everything a strategy needs to serve one request.
pub(crate) struct Context<'a, S, F>
where
    S: CacheStore,
    F: Fetcher + ?Sized,
{
    pub store: &'a S,
    pub generation: &'a S::Generation,
    pub fetcher: &'a Arc<F>,
    pub offload: &'a OffloadManager,
    pub fallbacks: &'a [Url],
    pub cache_opaque_responses: bool,
}

impl<S, F> Context<'_, S, F>
where
    S: CacheStore,
    F: Fetcher + ?Sized + 'static,
{
    /// Runs `strategy` for `request`.
    pub(crate) async fn serve(
        &self,
        strategy: Strategy,
        request: &RequestDescriptor,
    ) -> FetchResult<Served> {
        match strategy {
            Strategy::NetworkFirst => network_first::serve(self, request).await,
            Strategy::StaleWhileRevalidate => stale_while_revalidate::serve(self, request).await,
            Strategy::CacheFirst => cache_first::serve(self, request).await,
            Strategy::NetworkOnly => network_only::serve(self, request).await,
        }
    }

    /// Looks `key` up in the worker's own generation, then across every
    /// other generation, oldest first.
    async fn lookup(&self, key: &CacheKey) -> Option<Served> {
        match self.generation.lookup(key).await {
            Ok(Some(entry)) => {
                debug!(%key, generation = self.generation.name(), "Cache hit");
                return Some(Served::cache(entry.into_response(), self.generation.name()));
            }
            Ok(None) => {}
            Err(error) => {
                warn!(%key, %error, "Cache lookup failed, treating as miss");
                return None;
            }
        }
        match self.store.match_any(key).await {
            Ok(Some((generation, entry))) => {
                debug!(%key, %generation, "Cache hit");
                Some(Served::cache(entry.into_response(), generation))
            }
            Ok(None) => {
                debug!(%key, "Cache miss");
                None
            }
            Err(error) => {
                warn!(%key, %error, "Cache lookup failed, treating as miss");
                None
            }
        }
    }

    /// Stores a snapshot of `response` under `key` without waiting for it.
    fn store_in_background(&self, key: CacheKey, response: &Response) {
        if !response.is_cacheable(self.cache_opaque_responses) {
            debug!(%key, status = %response.status(), kind = response.kind().as_str(), "Response not cacheable");
            return;
        }
        let generation = self.generation.clone();
        let entry = CacheEntry::new(response.snapshot());
        self.offload.spawn("store", async move {
            if let Err(error) = generation.put(&key, entry).await {
                warn!(%key, generation = generation.name(), %error, "Background write failed");
            }
        });
    }
}
