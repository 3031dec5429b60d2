use outpost_core::{CacheEntry, FetchResult, Fetcher, RequestDescriptor, Served};
use outpost_store::{CacheGeneration, CacheStore};
use tracing::{debug, warn};

use super::Context;

/// Cached entry now, network refresh in the background.
///
/// On a miss the network response is awaited and returned; the same fetch
/// fills the cache, so a miss issues exactly one request.
pub(super) async fn serve<S, F>(
    ctx: &Context<'_, S, F>,
    request: &RequestDescriptor,
) -> FetchResult<Served>
where
    S: CacheStore,
    F: Fetcher + ?Sized + 'static,
{
    let key = request.cache_key();
    let Some(cached) = ctx.lookup(&key).await else {
        let response = ctx.fetcher.fetch(request).await?;
        ctx.store_in_background(key, &response);
        return Ok(Served::network(response));
    };

    let fetcher = ctx.fetcher.clone();
    let generation = ctx.generation.clone();
    let cache_opaque_responses = ctx.cache_opaque_responses;
    let request = request.clone();
    let task_key = key.clone();
    let spawned = ctx.offload.spawn_with_key(key.clone(), async move {
        let key = task_key;
        let response = match fetcher.fetch(&request).await {
            Ok(response) => response,
            Err(error) => {
                warn!(%key, %error, "Revalidation failed, keeping cached entry");
                return;
            }
        };
        if !response.is_cacheable(cache_opaque_responses) {
            debug!(%key, status = %response.status(), "Revalidated response not cacheable");
            return;
        }
        if let Err(error) = generation.put(&key, CacheEntry::new(response)).await {
            warn!(%key, generation = generation.name(), %error, "Revalidation write failed");
        }
    });
    if !spawned {
        debug!(%key, "Revalidation already in flight");
    }

    Ok(cached)
}
