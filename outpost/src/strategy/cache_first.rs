use outpost_core::{FetchResult, Fetcher, RequestDescriptor, Served};
use outpost_store::CacheStore;

use super::Context;

/// Cached entry if present, otherwise network.
pub(super) async fn serve<S, F>(
    ctx: &Context<'_, S, F>,
    request: &RequestDescriptor,
) -> FetchResult<Served>
where
    S: CacheStore,
    F: Fetcher + ?Sized + 'static,
{
    let key = request.cache_key();
    if let Some(cached) = ctx.lookup(&key).await {
        return Ok(cached);
    }
    let response = ctx.fetcher.fetch(request).await?;
    ctx.store_in_background(key, &response);
    Ok(Served::network(response))
}
