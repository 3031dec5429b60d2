use outpost_core::{CacheKey, FetchError, FetchResult, Fetcher, RequestDescriptor, Served};
use outpost_store::CacheStore;
use tracing::debug;

use super::Context;

/// Network, then cache.
///
/// Navigations fall back through the configured chain (root document, then
/// offline page). Other requests fall back to their own entry.
pub(super) async fn serve<S, F>(
    ctx: &Context<'_, S, F>,
    request: &RequestDescriptor,
) -> FetchResult<Served>
where
    S: CacheStore,
    F: Fetcher + ?Sized + 'static,
{
    let error = match ctx.fetcher.fetch(request).await {
        Ok(response) => {
            ctx.store_in_background(request.cache_key(), &response);
            return Ok(Served::network(response));
        }
        Err(error) => error,
    };
    debug!(url = %request.url(), %error, "Network failed, trying fallbacks");

    if request.mode().is_navigation() {
        for url in ctx.fallbacks {
            if let Some(served) = ctx.lookup(&CacheKey::get(url)).await {
                return Ok(Served::fallback(served.response, url.clone()));
            }
        }
    } else if let Some(served) = ctx.lookup(&request.cache_key()).await {
        return Ok(served);
    }

    Err(FetchError::Offline {
        url: request.url().clone(),
    })
}
