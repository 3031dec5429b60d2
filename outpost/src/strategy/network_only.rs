use outpost_core::{FetchResult, Fetcher, RequestDescriptor, Served};
use outpost_store::CacheStore;

use super::Context;

/// Always the network, never stored.
pub(super) async fn serve<S, F>(
    ctx: &Context<'_, S, F>,
    request: &RequestDescriptor,
) -> FetchResult<Served>
where
    S: CacheStore,
    F: Fetcher + ?Sized + 'static,
{
    ctx.fetcher.fetch(request).await.map(Served::network)
}
