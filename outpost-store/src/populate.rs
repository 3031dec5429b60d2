use std::future::Future;

use futures::future::try_join_all;
use outpost_core::{CacheEntry, Fetcher, RequestDescriptor, ResponseType};
use tracing::debug;

use crate::{CacheGeneration, PopulationError};

/// Bulk population of a generation from the network.
///
/// Every request is fetched first; entries are written only once all of them
/// answered with a cacheable response (see [`Response::is_cacheable`]). A
/// single failure aborts the whole batch before any write, so a failed
/// population never leaves a half-filled generation behind.
///
/// [`Response::is_cacheable`]: outpost_core::Response::is_cacheable
pub trait PopulateExt: CacheGeneration {
    /// Fetches all `requests` and stores their responses.
    ///
    /// Opaque responses are accepted only with `cache_opaque_responses`.
    /// Returns the number of entries written.
    fn populate<'a, F>(
        &'a self,
        fetcher: &'a F,
        requests: &'a [RequestDescriptor],
        cache_opaque_responses: bool,
    ) -> impl Future<Output = Result<usize, PopulationError>> + Send + 'a
    where
        F: Fetcher + ?Sized,
    {
        async move {
            let fetches = requests.iter().map(|request| async move {
                let response =
                    fetcher
                        .fetch(request)
                        .await
                        .map_err(|source| PopulationError::Fetch {
                            url: request.url().clone(),
                            source,
                        })?;
                if !response.is_cacheable(cache_opaque_responses) {
                    let url = request.url().clone();
                    return Err(match response.kind() {
                        ResponseType::Opaque => PopulationError::Opaque { url },
                        ResponseType::Basic | ResponseType::Cors => PopulationError::Status {
                            url,
                            status: response.status(),
                        },
                    });
                }
                Ok((request, response))
            });
            let fetched = try_join_all(fetches).await?;

            let written = fetched.len();
            for (request, response) in fetched {
                debug!(generation = self.name(), url = %request.url(), "precached");
                self.put(&request.cache_key(), CacheEntry::new(response))
                    .await?;
            }
            Ok(written)
        }
    }
}

impl<G> PopulateExt for G where G: CacheGeneration + ?Sized {}
