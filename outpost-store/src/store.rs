use std::sync::Arc;

use async_trait::async_trait;
use outpost_core::{CacheEntry, CacheKey};
use smol_str::SmolStr;

use crate::{DeleteStatus, StoreError};

pub type StoreResult<T> = Result<T, StoreError>;

/// Handle to one named generation.
///
/// Handles are cheap to clone and every clone addresses the same entries.
/// A handle whose generation was deleted from the store stays usable but
/// detached: nothing written through it is visible to the store any more.
#[async_trait]
pub trait CacheGeneration: Send + Sync {
    /// Generation name.
    fn name(&self) -> &str;

    /// Returns the entry stored for `key`. Never touches the network.
    async fn lookup(&self, key: &CacheKey) -> StoreResult<Option<CacheEntry>>;

    /// Inserts or overwrites the entry for `key`.
    async fn put(&self, key: &CacheKey, entry: CacheEntry) -> StoreResult<()>;

    async fn remove(&self, key: &CacheKey) -> StoreResult<DeleteStatus>;

    /// Keys currently stored, in no particular order.
    async fn keys(&self) -> StoreResult<Vec<CacheKey>>;
}

/// A set of named, versioned generations.
#[async_trait]
pub trait CacheStore: Send + Sync {
    type Generation: CacheGeneration + Clone + 'static;

    /// Creates the generation if missing and returns a handle to it.
    ///
    /// Opening an existing generation leaves its entries untouched.
    async fn open(&self, name: &str) -> StoreResult<Self::Generation>;

    /// Returns a handle to an existing generation without creating it.
    async fn generation(&self, name: &str) -> StoreResult<Option<Self::Generation>>;

    /// Generation names in creation order.
    async fn generations(&self) -> StoreResult<Vec<SmolStr>>;

    /// Removes a generation and all its entries.
    ///
    /// Returns `false` if no such generation existed.
    async fn delete(&self, name: &str) -> StoreResult<bool>;

    async fn has(&self, name: &str) -> StoreResult<bool> {
        Ok(self.generation(name).await?.is_some())
    }

    /// Looks `key` up in every generation, oldest first, and returns the
    /// first hit along with the generation it was found in.
    async fn match_any(&self, key: &CacheKey) -> StoreResult<Option<(SmolStr, CacheEntry)>> {
        for name in self.generations().await? {
            let Some(generation) = self.generation(&name).await? else {
                continue;
            };
            if let Some(entry) = generation.lookup(key).await? {
                return Ok(Some((name, entry)));
            }
        }
        Ok(None)
    }

    /// Returns the name of this store for logs and metrics labels.
    fn label(&self) -> &str {
        "store"
    }
}

#[async_trait]
impl<S> CacheStore for Arc<S>
where
    S: CacheStore,
{
    type Generation = S::Generation;

    async fn open(&self, name: &str) -> StoreResult<Self::Generation> {
        (**self).open(name).await
    }

    async fn generation(&self, name: &str) -> StoreResult<Option<Self::Generation>> {
        (**self).generation(name).await
    }

    async fn generations(&self) -> StoreResult<Vec<SmolStr>> {
        (**self).generations().await
    }

    async fn delete(&self, name: &str) -> StoreResult<bool> {
        (**self).delete(name).await
    }

    async fn has(&self, name: &str) -> StoreResult<bool> {
        (**self).has(name).await
    }

    async fn match_any(&self, key: &CacheKey) -> StoreResult<Option<(SmolStr, CacheEntry)>> {
        (**self).match_any(key).await
    }

    fn label(&self) -> &str {
        (**self).label()
    }
}
