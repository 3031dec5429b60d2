//! Moka store implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use moka::future::Cache;
use outpost_core::{CacheEntry, CacheKey};
use outpost_store::{CacheGeneration, CacheStore, DeleteStatus, StoreError, StoreResult};
use smol_str::SmolStr;
use tracing::debug;

use crate::builder::{GenerationSettings, MokaStoreBuilder, NoCapacity};

/// A single generation backed by a Moka async cache.
///
/// Cloning is cheap; clones share the same entries.
#[derive(Clone)]
pub struct MokaGeneration {
    name: SmolStr,
    order: u64,
    cache: Cache<CacheKey, CacheEntry>,
}

impl MokaGeneration {
    /// The underlying Moka cache instance.
    pub fn cache(&self) -> &Cache<CacheKey, CacheEntry> {
        &self.cache
    }
}

impl std::fmt::Debug for MokaGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaGeneration")
            .field("name", &self.name)
            .field("order", &self.order)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[async_trait]
impl CacheGeneration for MokaGeneration {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, key: &CacheKey) -> StoreResult<Option<CacheEntry>> {
        Ok(self.cache.get(key).await)
    }

    async fn put(&self, key: &CacheKey, entry: CacheEntry) -> StoreResult<()> {
        self.cache.insert(key.clone(), entry).await;
        crate::metrics::record_capacity(
            &self.name,
            self.cache.entry_count(),
            self.cache.weighted_size(),
        );
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> StoreResult<DeleteStatus> {
        match self.cache.remove(key).await {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    async fn keys(&self) -> StoreResult<Vec<CacheKey>> {
        Ok(self.cache.iter().map(|(key, _)| (*key).clone()).collect())
    }
}

struct MokaStoreInner {
    generations: DashMap<SmolStr, MokaGeneration>,
    counter: AtomicU64,
    settings: GenerationSettings,
    max_generations: Option<usize>,
    label: SmolStr,
}

/// In-memory generation store powered by Moka.
///
/// # Examples
///
/// ```
/// use outpost_moka::MokaStore;
///
/// let store = MokaStore::builder()
///     .max_entries(1_000)
///     .max_generations(4)
///     .build();
/// ```
///
/// # Caveats
///
/// - Data is **not persisted**; generations are lost on process restart
/// - Capacity is per generation; when it is exceeded Moka evicts entries,
///   including precached ones, so size it above the critical asset count
#[derive(Clone)]
pub struct MokaStore {
    inner: Arc<MokaStoreInner>,
}

impl MokaStore {
    /// Creates a new builder for `MokaStore`.
    pub fn builder() -> MokaStoreBuilder<NoCapacity> {
        MokaStoreBuilder::new()
    }

    pub(crate) fn from_parts(
        settings: GenerationSettings,
        max_generations: Option<usize>,
        label: SmolStr,
    ) -> Self {
        Self {
            inner: Arc::new(MokaStoreInner {
                generations: DashMap::new(),
                counter: AtomicU64::new(0),
                settings,
                max_generations,
                label,
            }),
        }
    }

    fn create(&self, name: &str) -> MokaGeneration {
        let order = self.inner.counter.fetch_add(1, Ordering::Relaxed);
        debug!(store = %self.inner.label, generation = name, "creating generation");
        MokaGeneration {
            name: SmolStr::new(name),
            order,
            cache: self.inner.settings.build_cache(),
        }
    }
}

impl std::fmt::Debug for MokaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaStore")
            .field("label", &self.inner.label)
            .field("generations", &self.inner.generations.len())
            .field("max_generations", &self.inner.max_generations)
            .finish()
    }
}

#[async_trait]
impl CacheStore for MokaStore {
    type Generation = MokaGeneration;

    async fn open(&self, name: &str) -> StoreResult<MokaGeneration> {
        if let Some(existing) = self.inner.generations.get(name) {
            return Ok(existing.clone());
        }
        if let Some(max) = self.inner.max_generations
            && self.inner.generations.len() >= max
        {
            return Err(StoreError::Exhausted {
                generation: SmolStr::new(name),
            });
        }
        let generation = self
            .inner
            .generations
            .entry(SmolStr::new(name))
            .or_insert_with(|| self.create(name))
            .clone();
        Ok(generation)
    }

    async fn generation(&self, name: &str) -> StoreResult<Option<MokaGeneration>> {
        Ok(self.inner.generations.get(name).map(|g| g.clone()))
    }

    async fn generations(&self) -> StoreResult<Vec<SmolStr>> {
        let mut generations: Vec<(u64, SmolStr)> = self
            .inner
            .generations
            .iter()
            .map(|g| (g.order, g.key().clone()))
            .collect();
        generations.sort_unstable();
        Ok(generations.into_iter().map(|(_, name)| name).collect())
    }

    async fn delete(&self, name: &str) -> StoreResult<bool> {
        match self.inner.generations.remove(name) {
            Some((_, generation)) => {
                generation.cache.invalidate_all();
                debug!(store = %self.inner.label, generation = name, "deleted generation");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn label(&self) -> &str {
        &self.inner.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_core::Response;
    use url::Url;

    fn key(path: &str) -> CacheKey {
        CacheKey::get(&Url::parse("https://shop.example").unwrap().join(path).unwrap())
    }

    #[tokio::test]
    async fn open_is_idempotent() {
        let store = MokaStore::builder().max_entries(16).build();
        let first = store.open("novashop-v4").await.unwrap();
        first
            .put(&key("/style.css"), CacheEntry::new(Response::ok("body {}")))
            .await
            .unwrap();

        let second = store.open("novashop-v4").await.unwrap();
        let entry = second.lookup(&key("/style.css")).await.unwrap().unwrap();

        assert_eq!(entry.response().body().as_ref(), b"body {}");
        assert_eq!(store.generations().await.unwrap(), vec!["novashop-v4"]);
    }

    #[tokio::test]
    async fn generations_keep_creation_order() {
        let store = MokaStore::builder().max_entries(16).build();
        for name in ["novashop-v3", "novashop-v1", "novashop-v2"] {
            store.open(name).await.unwrap();
        }
        assert_eq!(
            store.generations().await.unwrap(),
            vec!["novashop-v3", "novashop-v1", "novashop-v2"]
        );
    }

    #[tokio::test]
    async fn quota_exhaustion_is_a_storage_error() {
        let store = MokaStore::builder()
            .max_entries(16)
            .max_generations(1)
            .build();
        store.open("novashop-v3").await.unwrap();

        let err = store.open("novashop-v4").await.unwrap_err();
        assert!(matches!(err, StoreError::Exhausted { ref generation } if generation == "novashop-v4"));

        // Reopening an existing generation does not count against the quota.
        store.open("novashop-v3").await.unwrap();
    }

    #[tokio::test]
    async fn delete_detaches_handles() {
        let store = MokaStore::builder().max_entries(16).build();
        let old = store.open("novashop-v3").await.unwrap();
        assert!(store.delete("novashop-v3").await.unwrap());
        assert!(!store.delete("novashop-v3").await.unwrap());

        old.put(&key("/"), CacheEntry::new(Response::ok("late write")))
            .await
            .unwrap();
        assert!(!store.has("novashop-v3").await.unwrap());
        assert!(store.match_any(&key("/")).await.unwrap().is_none());
    }
}
