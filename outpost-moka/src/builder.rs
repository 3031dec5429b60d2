//! Builder for configuring [`MokaStore`].

use moka::future::{Cache, CacheBuilder};
use moka::policy::EvictionPolicy;
use outpost_core::{CacheEntry, CacheKey};
use smol_str::SmolStr;

use crate::store::MokaStore;

/// Marker type: capacity has not been configured yet.
///
/// You must call either [`max_entries()`](MokaStoreBuilder::max_entries) or
/// [`max_bytes()`](MokaStoreBuilder::max_bytes) before calling `build()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapacity;

/// Marker type: entry-count capacity per generation has been configured.
#[derive(Debug, Clone, Copy)]
pub struct EntryCapacity(pub(crate) u64);

/// Marker type: byte-based capacity per generation has been configured.
#[derive(Debug, Clone, Copy)]
pub struct ByteCapacity(pub(crate) u64);

#[derive(Debug, Clone, Copy)]
pub(crate) enum Capacity {
    Entries(u64),
    Bytes(u64),
}

/// How each new generation's cache is built.
#[derive(Clone)]
pub(crate) struct GenerationSettings {
    capacity: Capacity,
    eviction_policy: Option<EvictionPolicy>,
}

impl GenerationSettings {
    pub(crate) fn build_cache(&self) -> Cache<CacheKey, CacheEntry> {
        match self.capacity {
            Capacity::Entries(entries) => {
                let policy = self
                    .eviction_policy
                    .clone()
                    .unwrap_or_else(EvictionPolicy::tiny_lfu);
                CacheBuilder::new(entries).eviction_policy(policy).build()
            }
            Capacity::Bytes(bytes) => {
                let policy = self
                    .eviction_policy
                    .clone()
                    .unwrap_or_else(EvictionPolicy::lru);
                CacheBuilder::new(bytes)
                    .weigher(byte_weigher)
                    .eviction_policy(policy)
                    .build()
            }
        }
    }
}

/// Weigher function that calculates the approximate byte cost of an entry.
fn byte_weigher(key: &CacheKey, value: &CacheEntry) -> u32 {
    let key_size = key.url().as_str().len() + key.method().as_str().len();
    (key_size + value.memory_size()).min(u32::MAX as usize) as u32
}

/// Builder for creating and configuring a [`MokaStore`].
///
/// # Capacity Configuration (Required)
///
/// Capacity applies to every generation separately. Configure it using
/// exactly one of:
/// - [`max_entries(n)`](Self::max_entries) - limit by entry count
/// - [`max_bytes(n)`](Self::max_bytes) - limit by approximate memory usage
///
/// `build()` is only available once capacity is set.
///
/// # Examples
///
/// ```
/// use outpost_moka::MokaStore;
///
/// let store = MokaStore::builder()
///     .label("storefront")
///     .max_bytes(50 * 1024 * 1024)
///     .max_generations(3)
///     .build();
/// ```
pub struct MokaStoreBuilder<Cap> {
    capacity: Cap,
    eviction_policy: Option<EvictionPolicy>,
    max_generations: Option<usize>,
    label: SmolStr,
}

impl MokaStoreBuilder<NoCapacity> {
    /// Creates a new builder with no capacity configured.
    pub fn new() -> Self {
        Self {
            capacity: NoCapacity,
            eviction_policy: None,
            max_generations: None,
            label: SmolStr::new_static("moka"),
        }
    }

    /// Sets the maximum number of entries each generation can hold.
    pub fn max_entries(self, capacity: u64) -> MokaStoreBuilder<EntryCapacity> {
        MokaStoreBuilder {
            capacity: EntryCapacity(capacity),
            eviction_policy: self.eviction_policy,
            max_generations: self.max_generations,
            label: self.label,
        }
    }

    /// Sets the approximate memory budget of each generation in bytes.
    pub fn max_bytes(self, bytes: u64) -> MokaStoreBuilder<ByteCapacity> {
        MokaStoreBuilder {
            capacity: ByteCapacity(bytes),
            eviction_policy: self.eviction_policy,
            max_generations: self.max_generations,
            label: self.label,
        }
    }
}

impl Default for MokaStoreBuilder<NoCapacity> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Cap> MokaStoreBuilder<Cap> {
    /// Sets a custom label used in logs and metrics.
    ///
    /// # Default
    ///
    /// `"moka"`
    pub fn label(mut self, label: impl Into<SmolStr>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the eviction policy of every generation.
    ///
    /// # Default
    ///
    /// - **Entry-based capacity**: [`EvictionPolicy::tiny_lfu()`]
    /// - **Byte-based capacity**: [`EvictionPolicy::lru()`], TinyLFU admission
    ///   can reject large entries even when eviction could make room
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = Some(policy);
        self
    }

    /// Limits how many generations may exist at once.
    ///
    /// Opening a new generation beyond this quota fails with
    /// [`StoreError::Exhausted`](outpost_store::StoreError::Exhausted).
    pub fn max_generations(mut self, max: usize) -> Self {
        self.max_generations = Some(max);
        self
    }
}

impl MokaStoreBuilder<EntryCapacity> {
    /// Builds the [`MokaStore`] with entry-count based capacity.
    pub fn build(self) -> MokaStore {
        MokaStore::from_parts(
            GenerationSettings {
                capacity: Capacity::Entries(self.capacity.0),
                eviction_policy: self.eviction_policy,
            },
            self.max_generations,
            self.label,
        )
    }
}

impl MokaStoreBuilder<ByteCapacity> {
    /// Builds the [`MokaStore`] with byte-based capacity.
    pub fn build(self) -> MokaStore {
        MokaStore::from_parts(
            GenerationSettings {
                capacity: Capacity::Bytes(self.capacity.0),
                eviction_policy: self.eviction_policy,
            },
            self.max_generations,
            self.label,
        )
    }
}
