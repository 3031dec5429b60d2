//! Limits applied to background cache writes and revalidations.

use std::time::Duration;

/// What happens to a background store or revalidation that outlives its
/// time limit.
///
/// A revalidation stuck on a slow network keeps its slot in the
/// [`OffloadManager`](super::OffloadManager); with deduplication on, no other
/// refresh of the same entry can start until it ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// Tasks run until the fetch and the write complete.
    #[default]
    None,
    /// Abort the task. The cached entry keeps its previous value.
    Cancel(Duration),
    /// Log once the limit passes, keep waiting for the write.
    Warn(Duration),
}

/// Settings of the [`OffloadManager`](super::OffloadManager), derived from
/// the worker's `offload` configuration section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffloadConfig {
    /// Time limit of every spawned store or revalidation.
    pub timeout_policy: TimeoutPolicy,
    /// At most one revalidation per cache key in flight.
    pub deduplicate: bool,
}

impl OffloadConfig {
    /// Starts from no time limit and no deduplication.
    pub fn builder() -> OffloadConfigBuilder {
        OffloadConfigBuilder::default()
    }
}

/// Builder for [`OffloadConfig`].
#[derive(Debug, Clone, Default)]
pub struct OffloadConfigBuilder {
    config: OffloadConfig,
}

impl OffloadConfigBuilder {
    /// Sets the time limit policy.
    pub fn timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.config.timeout_policy = policy;
        self
    }

    /// Cancels background tasks running longer than `limit`.
    pub fn timeout(self, limit: Duration) -> Self {
        self.timeout_policy(TimeoutPolicy::Cancel(limit))
    }

    /// Skips a revalidation while one for the same entry is running.
    pub fn deduplicate(mut self, enabled: bool) -> Self {
        self.config.deduplicate = enabled;
        self
    }

    /// Finishes the configuration.
    pub fn build(self) -> OffloadConfig {
        self.config
    }
}
