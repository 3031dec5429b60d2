#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Worker configuration.
///
/// [`WorkerConfig`] is loaded from YAML or built in code and fixes the
/// critical asset list, allow-listed origins, navigation fallbacks and routes
/// of one deployed version.
pub mod config;

/// Error types for lifecycle phases and configuration loading.
pub mod error;

/// Host collaborator interface.
///
/// The [`Host`] trait is how the worker claims pages, shows notifications
/// and manages windows. [`NoopHost`] does nothing.
pub mod host;

/// Lifecycle states of a worker version.
pub mod lifecycle;

/// Messages exchanged with controlled pages.
pub mod message;

/// Metrics collection.
///
/// When the `metrics` feature is enabled, this module provides counters for
/// intercepted and passed-through requests, responses by source, fetch
/// errors, and offload task gauges and histograms.
pub mod metrics;

/// Background task offloading.
///
/// Writes after a network response and Stale-While-Revalidate refreshes run
/// on the [`OffloadManager`](offload::OffloadManager) and are never awaited
/// by the request that started them.
pub mod offload;

/// Per-route strategy selection.
pub mod route;

mod strategy;
mod worker;

pub use config::{NotificationSettings, OffloadSettings, TimeoutMode, WorkerConfig, WorkerConfigBuilder};
pub use error::{ConfigError, LifecycleError};
pub use host::{ClickOutcome, Host, NoopHost, Notification, NotificationData, WindowClient};
pub use lifecycle::WorkerState;
pub use message::{ClientMessage, MessageReply};
pub use route::{RequestClass, Route, RouteMatch, Strategy};
pub use worker::{Interception, SYNC_DATA_TAG, Worker};

pub use outpost_core::{
    CacheEntry, CacheKey, Destination, FetchError, FetchResult, Fetcher, GenerationName,
    RequestDescriptor, RequestMode, Response, ResponseSource, ResponseType, Served,
};
pub use outpost_store::{CacheGeneration, CacheStore, PopulationError, StoreError};

/// The `outpost` prelude.
pub mod prelude {
    pub use crate::{
        CacheStore, Fetcher, Host, Interception, RequestDescriptor, Strategy, Worker,
        WorkerConfig,
    };
}
