//! The worker: lifecycle phases, request interception and host events.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use chrono::Utc;
use http::Method;
use outpost_core::{FetchResult, Fetcher, GenerationName, RequestDescriptor, Served};
use outpost_store::{CacheStore, PopulateExt};
use smol_str::SmolStr;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::WorkerConfig;
use crate::error::{ConfigError, LifecycleError};
use crate::host::{ClickOutcome, Host, NoopHost, Notification, NotificationData};
use crate::lifecycle::{Lifecycle, WorkerState};
use crate::message::{ClientMessage, MessageReply};
use crate::metrics;
use crate::offload::{OffloadConfig, OffloadManager};
use crate::route;
use crate::strategy::Context;

/// Tag of the background sync event the worker reacts to.
pub const SYNC_DATA_TAG: &str = "sync-data";

/// Decision for one intercepted request.
#[derive(Debug)]
#[must_use]
pub enum Interception {
    /// Not handled; the host performs its default network handling.
    Passthrough,
    /// Handled; the result goes back to the page.
    Respond(FetchResult<Served>),
}

impl Interception {
    /// Returns `true` if the request was left to the host.
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Interception::Passthrough)
    }

    /// Returns the response result if the request was handled.
    pub fn into_response(self) -> Option<FetchResult<Served>> {
        match self {
            Interception::Passthrough => None,
            Interception::Respond(result) => Some(result),
        }
    }
}

/// One deployed version of the offline caching policy.
///
/// A worker owns its store, fetcher and host collaborator. It goes through
/// [`install`](Self::install) and [`activate`](Self::activate) once, then
/// answers [`fetch`](Self::fetch) for every request of the pages it controls.
///
/// # Example
///
/// ```no_run
/// use outpost::{NoopHost, Worker, WorkerConfig};
/// use outpost_core::{Fetcher, RequestDescriptor};
/// use outpost_moka::MokaStore;
/// use url::Url;
///
/// # async fn run(fetcher: impl Fetcher + 'static) -> Result<(), Box<dyn std::error::Error>> {
/// let origin = Url::parse("https://shop.example")?;
/// let config = WorkerConfig::builder("novashop", "v4", origin.clone()).build()?;
/// let store = MokaStore::builder().max_entries(1024).build();
///
/// let worker = Worker::new(config, store, fetcher, NoopHost)?;
/// worker.install().await?;
/// worker.activate().await?;
///
/// let page = worker.fetch(&RequestDescriptor::navigate(origin)).await;
/// # Ok(())
/// # }
/// ```
pub struct Worker<S, F, H = NoopHost>
where
    S: CacheStore,
    F: Fetcher + ?Sized,
{
    config: WorkerConfig,
    name: GenerationName,
    precache: Vec<RequestDescriptor>,
    fallbacks: Vec<Url>,
    root: Url,
    store: S,
    fetcher: Arc<F>,
    host: H,
    generation: OnceLock<S::Generation>,
    lifecycle: Lifecycle,
    skip_waiting: AtomicBool,
    notifications: AtomicU64,
    offload: OffloadManager,
}

impl<S, F, H> Worker<S, F, H>
where
    S: CacheStore,
    F: Fetcher + 'static,
    H: Host,
{
    /// Creates a worker in the [`WorkerState::Parsed`] state.
    pub fn new(config: WorkerConfig, store: S, fetcher: F, host: H) -> Result<Self, ConfigError> {
        Self::with_shared_fetcher(config, store, Arc::new(fetcher), host)
    }
}

impl<S, F, H> Worker<S, F, H>
where
    S: CacheStore,
    F: Fetcher + ?Sized + 'static,
    H: Host,
{
    /// Creates a worker reusing a fetcher shared with other components.
    pub fn with_shared_fetcher(
        config: WorkerConfig,
        store: S,
        fetcher: Arc<F>,
        host: H,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let precache = config.precache_requests()?;
        let fallbacks = config.fallback_urls()?;
        let root = config.resolve("/")?;
        let offload = OffloadManager::new(OffloadConfig::from(&config.offload));
        Ok(Self {
            name: config.generation_name(),
            config,
            precache,
            fallbacks,
            root,
            store,
            fetcher,
            host,
            generation: OnceLock::new(),
            lifecycle: Lifecycle::new(),
            skip_waiting: AtomicBool::new(false),
            notifications: AtomicU64::new(0),
            offload,
        })
    }

    /// Configuration this worker was built from.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Name of the generation this version owns.
    pub fn generation_name(&self) -> &GenerationName {
        &self.name
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        self.lifecycle.current()
    }

    /// Receiver notified on every lifecycle transition.
    pub fn subscribe(&self) -> watch::Receiver<WorkerState> {
        self.lifecycle.subscribe()
    }

    /// Whether the host may activate this version without waiting for
    /// pages controlled by the previous one to close.
    ///
    /// Every successful [`install`](Self::install) sets this flag, so a
    /// [`ClientMessage::SkipWaiting`] received afterwards changes nothing
    /// observable. Hosts should activate right after install rather than
    /// wait for the message.
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::Acquire)
    }

    /// Background task manager.
    pub fn offload(&self) -> &OffloadManager {
        &self.offload
    }

    /// Waits until every background write and revalidation has finished.
    pub async fn wait_for_background(&self) {
        self.offload.wait_all().await
    }

    /// Opens this version's generation and stores every critical asset.
    ///
    /// Succeeds only if all assets were fetched and stored. On failure the
    /// worker becomes [`WorkerState::Redundant`], a generation created by this
    /// call is deleted again, and generations of earlier versions are left
    /// untouched.
    #[instrument(skip(self), fields(generation = %self.name))]
    pub async fn install(&self) -> Result<(), LifecycleError> {
        self.lifecycle
            .advance(WorkerState::Parsed, WorkerState::Installing)?;

        match self.populate().await {
            Ok(generation) => {
                // Only reachable once: the Parsed → Installing move above is exclusive.
                let _ = self.generation.set(generation);
                self.skip_waiting.store(true, Ordering::Release);
                self.lifecycle.set(WorkerState::Installed);
                Ok(())
            }
            Err(error) => {
                warn!(%error, "Installation failed");
                self.lifecycle.set(WorkerState::Redundant);
                Err(error)
            }
        }
    }

    async fn populate(&self) -> Result<S::Generation, LifecycleError> {
        let name = self.name.as_str();
        let existed = self.store.has(name).await?;
        let generation = self.store.open(name).await?;

        match generation
            .populate(
                self.fetcher.as_ref(),
                &self.precache,
                self.config.cache_opaque_responses,
            )
            .await
        {
            Ok(stored) => {
                info!(assets = stored, "Critical assets stored");
                Ok(generation)
            }
            Err(error) => {
                if !existed {
                    match self.store.delete(name).await {
                        Ok(_) => debug!("Removed partially installed generation"),
                        Err(delete_error) => {
                            warn!(error = %delete_error, "Failed to remove partially installed generation")
                        }
                    }
                }
                Err(error.into())
            }
        }
    }

    /// Deletes superseded generations and takes control of open pages.
    ///
    /// Returns the names of the deleted generations. Generations belonging to
    /// other applications (without this worker's prefix) are kept.
    #[instrument(skip(self), fields(generation = %self.name))]
    pub async fn activate(&self) -> Result<Vec<SmolStr>, LifecycleError> {
        self.lifecycle
            .advance(WorkerState::Installed, WorkerState::Activating)?;

        let deleted = match self.remove_superseded().await {
            Ok(deleted) => deleted,
            Err(error) => {
                warn!(%error, "Activation failed");
                self.lifecycle.set(WorkerState::Installed);
                return Err(error);
            }
        };
        self.host.claim_clients().await;
        self.lifecycle.set(WorkerState::Active);
        Ok(deleted)
    }

    async fn remove_superseded(&self) -> Result<Vec<SmolStr>, LifecycleError> {
        let mut deleted = Vec::new();
        for name in self.store.generations().await? {
            if !self.name.supersedes(&name) {
                continue;
            }
            if self.store.delete(&name).await? {
                info!(superseded = %name, "Deleted superseded generation");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Decides how to answer one request from a controlled page.
    pub async fn fetch(&self, request: &RequestDescriptor) -> Interception {
        let Some(generation) = self.active_generation() else {
            debug!(url = %request.url(), state = %self.state(), "Not active, passing through");
            metrics::record_passthrough("inactive");
            return Interception::Passthrough;
        };
        if request.method() != Method::GET {
            debug!(url = %request.url(), method = %request.method(), "Non-GET request, passing through");
            metrics::record_passthrough("method");
            return Interception::Passthrough;
        }
        if !self.config.is_allowed_origin(request.url()) {
            debug!(url = %request.url(), "Foreign origin, passing through");
            metrics::record_passthrough("origin");
            return Interception::Passthrough;
        }

        let strategy = route::select(&self.config.routes, request);
        debug!(
            url = %request.url(),
            mode = request.mode().as_str(),
            strategy = strategy.as_str(),
            "Intercepting request"
        );

        let ctx = Context {
            store: &self.store,
            generation,
            fetcher: &self.fetcher,
            offload: &self.offload,
            fallbacks: &self.fallbacks,
            cache_opaque_responses: self.config.cache_opaque_responses,
        };
        let result = ctx.serve(strategy, request).await;
        match &result {
            Ok(served) => {
                debug!(url = %request.url(), source = served.source.as_str(), "Responding");
                metrics::record_outcome(strategy, Some(&served.source));
            }
            Err(error) => {
                debug!(url = %request.url(), %error, "Responding with error");
                metrics::record_outcome(strategy, None);
            }
        }
        Interception::Respond(result)
    }

    fn active_generation(&self) -> Option<&S::Generation> {
        if self.state() != WorkerState::Active {
            return None;
        }
        self.generation.get()
    }

    /// Handles a message posted by a page.
    ///
    /// Returns the reply to post back, if the message expects one.
    /// Unrecognized messages are ignored.
    pub fn message(&self, data: &serde_json::Value) -> Option<MessageReply> {
        match ClientMessage::parse(data)? {
            ClientMessage::SkipWaiting => {
                debug!("Skip waiting requested by page");
                self.skip_waiting.store(true, Ordering::Release);
                None
            }
            ClientMessage::GetVersion => Some(MessageReply::Version {
                version: self.name.version().into(),
            }),
        }
    }

    /// Shows a notification for a push message.
    pub async fn push(&self, payload: Option<&str>) -> Notification {
        let settings = &self.config.notification;
        let notification = Notification {
            title: settings.title.clone(),
            body: payload.unwrap_or_default().to_owned(),
            icon: settings.icon.clone(),
            badge: settings.badge.clone(),
            vibrate: settings.vibrate.clone(),
            data: NotificationData {
                date_of_arrival: Utc::now(),
                primary_key: self.notifications.fetch_add(1, Ordering::Relaxed) + 1,
            },
        };
        debug!(primary_key = notification.data.primary_key, "Showing push notification");
        self.host.show_notification(notification.clone()).await;
        notification
    }

    /// Focuses an open window on the root page, or opens one.
    pub async fn notification_click(&self) -> ClickOutcome {
        for client in self.host.window_clients().await {
            if client.url != self.root || !client.focusable {
                continue;
            }
            if self.host.focus(&client).await {
                debug!(client = %client.id, "Focused existing window");
                return ClickOutcome::Focused(client.id);
            }
        }
        self.host.open_window(&self.root).await;
        debug!(url = %self.root, "Opened new window");
        ClickOutcome::Opened(self.root.clone())
    }

    /// Background sync hook. Returns `true` if the tag was recognized.
    pub fn sync(&self, tag: &str) -> bool {
        if tag == SYNC_DATA_TAG {
            info!(tag, "Background sync triggered");
            true
        } else {
            debug!(tag, "Ignoring unknown sync tag");
            false
        }
    }
}

impl<S, F, H> std::fmt::Debug for Worker<S, F, H>
where
    S: CacheStore,
    F: Fetcher + ?Sized,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("generation", &self.name.as_str())
            .field("state", &self.lifecycle.current())
            .field("store", &self.store.label())
            .finish_non_exhaustive()
    }
}
