//! Deploy-time worker configuration.
//!
//! [`WorkerConfig`] carries everything that is fixed per deployed version:
//! the generation prefix and version tag, the page origin, the critical asset
//! list, the allow-listed external origins, the navigation fallback chain and
//! the per-route strategies. Changing the asset list requires a version bump;
//! old generations are never patched in place.
//!
//! The configuration can be built in code or loaded from YAML:
//!
//! ```
//! use outpost::WorkerConfig;
//!
//! let config = WorkerConfig::from_yaml(r#"
//! prefix: novashop
//! version: v4
//! origin: https://shop.example
//! routes:
//!   - when:
//!       path_prefix: /api/
//!     strategy: NetworkOnly
//! offload:
//!   timeout: 30s
//! "#).unwrap();
//!
//! assert_eq!(config.generation_name().as_str(), "novashop-v4");
//! ```

use std::time::Duration;

use outpost_core::{Destination, GenerationName, RequestDescriptor, RequestMode};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use url::Url;

use crate::error::ConfigError;
use crate::offload::{OffloadConfig, TimeoutPolicy};
use crate::route::Route;

const DEFAULT_PRECACHE: &[&str] = &[
    "/",
    "/index.html",
    "/style.css",
    "/app.js",
    "/manifest.json",
    "/offline.html",
    "https://i.ibb.co/0X8Yz2H/logo.png",
];

const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["https://i.ibb.co"];

const DEFAULT_FALLBACKS: &[&str] = &["/", "/offline.html"];

fn default_precache() -> Vec<String> {
    DEFAULT_PRECACHE.iter().map(|s| s.to_string()).collect()
}

fn default_allowed_origins() -> Vec<Url> {
    DEFAULT_ALLOWED_ORIGINS
        .iter()
        .filter_map(|s| Url::parse(s).ok())
        .collect()
}

fn default_fallbacks() -> Vec<String> {
    DEFAULT_FALLBACKS.iter().map(|s| s.to_string()).collect()
}

/// What to do when a background task exceeds [`OffloadSettings::timeout`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Default)]
pub enum TimeoutMode {
    /// Abort the task.
    #[default]
    Cancel,
    /// Log a warning and let it run.
    Warn,
}

/// Background task settings.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Default)]
pub struct OffloadSettings {
    /// Time limit for background tasks (e.g., "30s", "500ms"). None means unlimited.
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    /// Behavior when the time limit is reached.
    #[serde(default)]
    pub timeout_policy: TimeoutMode,
    /// Skip a revalidation when one for the same entry is already running.
    #[serde(default)]
    pub deduplicate: bool,
}

impl From<&OffloadSettings> for OffloadConfig {
    fn from(settings: &OffloadSettings) -> Self {
        let timeout_policy = match (settings.timeout, settings.timeout_policy) {
            (None, _) => TimeoutPolicy::None,
            (Some(duration), TimeoutMode::Cancel) => TimeoutPolicy::Cancel(duration),
            (Some(duration), TimeoutMode::Warn) => TimeoutPolicy::Warn(duration),
        };
        OffloadConfig::builder()
            .timeout_policy(timeout_policy)
            .deduplicate(settings.deduplicate)
            .build()
    }
}

/// Appearance of push notifications.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct NotificationSettings {
    /// Notification title.
    #[serde(default = "NotificationSettings::default_title")]
    pub title: String,
    /// Icon path.
    #[serde(default = "NotificationSettings::default_icon")]
    pub icon: String,
    /// Badge path.
    #[serde(default = "NotificationSettings::default_badge")]
    pub badge: String,
    /// Vibration pattern in milliseconds.
    #[serde(default = "NotificationSettings::default_vibrate")]
    pub vibrate: Vec<u32>,
}

impl NotificationSettings {
    fn default_title() -> String {
        "New notification".to_owned()
    }

    fn default_icon() -> String {
        "icons/icon-192x192.png".to_owned()
    }

    fn default_badge() -> String {
        "icons/icon-96x96.png".to_owned()
    }

    fn default_vibrate() -> Vec<u32> {
        vec![100, 50, 100]
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            title: Self::default_title(),
            icon: Self::default_icon(),
            badge: Self::default_badge(),
            vibrate: Self::default_vibrate(),
        }
    }
}

/// Worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct WorkerConfig {
    /// Application prefix of generation names.
    pub prefix: SmolStr,
    /// Version tag of this deployment.
    pub version: SmolStr,
    /// Origin of the pages this worker controls.
    pub origin: Url,
    /// Critical asset list, paths relative to `origin` or absolute URLs.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,
    /// External origins whose responses may be cached.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<Url>,
    /// Entries tried in order when a Network-First request fails.
    #[serde(default = "default_fallbacks")]
    pub navigation_fallbacks: Vec<String>,
    /// Per-route strategies, first match wins.
    #[serde(default)]
    pub routes: Vec<Route>,
    /// Whether opaque cross-origin responses may be stored.
    #[serde(default)]
    pub cache_opaque_responses: bool,
    /// Background task settings.
    #[serde(default)]
    pub offload: OffloadSettings,
    /// Push notification appearance.
    #[serde(default)]
    pub notification: NotificationSettings,
}

impl WorkerConfig {
    /// Creates a builder with storefront defaults.
    pub fn builder(
        prefix: impl Into<SmolStr>,
        version: impl Into<SmolStr>,
        origin: Url,
    ) -> WorkerConfigBuilder {
        WorkerConfigBuilder::new(prefix, version, origin)
    }

    /// Parses and validates a YAML configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: WorkerConfig = serde_saphyr::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Name of the generation this version owns.
    pub fn generation_name(&self) -> GenerationName {
        GenerationName::new(self.prefix.clone(), self.version.clone())
    }

    /// Resolves a path or absolute URL against the page origin.
    pub fn resolve(&self, location: &str) -> Result<Url, ConfigError> {
        self.origin
            .join(location)
            .map_err(|source| ConfigError::InvalidUrl {
                value: location.to_owned(),
                source,
            })
    }

    /// Returns `true` if `url` is same-origin or on an allow-listed origin.
    pub fn is_allowed_origin(&self, url: &Url) -> bool {
        let origin = url.origin();
        origin == self.origin.origin()
            || self
                .allowed_origins
                .iter()
                .any(|allowed| allowed.origin() == origin)
    }

    /// Descriptors for the critical asset list.
    pub fn precache_requests(&self) -> Result<Vec<RequestDescriptor>, ConfigError> {
        self.precache
            .iter()
            .map(|location| {
                let url = self.resolve(location)?;
                let mode = if url.origin() == self.origin.origin() {
                    RequestMode::SameOrigin
                } else {
                    RequestMode::Cors
                };
                let destination = Destination::guess(&url);
                Ok(RequestDescriptor::get(url, mode, destination))
            })
            .collect()
    }

    /// Resolved navigation fallback chain.
    pub fn fallback_urls(&self) -> Result<Vec<Url>, ConfigError> {
        self.navigation_fallbacks
            .iter()
            .map(|location| self.resolve(location))
            .collect()
    }

    /// Checks invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prefix.is_empty() {
            return Err(ConfigError::Invalid("prefix must not be empty".into()));
        }
        if self.version.is_empty() {
            return Err(ConfigError::Invalid("version must not be empty".into()));
        }
        if !self.origin.origin().is_tuple() {
            return Err(ConfigError::Invalid(format!(
                "origin {} has no host",
                self.origin
            )));
        }
        if let Some(opaque) = self.allowed_origins.iter().find(|o| !o.origin().is_tuple()) {
            return Err(ConfigError::Invalid(format!(
                "allowed origin {opaque} has no host"
            )));
        }
        self.precache_requests()?;
        self.fallback_urls()?;
        Ok(())
    }
}

/// Builder for [`WorkerConfig`].
///
/// Use [`WorkerConfig::builder()`] to create a new builder.
#[derive(Debug, Clone)]
pub struct WorkerConfigBuilder {
    config: WorkerConfig,
}

impl WorkerConfigBuilder {
    /// Creates a builder with storefront defaults.
    pub fn new(prefix: impl Into<SmolStr>, version: impl Into<SmolStr>, origin: Url) -> Self {
        Self {
            config: WorkerConfig {
                prefix: prefix.into(),
                version: version.into(),
                origin,
                precache: default_precache(),
                allowed_origins: default_allowed_origins(),
                navigation_fallbacks: default_fallbacks(),
                routes: Vec::new(),
                cache_opaque_responses: false,
                offload: OffloadSettings::default(),
                notification: NotificationSettings::default(),
            },
        }
    }

    /// Replaces the critical asset list.
    pub fn precache<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.precache = assets.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the allow-listed external origins.
    pub fn allowed_origins(mut self, origins: impl IntoIterator<Item = Url>) -> Self {
        self.config.allowed_origins = origins.into_iter().collect();
        self
    }

    /// Replaces the navigation fallback chain.
    pub fn navigation_fallbacks<I, S>(mut self, fallbacks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.navigation_fallbacks = fallbacks.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a route.
    pub fn route(mut self, route: Route) -> Self {
        self.config.routes.push(route);
        self
    }

    /// Allows storing opaque cross-origin responses.
    pub fn cache_opaque_responses(mut self, enabled: bool) -> Self {
        self.config.cache_opaque_responses = enabled;
        self
    }

    /// Sets background task settings.
    pub fn offload(mut self, offload: OffloadSettings) -> Self {
        self.config.offload = offload;
        self
    }

    /// Sets push notification appearance.
    pub fn notification(mut self, notification: NotificationSettings) -> Self {
        self.config.notification = notification;
        self
    }

    /// Validates and builds the [`WorkerConfig`].
    pub fn build(self) -> Result<WorkerConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::Strategy;

    fn origin() -> Url {
        Url::parse("https://shop.example").unwrap()
    }

    #[test]
    fn builder_uses_storefront_defaults() {
        let config = WorkerConfig::builder("novashop", "v4", origin())
            .build()
            .unwrap();

        let requests = config.precache_requests().unwrap();
        let urls: Vec<&str> = requests.iter().map(|r| r.url().as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://shop.example/",
                "https://shop.example/index.html",
                "https://shop.example/style.css",
                "https://shop.example/app.js",
                "https://shop.example/manifest.json",
                "https://shop.example/offline.html",
                "https://i.ibb.co/0X8Yz2H/logo.png",
            ]
        );
        assert_eq!(requests[6].mode(), RequestMode::Cors);
        assert_eq!(requests[2].mode(), RequestMode::SameOrigin);
        assert!(!config.cache_opaque_responses);
    }

    #[test]
    fn origin_allow_list_is_exact() {
        let config = WorkerConfig::builder("novashop", "v4", origin())
            .build()
            .unwrap();
        let allowed = |s: &str| config.is_allowed_origin(&Url::parse(s).unwrap());

        assert!(allowed("https://shop.example/style.css"));
        assert!(allowed("https://i.ibb.co/0X8Yz2H/logo.png"));
        assert!(!allowed("http://shop.example/style.css"));
        assert!(!allowed("https://cdn.tracker.example/i.ibb.co/pixel.gif"));
        assert!(!allowed("https://evil-i.ibb.co.example/logo.png"));
    }

    #[test]
    fn yaml_overrides_defaults() {
        let config = WorkerConfig::from_yaml(
            r#"
prefix: novashop
version: v5
origin: https://shop.example
precache:
  - /
  - /offline.html
allowed_origins:
  - https://fonts.example
navigation_fallbacks:
  - /offline.html
cache_opaque_responses: true
routes:
  - when:
      class: Subresource
      destinations: [image]
    strategy: CacheFirst
offload:
  timeout: 500ms
  timeout_policy: Warn
  deduplicate: true
"#,
        )
        .unwrap();

        assert_eq!(config.generation_name().as_str(), "novashop-v5");
        assert_eq!(config.precache.len(), 2);
        assert!(config.cache_opaque_responses);
        assert_eq!(config.routes[0].strategy, Strategy::CacheFirst);
        assert_eq!(config.routes[0].when.destinations, vec![Destination::Image]);
        assert_eq!(
            config.fallback_urls().unwrap(),
            vec![Url::parse("https://shop.example/offline.html").unwrap()]
        );
        let offload = OffloadConfig::from(&config.offload);
        assert_eq!(
            offload.timeout_policy,
            TimeoutPolicy::Warn(Duration::from_millis(500))
        );
        assert!(offload.deduplicate);
        assert_eq!(config.notification, NotificationSettings::default());
    }

    #[test]
    fn empty_version_is_rejected() {
        let err = WorkerConfig::builder("novashop", "", origin())
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = WorkerConfig::from_yaml("prefix: [unterminated").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
