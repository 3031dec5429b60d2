//! Per-route strategy selection.
//!
//! Routes are matched in declaration order; the first route whose matcher
//! accepts the request decides the strategy. When no route matches,
//! navigations use [`Strategy::NetworkFirst`] and sub-resources use
//! [`Strategy::StaleWhileRevalidate`].

use outpost_core::{Destination, RequestDescriptor};
use serde::{Deserialize, Serialize};

/// Serving strategy for an intercepted request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub enum Strategy {
    /// Prefer the network; on failure serve the navigation fallback chain.
    NetworkFirst,
    /// Serve the cached entry at once and refresh it in the background.
    StaleWhileRevalidate,
    /// Serve the cached entry; go to the network only on a miss.
    CacheFirst,
    /// Always go to the network and never store.
    NetworkOnly,
}

impl Strategy {
    /// Returns the strategy as a string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Strategy::NetworkFirst => "network_first",
            Strategy::StaleWhileRevalidate => "stale_while_revalidate",
            Strategy::CacheFirst => "cache_first",
            Strategy::NetworkOnly => "network_only",
        }
    }

    /// Default strategy for a request when no route matches.
    pub fn default_for(request: &RequestDescriptor) -> Self {
        if request.mode().is_navigation() {
            Strategy::NetworkFirst
        } else {
            Strategy::StaleWhileRevalidate
        }
    }
}

/// Coarse request class used in route matchers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
pub enum RequestClass {
    /// Page navigations.
    Navigation,
    /// Everything else: styles, scripts, images, API calls.
    Subresource,
}

/// Conditions a request must satisfy for a route to apply.
///
/// Unset conditions accept everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct RouteMatch {
    /// Navigation or sub-resource.
    #[serde(default)]
    pub class: Option<RequestClass>,
    /// Accepted destinations; empty accepts any.
    #[serde(default)]
    pub destinations: Vec<Destination>,
    /// URL path prefix, e.g. `/api/`.
    #[serde(default)]
    pub path_prefix: Option<String>,
}

impl RouteMatch {
    /// Returns `true` if the request satisfies every condition.
    pub fn matches(&self, request: &RequestDescriptor) -> bool {
        let class_ok = match self.class {
            Some(RequestClass::Navigation) => request.mode().is_navigation(),
            Some(RequestClass::Subresource) => !request.mode().is_navigation(),
            None => true,
        };
        let destination_ok =
            self.destinations.is_empty() || self.destinations.contains(&request.destination());
        let path_ok = self
            .path_prefix
            .as_deref()
            .is_none_or(|prefix| request.url().path().starts_with(prefix));
        class_ok && destination_ok && path_ok
    }
}

/// A matcher paired with the strategy it selects.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Route {
    /// Conditions.
    #[serde(default)]
    pub when: RouteMatch,
    /// Strategy used when the conditions hold.
    pub strategy: Strategy,
}

impl Route {
    /// A route applying `strategy` to every request under `prefix`.
    pub fn path_prefix(prefix: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            when: RouteMatch {
                path_prefix: Some(prefix.into()),
                ..RouteMatch::default()
            },
            strategy,
        }
    }

    /// A route applying `strategy` to the given destinations.
    pub fn destinations(
        destinations: impl IntoIterator<Item = Destination>,
        strategy: Strategy,
    ) -> Self {
        Self {
            when: RouteMatch {
                destinations: destinations.into_iter().collect(),
                ..RouteMatch::default()
            },
            strategy,
        }
    }
}

/// Picks the strategy for `request` from `routes`.
pub fn select(routes: &[Route], request: &RequestDescriptor) -> Strategy {
    routes
        .iter()
        .find(|route| route.when.matches(request))
        .map(|route| route.strategy)
        .unwrap_or_else(|| Strategy::default_for(request))
}
