use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::{RequestDescriptor, Response};

/// Error returned when a request cannot be answered.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The network could not be reached or the transfer failed.
    #[error("network request to {url} failed: {source}")]
    Network {
        /// Requested URL.
        url: Url,
        /// Underlying transport error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The network failed and no cached fallback was available.
    #[error("{url} is unavailable offline and no cached fallback exists")]
    Offline {
        /// Requested URL.
        url: Url,
    },
}

impl FetchError {
    /// Wraps a transport error for `url`.
    pub fn network<E>(url: &Url, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        FetchError::Network {
            url: url.clone(),
            source: error.into(),
        }
    }

    /// The requested URL.
    pub fn url(&self) -> &Url {
        match self {
            FetchError::Network { url, .. } | FetchError::Offline { url } => url,
        }
    }
}

/// Result alias for network fetches.
pub type FetchResult<T> = Result<T, FetchError>;

/// Trait for issuing network requests on behalf of the page.
///
/// Framework-agnostic: the policy only needs a buffered [`Response`] back.
/// A response with an error status is still a response; only transport
/// failures are errors.
///
/// # Examples
///
/// ```rust,ignore
/// use outpost_core::{Fetcher, FetchResult, RequestDescriptor, Response};
///
/// struct Static;
///
/// #[async_trait::async_trait]
/// impl Fetcher for Static {
///     async fn fetch(&self, _request: &RequestDescriptor) -> FetchResult<Response> {
///         Ok(Response::ok("hello"))
///     }
/// }
/// ```
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform the request over the network.
    async fn fetch(&self, request: &RequestDescriptor) -> FetchResult<Response>;
}

#[async_trait]
impl<T> Fetcher for Arc<T>
where
    T: Fetcher + ?Sized,
{
    async fn fetch(&self, request: &RequestDescriptor) -> FetchResult<Response> {
        (**self).fetch(request).await
    }
}

#[async_trait]
impl Fetcher for Box<dyn Fetcher> {
    async fn fetch(&self, request: &RequestDescriptor) -> FetchResult<Response> {
        (**self).fetch(request).await
    }
}
