//! Error types for cache store operations.

use http::StatusCode;
use outpost_core::FetchError;
use smol_str::SmolStr;
use thiserror::Error;
use url::Url;

/// Error type for cache store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage medium is full or unavailable.
    ///
    /// Raised when a new generation cannot be created.
    #[error("storage exhausted, cannot create generation {generation}")]
    Exhausted {
        /// Generation that could not be created.
        generation: SmolStr,
    },

    /// Internal store error, state or computation error.
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

/// Error raised when a generation cannot be filled with its critical assets.
///
/// Population is all-or-nothing: when this error is returned no entry has
/// been written.
#[derive(Debug, Error)]
pub enum PopulationError {
    /// An asset could not be fetched.
    #[error("failed to fetch critical asset {url}")]
    Fetch {
        /// Asset URL.
        url: Url,
        /// Transport error.
        #[source]
        source: FetchError,
    },

    /// An asset answered with a status other than `200`.
    #[error("critical asset {url} answered with status {status}")]
    Status {
        /// Asset URL.
        url: Url,
        /// Received status.
        status: StatusCode,
    },

    /// An asset answered with an opaque response while those are not cached.
    #[error("critical asset {url} answered with an opaque response")]
    Opaque {
        /// Asset URL.
        url: Url,
    },

    /// Writing the fetched assets failed.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl PopulationError {
    /// URL of the failing asset, if the failure was asset specific.
    pub fn url(&self) -> Option<&Url> {
        match self {
            PopulationError::Fetch { url, .. }
            | PopulationError::Status { url, .. }
            | PopulationError::Opaque { url } => Some(url),
            PopulationError::Storage(_) => None,
        }
    }
}
