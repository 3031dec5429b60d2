//! Where a served response came from.

use smol_str::SmolStr;
use url::Url;

use crate::Response;

/// Source of a response returned to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseSource {
    /// Live network response.
    Network,
    /// Entry stored for this very request in the named generation.
    Cache {
        /// Generation the entry was read from.
        generation: SmolStr,
    },
    /// Navigation fallback entry (root document or offline page).
    Fallback {
        /// URL of the fallback entry that was served.
        url: Url,
    },
}

impl ResponseSource {
    /// Returns the source kind as a string slice.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Network => "network",
            ResponseSource::Cache { .. } => "cache",
            ResponseSource::Fallback { .. } => "fallback",
        }
    }
}

/// A response handed back to the page, tagged with its source.
#[derive(Debug, Clone)]
pub struct Served {
    /// The response.
    pub response: Response,
    /// Where it came from.
    pub source: ResponseSource,
}

impl Served {
    /// A network response.
    pub fn network(response: Response) -> Self {
        Self {
            response,
            source: ResponseSource::Network,
        }
    }

    /// A response read from a generation.
    pub fn cache(response: Response, generation: impl Into<SmolStr>) -> Self {
        Self {
            response,
            source: ResponseSource::Cache {
                generation: generation.into(),
            },
        }
    }

    /// A navigation fallback.
    pub fn fallback(response: Response, url: Url) -> Self {
        Self {
            response,
            source: ResponseSource::Fallback { url },
        }
    }

    /// Returns `true` if the response did not touch the network.
    pub fn is_from_cache(&self) -> bool {
        !matches!(self.source, ResponseSource::Network)
    }
}
