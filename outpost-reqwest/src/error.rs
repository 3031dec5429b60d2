use thiserror::Error;
use url::Url;

/// A cross-origin request the browser security model would block.
#[derive(Debug, Error)]
pub enum CorsError {
    /// A `same-origin` request targeted another origin.
    #[error("same-origin request to cross-origin URL {url}")]
    CrossOrigin {
        /// Requested URL.
        url: Url,
    },

    /// The server did not allow the page origin.
    #[error("{url} does not allow origin {origin}")]
    NotAllowed {
        /// Requested URL.
        url: Url,
        /// Page origin sent in the `Origin` header.
        origin: String,
    },
}
