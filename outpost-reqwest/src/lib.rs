#![doc = include_str!("../README.md")]

mod error;
mod fetcher;

pub use error::CorsError;
pub use fetcher::ReqwestFetcher;

/// Re-export of the middleware client accepted by [`ReqwestFetcher::new`].
pub use reqwest_middleware::ClientWithMiddleware;
