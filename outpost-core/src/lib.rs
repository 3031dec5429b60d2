#![warn(missing_docs)]
//! # outpost-core
//!
//! Core traits and types for the Outpost offline caching layer.
//!
//! This crate holds the vocabulary shared by the cache store and the
//! interception policy:
//!
//! - **Describe** an intercepted request ([`RequestDescriptor`])
//! - **Key** stored entries ([`CacheKey`])
//! - **Snapshot** responses so they can be returned and stored ([`Response`], [`CacheEntry`])
//! - **Name** versioned cache generations ([`GenerationName`])
//! - **Call** the network ([`Fetcher`])

pub mod fetcher;
pub mod generation;
pub mod key;
pub mod request;
pub mod response;
pub mod source;

pub use fetcher::{FetchError, FetchResult, Fetcher};
pub use generation::GenerationName;
pub use key::CacheKey;
pub use request::{Destination, RequestDescriptor, RequestMode};
pub use response::{CacheEntry, Response, ResponseType};
#[doc(hidden)]
pub use smol_str::SmolStr;
pub use source::{ResponseSource, Served};

/// Raw byte data type used for response bodies.
/// Using `Bytes` provides zero-copy cloning via reference counting.
pub type Raw = bytes::Bytes;
