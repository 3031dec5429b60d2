//! Cache key types and construction.
//!
//! A [`CacheKey`] is the normalized form of a request descriptor: the HTTP
//! method plus the absolute URL with its fragment removed. Headers are not
//! part of the key.
//!
//! ## Format
//!
//! When displayed, keys follow the format `{method} {url}`:
//!
//! ```
//! use outpost_core::CacheKey;
//! use url::Url;
//!
//! let url = Url::parse("https://shop.example/style.css#top").unwrap();
//! let key = CacheKey::new(http::Method::GET, &url);
//! assert_eq!(format!("{}", key), "GET https://shop.example/style.css");
//! ```
//!
//! ## Performance
//!
//! [`CacheKey`] uses `Arc` internally for cheap cloning, keys are copied
//! into background tasks and into the store on every write.

use std::fmt;
use std::sync::Arc;

use http::Method;
use url::Url;

#[derive(Debug, Eq, PartialEq, Hash)]
struct CacheKeyInner {
    method: Method,
    url: Url,
}

/// A cache key identifying a stored entry inside a generation.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct CacheKey {
    inner: Arc<CacheKeyInner>,
}

impl CacheKey {
    /// Creates a key from a method and URL, dropping the URL fragment.
    pub fn new(method: Method, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        CacheKey {
            inner: Arc::new(CacheKeyInner { method, url }),
        }
    }

    /// Key for a `GET` of the given URL.
    pub fn get(url: &Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Returns the method.
    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    /// Returns the normalized URL.
    pub fn url(&self) -> &Url {
        &self.inner.url
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.inner.method, self.inner.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(input: &str) -> Url {
        Url::parse(input).unwrap()
    }

    #[test]
    fn fragment_is_not_part_of_the_key() {
        let plain = CacheKey::get(&url("https://shop.example/index.html"));
        let anchored = CacheKey::get(&url("https://shop.example/index.html#reviews"));
        assert_eq!(plain, anchored);
    }

    #[test]
    fn query_is_part_of_the_key() {
        let first = CacheKey::get(&url("https://shop.example/app.js?v=1"));
        let second = CacheKey::get(&url("https://shop.example/app.js?v=2"));
        assert_ne!(first, second);
    }

    #[test]
    fn method_is_part_of_the_key() {
        let target = url("https://shop.example/api/cart");
        assert_ne!(CacheKey::get(&target), CacheKey::new(Method::HEAD, &target));
    }

    #[test]
    fn clone_shares_inner() {
        let key = CacheKey::get(&url("https://shop.example/"));
        let cloned = key.clone();
        assert!(Arc::ptr_eq(&key.inner, &cloned.inner));
    }
}
