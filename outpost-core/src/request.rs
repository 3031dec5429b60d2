//! Intercepted request descriptor.
//!
//! A [`RequestDescriptor`] is built once per intercepted request. It is never
//! persisted: the policy uses it to classify the request and the store uses
//! its [`CacheKey`] to address entries.

use http::Method;
use serde::{Deserialize, Serialize};
use url::{Origin, Url};

use crate::CacheKey;

/// Fetch mode of an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// Top-level page navigation.
    Navigate,
    /// Sub-resource restricted to the page origin.
    SameOrigin,
    /// Cross-origin sub-resource without CORS; the response is opaque.
    #[default]
    NoCors,
    /// Cross-origin sub-resource using CORS.
    Cors,
}

impl RequestMode {
    /// Returns `true` for page navigations.
    #[inline]
    pub const fn is_navigation(&self) -> bool {
        matches!(self, RequestMode::Navigate)
    }

    /// Returns the mode as a string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RequestMode::Navigate => "navigate",
            RequestMode::SameOrigin => "same-origin",
            RequestMode::NoCors => "no-cors",
            RequestMode::Cors => "cors",
        }
    }
}

/// Kind of resource the request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// HTML document.
    Document,
    /// Stylesheet.
    Style,
    /// Script.
    Script,
    /// Image.
    Image,
    /// Web app manifest.
    Manifest,
    /// Web font.
    Font,
    /// Anything else (XHR, fetch, ...).
    #[default]
    Other,
}

impl Destination {
    /// Guesses the destination of a precached asset from its URL path.
    pub fn guess(url: &Url) -> Self {
        let path = url.path();
        if path.ends_with('/') {
            return Destination::Document;
        }
        let extension = path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("html" | "htm") => Destination::Document,
            Some("css") => Destination::Style,
            Some("js" | "mjs") => Destination::Script,
            Some("png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" | "avif") => {
                Destination::Image
            }
            Some("webmanifest") => Destination::Manifest,
            Some("json") if path.ends_with("manifest.json") => Destination::Manifest,
            Some("woff" | "woff2" | "ttf" | "otf") => Destination::Font,
            _ => Destination::Other,
        }
    }
}

/// Per-request description used for classification and cache keying.
///
/// # Example
///
/// ```
/// use outpost_core::RequestDescriptor;
/// use url::Url;
///
/// let page = RequestDescriptor::navigate(Url::parse("https://shop.example/").unwrap());
/// assert!(page.mode().is_navigation());
/// assert_eq!(page.method(), http::Method::GET);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    method: Method,
    url: Url,
    mode: RequestMode,
    destination: Destination,
}

impl RequestDescriptor {
    /// Creates a descriptor from its parts.
    pub fn new(method: Method, url: Url, mode: RequestMode, destination: Destination) -> Self {
        Self {
            method,
            url,
            mode,
            destination,
        }
    }

    /// A `GET` page navigation.
    pub fn navigate(url: Url) -> Self {
        Self::new(Method::GET, url, RequestMode::Navigate, Destination::Document)
    }

    /// A `GET` sub-resource request.
    pub fn get(url: Url, mode: RequestMode, destination: Destination) -> Self {
        Self::new(Method::GET, url, mode, destination)
    }

    /// Returns a copy of this descriptor with a different method.
    pub fn with_method(self, method: Method) -> Self {
        Self { method, ..self }
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Absolute request URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch mode.
    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    /// Resource destination.
    pub fn destination(&self) -> Destination {
        self.destination
    }

    /// Origin of the request URL.
    pub fn origin(&self) -> Origin {
        self.url.origin()
    }

    /// Cache key addressing this request in a generation.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.method.clone(), &self.url)
    }
}
