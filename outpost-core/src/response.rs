//! Response snapshots and stored entries.
//!
//! The host hands out response bodies as single-use streams. A [`Response`]
//! holds a fully buffered body in [`Bytes`](bytes::Bytes), so a clone is an
//! independent snapshot: one copy goes back to the page, one goes to the
//! cache store.

use chrono::{DateTime, Utc};
use http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Raw;

/// Response type as seen by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Same-origin response.
    #[default]
    Basic,
    /// Cross-origin response allowed by CORS.
    Cors,
    /// Cross-origin `no-cors` response. Status and headers are not
    /// trustworthy from the page's point of view.
    Opaque,
}

impl ResponseType {
    /// Returns the type as a string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Basic => "basic",
            ResponseType::Cors => "cors",
            ResponseType::Opaque => "opaque",
        }
    }
}

/// A buffered response.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Raw,
    kind: ResponseType,
    url: Option<Url>,
}

impl Response {
    /// Creates a `Basic` response with empty headers.
    pub fn new(status: StatusCode, body: impl Into<Raw>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            kind: ResponseType::Basic,
            url: None,
        }
    }

    /// Shorthand for a `200 OK` response.
    pub fn ok(body: impl Into<Raw>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Sets the headers.
    pub fn with_headers(self, headers: HeaderMap) -> Self {
        Self { headers, ..self }
    }

    /// Sets the response type.
    pub fn with_kind(self, kind: ResponseType) -> Self {
        Self { kind, ..self }
    }

    /// Sets the final URL after redirects.
    pub fn with_url(self, url: Url) -> Self {
        Self {
            url: Some(url),
            ..self
        }
    }

    /// HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Buffered body.
    pub fn body(&self) -> &Raw {
        &self.body
    }

    /// Response type.
    pub fn kind(&self) -> ResponseType {
        self.kind
    }

    /// Final URL, if known.
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Whether the response may be written to a generation.
    ///
    /// Opaque responses carry no readable status, so they are stored only when
    /// `cache_opaque_responses` is set. Everything else must be a plain `200`.
    pub fn is_cacheable(&self, cache_opaque_responses: bool) -> bool {
        match self.kind {
            ResponseType::Opaque => cache_opaque_responses,
            ResponseType::Basic | ResponseType::Cors => self.status == StatusCode::OK,
        }
    }

    /// Returns an independent copy sharing the same body buffer.
    #[inline]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Consumes the response and returns the body.
    pub fn into_body(self) -> Raw {
        self.body
    }
}

/// A stored request → response mapping value.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    response: Response,
    stored_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Captures a response, stamping it with the current time.
    pub fn new(response: Response) -> Self {
        Self::with_timestamp(response, Utc::now())
    }

    /// Captures a response with an explicit storage time.
    pub fn with_timestamp(response: Response, stored_at: DateTime<Utc>) -> Self {
        Self {
            response,
            stored_at,
        }
    }

    /// The stored response.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// When the entry was written.
    pub fn stored_at(&self) -> DateTime<Utc> {
        self.stored_at
    }

    /// Approximate memory footprint, used by byte-bounded stores.
    pub fn memory_size(&self) -> usize {
        let headers: usize = self
            .response
            .headers
            .iter()
            .map(|(name, value)| name.as_str().len() + value.len())
            .sum();
        std::mem::size_of::<Self>() + self.response.body.len() + headers
    }

    /// Consumes the entry and returns the response.
    pub fn into_response(self) -> Response {
        self.response
    }
}
