//! Reqwest-backed [`Fetcher`].

use async_trait::async_trait;
use http::HeaderMap;
use http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN};
use outpost_core::{
    FetchError, FetchResult, Fetcher, RequestDescriptor, RequestMode, Response, ResponseType,
};
use reqwest_middleware::ClientWithMiddleware;
use tracing::debug;
use url::Url;

use crate::CorsError;

/// Fetches requests on behalf of pages served from `origin`.
///
/// Works with a plain `reqwest::Client` or a middleware chain:
///
/// ```no_run
/// use outpost_reqwest::ReqwestFetcher;
/// use reqwest_middleware::ClientBuilder;
///
/// let origin = url::Url::parse("https://shop.example").unwrap();
/// let plain = ReqwestFetcher::new(reqwest::Client::new(), origin.clone());
/// let chained = ReqwestFetcher::new(ClientBuilder::new(reqwest::Client::new()).build(), origin);
/// ```
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: ClientWithMiddleware,
    origin: Url,
}

impl ReqwestFetcher {
    /// Creates a fetcher for pages served from `origin`.
    pub fn new(client: impl Into<ClientWithMiddleware>, origin: Url) -> Self {
        Self {
            client: client.into(),
            origin,
        }
    }

    /// Page origin.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.origin.origin()
    }

    fn classify(
        &self,
        request: &RequestDescriptor,
        headers: &HeaderMap,
    ) -> Result<ResponseType, CorsError> {
        if self.is_same_origin(request.url()) {
            return Ok(ResponseType::Basic);
        }
        match request.mode() {
            RequestMode::Navigate => Ok(ResponseType::Basic),
            RequestMode::NoCors => Ok(ResponseType::Opaque),
            RequestMode::SameOrigin => Err(CorsError::CrossOrigin {
                url: request.url().clone(),
            }),
            RequestMode::Cors => {
                let origin = self.origin.origin().ascii_serialization();
                let allowed = headers
                    .get(ACCESS_CONTROL_ALLOW_ORIGIN)
                    .and_then(|value| value.to_str().ok())
                    .is_some_and(|value| value == "*" || value == origin);
                if allowed {
                    Ok(ResponseType::Cors)
                } else {
                    Err(CorsError::NotAllowed {
                        url: request.url().clone(),
                        origin,
                    })
                }
            }
        }
    }
}

impl std::fmt::Debug for ReqwestFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestFetcher")
            .field("origin", &self.origin.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, request: &RequestDescriptor) -> FetchResult<Response> {
        let url = request.url();
        if request.mode() == RequestMode::SameOrigin && !self.is_same_origin(url) {
            return Err(FetchError::network(
                url,
                CorsError::CrossOrigin { url: url.clone() },
            ));
        }

        let mut builder = self.client.request(request.method().clone(), url.clone());
        if request.mode() == RequestMode::Cors && !self.is_same_origin(url) {
            builder = builder.header(ORIGIN, self.origin.origin().ascii_serialization());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::network(url, e))?;
        let status = response.status();
        let headers = response.headers().clone();
        let final_url = response.url().clone();
        let kind = self
            .classify(request, &headers)
            .map_err(|e| FetchError::network(url, e))?;
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::network(url, e))?;

        debug!(
            %url,
            %status,
            kind = kind.as_str(),
            bytes = body.len(),
            "Fetched"
        );

        Ok(Response::new(status, body)
            .with_headers(headers)
            .with_kind(kind)
            .with_url(final_url))
    }
}
