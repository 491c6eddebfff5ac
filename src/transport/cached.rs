//! Blocking `reqwest` session with a GET response cache.

use std::{
    num::NonZeroUsize,
    sync::{Mutex, PoisonError},
};

use lru::LruCache;
use reqwest::{
    blocking::Client,
    header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use tracing::{debug, instrument};

use crate::{
    config::{API_KEY_HEADER, IgbConfig},
    error::{IgbError, Result},
    transport::{HttpResponse, HttpSession, RequestBody},
};

/// Default [`HttpSession`]: sends the api key on every request and caches successful GET
/// responses by URL.
///
/// POST requests always go to the network. Nothing is retried.
#[derive(Debug)]
pub struct CachedSession {
    client: Client,
    cache: Option<Mutex<LruCache<String, HttpResponse>>>,
}

impl CachedSession {
    /// Builds a session from the client configuration.
    ///
    /// # Errors
    ///
    /// - [`IgbError::Config`] if the api key is not a valid header value
    /// - [`IgbError::Http`] if the HTTP client cannot be built
    pub fn new(config: &IgbConfig) -> Result<Self> {
        let name = HeaderName::from_bytes(API_KEY_HEADER.as_bytes())
            .map_err(|e| IgbError::Config(format!("invalid api key header name: {e}")))?;
        let mut value = HeaderValue::from_str(&config.api_key)
            .map_err(|e| IgbError::Config(format!("api_key is not a valid header value: {e}")))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(name, value);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.http.timeout())
            .connect_timeout(config.http.connect_timeout())
            .build()?;

        let cache =
            NonZeroUsize::new(config.http.cache_capacity).map(|cap| Mutex::new(LruCache::new(cap)));

        Ok(Self { client, cache })
    }

    /// Number of cached GET responses.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache
            .as_ref()
            .map_or(0, |cache| cache.lock().unwrap_or_else(PoisonError::into_inner).len())
    }

    /// Drops every cached response.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.lock().unwrap_or_else(PoisonError::into_inner).clear();
        }
    }

    fn cached(&self, url: &str) -> Option<HttpResponse> {
        let cache = self.cache.as_ref()?;
        cache.lock().unwrap_or_else(PoisonError::into_inner).get(url).cloned()
    }

    fn remember(&self, url: &str, response: &HttpResponse) {
        if let Some(cache) = &self.cache {
            cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .put(url.to_owned(), response.clone());
        }
    }
}

impl HttpSession for CachedSession {
    #[instrument(skip(self))]
    fn get(&self, url: &str) -> Result<HttpResponse> {
        if let Some(hit) = self.cached(url) {
            debug!("serving GET from cache");
            return Ok(hit);
        }

        let response = self.client.get(url).send()?;
        let status = response.status().as_u16();
        let response = HttpResponse::new(status, response.bytes()?.to_vec());

        if response.is_ok() {
            self.remember(url, &response);
        }

        Ok(response)
    }

    #[instrument(skip(self, body), fields(content_type = body.content_type()))]
    fn post(&self, url: &str, body: &RequestBody) -> Result<HttpResponse> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, body.content_type())
            .body(body.to_bytes()?)
            .send()?;

        let status = response.status().as_u16();
        Ok(HttpResponse::new(status, response.bytes()?.to_vec()))
    }
}
