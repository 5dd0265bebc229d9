//! Cookie-aware HTTP client

use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderValue, COOKIE};
use reqwest::Response;

use crate::config::{HttpMethod, RequestOptions};
use crate::context;
use crate::cookies::{merge_cookie_pairs, parse_cookie_header, serialize_cookie_pairs, CookieJar};
use crate::error::{FetchError, Result};
use crate::http::executor::{execute_with_hook, AttemptHook};
use crate::http::request::{IntoRequestUrl, Request};
use crate::http::response::Transformer;
use crate::http::transport::Transport;

/// HTTP client that keeps cookies between calls.
///
/// Stored cookies for the target domain are sent with every attempt, and
/// every `Set-Cookie` received is stored, including those on error
/// responses and on attempts that are retried. The jar belongs to this
/// client alone.
///
/// Unlike the free functions in [`crate::http`], the client does not merge
/// the process-wide global options. Its layers are the client defaults set
/// with [`HttpClient::with_options`], then the per-call options.
pub struct HttpClient {
    jar: CookieJar,
    transport: Arc<dyn Transport>,
    options: RequestOptions,
}

impl HttpClient {
    /// Create a client with an empty jar using the default transport.
    pub fn new() -> Self {
        Self {
            jar: CookieJar::new(),
            transport: context::default_transport(),
            options: RequestOptions::default(),
        }
    }

    /// Defaults applied beneath every call's own options.
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn cookie_jar(&self) -> &CookieJar {
        &self.jar
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Request `url` and read the result through the default transformer.
    pub async fn request(&self, url: impl IntoRequestUrl, options: RequestOptions) -> Result<String> {
        self.request_with(url, options, context::default_response_transformer())
            .await
    }

    /// Request `url` and convert the response with `transformer`.
    ///
    /// Every attempt sends the cookies stored at that moment and stores the
    /// cookies of whatever response it receives, failed ones included.
    pub async fn request_with<T>(
        &self,
        url: impl IntoRequestUrl,
        options: RequestOptions,
        transformer: Transformer<T>,
    ) -> Result<T> {
        let merged = self.options.merge(&options);
        let hook = CookieHook { jar: &self.jar };
        execute_with_hook(url, &merged, &transformer, self.transport.as_ref(), &hook).await
    }

    pub async fn get(&self, url: impl IntoRequestUrl, options: RequestOptions) -> Result<String> {
        self.request(url, options.with_method(HttpMethod::Get)).await
    }

    pub async fn post(&self, url: impl IntoRequestUrl, options: RequestOptions) -> Result<String> {
        self.request(url, options.with_method(HttpMethod::Post)).await
    }

    pub async fn get_with<T>(
        &self,
        url: impl IntoRequestUrl,
        options: RequestOptions,
        transformer: Transformer<T>,
    ) -> Result<T> {
        self.request_with(url, options.with_method(HttpMethod::Get), transformer)
            .await
    }

    pub async fn post_with<T>(
        &self,
        url: impl IntoRequestUrl,
        options: RequestOptions,
        transformer: Transformer<T>,
    ) -> Result<T> {
        self.request_with(url, options.with_method(HttpMethod::Post), transformer)
            .await
    }
}

/// Sends and stores a client's cookies on every attempt.
struct CookieHook<'a> {
    jar: &'a CookieJar,
}

impl AttemptHook for CookieHook<'_> {
    /// Merge stored cookies with any caller-supplied `Cookie` header.
    /// Caller entries win on name conflicts.
    fn before_attempt(&self, request: &mut Request) -> Result<()> {
        let stored = self
            .jar
            .cookies_for(request.url())
            .into_iter()
            .map(|cookie| (cookie.name, cookie.value))
            .collect();
        let manual = request
            .headers()
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(parse_cookie_header)
            .collect();

        let merged = merge_cookie_pairs(stored, manual);
        if merged.is_empty() {
            return Ok(());
        }

        let header = serialize_cookie_pairs(&merged);
        let value = HeaderValue::from_str(&header)
            .map_err(|e| FetchError::InvalidHeader(format!("cookie header '{}': {}", header, e)))?;
        request.headers_mut().insert(COOKIE, value);
        Ok(())
    }

    fn on_response(&self, request: &Request, response: &Response) {
        self.jar.store_response_cookies(request.url(), response.headers());
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("cookie_domains", &self.jar.domains())
            .field("options", &self.options)
            .finish()
    }
}
