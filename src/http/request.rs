//! Request construction

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Method;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::RequestOptions;
use crate::context;
use crate::error::{FetchError, Result};
use crate::utils::{epoch_millis, UrlUtils};

/// Anything that can name the target of a request.
pub trait IntoRequestUrl {
    fn into_request_url(self) -> Result<Url>;
}

impl IntoRequestUrl for Url {
    fn into_request_url(self) -> Result<Url> {
        UrlUtils::ensure_absolute(self)
    }
}

impl IntoRequestUrl for &Url {
    fn into_request_url(self) -> Result<Url> {
        UrlUtils::ensure_absolute(self.clone())
    }
}

impl IntoRequestUrl for &str {
    fn into_request_url(self) -> Result<Url> {
        UrlUtils::parse_absolute(self)
    }
}

impl IntoRequestUrl for String {
    fn into_request_url(self) -> Result<Url> {
        UrlUtils::parse_absolute(&self)
    }
}

impl IntoRequestUrl for &String {
    fn into_request_url(self) -> Result<Url> {
        UrlUtils::parse_absolute(self)
    }
}

/// A fully built request.
///
/// Only an [`AttemptHook`](crate::http::executor::AttemptHook) changes it,
/// before dispatch. A new one is built for every attempt so each attempt
/// carries its own cancellation signal.
#[derive(Debug, Clone)]
pub struct Request {
    url: Url,
    method: Method,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    signal: CancellationToken,
}

impl Request {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Headers of a request that has not been dispatched yet.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Fires when this attempt times out or the caller cancels.
    pub fn signal(&self) -> &CancellationToken {
        &self.signal
    }

    #[cfg(test)]
    pub(crate) fn for_tests(url: Url, method: Method) -> Self {
        Self {
            url,
            method,
            headers: HeaderMap::new(),
            body: None,
            signal: CancellationToken::new(),
        }
    }
}

/// Builds [`Request`]s from a URL and merged options.
pub struct RequestBuilder<'a> {
    options: &'a RequestOptions,
    user_agent: String,
}

impl<'a> RequestBuilder<'a> {
    /// Uses the process-wide default user agent.
    pub fn new(options: &'a RequestOptions) -> Self {
        Self {
            options,
            user_agent: context::default_user_agent(),
        }
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build a request. Performs no I/O.
    ///
    /// Fails with a configuration error when the URL is not absolute, or when
    /// a timestamp is requested and the query already holds that parameter.
    pub fn build(&self, url: impl IntoRequestUrl, signal: CancellationToken) -> Result<Request> {
        let mut url = url.into_request_url()?;
        let options = self.options;

        if options.effective_append_timestamp() {
            let param = options.effective_timestamp_param();
            if UrlUtils::has_query_param(&url, param) {
                return Err(FetchError::Config(format!(
                    "Cannot append timestamp parameter '{}': it is already present in URL '{}'",
                    param, url
                )));
            }
            url.query_pairs_mut()
                .append_pair(param, &epoch_millis().to_string());
        }

        let mut headers = options.headers.clone();
        if options.effective_use_default_user_agent() && !headers.contains_key(USER_AGENT) {
            let value = HeaderValue::from_str(&self.user_agent).map_err(|e| {
                FetchError::InvalidHeader(format!("default user agent '{}': {}", self.user_agent, e))
            })?;
            headers.insert(USER_AGENT, value);
        }

        Ok(Request {
            url,
            method: options.effective_method().as_method(),
            headers,
            body: options.body.clone(),
            signal,
        })
    }
}
