//! Request options and their layered merge

use std::fmt;
use std::str::FromStr;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, IntoHeaderName, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::env::Environment;
use crate::error::{FetchError, Result};
use crate::utils::StringUtils;

/// Timeout applied when no layer sets one, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;

/// Query parameter used for cache-busting timestamps.
pub const DEFAULT_TIMESTAMP_PARAM: &str = "t";

pub const ENV_TIMEOUT_MS: &str = "FETCHKIT_TIMEOUT_MS";
pub const ENV_MAX_RETRY: &str = "FETCHKIT_MAX_RETRY";
pub const ENV_APPEND_TIMESTAMP: &str = "FETCHKIT_APPEND_TIMESTAMP";
pub const ENV_TIMESTAMP_PARAM: &str = "FETCHKIT_TIMESTAMP_PARAM";
pub const ENV_USE_DEFAULT_USER_AGENT: &str = "FETCHKIT_USE_DEFAULT_USER_AGENT";
pub const ENV_USER_AGENT: &str = "FETCHKIT_USER_AGENT";

/// HTTP method enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
    Trace,
}

impl HttpMethod {
    pub fn as_method(self) -> Method {
        match self {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Trace => Method::TRACE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_method())
    }
}

impl FromStr for HttpMethod {
    type Err = FetchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            "PATCH" => Ok(HttpMethod::Patch),
            "TRACE" => Ok(HttpMethod::Trace),
            _ => Err(FetchError::Config(format!("Unknown HTTP method: {}", s))),
        }
    }
}

/// Options for a single request.
///
/// Every field is optional so that layers can be stacked with
/// [`RequestOptions::merge`]: global options, then client defaults, then the
/// per-call options. Unset fields fall back to built-in defaults when read
/// through the `effective_*` accessors.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Option<HttpMethod>,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub cancel: Option<CancellationToken>,
    pub append_timestamp: Option<bool>,
    pub timestamp_param_name: Option<String>,
    pub timeout_ms: Option<u64>,
    pub max_retry: Option<u32>,
    pub use_default_user_agent: Option<bool>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer `overrides` on top of `self`.
    ///
    /// Scalar fields set in `overrides` win. Headers merge per name: every
    /// header name present in `overrides` replaces all values of that name.
    pub fn merge(&self, overrides: &RequestOptions) -> RequestOptions {
        let mut headers = self.headers.clone();
        for name in overrides.headers.keys() {
            headers.remove(name);
        }
        for (name, value) in overrides.headers.iter() {
            headers.append(name.clone(), value.clone());
        }

        RequestOptions {
            method: overrides.method.or(self.method),
            headers,
            body: overrides.body.clone().or_else(|| self.body.clone()),
            cancel: overrides.cancel.clone().or_else(|| self.cancel.clone()),
            append_timestamp: overrides.append_timestamp.or(self.append_timestamp),
            timestamp_param_name: overrides
                .timestamp_param_name
                .clone()
                .or_else(|| self.timestamp_param_name.clone()),
            timeout_ms: overrides.timeout_ms.or(self.timeout_ms),
            max_retry: overrides.max_retry.or(self.max_retry),
            use_default_user_agent: overrides
                .use_default_user_agent
                .or(self.use_default_user_agent),
        }
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add a header from plain strings, validating both parts.
    pub fn try_header(self, name: &str, value: &str) -> Result<Self> {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| FetchError::InvalidHeader(format!("'{}': {}", name, e)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| FetchError::InvalidHeader(format!("value of '{}': {}", name, e)))?;
        Ok(self.with_header(header_name, header_value))
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON body. Sets `Content-Type` unless present.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        self.body = Some(serde_json::to_vec(value)?);
        if !self.headers.contains_key(CONTENT_TYPE) {
            self.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        Ok(self)
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_timestamp(mut self) -> Self {
        self.append_timestamp = Some(true);
        self
    }

    /// Name of the timestamp query parameter. Does not enable appending.
    pub fn with_timestamp_param(mut self, name: impl Into<String>) -> Self {
        self.timestamp_param_name = Some(name.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_max_retry(mut self, max_retry: u32) -> Self {
        self.max_retry = Some(max_retry);
        self
    }

    pub fn with_default_user_agent(mut self, enabled: bool) -> Self {
        self.use_default_user_agent = Some(enabled);
        self
    }

    pub fn effective_method(&self) -> HttpMethod {
        self.method.unwrap_or_default()
    }

    pub fn effective_append_timestamp(&self) -> bool {
        self.append_timestamp.unwrap_or(false)
    }

    pub fn effective_timestamp_param(&self) -> &str {
        self.timestamp_param_name
            .as_deref()
            .unwrap_or(DEFAULT_TIMESTAMP_PARAM)
    }

    /// Zero disables the timeout.
    pub fn effective_timeout_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS)
    }

    pub fn effective_max_retry(&self) -> u32 {
        self.max_retry.unwrap_or(0)
    }

    pub fn effective_use_default_user_agent(&self) -> bool {
        self.use_default_user_agent
            .unwrap_or_else(|| !Environment::detect().is_browser_like())
    }

    /// Read options from `FETCHKIT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read options through `lookup`, which maps a variable name to its value.
    ///
    /// Unset or blank variables leave the field unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut options = RequestOptions::default();

        if let Some(value) = read(ENV_TIMEOUT_MS) {
            options.timeout_ms = Some(StringUtils::parse_duration_ms(&value).map_err(|_| {
                FetchError::Config(format!("{} has an invalid duration: '{}'", ENV_TIMEOUT_MS, value))
            })?);
        }

        if let Some(value) = read(ENV_MAX_RETRY) {
            options.max_retry = Some(value.parse().map_err(|_| {
                FetchError::Config(format!(
                    "{} must be a non-negative integer, got '{}'",
                    ENV_MAX_RETRY, value
                ))
            })?);
        }

        if let Some(value) = read(ENV_APPEND_TIMESTAMP) {
            options.append_timestamp = Some(parse_flag(ENV_APPEND_TIMESTAMP, &value)?);
        }

        if let Some(value) = read(ENV_TIMESTAMP_PARAM) {
            options.timestamp_param_name = Some(value);
        }

        if let Some(value) = read(ENV_USE_DEFAULT_USER_AGENT) {
            options.use_default_user_agent = Some(parse_flag(ENV_USE_DEFAULT_USER_AGENT, &value)?);
        }

        Ok(options)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(FetchError::Config(format!(
            "{} must be a boolean flag, got '{}'",
            key, value
        ))),
    }
}

#[cfg(test)]
mod tests;
