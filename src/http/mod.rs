//! HTTP request module
//!
//! Module-level request functions. Every call here merges the process-wide
//! global options (see [`crate::context`]) as its lowest layer, below the
//! per-call options, and dispatches through the default transport.
//! [`crate::HttpClient`] is the cookie-aware alternative that skips the
//! global options.

use crate::config::{HttpMethod, RequestOptions};
use crate::context;
use crate::error::Result;

pub mod executor;
pub mod request;
pub mod response;
pub mod transport;

pub use executor::{execute, execute_with_hook, AttemptHook};
pub use request::{IntoRequestUrl, Request, RequestBuilder};
pub use response::Transformer;
pub use transport::{ReqwestTransport, Transport};

/// Request `url` and read the result through the default transformer.
pub async fn request(url: impl IntoRequestUrl, options: RequestOptions) -> Result<String> {
    request_with(url, options, context::default_response_transformer()).await
}

/// Request `url` and convert the response with `transformer`.
pub async fn request_with<T>(
    url: impl IntoRequestUrl,
    options: RequestOptions,
    transformer: Transformer<T>,
) -> Result<T> {
    let merged = context::global_options().merge(&options);
    let transport = context::default_transport();
    execute(url, &merged, &transformer, transport.as_ref()).await
}

pub async fn get(url: impl IntoRequestUrl, options: RequestOptions) -> Result<String> {
    request(url, options.with_method(HttpMethod::Get)).await
}

pub async fn post(url: impl IntoRequestUrl, options: RequestOptions) -> Result<String> {
    request(url, options.with_method(HttpMethod::Post)).await
}

pub async fn get_with<T>(
    url: impl IntoRequestUrl,
    options: RequestOptions,
    transformer: Transformer<T>,
) -> Result<T> {
    request_with(url, options.with_method(HttpMethod::Get), transformer).await
}

pub async fn post_with<T>(
    url: impl IntoRequestUrl,
    options: RequestOptions,
    transformer: Transformer<T>,
) -> Result<T> {
    request_with(url, options.with_method(HttpMethod::Post), transformer).await
}
