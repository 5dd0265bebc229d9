//! Response transformers
//!
//! A transformer turns a successful response into the value a call returns.
//! Transformers are shared (`Arc`) and may be asynchronous.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::error::{FetchError, ResponseInfo, Result};
use crate::http::request::Request;

/// Converts a raw response (and the request that produced it) into `T`.
pub type Transformer<T> =
    Arc<dyn Fn(Response, Request) -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// Wrap an async closure as a [`Transformer`].
pub fn transformer<T, F, Fut>(f: F) -> Transformer<T>
where
    F: Fn(Response, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    Arc::new(move |response: Response, request: Request| f(response, request).boxed())
}

/// Reads the body as text. This is the initial process-wide default.
pub fn text() -> Transformer<String> {
    transformer(|response: Response, _request| async move {
        response.text().await.map_err(FetchError::from)
    })
}

/// Reads the raw body bytes.
pub fn bytes() -> Transformer<Vec<u8>> {
    transformer(|response: Response, _request| async move {
        response
            .bytes()
            .await
            .map(|body| body.to_vec())
            .map_err(FetchError::from)
    })
}

/// Deserializes the body as JSON.
pub fn json<T>() -> Transformer<T>
where
    T: DeserializeOwned + Send + 'static,
{
    transformer(|response: Response, _request| async move {
        let body = response.bytes().await.map_err(FetchError::from)?;
        serde_json::from_slice::<T>(&body).map_err(FetchError::from)
    })
}

/// Capture what a failed response carried, consuming it.
///
/// The body is read best-effort; a body that cannot be read is left empty.
pub(crate) async fn capture(response: Response) -> ResponseInfo {
    let url = response.url().clone();
    let status = response.status();
    let headers = response.headers().clone();
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => {
            log::debug!("Could not read error response body from {}: {}", url, err);
            String::new()
        }
    };
    ResponseInfo {
        url,
        status,
        headers,
        body,
    }
}
