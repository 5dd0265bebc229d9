//! Request execution with timeout and bounded retry

use std::time::Duration;

use reqwest::Response;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::RequestOptions;
use crate::error::{FetchError, RequestError, RequestErrorKind, Result};
use crate::http::request::{IntoRequestUrl, Request, RequestBuilder};
use crate::http::response::{self, Transformer};
use crate::http::transport::Transport;

/// Callbacks run on every attempt, retries included.
///
/// Both run inside the attempt's timeout.
pub trait AttemptHook: Send + Sync {
    /// Adjust a freshly built request before it is dispatched.
    fn before_attempt(&self, _request: &mut Request) -> Result<()> {
        Ok(())
    }

    /// Observe a response before its status is classified.
    fn on_response(&self, _request: &Request, _response: &Response) {}
}

struct NoHook;

impl AttemptHook for NoHook {}

/// Execute a request with already merged `options`.
///
/// Makes at most `1 + max_retry` attempts, strictly one after another and
/// without delay. Every failure is retried except configuration errors and
/// cancellation by the caller; once the budget is spent the last error is
/// returned.
pub async fn execute<T>(
    url: impl IntoRequestUrl,
    options: &RequestOptions,
    transformer: &Transformer<T>,
    transport: &dyn Transport,
) -> Result<T> {
    execute_with_hook(url, options, transformer, transport, &NoHook).await
}

/// [`execute`], calling `hook` around every attempt.
pub async fn execute_with_hook<T>(
    url: impl IntoRequestUrl,
    options: &RequestOptions,
    transformer: &Transformer<T>,
    transport: &dyn Transport,
    hook: &dyn AttemptHook,
) -> Result<T> {
    let url = url.into_request_url()?;
    let max_attempts = options.effective_max_retry().saturating_add(1);
    let mut attempt: u32 = 1;

    loop {
        match execute_once(&url, options, transformer, transport, hook).await {
            Ok(value) => return Ok(value),
            Err(err) if is_final(&err) || attempt >= max_attempts => return Err(err),
            Err(err) => {
                log::warn!(
                    "Request to {} failed on attempt {}/{}, retrying: {}",
                    url,
                    attempt,
                    max_attempts,
                    err
                );
                attempt += 1;
            }
        }
    }
}

/// Failures another attempt cannot change.
fn is_final(err: &FetchError) -> bool {
    err.is_configuration()
        || err
            .as_request_error()
            .is_some_and(|request_error| request_error.kind() == RequestErrorKind::Aborted)
}

/// One attempt: build, dispatch, classify, transform.
///
/// The timeout covers the whole attempt including the transformer.
async fn execute_once<T>(
    url: &Url,
    options: &RequestOptions,
    transformer: &Transformer<T>,
    transport: &dyn Transport,
    hook: &dyn AttemptHook,
) -> Result<T> {
    let signal = options
        .cancel
        .as_ref()
        .map(CancellationToken::child_token)
        .unwrap_or_default();
    let mut request = RequestBuilder::new(options).build(url, signal.clone())?;
    hook.before_attempt(&mut request)?;
    let timeout_ms = options.effective_timeout_ms();

    let attempt = async {
        let response = match transport.fetch(&request).await {
            Ok(response) => response,
            Err(FetchError::Transport(err)) if err.is_timeout() => {
                return Err(FetchError::Request(
                    RequestError::timeout(request.clone(), timeout_ms).with_cause(err),
                ));
            }
            Err(err) => return Err(err),
        };
        hook.on_response(&request, &response);

        if !response.status().is_success() {
            let info = response::capture(response).await;
            return Err(FetchError::Request(RequestError::from_status(
                request.clone(),
                info,
            )));
        }

        transformer(response, request.clone()).await
    };

    tokio::select! {
        biased;
        _ = signal.cancelled() => Err(FetchError::Request(RequestError::aborted(request.clone()))),
        _ = deadline(timeout_ms) => {
            signal.cancel();
            Err(FetchError::Request(RequestError::timeout(request.clone(), timeout_ms)))
        }
        result = attempt => result,
    }
}

async fn deadline(timeout_ms: u64) {
    if timeout_ms == 0 {
        std::future::pending::<()>().await;
    } else {
        tokio::time::sleep(Duration::from_millis(timeout_ms)).await;
    }
}
