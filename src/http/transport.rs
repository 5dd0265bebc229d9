//! Transport abstraction
//!
//! The executor never talks to the network directly; it hands each built
//! [`Request`] to a [`Transport`]. The default one is backed by `reqwest`.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response};

use crate::error::{FetchError, Result};
use crate::http::request::Request;

/// Sends a request and returns whatever response the server produced.
///
/// Non-success statuses are not errors at this level. Implementations may
/// observe [`Request::signal`]; the executor also drops the pending future
/// when the attempt is cancelled.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response>;
}

/// `reqwest`-backed transport.
///
/// The underlying client keeps no cookie store and no timeout of its own;
/// both are handled by this crate.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = ClientBuilder::new().build().map_err(FetchError::Transport)?;
        Ok(Self { client })
    }

    /// Use a preconfigured client (proxy, TLS, redirects...).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::with_client(Client::new())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        let mut builder = self
            .client
            .request(request.method().clone(), request.url().clone())
            .headers(request.headers().clone());

        if let Some(body) = request.body() {
            builder = builder.body(body.to_vec());
        }

        let request = builder.build().map_err(FetchError::Transport)?;
        self.client.execute(request).await.map_err(FetchError::Transport)
    }
}
