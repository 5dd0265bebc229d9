//! fetchkit - HTTP request helper
//!
//! Builds requests with optional cache-busting timestamps and a default
//! user agent, runs them with a per-attempt timeout and bounded retry, and
//! turns responses into values through pluggable transformers.
//! [`HttpClient`] adds a per-client cookie jar on top.

pub mod client;
pub mod config;
pub mod context;
pub mod cookies;
pub mod env;
pub mod error;
pub mod http;
pub mod logging;
pub mod utils;

pub use client::HttpClient;
pub use config::{HttpMethod, RequestOptions};
pub use context::{
    default_response_transformer, default_user_agent, global_options, set_default_response_transformer,
    set_default_user_agent, set_global_options, update_global_options,
};
pub use cookies::{Cookie, CookieJar};
pub use env::Environment;
pub use error::{FetchError, RequestError, RequestErrorKind, ResponseInfo, Result};
pub use crate::http::response::{bytes, json, text, transformer, Transformer};
pub use crate::http::{get, get_with, post, post_with, request, request_with, Request, Transport};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
