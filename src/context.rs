//! Process-wide defaults
//!
//! One context holds everything the facade falls back to: the default user
//! agent, the default response transformer, the global options and the
//! transport. It is initialized with built-in values on first use and lives
//! for the whole process; there is no reset. Setters take effect for every
//! call that starts afterwards.
//!
//! Global options are only merged by the free functions in [`crate::http`].
//! [`crate::HttpClient`] never reads them.

use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;

use crate::config::{RequestOptions, ENV_USER_AGENT};
use crate::error::Result;
use crate::http::response::{self, Transformer};
use crate::http::transport::{ReqwestTransport, Transport};

struct Context {
    user_agent: String,
    transformer: Transformer<String>,
    global_options: RequestOptions,
    transport: Arc<dyn Transport>,
}

static CONTEXT: Lazy<RwLock<Context>> = Lazy::new(|| {
    RwLock::new(Context {
        user_agent: builtin_user_agent(),
        transformer: response::text(),
        global_options: RequestOptions::default(),
        transport: Arc::new(ReqwestTransport::default()),
    })
});

/// `fetchkit/<version>`
pub fn builtin_user_agent() -> String {
    format!("fetchkit/{}", crate::VERSION)
}

fn read<R>(f: impl FnOnce(&Context) -> R) -> R {
    let context = CONTEXT.read().unwrap_or_else(PoisonError::into_inner);
    f(&context)
}

fn write(f: impl FnOnce(&mut Context)) {
    let mut context = CONTEXT.write().unwrap_or_else(PoisonError::into_inner);
    f(&mut context);
}

pub fn default_user_agent() -> String {
    read(|context| context.user_agent.clone())
}

pub fn set_default_user_agent(user_agent: impl Into<String>) {
    let user_agent = user_agent.into();
    write(|context| context.user_agent = user_agent);
}

pub fn default_response_transformer() -> Transformer<String> {
    read(|context| context.transformer.clone())
}

/// Replace the transformer used by calls that do not pass their own.
pub fn set_default_response_transformer(transformer: Transformer<String>) {
    write(|context| context.transformer = transformer);
}

/// A snapshot of the global options.
pub fn global_options() -> RequestOptions {
    read(|context| context.global_options.clone())
}

pub fn set_global_options(options: RequestOptions) {
    write(|context| context.global_options = options);
}

/// Mutate the global options in place.
pub fn update_global_options(f: impl FnOnce(&mut RequestOptions)) {
    write(|context| f(&mut context.global_options));
}

pub fn default_transport() -> Arc<dyn Transport> {
    read(|context| Arc::clone(&context.transport))
}

pub fn set_default_transport(transport: Arc<dyn Transport>) {
    write(|context| context.transport = transport);
}

/// Seed the context from `FETCHKIT_*` environment variables.
///
/// Option variables are merged over the current global options and
/// `FETCHKIT_USER_AGENT` replaces the default user agent. Nothing changes if
/// any variable is invalid.
pub fn init_from_env() -> Result<()> {
    let options = RequestOptions::from_env()?;
    let user_agent = std::env::var(ENV_USER_AGENT)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    write(|context| {
        context.global_options = context.global_options.merge(&options);
        if let Some(user_agent) = user_agent {
            context.user_agent = user_agent;
        }
    });
    log::debug!("Request defaults initialized from environment");
    Ok(())
}
