//! Logging initialization utilities.
//!
//! The library only emits records through the `log` facade (retry warnings,
//! cookie bookkeeping at debug level). Applications that do not install
//! their own logger can call [`init`].

use env_logger::Env;

/// Initialize logging with a default filter level, overridable via `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let env = Env::default().default_filter_or("info");
    let _ = env_logger::Builder::from_env(env).try_init();
}
