//! Runtime environment detection

use std::fmt;

/// Kind of host the crate is running in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// A browser page (`wasm32-unknown-unknown`).
    Browser,
    /// A sandboxed worker / edge runtime (`wasm32-wasi*`).
    Worker,
    /// A native, server-like process.
    Server,
}

impl Environment {
    /// Detect the current environment from the compilation target.
    pub const fn detect() -> Self {
        if cfg!(all(target_arch = "wasm32", target_os = "unknown")) {
            Environment::Browser
        } else if cfg!(target_arch = "wasm32") {
            Environment::Worker
        } else {
            Environment::Server
        }
    }

    /// Browser-like hosts manage the user agent themselves.
    pub const fn is_browser_like(self) -> bool {
        matches!(self, Environment::Browser | Environment::Worker)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Browser => "browser",
            Environment::Worker => "worker",
            Environment::Server => "server",
        };
        write!(f, "{}", name)
    }
}

pub fn is_browser() -> bool {
    Environment::detect() == Environment::Browser
}

pub fn is_worker() -> bool {
    Environment::detect() == Environment::Worker
}

pub fn is_server() -> bool {
    Environment::detect() == Environment::Server
}
