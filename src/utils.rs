//! Utility functions and helpers

use crate::error::{FetchError, Result};
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

/// URL validation and parsing utilities
pub struct UrlUtils;

impl UrlUtils {
    /// Parse an absolute URL. Relative references and host-less URLs are rejected.
    pub fn parse_absolute(input: &str) -> Result<Url> {
        let url = Url::parse(input.trim())
            .map_err(|e| FetchError::InvalidUrl(format!("Invalid URL '{}': {}", input, e)))?;
        Self::ensure_absolute(url)
    }

    /// Reject URLs that cannot carry a request (`mailto:`, `data:`, ...).
    pub fn ensure_absolute(url: Url) -> Result<Url> {
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(FetchError::InvalidUrl(format!(
                "Invalid URL '{}': not an absolute URL with a host",
                url
            )));
        }
        Ok(url)
    }

    /// Canonical domain of a URL, used as the cookie jar key.
    ///
    /// Lower-cased host without a trailing dot. IP addresses are kept as-is.
    pub fn canonical_domain(url: &Url) -> Option<String> {
        url.host_str().map(Self::canonicalize_domain)
    }

    /// Normalize a raw domain string, e.g. from a cookie `Domain` attribute.
    pub fn canonicalize_domain(domain: &str) -> String {
        domain
            .trim()
            .trim_start_matches('.')
            .trim_end_matches('.')
            .to_ascii_lowercase()
    }

    /// Whether the query string already carries `name`.
    pub fn has_query_param(url: &Url, name: &str) -> bool {
        url.query_pairs().any(|(key, _)| key == name)
    }
}

/// String utilities
pub struct StringUtils;

impl StringUtils {
    /// Parse a duration into milliseconds (supports suffixes 'ms', 's', 'm').
    ///
    /// A bare number is taken as milliseconds.
    pub fn parse_duration_ms(input: &str) -> Result<u64> {
        let input = input.trim();
        if let Ok(millis) = input.parse::<u64>() {
            return Ok(millis);
        }

        let (number_part, factor) = if let Some(stripped) = input.strip_suffix("ms") {
            (stripped, 1)
        } else if let Some(stripped) = input.strip_suffix('s') {
            (stripped, 1_000)
        } else if let Some(stripped) = input.strip_suffix('m') {
            (stripped, 60_000)
        } else {
            return Err(FetchError::Config(format!(
                "Invalid duration format: '{}'. Use number with optional suffix (ms/s/m)",
                input
            )));
        };

        let number: u64 = number_part
            .trim()
            .parse()
            .map_err(|_| FetchError::Config(format!("Invalid duration number: '{}'", number_part)))?;

        number
            .checked_mul(factor)
            .ok_or_else(|| FetchError::Config(format!("Duration out of range: '{}'", input)))
    }
}

/// Milliseconds since the Unix epoch.
pub fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}
