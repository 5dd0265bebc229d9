//! Cookie parsing, serialization and the per-client cookie jar
//!
//! Only the parts of RFC 6265 a programmatic client needs are handled:
//! `Domain`, `Path`, `Secure`, `HttpOnly` and `Max-Age`. `Expires` dates are
//! not interpreted.

use std::time::{Duration, SystemTime};

use url::Url;

use crate::utils::UrlUtils;

mod jar;

pub use jar::CookieJar;

/// A cookie received from a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Canonical domain the cookie belongs to.
    pub domain: String,
    pub path: String,
    /// Set without a `Domain` attribute: only sent back to the exact host.
    pub host_only: bool,
    pub secure: bool,
    pub http_only: bool,
    pub expires: Option<SystemTime>,
}

impl Cookie {
    /// Parse one `Set-Cookie` header value received in a response for `url`.
    ///
    /// Returns `None` for malformed values and for cookies whose `Domain`
    /// does not cover the responding host.
    pub fn parse(set_cookie: &str, url: &Url) -> Option<Cookie> {
        let host = UrlUtils::canonical_domain(url)?;
        let mut parts = set_cookie.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = Cookie {
            name: name.to_string(),
            value: strip_quotes(value.trim()).to_string(),
            domain: host.clone(),
            path: default_path(url),
            host_only: true,
            secure: false,
            http_only: false,
            expires: None,
        };

        for attribute in parts {
            let attribute = attribute.trim();
            let (key, value) = match attribute.split_once('=') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (attribute, ""),
            };

            match key.to_ascii_lowercase().as_str() {
                "domain" if !value.is_empty() => {
                    let domain = UrlUtils::canonicalize_domain(value);
                    if !domain_matches(&host, &domain) {
                        log::debug!(
                            "Ignoring cookie '{}': domain '{}' does not cover host '{}'",
                            cookie.name,
                            domain,
                            host
                        );
                        return None;
                    }
                    cookie.domain = domain;
                    cookie.host_only = false;
                }
                "path" if value.starts_with('/') => cookie.path = value.to_string(),
                "max-age" => {
                    if let Ok(seconds) = value.parse::<i64>() {
                        cookie.expires = Some(max_age_to_expiry(seconds));
                    }
                }
                "secure" => cookie.secure = true,
                "httponly" => cookie.http_only = true,
                _ => {}
            }
        }

        Some(cookie)
    }

    pub fn is_expired(&self) -> bool {
        self.expires.is_some_and(|at| at <= SystemTime::now())
    }

    /// Whether this cookie should be sent with a request to `url`.
    pub fn matches(&self, url: &Url) -> bool {
        let Some(host) = UrlUtils::canonical_domain(url) else {
            return false;
        };
        let domain_ok = if self.host_only {
            host == self.domain
        } else {
            domain_matches(&host, &self.domain)
        };

        domain_ok
            && path_matches(url.path(), &self.path)
            && (!self.secure || url.scheme() == "https")
            && !self.is_expired()
    }

    fn same_slot(&self, other: &Cookie) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }
}

/// Parse a `Cookie` request header into ordered name/value pairs.
pub fn parse_cookie_header(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Serialize pairs as a `Cookie` header value: `a=1; b=2`.
pub fn serialize_cookie_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Merge `overrides` into `base`, keeping `base` order. Overrides win by name.
pub fn merge_cookie_pairs(
    base: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
) -> Vec<(String, String)> {
    let mut merged = base;
    for (name, value) in overrides {
        match merged.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => merged.push((name, value)),
        }
    }
    merged
}

/// RFC 6265 domain matching on canonical names.
pub fn domain_matches(host: &str, domain: &str) -> bool {
    if host == domain {
        return true;
    }
    host.parse::<std::net::IpAddr>().is_err()
        && host.len() > domain.len()
        && host.ends_with(domain)
        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
}

/// RFC 6265 path matching.
pub fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/')
            || request_path.as_bytes().get(cookie_path.len()) == Some(&b'/'))
}

/// Default cookie path: the request path up to, not including, its last '/'.
fn default_path(url: &Url) -> String {
    let path = url.path();
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(index) => path[..index].to_string(),
    }
}

fn max_age_to_expiry(seconds: i64) -> SystemTime {
    if seconds <= 0 {
        return SystemTime::UNIX_EPOCH;
    }
    SystemTime::now()
        .checked_add(Duration::from_secs(seconds.unsigned_abs()))
        .unwrap_or_else(far_future)
}

fn far_future() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(u32::MAX as u64 * 4)
}

fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
