use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use reqwest::header::{HeaderMap, SET_COOKIE};
use url::Url;

use super::{serialize_cookie_pairs, Cookie};

/// Cookies bucketed by canonical domain.
///
/// Internally synchronized so one jar can serve concurrent requests; the
/// last write to a given cookie wins.
#[derive(Debug, Default)]
pub struct CookieJar {
    entries: RwLock<HashMap<String, Vec<Cookie>>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store every `Set-Cookie` header of a response received from `url`.
    ///
    /// A cookie with a past expiry (e.g. `Max-Age=0`) removes the stored one.
    pub fn store_response_cookies(&self, url: &Url, headers: &HeaderMap) {
        let cookies: Vec<Cookie> = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| Cookie::parse(value, url))
            .collect();

        if cookies.is_empty() {
            return;
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for cookie in cookies {
            log::debug!("Storing cookie '{}' for domain {}", cookie.name, cookie.domain);
            let bucket = entries.entry(cookie.domain.clone()).or_default();
            bucket.retain(|existing| !existing.same_slot(&cookie));
            if !cookie.is_expired() {
                bucket.push(cookie);
            }
        }
        entries.retain(|_, bucket| !bucket.is_empty());
    }

    /// Cookies to send with a request to `url`, longest path first.
    pub fn cookies_for(&self, url: &Url) -> Vec<Cookie> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut cookies: Vec<Cookie> = entries
            .values()
            .flatten()
            .filter(|cookie| cookie.matches(url))
            .cloned()
            .collect();
        cookies.sort_by(|a, b| b.path.len().cmp(&a.path.len()));
        cookies
    }

    /// `Cookie` header value for a request to `url`, if any cookie applies.
    pub fn request_header(&self, url: &Url) -> Option<String> {
        let pairs: Vec<(String, String)> = self
            .cookies_for(url)
            .into_iter()
            .map(|cookie| (cookie.name, cookie.value))
            .collect();
        if pairs.is_empty() {
            None
        } else {
            Some(serialize_cookie_pairs(&pairs))
        }
    }

    /// Remove the cookie named `name` that would be sent to `url`.
    pub fn remove_cookie(&self, url: &Url, name: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for bucket in entries.values_mut() {
            bucket.retain(|cookie| !(cookie.name == name && cookie.matches(url)));
        }
        entries.retain(|_, bucket| !bucket.is_empty());
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Domains that currently hold at least one cookie, sorted.
    pub fn domains(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut domains: Vec<String> = entries.keys().cloned().collect();
        domains.sort();
        domains
    }

    /// Number of stored cookies, expired ones included until replaced.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
