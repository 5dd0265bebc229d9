use super::{HttpMethod, RequestOptions, DEFAULT_TIMEOUT_MS, DEFAULT_TIMESTAMP_PARAM};
use crate::error::FetchError;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use std::collections::HashMap;

#[test]
fn defaults_apply_when_no_layer_sets_a_value() {
    let options = RequestOptions::default();
    assert_eq!(options.effective_method(), HttpMethod::Get);
    assert_eq!(options.effective_timeout_ms(), DEFAULT_TIMEOUT_MS);
    assert_eq!(options.effective_max_retry(), 0);
    assert_eq!(options.effective_timestamp_param(), DEFAULT_TIMESTAMP_PARAM);
    assert!(!options.effective_append_timestamp());
}

#[cfg(not(target_arch = "wasm32"))]
#[test]
fn default_user_agent_is_enabled_on_servers() {
    assert!(RequestOptions::default().effective_use_default_user_agent());
}

#[test]
fn later_layer_wins_over_earlier_layer() {
    let global = RequestOptions::new()
        .with_timeout_ms(5_000)
        .with_max_retry(3)
        .with_method(HttpMethod::Post);
    let call = RequestOptions::new().with_timeout_ms(250);

    let merged = global.merge(&call);
    assert_eq!(merged.effective_timeout_ms(), 250);
    assert_eq!(merged.effective_max_retry(), 3);
    assert_eq!(merged.effective_method(), HttpMethod::Post);

    let merged = RequestOptions::default().merge(&RequestOptions::default());
    assert_eq!(merged.effective_timeout_ms(), DEFAULT_TIMEOUT_MS);
}

#[test]
fn renaming_timestamp_param_leaves_appending_to_other_layers() {
    let global = RequestOptions::new().with_timestamp_param("_ts");
    assert_eq!(global.append_timestamp, None);
    assert!(!global.effective_append_timestamp());

    let merged = global.merge(&RequestOptions::new().with_timestamp());
    assert!(merged.effective_append_timestamp());
    assert_eq!(merged.effective_timestamp_param(), "_ts");
}

#[test]
fn headers_merge_per_name() {
    let global = RequestOptions::new()
        .with_header(ACCEPT, HeaderValue::from_static("text/plain"))
        .with_header(USER_AGENT, HeaderValue::from_static("global-agent"));
    let call = RequestOptions::new().with_header(ACCEPT, HeaderValue::from_static("application/json"));

    let merged = global.merge(&call);
    assert_eq!(merged.headers.get(ACCEPT).expect("accept"), "application/json");
    assert_eq!(merged.headers.get_all(ACCEPT).iter().count(), 1);
    assert_eq!(merged.headers.get(USER_AGENT).expect("ua"), "global-agent");
}

#[test]
fn try_header_rejects_invalid_names() {
    let err = RequestOptions::new()
        .try_header("bad header", "value")
        .expect_err("invalid name");
    assert!(matches!(err, FetchError::InvalidHeader(_)));
    assert!(err.is_configuration());

    let options = RequestOptions::new()
        .try_header("X-Trace", "abc")
        .expect("valid header");
    assert_eq!(options.headers.get("x-trace").expect("header"), "abc");
}

#[test]
fn json_body_sets_content_type() {
    let options = RequestOptions::new()
        .json(&serde_json::json!({ "name": "fetchkit" }))
        .expect("json body");
    assert_eq!(options.body.as_deref(), Some(br#"{"name":"fetchkit"}"#.as_slice()));
    assert_eq!(options.headers.get(CONTENT_TYPE).expect("content type"), "application/json");
}

#[test]
fn http_method_parses_case_insensitively() {
    assert_eq!("post".parse::<HttpMethod>().expect("method"), HttpMethod::Post);
    assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
    assert!("FETCH".parse::<HttpMethod>().is_err());
}

#[test]
fn from_lookup_reads_variables() {
    let vars: HashMap<&str, &str> = [
        ("FETCHKIT_TIMEOUT_MS", "30s"),
        ("FETCHKIT_MAX_RETRY", "2"),
        ("FETCHKIT_APPEND_TIMESTAMP", "yes"),
        ("FETCHKIT_TIMESTAMP_PARAM", "_ts"),
        ("FETCHKIT_USE_DEFAULT_USER_AGENT", "off"),
    ]
    .into_iter()
    .collect();

    let options =
        RequestOptions::from_lookup(|key| vars.get(key).map(|v| v.to_string())).expect("options");
    assert_eq!(options.timeout_ms, Some(30_000));
    assert_eq!(options.max_retry, Some(2));
    assert_eq!(options.append_timestamp, Some(true));
    assert_eq!(options.timestamp_param_name.as_deref(), Some("_ts"));
    assert_eq!(options.use_default_user_agent, Some(false));
}

#[test]
fn from_lookup_leaves_blank_variables_unset() {
    let options = RequestOptions::from_lookup(|key| {
        (key == "FETCHKIT_MAX_RETRY").then(|| "  ".to_string())
    })
    .expect("options");
    assert_eq!(options.max_retry, None);
    assert_eq!(options.timeout_ms, None);
}

#[test]
fn from_lookup_rejects_invalid_values() {
    let err = RequestOptions::from_lookup(|key| {
        (key == "FETCHKIT_MAX_RETRY").then(|| "-1".to_string())
    })
    .expect_err("negative retry");
    assert!(matches!(err, FetchError::Config(_)));

    let err = RequestOptions::from_lookup(|key| {
        (key == "FETCHKIT_APPEND_TIMESTAMP").then(|| "maybe".to_string())
    })
    .expect_err("bad flag");
    assert!(matches!(err, FetchError::Config(_)));
}
