use fetchkit::context::builtin_user_agent;
use fetchkit::utils::UrlUtils;
use fetchkit::Environment;

#[test]
fn test_version() {
    assert!(!fetchkit::VERSION.is_empty());
}

#[test]
fn test_builtin_user_agent_names_crate_and_version() {
    assert_eq!(builtin_user_agent(), format!("fetchkit/{}", fetchkit::VERSION));
}

#[cfg(not(target_arch = "wasm32"))]
#[test]
fn test_native_build_runs_as_server() {
    assert_eq!(Environment::detect(), Environment::Server);
}

#[test]
fn test_url_utils_requires_absolute_url() {
    assert!(UrlUtils::parse_absolute("example.com").is_err());
    let url = UrlUtils::parse_absolute("https://example.com").expect("URL should parse");
    assert_eq!(url.scheme(), "https");
}
